//! ETV - Energy-saving trial verification for household heating
//!
//! This library regresses daily heating-fuel energy against Heating Degree
//! Days per household, splits household-days into control and normal
//! periods by majority vote over device activity logs, and reports the
//! efficacy ratio of the two periods' slopes with cohort summary statistics.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod day_key;
pub mod driver;
pub mod filters;
pub mod household;
pub mod parse;
pub mod regression;
pub mod segmentation;
pub mod series;
pub mod summary;
