// Energy-vs-HDD regression
//
// This module turns a household's daily energy use and the local daily
// Heating Degree Days into a linear model:
//
//     energy[d] = slope * hdd[d] + intercept
//
// - combine:    aligns the two irregular, possibly-discontinuous series on
//               common local days
// - statistics: closed-form least-squares fit producing slope, intercept,
//               R² and sample count
//
// The slope (energy per HDD) is the heating-efficiency measure that the
// efficacy ratio compares between control and normal periods.

mod combine;
mod statistics;

pub use combine::{combine_daily_readings_with_hdd, ConsumptionHddSample};
pub use statistics::{compute_hdd_metrics, HddMetrics};

#[cfg(test)]
mod tests;
