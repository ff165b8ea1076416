//! Fixed-multiplier yield projection.
//!
//! Not a fitted model: the same summary always yields the same prediction.

use crate::service::aggregation::CensusSummary;
use serde::{Deserialize, Serialize};

/// Shown on the monitoring page regardless of data.
pub const RECOMMENDATIONS: [&str; 4] = [
    "Lakukan pemupukan pada area dengan skor kesehatan rendah",
    "Tingkatkan frekuensi monitoring pada pohon dengan status warning",
    "Pertimbangkan penggantian pohon dengan produktivitas rendah",
    "Optimalisasi jadwal panen berdasarkan prediksi buah matang",
];

/// Projection constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub red_fruit_growth: f64,
    pub black_fruit_growth: f64,
    pub confidence: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            red_fruit_growth: 1.15,
            black_fruit_growth: 1.08,
            confidence: 0.87,
        }
    }
}

/// Projected fruit counts for the next period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YieldPrediction {
    pub red_fruit: u64,
    pub black_fruit: u64,
    pub total_fruit: u64,
    pub confidence: f64,
}

/// Projects next-period fruit counts from a recent census summary.
pub fn predict_yield(summary: &CensusSummary, config: &PredictionConfig) -> YieldPrediction {
    let red_fruit = project(summary.red_fruit, config.red_fruit_growth);
    let black_fruit = project(summary.black_fruit, config.black_fruit_growth);
    YieldPrediction {
        red_fruit,
        black_fruit,
        total_fruit: red_fruit + black_fruit,
        confidence: config.confidence,
    }
}

/// Static recommendation list, in display order.
pub fn recommendations() -> Vec<String> {
    RECOMMENDATIONS.iter().map(|value| value.to_string()).collect()
}

/// `floor(count * growth)` evaluated on the shortest decimal form of
/// `growth`, so `200 * 1.15` is 230 rather than the binary 229.999...
fn project(count: u64, growth: f64) -> u64 {
    if !growth.is_finite() || growth <= 0.0 {
        return 0;
    }
    decimal_parts(growth)
        .and_then(|(mantissa, scale)| {
            let product = u128::from(count).checked_mul(mantissa)?;
            Some(u64::try_from(product / scale).unwrap_or(u64::MAX))
        })
        .unwrap_or_else(|| (count as f64 * growth).floor() as u64)
}

/// Splits a positive float into `(mantissa, 10^fraction_digits)` using its
/// shortest round-trip representation. `None` when it does not fit `u128`.
fn decimal_parts(value: f64) -> Option<(u128, u128)> {
    let text = value.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let mantissa = format!("{whole}{fraction}").parse::<u128>().ok()?;
    let scale = 10u128.checked_pow(u32::try_from(fraction.len()).ok()?)?;
    Some((mantissa, scale))
}
