use super::Curve;
use crate::Score;

/// Minimum usable streaming bandwidth.
pub const MIN_MBPS: f64 = 5.0;
/// Bandwidth that earns a perfect score.
pub const MAX_MBPS: f64 = 50.0;
const MIN_MBPS_SCORE: f64 = 30.0;

pub const CURVE: Curve = Curve {
    name: "networkSpeed",
    unit: "Mbps",
    formula: "0-30 linear below 5 Mbps, 30-100 linear across 5-50 Mbps, 100 at 50 Mbps and above",
};

/// Piecewise linear: a shallow ramp up to the minimum usable speed, then a steeper one to the
/// maximum.
pub fn score(mbps: f64) -> Score {
    if mbps <= 0.0 {
        return Score::ZERO;
    }
    if mbps < MIN_MBPS {
        return Score::saturating((mbps / MIN_MBPS) * MIN_MBPS_SCORE);
    }
    if mbps >= MAX_MBPS {
        return Score::MAX;
    }
    let t = (mbps - MIN_MBPS) / (MAX_MBPS - MIN_MBPS);
    Score::saturating(MIN_MBPS_SCORE + t * (100.0 - MIN_MBPS_SCORE))
}
