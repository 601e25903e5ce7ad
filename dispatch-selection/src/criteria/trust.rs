use super::Curve;
use crate::Score;

/// Top of the rating scale.
pub const MAX_TRUST: f64 = 5.0;

pub const CURVE: Curve = Curve {
    name: "trustScore",
    unit: "rating (0-5)",
    formula: "min(100, trust / 5 * 100)",
};

pub fn score(trust: f64) -> Score {
    Score::saturating((trust / MAX_TRUST) * 100.0)
}
