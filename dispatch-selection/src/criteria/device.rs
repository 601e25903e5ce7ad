use super::Curve;
use crate::Score;

pub const CURVE: Curve = Curve {
    name: "devicePerformance",
    unit: "benchmark (0-100)",
    formula: "value clamped to 0-100",
};

/// Device benchmarks are already on the score scale.
pub fn score(value: f64) -> Score {
    Score::saturating(value)
}
