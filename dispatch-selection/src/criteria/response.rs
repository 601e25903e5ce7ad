use super::Curve;
use crate::Score;

/// Providers that take an hour or more to respond get no credit.
pub const CUTOFF_MINUTES: f64 = 60.0;
const DECAY_MINUTES: f64 = 15.0;

pub const CURVE: Curve = Curve {
    name: "responseTime",
    unit: "minutes",
    formula: "100 * e^(-minutes / 15), 100 at 0 minutes, 0 at 60 minutes and beyond",
};

pub fn score(minutes: f64) -> Score {
    if minutes <= 0.0 {
        return Score::MAX;
    }
    if minutes >= CUTOFF_MINUTES {
        return Score::ZERO;
    }
    Score::saturating(100.0 * (-minutes / DECAY_MINUTES).exp())
}
