use super::Curve;
use crate::Score;

/// Beyond this distance a provider gets no proximity credit at all.
pub const CUTOFF_KM: f64 = 50.0;
const DECAY_KM: f64 = 10.0;

pub const CURVE: Curve = Curve {
    name: "distance",
    unit: "km",
    formula: "100 * e^(-km / 10), 0 at 50 km and beyond",
};

/// Exponential decay with a hard cutoff. Closer is better.
pub fn score(km: f64) -> Score {
    if km >= CUTOFF_KM {
        return Score::ZERO;
    }
    Score::saturating(100.0 * (-km / DECAY_KM).exp())
}
