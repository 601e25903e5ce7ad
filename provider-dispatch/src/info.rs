use dispatch_selection::{criteria::Curve, Weight};
use serde::Serialize;

use crate::{engine::PROFILE_DISTANCE_KM, DispatchWeights, Factor};

/// Order applied to providers with equal dispatch scores.
pub const TIE_BREAK: &str = "ascending distance, then ascending provider id";

/// Serializable description of how dispatch scores are computed, for transparency displays.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmInfo {
    pub factors: Vec<FactorInfo>,
    pub profile_distance_km: f64,
    pub tie_break: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorInfo {
    pub factor: Factor,
    pub weight: Weight,
    /// Weight as a whole percentage.
    pub percent: u32,
    pub curve: &'static Curve,
}

impl AlgorithmInfo {
    pub fn new(weights: &DispatchWeights) -> Self {
        let factors = Factor::ALL
            .iter()
            .map(|&factor| {
                let weight = weights.get(factor);
                FactorInfo {
                    factor,
                    weight,
                    percent: weight.percent(),
                    curve: factor.curve(),
                }
            })
            .collect();
        Self {
            factors,
            profile_distance_km: PROFILE_DISTANCE_KM,
            tie_break: TIE_BREAK,
        }
    }
}
