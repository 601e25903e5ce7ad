use dispatch_selection::{
    criteria::{self, Alternative, Curve},
    Score, Weight,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FactorScores;

/// Allowed deviation of the weight sum from 1.0.
pub const SUM_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    Distance,
    TrustScore,
    NetworkSpeed,
    DevicePerformance,
    ResponseTime,
}

impl Factor {
    pub const ALL: [Self; 5] = [
        Self::Distance,
        Self::TrustScore,
        Self::NetworkSpeed,
        Self::DevicePerformance,
        Self::ResponseTime,
    ];

    pub fn name(&self) -> &'static str {
        self.curve().name
    }

    pub fn curve(&self) -> &'static Curve {
        match self {
            Self::Distance => &criteria::distance::CURVE,
            Self::TrustScore => &criteria::trust::CURVE,
            Self::NetworkSpeed => &criteria::network::CURVE,
            Self::DevicePerformance => &criteria::device::CURVE,
            Self::ResponseTime => &criteria::response::CURVE,
        }
    }

    /// Map a raw metric onto this factor's curve.
    pub fn normalize(&self, raw: f64) -> Score {
        match self {
            Self::Distance => criteria::distance::score(raw),
            Self::TrustScore => criteria::trust::score(raw),
            Self::NetworkSpeed => criteria::network::score(raw),
            Self::DevicePerformance => criteria::device::score(raw),
            Self::ResponseTime => criteria::response::score(raw),
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight for {factor} must be a finite non-negative number, got {value}")]
    Invalid { factor: Factor, value: f64 },
    #[error("weights must sum to 1.0, got {sum}")]
    Sum { sum: f64 },
}

/// Relative importance of each factor in the composite dispatch score. Weights are non-negative
/// and sum to 1.0, which keeps the composite score within [0, 100].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawWeights", into = "RawWeights")]
pub struct DispatchWeights {
    distance: Weight,
    trust_score: Weight,
    network_speed: Weight,
    device_performance: Weight,
    response_time: Weight,
}

impl DispatchWeights {
    pub fn new(
        distance: f64,
        trust_score: f64,
        network_speed: f64,
        device_performance: f64,
        response_time: f64,
    ) -> Result<Self, WeightsError> {
        let weight = |factor, value| Weight::new(value).ok_or(WeightsError::Invalid { factor, value });
        let weights = Self {
            distance: weight(Factor::Distance, distance)?,
            trust_score: weight(Factor::TrustScore, trust_score)?,
            network_speed: weight(Factor::NetworkSpeed, network_speed)?,
            device_performance: weight(Factor::DevicePerformance, device_performance)?,
            response_time: weight(Factor::ResponseTime, response_time)?,
        };
        let sum: f64 = Factor::ALL.iter().map(|f| weights.get(*f).as_f64()).sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(WeightsError::Sum { sum });
        }
        Ok(weights)
    }

    pub fn get(&self, factor: Factor) -> Weight {
        match factor {
            Factor::Distance => self.distance,
            Factor::TrustScore => self.trust_score,
            Factor::NetworkSpeed => self.network_speed,
            Factor::DevicePerformance => self.device_performance,
            Factor::ResponseTime => self.response_time,
        }
    }

    /// Pair each factor score with its weight.
    pub fn alternatives(&self, factors: &FactorScores) -> [Alternative; 5] {
        Factor::ALL.map(|factor| Alternative {
            score: factors.get(factor),
            weight: self.get(factor),
        })
    }
}

impl Default for DispatchWeights {
    /// Proximity matters most, then reputation and streaming bandwidth.
    fn default() -> Self {
        Self {
            distance: Weight::from_percent(35),
            trust_score: Weight::from_percent(25),
            network_speed: Weight::from_percent(20),
            device_performance: Weight::from_percent(10),
            response_time: Weight::from_percent(10),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawWeights {
    distance: f64,
    trust_score: f64,
    network_speed: f64,
    device_performance: f64,
    response_time: f64,
}

impl TryFrom<RawWeights> for DispatchWeights {
    type Error = WeightsError;
    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Self::new(
            raw.distance,
            raw.trust_score,
            raw.network_speed,
            raw.device_performance,
            raw.response_time,
        )
    }
}

impl From<DispatchWeights> for RawWeights {
    fn from(weights: DispatchWeights) -> Self {
        Self {
            distance: weights.distance.as_f64(),
            trust_score: weights.trust_score.as_f64(),
            network_speed: weights.network_speed.as_f64(),
            device_performance: weights.device_performance.as_f64(),
            response_time: weights.response_time.as_f64(),
        }
    }
}
