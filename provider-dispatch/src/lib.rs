//! Provider dispatch ranking.
//!
//! Given one order and a snapshot of providers, [`DispatchEngine`] scores every eligible provider
//! on five factors (proximity, trust, network speed, device performance and responsiveness),
//! combines them with the configured [`DispatchWeights`], and ranks providers by the resulting
//! dispatch score.
//!
//! | Factor             | Default weight | Curve                                   |
//! |--------------------|----------------|-----------------------------------------|
//! | distance           | 0.35           | `100·e^(-km/10)`, 0 from 50 km          |
//! | trustScore         | 0.25           | `trust / 5 · 100`                       |
//! | networkSpeed       | 0.20           | 0–30 below 5 Mbps, 30–100 up to 50 Mbps |
//! | devicePerformance  | 0.10           | clamped to 0–100                        |
//! | responseTime       | 0.10           | `100·e^(-min/15)`, 0 from 60 minutes    |
//!
//! The engine is a pure function of its inputs. It never mutates records, holds no state beyond
//! its configuration, and never fails: unusable providers are left out of rankings.

mod engine;
pub mod info;
pub mod ingest;
mod records;
#[cfg(test)]
mod test;
pub mod weights;

pub use arrayvec::ArrayVec;
pub use dispatch_selection::Score;
use serde::Serialize;

pub use crate::engine::{DispatchEngine, Ineligible, PROFILE_DISTANCE_KM};
pub use crate::info::AlgorithmInfo;
pub use crate::ingest::{FieldError, MetricPolicy};
pub use crate::records::{Order, Provider, ProviderMetrics, PROVIDER_ROLE};
pub use crate::weights::{DispatchWeights, Factor, WeightsError};

/// Per-factor scores behind a dispatch score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorScores {
    pub distance_score: Score,
    pub trust_score: Score,
    pub network_score: Score,
    pub device_score: Score,
    pub response_score: Score,
    /// Straight-line distance in km. Infinite when either position is unknown.
    pub distance: f64,
}

impl FactorScores {
    pub const UNLOCATED: Self = Self {
        distance_score: Score::ZERO,
        trust_score: Score::ZERO,
        network_score: Score::ZERO,
        device_score: Score::ZERO,
        response_score: Score::ZERO,
        distance: f64::INFINITY,
    };

    pub fn new(distance_km: f64, metrics: &ProviderMetrics) -> Self {
        Self {
            distance_score: Factor::Distance.normalize(distance_km),
            trust_score: Factor::TrustScore.normalize(metrics.trust_score),
            network_score: Factor::NetworkSpeed.normalize(metrics.network_speed_mbps),
            device_score: Factor::DevicePerformance.normalize(metrics.device_performance),
            response_score: Factor::ResponseTime.normalize(metrics.response_time_minutes),
            distance: distance_km,
        }
    }

    pub fn get(&self, factor: Factor) -> Score {
        match factor {
            Factor::Distance => self.distance_score,
            Factor::TrustScore => self.trust_score,
            Factor::NetworkSpeed => self.network_score,
            Factor::DevicePerformance => self.device_score,
            Factor::ResponseTime => self.response_score,
        }
    }
}

/// One entry of a provider ranking for an order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResult<'p> {
    pub provider: &'p Provider,
    pub dispatch_score: Score,
    pub factors: FactorScores,
    /// Starts at 1.
    pub rank: usize,
}

/// Result of scoring a single provider against an order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderScore {
    pub score: Score,
    pub factors: FactorScores,
    /// False when the order or provider position is unusable, in which case `score` is zero and
    /// the provider would be left out of any ranking.
    pub located: bool,
}

/// Provider score at an assumed average distance, for display on the provider's own profile.
/// It does not describe fitness for any real order and is not accepted by dispatch operations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProfileScore(Score);

impl ProfileScore {
    pub fn value(&self) -> Score {
        self.0
    }
}

/// Rank providers for an order using the default weights.
pub fn rank_providers_for_order<'p>(
    order: &Order,
    providers: &'p [Provider],
) -> Vec<RankingResult<'p>> {
    DispatchEngine::default().rank_providers_for_order(order, providers)
}

/// Best provider for an order using the default weights, or `None` if no provider is eligible.
pub fn best_provider_for_order<'p>(
    order: &Order,
    providers: &'p [Provider],
) -> Option<RankingResult<'p>> {
    DispatchEngine::default().best_provider_for_order(order, providers)
}
