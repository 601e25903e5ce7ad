use arrayvec::ArrayVec;
use dispatch_selection::{criteria::weighted_sum_model, geo::GeoPoint, Candidate, Ranked, Score};
use ordered_float::NotNan;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    info::AlgorithmInfo, DispatchWeights, FactorScores, FieldError, MetricPolicy, Order,
    ProfileScore, Provider, ProviderMetrics, ProviderScore, RankingResult,
};

/// Distance assumed for profile scores, which have no order to measure against.
pub const PROFILE_DISTANCE_KM: f64 = 10.0;

/// Reason a provider is left out of a ranking.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Ineligible {
    #[error("provider is unavailable")]
    Unavailable,
    #[error("user role is {0:?}, not a provider")]
    NotProvider(String),
    #[error("no usable position: {0}")]
    Location(FieldError),
    #[error("malformed metric: {0}")]
    Metric(FieldError),
}

/// Scores and ranks providers for orders.
///
/// The engine holds only its configuration, so one value can serve any number of concurrent
/// dispatch requests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DispatchEngine {
    weights: DispatchWeights,
    metric_policy: MetricPolicy,
}

struct ProviderCandidate<'p> {
    provider: &'p Provider,
    distance_km: NotNan<f64>,
    factors: FactorScores,
    score: Score,
}

impl<'p> Candidate for ProviderCandidate<'p> {
    type Id = &'p str;
    fn id(&self) -> Self::Id {
        &self.provider.id
    }
    fn score(&self) -> Score {
        self.score
    }
    fn tie_break(&self) -> NotNan<f64> {
        self.distance_km
    }
}

impl DispatchEngine {
    pub fn new(weights: DispatchWeights) -> Self {
        Self {
            weights,
            metric_policy: MetricPolicy::default(),
        }
    }

    pub fn with_metric_policy(self, metric_policy: MetricPolicy) -> Self {
        Self {
            metric_policy,
            ..self
        }
    }

    pub fn weights(&self) -> &DispatchWeights {
        &self.weights
    }

    pub fn metric_policy(&self) -> MetricPolicy {
        self.metric_policy
    }

    /// Rank every eligible provider for the order, best first.
    ///
    /// A provider is eligible when it is available, has the provider role, and has a usable
    /// position (and, under [`MetricPolicy::Strict`], well-formed metrics). Ineligible providers
    /// are left out rather than scored as zero. Equal dispatch scores are ordered by ascending
    /// distance, then by provider id. If the order itself has no usable position, the ranking is
    /// empty.
    pub fn rank_providers_for_order<'p>(
        &self,
        order: &Order,
        providers: &'p [Provider],
    ) -> Vec<RankingResult<'p>> {
        let candidates = self.candidates(order, providers);
        dispatch_selection::rank(&candidates)
            .into_iter()
            .map(into_ranking_result)
            .collect()
    }

    /// The top ranked provider, or `None` when no provider is eligible.
    pub fn best_provider_for_order<'p>(
        &self,
        order: &Order,
        providers: &'p [Provider],
    ) -> Option<RankingResult<'p>> {
        self.top_providers_for_order::<1>(order, providers)
            .into_iter()
            .next()
    }

    /// Up to `LIMIT` of the top ranked providers, in rank order.
    pub fn top_providers_for_order<'p, const LIMIT: usize>(
        &self,
        order: &Order,
        providers: &'p [Provider],
    ) -> ArrayVec<RankingResult<'p>, LIMIT> {
        let candidates = self.candidates(order, providers);
        dispatch_selection::select_top::<_, _, LIMIT>(&candidates)
            .into_iter()
            .map(into_ranking_result)
            .collect()
    }

    /// Score one provider against an order without ranking.
    ///
    /// Availability and role are not checked. When either position is unusable the score is zero
    /// with an infinite distance and `located` is false. Under [`MetricPolicy::Strict`] a
    /// malformed metric also yields the zero score, with `located` still true.
    pub fn score_provider(&self, order: &Order, provider: &Provider) -> ProviderScore {
        let located = order.location().and_then(|origin| {
            let position = provider.location()?;
            Ok((origin, position))
        });
        let (origin, position) = match located {
            Ok(points) => points,
            Err(err) => {
                debug!(order = %order.id, provider = %provider.id, %err, "scoring unlocated provider as 0");
                return ProviderScore {
                    score: Score::ZERO,
                    factors: FactorScores::UNLOCATED,
                    located: false,
                };
            }
        };
        match provider.metrics(self.metric_policy) {
            Ok(metrics) => {
                let factors = FactorScores::new(origin.distance_km(&position).into_inner(), &metrics);
                ProviderScore {
                    score: self.aggregate(&factors),
                    factors,
                    located: true,
                }
            }
            Err(err) => {
                debug!(provider = %provider.id, %err, "scoring provider with malformed metric as 0");
                ProviderScore {
                    score: Score::ZERO,
                    factors: FactorScores {
                        distance: origin.distance_km(&position).into_inner(),
                        ..FactorScores::UNLOCATED
                    },
                    located: true,
                }
            }
        }
    }

    /// Score a provider at [`PROFILE_DISTANCE_KM`], with no order involved. Metrics that fail
    /// to parse count as 0 regardless of the metric policy.
    pub fn profile_score(&self, provider: &Provider) -> ProfileScore {
        let metrics = provider
            .metrics(self.metric_policy)
            .or_else(|_| provider.metrics(MetricPolicy::DefaultToZero))
            .unwrap_or_default();
        let factors = FactorScores::new(PROFILE_DISTANCE_KM, &metrics);
        ProfileScore(self.aggregate(&factors))
    }

    /// Describe the active weights and curves.
    pub fn algorithm_info(&self) -> AlgorithmInfo {
        AlgorithmInfo::new(&self.weights)
    }

    /// Check whether a provider would be ranked, independent of any order.
    pub fn eligibility(
        &self,
        provider: &Provider,
    ) -> Result<(GeoPoint, ProviderMetrics), Ineligible> {
        if !provider.availability {
            return Err(Ineligible::Unavailable);
        }
        if !provider.is_provider() {
            return Err(Ineligible::NotProvider(provider.role.clone()));
        }
        let position = provider.location().map_err(Ineligible::Location)?;
        let metrics = provider
            .metrics(self.metric_policy)
            .map_err(Ineligible::Metric)?;
        Ok((position, metrics))
    }

    fn aggregate(&self, factors: &FactorScores) -> Score {
        weighted_sum_model(self.weights.alternatives(factors)).rounded()
    }

    fn candidates<'p>(
        &self,
        order: &Order,
        providers: &'p [Provider],
    ) -> Vec<ProviderCandidate<'p>> {
        let origin = match order.location() {
            Ok(origin) => origin,
            Err(err) => {
                warn!(order = %order.id, %err, "order has no usable position, nothing to rank");
                return Vec::new();
            }
        };
        providers
            .iter()
            .filter_map(|provider| match self.candidate(origin, provider) {
                Ok(candidate) => Some(candidate),
                Err(reason) => {
                    trace!(provider = %provider.id, %reason, "provider excluded");
                    None
                }
            })
            .collect()
    }

    fn candidate<'p>(
        &self,
        origin: GeoPoint,
        provider: &'p Provider,
    ) -> Result<ProviderCandidate<'p>, Ineligible> {
        let (position, metrics) = self.eligibility(provider)?;
        let tie_break = origin.distance_km(&position);
        let distance_km = tie_break.into_inner();
        let factors = FactorScores::new(distance_km, &metrics);
        let score = self.aggregate(&factors);
        debug!(
            provider = %provider.id,
            %score,
            distance_km,
            distance = %factors.distance_score,
            trust = %factors.trust_score,
            network = %factors.network_score,
            device = %factors.device_score,
            response = %factors.response_score,
            "scored provider"
        );
        Ok(ProviderCandidate {
            provider,
            distance_km: tie_break,
            factors,
            score,
        })
    }
}

fn into_ranking_result<'p>(ranked: Ranked<&ProviderCandidate<'p>>) -> RankingResult<'p> {
    RankingResult {
        provider: ranked.candidate.provider,
        dispatch_score: ranked.score,
        factors: ranked.candidate.factors,
        rank: ranked.rank,
    }
}
