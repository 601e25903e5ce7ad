use dispatch_selection::num::assert_within;
use proptest::{prelude::prop, prop_assert, prop_assert_eq, prop_compose, proptest};

use crate::*;

fn order(latitude: &str, longitude: &str) -> Order {
    Order {
        id: "order-1".to_owned(),
        latitude: latitude.to_owned(),
        longitude: longitude.to_owned(),
        status: "open".to_owned(),
    }
}

fn nyc_order() -> Order {
    order("40.7128", "-74.0060")
}

fn provider(
    id: &str,
    position: Option<(&str, &str)>,
    trust: &str,
    network: &str,
    device: &str,
    response: f64,
) -> Provider {
    Provider {
        id: id.to_owned(),
        role: PROVIDER_ROLE.to_owned(),
        availability: true,
        current_latitude: position.map(|(lat, _)| lat.to_owned()),
        current_longitude: position.map(|(_, lon)| lon.to_owned()),
        trust_score: Some(trust.to_owned()),
        network_speed: Some(network.to_owned()),
        device_performance: Some(device.to_owned()),
        response_time: Some(response),
    }
}

fn ids<'p>(rankings: &[RankingResult<'p>]) -> Vec<&'p str> {
    rankings.iter().map(|r| r.provider.id.as_str()).collect()
}

/// Mixed pool around the NYC order: two eligible providers ~1 km and ~20 km out, plus one of
/// each kind of ineligible provider.
fn pool() -> Vec<Provider> {
    vec![
        provider("far", Some(("40.8928", "-74.0060")), "5.0", "60", "95", 1.0),
        Provider {
            availability: false,
            ..provider("offline", Some(("40.7128", "-74.0060")), "5.0", "60", "95", 0.0)
        },
        Provider {
            role: "user".to_owned(),
            ..provider("customer", Some(("40.7128", "-74.0060")), "5.0", "60", "95", 0.0)
        },
        provider("unlocated", None, "5.0", "60", "95", 0.0),
        provider("near", Some(("40.7228", "-74.0060")), "4.0", "30", "70", 3.0),
        provider("garbled", Some(("north", "-74.0060")), "5.0", "60", "95", 0.0),
    ]
}

#[test]
fn golden_scenario() {
    let order = nyc_order();
    let provider = provider("p1", Some(("40.7128", "-74.0060")), "5.0", "60", "90", 2.0);
    let result = DispatchEngine::default().score_provider(&order, &provider);

    assert!(result.located);
    assert_eq!(result.factors.distance, 0.0);
    assert_eq!(result.factors.distance_score, Score::MAX);
    assert_eq!(result.factors.trust_score, Score::MAX);
    assert_eq!(result.factors.network_score, Score::MAX);
    assert_eq!(result.factors.device_score.as_f64(), 90.0);
    assert_within(result.factors.response_score.as_f64(), 87.5173, 1e-4);
    assert_eq!(result.score.as_f64(), 97.75);
}

#[test]
fn perfect_provider_scores_100() {
    let provider = provider("p1", Some(("40.7128", "-74.0060")), "5.0", "50", "100", 0.0);
    let result = DispatchEngine::default().score_provider(&nyc_order(), &provider);
    assert_eq!(result.score, Score::MAX);
    assert_eq!(result.score.to_string(), "100.00");
}

#[test]
fn ranking_excludes_ineligible_providers() {
    let providers = pool();
    let rankings = rank_providers_for_order(&nyc_order(), &providers);

    assert_eq!(ids(&rankings), vec!["near", "far"]);
    assert_eq!(rankings[0].rank, 1);
    assert_eq!(rankings[1].rank, 2);
    assert_eq!(rankings[0].dispatch_score.as_f64(), 80.28);
    assert_eq!(rankings[1].dispatch_score.as_f64(), 68.58);
    assert_within(rankings[0].factors.distance, 1.112, 1e-3);
    assert_within(rankings[1].factors.distance, 20.015, 1e-3);
}

#[test]
fn best_provider_is_first_ranked() {
    let providers = pool();
    let order = nyc_order();
    let rankings = rank_providers_for_order(&order, &providers);
    assert_eq!(best_provider_for_order(&order, &providers), rankings.first().copied());

    assert_eq!(best_provider_for_order(&order, &[]), None);
    let ineligible: Vec<Provider> = providers
        .into_iter()
        .filter(|p| p.id != "near" && p.id != "far")
        .collect();
    assert_eq!(best_provider_for_order(&order, &ineligible), None);
}

#[test]
fn top_providers_are_ranking_prefix() {
    let providers = pool();
    let engine = DispatchEngine::default();
    let order = nyc_order();

    let top: ArrayVec<RankingResult, 1> = engine.top_providers_for_order(&order, &providers);
    assert_eq!(ids(&top), vec!["near"]);
    let top: ArrayVec<RankingResult, 5> = engine.top_providers_for_order(&order, &providers);
    assert_eq!(&top[..], &engine.rank_providers_for_order(&order, &providers)[..]);
}

#[test]
fn equal_scores_prefer_closer_then_lower_id() {
    let providers = [
        provider("c", Some(("40.712801", "-74.0060")), "4.0", "30", "70", 0.0),
        provider("b", Some(("40.7128", "-74.0060")), "4.0", "30", "70", 0.0),
        provider("a", Some(("40.712801", "-74.0060")), "4.0", "30", "70", 0.0),
    ];
    let rankings = rank_providers_for_order(&nyc_order(), &providers);
    assert!(rankings.iter().all(|r| r.dispatch_score.as_f64() == 85.78));
    assert_eq!(ids(&rankings), vec!["b", "a", "c"]);

    let reversed: Vec<Provider> = providers.iter().rev().cloned().collect();
    assert_eq!(ids(&rank_providers_for_order(&nyc_order(), &reversed)), vec!["b", "a", "c"]);
}

#[test]
fn unusable_order_position_ranks_nobody() {
    let providers = pool();
    assert!(rank_providers_for_order(&order("", "-74.0060"), &providers).is_empty());
    assert!(rank_providers_for_order(&order("95.0", "-74.0060"), &providers).is_empty());
    assert_eq!(best_provider_for_order(&order("x", "y"), &providers), None);
}

#[test]
fn antipodal_provider_is_ranked() {
    let order = order("87.5", "100.1");
    let providers = [provider("antipode", Some(("-87.5", "-79.9")), "5.0", "60", "95", 0.0)];
    let engine = DispatchEngine::default();
    assert!(engine.eligibility(&providers[0]).is_ok());

    let rankings = engine.rank_providers_for_order(&order, &providers);
    assert_eq!(ids(&rankings), ["antipode"]);
    assert_within(rankings[0].factors.distance, 20015.09, 0.01);
    assert_eq!(rankings[0].factors.distance_score, Score::ZERO);
    assert_eq!(rankings[0].dispatch_score.as_f64(), 64.5);

    let single = engine.score_provider(&order, &providers[0]);
    assert!(single.located);
    assert!(single.factors.distance.is_finite());
    assert_eq!(single.score, rankings[0].dispatch_score);
}

#[test]
fn single_score_without_position_is_zero() {
    let engine = DispatchEngine::default();
    let unlocated = provider("p1", None, "5.0", "60", "95", 0.0);
    let result = engine.score_provider(&nyc_order(), &unlocated);
    assert_eq!(
        result,
        ProviderScore {
            score: Score::ZERO,
            factors: FactorScores::UNLOCATED,
            located: false,
        }
    );
    assert!(result.factors.distance.is_infinite());

    let located = provider("p2", Some(("40.7128", "-74.0060")), "5.0", "60", "95", 0.0);
    assert!(!engine.score_provider(&order("", ""), &located).located);
}

#[test]
fn single_score_ignores_availability_and_role() {
    let engine = DispatchEngine::default();
    let offline = Provider {
        availability: false,
        role: "user".to_owned(),
        ..provider("p1", Some(("40.7228", "-74.0060")), "4.0", "30", "70", 3.0)
    };
    assert_eq!(engine.score_provider(&nyc_order(), &offline).score.as_f64(), 80.28);
    assert_eq!(
        engine.eligibility(&offline).unwrap_err(),
        Ineligible::Unavailable
    );
}

#[test]
fn malformed_metrics_follow_policy() {
    let providers = [provider("p1", Some(("40.7228", "-74.0060")), "very trusted", "30", "70", 3.0)];
    let order = nyc_order();

    let lenient = DispatchEngine::default();
    let rankings = lenient.rank_providers_for_order(&order, &providers);
    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0].factors.trust_score, Score::ZERO);
    assert_eq!(rankings[0].dispatch_score.as_f64(), 60.28);

    let strict = DispatchEngine::default().with_metric_policy(MetricPolicy::Strict);
    assert!(strict.rank_providers_for_order(&order, &providers).is_empty());
    assert!(matches!(
        strict.eligibility(&providers[0]),
        Err(Ineligible::Metric(FieldError::Unparseable { field: "trustScore", .. }))
    ));
    let single = strict.score_provider(&order, &providers[0]);
    assert!(single.located);
    assert_eq!(single.score, Score::ZERO);
    assert_within(single.factors.distance, 1.112, 1e-3);
}

#[test]
fn missing_metrics_score_as_zero() {
    let bare = Provider {
        id: "p1".to_owned(),
        role: PROVIDER_ROLE.to_owned(),
        availability: true,
        current_latitude: Some("40.7128".to_owned()),
        current_longitude: Some("-74.0060".to_owned()),
        ..Provider::default()
    };
    let strict = DispatchEngine::default().with_metric_policy(MetricPolicy::Strict);
    let rankings = strict.rank_providers_for_order(&nyc_order(), std::slice::from_ref(&bare));
    assert_eq!(rankings.len(), 1);
    // distance 35 + response 10
    assert_eq!(rankings[0].dispatch_score.as_f64(), 45.0);
}

#[test]
fn profile_score_assumes_average_distance() {
    let engine = DispatchEngine::default();
    let provider = provider("p1", None, "4.5", "25", "80", 5.0);
    assert_eq!(engine.profile_score(&provider).value().as_f64(), 62.76);

    let garbled = Provider {
        trust_score: Some("n/a".to_owned()),
        ..provider.clone()
    };
    let strict = engine.with_metric_policy(MetricPolicy::Strict);
    assert_eq!(
        strict.profile_score(&garbled),
        engine.profile_score(&garbled)
    );
}

#[test]
fn injected_weights_change_ranking() {
    let providers = pool();
    let order = nyc_order();
    // Reputation and equipment only: the better equipped provider 20 km out wins.
    let weights = DispatchWeights::new(0.0, 0.5, 0.3, 0.2, 0.0).unwrap();
    let engine = DispatchEngine::new(weights);
    assert_eq!(ids(&engine.rank_providers_for_order(&order, &providers)), vec!["far", "near"]);

    let proximity = DispatchEngine::new(DispatchWeights::new(1.0, 0.0, 0.0, 0.0, 0.0).unwrap());
    let best = proximity.best_provider_for_order(&order, &providers).unwrap();
    assert_eq!(best.provider.id, "near");
    assert_eq!(best.dispatch_score.as_f64(), 89.48);
}

#[test]
fn weights_validation() {
    assert_eq!(
        DispatchWeights::default(),
        DispatchWeights::new(0.35, 0.25, 0.20, 0.10, 0.10).unwrap()
    );
    assert_eq!(
        DispatchWeights::new(0.35, -0.25, 0.20, 0.10, 0.60),
        Err(WeightsError::Invalid {
            factor: Factor::TrustScore,
            value: -0.25
        })
    );
    assert!(matches!(
        DispatchWeights::new(0.35, 0.25, 0.20, 0.10, f64::NAN),
        Err(WeightsError::Invalid { factor: Factor::ResponseTime, .. })
    ));
    assert!(matches!(
        DispatchWeights::new(0.5, 0.5, 0.5, 0.0, 0.0),
        Err(WeightsError::Sum { .. })
    ));
}

#[test]
fn weights_from_json() {
    let weights: DispatchWeights = serde_json::from_str(
        r#"{"distance":0.4,"trustScore":0.3,"networkSpeed":0.1,"devicePerformance":0.1,"responseTime":0.1}"#,
    )
    .unwrap();
    assert_eq!(weights.get(Factor::Distance).as_f64(), 0.4);
    assert_eq!(weights.get(Factor::TrustScore).as_f64(), 0.3);

    let err = serde_json::from_str::<DispatchWeights>(
        r#"{"distance":0.9,"trustScore":0.3,"networkSpeed":0.1,"devicePerformance":0.1,"responseTime":0.1}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("sum to 1.0"));

    let json = serde_json::to_string(&DispatchWeights::default()).unwrap();
    let back: DispatchWeights = serde_json::from_str(&json).unwrap();
    assert_eq!(back, DispatchWeights::default());
}

#[test]
fn records_from_json() {
    let provider: Provider = serde_json::from_str(
        r#"{
            "id": "p1",
            "role": "provider",
            "availability": true,
            "currentLatitude": "40.7128000",
            "currentLongitude": "-74.0060000",
            "trustScore": "4.80",
            "networkSpeed": "75.00",
            "devicePerformance": "92.00",
            "responseTime": 4
        }"#,
    )
    .unwrap();
    assert_eq!(provider.trust_score.as_deref(), Some("4.80"));
    assert_eq!(provider.response_time, Some(4.0));

    let order: Order = serde_json::from_str(
        r#"{"id":"o1","latitude":"40.7128000","longitude":"-74.0060000","status":"pending"}"#,
    )
    .unwrap();
    let ranking = best_provider_for_order(&order, std::slice::from_ref(&provider)).unwrap();
    let json = serde_json::to_value(ranking).unwrap();
    assert_eq!(json["rank"], 1);
    assert_eq!(json["provider"]["id"], "p1");
    assert_eq!(json["factors"]["distance"], 0.0);
    assert_eq!(json["factors"]["distanceScore"], 100.0);
    assert!(json["dispatchScore"].as_f64().unwrap() > 90.0);
}

#[test]
fn algorithm_info_describes_weights() {
    let info = DispatchEngine::default().algorithm_info();
    let percents: Vec<(&str, u32)> = info
        .factors
        .iter()
        .map(|f| (f.factor.name(), f.percent))
        .collect();
    assert_eq!(
        percents,
        vec![
            ("distance", 35),
            ("trustScore", 25),
            ("networkSpeed", 20),
            ("devicePerformance", 10),
            ("responseTime", 10),
        ]
    );
    assert_eq!(info.profile_distance_km, PROFILE_DISTANCE_KM);

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["factors"][0]["factor"], "distance");
    assert_eq!(json["factors"][0]["curve"]["unit"], "km");
    assert_eq!(json["factors"][2]["weight"], 0.2);
}

prop_compose! {
    fn random_provider(id: usize)(
        available in prop::bool::weighted(0.8),
        is_provider in prop::bool::weighted(0.9),
        offset in prop::option::weighted(0.9, (-0.5_f64..0.5, -0.5_f64..0.5)),
        trust in 0.0_f64..=5.0,
        network in 0.0_f64..120.0,
        device in 0.0_f64..=100.0,
        response in 0.0_f64..90.0,
    ) -> Provider {
        Provider {
            id: format!("provider-{id:02}"),
            role: if is_provider { PROVIDER_ROLE } else { "user" }.to_owned(),
            availability: available,
            current_latitude: offset.map(|(lat, _)| format!("{:.6}", 40.7128 + lat)),
            current_longitude: offset.map(|(_, lon)| format!("{:.6}", -74.0060 + lon)),
            trust_score: Some(format!("{trust:.2}")),
            network_speed: Some(format!("{network:.2}")),
            device_performance: Some(format!("{device:.2}")),
            response_time: Some(response.round()),
        }
    }
}
prop_compose! {
    fn providers()(len in 0..24_usize)(
        providers in (0..len).map(random_provider).collect::<Vec<_>>()
    ) -> Vec<Provider> {
        providers
    }
}

proptest! {
    #[test]
    fn ranking_invariants(providers in providers()) {
        let engine = DispatchEngine::default();
        let order = nyc_order();
        let rankings = engine.rank_providers_for_order(&order, &providers);

        let eligible = providers.iter().filter(|p| engine.eligibility(p).is_ok()).count();
        prop_assert_eq!(rankings.len(), eligible);
        for (index, r) in rankings.iter().enumerate() {
            prop_assert_eq!(r.rank, index + 1);
            prop_assert!(engine.eligibility(r.provider).is_ok());
            let score = r.dispatch_score.as_f64();
            prop_assert!((0.0..=100.0).contains(&score));
            prop_assert_eq!(score, (score * 100.0).round() / 100.0);
            prop_assert_eq!(engine.score_provider(&order, r.provider).score, r.dispatch_score);
        }
        for pair in rankings.windows(2) {
            prop_assert!(pair[0].dispatch_score >= pair[1].dispatch_score);
        }
        prop_assert_eq!(engine.best_provider_for_order(&order, &providers), rankings.first().copied());
        prop_assert_eq!(engine.rank_providers_for_order(&order, &providers), rankings);
    }
}
