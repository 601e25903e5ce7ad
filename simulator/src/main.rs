use std::{collections::BTreeMap, f64::consts::PI, fs::File, io::stdin, path::PathBuf, time::Instant};

use anyhow::Context as _;
use clap::Parser;
use provider_dispatch::{
    DispatchEngine, DispatchWeights, MetricPolicy, Order, Provider, RankingResult, PROVIDER_ROLE,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const HEADER: &str = "id,role,availability,latitude,longitude,trust_score,network_speed,device_performance,response_time";
/// km per degree of latitude
const KM_PER_DEGREE: f64 = 111.32;

#[derive(Parser, Debug)]
#[command(
    name = "dispatch-simulator",
    about = "Rank a provider pool (CSV on stdin) against randomly placed orders"
)]
struct Args {
    /// JSON file with dispatch weights. Defaults to the built-in weights.
    #[arg(short, long)]
    weights: Option<PathBuf>,

    /// Number of orders to simulate
    #[arg(short, long, default_value_t = 10_000)]
    orders: usize,

    /// RNG seed, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 40.7128, allow_hyphen_values = true)]
    center_lat: f64,

    #[arg(long, default_value_t = -74.0060, allow_hyphen_values = true)]
    center_lon: f64,

    /// Orders are placed uniformly within this radius of the centre
    #[arg(long, default_value_t = 25.0)]
    radius_km: f64,

    /// Number of top-ranked providers notified per order
    #[arg(long, default_value_t = 3)]
    top: usize,

    /// Exclude providers with malformed metrics instead of scoring them as 0
    #[arg(long)]
    strict: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Default)]
struct ProviderTally {
    best: u64,
    notified: u64,
    total_score: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let weights = match &args.weights {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            serde_json::from_reader::<_, DispatchWeights>(file)
                .with_context(|| format!("invalid weights in {}", path.display()))?
        }
        None => DispatchWeights::default(),
    };
    let policy = if args.strict {
        MetricPolicy::Strict
    } else {
        MetricPolicy::DefaultToZero
    };
    let engine = DispatchEngine::new(weights).with_metric_policy(policy);

    let mut providers: Vec<Provider> = Vec::new();
    for (index, line) in stdin().lines().enumerate() {
        let line = line.context("read stdin")?;
        if line.trim().is_empty() || line.starts_with(HEADER) {
            continue;
        }
        match parse_provider(&line) {
            Some(provider) => providers.push(provider),
            None => warn!(line = index + 1, "skipping malformed provider row"),
        }
    }
    info!(providers = providers.len(), "loaded provider pool");
    let eligible = providers
        .iter()
        .filter(|p| match engine.eligibility(p) {
            Ok(_) => true,
            Err(reason) => {
                debug!(provider = %p.id, %reason, "provider will never be ranked");
                false
            }
        })
        .count();
    info!(eligible, "eligible providers");

    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut tallies: BTreeMap<&str, ProviderTally> = BTreeMap::new();
    let mut total_ranking_μs = 0;
    let mut unmatched: u64 = 0;
    let mut total_best_score = 0.0;
    let mut total_best_distance_km = 0.0;

    for order_index in 0..args.orders {
        let order = random_order(&mut rng, order_index, &args);

        let t0 = Instant::now();
        let rankings: Vec<RankingResult> = engine.rank_providers_for_order(&order, &providers);
        total_ranking_μs += Instant::now().duration_since(t0).as_micros();

        tally_order(&mut tallies, &rankings, args.top);
        match rankings.first() {
            Some(best) => {
                total_best_score += best.dispatch_score.as_f64();
                total_best_distance_km += best.factors.distance;
            }
            None => unmatched += 1,
        }
    }

    let orders = args.orders.max(1) as f64;
    let matched = (args.orders as u64 - unmatched).max(1) as f64;
    println!("avg_ranking_μs: {:.2}", total_ranking_μs as f64 / orders);
    println!("match_rate: {:.4}", 1.0 - (unmatched as f64 / orders));
    println!("avg_best_score: {:.2}", total_best_score / matched);
    println!("avg_best_distance_km: {:.2}", total_best_distance_km / matched);
    println!("id,best,notified,avg_score");
    for (id, tally) in &tallies {
        println!(
            "{id},{},{},{:.2}",
            tally.best,
            tally.notified,
            tally.total_score / orders
        );
    }
    Ok(())
}

/// Every ranked provider accrues its score, the first `top` are notified and the first wins.
fn tally_order<'p>(
    tallies: &mut BTreeMap<&'p str, ProviderTally>,
    rankings: &[RankingResult<'p>],
    top: usize,
) {
    for (index, ranking) in rankings.iter().enumerate() {
        let tally = tallies.entry(ranking.provider.id.as_str()).or_default();
        tally.total_score += ranking.dispatch_score.as_f64();
        if index < top {
            tally.notified += 1;
        }
        if index == 0 {
            tally.best += 1;
        }
    }
}

/// Rows mirror the provider record. Empty fields are absent values.
fn parse_provider(line: &str) -> Option<Provider> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != HEADER.split(',').count() {
        return None;
    }
    let optional = |value: &str| (!value.is_empty()).then(|| value.to_owned());
    Some(Provider {
        id: fields[0].to_owned(),
        role: if fields[1].is_empty() { PROVIDER_ROLE } else { fields[1] }.to_owned(),
        availability: fields[2].parse().ok()?,
        current_latitude: optional(fields[3]),
        current_longitude: optional(fields[4]),
        trust_score: optional(fields[5]),
        network_speed: optional(fields[6]),
        device_performance: optional(fields[7]),
        response_time: match fields[8] {
            "" => None,
            value => Some(value.parse().ok()?),
        },
    })
}

fn random_order(rng: &mut SmallRng, index: usize, args: &Args) -> Order {
    // sqrt keeps the density uniform over the disc
    let distance_km = args.radius_km * rng.gen::<f64>().sqrt();
    let bearing = rng.gen_range(0.0..(2.0 * PI));
    let latitude = args.center_lat + (distance_km * bearing.cos()) / KM_PER_DEGREE;
    let longitude = args.center_lon
        + (distance_km * bearing.sin()) / (KM_PER_DEGREE * args.center_lat.to_radians().cos());
    Order {
        id: format!("order-{index}"),
        latitude: format!("{latitude:.7}"),
        longitude: format!("{longitude:.7}"),
        status: "pending".to_owned(),
    }
}
