use dispatch_selection::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ingest::{check_metric, parse_location, parse_metric, FieldError, MetricPolicy};

/// Role tag a user must carry to be dispatched.
pub const PROVIDER_ROLE: &str = "provider";

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default)]
    pub status: String,
}

impl Order {
    pub fn location(&self) -> Result<GeoPoint, FieldError> {
        parse_location(
            ("latitude", Some(self.latitude.as_str())),
            ("longitude", Some(self.longitude.as_str())),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    pub role: String,
    pub availability: bool,
    #[serde(default)]
    pub current_latitude: Option<String>,
    #[serde(default)]
    pub current_longitude: Option<String>,
    /// Reputation in [0, 5].
    #[serde(default)]
    pub trust_score: Option<String>,
    /// Mbps
    #[serde(default)]
    pub network_speed: Option<String>,
    /// Benchmark in [0, 100].
    #[serde(default)]
    pub device_performance: Option<String>,
    /// Historical average, in minutes.
    #[serde(default)]
    pub response_time: Option<f64>,
}

impl Provider {
    pub fn is_provider(&self) -> bool {
        self.role == PROVIDER_ROLE
    }

    pub fn location(&self) -> Result<GeoPoint, FieldError> {
        parse_location(
            ("currentLatitude", self.current_latitude.as_deref()),
            ("currentLongitude", self.current_longitude.as_deref()),
        )
    }

    pub fn metrics(&self, policy: MetricPolicy) -> Result<ProviderMetrics, FieldError> {
        let resolve = |result: Result<f64, FieldError>| match (result, policy) {
            (Ok(value), _) => Ok(value),
            (Err(err), MetricPolicy::DefaultToZero) => {
                warn!(provider = %self.id, %err, "scoring malformed metric as 0");
                Ok(0.0)
            }
            (Err(err), MetricPolicy::Strict) => Err(err),
        };
        Ok(ProviderMetrics {
            trust_score: resolve(parse_metric("trustScore", self.trust_score.as_deref()))?,
            network_speed_mbps: resolve(parse_metric(
                "networkSpeed",
                self.network_speed.as_deref(),
            ))?,
            device_performance: resolve(parse_metric(
                "devicePerformance",
                self.device_performance.as_deref(),
            ))?,
            response_time_minutes: resolve(check_metric("responseTime", self.response_time))?,
        })
    }
}

/// Provider metrics after parsing. Every value is finite.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProviderMetrics {
    pub trust_score: f64,
    pub network_speed_mbps: f64,
    pub device_performance: f64,
    pub response_time_minutes: f64,
}
