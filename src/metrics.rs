//! In-process Prometheus registry.
//!
//! Counters, gauges and histograms keyed by metric name and rendered label
//! set, exported in the Prometheus text format by `GET /metrics`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::database::repository::{StoreHealth, UserRepository};

/// Prometheus client default buckets, in seconds
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const CRUD_OPERATIONS_TOTAL: &str = "crud_operations_total";
pub const DATABASE_CONNECTIONS_ACTIVE: &str = "database_connections_active";
pub const DATABASE_CONNECTIONS_IDLE: &str = "database_connections_idle";
pub const AUTHENTICATION_ATTEMPTS_TOTAL: &str = "authentication_attempts_total";
pub const JWT_TOKENS_GENERATED_TOTAL: &str = "jwt_tokens_generated_total";
pub const ACTIVE_USERS_TOTAL: &str = "active_users_total";

const HELP: &[(&str, &str)] = &[
    (HTTP_REQUESTS_TOTAL, "Total number of HTTP requests"),
    (HTTP_REQUEST_DURATION_SECONDS, "HTTP request duration in seconds"),
    (CRUD_OPERATIONS_TOTAL, "Total number of CRUD operations"),
    (DATABASE_CONNECTIONS_ACTIVE, "Number of active database connections"),
    (DATABASE_CONNECTIONS_IDLE, "Number of idle database connections"),
    (AUTHENTICATION_ATTEMPTS_TOTAL, "Total number of authentication attempts"),
    (JWT_TOKENS_GENERATED_TOTAL, "Total number of JWT tokens generated"),
    (ACTIVE_USERS_TOTAL, "Total number of registered users"),
];

#[derive(Debug, Clone)]
struct Histogram {
    buckets: Vec<u64>,
    count: u64,
    sum: f64,
}

impl Histogram {
    fn new() -> Self {
        Self {
            buckets: vec![0; DEFAULT_BUCKETS.len()],
            count: 0,
            sum: 0.0,
        }
    }

    fn observe(&mut self, value: f64) {
        for (slot, bound) in self.buckets.iter_mut().zip(DEFAULT_BUCKETS.iter()) {
            if value <= *bound {
                *slot += 1;
            }
        }
        self.count += 1;
        self.sum += value;
    }
}

// name -> rendered label set -> value
type Family<T> = BTreeMap<String, BTreeMap<String, T>>;

/// Metrics shared by handlers, middleware and the background collector
#[derive(Default)]
pub struct Metrics {
    counters: RwLock<Family<u64>>,
    gauges: RwLock<Family<f64>>,
    histograms: RwLock<Family<Histogram>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn increment(&self, name: &str, labels: &[(&str, &str)]) {
        let mut counters = self.counters.write().await;
        *counters
            .entry(name.to_string())
            .or_default()
            .entry(format_labels(labels))
            .or_insert(0) += 1;
    }

    pub async fn gauge(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let mut gauges = self.gauges.write().await;
        gauges
            .entry(name.to_string())
            .or_default()
            .insert(format_labels(labels), value);
    }

    pub async fn observe(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let mut histograms = self.histograms.write().await;
        histograms
            .entry(name.to_string())
            .or_default()
            .entry(format_labels(labels))
            .or_insert_with(Histogram::new)
            .observe(value);
    }

    pub async fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.counters
            .read()
            .await
            .get(name)
            .and_then(|series| series.get(&format_labels(labels)))
            .copied()
            .unwrap_or(0)
    }

    pub async fn gauge_value(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.gauges
            .read()
            .await
            .get(name)
            .and_then(|series| series.get(&format_labels(labels)))
            .copied()
    }

    pub async fn record_http(&self, method: &str, path: &str, status: u16, seconds: f64) {
        let status = status.to_string();
        let labels = [("method", method), ("path", path), ("status", status.as_str())];
        self.increment(HTTP_REQUESTS_TOTAL, &labels).await;
        self.observe(HTTP_REQUEST_DURATION_SECONDS, &labels, seconds).await;
    }

    pub async fn record_crud(&self, entity: &str, operation: &str, status: &str) {
        self.increment(
            CRUD_OPERATIONS_TOTAL,
            &[("entity", entity), ("operation", operation), ("status", status)],
        )
        .await;
    }

    pub async fn record_auth_attempt(&self, kind: &str, status: &str) {
        self.increment(AUTHENTICATION_ATTEMPTS_TOTAL, &[("type", kind), ("status", status)])
            .await;
    }

    pub async fn record_token(&self, kind: &str) {
        self.increment(JWT_TOKENS_GENERATED_TOTAL, &[("type", kind)]).await;
    }

    pub async fn set_active_users(&self, count: i64) {
        self.gauge(ACTIVE_USERS_TOTAL, &[], count as f64).await;
    }

    pub async fn sample_store(&self, store: &dyn StoreHealth) {
        let stats = store.pool_stats();
        self.gauge(DATABASE_CONNECTIONS_ACTIVE, &[], stats.active() as f64).await;
        self.gauge(DATABASE_CONNECTIONS_IDLE, &[], stats.idle as f64).await;
    }

    /// Render every series in the Prometheus text exposition format.
    pub async fn export_prometheus(&self) -> String {
        let help: HashMap<&str, &str> = HELP.iter().copied().collect();
        let mut output = String::new();

        for (name, series) in self.counters.read().await.iter() {
            write_header(&mut output, name, help.get(name.as_str()), "counter");
            for (labels, value) in series {
                output.push_str(&format!("{}{} {}\n", name, labels, value));
            }
        }

        for (name, series) in self.gauges.read().await.iter() {
            write_header(&mut output, name, help.get(name.as_str()), "gauge");
            for (labels, value) in series {
                output.push_str(&format!("{}{} {}\n", name, labels, value));
            }
        }

        for (name, series) in self.histograms.read().await.iter() {
            write_header(&mut output, name, help.get(name.as_str()), "histogram");
            for (labels, histogram) in series {
                for (bound, count) in DEFAULT_BUCKETS.iter().zip(histogram.buckets.iter()) {
                    let le = bound.to_string();
                    output.push_str(&format!(
                        "{}_bucket{} {}\n",
                        name,
                        with_label(labels, "le", &le),
                        count
                    ));
                }
                output.push_str(&format!(
                    "{}_bucket{} {}\n",
                    name,
                    with_label(labels, "le", "+Inf"),
                    histogram.count
                ));
                output.push_str(&format!("{}_sum{} {}\n", name, labels, histogram.sum));
                output.push_str(&format!("{}_count{} {}\n", name, labels, histogram.count));
            }
        }

        output
    }
}

fn write_header(output: &mut String, name: &str, help: Option<&&str>, kind: &str) {
    if let Some(help) = help {
        output.push_str(&format!("# HELP {} {}\n", name, help));
    }
    output.push_str(&format!("# TYPE {} {}\n", name, kind));
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_labels(labels: &[(&str, &str)]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape(v)))
        .collect();
    format!("{{{}}}", pairs.join(","))
}

/// Append one label to an already rendered label set.
fn with_label(rendered: &str, key: &str, value: &str) -> String {
    let extra = format!("{}=\"{}\"", key, escape(value));
    match rendered.strip_suffix('}') {
        Some(open) => format!("{},{}}}", open, extra),
        None => format!("{{{}}}", extra),
    }
}

/// Background task refreshing pool gauges (and the user count, for the auth
/// service) on a fixed interval.
pub fn spawn_collector(
    metrics: Arc<Metrics>,
    store: Arc<dyn StoreHealth>,
    users: Option<Arc<dyn UserRepository>>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            metrics.sample_store(store.as_ref()).await;

            if let Some(users) = &users {
                match users.count().await {
                    Ok(count) => metrics.set_active_users(count).await,
                    Err(e) => warn!(error = %e, "Failed to refresh active user count"),
                }
            }
            debug!("Metrics collected");
        }
    })
}
