//! Metrics collection and exposition.
//!
//! # Metrics
//! - `web_routes_registered_total` (counter): routes bound by the composer, by kind
//! - `web_auth_rejections_total` (counter): 401s, by gate
//! - `web_config_reloads_total` (counter): config snapshots published after startup
//! - `web_api_calls_total` (counter): outbound API calls, by outcome

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    match builder.install() {
        Ok(_) => tracing::info!(address = %addr, "Metrics server started"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder"),
    }
}

pub fn record_route_registered(kind: &'static str) {
    metrics::counter!("web_routes_registered_total", "kind" => kind).increment(1);
}

pub fn record_auth_rejection(gate: &'static str) {
    metrics::counter!("web_auth_rejections_total", "gate" => gate).increment(1);
}

pub fn record_config_reload() {
    metrics::counter!("web_config_reloads_total").increment(1);
}

pub fn record_api_call(outcome: &'static str) {
    metrics::counter!("web_api_calls_total", "outcome" => outcome).increment(1);
}
