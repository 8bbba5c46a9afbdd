//! Request metrics per scraping operation
//!
//! Tracks success rates, error counts and response times for each of the
//! adapter's operations (manga_details, chapters, search, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationMetrics {
    pub operation: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_response_time_ms: f64,
    pub total_response_time_ms: u64,
    pub rate_limit_hits: u64,
    pub cloudflare_challenges: u64,
    pub timeout_count: u64,
}

impl OperationMetrics {
    pub fn new(operation: String) -> Self {
        Self {
            operation,
            total_requests: 0,
            successful_requests: 0,
            failed_requests: 0,
            last_success: None,
            last_failure: None,
            last_error: None,
            average_response_time_ms: 0.0,
            total_response_time_ms: 0,
            rate_limit_hits: 0,
            cloudflare_challenges: 0,
            timeout_count: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.successful_requests as f64 / self.total_requests as f64) * 100.0
        }
    }

    fn record_success(&mut self, response_time: Duration) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.last_success = Some(Utc::now());

        let response_ms = response_time.as_millis() as u64;
        self.total_response_time_ms += response_ms;
        self.average_response_time_ms =
            self.total_response_time_ms as f64 / self.successful_requests as f64;
    }

    fn record_failure(&mut self, error: String) {
        self.total_requests += 1;
        self.failed_requests += 1;
        self.last_failure = Some(Utc::now());
        self.last_error = Some(error.clone());

        // Categorize errors
        let lower = error.to_lowercase();
        if error.contains("429") || lower.contains("rate limit") {
            self.rate_limit_hits += 1;
        } else if lower.contains("cloudflare") || error.contains("503") || error.contains("520") {
            self.cloudflare_challenges += 1;
        } else if lower.contains("timeout") || lower.contains("timed out") {
            self.timeout_count += 1;
        }
    }
}

/// Shared tracker, keyed by operation name
pub struct MetricsTracker {
    metrics: Mutex<HashMap<String, OperationMetrics>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            metrics: Mutex::new(HashMap::new()),
        }
    }

    pub fn record_success(&self, operation: &str, response_time: Duration) {
        let mut metrics = self.metrics.lock().unwrap();
        let entry = metrics
            .entry(operation.to_string())
            .or_insert_with(|| OperationMetrics::new(operation.to_string()));
        entry.record_success(response_time);

        log::debug!(
            "[{}] success in {}ms, success rate {:.2}%",
            operation,
            response_time.as_millis(),
            entry.success_rate()
        );
    }

    pub fn record_failure(&self, operation: &str, error: String) {
        let mut metrics = self.metrics.lock().unwrap();
        let entry = metrics
            .entry(operation.to_string())
            .or_insert_with(|| OperationMetrics::new(operation.to_string()));
        entry.record_failure(error.clone());

        log::warn!(
            "[{}] failure: {}, success rate {:.2}%",
            operation,
            error,
            entry.success_rate()
        );
    }

    pub fn get_metrics(&self, operation: &str) -> Option<OperationMetrics> {
        let metrics = self.metrics.lock().unwrap();
        metrics.get(operation).cloned()
    }

    pub fn get_all_metrics(&self) -> Vec<OperationMetrics> {
        let metrics = self.metrics.lock().unwrap();
        let mut all: Vec<_> = metrics.values().cloned().collect();
        all.sort_by(|a, b| a.operation.cmp(&b.operation));
        all
    }

    pub fn export_json(&self) -> String {
        let metrics = self.metrics.lock().unwrap();
        serde_json::to_string_pretty(&*metrics).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}
