// SPDX-License-Identifier: Apache-2.0

use crate::cache::CacheStats;
use axum::http::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// In-process request counters, exposed as plain text at `/metrics`.
#[derive(Default)]
pub struct Metrics {
    counts: Mutex<HashMap<(String, u16), u64>>,
    latency_ns: Mutex<HashMap<String, Vec<u64>>>,
    pub store_failures: AtomicU64,
    pub upload_failures: AtomicU64,
}

impl Metrics {
    pub async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut counts = self.counts.lock().await;
        *counts
            .entry((route.to_string(), status.as_u16()))
            .or_insert(0) += 1;
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        latency_map
            .entry(route.to_string())
            .or_default()
            .push(latency.as_nanos() as u64);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload_failure(&self) {
        self.upload_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn render(&self, cache: &CacheStats) -> String {
        let mut body = String::new();
        let counts = self.counts.lock().await;
        let mut lines: Vec<(&(String, u16), &u64)> = counts.iter().collect();
        lines.sort_by(|a, b| a.0.cmp(b.0));
        for ((route, status), count) in lines {
            body.push_str(&format!(
                "pawhaven_requests_total{{route=\"{route}\",status=\"{status}\"}} {count}\n"
            ));
        }
        drop(counts);
        let mut latency_map = self.latency_ns.lock().await;
        let mut routes: Vec<&String> = latency_map.keys().collect();
        routes.sort();
        let routes: Vec<String> = routes.into_iter().cloned().collect();
        for route in routes {
            if let Some(samples) = latency_map.get_mut(&route) {
                let p95 = percentile_ns(samples, 0.95);
                body.push_str(&format!(
                    "pawhaven_request_latency_p95_ns{{route=\"{route}\"}} {p95}\n"
                ));
            }
        }
        drop(latency_map);
        body.push_str(&format!(
            "pawhaven_listing_cache_hits_total {}\n",
            cache.hits.load(Ordering::Relaxed)
        ));
        body.push_str(&format!(
            "pawhaven_listing_cache_misses_total {}\n",
            cache.misses.load(Ordering::Relaxed)
        ));
        body.push_str(&format!(
            "pawhaven_listing_cache_invalidations_total {}\n",
            cache.invalidations.load(Ordering::Relaxed)
        ));
        body.push_str(&format!(
            "pawhaven_store_failures_total {}\n",
            self.store_failures.load(Ordering::Relaxed)
        ));
        body.push_str(&format!(
            "pawhaven_upload_failures_total {}\n",
            self.upload_failures.load(Ordering::Relaxed)
        ));
        body
    }
}

fn percentile_ns(samples: &mut [u64], p: f64) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    samples.sort_unstable();
    let idx = ((samples.len() as f64) * p).ceil() as usize;
    samples[idx.saturating_sub(1).min(samples.len() - 1)]
}
