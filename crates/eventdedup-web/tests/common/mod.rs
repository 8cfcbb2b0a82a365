//! Common test utilities and fixtures for integration tests
#![allow(dead_code)]

use eventdedup_core::Config;
use eventdedup_web::AppState;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::io;
use std::sync::{Arc, Once};
use std::time::Duration;
use wiremock::MockServer;

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging once per test binary
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Formatted log output of a thread-scoped subscriber
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route events on the current thread into this capture until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let capture = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || capture.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Everything written so far
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Statistics response with two shards
pub fn stats_body(dedup_keys: u64) -> Value {
    json!({
        "service": "kion-deduplicator",
        "redis": {"dedup_keys_count": dedup_keys, "shard_count": 1},
        "postgres": {
            "total_events": 100,
            "shard_count": 2,
            "shards": {"shard_0": 60, "shard_1": 40}
        },
        "timestamp": "2024-05-01T10:00:00"
    })
}

/// Event list response holding `count` events out of `total`
pub fn events_body(total: u64, count: usize) -> Value {
    let data: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": i + 1,
                "client_id": format!("client-{i}"),
                "event_name": "purchase",
                "product_id": "p-1",
                "event_datetime": "2024-05-01T10:00:00",
                "event_hash": format!("{i:0>8}deadbeef"),
                "full_event": {"sequence": i}
            })
        })
        .collect();
    json!({"total": total, "data": data})
}

/// Builder for test configurations pointing at a mock backend
pub struct TestConfigBuilder {
    config: Config,
}

impl TestConfigBuilder {
    /// Start from defaults
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Point the dashboard at `server`
    pub fn with_backend(mut self, server: &MockServer) -> Self {
        self.config.dashboard.api_base_url = server.uri();
        self
    }

    /// Set the refresh period
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.config.dashboard.refresh_interval_ms =
            u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the default page size
    pub fn with_default_limit(mut self, limit: u32) -> Self {
        self.config.dashboard.default_limit = limit;
        self
    }

    /// Switch the UI off
    pub fn without_ui(mut self) -> Self {
        self.config.dashboard.enable_ui = false;
        self
    }

    /// Finish the configuration
    pub fn build(self) -> Config {
        self.config
    }

    /// Finish and wrap in application state
    pub fn build_state(self) -> Arc<AppState> {
        Arc::new(AppState::new(self.config).unwrap())
    }
}

/// Poll `check` until it holds or `timeout` elapses
pub async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
