//! Client-side counter state: a remote service port, its HTTP adapter, and
//! the view controller that falls back to local arithmetic when the backend
//! is unreachable.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Counter, Operation},
    protocol::UpdateCounterRequest,
};
use tracing::warn;

/// Notice shown when the initial fetch fails and a local stub takes over.
pub const OFFLINE_INITIAL_NOTICE: &str =
    "Backend server is not available. Using local counter instead.";
/// Notice shown when a mutation fails mid-session and the controller
/// switches to local arithmetic.
pub const OFFLINE_SWITCH_NOTICE: &str =
    "Backend server is not available. Switching to local counter.";

/// Remote counter service port. Failures are deliberately a single generic
/// error; the controller does not distinguish transport from server faults.
#[async_trait]
pub trait CounterService: Send + Sync {
    async fn get_counter(&self) -> Result<Counter>;
    async fn update_counter(&self, operation: Operation) -> Result<Counter>;
}

pub struct HttpCounterService {
    http: Client,
    server_url: String,
}

impl HttpCounterService {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into(),
        }
    }
}

#[async_trait]
impl CounterService for HttpCounterService {
    async fn get_counter(&self) -> Result<Counter> {
        let counter = self
            .http
            .get(format!("{}/counter", self.server_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(counter)
    }

    async fn update_counter(&self, operation: Operation) -> Result<Counter> {
        let counter = self
            .http
            .post(format!("{}/counter", self.server_url))
            .json(&UpdateCounterRequest { operation })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(counter)
    }
}

/// Trust state toward the backend. The `Remote -> LocalFallback` transition
/// is one-way for the remainder of the session; nothing moves back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMode {
    Remote,
    LocalFallback,
}

pub struct CounterController {
    service: Arc<dyn CounterService>,
    counter: Option<Counter>,
    mode: CounterMode,
    loading: bool,
    error: Option<String>,
    initial_load_done: bool,
}

impl CounterController {
    pub fn new(service: Arc<dyn CounterService>) -> Self {
        Self {
            service,
            counter: None,
            mode: CounterMode::Remote,
            loading: false,
            error: None,
            initial_load_done: false,
        }
    }

    /// Fetches the counter once at startup. On failure the controller
    /// substitutes a zero-valued stub and enters local fallback instead of
    /// surfacing a broken state.
    pub async fn initialize(&mut self) {
        match self.service.get_counter().await {
            Ok(counter) => {
                self.counter = Some(counter);
                self.error = None;
                self.mode = CounterMode::Remote;
            }
            Err(err) => {
                warn!(%err, "initial counter fetch failed; entering local fallback");
                self.error = Some(OFFLINE_INITIAL_NOTICE.to_string());
                self.counter = Some(Counter::local_stub());
                self.mode = CounterMode::LocalFallback;
            }
        }
        self.initial_load_done = true;
    }

    /// Applies an increment/decrement. No-op until a counter is held.
    /// Once in fallback the service is never called again; a failing remote
    /// mutation still lands the same local arithmetic so the value updates.
    /// Any completed operation, local or remote, clears the notice.
    pub async fn apply(&mut self, operation: Operation) {
        let Some(current) = self.counter.clone() else {
            return;
        };

        self.loading = true;
        match self.mode {
            CounterMode::LocalFallback => {
                self.counter = Some(current.applied(operation));
                // A completed local operation clears the advisory notice;
                // the mode itself still marks the session as local.
                self.error = None;
            }
            CounterMode::Remote => match self.service.update_counter(operation).await {
                Ok(counter) => {
                    self.counter = Some(counter);
                    self.error = None;
                }
                Err(err) => {
                    warn!(%err, "counter update failed; switching to local fallback");
                    self.error = Some(OFFLINE_SWITCH_NOTICE.to_string());
                    self.mode = CounterMode::LocalFallback;
                    self.counter = Some(current.applied(operation));
                }
            },
        }
        // Every path ends here so the UI always re-enables its buttons.
        self.loading = false;
    }

    pub fn counter(&self) -> Option<&Counter> {
        self.counter.as_ref()
    }

    pub fn mode(&self) -> CounterMode {
        self.mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn initial_load_done(&self) -> bool {
        self.initial_load_done
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
