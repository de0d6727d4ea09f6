//! Per-execution options and their wire form.

use std::time::Duration;

use serde::Serialize;

use crate::error::Error;
use crate::route::{Route, RouteInfo};

/// Options for executing a batch against a standalone server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandaloneBatchOptions {
    /// How long to wait for the whole batch. `None` uses the executor's
    /// request timeout.
    pub timeout: Option<Duration>,
}

impl StandaloneBatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Which failures a cluster pipeline may retry.
///
/// Retrying can reorder or duplicate writes, so both flags are off by
/// default. Retries resend the already-built command list; arguments are
/// never rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterBatchRetryStrategy {
    /// Retry commands that failed with a retriable server error such as
    /// `TRYAGAIN`.
    pub retry_server_error: bool,
    /// Retry the batch after a connection failure.
    pub retry_connection_error: bool,
}

impl ClusterBatchRetryStrategy {
    pub fn new(retry_server_error: bool, retry_connection_error: bool) -> Self {
        Self {
            retry_server_error,
            retry_connection_error,
        }
    }
}

/// Options for executing a batch against a cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterBatchOptions {
    pub timeout: Option<Duration>,
    /// Send the whole batch to this node instead of routing per command.
    pub route: Option<Route>,
    /// Only valid for non-atomic batches.
    pub retry_strategy: Option<ClusterBatchRetryStrategy>,
}

impl ClusterBatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn retry_strategy(mut self, retry_strategy: ClusterBatchRetryStrategy) -> Self {
        self.retry_strategy = Some(retry_strategy);
        self
    }
}

impl From<StandaloneBatchOptions> for ClusterBatchOptions {
    fn from(options: StandaloneBatchOptions) -> Self {
        Self {
            timeout: options.timeout,
            ..Self::default()
        }
    }
}

// ── Wire format ─────────────────────────────────────────────────────────

/// Batch options as handed to the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOptionsInfo {
    pub retry_server_error: bool,
    pub retry_connection_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteInfo>,
}

impl BatchOptionsInfo {
    /// Serialize `options`, with `route` as the already-resolved route.
    pub(crate) fn new(options: &ClusterBatchOptions, route: Option<&Route>) -> Result<Self, Error> {
        let retry = options.retry_strategy.unwrap_or_default();
        Ok(Self {
            retry_server_error: retry.retry_server_error,
            retry_connection_error: retry.retry_connection_error,
            timeout_ms: options.timeout.map(timeout_ms).transpose()?,
            route: route.map(Route::to_info),
        })
    }
}

fn timeout_ms(timeout: Duration) -> Result<u32, Error> {
    u32::try_from(timeout.as_millis()).map_err(|_| {
        Error::InvalidOptions(format!(
            "timeout of {timeout:?} does not fit in 32-bit milliseconds"
        ))
    })
}
