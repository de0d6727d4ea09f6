//! Standalone and cluster clients.
//!
//! A client owns an executor and runs batches through it. Execution is a
//! three-step affair:
//!
//! 1. Validate the batch and options (route shape, retry use, construction
//!    errors) without touching the executor.
//! 2. Hand the command list, atomicity flag and serialized options to the
//!    executor and await the raw replies.
//! 3. Walk the replies in lock-step with the commands, applying each
//!    command's converter.
//!
//! # Example
//!
//! ```no_run
//! use valkey_batch::{BatchExecutor, Client, StandaloneBatch};
//!
//! async fn example<E: BatchExecutor>(executor: E) -> Result<(), valkey_batch::Error> {
//!     let client = Client::new(executor);
//!     let batch = StandaloneBatch::new(true).set("k", "v").get("k");
//!     if let Some(results) = client.exec(&batch, true).await? {
//!         assert_eq!(results.len(), 2);
//!     }
//!     Ok(())
//! }
//! ```

use tracing::{debug, warn};

use crate::batch::{Batch, BatchMode, ClusterBatch, StandaloneBatch};
use crate::batch_options::{BatchOptionsInfo, ClusterBatchOptions, StandaloneBatchOptions};
use crate::config::{ClientConfig, ConstructionErrorPolicy};
use crate::error::Error;
use crate::executor::{BatchExecutor, BatchRequest};
use crate::reply::CommandResult;
use crate::route::{Route, SlotType};

/// Client for a standalone server.
#[derive(Debug, Clone)]
pub struct Client<E> {
    executor: E,
    config: ClientConfig,
}

impl<E: BatchExecutor> Client<E> {
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, ClientConfig::default())
    }

    pub fn with_config(executor: E, config: ClientConfig) -> Self {
        Self { executor, config }
    }

    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[inline]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Execute `batch`.
    ///
    /// Returns `Ok(None)` if the transaction was discarded because a watched
    /// key changed. With `raise_on_error`, the first failed command is
    /// returned as [`Error::Command`]; otherwise failures stay in their slot.
    pub async fn exec(
        &self,
        batch: &StandaloneBatch,
        raise_on_error: bool,
    ) -> Result<Option<Vec<CommandResult>>, Error> {
        self.exec_with_options(batch, raise_on_error, StandaloneBatchOptions::default())
            .await
    }

    /// Execute `batch` with `raise_on_error` taken from the client config.
    pub async fn exec_default(
        &self,
        batch: &StandaloneBatch,
    ) -> Result<Option<Vec<CommandResult>>, Error> {
        self.exec(batch, self.config.raise_on_error).await
    }

    pub async fn exec_with_options(
        &self,
        batch: &StandaloneBatch,
        raise_on_error: bool,
        options: StandaloneBatchOptions,
    ) -> Result<Option<Vec<CommandResult>>, Error> {
        run(
            &self.executor,
            &self.config,
            batch,
            raise_on_error,
            &options.into(),
        )
        .await
    }
}

/// Client for a cluster.
#[derive(Debug, Clone)]
pub struct ClusterClient<E> {
    executor: E,
    config: ClientConfig,
}

impl<E: BatchExecutor> ClusterClient<E> {
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, ClientConfig::default())
    }

    pub fn with_config(executor: E, config: ClientConfig) -> Self {
        Self { executor, config }
    }

    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[inline]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Execute `batch` with default options.
    ///
    /// An atomic batch goes to the primary serving its first key. A pipeline
    /// is split per command by the executor.
    pub async fn exec(
        &self,
        batch: &ClusterBatch,
        raise_on_error: bool,
    ) -> Result<Option<Vec<CommandResult>>, Error> {
        self.exec_with_options(batch, raise_on_error, ClusterBatchOptions::default())
            .await
    }

    pub async fn exec_default(
        &self,
        batch: &ClusterBatch,
    ) -> Result<Option<Vec<CommandResult>>, Error> {
        self.exec(batch, self.config.raise_on_error).await
    }

    /// Execute `batch` with an explicit route, timeout or retry strategy.
    ///
    /// Atomic batches reject multi-node routes and retry strategies.
    pub async fn exec_with_options(
        &self,
        batch: &ClusterBatch,
        raise_on_error: bool,
        options: ClusterBatchOptions,
    ) -> Result<Option<Vec<CommandResult>>, Error> {
        run(&self.executor, &self.config, batch, raise_on_error, &options).await
    }
}

// ── Execution ───────────────────────────────────────────────────────────

async fn run<E, M>(
    executor: &E,
    config: &ClientConfig,
    batch: &Batch<M>,
    raise_on_error: bool,
    options: &ClusterBatchOptions,
) -> Result<Option<Vec<CommandResult>>, Error>
where
    E: BatchExecutor,
    M: BatchMode,
{
    let route = prepare(config, batch, options)?;
    if batch.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let info = BatchOptionsInfo::new(options, route.as_ref())?;
    debug!(
        commands = batch.len(),
        atomic = batch.is_atomic(),
        cluster = M::CLUSTER,
        route = ?route,
        "executing batch"
    );

    let Some(responses) = executor.execute(BatchRequest::new(batch, info)).await? else {
        debug!("transaction discarded");
        return Ok(None);
    };

    let results = batch.convert(responses)?;
    if raise_on_error {
        if let Some((index, Err(source))) = results.iter().enumerate().find(|(_, r)| r.is_err()) {
            return Err(Error::Command {
                index,
                source: source.clone(),
            });
        }
    }
    Ok(Some(results))
}

/// Validate `batch` and `options` and resolve the route to send with.
fn prepare<M: BatchMode>(
    config: &ClientConfig,
    batch: &Batch<M>,
    options: &ClusterBatchOptions,
) -> Result<Option<Route>, Error> {
    if let Some(route) = &options.route {
        if batch.is_atomic() && route.is_multi_node() {
            return Err(Error::InvalidRoute(format!(
                "atomic batches cannot be sent to {route}"
            )));
        }
        route
            .slot()
            .map_err(|e| Error::InvalidRoute(e.to_string()))?;
    }
    if batch.is_atomic() && options.retry_strategy.is_some() {
        return Err(Error::InvalidOptions(
            "retry strategy is not supported for atomic batches".into(),
        ));
    }

    if !batch.errors().is_empty() {
        match config.construction_errors {
            ConstructionErrorPolicy::Reject => batch.validate()?,
            ConstructionErrorPolicy::Permissive => warn!(
                errors = batch.errors().len(),
                commands = batch.len(),
                "executing batch with construction errors"
            ),
        }
    }

    if !M::CLUSTER {
        return Ok(None);
    }
    if let Some(route) = &options.route {
        return Ok(Some(route.clone()));
    }
    if !batch.is_atomic() {
        return Ok(None);
    }
    Ok(Some(match batch.first_key() {
        Some(key) => Route::slot_key(SlotType::Primary, key),
        None => Route::Random,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch_options::ClusterBatchRetryStrategy;
    use crate::options::{ConditionalChange, UpdateOptions, ZAddOptions};

    fn permissive() -> ClientConfig {
        ClientConfig {
            construction_errors: ConstructionErrorPolicy::Permissive,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_atomic_rejects_multi_node_route() {
        let batch = ClusterBatch::new(true).get("k");
        for route in [Route::AllNodes, Route::AllPrimaries] {
            let options = ClusterBatchOptions::new().route(route);
            let err = prepare(&ClientConfig::default(), &batch, &options).unwrap_err();
            assert!(matches!(err, Error::InvalidRoute(_)));
        }
    }

    #[test]
    fn test_pipeline_accepts_multi_node_route() {
        let batch = ClusterBatch::new(false).get("k");
        let options = ClusterBatchOptions::new().route(Route::AllPrimaries);
        let route = prepare(&ClientConfig::default(), &batch, &options).unwrap();
        assert_eq!(route, Some(Route::AllPrimaries));
    }

    #[test]
    fn test_atomic_rejects_retry_strategy() {
        let batch = ClusterBatch::new(true).get("k");
        let options =
            ClusterBatchOptions::new().retry_strategy(ClusterBatchRetryStrategy::new(true, true));
        let err = prepare(&ClientConfig::default(), &batch, &options).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }

    #[test]
    fn test_slot_out_of_range() {
        let batch = ClusterBatch::new(false).get("k");
        let options = ClusterBatchOptions::new().route(Route::slot_id(SlotType::Primary, 16384));
        let err = prepare(&ClientConfig::default(), &batch, &options).unwrap_err();
        assert!(matches!(err, Error::InvalidRoute(_)));
    }

    #[test]
    fn test_effective_route() {
        let config = ClientConfig::default();
        let none = ClusterBatchOptions::default();

        let atomic = ClusterBatch::new(true).ping().get("{user}.name");
        assert_eq!(
            prepare(&config, &atomic, &none).unwrap(),
            Some(Route::slot_key(SlotType::Primary, "{user}.name"))
        );

        let keyless = ClusterBatch::new(true).ping();
        assert_eq!(prepare(&config, &keyless, &none).unwrap(), Some(Route::Random));

        let pipeline = ClusterBatch::new(false).get("k");
        assert_eq!(prepare(&config, &pipeline, &none).unwrap(), None);

        let standalone = StandaloneBatch::new(true).get("k");
        assert_eq!(prepare(&config, &standalone, &none).unwrap(), None);
    }

    #[test]
    fn test_construction_error_policy() {
        let options = ZAddOptions::new()
            .conditional_change(ConditionalChange::OnlyIfDoesNotExist)
            .update(UpdateOptions::ScoreGreaterThanCurrent);
        let batch = ClusterBatch::new(false)
            .get("k")
            .zadd_with_options("z", &[("a", 1.0)], options);
        let none = ClusterBatchOptions::default();

        let err = prepare(&ClientConfig::default(), &batch, &none).unwrap_err();
        match err {
            Error::Construction(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].position, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }

        assert!(prepare(&permissive(), &batch, &none).is_ok());
    }
}
