//! Seam to the component that owns connections and speaks the wire protocol.

use std::future::Future;

use protocol_resp::Value;
use serde::Serialize;

use crate::batch::{Batch, BatchMode};
use crate::batch_options::BatchOptionsInfo;
use crate::command::RequestType;
use crate::error::Error;

/// One command as sent to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdInfo<'a> {
    pub request_type: RequestType,
    pub args: &'a [String],
}

/// A validated batch ready to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRequest<'a> {
    pub commands: Vec<CmdInfo<'a>>,
    pub is_atomic: bool,
    pub options: BatchOptionsInfo,
}

impl<'a> BatchRequest<'a> {
    pub(crate) fn new<M: BatchMode>(batch: &'a Batch<M>, options: BatchOptionsInfo) -> Self {
        Self {
            commands: batch
                .commands()
                .iter()
                .map(|cmd| CmdInfo {
                    request_type: cmd.request_type(),
                    args: cmd.args(),
                })
                .collect(),
            is_atomic: batch.is_atomic(),
            options,
        }
    }
}

/// Runs batches against a store.
///
/// Implementations own the connections, routing, redirects and retries.
/// They must return one reply per command, in command order. An atomic
/// batch whose transaction was discarded (a watched key changed) yields
/// `Ok(None)`.
pub trait BatchExecutor {
    fn execute(
        &self,
        request: BatchRequest<'_>,
    ) -> impl Future<Output = Result<Option<Vec<Value>>, Error>> + Send;
}

impl<E: BatchExecutor + ?Sized> BatchExecutor for &E {
    fn execute(
        &self,
        request: BatchRequest<'_>,
    ) -> impl Future<Output = Result<Option<Vec<Value>>, Error>> + Send {
        (**self).execute(request)
    }
}
