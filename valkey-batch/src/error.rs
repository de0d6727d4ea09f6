//! Error types for batch construction, conversion and execution.

use std::time::Duration;

use protocol_resp::ValueKind;

use crate::command::RequestType;
use crate::convert::Expect;

/// Failure while building one command's argument list.
///
/// Builders never return this to the caller directly; it is recorded on the
/// batch as a [`ConstructionError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    /// Two options were set that the store rejects together.
    #[error("conflicting options: {0}")]
    Conflict(String),

    /// A single argument is outside its accepted range.
    #[error("invalid argument: {0}")]
    Invalid(String),

    /// A `host:port` address could not be parsed.
    #[error(transparent)]
    Route(#[from] RouteError),
}

/// Failure while building or parsing a [`Route`](crate::Route).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Address string did not split into exactly `host` and `port`.
    #[error("invalid address '{0}': expected 'host:port'")]
    MalformedAddress(String),

    /// Port was not a 32-bit integer.
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    /// Slot id outside the cluster's slot range.
    #[error("slot {0} is out of range")]
    SlotOutOfRange(i32),
}

/// A deferred argument-construction failure recorded on a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("error processing arguments for command #{position} ({command}): {source}")]
pub struct ConstructionError {
    /// 1-based position the failed command would have occupied.
    pub position: usize,
    /// Name of the builder that failed.
    pub command: &'static str,
    /// Why argument construction failed.
    pub source: ArgError,
}

/// Per-command failure, stored in that command's result slot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// The store answered this command with an error reply.
    #[error("{0}")]
    Server(String),

    /// The reply's shape did not match what the command declared at build time.
    #[error("unexpected reply for command at index {index} ({command}): got {actual}, expected {expected}")]
    TypeMismatch {
        index: usize,
        command: RequestType,
        expected: Expect,
        actual: ValueKind,
    },

    /// The reply had the expected outer shape but its contents could not be decoded.
    #[error("failed to convert reply for command at index {index} ({command}): {message}")]
    Conversion {
        index: usize,
        command: RequestType,
        message: String,
    },
}

/// Errors returned when executing a batch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The batch carries construction errors and the client rejects it.
    #[error("batch has {} construction error(s): {}", .0.len(), join(.0))]
    Construction(Vec<ConstructionError>),

    /// The route cannot be used with this batch.
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    /// The batch options cannot be used with this batch.
    #[error("invalid batch options: {0}")]
    InvalidOptions(String),

    /// The executor returned a different number of replies than commands sent.
    #[error("response misaligned: received {responses} responses for {commands} commands")]
    ResponseMisaligned { commands: usize, responses: usize },

    /// Connection to the store was lost or could not be established.
    #[error("connection error: {0}")]
    Connection(String),

    /// The batch did not complete within its timeout.
    #[error("batch timed out after {0:?}")]
    Timeout(Duration),

    /// The store discarded a transaction (`EXECABORT`).
    #[error("transaction aborted: {0}")]
    ExecAbort(String),

    /// The store rejected the batch as a whole.
    #[error("server error: {0}")]
    Server(String),

    /// A single command failed and the caller asked for errors to be raised.
    #[error("command at index {index} failed: {source}")]
    Command {
        index: usize,
        #[source]
        source: CommandError,
    },
}

fn join(errors: &[ConstructionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
