//! Batch accumulation.
//!
//! A [`Batch`] is an ordered list of command records plus the construction
//! errors met while building them. Builders consume and return the batch so
//! calls chain; a command whose arguments cannot be built is recorded as a
//! [`ConstructionError`] and building carries on.
//!
//! The mode parameter selects which commands are available: a few only make
//! sense against a standalone server (`SELECT`, `MOVE`, `SCAN`), others only
//! against a cluster (`SPUBLISH`, `PUBSUB SHARD*`).

use std::fmt;
use std::marker::PhantomData;

use protocol_resp::Value;
use tracing::trace;

use crate::command::{CommandRecord, RequestType};
use crate::convert::{Converter, Expect, Transform};
use crate::error::{ArgError, ConstructionError, Error};
use crate::reply::CommandResult;

mod sealed {
    pub trait Sealed {}
}

/// Deployment mode a batch is built for.
pub trait BatchMode: sealed::Sealed + fmt::Debug + Clone + Send + Sync + 'static {
    /// Whether batches of this mode target a cluster.
    const CLUSTER: bool;
}

/// Marker for batches sent to a standalone server.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standalone;

/// Marker for batches sent to a cluster.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cluster;

impl sealed::Sealed for Standalone {}
impl sealed::Sealed for Cluster {}

impl BatchMode for Standalone {
    const CLUSTER: bool = false;
}

impl BatchMode for Cluster {
    const CLUSTER: bool = true;
}

/// Batch for a standalone server.
pub type StandaloneBatch = Batch<Standalone>;

/// Batch for a cluster.
pub type ClusterBatch = Batch<Cluster>;

/// An ordered group of commands executed as a transaction or a pipeline.
///
/// # Example
///
/// ```
/// use valkey_batch::StandaloneBatch;
///
/// let batch = StandaloneBatch::new(false)
///     .set("k", "v")
///     .get("k")
///     .get("missing");
/// assert_eq!(batch.len(), 3);
/// assert!(batch.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Batch<M: BatchMode> {
    commands: Vec<CommandRecord>,
    errors: Vec<ConstructionError>,
    is_atomic: bool,
    _mode: PhantomData<M>,
}

impl<M: BatchMode> Batch<M> {
    /// Create an empty batch.
    ///
    /// An atomic batch runs as a `MULTI`/`EXEC` transaction; in a cluster all
    /// of its keys must map to one slot. A non-atomic batch is a pipeline.
    pub fn new(is_atomic: bool) -> Self {
        Self {
            commands: Vec::new(),
            errors: Vec::new(),
            is_atomic,
            _mode: PhantomData,
        }
    }

    #[inline]
    pub fn is_atomic(&self) -> bool {
        self.is_atomic
    }

    /// The successfully built commands, in execution order.
    #[inline]
    pub fn commands(&self) -> &[CommandRecord] {
        &self.commands
    }

    /// Construction errors, in the order they were met.
    #[inline]
    pub fn errors(&self) -> &[ConstructionError] {
        &self.errors
    }

    /// Number of built commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Fail with every construction error if there are any.
    pub fn validate(&self) -> Result<(), Error> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Construction(self.errors.clone()))
        }
    }

    // ── Construction primitives ─────────────────────────────────────────

    pub(crate) fn push(mut self, request_type: RequestType, args: Vec<String>, converter: Converter) -> Self {
        self.commands
            .push(CommandRecord::new(request_type, args, converter));
        self
    }

    /// Append with no reply check; the raw value is returned.
    pub(crate) fn add_cmd(self, request_type: RequestType, args: Vec<String>) -> Self {
        self.push(request_type, args, Converter::identity())
    }

    /// Append with a reply shape check.
    pub(crate) fn add_cmd_checked(
        self,
        request_type: RequestType,
        args: Vec<String>,
        expect: Expect,
        nilable: bool,
    ) -> Self {
        self.push(request_type, args, Converter::checked(expect, nilable))
    }

    /// Append with a reply shape check followed by `transform`.
    pub(crate) fn add_cmd_converted(
        self,
        request_type: RequestType,
        args: Vec<String>,
        expect: Expect,
        nilable: bool,
        transform: Transform,
    ) -> Self {
        self.push(
            request_type,
            args,
            Converter::converted(expect, nilable, transform),
        )
    }

    /// Append if `args` built, otherwise record a construction error for
    /// `command` and leave the command list untouched.
    pub(crate) fn try_add(
        mut self,
        command: &'static str,
        request_type: RequestType,
        args: Result<Vec<String>, ArgError>,
        converter: Converter,
    ) -> Self {
        match args {
            Ok(args) => self.push(request_type, args, converter),
            Err(source) => {
                let position = self.commands.len() + self.errors.len() + 1;
                trace!(position, command, error = %source, "failed to build command");
                self.errors.push(ConstructionError {
                    position,
                    command,
                    source,
                });
                self
            }
        }
    }

    // ── Execution support ───────────────────────────────────────────────

    /// First key of the first keyed command.
    pub(crate) fn first_key(&self) -> Option<&str> {
        self.commands.iter().find_map(CommandRecord::first_key)
    }

    /// Convert raw replies in lock-step with the commands.
    ///
    /// The reply count must match the command count exactly.
    pub(crate) fn convert(&self, responses: Vec<Value>) -> Result<Vec<CommandResult>, Error> {
        if responses.len() != self.commands.len() {
            return Err(Error::ResponseMisaligned {
                commands: self.commands.len(),
                responses: responses.len(),
            });
        }
        Ok(self
            .commands
            .iter()
            .zip(responses)
            .enumerate()
            .map(|(index, (cmd, value))| cmd.converter().apply(index, cmd.request_type(), value))
            .collect())
    }
}

impl<M: BatchMode> Default for Batch<M> {
    /// An empty pipeline.
    fn default() -> Self {
        Self::new(false)
    }
}

/// Collect string arguments.
pub(crate) fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Key arguments for commands that need at least one key.
pub(crate) fn non_empty(keys: &[&str]) -> Result<Vec<String>, ArgError> {
    if keys.is_empty() {
        Err(ArgError::Invalid("at least one key is required".into()))
    } else {
        Ok(args(keys.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::Reply;

    fn batch() -> StandaloneBatch {
        StandaloneBatch::new(false)
    }

    #[test]
    fn test_new() {
        let b = ClusterBatch::new(true);
        assert!(b.is_atomic());
        assert!(b.is_empty());
        assert!(b.errors().is_empty());
        assert!(!StandaloneBatch::default().is_atomic());
    }

    #[test]
    fn test_primitives_preserve_order() {
        let b = batch()
            .add_cmd(RequestType::Ping, vec![])
            .add_cmd_checked(RequestType::Get, args(["k"]), Expect::Text, true)
            .add_cmd_converted(
                RequestType::HGetAll,
                args(["h"]),
                Expect::Map,
                false,
                crate::convert::map_of_text,
            );
        let types: Vec<_> = b.commands().iter().map(|c| c.request_type()).collect();
        assert_eq!(
            types,
            vec![RequestType::Ping, RequestType::Get, RequestType::HGetAll]
        );
        assert_eq!(b.commands()[1].args(), ["k"]);
        assert_eq!(b.commands()[1].converter().expect(), Some(Expect::Text));
        assert!(b.commands()[0].converter().expect().is_none());
    }

    #[test]
    fn test_try_add_records_error() {
        let b = batch()
            .add_cmd(RequestType::Ping, vec![])
            .try_add(
                "broken",
                RequestType::Set,
                Err(ArgError::Invalid("bad".into())),
                Converter::identity(),
            )
            .add_cmd(RequestType::Ping, vec![])
            .try_add(
                "broken_again",
                RequestType::Set,
                Err(ArgError::Conflict("worse".into())),
                Converter::identity(),
            );
        assert_eq!(b.len(), 2);
        assert_eq!(b.errors().len(), 2);
        assert_eq!(b.errors()[0].position, 2);
        assert_eq!(b.errors()[0].command, "broken");
        assert_eq!(b.errors()[1].position, 4);
    }

    #[test]
    fn test_validate() {
        assert!(batch().validate().is_ok());
        let b = batch().try_add(
            "broken",
            RequestType::Get,
            Err(ArgError::Invalid("bad".into())),
            Converter::identity(),
        );
        match b.validate() {
            Err(Error::Construction(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_convert_misaligned() {
        let b = batch().add_cmd(RequestType::Ping, vec![]);
        let err = b.convert(vec![]).unwrap_err();
        assert!(matches!(
            err,
            Error::ResponseMisaligned {
                commands: 1,
                responses: 0
            }
        ));
        let err = b
            .convert(vec![Value::okay(), Value::okay()])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResponseMisaligned {
                commands: 1,
                responses: 2
            }
        ));
    }

    #[test]
    fn test_convert_lock_step() {
        let b = batch()
            .add_cmd_checked(RequestType::Get, args(["a"]), Expect::Text, true)
            .add_cmd_checked(RequestType::Incr, args(["n"]), Expect::Int, false);
        let results = b
            .convert(vec![Value::Null, Value::Integer(5)])
            .unwrap();
        assert_eq!(results, vec![Ok(Reply::Nil), Ok(Reply::Int(5))]);
    }

    #[test]
    fn test_first_key() {
        let b = batch()
            .add_cmd(RequestType::Ping, vec![])
            .add_cmd(RequestType::Get, args(["k1"]))
            .add_cmd(RequestType::Get, args(["k2"]));
        assert_eq!(b.first_key(), Some("k1"));
        assert_eq!(batch().first_key(), None);
    }

    #[test]
    fn test_non_empty() {
        assert!(non_empty(&[]).is_err());
        assert_eq!(non_empty(&["a", "b"]).unwrap(), ["a", "b"]);
    }
}
