//! Typed batch construction and cluster execution for Redis/Valkey clients.
//!
//! A [`Batch`] accumulates an ordered list of commands, each carrying the
//! reply shape it expects and how to turn that reply into a typed [`Reply`].
//! A client hands the batch to a [`BatchExecutor`], which owns the actual
//! connections, and converts the raw replies it gets back one slot at a
//! time, so a single bad reply never discards its neighbours.
//!
//! Atomic batches run as `MULTI`/`EXEC` transactions; non-atomic batches are
//! pipelines. In a cluster, a batch may carry a [`Route`] and a
//! [`ClusterBatchRetryStrategy`] through [`ClusterBatchOptions`].
//!
//! # Example
//!
//! ```
//! use valkey_batch::{ClusterBatch, ZAddOptions, ConditionalChange, UpdateOptions};
//!
//! let batch = ClusterBatch::new(false)
//!     .zadd("board", &[("alice", 1.0), ("bob", 2.0)])
//!     .zpopmin("board")
//!     .zadd_with_options(
//!         "board",
//!         &[("carol", 3.0)],
//!         ZAddOptions::new()
//!             .conditional_change(ConditionalChange::OnlyIfDoesNotExist)
//!             .update(UpdateOptions::ScoreGreaterThanCurrent),
//!     );
//!
//! // The conflicting ZADD was not queued; its failure is recorded instead.
//! assert_eq!(batch.len(), 2);
//! assert_eq!(batch.errors()[0].position, 3);
//! assert!(batch.validate().is_err());
//! ```

mod batch;
mod batch_options;
mod client;
mod command;
mod commands;
mod config;
mod convert;
mod error;
mod executor;
mod options;
mod reply;
mod route;

pub use batch::{Batch, BatchMode, Cluster, ClusterBatch, Standalone, StandaloneBatch};
pub use batch_options::{
    BatchOptionsInfo, ClusterBatchOptions, ClusterBatchRetryStrategy, StandaloneBatchOptions,
};
pub use client::{Client, ClusterClient};
pub use command::{CommandRecord, RequestType};
pub use config::{ClientConfig, ConstructionErrorPolicy};
pub use convert::{ConvertError, Converter, Expect, Transform};
pub use error::{ArgError, CommandError, ConstructionError, Error, RouteError};
pub use executor::{BatchExecutor, BatchRequest, CmdInfo};
pub use options::{
    ConditionalChange, ConditionalSet, ExpireCondition, Expiry, GetExOptions, HashScanOptions,
    InsertPosition, LPosOptions, Limit, ListDirection, RangeQuery, ScanOptions, ScoreBoundary,
    ScoreFilter, SetOptions, TrimStrategy, UpdateOptions, XAddOptions, XAutoClaimOptions,
    XGroupCreateOptions, XPendingOptions, XReadGroupOptions, XReadOptions, XTrimOptions,
    ZAddOptions,
};
pub use reply::{
    CommandResult, ConsumerPendingMessage, Cursor, KeyWithArrayOfMembersAndScores,
    KeyWithMemberAndScore, KeyWithValues, MemberAndScore, RankAndScore, Reply, ScanResult,
    StreamEntry, XAutoClaimJustIdResponse, XAutoClaimResponse, XPendingDetail, XPendingSummary,
};
pub use route::{Route, RouteInfo, RouteType, SlotType};

pub use protocol_resp::{Value, ValueKind};
