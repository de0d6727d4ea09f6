//! Typed command results.
//!
//! Every command slot of an executed batch yields a [`CommandResult`]: either
//! a [`Reply`] or the [`CommandError`] that replaced it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use protocol_resp::Value;

use crate::error::CommandError;

/// Result of one command in a batch.
pub type CommandResult = Result<Reply, CommandError>;

/// A converted reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Absent value (missing key, aborted conditional write, empty pop).
    Nil,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<Reply>),
    /// String-keyed map. Duplicate keys keep the last value.
    Map(BTreeMap<String, Reply>),
    Set(BTreeSet<String>),
    /// Unconverted reply of a custom or dynamically typed command.
    Value(Value),
    /// Sorted-set members with scores, in reply order.
    MemberScores(Vec<MemberAndScore>),
    KeyMemberScore(KeyWithMemberAndScore),
    KeyMemberScores(KeyWithArrayOfMembersAndScores),
    RankScore(RankAndScore),
    Scan(ScanResult),
    /// Ordered field/value pairs; duplicates are kept.
    StringPairs(Vec<(String, String)>),
    StreamEntries(Vec<StreamEntry>),
    /// Entries per stream key, as returned by XREAD.
    Streams(BTreeMap<String, Vec<StreamEntry>>),
    AutoClaim(XAutoClaimResponse),
    AutoClaimIds(XAutoClaimJustIdResponse),
    PendingSummary(XPendingSummary),
    PendingDetails(Vec<XPendingDetail>),
    KeyValues(KeyWithValues),
}

impl Reply {
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Reply::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Reply::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Reply::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Reply>> {
        match self {
            Reply::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

impl From<i64> for Reply {
    fn from(n: i64) -> Self {
        Reply::Int(n)
    }
}

impl From<f64> for Reply {
    fn from(f: f64) -> Self {
        Reply::Float(f)
    }
}

// ── Sorted sets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAndScore {
    pub member: String,
    pub score: f64,
}

/// Result of BZPOPMIN / BZPOPMAX.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyWithMemberAndScore {
    pub key: String,
    pub member: String,
    pub score: f64,
}

/// Result of ZMPOP / BZMPOP.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyWithArrayOfMembersAndScores {
    pub key: String,
    pub members_and_scores: Vec<MemberAndScore>,
}

/// Result of ZRANK / ZREVRANK with `WITHSCORE`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankAndScore {
    pub rank: i64,
    pub score: f64,
}

// ── Lists ───────────────────────────────────────────────────────────────

/// A key and the elements popped from it (LMPOP, BLPOP).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyWithValues {
    pub key: String,
    pub values: Vec<String>,
}

// ── Scanning ────────────────────────────────────────────────────────────

/// Opaque SCAN-family iteration token.
///
/// Start with [`Cursor::initial`]; pass the returned cursor to the next call
/// until [`Cursor::is_finished`] reports true. Reusing a cursor replays the
/// same logical position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    const FINISHED: &'static str = "0";

    /// The cursor that starts a new iteration.
    pub fn initial() -> Self {
        Cursor(Self::FINISHED.to_string())
    }

    /// Returns true when a returned cursor signals the end of the iteration.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.0 == Self::FINISHED
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::initial()
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Cursor(s)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Cursor(s.to_string())
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a SCAN-family iteration.
///
/// For HSCAN and ZSCAN `data` holds alternating field/value (member/score)
/// items, as the store sends them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub cursor: Cursor,
    pub data: Vec<String>,
}

// ── Streams ─────────────────────────────────────────────────────────────

/// A stream entry. `fields` is `None` when the entry was deleted after it
/// was delivered but before it was read back or claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: String,
    pub fields: Option<Vec<(String, String)>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAutoClaimResponse {
    pub next_entry: String,
    pub claimed_entries: Vec<StreamEntry>,
    /// Ids that no longer exist in the stream. Empty on servers that do not
    /// report them.
    pub deleted_messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAutoClaimJustIdResponse {
    pub next_entry: String,
    pub claimed_entries: Vec<String>,
    pub deleted_messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerPendingMessage {
    pub consumer_name: String,
    pub message_count: i64,
}

/// Summary form of XPENDING.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPendingSummary {
    pub num_of_messages: i64,
    pub start_id: Option<String>,
    pub end_id: Option<String>,
    pub consumer_messages: Vec<ConsumerPendingMessage>,
}

/// Extended form of XPENDING, one per pending entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPendingDetail {
    pub id: String,
    pub consumer_name: String,
    pub idle_time: i64,
    pub delivery_count: i64,
}
