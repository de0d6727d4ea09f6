//! Reply type guards and the converter registry.
//!
//! Every command record carries a [`Converter`]: an optional expected shape,
//! whether `nil` is acceptable, and a pure transform. The guard runs first,
//! so a transform only ever sees values of the shape it was declared for.
//! Transforms still never panic: malformed nested structure becomes a
//! [`ConvertError`], reported in that command's slot.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use protocol_resp::Value;
use tracing::trace;

use crate::command::RequestType;
use crate::error::CommandError;
use crate::reply::{
    CommandResult, ConsumerPendingMessage, Cursor, KeyWithArrayOfMembersAndScores,
    KeyWithMemberAndScore, KeyWithValues, MemberAndScore, RankAndScore, Reply, ScanResult,
    StreamEntry, XAutoClaimJustIdResponse, XAutoClaimResponse, XPendingDetail, XPendingSummary,
};

/// Expected shape of a reply, declared when a command is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expect {
    /// Simple, bulk or verbatim string.
    Text,
    Int,
    /// Double, or a numeric string on RESP2.
    Float,
    /// Boolean, or integer `0`/`1` on RESP2.
    Bool,
    Array,
    /// Map, or a flat key/value array on RESP2.
    Map,
    Set,
}

impl Expect {
    /// Returns true if `value` has a shape acceptable for this expectation.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Expect::Text => value.is_text(),
            Expect::Int => matches!(value, Value::Integer(_)),
            Expect::Float => matches!(value, Value::Double(_) | Value::Integer(_)) || value.is_text(),
            Expect::Bool => matches!(value, Value::Boolean(_) | Value::Integer(_)),
            Expect::Array | Expect::Set => matches!(value, Value::Array(_) | Value::Set(_)),
            Expect::Map => matches!(value, Value::Map(_) | Value::Array(_)),
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Expect::Text => "string",
            Expect::Int => "integer",
            Expect::Float => "double",
            Expect::Bool => "boolean",
            Expect::Array => "array",
            Expect::Map => "map",
            Expect::Set => "set",
        })
    }
}

/// A transform failed on a reply whose outer shape was already accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ConvertError(String);

impl ConvertError {
    fn unexpected(what: &str, value: &Value) -> Self {
        ConvertError(format!("expected {what}, got {}", value.kind()))
    }
}

/// Pure reply transform.
pub type Transform = fn(Value) -> Result<Reply, ConvertError>;

/// How a command's raw reply is checked and converted.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    expect: Option<Expect>,
    nilable: bool,
    transform: Transform,
}

impl Converter {
    /// No guard; the raw reply is passed through as [`Reply::Value`].
    pub(crate) const fn identity() -> Self {
        Self {
            expect: None,
            nilable: true,
            transform: raw,
        }
    }

    /// Guard on `expect`, then normalize into the matching plain [`Reply`].
    pub(crate) const fn checked(expect: Expect, nilable: bool) -> Self {
        let transform: Transform = match expect {
            Expect::Text => text,
            Expect::Int => int,
            Expect::Float => float,
            Expect::Bool => boolean,
            Expect::Array => array,
            Expect::Map => map,
            Expect::Set => set_of_text,
        };
        Self {
            expect: Some(expect),
            nilable,
            transform,
        }
    }

    /// Guard on `expect`, then run `transform`.
    pub(crate) const fn converted(expect: Expect, nilable: bool, transform: Transform) -> Self {
        Self {
            expect: Some(expect),
            nilable,
            transform,
        }
    }

    /// Declared reply shape, `None` for pass-through commands.
    #[inline]
    pub fn expect(&self) -> Option<Expect> {
        self.expect
    }

    #[inline]
    pub fn is_nilable(&self) -> bool {
        self.nilable
    }

    /// Convert the reply for the command at `index`.
    ///
    /// Error replies become [`CommandError::Server`] regardless of the
    /// declared shape.
    pub fn apply(&self, index: usize, command: RequestType, value: Value) -> CommandResult {
        if let Some(message) = value.error_message() {
            return Err(CommandError::Server(message));
        }

        if let Some(expected) = self.expect {
            if value.is_null() {
                if self.nilable {
                    return Ok(Reply::Nil);
                }
                return Err(mismatch(index, command, expected, &value));
            }
            if !expected.matches(&value) {
                return Err(mismatch(index, command, expected, &value));
            }
        }

        (self.transform)(value).map_err(|e| {
            trace!(index, %command, error = %e, "reply conversion failed");
            CommandError::Conversion {
                index,
                command,
                message: e.0,
            }
        })
    }
}

fn mismatch(index: usize, command: RequestType, expected: Expect, value: &Value) -> CommandError {
    let actual = value.kind();
    trace!(index, %command, %expected, %actual, "reply type mismatch");
    CommandError::TypeMismatch {
        index,
        command,
        expected,
        actual,
    }
}

// ── Scalar helpers ──────────────────────────────────────────────────────

fn to_string(value: Value) -> Result<String, ConvertError> {
    match value {
        Value::SimpleString(b) | Value::BulkString(b) | Value::BigNumber(b) => {
            Ok(String::from_utf8_lossy(&b).into_owned())
        }
        Value::VerbatimString { data, .. } => Ok(String::from_utf8_lossy(&data).into_owned()),
        other => Err(ConvertError::unexpected("string", &other)),
    }
}

fn to_nilable_string(value: Value) -> Result<Option<String>, ConvertError> {
    match value {
        Value::Null => Ok(None),
        other => to_string(other).map(Some),
    }
}

fn to_int(value: Value) -> Result<i64, ConvertError> {
    match value {
        Value::Integer(n) => Ok(n),
        // Some replies (XPENDING consumer counts) carry integers as strings.
        ref other if other.is_text() => other
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ConvertError::unexpected("integer", other)),
        other => Err(ConvertError::unexpected("integer", &other)),
    }
}

fn to_float(value: Value) -> Result<f64, ConvertError> {
    value
        .as_double()
        .ok_or_else(|| ConvertError::unexpected("double", &value))
}

fn to_sequence(value: Value) -> Result<Vec<Value>, ConvertError> {
    value
        .into_sequence()
        .map_err(|v| ConvertError::unexpected("array", &v))
}

fn to_strings(value: Value) -> Result<Vec<String>, ConvertError> {
    to_sequence(value)?.into_iter().map(to_string).collect()
}

/// Key/value pairs from any of the store's pair encodings: a RESP3 map, an
/// array of two-element arrays, or a flat array of alternating items.
fn to_pairs(value: Value) -> Result<Vec<(Value, Value)>, ConvertError> {
    match value {
        Value::Array(items) if !items.is_empty() && items.iter().all(is_pair) => items
            .into_iter()
            .map(|item| {
                let mut it = to_sequence(item)?.into_iter();
                match (it.next(), it.next()) {
                    (Some(k), Some(v)) => Ok((k, v)),
                    _ => Err(ConvertError("expected a two-element array".into())),
                }
            })
            .collect(),
        other => other
            .into_pairs()
            .map_err(|v| ConvertError::unexpected("key/value pairs", &v)),
    }
}

fn is_pair(value: &Value) -> bool {
    value.as_array().is_some_and(|a| a.len() == 2)
}

/// Split a fixed-size array reply into its elements.
fn to_tuple<const N: usize>(value: Value, what: &str) -> Result<[Value; N], ConvertError> {
    let items = to_sequence(value)?;
    let len = items.len();
    <[Value; N]>::try_from(items)
        .map_err(|_| ConvertError(format!("expected {what} of {N} elements, got {len}")))
}

// ── Plain normalization ─────────────────────────────────────────────────

/// Identity transform.
pub(crate) fn raw(value: Value) -> Result<Reply, ConvertError> {
    Ok(Reply::Value(value))
}

pub(crate) fn text(value: Value) -> Result<Reply, ConvertError> {
    to_string(value).map(Reply::Text)
}

pub(crate) fn int(value: Value) -> Result<Reply, ConvertError> {
    to_int(value).map(Reply::Int)
}

pub(crate) fn float(value: Value) -> Result<Reply, ConvertError> {
    to_float(value).map(Reply::Float)
}

pub(crate) fn boolean(value: Value) -> Result<Reply, ConvertError> {
    value
        .as_bool()
        .map(Reply::Bool)
        .ok_or_else(|| ConvertError::unexpected("boolean", &value))
}

/// Structural conversion of an arbitrary reply.
pub(crate) fn plain(value: Value) -> Result<Reply, ConvertError> {
    match value {
        Value::Null => Ok(Reply::Nil),
        Value::Integer(n) => Ok(Reply::Int(n)),
        Value::Double(d) => Ok(Reply::Float(d)),
        Value::Boolean(b) => Ok(Reply::Bool(b)),
        Value::Array(items) | Value::Set(items) | Value::Push(items) => {
            items.into_iter().map(plain).collect::<Result<_, _>>().map(Reply::Array)
        }
        Value::Map(entries) => map_with(Value::Map(entries), plain),
        Value::Error(_) | Value::BulkError(_) => Ok(Reply::Value(value)),
        other => text(other),
    }
}

pub(crate) fn array(value: Value) -> Result<Reply, ConvertError> {
    to_sequence(value)?
        .into_iter()
        .map(plain)
        .collect::<Result<_, _>>()
        .map(Reply::Array)
}

pub(crate) fn map(value: Value) -> Result<Reply, ConvertError> {
    map_with(value, plain)
}

// ── Collections ─────────────────────────────────────────────────────────

fn array_with(
    value: Value,
    element: fn(Value) -> Result<Reply, ConvertError>,
) -> Result<Reply, ConvertError> {
    to_sequence(value)?
        .into_iter()
        .map(element)
        .collect::<Result<_, _>>()
        .map(Reply::Array)
}

fn map_with(
    value: Value,
    element: fn(Value) -> Result<Reply, ConvertError>,
) -> Result<Reply, ConvertError> {
    let mut out = BTreeMap::new();
    for (k, v) in to_pairs(value)? {
        out.insert(to_string(k)?, element(v)?);
    }
    Ok(Reply::Map(out))
}

fn nilable(
    value: Value,
    element: fn(Value) -> Result<Reply, ConvertError>,
) -> Result<Reply, ConvertError> {
    match value {
        Value::Null => Ok(Reply::Nil),
        other => element(other),
    }
}

pub(crate) fn array_of_text(value: Value) -> Result<Reply, ConvertError> {
    array_with(value, text)
}

/// Multi-key fetches: absent keys are `Nil` elements.
pub(crate) fn array_of_nilable_text(value: Value) -> Result<Reply, ConvertError> {
    array_with(value, |v| nilable(v, text))
}

pub(crate) fn array_of_nilable_float(value: Value) -> Result<Reply, ConvertError> {
    array_with(value, |v| nilable(v, float))
}

pub(crate) fn array_of_int(value: Value) -> Result<Reply, ConvertError> {
    array_with(value, int)
}

pub(crate) fn array_of_bool(value: Value) -> Result<Reply, ConvertError> {
    array_with(value, boolean)
}

pub(crate) fn set_of_text(value: Value) -> Result<Reply, ConvertError> {
    to_strings(value).map(|items| Reply::Set(items.into_iter().collect::<BTreeSet<_>>()))
}

pub(crate) fn map_of_text(value: Value) -> Result<Reply, ConvertError> {
    map_with(value, text)
}

pub(crate) fn map_of_float(value: Value) -> Result<Reply, ConvertError> {
    map_with(value, float)
}

pub(crate) fn map_of_int(value: Value) -> Result<Reply, ConvertError> {
    map_with(value, int)
}

pub(crate) fn string_pairs(value: Value) -> Result<Reply, ConvertError> {
    to_pairs(value)?
        .into_iter()
        .map(|(k, v)| Ok((to_string(k)?, to_string(v)?)))
        .collect::<Result<_, _>>()
        .map(Reply::StringPairs)
}

// ── Sorted sets ─────────────────────────────────────────────────────────

fn to_member_scores(value: Value) -> Result<Vec<MemberAndScore>, ConvertError> {
    to_pairs(value)?
        .into_iter()
        .map(|(m, s)| {
            Ok(MemberAndScore {
                member: to_string(m)?,
                score: to_float(s)?,
            })
        })
        .collect()
}

/// Members with scores, in reply order.
pub(crate) fn member_scores(value: Value) -> Result<Reply, ConvertError> {
    to_member_scores(value).map(Reply::MemberScores)
}

pub(crate) fn key_member_score(value: Value) -> Result<Reply, ConvertError> {
    let [key, member, score] = to_tuple(value, "key/member/score")?;
    Ok(Reply::KeyMemberScore(KeyWithMemberAndScore {
        key: to_string(key)?,
        member: to_string(member)?,
        score: to_float(score)?,
    }))
}

pub(crate) fn key_member_scores(value: Value) -> Result<Reply, ConvertError> {
    let [key, members] = to_tuple(value, "key/members")?;
    Ok(Reply::KeyMemberScores(KeyWithArrayOfMembersAndScores {
        key: to_string(key)?,
        members_and_scores: to_member_scores(members)?,
    }))
}

pub(crate) fn rank_and_score(value: Value) -> Result<Reply, ConvertError> {
    let [rank, score] = to_tuple(value, "rank/score")?;
    Ok(Reply::RankScore(RankAndScore {
        rank: to_int(rank)?,
        score: to_float(score)?,
    }))
}

// ── Lists ───────────────────────────────────────────────────────────────

/// `[key, [values...]]` (LMPOP) or `[key, value]` (BLPOP).
pub(crate) fn key_values(value: Value) -> Result<Reply, ConvertError> {
    let [key, values] = to_tuple(value, "key/values")?;
    let values = if values.is_sequence() {
        to_strings(values)?
    } else {
        vec![to_string(values)?]
    };
    Ok(Reply::KeyValues(KeyWithValues {
        key: to_string(key)?,
        values,
    }))
}

// ── Scanning ────────────────────────────────────────────────────────────

pub(crate) fn scan_result(value: Value) -> Result<Reply, ConvertError> {
    let [cursor, data] = to_tuple(value, "cursor/data")?;
    Ok(Reply::Scan(ScanResult {
        cursor: Cursor::from(to_string(cursor)?),
        data: to_strings(data)?,
    }))
}

// ── Streams ─────────────────────────────────────────────────────────────

fn to_stream_entry(value: Value) -> Result<StreamEntry, ConvertError> {
    let [id, fields] = to_tuple(value, "stream entry")?;
    let fields = match fields {
        Value::Null => None,
        other => Some(
            to_pairs(other)?
                .into_iter()
                .map(|(k, v)| Ok((to_string(k)?, to_string(v)?)))
                .collect::<Result<_, ConvertError>>()?,
        ),
    };
    Ok(StreamEntry {
        id: to_string(id)?,
        fields,
    })
}

fn to_stream_entries(value: Value) -> Result<Vec<StreamEntry>, ConvertError> {
    to_sequence(value)?.into_iter().map(to_stream_entry).collect()
}

pub(crate) fn stream_entries(value: Value) -> Result<Reply, ConvertError> {
    to_stream_entries(value).map(Reply::StreamEntries)
}

/// XREAD / XREADGROUP: entries per stream key.
pub(crate) fn streams(value: Value) -> Result<Reply, ConvertError> {
    let mut out = BTreeMap::new();
    for (key, entries) in to_pairs(value)? {
        out.insert(to_string(key)?, to_stream_entries(entries)?);
    }
    Ok(Reply::Streams(out))
}

/// `[next, claimed, deleted?]`; servers before 7.0 omit `deleted`.
fn split_auto_claim(value: Value) -> Result<(String, Value, Vec<String>), ConvertError> {
    let mut items = to_sequence(value)?.into_iter();
    let (Some(next), Some(claimed)) = (items.next(), items.next()) else {
        return Err(ConvertError("expected at least 2 elements in XAUTOCLAIM reply".into()));
    };
    let deleted = match items.next() {
        Some(v) => to_strings(v)?,
        None => Vec::new(),
    };
    Ok((to_string(next)?, claimed, deleted))
}

pub(crate) fn auto_claim(value: Value) -> Result<Reply, ConvertError> {
    let (next_entry, claimed, deleted_messages) = split_auto_claim(value)?;
    Ok(Reply::AutoClaim(XAutoClaimResponse {
        next_entry,
        claimed_entries: to_stream_entries(claimed)?,
        deleted_messages,
    }))
}

pub(crate) fn auto_claim_ids(value: Value) -> Result<Reply, ConvertError> {
    let (next_entry, claimed, deleted_messages) = split_auto_claim(value)?;
    Ok(Reply::AutoClaimIds(XAutoClaimJustIdResponse {
        next_entry,
        claimed_entries: to_strings(claimed)?,
        deleted_messages,
    }))
}

pub(crate) fn pending_summary(value: Value) -> Result<Reply, ConvertError> {
    let [count, start, end, consumers] = to_tuple(value, "XPENDING summary")?;
    let consumer_messages = match consumers {
        Value::Null => Vec::new(),
        other => to_pairs(other)?
            .into_iter()
            .map(|(name, count)| {
                Ok(ConsumerPendingMessage {
                    consumer_name: to_string(name)?,
                    message_count: to_int(count)?,
                })
            })
            .collect::<Result<_, ConvertError>>()?,
    };
    Ok(Reply::PendingSummary(XPendingSummary {
        num_of_messages: to_int(count)?,
        start_id: to_nilable_string(start)?,
        end_id: to_nilable_string(end)?,
        consumer_messages,
    }))
}

pub(crate) fn pending_details(value: Value) -> Result<Reply, ConvertError> {
    to_sequence(value)?
        .into_iter()
        .map(|item| {
            let [id, consumer, idle, delivered] = to_tuple(item, "XPENDING entry")?;
            Ok(XPendingDetail {
                id: to_string(id)?,
                consumer_name: to_string(consumer)?,
                idle_time: to_int(idle)?,
                delivery_count: to_int(delivered)?,
            })
        })
        .collect::<Result<_, _>>()
        .map(Reply::PendingDetails)
}
