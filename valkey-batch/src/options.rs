//! Optional-argument builders.
//!
//! Each options struct expands into the argument tokens its command expects.
//! Combinations the store would reject are caught here, when the command is
//! added to a batch, and recorded as construction errors instead of reaching
//! the server.

use std::time::Duration;

use crate::error::ArgError;

fn invalid(msg: impl Into<String>) -> ArgError {
    ArgError::Invalid(msg.into())
}

fn conflict(msg: impl Into<String>) -> ArgError {
    ArgError::Conflict(msg.into())
}

/// Reject counts that must be strictly positive.
pub(crate) fn positive(name: &str, n: i64) -> Result<i64, ArgError> {
    if n > 0 {
        Ok(n)
    } else {
        Err(invalid(format!("{name} must be positive, got {n}")))
    }
}

// ── Strings ─────────────────────────────────────────────────────────────

/// Condition under which SET writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalSet {
    /// `XX`
    OnlyIfExists,
    /// `NX`
    OnlyIfDoesNotExist,
    /// `IFEQ <value>`: only if the current value equals the comparison value.
    OnlyIfEquals(String),
}

/// Key lifetime for SET and GETEX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Seconds(u64),
    Milliseconds(u64),
    UnixSeconds(u64),
    UnixMilliseconds(u64),
    /// Retain the existing TTL (SET only).
    KeepTtl,
    /// Remove the TTL (GETEX only).
    Persist,
}

impl Expiry {
    fn push_args(self, args: &mut Vec<String>) {
        let (keyword, count) = match self {
            Expiry::Seconds(n) => ("EX", Some(n)),
            Expiry::Milliseconds(n) => ("PX", Some(n)),
            Expiry::UnixSeconds(n) => ("EXAT", Some(n)),
            Expiry::UnixMilliseconds(n) => ("PXAT", Some(n)),
            Expiry::KeepTtl => ("KEEPTTL", None),
            Expiry::Persist => ("PERSIST", None),
        };
        args.push(keyword.to_string());
        if let Some(n) = count {
            args.push(n.to_string());
        }
    }
}

/// Optional arguments for SET.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    conditional_set: Option<ConditionalSet>,
    return_old_value: bool,
    expiry: Option<Expiry>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditional_set(mut self, condition: ConditionalSet) -> Self {
        self.conditional_set = Some(condition);
        self
    }

    /// Return the previous value (`GET`).
    pub fn return_old_value(mut self, enabled: bool) -> Self {
        self.return_old_value = enabled;
        self
    }

    pub fn expiry(mut self, expiry: Expiry) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        match &self.conditional_set {
            Some(ConditionalSet::OnlyIfExists) => args.push("XX".to_string()),
            Some(ConditionalSet::OnlyIfDoesNotExist) => args.push("NX".to_string()),
            Some(ConditionalSet::OnlyIfEquals(value)) => {
                args.push("IFEQ".to_string());
                args.push(value.clone());
            }
            None => {}
        }
        if self.return_old_value {
            args.push("GET".to_string());
        }
        if let Some(expiry) = self.expiry {
            if expiry == Expiry::Persist {
                return Err(invalid("PERSIST is not a valid expiry for SET"));
            }
            expiry.push_args(&mut args);
        }
        Ok(args)
    }
}

/// Optional arguments for GETEX.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetExOptions {
    expiry: Option<Expiry>,
}

impl GetExOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expiry(mut self, expiry: Expiry) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        if let Some(expiry) = self.expiry {
            if expiry == Expiry::KeepTtl {
                return Err(invalid("KEEPTTL is not valid for GETEX"));
            }
            expiry.push_args(&mut args);
        }
        Ok(args)
    }
}

// ── Keys ────────────────────────────────────────────────────────────────

/// Condition for EXPIRE-family commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireCondition {
    /// `XX`
    HasExistingExpiry,
    /// `NX`
    HasNoExpiry,
    /// `GT`
    NewExpiryGreaterThanCurrent,
    /// `LT`
    NewExpiryLessThanCurrent,
}

impl ExpireCondition {
    pub fn as_arg(self) -> &'static str {
        match self {
            ExpireCondition::HasExistingExpiry => "XX",
            ExpireCondition::HasNoExpiry => "NX",
            ExpireCondition::NewExpiryGreaterThanCurrent => "GT",
            ExpireCondition::NewExpiryLessThanCurrent => "LT",
        }
    }
}

/// Optional arguments for SCAN, SSCAN and ZSCAN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pattern: Option<String>,
    count: Option<i64>,
    object_type: Option<String>,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only return items matching this glob pattern (`MATCH`).
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Hint for the number of items per page (`COUNT`).
    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    /// Only return keys of this type (`TYPE`). SCAN only.
    pub fn object_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        if let Some(pattern) = &self.pattern {
            args.push("MATCH".to_string());
            args.push(pattern.clone());
        }
        if let Some(count) = self.count {
            args.push("COUNT".to_string());
            args.push(positive("COUNT", count)?.to_string());
        }
        if let Some(object_type) = &self.object_type {
            args.push("TYPE".to_string());
            args.push(object_type.clone());
        }
        Ok(args)
    }

    /// Arguments for the key-scoped scans, which have no `TYPE` filter.
    pub(crate) fn to_member_args(&self) -> Result<Vec<String>, ArgError> {
        if self.object_type.is_some() {
            return Err(invalid("TYPE is only valid for SCAN"));
        }
        self.to_args()
    }
}

/// Optional arguments for HSCAN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashScanOptions {
    scan: ScanOptions,
    no_values: bool,
}

impl HashScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.scan = self.scan.pattern(pattern);
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.scan = self.scan.count(count);
        self
    }

    /// Return field names only (`NOVALUES`).
    pub fn no_values(mut self, enabled: bool) -> Self {
        self.no_values = enabled;
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = self.scan.to_member_args()?;
        if self.no_values {
            args.push("NOVALUES".to_string());
        }
        Ok(args)
    }
}

// ── Lists ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDirection {
    Left,
    Right,
}

impl ListDirection {
    pub fn as_arg(self) -> &'static str {
        match self {
            ListDirection::Left => "LEFT",
            ListDirection::Right => "RIGHT",
        }
    }
}

/// Where LINSERT places the new element relative to the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

impl InsertPosition {
    pub fn as_arg(self) -> &'static str {
        match self {
            InsertPosition::Before => "BEFORE",
            InsertPosition::After => "AFTER",
        }
    }
}

/// Optional arguments for LPOS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LPosOptions {
    rank: Option<i64>,
    max_len: Option<i64>,
}

impl LPosOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Which match to return; negative ranks search from the tail.
    pub fn rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Limit the number of elements compared; `0` means unlimited.
    pub fn max_len(mut self, max_len: i64) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        if let Some(rank) = self.rank {
            if rank == 0 {
                return Err(invalid("RANK can't be zero"));
            }
            args.push("RANK".to_string());
            args.push(rank.to_string());
        }
        if let Some(max_len) = self.max_len {
            if max_len < 0 {
                return Err(invalid(format!("MAXLEN can't be negative, got {max_len}")));
            }
            args.push("MAXLEN".to_string());
            args.push(max_len.to_string());
        }
        Ok(args)
    }
}

// ── Sorted sets ─────────────────────────────────────────────────────────

/// Which end of a sorted set ZMPOP pops from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFilter {
    Min,
    Max,
}

impl ScoreFilter {
    pub fn as_arg(self) -> &'static str {
        match self {
            ScoreFilter::Min => "MIN",
            ScoreFilter::Max => "MAX",
        }
    }
}

/// `NX` / `XX` for ZADD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalChange {
    OnlyIfExists,
    OnlyIfDoesNotExist,
}

/// `GT` / `LT` for ZADD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOptions {
    ScoreGreaterThanCurrent,
    ScoreLessThanCurrent,
}

/// Optional arguments for ZADD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZAddOptions {
    conditional_change: Option<ConditionalChange>,
    update: Option<UpdateOptions>,
    changed: bool,
    incr: bool,
}

impl ZAddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditional_change(mut self, condition: ConditionalChange) -> Self {
        self.conditional_change = Some(condition);
        self
    }

    pub fn update(mut self, update: UpdateOptions) -> Self {
        self.update = Some(update);
        self
    }

    /// Count changed members rather than added ones (`CH`).
    pub fn changed(mut self, enabled: bool) -> Self {
        self.changed = enabled;
        self
    }

    /// Increment the member's score instead of setting it (`INCR`).
    pub fn incr(mut self, enabled: bool) -> Self {
        self.incr = enabled;
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        if self.changed && self.incr {
            return Err(conflict("CH and INCR can't be used together"));
        }
        let mut args = Vec::new();
        match self.conditional_change {
            Some(ConditionalChange::OnlyIfExists) => args.push("XX".to_string()),
            Some(ConditionalChange::OnlyIfDoesNotExist) => {
                if self.update.is_some() {
                    return Err(conflict("GT or LT can't be combined with NX"));
                }
                args.push("NX".to_string());
            }
            None => {}
        }
        match self.update {
            Some(UpdateOptions::ScoreGreaterThanCurrent) => args.push("GT".to_string()),
            Some(UpdateOptions::ScoreLessThanCurrent) => args.push("LT".to_string()),
            None => {}
        }
        if self.changed {
            args.push("CH".to_string());
        }
        if self.incr {
            args.push("INCR".to_string());
        }
        Ok(args)
    }

    pub(crate) fn is_incr(&self) -> bool {
        self.incr
    }
}

/// One end of a score range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBoundary {
    Inclusive(f64),
    Exclusive(f64),
    PositiveInfinity,
    NegativeInfinity,
}

impl ScoreBoundary {
    pub(crate) fn to_arg(self) -> String {
        match self {
            ScoreBoundary::Inclusive(n) => n.to_string(),
            ScoreBoundary::Exclusive(n) => format!("({n}"),
            ScoreBoundary::PositiveInfinity => "+inf".to_string(),
            ScoreBoundary::NegativeInfinity => "-inf".to_string(),
        }
    }
}

/// `LIMIT offset count` for score ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: i64,
    pub count: i64,
}

/// Range query for ZRANGE.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeQuery {
    /// Rank range; negative indexes count from the end.
    ByIndex { start: i64, end: i64, reverse: bool },
    /// Score range, optionally paginated.
    ByScore {
        start: ScoreBoundary,
        end: ScoreBoundary,
        reverse: bool,
        limit: Option<Limit>,
    },
}

impl RangeQuery {
    pub fn by_index(start: i64, end: i64) -> Self {
        RangeQuery::ByIndex {
            start,
            end,
            reverse: false,
        }
    }

    pub fn by_score(start: ScoreBoundary, end: ScoreBoundary) -> Self {
        RangeQuery::ByScore {
            start,
            end,
            reverse: false,
            limit: None,
        }
    }

    /// Return elements in descending order (`REV`).
    pub fn reversed(mut self) -> Self {
        match &mut self {
            RangeQuery::ByIndex { reverse, .. } | RangeQuery::ByScore { reverse, .. } => {
                *reverse = true
            }
        }
        self
    }

    /// Paginate a score range. Has no effect on index ranges.
    pub fn limit(mut self, offset: i64, count: i64) -> Self {
        if let RangeQuery::ByScore { limit, .. } = &mut self {
            *limit = Some(Limit { offset, count });
        }
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        let reverse = match self {
            RangeQuery::ByIndex {
                start,
                end,
                reverse,
            } => {
                args.push(start.to_string());
                args.push(end.to_string());
                *reverse
            }
            RangeQuery::ByScore {
                start,
                end,
                reverse,
                ..
            } => {
                // REV expects the range as max..min
                let (first, second) = if *reverse { (end, start) } else { (start, end) };
                args.push(first.to_arg());
                args.push(second.to_arg());
                args.push("BYSCORE".to_string());
                *reverse
            }
        };
        if reverse {
            args.push("REV".to_string());
        }
        if let RangeQuery::ByScore {
            limit: Some(limit), ..
        } = self
        {
            args.push("LIMIT".to_string());
            args.push(limit.offset.to_string());
            args.push(limit.count.to_string());
        }
        Ok(args)
    }
}

// ── Streams ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimStrategy {
    /// Keep at most this many entries.
    MaxLen(i64),
    /// Evict entries with ids lower than this one.
    MinId(String),
}

/// Trimming for XADD and XTRIM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XTrimOptions {
    strategy: TrimStrategy,
    exact: Option<bool>,
    limit: Option<i64>,
}

impl XTrimOptions {
    pub fn max_len(threshold: i64) -> Self {
        Self {
            strategy: TrimStrategy::MaxLen(threshold),
            exact: None,
            limit: None,
        }
    }

    pub fn min_id(threshold: impl Into<String>) -> Self {
        Self {
            strategy: TrimStrategy::MinId(threshold.into()),
            exact: None,
            limit: None,
        }
    }

    /// Trim exactly (`=`) or approximately (`~`).
    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    /// Cap the entries evicted by an approximate trim (`LIMIT`).
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        let threshold = match &self.strategy {
            TrimStrategy::MaxLen(n) => {
                args.push("MAXLEN".to_string());
                n.to_string()
            }
            TrimStrategy::MinId(id) => {
                args.push("MINID".to_string());
                id.clone()
            }
        };
        match self.exact {
            Some(true) => args.push("=".to_string()),
            Some(false) => args.push("~".to_string()),
            None => {}
        }
        args.push(threshold);
        if let Some(limit) = self.limit {
            if self.exact != Some(false) {
                return Err(conflict("LIMIT requires approximate trimming"));
            }
            args.push("LIMIT".to_string());
            args.push(positive("LIMIT", limit)?.to_string());
        }
        Ok(args)
    }
}

/// Optional arguments for XADD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAddOptions {
    id: Option<String>,
    make_stream: bool,
    trim: Option<XTrimOptions>,
}

impl Default for XAddOptions {
    fn default() -> Self {
        Self {
            id: None,
            make_stream: true,
            trim: None,
        }
    }
}

impl XAddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit entry id; `*` (auto-generated) when unset.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Don't create the stream if it does not exist (`NOMKSTREAM`).
    pub fn no_make_stream(mut self) -> Self {
        self.make_stream = false;
        self
    }

    pub fn trim(mut self, trim: XTrimOptions) -> Self {
        self.trim = Some(trim);
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        if !self.make_stream {
            args.push("NOMKSTREAM".to_string());
        }
        if let Some(trim) = &self.trim {
            args.extend(trim.to_args()?);
        }
        args.push(self.id.clone().unwrap_or_else(|| "*".to_string()));
        Ok(args)
    }

    /// Whether XADD may reply nil (stream missing and not created).
    pub(crate) fn may_skip(&self) -> bool {
        !self.make_stream
    }
}

/// Optional arguments for XREAD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XReadOptions {
    count: Option<i64>,
    block: Option<Duration>,
}

impl XReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    /// Block for up to this long waiting for entries; zero blocks forever.
    pub fn block(mut self, block: Duration) -> Self {
        self.block = Some(block);
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        if let Some(count) = self.count {
            args.push("COUNT".to_string());
            args.push(positive("COUNT", count)?.to_string());
        }
        if let Some(block) = self.block {
            args.push("BLOCK".to_string());
            args.push(block.as_millis().to_string());
        }
        Ok(args)
    }
}

/// Optional arguments for XREADGROUP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XReadGroupOptions {
    read: XReadOptions,
    no_ack: bool,
}

impl XReadGroupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(mut self, count: i64) -> Self {
        self.read = self.read.count(count);
        self
    }

    pub fn block(mut self, block: Duration) -> Self {
        self.read = self.read.block(block);
        self
    }

    /// Don't add read entries to the pending list (`NOACK`).
    pub fn no_ack(mut self) -> Self {
        self.no_ack = true;
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = self.read.to_args()?;
        if self.no_ack {
            args.push("NOACK".to_string());
        }
        Ok(args)
    }
}

/// Optional arguments for XAUTOCLAIM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XAutoClaimOptions {
    count: Option<i64>,
}

impl XAutoClaimOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        match self.count {
            Some(count) => Ok(vec!["COUNT".to_string(), positive("COUNT", count)?.to_string()]),
            None => Ok(Vec::new()),
        }
    }
}

/// Range form of XPENDING.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPendingOptions {
    min_idle_time: Option<i64>,
    start: String,
    end: String,
    count: i64,
    consumer: Option<String>,
}

impl XPendingOptions {
    pub fn new(start: impl Into<String>, end: impl Into<String>, count: i64) -> Self {
        Self {
            min_idle_time: None,
            start: start.into(),
            end: end.into(),
            count,
            consumer: None,
        }
    }

    /// Only entries idle for at least this many milliseconds (`IDLE`).
    pub fn min_idle_time(mut self, millis: i64) -> Self {
        self.min_idle_time = Some(millis);
        self
    }

    pub fn consumer(mut self, consumer: impl Into<String>) -> Self {
        self.consumer = Some(consumer.into());
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        if self.count < 0 {
            return Err(invalid(format!("count can't be negative, got {}", self.count)));
        }
        let mut args = Vec::new();
        if let Some(idle) = self.min_idle_time {
            args.push("IDLE".to_string());
            args.push(idle.to_string());
        }
        args.push(self.start.clone());
        args.push(self.end.clone());
        args.push(self.count.to_string());
        if let Some(consumer) = &self.consumer {
            args.push(consumer.clone());
        }
        Ok(args)
    }
}

/// Optional arguments for XGROUP CREATE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XGroupCreateOptions {
    make_stream: bool,
    entries_read: Option<i64>,
}

impl XGroupCreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the stream if it does not exist (`MKSTREAM`).
    pub fn make_stream(mut self) -> Self {
        self.make_stream = true;
        self
    }

    pub fn entries_read(mut self, entries_read: i64) -> Self {
        self.entries_read = Some(entries_read);
        self
    }

    pub fn to_args(&self) -> Result<Vec<String>, ArgError> {
        let mut args = Vec::new();
        if self.make_stream {
            args.push("MKSTREAM".to_string());
        }
        if let Some(n) = self.entries_read {
            args.push("ENTRIESREAD".to_string());
            args.push(n.to_string());
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Strings
    // ========================================================================

    #[test]
    fn test_set_options() {
        let opts = SetOptions::new()
            .conditional_set(ConditionalSet::OnlyIfDoesNotExist)
            .return_old_value(true)
            .expiry(Expiry::Seconds(10));
        assert_eq!(opts.to_args().unwrap(), vec!["NX", "GET", "EX", "10"]);
    }

    #[test]
    fn test_set_ifeq_keepttl() {
        let opts = SetOptions::new()
            .conditional_set(ConditionalSet::OnlyIfEquals("old".into()))
            .expiry(Expiry::KeepTtl);
        assert_eq!(opts.to_args().unwrap(), vec!["IFEQ", "old", "KEEPTTL"]);
    }

    #[test]
    fn test_set_rejects_persist() {
        let opts = SetOptions::new().expiry(Expiry::Persist);
        assert!(matches!(opts.to_args(), Err(ArgError::Invalid(_))));
    }

    #[test]
    fn test_getex_options() {
        assert_eq!(
            GetExOptions::new().expiry(Expiry::Persist).to_args().unwrap(),
            vec!["PERSIST"]
        );
        assert_eq!(
            GetExOptions::new()
                .expiry(Expiry::UnixMilliseconds(5))
                .to_args()
                .unwrap(),
            vec!["PXAT", "5"]
        );
        assert!(GetExOptions::new().expiry(Expiry::KeepTtl).to_args().is_err());
    }

    // ========================================================================
    // Scan / lists
    // ========================================================================

    #[test]
    fn test_scan_options() {
        let opts = ScanOptions::new().pattern("user:*").count(100).object_type("hash");
        assert_eq!(
            opts.to_args().unwrap(),
            vec!["MATCH", "user:*", "COUNT", "100", "TYPE", "hash"]
        );
        assert!(opts.to_member_args().is_err());
        assert!(ScanOptions::new().count(0).to_args().is_err());
    }

    #[test]
    fn test_hash_scan_options() {
        let opts = HashScanOptions::new().count(5).no_values(true);
        assert_eq!(opts.to_args().unwrap(), vec!["COUNT", "5", "NOVALUES"]);
    }

    #[test]
    fn test_lpos_options() {
        assert_eq!(
            LPosOptions::new().rank(-1).max_len(0).to_args().unwrap(),
            vec!["RANK", "-1", "MAXLEN", "0"]
        );
        assert!(LPosOptions::new().rank(0).to_args().is_err());
        assert!(LPosOptions::new().max_len(-1).to_args().is_err());
    }

    // ========================================================================
    // Sorted sets
    // ========================================================================

    #[test]
    fn test_zadd_options() {
        let opts = ZAddOptions::new()
            .conditional_change(ConditionalChange::OnlyIfExists)
            .update(UpdateOptions::ScoreGreaterThanCurrent)
            .changed(true);
        assert_eq!(opts.to_args().unwrap(), vec!["XX", "GT", "CH"]);
    }

    #[test]
    fn test_zadd_ch_incr_conflict() {
        let opts = ZAddOptions::new().changed(true).incr(true);
        assert!(matches!(opts.to_args(), Err(ArgError::Conflict(_))));
    }

    #[test]
    fn test_zadd_nx_gt_conflict() {
        let opts = ZAddOptions::new()
            .conditional_change(ConditionalChange::OnlyIfDoesNotExist)
            .update(UpdateOptions::ScoreLessThanCurrent);
        assert!(matches!(opts.to_args(), Err(ArgError::Conflict(_))));
    }

    #[test]
    fn test_range_by_index() {
        assert_eq!(RangeQuery::by_index(0, -1).to_args().unwrap(), vec!["0", "-1"]);
        assert_eq!(
            RangeQuery::by_index(0, 2).reversed().to_args().unwrap(),
            vec!["0", "2", "REV"]
        );
    }

    #[test]
    fn test_range_by_score() {
        let q = RangeQuery::by_score(ScoreBoundary::Exclusive(1.5), ScoreBoundary::PositiveInfinity)
            .limit(0, 10);
        assert_eq!(
            q.to_args().unwrap(),
            vec!["(1.5", "+inf", "BYSCORE", "LIMIT", "0", "10"]
        );
        let rev = RangeQuery::by_score(ScoreBoundary::NegativeInfinity, ScoreBoundary::Inclusive(3.0))
            .reversed();
        assert_eq!(rev.to_args().unwrap(), vec!["3", "-inf", "BYSCORE", "REV"]);
    }

    // ========================================================================
    // Streams
    // ========================================================================

    #[test]
    fn test_xadd_options() {
        assert_eq!(XAddOptions::new().to_args().unwrap(), vec!["*"]);
        let opts = XAddOptions::new()
            .id("1-0")
            .no_make_stream()
            .trim(XTrimOptions::max_len(100).exact(false).limit(10));
        assert_eq!(
            opts.to_args().unwrap(),
            vec!["NOMKSTREAM", "MAXLEN", "~", "100", "LIMIT", "10", "1-0"]
        );
    }

    #[test]
    fn test_xtrim_limit_requires_approximate() {
        let opts = XTrimOptions::min_id("5-0").exact(true).limit(10);
        assert!(matches!(opts.to_args(), Err(ArgError::Conflict(_))));
        assert_eq!(
            XTrimOptions::min_id("5-0").to_args().unwrap(),
            vec!["MINID", "5-0"]
        );
    }

    #[test]
    fn test_xread_options() {
        let opts = XReadOptions::new().count(2).block(Duration::from_millis(1500));
        assert_eq!(opts.to_args().unwrap(), vec!["COUNT", "2", "BLOCK", "1500"]);
        assert!(XReadOptions::new().count(0).to_args().is_err());
        assert_eq!(
            XReadGroupOptions::new().no_ack().to_args().unwrap(),
            vec!["NOACK"]
        );
    }

    #[test]
    fn test_xautoclaim_options() {
        assert!(XAutoClaimOptions::new().to_args().unwrap().is_empty());
        assert_eq!(
            XAutoClaimOptions::new().count(3).to_args().unwrap(),
            vec!["COUNT", "3"]
        );
        assert!(XAutoClaimOptions::new().count(-1).to_args().is_err());
    }

    #[test]
    fn test_xpending_options() {
        let opts = XPendingOptions::new("-", "+", 10)
            .min_idle_time(500)
            .consumer("alice");
        assert_eq!(
            opts.to_args().unwrap(),
            vec!["IDLE", "500", "-", "+", "10", "alice"]
        );
        assert!(XPendingOptions::new("-", "+", -1).to_args().is_err());
    }

    #[test]
    fn test_xgroup_create_options() {
        let opts = XGroupCreateOptions::new().make_stream().entries_read(3);
        assert_eq!(opts.to_args().unwrap(), vec!["MKSTREAM", "ENTRIESREAD", "3"]);
    }
}
