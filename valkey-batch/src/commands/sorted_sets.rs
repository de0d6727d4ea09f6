use std::time::Duration;

use super::lists::timeout_secs;
use crate::batch::{Batch, BatchMode, args, non_empty};
use crate::command::RequestType;
use crate::convert::{self, Converter, Expect};
use crate::error::ArgError;
use crate::options::{RangeQuery, ScanOptions, ScoreBoundary, ScoreFilter, ZAddOptions, positive};
use crate::reply::Cursor;

/// `score member` pairs as ZADD expects them.
fn score_members(members: &[(&str, f64)]) -> Result<Vec<String>, ArgError> {
    if members.is_empty() {
        return Err(ArgError::Invalid("at least one member is required".into()));
    }
    Ok(members
        .iter()
        .flat_map(|(member, score)| [score.to_string(), member.to_string()])
        .collect())
}

fn zadd_args(key: &str, options: &ZAddOptions, members: &[(&str, f64)]) -> Result<Vec<String>, ArgError> {
    let mut a = args([key]);
    a.extend(options.to_args()?);
    a.extend(score_members(members)?);
    Ok(a)
}

/// `numkeys key... MIN|MAX [COUNT n]` for ZMPOP.
fn zmpop_args(keys: &[&str], filter: ScoreFilter, count: Option<i64>) -> Result<Vec<String>, ArgError> {
    let mut a = vec![keys.len().to_string()];
    a.extend(non_empty(keys)?);
    a.push(filter.as_arg().to_string());
    if let Some(count) = count {
        a.push("COUNT".to_string());
        a.push(positive("COUNT", count)?.to_string());
    }
    Ok(a)
}

fn blocking_args(keys: &[&str], timeout: Duration) -> Result<Vec<String>, ArgError> {
    let mut a = non_empty(keys)?;
    a.push(timeout_secs(timeout));
    Ok(a)
}

impl<M: BatchMode> Batch<M> {
    /// ZADD: number of members added.
    pub fn zadd(self, key: &str, members: &[(&str, f64)]) -> Self {
        self.try_add(
            "zadd",
            RequestType::ZAdd,
            zadd_args(key, &ZAddOptions::default(), members),
            Converter::checked(Expect::Int, false),
        )
    }

    /// ZADD with conditions. With `CH` the reply counts changed members.
    ///
    /// `INCR` takes a single member; use [`Batch::zadd_incr_with_options`].
    pub fn zadd_with_options(self, key: &str, members: &[(&str, f64)], options: ZAddOptions) -> Self {
        let built = zadd_args(key, &options, members).and_then(|a| {
            if options.is_incr() {
                Err(ArgError::Invalid("INCR requires zadd_incr_with_options".into()))
            } else {
                Ok(a)
            }
        });
        self.try_add(
            "zadd_with_options",
            RequestType::ZAdd,
            built,
            Converter::checked(Expect::Int, false),
        )
    }

    /// ZADD INCR: the member's new score.
    pub fn zadd_incr(self, key: &str, member: &str, increment: f64) -> Self {
        self.zadd_incr_with_options(key, member, increment, ZAddOptions::default())
    }

    /// ZADD INCR with conditions: the new score, or nil if a condition
    /// prevented the update.
    pub fn zadd_incr_with_options(
        self,
        key: &str,
        member: &str,
        increment: f64,
        options: ZAddOptions,
    ) -> Self {
        let options = options.incr(true);
        self.try_add(
            "zadd_incr_with_options",
            RequestType::ZAdd,
            zadd_args(key, &options, &[(member, increment)]),
            Converter::checked(Expect::Float, true),
        )
    }

    pub fn zincrby(self, key: &str, increment: f64, member: &str) -> Self {
        self.add_cmd_checked(
            RequestType::ZIncrBy,
            vec![key.to_string(), increment.to_string(), member.to_string()],
            Expect::Float,
            false,
        )
    }

    pub fn zrem(self, key: &str, members: &[&str]) -> Self {
        let built = if members.is_empty() {
            Err(ArgError::Invalid("at least one member is required".into()))
        } else {
            let mut a = args([key]);
            a.extend(members.iter().map(|m| m.to_string()));
            Ok(a)
        };
        self.try_add(
            "zrem",
            RequestType::ZRem,
            built,
            Converter::checked(Expect::Int, false),
        )
    }

    pub fn zcard(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::ZCard, args([key]), Expect::Int, false)
    }

    /// ZCOUNT: members with scores between `min` and `max`.
    pub fn zcount(self, key: &str, min: ScoreBoundary, max: ScoreBoundary) -> Self {
        self.add_cmd_checked(
            RequestType::ZCount,
            vec![key.to_string(), min.to_arg(), max.to_arg()],
            Expect::Int,
            false,
        )
    }

    /// ZSCORE: the member's score, nil if it is not in the set.
    pub fn zscore(self, key: &str, member: &str) -> Self {
        self.add_cmd_checked(RequestType::ZScore, args([key, member]), Expect::Float, true)
    }

    /// ZMSCORE: one score per member, nil for missing members.
    pub fn zmscore(self, key: &str, members: &[&str]) -> Self {
        let built = if members.is_empty() {
            Err(ArgError::Invalid("at least one member is required".into()))
        } else {
            let mut a = args([key]);
            a.extend(members.iter().map(|m| m.to_string()));
            Ok(a)
        };
        self.try_add(
            "zmscore",
            RequestType::ZMScore,
            built,
            Converter::converted(Expect::Array, false, convert::array_of_nilable_float),
        )
    }

    pub fn zrank(self, key: &str, member: &str) -> Self {
        self.add_cmd_checked(RequestType::ZRank, args([key, member]), Expect::Int, true)
    }

    /// ZRANK WITHSCORE: rank and score, nil if the member is missing.
    pub fn zrank_with_score(self, key: &str, member: &str) -> Self {
        self.add_cmd_converted(
            RequestType::ZRank,
            args([key, member, "WITHSCORE"]),
            Expect::Array,
            true,
            convert::rank_and_score,
        )
    }

    pub fn zrevrank(self, key: &str, member: &str) -> Self {
        self.add_cmd_checked(RequestType::ZRevRank, args([key, member]), Expect::Int, true)
    }

    /// ZPOPMIN: member to score map, empty when the set is missing.
    pub fn zpopmin(self, key: &str) -> Self {
        self.add_cmd_converted(
            RequestType::ZPopMin,
            args([key]),
            Expect::Map,
            false,
            convert::map_of_float,
        )
    }

    pub fn zpopmin_with_count(self, key: &str, count: i64) -> Self {
        self.try_add(
            "zpopmin_with_count",
            RequestType::ZPopMin,
            positive("count", count).map(|n| vec![key.to_string(), n.to_string()]),
            Converter::converted(Expect::Map, false, convert::map_of_float),
        )
    }

    pub fn zpopmax(self, key: &str) -> Self {
        self.add_cmd_converted(
            RequestType::ZPopMax,
            args([key]),
            Expect::Map,
            false,
            convert::map_of_float,
        )
    }

    pub fn zpopmax_with_count(self, key: &str, count: i64) -> Self {
        self.try_add(
            "zpopmax_with_count",
            RequestType::ZPopMax,
            positive("count", count).map(|n| vec![key.to_string(), n.to_string()]),
            Converter::converted(Expect::Map, false, convert::map_of_float),
        )
    }

    /// BZPOPMIN: key, member and score, nil on timeout.
    pub fn bzpopmin(self, keys: &[&str], timeout: Duration) -> Self {
        self.try_add(
            "bzpopmin",
            RequestType::BZPopMin,
            blocking_args(keys, timeout),
            Converter::converted(Expect::Array, true, convert::key_member_score),
        )
    }

    pub fn bzpopmax(self, keys: &[&str], timeout: Duration) -> Self {
        self.try_add(
            "bzpopmax",
            RequestType::BZPopMax,
            blocking_args(keys, timeout),
            Converter::converted(Expect::Array, true, convert::key_member_score),
        )
    }

    /// ZMPOP: the key popped from and its members with scores, nil if all
    /// sets are empty.
    pub fn zmpop(self, keys: &[&str], filter: ScoreFilter) -> Self {
        self.try_add(
            "zmpop",
            RequestType::ZMPop,
            zmpop_args(keys, filter, None),
            Converter::converted(Expect::Array, true, convert::key_member_scores),
        )
    }

    pub fn zmpop_with_count(self, keys: &[&str], filter: ScoreFilter, count: i64) -> Self {
        self.try_add(
            "zmpop_with_count",
            RequestType::ZMPop,
            zmpop_args(keys, filter, Some(count)),
            Converter::converted(Expect::Array, true, convert::key_member_scores),
        )
    }

    /// ZRANGE: members in the range.
    pub fn zrange(self, key: &str, query: RangeQuery) -> Self {
        let built = query.to_args().map(|q| {
            let mut a = args([key]);
            a.extend(q);
            a
        });
        self.try_add(
            "zrange",
            RequestType::ZRange,
            built,
            Converter::converted(Expect::Array, false, convert::array_of_text),
        )
    }

    /// ZRANGE WITHSCORES: members and scores in range order.
    pub fn zrange_with_scores(self, key: &str, query: RangeQuery) -> Self {
        let built = query.to_args().map(|q| {
            let mut a = args([key]);
            a.extend(q);
            a.push("WITHSCORES".to_string());
            a
        });
        self.try_add(
            "zrange_with_scores",
            RequestType::ZRange,
            built,
            Converter::converted(Expect::Array, false, convert::member_scores),
        )
    }

    pub fn zrandmember(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::ZRandMember, args([key]), Expect::Text, true)
    }

    pub fn zrandmember_with_count(self, key: &str, count: i64) -> Self {
        self.add_cmd_converted(
            RequestType::ZRandMember,
            vec![key.to_string(), count.to_string()],
            Expect::Array,
            false,
            convert::array_of_text,
        )
    }

    /// ZRANDMEMBER WITHSCORES. A negative count allows repeated members.
    pub fn zrandmember_with_count_with_scores(self, key: &str, count: i64) -> Self {
        self.add_cmd_converted(
            RequestType::ZRandMember,
            vec![key.to_string(), count.to_string(), "WITHSCORES".to_string()],
            Expect::Array,
            false,
            convert::member_scores,
        )
    }

    /// One ZSCAN page; data holds alternating members and scores.
    pub fn zscan(self, key: &str, cursor: &Cursor) -> Self {
        self.add_cmd_converted(
            RequestType::ZScan,
            vec![key.to_string(), cursor.to_string()],
            Expect::Array,
            false,
            convert::scan_result,
        )
    }

    pub fn zscan_with_options(self, key: &str, cursor: &Cursor, options: ScanOptions) -> Self {
        let built = options.to_member_args().map(|opts| {
            let mut a = vec![key.to_string(), cursor.to_string()];
            a.extend(opts);
            a
        });
        self.try_add(
            "zscan_with_options",
            RequestType::ZScan,
            built,
            Converter::converted(Expect::Array, false, convert::scan_result),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::error::ArgError;
    use crate::{
        ClusterBatch, RangeQuery, ScoreBoundary, ScoreFilter, StandaloneBatch, ZAddOptions,
    };

    #[test]
    fn test_zadd_args() {
        let b = StandaloneBatch::new(true).zadd("z", &[("a", 1.0), ("b", 2.5)]);
        assert_eq!(b.commands()[0].args(), ["z", "1", "a", "2.5", "b"]);
    }

    #[test]
    fn test_zadd_ch_incr_conflict_appends_no_command() {
        let b = StandaloneBatch::new(false)
            .zadd("z", &[("a", 1.0)])
            .zadd_with_options("z", &[("b", 2.0)], ZAddOptions::new().changed(true).incr(true))
            .zcard("z");
        assert_eq!(b.len(), 2);
        assert_eq!(b.errors().len(), 1);
        assert_eq!(b.errors()[0].position, 2);
        assert_eq!(b.errors()[0].command, "zadd_with_options");
        assert!(matches!(b.errors()[0].source, ArgError::Conflict(_)));
    }

    #[test]
    fn test_zadd_incr_with_changed_conflicts() {
        let b = StandaloneBatch::new(false).zadd_incr_with_options(
            "z",
            "a",
            1.0,
            ZAddOptions::new().changed(true),
        );
        assert!(b.is_empty());
        assert!(matches!(b.errors()[0].source, ArgError::Conflict(_)));
    }

    #[test]
    fn test_zadd_incr_args() {
        let b = StandaloneBatch::new(false).zadd_incr("z", "a", 0.5);
        assert_eq!(b.commands()[0].args(), ["z", "INCR", "0.5", "a"]);
        assert!(b.commands()[0].converter().is_nilable());
    }

    #[test]
    fn test_zmpop_and_bzpopmin() {
        let b = ClusterBatch::new(false)
            .zmpop_with_count(&["a", "b"], ScoreFilter::Max, 2)
            .bzpopmin(&["a"], Duration::from_secs(1))
            .zmpop(&[], ScoreFilter::Min)
            .bzpopmax(&[], Duration::ZERO);
        assert_eq!(b.len(), 2);
        assert_eq!(b.commands()[0].args(), ["2", "a", "b", "MAX", "COUNT", "2"]);
        assert_eq!(b.commands()[1].args(), ["a", "1"]);
        assert_eq!(b.errors().len(), 2);
        assert_eq!(b.errors()[0].position, 3);
        assert_eq!(b.errors()[1].position, 4);
    }

    #[test]
    fn test_zrange_with_scores() {
        let b = StandaloneBatch::new(false)
            .zrange_with_scores("z", RangeQuery::by_index(0, -1))
            .zrange(
                "z",
                RangeQuery::by_score(ScoreBoundary::Inclusive(1.0), ScoreBoundary::PositiveInfinity),
            );
        assert_eq!(b.commands()[0].args(), ["z", "0", "-1", "WITHSCORES"]);
        assert_eq!(b.commands()[1].args(), ["z", "1", "+inf", "BYSCORE"]);
    }

    #[test]
    fn test_zpop_count_positive() {
        let b = StandaloneBatch::new(false)
            .zpopmin_with_count("z", 0)
            .zpopmax_with_count("z", 2);
        assert_eq!(b.len(), 1);
        assert_eq!(b.commands()[0].args(), ["z", "2"]);
    }
}
