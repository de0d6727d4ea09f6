use std::time::Duration;

use crate::batch::{Batch, BatchMode, args};
use crate::command::RequestType;
use crate::convert::{self, Converter, Expect};
use crate::error::ArgError;
use crate::options::{
    XAddOptions, XAutoClaimOptions, XGroupCreateOptions, XPendingOptions, XReadGroupOptions,
    XReadOptions, positive,
};

fn field_args(fields: &[(&str, &str)]) -> Result<Vec<String>, ArgError> {
    if fields.is_empty() {
        return Err(ArgError::Invalid("at least one field is required".into()));
    }
    Ok(fields
        .iter()
        .flat_map(|(f, v)| [f.to_string(), v.to_string()])
        .collect())
}

/// `STREAMS key... id...`
fn streams_args(keys_and_ids: &[(&str, &str)]) -> Result<Vec<String>, ArgError> {
    if keys_and_ids.is_empty() {
        return Err(ArgError::Invalid("at least one stream is required".into()));
    }
    let mut a = vec!["STREAMS".to_string()];
    a.extend(keys_and_ids.iter().map(|(k, _)| k.to_string()));
    a.extend(keys_and_ids.iter().map(|(_, id)| id.to_string()));
    Ok(a)
}

fn millis(d: Duration) -> String {
    d.as_millis().to_string()
}

impl<M: BatchMode> Batch<M> {
    /// XADD with an auto-generated id: the new entry's id.
    pub fn xadd(self, key: &str, fields: &[(&str, &str)]) -> Self {
        self.xadd_with_options(key, fields, XAddOptions::default())
    }

    /// XADD: the new entry's id, or nil if the stream does not exist and
    /// [`XAddOptions::no_make_stream`] was set.
    pub fn xadd_with_options(self, key: &str, fields: &[(&str, &str)], options: XAddOptions) -> Self {
        let built = options.to_args().and_then(|opts| {
            let mut a = args([key]);
            a.extend(opts);
            a.extend(field_args(fields)?);
            Ok(a)
        });
        self.try_add(
            "xadd_with_options",
            RequestType::XAdd,
            built,
            Converter::checked(Expect::Text, options.may_skip()),
        )
    }

    pub fn xlen(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::XLen, args([key]), Expect::Int, false)
    }

    /// XDEL: number of entries deleted.
    pub fn xdel(self, key: &str, ids: &[&str]) -> Self {
        let built = if ids.is_empty() {
            Err(ArgError::Invalid("at least one id is required".into()))
        } else {
            let mut a = args([key]);
            a.extend(ids.iter().map(|id| id.to_string()));
            Ok(a)
        };
        self.try_add(
            "xdel",
            RequestType::XDel,
            built,
            Converter::checked(Expect::Int, false),
        )
    }

    /// XRANGE between two ids; `-` and `+` are the extremes.
    pub fn xrange(self, key: &str, start: &str, end: &str) -> Self {
        self.add_cmd_converted(
            RequestType::XRange,
            args([key, start, end]),
            Expect::Array,
            false,
            convert::stream_entries,
        )
    }

    pub fn xrange_with_count(self, key: &str, start: &str, end: &str, count: i64) -> Self {
        self.try_add(
            "xrange_with_count",
            RequestType::XRange,
            positive("COUNT", count).map(|n| {
                let mut a = args([key, start, end]);
                a.push("COUNT".to_string());
                a.push(n.to_string());
                a
            }),
            Converter::converted(Expect::Array, false, convert::stream_entries),
        )
    }

    /// XREVRANGE: like XRANGE, newest first; `end` comes before `start`.
    pub fn xrevrange(self, key: &str, end: &str, start: &str) -> Self {
        self.add_cmd_converted(
            RequestType::XRevRange,
            args([key, end, start]),
            Expect::Array,
            false,
            convert::stream_entries,
        )
    }

    /// XREAD from each `(key, id)`: entries per stream, nil if none arrived.
    pub fn xread(self, keys_and_ids: &[(&str, &str)]) -> Self {
        self.xread_with_options(keys_and_ids, XReadOptions::default())
    }

    pub fn xread_with_options(self, keys_and_ids: &[(&str, &str)], options: XReadOptions) -> Self {
        let built = options.to_args().and_then(|mut a| {
            a.extend(streams_args(keys_and_ids)?);
            Ok(a)
        });
        self.try_add(
            "xread_with_options",
            RequestType::XRead,
            built,
            Converter::converted(Expect::Map, true, convert::streams),
        )
    }

    pub fn xreadgroup(self, group: &str, consumer: &str, keys_and_ids: &[(&str, &str)]) -> Self {
        self.xreadgroup_with_options(group, consumer, keys_and_ids, XReadGroupOptions::default())
    }

    /// XREADGROUP. Entries deleted since delivery come back with no fields.
    pub fn xreadgroup_with_options(
        self,
        group: &str,
        consumer: &str,
        keys_and_ids: &[(&str, &str)],
        options: XReadGroupOptions,
    ) -> Self {
        let built = options.to_args().and_then(|opts| {
            let mut a = args(["GROUP", group, consumer]);
            a.extend(opts);
            a.extend(streams_args(keys_and_ids)?);
            Ok(a)
        });
        self.try_add(
            "xreadgroup_with_options",
            RequestType::XReadGroup,
            built,
            Converter::converted(Expect::Map, true, convert::streams),
        )
    }

    /// XACK: number of entries acknowledged.
    pub fn xack(self, key: &str, group: &str, ids: &[&str]) -> Self {
        let built = if ids.is_empty() {
            Err(ArgError::Invalid("at least one id is required".into()))
        } else {
            let mut a = args([key, group]);
            a.extend(ids.iter().map(|id| id.to_string()));
            Ok(a)
        };
        self.try_add(
            "xack",
            RequestType::XAck,
            built,
            Converter::checked(Expect::Int, false),
        )
    }

    pub fn xgroup_create(self, key: &str, group: &str, id: &str) -> Self {
        self.xgroup_create_with_options(key, group, id, XGroupCreateOptions::default())
    }

    pub fn xgroup_create_with_options(
        self,
        key: &str,
        group: &str,
        id: &str,
        options: XGroupCreateOptions,
    ) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = args([key, group, id]);
            a.extend(opts);
            a
        });
        self.try_add(
            "xgroup_create_with_options",
            RequestType::XGroupCreate,
            built,
            Converter::checked(Expect::Text, false),
        )
    }

    /// XAUTOCLAIM: the next start id, the claimed entries and the ids of
    /// entries that no longer exist.
    pub fn xautoclaim(self, key: &str, group: &str, consumer: &str, min_idle: Duration, start: &str) -> Self {
        self.xautoclaim_with_options(key, group, consumer, min_idle, start, XAutoClaimOptions::default())
    }

    pub fn xautoclaim_with_options(
        self,
        key: &str,
        group: &str,
        consumer: &str,
        min_idle: Duration,
        start: &str,
        options: XAutoClaimOptions,
    ) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = args([key, group, consumer]);
            a.push(millis(min_idle));
            a.push(start.to_string());
            a.extend(opts);
            a
        });
        self.try_add(
            "xautoclaim_with_options",
            RequestType::XAutoClaim,
            built,
            Converter::converted(Expect::Array, false, convert::auto_claim),
        )
    }

    /// XAUTOCLAIM JUSTID: like [`Batch::xautoclaim`] with ids only.
    pub fn xautoclaim_just_id(
        self,
        key: &str,
        group: &str,
        consumer: &str,
        min_idle: Duration,
        start: &str,
        options: XAutoClaimOptions,
    ) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = args([key, group, consumer]);
            a.push(millis(min_idle));
            a.push(start.to_string());
            a.extend(opts);
            a.push("JUSTID".to_string());
            a
        });
        self.try_add(
            "xautoclaim_just_id",
            RequestType::XAutoClaim,
            built,
            Converter::converted(Expect::Array, false, convert::auto_claim_ids),
        )
    }

    /// XCLAIM: the claimed entries.
    pub fn xclaim(self, key: &str, group: &str, consumer: &str, min_idle: Duration, ids: &[&str]) -> Self {
        self.try_add(
            "xclaim",
            RequestType::XClaim,
            xclaim_args(key, group, consumer, min_idle, ids, false),
            Converter::converted(Expect::Array, false, convert::stream_entries),
        )
    }

    /// XCLAIM JUSTID: the claimed ids.
    pub fn xclaim_just_id(
        self,
        key: &str,
        group: &str,
        consumer: &str,
        min_idle: Duration,
        ids: &[&str],
    ) -> Self {
        self.try_add(
            "xclaim_just_id",
            RequestType::XClaim,
            xclaim_args(key, group, consumer, min_idle, ids, true),
            Converter::converted(Expect::Array, false, convert::array_of_text),
        )
    }

    /// XPENDING summary for `group`.
    pub fn xpending(self, key: &str, group: &str) -> Self {
        self.add_cmd_converted(
            RequestType::XPending,
            args([key, group]),
            Expect::Array,
            false,
            convert::pending_summary,
        )
    }

    /// XPENDING over a range: one record per pending entry.
    pub fn xpending_with_options(self, key: &str, group: &str, options: XPendingOptions) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = args([key, group]);
            a.extend(opts);
            a
        });
        self.try_add(
            "xpending_with_options",
            RequestType::XPending,
            built,
            Converter::converted(Expect::Array, false, convert::pending_details),
        )
    }
}

fn xclaim_args(
    key: &str,
    group: &str,
    consumer: &str,
    min_idle: Duration,
    ids: &[&str],
    just_id: bool,
) -> Result<Vec<String>, ArgError> {
    if ids.is_empty() {
        return Err(ArgError::Invalid("at least one id is required".into()));
    }
    let mut a = args([key, group, consumer]);
    a.push(millis(min_idle));
    a.extend(ids.iter().map(|id| id.to_string()));
    if just_id {
        a.push("JUSTID".to_string());
    }
    Ok(a)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        ClusterBatch, XAddOptions, XAutoClaimOptions, XReadOptions, XTrimOptions,
    };

    #[test]
    fn test_xread_args() {
        let b = ClusterBatch::new(false).xread_with_options(
            &[("s1", "0"), ("s2", "5-0")],
            XReadOptions::new().count(10),
        );
        assert_eq!(
            b.commands()[0].args(),
            ["COUNT", "10", "STREAMS", "s1", "s2", "0", "5-0"]
        );
        assert_eq!(b.commands()[0].first_key(), Some("s1"));
    }

    #[test]
    fn test_xreadgroup_args() {
        let b = ClusterBatch::new(false).xreadgroup("g", "c", &[("s", ">")]);
        assert_eq!(b.commands()[0].args(), ["GROUP", "g", "c", "STREAMS", "s", ">"]);
    }

    #[test]
    fn test_xreadgroup_key_after_group_named_streams() {
        let b = ClusterBatch::new(true).xreadgroup("streams", "worker", &[("orders", ">")]);
        assert_eq!(b.commands()[0].first_key(), Some("orders"));
    }

    #[test]
    fn test_xadd_no_make_stream_is_nilable() {
        let b = ClusterBatch::new(false)
            .xadd("s", &[("f", "v")])
            .xadd_with_options(
                "s",
                &[("f", "v")],
                XAddOptions::new().no_make_stream().trim(XTrimOptions::max_len(10)),
            );
        assert_eq!(b.commands()[0].args(), ["s", "*", "f", "v"]);
        assert!(!b.commands()[0].converter().is_nilable());
        assert_eq!(
            b.commands()[1].args(),
            ["s", "NOMKSTREAM", "MAXLEN", "10", "*", "f", "v"]
        );
        assert!(b.commands()[1].converter().is_nilable());
    }

    #[test]
    fn test_xautoclaim_args() {
        let b = ClusterBatch::new(false)
            .xautoclaim("s", "g", "c", Duration::from_millis(100), "0-0")
            .xautoclaim_just_id(
                "s",
                "g",
                "c",
                Duration::from_secs(1),
                "0-0",
                XAutoClaimOptions::new().count(5),
            );
        assert_eq!(b.commands()[0].args(), ["s", "g", "c", "100", "0-0"]);
        assert_eq!(
            b.commands()[1].args(),
            ["s", "g", "c", "1000", "0-0", "COUNT", "5", "JUSTID"]
        );
    }

    #[test]
    fn test_xautoclaim_bad_count() {
        let b = ClusterBatch::new(false).xautoclaim_with_options(
            "s",
            "g",
            "c",
            Duration::ZERO,
            "0-0",
            XAutoClaimOptions::new().count(0),
        );
        assert!(b.is_empty());
        assert_eq!(b.errors()[0].command, "xautoclaim_with_options");
    }

    #[test]
    fn test_stream_inputs_required() {
        let b = ClusterBatch::new(false)
            .xadd("s", &[])
            .xread(&[])
            .xack("s", "g", &[])
            .xclaim("s", "g", "c", Duration::ZERO, &[]);
        assert!(b.is_empty());
        let positions: Vec<_> = b.errors().iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }
}
