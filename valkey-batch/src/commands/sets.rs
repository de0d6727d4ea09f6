use crate::batch::{Batch, BatchMode, args, non_empty};
use crate::command::RequestType;
use crate::convert::{self, Converter, Expect};
use crate::error::ArgError;
use crate::options::{ScanOptions, positive};
use crate::reply::Cursor;

fn key_and_members(key: &str, members: &[&str]) -> Result<Vec<String>, ArgError> {
    if members.is_empty() {
        return Err(ArgError::Invalid("at least one member is required".into()));
    }
    let mut a = args([key]);
    a.extend(members.iter().map(|m| m.to_string()));
    Ok(a)
}

impl<M: BatchMode> Batch<M> {
    /// SADD: number of members added.
    pub fn sadd(self, key: &str, members: &[&str]) -> Self {
        self.try_add(
            "sadd",
            RequestType::SAdd,
            key_and_members(key, members),
            Converter::checked(Expect::Int, false),
        )
    }

    pub fn srem(self, key: &str, members: &[&str]) -> Self {
        self.try_add(
            "srem",
            RequestType::SRem,
            key_and_members(key, members),
            Converter::checked(Expect::Int, false),
        )
    }

    pub fn smembers(self, key: &str) -> Self {
        self.add_cmd_converted(
            RequestType::SMembers,
            args([key]),
            Expect::Set,
            false,
            convert::set_of_text,
        )
    }

    pub fn scard(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::SCard, args([key]), Expect::Int, false)
    }

    pub fn sismember(self, key: &str, member: &str) -> Self {
        self.add_cmd_checked(RequestType::SIsMember, args([key, member]), Expect::Bool, false)
    }

    /// SMISMEMBER: one boolean per member.
    pub fn smismember(self, key: &str, members: &[&str]) -> Self {
        self.try_add(
            "smismember",
            RequestType::SMIsMember,
            key_and_members(key, members),
            Converter::converted(Expect::Array, false, convert::array_of_bool),
        )
    }

    /// SPOP: a random member, nil when the set is missing.
    pub fn spop(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::SPop, args([key]), Expect::Text, true)
    }

    pub fn spop_count(self, key: &str, count: i64) -> Self {
        self.try_add(
            "spop_count",
            RequestType::SPop,
            positive("count", count).map(|n| vec![key.to_string(), n.to_string()]),
            Converter::converted(Expect::Set, false, convert::set_of_text),
        )
    }

    pub fn srandmember(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::SRandMember, args([key]), Expect::Text, true)
    }

    /// SRANDMEMBER with a count. A negative count allows repeated members.
    pub fn srandmember_count(self, key: &str, count: i64) -> Self {
        self.add_cmd_converted(
            RequestType::SRandMember,
            vec![key.to_string(), count.to_string()],
            Expect::Array,
            false,
            convert::array_of_text,
        )
    }

    pub fn sinter(self, keys: &[&str]) -> Self {
        self.try_add(
            "sinter",
            RequestType::SInter,
            non_empty(keys),
            Converter::converted(Expect::Set, false, convert::set_of_text),
        )
    }

    pub fn sunion(self, keys: &[&str]) -> Self {
        self.try_add(
            "sunion",
            RequestType::SUnion,
            non_empty(keys),
            Converter::converted(Expect::Set, false, convert::set_of_text),
        )
    }

    pub fn sdiff(self, keys: &[&str]) -> Self {
        self.try_add(
            "sdiff",
            RequestType::SDiff,
            non_empty(keys),
            Converter::converted(Expect::Set, false, convert::set_of_text),
        )
    }

    pub fn smove(self, source: &str, destination: &str, member: &str) -> Self {
        self.add_cmd_checked(
            RequestType::SMove,
            args([source, destination, member]),
            Expect::Bool,
            false,
        )
    }

    pub fn sscan(self, key: &str, cursor: &Cursor) -> Self {
        self.add_cmd_converted(
            RequestType::SScan,
            vec![key.to_string(), cursor.to_string()],
            Expect::Array,
            false,
            convert::scan_result,
        )
    }

    pub fn sscan_with_options(self, key: &str, cursor: &Cursor, options: ScanOptions) -> Self {
        let built = options.to_member_args().map(|opts| {
            let mut a = vec![key.to_string(), cursor.to_string()];
            a.extend(opts);
            a
        });
        self.try_add(
            "sscan_with_options",
            RequestType::SScan,
            built,
            Converter::converted(Expect::Array, false, convert::scan_result),
        )
    }
}
