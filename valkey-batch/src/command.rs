//! Command records: one queued store operation.

use std::fmt;

use serde::Serialize;

use crate::convert::Converter;

macro_rules! request_types {
    ($($variant:ident => $name:literal,)+) => {
        /// Store operation identifier.
        ///
        /// Each variant maps to exactly one wire command; the arguments that
        /// follow the command name live in [`CommandRecord::args`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum RequestType {
            /// Arbitrary command; the first argument is the command name.
            CustomCommand,
            $($variant,)+
        }

        impl RequestType {
            /// Wire name of the command, e.g. `"ZADD"`.
            ///
            /// `CustomCommand` has no fixed name and returns an empty string.
            pub fn command_name(self) -> &'static str {
                match self {
                    RequestType::CustomCommand => "",
                    $(RequestType::$variant => $name,)+
                }
            }
        }
    };
}

request_types! {
    // keys
    Del => "DEL",
    Exists => "EXISTS",
    Unlink => "UNLINK",
    Touch => "TOUCH",
    Expire => "EXPIRE",
    PExpire => "PEXPIRE",
    ExpireAt => "EXPIREAT",
    Ttl => "TTL",
    PTtl => "PTTL",
    Persist => "PERSIST",
    Type => "TYPE",
    Rename => "RENAME",
    RenameNX => "RENAMENX",
    Copy => "COPY",
    Migrate => "MIGRATE",
    Scan => "SCAN",
    Select => "SELECT",
    Move => "MOVE",
    // strings
    Get => "GET",
    Set => "SET",
    GetEx => "GETEX",
    GetDel => "GETDEL",
    MGet => "MGET",
    MSet => "MSET",
    MSetNX => "MSETNX",
    Incr => "INCR",
    IncrBy => "INCRBY",
    IncrByFloat => "INCRBYFLOAT",
    Decr => "DECR",
    DecrBy => "DECRBY",
    Append => "APPEND",
    Strlen => "STRLEN",
    SetRange => "SETRANGE",
    GetRange => "GETRANGE",
    // hashes
    HSet => "HSET",
    HGet => "HGET",
    HGetAll => "HGETALL",
    HMGet => "HMGET",
    HDel => "HDEL",
    HLen => "HLEN",
    HExists => "HEXISTS",
    HKeys => "HKEYS",
    HVals => "HVALS",
    HIncrBy => "HINCRBY",
    HIncrByFloat => "HINCRBYFLOAT",
    HSetNX => "HSETNX",
    HStrlen => "HSTRLEN",
    HRandField => "HRANDFIELD",
    HScan => "HSCAN",
    // lists
    LPush => "LPUSH",
    RPush => "RPUSH",
    LPop => "LPOP",
    RPop => "RPOP",
    LLen => "LLEN",
    LRange => "LRANGE",
    LIndex => "LINDEX",
    LTrim => "LTRIM",
    LRem => "LREM",
    LInsert => "LINSERT",
    LPos => "LPOS",
    LMove => "LMOVE",
    LMPop => "LMPOP",
    BLPop => "BLPOP",
    // sets
    SAdd => "SADD",
    SRem => "SREM",
    SMembers => "SMEMBERS",
    SCard => "SCARD",
    SIsMember => "SISMEMBER",
    SMIsMember => "SMISMEMBER",
    SPop => "SPOP",
    SRandMember => "SRANDMEMBER",
    SInter => "SINTER",
    SUnion => "SUNION",
    SDiff => "SDIFF",
    SMove => "SMOVE",
    SScan => "SSCAN",
    // sorted sets
    ZAdd => "ZADD",
    ZIncrBy => "ZINCRBY",
    ZRem => "ZREM",
    ZCard => "ZCARD",
    ZCount => "ZCOUNT",
    ZScore => "ZSCORE",
    ZMScore => "ZMSCORE",
    ZRank => "ZRANK",
    ZRevRank => "ZREVRANK",
    ZPopMin => "ZPOPMIN",
    ZPopMax => "ZPOPMAX",
    BZPopMin => "BZPOPMIN",
    BZPopMax => "BZPOPMAX",
    ZMPop => "ZMPOP",
    ZRange => "ZRANGE",
    ZRandMember => "ZRANDMEMBER",
    ZScan => "ZSCAN",
    // streams
    XAdd => "XADD",
    XLen => "XLEN",
    XDel => "XDEL",
    XRange => "XRANGE",
    XRevRange => "XREVRANGE",
    XRead => "XREAD",
    XReadGroup => "XREADGROUP",
    XAck => "XACK",
    XGroupCreate => "XGROUP CREATE",
    XAutoClaim => "XAUTOCLAIM",
    XClaim => "XCLAIM",
    XPending => "XPENDING",
    // server, scripting, pubsub
    Ping => "PING",
    Echo => "ECHO",
    DbSize => "DBSIZE",
    Time => "TIME",
    FCall => "FCALL",
    FCallReadOnly => "FCALL_RO",
    Publish => "PUBLISH",
    SPublish => "SPUBLISH",
    PubSubShardChannels => "PUBSUB SHARDCHANNELS",
    PubSubShardNumSub => "PUBSUB SHARDNUMSUB",
}

impl RequestType {
    /// The first key named by `args`, used to pick a default slot for atomic
    /// batches. Keyless commands (and custom commands, whose key layout is
    /// unknown) return `None`.
    pub fn first_key(self, args: &[String]) -> Option<&str> {
        use RequestType::*;
        let index = match self {
            CustomCommand | Scan | Select | Ping | Echo | DbSize | Time | Publish
            | PubSubShardChannels | PubSubShardNumSub => return None,
            // numkeys precedes the keys
            LMPop | ZMPop => {
                return numkeys_at(args, 0).and_then(|_| args.get(1)).map(String::as_str);
            }
            FCall | FCallReadOnly => {
                return numkeys_at(args, 1).and_then(|_| args.get(2)).map(String::as_str);
            }
            XRead => streams_keyword(args, 0)? + 1,
            // group and consumer names may themselves read "STREAMS"
            XReadGroup => streams_keyword(args, 3)? + 1,
            Migrate => {
                // An empty key slot means the keys follow a KEYS token.
                match args.get(2).map(String::as_str) {
                    Some("") => args.iter().position(|a| a == "KEYS")? + 1,
                    _ => 2,
                }
            }
            _ => 0,
        };
        args.get(index).map(String::as_str)
    }
}

fn streams_keyword(args: &[String], from: usize) -> Option<usize> {
    args.iter()
        .skip(from)
        .position(|a| a.eq_ignore_ascii_case("STREAMS"))
        .map(|pos| pos + from)
}

fn numkeys_at(args: &[String], index: usize) -> Option<usize> {
    args.get(index)?.parse::<usize>().ok().filter(|n| *n > 0)
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestType::CustomCommand => f.write_str("custom command"),
            other => f.write_str(other.command_name()),
        }
    }
}

/// One queued operation: what to run, with which arguments, and how to read
/// its reply.
///
/// Records are immutable once they are part of a batch; the batch only hands
/// them out by shared reference.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    request_type: RequestType,
    args: Vec<String>,
    converter: Converter,
}

impl CommandRecord {
    pub(crate) fn new(request_type: RequestType, args: Vec<String>, converter: Converter) -> Self {
        Self {
            request_type,
            args,
            converter,
        }
    }

    /// The operation this record runs.
    #[inline]
    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    /// Arguments following the command name.
    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// How this record's reply is checked and converted.
    #[inline]
    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// First key touched by this command, if known.
    pub fn first_key(&self) -> Option<&str> {
        self.request_type.first_key(&self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_name() {
        assert_eq!(RequestType::ZAdd.command_name(), "ZADD");
        assert_eq!(RequestType::XGroupCreate.command_name(), "XGROUP CREATE");
        assert_eq!(RequestType::CustomCommand.command_name(), "");
        assert_eq!(RequestType::HGetAll.to_string(), "HGETALL");
        assert_eq!(RequestType::CustomCommand.to_string(), "custom command");
    }

    #[test]
    fn test_first_key_plain() {
        assert_eq!(RequestType::Get.first_key(&args(&["k"])), Some("k"));
        assert_eq!(RequestType::Set.first_key(&args(&["k", "v"])), Some("k"));
        assert_eq!(RequestType::Get.first_key(&[]), None);
    }

    #[test]
    fn test_first_key_keyless() {
        assert_eq!(RequestType::Ping.first_key(&[]), None);
        assert_eq!(RequestType::Scan.first_key(&args(&["0"])), None);
        assert_eq!(
            RequestType::CustomCommand.first_key(&args(&["GET", "k"])),
            None
        );
    }

    #[test]
    fn test_first_key_numkeys() {
        assert_eq!(
            RequestType::ZMPop.first_key(&args(&["2", "a", "b", "MIN"])),
            Some("a")
        );
        assert_eq!(
            RequestType::FCall.first_key(&args(&["fn", "1", "key", "arg"])),
            Some("key")
        );
        assert_eq!(RequestType::FCall.first_key(&args(&["fn", "0", "arg"])), None);
    }

    #[test]
    fn test_first_key_streams() {
        assert_eq!(
            RequestType::XRead.first_key(&args(&["COUNT", "1", "STREAMS", "s1", "0"])),
            Some("s1")
        );
        assert_eq!(
            RequestType::XReadGroup.first_key(&args(&["GROUP", "g", "c", "STREAMS", "s", ">"])),
            Some("s")
        );
    }

    #[test]
    fn test_first_key_group_named_streams() {
        assert_eq!(
            RequestType::XReadGroup.first_key(&args(&[
                "GROUP", "streams", "worker", "STREAMS", "orders", ">"
            ])),
            Some("orders")
        );
        assert_eq!(
            RequestType::XReadGroup.first_key(&args(&[
                "GROUP", "g", "STREAMS", "COUNT", "1", "STREAMS", "orders", ">"
            ])),
            Some("orders")
        );
    }

    #[test]
    fn test_first_key_migrate() {
        assert_eq!(
            RequestType::Migrate.first_key(&args(&["h", "1", "k", "0", "100"])),
            Some("k")
        );
        assert_eq!(
            RequestType::Migrate.first_key(&args(&["h", "1", "", "0", "100", "KEYS", "a", "b"])),
            Some("a")
        );
    }
}
