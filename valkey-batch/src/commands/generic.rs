use std::time::Duration;

use crate::batch::{Batch, BatchMode, Standalone, args, non_empty};
use crate::command::RequestType;
use crate::convert::{self, Converter, Expect};
use crate::error::ArgError;
use crate::options::{ExpireCondition, ScanOptions};
use crate::reply::Cursor;
use crate::route::split_address;

impl<M: BatchMode> Batch<M> {
    /// Arbitrary command, e.g. `&["CLIENT", "SETNAME", "worker"]`.
    ///
    /// The reply is returned unconverted as [`Reply::Value`](crate::Reply::Value).
    pub fn custom_command(self, command: &[&str]) -> Self {
        let built = if command.is_empty() {
            Err(ArgError::Invalid("command name is required".into()))
        } else {
            Ok(args(command.iter().copied()))
        };
        self.try_add(
            "custom_command",
            RequestType::CustomCommand,
            built,
            Converter::identity(),
        )
    }

    /// DEL: number of keys removed.
    pub fn del(self, keys: &[&str]) -> Self {
        self.try_add(
            "del",
            RequestType::Del,
            non_empty(keys),
            Converter::checked(Expect::Int, false),
        )
    }

    /// EXISTS: number of the given keys that exist.
    pub fn exists(self, keys: &[&str]) -> Self {
        self.try_add(
            "exists",
            RequestType::Exists,
            non_empty(keys),
            Converter::checked(Expect::Int, false),
        )
    }

    pub fn unlink(self, keys: &[&str]) -> Self {
        self.try_add(
            "unlink",
            RequestType::Unlink,
            non_empty(keys),
            Converter::checked(Expect::Int, false),
        )
    }

    pub fn touch(self, keys: &[&str]) -> Self {
        self.try_add(
            "touch",
            RequestType::Touch,
            non_empty(keys),
            Converter::checked(Expect::Int, false),
        )
    }

    /// EXPIRE: true if the timeout was set.
    pub fn expire(self, key: &str, seconds: i64) -> Self {
        self.add_cmd_checked(
            RequestType::Expire,
            vec![key.to_string(), seconds.to_string()],
            Expect::Bool,
            false,
        )
    }

    pub fn expire_with_condition(self, key: &str, seconds: i64, condition: ExpireCondition) -> Self {
        self.add_cmd_checked(
            RequestType::Expire,
            vec![
                key.to_string(),
                seconds.to_string(),
                condition.as_arg().to_string(),
            ],
            Expect::Bool,
            false,
        )
    }

    pub fn pexpire(self, key: &str, millis: i64) -> Self {
        self.add_cmd_checked(
            RequestType::PExpire,
            vec![key.to_string(), millis.to_string()],
            Expect::Bool,
            false,
        )
    }

    /// EXPIREAT with a unix timestamp in seconds.
    pub fn expire_at(self, key: &str, unix_seconds: i64) -> Self {
        self.add_cmd_checked(
            RequestType::ExpireAt,
            vec![key.to_string(), unix_seconds.to_string()],
            Expect::Bool,
            false,
        )
    }

    /// TTL: seconds left, `-1` without expiry, `-2` if the key is missing.
    pub fn ttl(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::Ttl, args([key]), Expect::Int, false)
    }

    pub fn pttl(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::PTtl, args([key]), Expect::Int, false)
    }

    pub fn persist(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::Persist, args([key]), Expect::Bool, false)
    }

    /// TYPE: `"string"`, `"list"`, ... or `"none"`.
    pub fn key_type(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::Type, args([key]), Expect::Text, false)
    }

    pub fn rename(self, key: &str, new_key: &str) -> Self {
        self.add_cmd_checked(RequestType::Rename, args([key, new_key]), Expect::Text, false)
    }

    /// RENAMENX: false if `new_key` already exists.
    pub fn renamenx(self, key: &str, new_key: &str) -> Self {
        self.add_cmd_checked(RequestType::RenameNX, args([key, new_key]), Expect::Bool, false)
    }

    /// COPY: true if `source` was copied.
    pub fn copy(self, source: &str, destination: &str, replace: bool) -> Self {
        let mut a = args([source, destination]);
        if replace {
            a.push("REPLACE".to_string());
        }
        self.add_cmd_checked(RequestType::Copy, a, Expect::Bool, false)
    }

    /// MIGRATE a key to the node at `address` (`"host:port"`).
    ///
    /// A malformed address is recorded as a construction error.
    pub fn migrate(self, address: &str, key: &str, destination_db: i64, timeout: Duration) -> Self {
        let built = split_address(address)
            .map(|(host, port)| {
                vec![
                    host.to_string(),
                    port.to_string(),
                    key.to_string(),
                    destination_db.to_string(),
                    timeout.as_millis().to_string(),
                ]
            })
            .map_err(ArgError::from);
        self.try_add(
            "migrate",
            RequestType::Migrate,
            built,
            Converter::checked(Expect::Text, false),
        )
    }
}

// ── Standalone only ─────────────────────────────────────────────────────

impl Batch<Standalone> {
    /// SELECT the database for the rest of the batch.
    pub fn select(self, index: i64) -> Self {
        self.add_cmd_checked(RequestType::Select, vec![index.to_string()], Expect::Text, false)
    }

    /// MOVE `key` to database `db_index`: true if it was moved.
    pub fn move_key(self, key: &str, db_index: i64) -> Self {
        self.add_cmd_checked(
            RequestType::Move,
            vec![key.to_string(), db_index.to_string()],
            Expect::Bool,
            false,
        )
    }

    /// One SCAN page starting at `cursor`.
    pub fn scan(self, cursor: &Cursor) -> Self {
        self.add_cmd_converted(
            RequestType::Scan,
            vec![cursor.to_string()],
            Expect::Array,
            false,
            convert::scan_result,
        )
    }

    pub fn scan_with_options(self, cursor: &Cursor, options: ScanOptions) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = vec![cursor.to_string()];
            a.extend(opts);
            a
        });
        self.try_add(
            "scan_with_options",
            RequestType::Scan,
            built,
            Converter::converted(Expect::Array, false, convert::scan_result),
        )
    }
}
