use crate::batch::{Batch, BatchMode, args, non_empty};
use crate::command::RequestType;
use crate::convert::{self, Converter, Expect};
use crate::error::ArgError;
use crate::options::{GetExOptions, SetOptions};

impl<M: BatchMode> Batch<M> {
    /// GET: the value of `key`, or nil.
    pub fn get(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::Get, args([key]), Expect::Text, true)
    }

    /// SET: replies `OK`.
    pub fn set(self, key: &str, value: &str) -> Self {
        self.add_cmd_checked(RequestType::Set, args([key, value]), Expect::Text, false)
    }

    /// SET with conditions and expiry.
    ///
    /// Replies nil when a condition prevented the write, or the old value
    /// when [`SetOptions::return_old_value`] is set.
    pub fn set_with_options(self, key: &str, value: &str, options: SetOptions) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = args([key, value]);
            a.extend(opts);
            a
        });
        self.try_add(
            "set_with_options",
            RequestType::Set,
            built,
            Converter::checked(Expect::Text, true),
        )
    }

    /// GETEX without changing the expiry.
    pub fn get_ex(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::GetEx, args([key]), Expect::Text, true)
    }

    /// GETEX, setting or removing the expiry.
    pub fn get_ex_with_options(self, key: &str, options: GetExOptions) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = args([key]);
            a.extend(opts);
            a
        });
        self.try_add(
            "get_ex_with_options",
            RequestType::GetEx,
            built,
            Converter::checked(Expect::Text, true),
        )
    }

    /// GETDEL: the value that was deleted, or nil.
    pub fn get_del(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::GetDel, args([key]), Expect::Text, true)
    }

    /// MGET: one element per key, nil for missing keys.
    pub fn mget(self, keys: &[&str]) -> Self {
        self.try_add(
            "mget",
            RequestType::MGet,
            non_empty(keys),
            Converter::converted(Expect::Array, false, convert::array_of_nilable_text),
        )
    }

    /// MSET.
    pub fn mset(self, pairs: &[(&str, &str)]) -> Self {
        self.try_add(
            "mset",
            RequestType::MSet,
            flatten_pairs(pairs),
            Converter::checked(Expect::Text, false),
        )
    }

    /// MSETNX: true if all keys were set.
    pub fn msetnx(self, pairs: &[(&str, &str)]) -> Self {
        self.try_add(
            "msetnx",
            RequestType::MSetNX,
            flatten_pairs(pairs),
            Converter::checked(Expect::Bool, false),
        )
    }

    pub fn incr(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::Incr, args([key]), Expect::Int, false)
    }

    pub fn incr_by(self, key: &str, amount: i64) -> Self {
        self.add_cmd_checked(
            RequestType::IncrBy,
            vec![key.to_string(), amount.to_string()],
            Expect::Int,
            false,
        )
    }

    /// INCRBYFLOAT: the new value as a float.
    pub fn incr_by_float(self, key: &str, amount: f64) -> Self {
        self.add_cmd_checked(
            RequestType::IncrByFloat,
            vec![key.to_string(), amount.to_string()],
            Expect::Float,
            false,
        )
    }

    pub fn decr(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::Decr, args([key]), Expect::Int, false)
    }

    pub fn decr_by(self, key: &str, amount: i64) -> Self {
        self.add_cmd_checked(
            RequestType::DecrBy,
            vec![key.to_string(), amount.to_string()],
            Expect::Int,
            false,
        )
    }

    /// APPEND: the length of the string after the append.
    pub fn append(self, key: &str, value: &str) -> Self {
        self.add_cmd_checked(RequestType::Append, args([key, value]), Expect::Int, false)
    }

    pub fn strlen(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::Strlen, args([key]), Expect::Int, false)
    }

    /// SETRANGE: the length of the string after the write.
    pub fn set_range(self, key: &str, offset: u64, value: &str) -> Self {
        self.add_cmd_checked(
            RequestType::SetRange,
            vec![key.to_string(), offset.to_string(), value.to_string()],
            Expect::Int,
            false,
        )
    }

    pub fn get_range(self, key: &str, start: i64, end: i64) -> Self {
        self.add_cmd_checked(
            RequestType::GetRange,
            vec![key.to_string(), start.to_string(), end.to_string()],
            Expect::Text,
            false,
        )
    }
}

fn flatten_pairs(pairs: &[(&str, &str)]) -> Result<Vec<String>, ArgError> {
    if pairs.is_empty() {
        return Err(ArgError::Invalid("at least one key/value pair is required".into()));
    }
    Ok(pairs
        .iter()
        .flat_map(|(k, v)| [k.to_string(), v.to_string()])
        .collect())
}

#[cfg(test)]
mod tests {
    use crate::error::ArgError;
    use crate::options::Expiry;
    use crate::{RequestType, StandaloneBatch};

    #[test]
    fn test_set_get_args() {
        let b = StandaloneBatch::new(false).set("k", "v").get("k");
        assert_eq!(b.commands()[0].request_type(), RequestType::Set);
        assert_eq!(b.commands()[0].args(), ["k", "v"]);
        assert_eq!(b.commands()[1].args(), ["k"]);
        assert!(b.commands()[1].converter().is_nilable());
        assert!(!b.commands()[0].converter().is_nilable());
    }

    #[test]
    fn test_set_with_options() {
        let opts = crate::SetOptions::new().expiry(Expiry::Milliseconds(250));
        let b = StandaloneBatch::new(false).set_with_options("k", "v", opts);
        assert_eq!(b.commands()[0].args(), ["k", "v", "PX", "250"]);
    }

    #[test]
    fn test_get_ex_keepttl_is_construction_error() {
        let opts = crate::GetExOptions::new().expiry(Expiry::KeepTtl);
        let b = StandaloneBatch::new(false)
            .get("a")
            .get_ex_with_options("k", opts)
            .get("b");
        assert_eq!(b.len(), 2);
        assert_eq!(b.errors().len(), 1);
        assert_eq!(b.errors()[0].position, 2);
        assert_eq!(b.errors()[0].command, "get_ex_with_options");
        assert!(matches!(b.errors()[0].source, ArgError::Invalid(_)));
    }

    #[test]
    fn test_mset_flattens_pairs() {
        let b = StandaloneBatch::new(false).mset(&[("a", "1"), ("b", "2")]);
        assert_eq!(b.commands()[0].args(), ["a", "1", "b", "2"]);
    }

    #[test]
    fn test_empty_multi_key_rejected() {
        let b = StandaloneBatch::new(false).mget(&[]).mset(&[]);
        assert!(b.is_empty());
        assert_eq!(b.errors().len(), 2);
    }

    #[test]
    fn test_numeric_args() {
        let b = StandaloneBatch::new(false)
            .incr_by("n", -3)
            .incr_by_float("f", 0.5)
            .get_range("s", 0, -1);
        assert_eq!(b.commands()[0].args(), ["n", "-3"]);
        assert_eq!(b.commands()[1].args(), ["f", "0.5"]);
        assert_eq!(b.commands()[2].args(), ["s", "0", "-1"]);
    }
}
