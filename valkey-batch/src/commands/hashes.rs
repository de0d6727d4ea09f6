use crate::batch::{Batch, BatchMode, args};
use crate::command::RequestType;
use crate::convert::{self, Converter, Expect};
use crate::error::ArgError;
use crate::options::HashScanOptions;
use crate::reply::Cursor;

impl<M: BatchMode> Batch<M> {
    /// HSET: number of fields added.
    pub fn hset(self, key: &str, fields: &[(&str, &str)]) -> Self {
        let built = if fields.is_empty() {
            Err(ArgError::Invalid("at least one field is required".into()))
        } else {
            let mut a = args([key]);
            for (field, value) in fields {
                a.push(field.to_string());
                a.push(value.to_string());
            }
            Ok(a)
        };
        self.try_add(
            "hset",
            RequestType::HSet,
            built,
            Converter::checked(Expect::Int, false),
        )
    }

    pub fn hget(self, key: &str, field: &str) -> Self {
        self.add_cmd_checked(RequestType::HGet, args([key, field]), Expect::Text, true)
    }

    /// HGETALL: field to value map, empty when the key is missing.
    pub fn hgetall(self, key: &str) -> Self {
        self.add_cmd_converted(
            RequestType::HGetAll,
            args([key]),
            Expect::Map,
            false,
            convert::map_of_text,
        )
    }

    /// HMGET: one element per field, nil for missing fields.
    pub fn hmget(self, key: &str, fields: &[&str]) -> Self {
        let mut a = args([key]);
        a.extend(fields.iter().map(|f| f.to_string()));
        self.add_cmd_converted(
            RequestType::HMGet,
            a,
            Expect::Array,
            false,
            convert::array_of_nilable_text,
        )
    }

    pub fn hdel(self, key: &str, fields: &[&str]) -> Self {
        let mut a = args([key]);
        a.extend(fields.iter().map(|f| f.to_string()));
        self.add_cmd_checked(RequestType::HDel, a, Expect::Int, false)
    }

    pub fn hlen(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::HLen, args([key]), Expect::Int, false)
    }

    pub fn hexists(self, key: &str, field: &str) -> Self {
        self.add_cmd_checked(RequestType::HExists, args([key, field]), Expect::Bool, false)
    }

    pub fn hkeys(self, key: &str) -> Self {
        self.add_cmd_converted(
            RequestType::HKeys,
            args([key]),
            Expect::Array,
            false,
            convert::array_of_text,
        )
    }

    pub fn hvals(self, key: &str) -> Self {
        self.add_cmd_converted(
            RequestType::HVals,
            args([key]),
            Expect::Array,
            false,
            convert::array_of_text,
        )
    }

    pub fn hincrby(self, key: &str, field: &str, amount: i64) -> Self {
        self.add_cmd_checked(
            RequestType::HIncrBy,
            vec![key.to_string(), field.to_string(), amount.to_string()],
            Expect::Int,
            false,
        )
    }

    pub fn hincrbyfloat(self, key: &str, field: &str, amount: f64) -> Self {
        self.add_cmd_checked(
            RequestType::HIncrByFloat,
            vec![key.to_string(), field.to_string(), amount.to_string()],
            Expect::Float,
            false,
        )
    }

    pub fn hsetnx(self, key: &str, field: &str, value: &str) -> Self {
        self.add_cmd_checked(RequestType::HSetNX, args([key, field, value]), Expect::Bool, false)
    }

    pub fn hstrlen(self, key: &str, field: &str) -> Self {
        self.add_cmd_checked(RequestType::HStrlen, args([key, field]), Expect::Int, false)
    }

    /// HRANDFIELD: one random field, nil when the key is missing.
    pub fn hrandfield(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::HRandField, args([key]), Expect::Text, true)
    }

    /// HRANDFIELD with a count. A negative count allows repeated fields.
    pub fn hrandfield_with_count(self, key: &str, count: i64) -> Self {
        self.add_cmd_converted(
            RequestType::HRandField,
            vec![key.to_string(), count.to_string()],
            Expect::Array,
            false,
            convert::array_of_text,
        )
    }

    /// HRANDFIELD with a count, returning `(field, value)` pairs.
    ///
    /// The count is passed through verbatim: a negative count allows the
    /// same field to be returned more than once.
    pub fn hrandfield_with_count_with_values(self, key: &str, count: i64) -> Self {
        self.add_cmd_converted(
            RequestType::HRandField,
            vec![key.to_string(), count.to_string(), "WITHVALUES".to_string()],
            Expect::Array,
            false,
            convert::string_pairs,
        )
    }

    /// One HSCAN page; data holds alternating fields and values.
    pub fn hscan(self, key: &str, cursor: &Cursor) -> Self {
        self.add_cmd_converted(
            RequestType::HScan,
            vec![key.to_string(), cursor.to_string()],
            Expect::Array,
            false,
            convert::scan_result,
        )
    }

    pub fn hscan_with_options(self, key: &str, cursor: &Cursor, options: HashScanOptions) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = vec![key.to_string(), cursor.to_string()];
            a.extend(opts);
            a
        });
        self.try_add(
            "hscan_with_options",
            RequestType::HScan,
            built,
            Converter::converted(Expect::Array, false, convert::scan_result),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{ClusterBatch, RequestType};

    #[test]
    fn test_hrandfield_negative_count_passed_verbatim() {
        let b = ClusterBatch::new(false).hrandfield_with_count_with_values("h", -5);
        assert!(b.errors().is_empty());
        assert_eq!(b.commands()[0].request_type(), RequestType::HRandField);
        assert_eq!(b.commands()[0].args(), ["h", "-5", "WITHVALUES"]);
    }

    #[test]
    fn test_hset_fields() {
        let b = ClusterBatch::new(false).hset("h", &[("a", "1"), ("b", "2")]).hset("h", &[]);
        assert_eq!(b.len(), 1);
        assert_eq!(b.commands()[0].args(), ["h", "a", "1", "b", "2"]);
        assert_eq!(b.errors()[0].position, 2);
    }

    #[test]
    fn test_hscan_with_options() {
        let b = ClusterBatch::new(false).hscan_with_options(
            "h",
            &crate::Cursor::initial(),
            crate::HashScanOptions::new().pattern("f*").no_values(true),
        );
        assert_eq!(b.commands()[0].args(), ["h", "0", "MATCH", "f*", "NOVALUES"]);
    }
}
