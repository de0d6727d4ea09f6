use std::time::Duration;

use crate::batch::{Batch, BatchMode, args, non_empty};
use crate::command::RequestType;
use crate::convert::{self, Converter, Expect};
use crate::error::ArgError;
use crate::options::{InsertPosition, LPosOptions, ListDirection, positive};

fn key_and_elements(key: &str, elements: &[&str]) -> Result<Vec<String>, ArgError> {
    if elements.is_empty() {
        return Err(ArgError::Invalid("at least one element is required".into()));
    }
    let mut a = args([key]);
    a.extend(elements.iter().map(|e| e.to_string()));
    Ok(a)
}

/// `numkeys key... direction [COUNT n]` for LMPOP.
fn lmpop_args(keys: &[&str], direction: ListDirection, count: Option<i64>) -> Result<Vec<String>, ArgError> {
    let mut a = vec![keys.len().to_string()];
    a.extend(non_empty(keys)?);
    a.push(direction.as_arg().to_string());
    if let Some(count) = count {
        a.push("COUNT".to_string());
        a.push(positive("COUNT", count)?.to_string());
    }
    Ok(a)
}

/// Blocking timeout in (fractional) seconds.
pub(super) fn timeout_secs(timeout: Duration) -> String {
    timeout.as_secs_f64().to_string()
}

impl<M: BatchMode> Batch<M> {
    /// LPUSH: the list length after the push.
    pub fn lpush(self, key: &str, elements: &[&str]) -> Self {
        self.try_add(
            "lpush",
            RequestType::LPush,
            key_and_elements(key, elements),
            Converter::checked(Expect::Int, false),
        )
    }

    pub fn rpush(self, key: &str, elements: &[&str]) -> Self {
        self.try_add(
            "rpush",
            RequestType::RPush,
            key_and_elements(key, elements),
            Converter::checked(Expect::Int, false),
        )
    }

    /// LPOP: the first element, nil when the list is missing.
    pub fn lpop(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::LPop, args([key]), Expect::Text, true)
    }

    pub fn lpop_count(self, key: &str, count: i64) -> Self {
        self.try_add(
            "lpop_count",
            RequestType::LPop,
            positive("count", count).map(|n| vec![key.to_string(), n.to_string()]),
            Converter::converted(Expect::Array, true, convert::array_of_text),
        )
    }

    pub fn rpop(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::RPop, args([key]), Expect::Text, true)
    }

    pub fn rpop_count(self, key: &str, count: i64) -> Self {
        self.try_add(
            "rpop_count",
            RequestType::RPop,
            positive("count", count).map(|n| vec![key.to_string(), n.to_string()]),
            Converter::converted(Expect::Array, true, convert::array_of_text),
        )
    }

    pub fn llen(self, key: &str) -> Self {
        self.add_cmd_checked(RequestType::LLen, args([key]), Expect::Int, false)
    }

    pub fn lrange(self, key: &str, start: i64, end: i64) -> Self {
        self.add_cmd_converted(
            RequestType::LRange,
            vec![key.to_string(), start.to_string(), end.to_string()],
            Expect::Array,
            false,
            convert::array_of_text,
        )
    }

    pub fn lindex(self, key: &str, index: i64) -> Self {
        self.add_cmd_checked(
            RequestType::LIndex,
            vec![key.to_string(), index.to_string()],
            Expect::Text,
            true,
        )
    }

    pub fn ltrim(self, key: &str, start: i64, end: i64) -> Self {
        self.add_cmd_checked(
            RequestType::LTrim,
            vec![key.to_string(), start.to_string(), end.to_string()],
            Expect::Text,
            false,
        )
    }

    /// LREM: number of elements removed.
    pub fn lrem(self, key: &str, count: i64, element: &str) -> Self {
        self.add_cmd_checked(
            RequestType::LRem,
            vec![key.to_string(), count.to_string(), element.to_string()],
            Expect::Int,
            false,
        )
    }

    /// LINSERT: the new length, `-1` if the pivot was not found.
    pub fn linsert(self, key: &str, position: InsertPosition, pivot: &str, element: &str) -> Self {
        self.add_cmd_checked(
            RequestType::LInsert,
            vec![
                key.to_string(),
                position.as_arg().to_string(),
                pivot.to_string(),
                element.to_string(),
            ],
            Expect::Int,
            false,
        )
    }

    /// LPOS: index of the first match, nil if there is none.
    pub fn lpos(self, key: &str, element: &str) -> Self {
        self.add_cmd_checked(RequestType::LPos, args([key, element]), Expect::Int, true)
    }

    pub fn lpos_with_options(self, key: &str, element: &str, options: LPosOptions) -> Self {
        let built = options.to_args().map(|opts| {
            let mut a = args([key, element]);
            a.extend(opts);
            a
        });
        self.try_add(
            "lpos_with_options",
            RequestType::LPos,
            built,
            Converter::checked(Expect::Int, true),
        )
    }

    /// LPOS with `COUNT`: indexes of up to `count` matches; `0` returns all.
    pub fn lpos_count(self, key: &str, element: &str, count: i64, options: LPosOptions) -> Self {
        let built = if count < 0 {
            Err(ArgError::Invalid(format!("COUNT can't be negative, got {count}")))
        } else {
            options.to_args().map(|opts| {
                let mut a = args([key, element]);
                a.push("COUNT".to_string());
                a.push(count.to_string());
                a.extend(opts);
                a
            })
        };
        self.try_add(
            "lpos_count",
            RequestType::LPos,
            built,
            Converter::converted(Expect::Array, false, convert::array_of_int),
        )
    }

    /// LMOVE: the moved element, nil when `source` is empty.
    pub fn lmove(
        self,
        source: &str,
        destination: &str,
        from: ListDirection,
        to: ListDirection,
    ) -> Self {
        self.add_cmd_checked(
            RequestType::LMove,
            vec![
                source.to_string(),
                destination.to_string(),
                from.as_arg().to_string(),
                to.as_arg().to_string(),
            ],
            Expect::Text,
            true,
        )
    }

    /// LMPOP: the key popped from and its elements, nil if all lists are empty.
    pub fn lmpop(self, keys: &[&str], direction: ListDirection) -> Self {
        self.try_add(
            "lmpop",
            RequestType::LMPop,
            lmpop_args(keys, direction, None),
            Converter::converted(Expect::Array, true, convert::key_values),
        )
    }

    pub fn lmpop_count(self, keys: &[&str], direction: ListDirection, count: i64) -> Self {
        self.try_add(
            "lmpop_count",
            RequestType::LMPop,
            lmpop_args(keys, direction, Some(count)),
            Converter::converted(Expect::Array, true, convert::key_values),
        )
    }

    /// BLPOP: the key and element popped, nil on timeout. A zero timeout
    /// blocks indefinitely.
    pub fn blpop(self, keys: &[&str], timeout: Duration) -> Self {
        let built = non_empty(keys).map(|mut a| {
            a.push(timeout_secs(timeout));
            a
        });
        self.try_add(
            "blpop",
            RequestType::BLPop,
            built,
            Converter::converted(Expect::Array, true, convert::key_values),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{ListDirection, LPosOptions, StandaloneBatch};

    #[test]
    fn test_lmpop_args() {
        let b = StandaloneBatch::new(false)
            .lmpop(&["a", "b"], ListDirection::Left)
            .lmpop_count(&["a"], ListDirection::Right, 3);
        assert_eq!(b.commands()[0].args(), ["2", "a", "b", "LEFT"]);
        assert_eq!(b.commands()[1].args(), ["1", "a", "RIGHT", "COUNT", "3"]);
        assert_eq!(b.commands()[0].first_key(), Some("a"));
    }

    #[test]
    fn test_lmpop_empty_keys() {
        let b = StandaloneBatch::new(false).lmpop(&[], ListDirection::Left);
        assert!(b.is_empty());
        assert_eq!(b.errors()[0].command, "lmpop");
    }

    #[test]
    fn test_blpop_timeout() {
        let b = StandaloneBatch::new(false).blpop(&["q"], Duration::from_millis(1500));
        assert_eq!(b.commands()[0].args(), ["q", "1.5"]);
    }

    #[test]
    fn test_lpos_rank_zero_rejected() {
        let b = StandaloneBatch::new(false)
            .lpos_with_options("l", "x", LPosOptions::new().rank(0))
            .lpos_count("l", "x", 2, LPosOptions::new().rank(-1));
        assert_eq!(b.len(), 1);
        assert_eq!(b.commands()[0].args(), ["l", "x", "COUNT", "2", "RANK", "-1"]);
        assert_eq!(b.errors()[0].command, "lpos_with_options");
    }

    #[test]
    fn test_push_requires_elements() {
        let b = StandaloneBatch::new(false).lpush("l", &[]).rpush("l", &["a", "b"]);
        assert_eq!(b.len(), 1);
        assert_eq!(b.commands()[0].args(), ["l", "a", "b"]);
    }
}
