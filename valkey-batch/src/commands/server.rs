use crate::batch::{Batch, BatchMode, Cluster, args};
use crate::command::RequestType;
use crate::convert::{self, Expect};

/// `function numkeys key... arg...`
fn fcall_args(function: &str, keys: &[&str], arguments: &[&str]) -> Vec<String> {
    let mut a = vec![function.to_string(), keys.len().to_string()];
    a.extend(keys.iter().map(|k| k.to_string()));
    a.extend(arguments.iter().map(|v| v.to_string()));
    a
}

impl<M: BatchMode> Batch<M> {
    pub fn ping(self) -> Self {
        self.add_cmd_checked(RequestType::Ping, Vec::new(), Expect::Text, false)
    }

    pub fn ping_with_message(self, message: &str) -> Self {
        self.add_cmd_checked(RequestType::Ping, args([message]), Expect::Text, false)
    }

    pub fn echo(self, message: &str) -> Self {
        self.add_cmd_checked(RequestType::Echo, args([message]), Expect::Text, false)
    }

    /// DBSIZE: number of keys in the selected database (or node).
    pub fn dbsize(self) -> Self {
        self.add_cmd_checked(RequestType::DbSize, Vec::new(), Expect::Int, false)
    }

    /// TIME: `[unix seconds, microseconds]` as strings.
    pub fn time(self) -> Self {
        self.add_cmd_converted(
            RequestType::Time,
            Vec::new(),
            Expect::Array,
            false,
            convert::array_of_text,
        )
    }

    /// FCALL with no keys or arguments. The reply is whatever the function
    /// returns, unchecked.
    pub fn fcall(self, function: &str) -> Self {
        self.add_cmd(RequestType::FCall, fcall_args(function, &[], &[]))
    }

    pub fn fcall_with_keys_and_args(self, function: &str, keys: &[&str], arguments: &[&str]) -> Self {
        self.add_cmd(RequestType::FCall, fcall_args(function, keys, arguments))
    }

    pub fn fcall_readonly(self, function: &str) -> Self {
        self.add_cmd(RequestType::FCallReadOnly, fcall_args(function, &[], &[]))
    }

    pub fn fcall_readonly_with_keys_and_args(
        self,
        function: &str,
        keys: &[&str],
        arguments: &[&str],
    ) -> Self {
        self.add_cmd(
            RequestType::FCallReadOnly,
            fcall_args(function, keys, arguments),
        )
    }

    /// PUBLISH: number of clients that received the message.
    pub fn publish(self, channel: &str, message: &str) -> Self {
        self.add_cmd_checked(RequestType::Publish, args([channel, message]), Expect::Int, false)
    }
}

impl Batch<Cluster> {
    /// SPUBLISH to a shard channel.
    pub fn spublish(self, channel: &str, message: &str) -> Self {
        self.add_cmd_checked(RequestType::SPublish, args([channel, message]), Expect::Int, false)
    }

    /// PUBSUB SHARDCHANNELS, optionally filtered by a glob pattern.
    pub fn pubsub_shard_channels(self, pattern: Option<&str>) -> Self {
        self.add_cmd_converted(
            RequestType::PubSubShardChannels,
            pattern.into_iter().map(str::to_string).collect(),
            Expect::Array,
            false,
            convert::array_of_text,
        )
    }

    /// PUBSUB SHARDNUMSUB: subscriber count per shard channel.
    pub fn pubsub_shard_numsub(self, channels: &[&str]) -> Self {
        self.add_cmd_converted(
            RequestType::PubSubShardNumSub,
            args(channels.iter().copied()),
            Expect::Map,
            false,
            convert::map_of_int,
        )
    }
}

#[cfg(test)]
mod tests {
    use protocol_resp::Value;

    use crate::{ClusterBatch, Reply, RequestType, StandaloneBatch};

    #[test]
    fn test_fcall_args() {
        let b = StandaloneBatch::new(false)
            .fcall("noop")
            .fcall_with_keys_and_args("f", &["k1", "k2"], &["a"])
            .fcall_readonly_with_keys_and_args("ro", &[], &["x"]);
        assert_eq!(b.commands()[0].args(), ["noop", "0"]);
        assert_eq!(b.commands()[1].args(), ["f", "2", "k1", "k2", "a"]);
        assert_eq!(b.commands()[1].first_key(), Some("k1"));
        assert_eq!(b.commands()[2].request_type(), RequestType::FCallReadOnly);
        assert_eq!(b.commands()[2].first_key(), None);
    }

    #[test]
    fn test_fcall_reply_is_unchecked() {
        let b = StandaloneBatch::new(false).fcall("f");
        let out = b.convert(vec![Value::Integer(7)]).unwrap();
        assert_eq!(out, vec![Ok(Reply::Value(Value::Integer(7)))]);
    }

    #[test]
    fn test_publish_args() {
        let b = ClusterBatch::new(false)
            .publish("news", "hello")
            .spublish("shard", "hi")
            .pubsub_shard_channels(Some("s*"))
            .pubsub_shard_channels(None);
        assert_eq!(b.commands()[0].args(), ["news", "hello"]);
        assert_eq!(b.commands()[1].args(), ["shard", "hi"]);
        assert_eq!(b.commands()[2].args(), ["s*"]);
        assert!(b.commands()[3].args().is_empty());
    }

    #[test]
    fn test_shard_numsub_reply() {
        let b = ClusterBatch::new(false).pubsub_shard_numsub(&["a", "b"]);
        let reply = Value::Array(vec![
            Value::bulk_string(b"a"),
            Value::Integer(1),
            Value::bulk_string(b"b"),
            Value::Integer(0),
        ]);
        let out = b.convert(vec![reply]).unwrap();
        let map = out[0].as_ref().unwrap().as_map().unwrap();
        assert_eq!(map["a"], Reply::Int(1));
        assert_eq!(map["b"], Reply::Int(0));
    }
}
