//! Client configuration.

use serde::Deserialize;

/// What to do with a batch that recorded construction errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionErrorPolicy {
    /// Refuse to execute; fail with every recorded error.
    #[default]
    Reject,
    /// Execute the commands that were built and log a warning.
    Permissive,
}

/// Configuration for [`Client`](crate::Client) and
/// [`ClusterClient`](crate::ClusterClient).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub construction_errors: ConstructionErrorPolicy,
    /// Default for `raise_on_error` in [`Client::exec_default`](crate::Client::exec_default).
    pub raise_on_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.construction_errors, ConstructionErrorPolicy::Reject);
        assert!(!config.raise_on_error);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"construction_errors": "permissive"}"#).unwrap();
        assert_eq!(config.construction_errors, ConstructionErrorPolicy::Permissive);
        assert!(!config.raise_on_error);

        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }
}
