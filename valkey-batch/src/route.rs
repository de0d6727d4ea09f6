//! Cluster routing model.
//!
//! A [`Route`] says which node(s) a batch is sent to. Routes are plain values:
//! build one, attach it to [`ClusterBatchOptions`](crate::ClusterBatchOptions),
//! and the client serializes it into a [`RouteInfo`] for the executor.

use std::fmt;
use std::str::FromStr;

use protocol_resp::{hash_slot, is_valid_slot};
use serde::Serialize;

use crate::error::RouteError;

/// Whether a slot route targets the slot's primary or one of its replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    #[default]
    Primary,
    Replica,
}

/// Where a request is sent in a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Every node, primaries and replicas.
    AllNodes,
    /// Every primary node.
    AllPrimaries,
    /// One node chosen at random.
    Random,
    /// The node serving a hash slot.
    SlotId { slot_type: SlotType, slot_id: i32 },
    /// The node serving the hash slot of `key`.
    SlotKey { slot_type: SlotType, key: String },
    /// A node named by host and port.
    ByAddress { host: String, port: i32 },
}

impl Route {
    /// Route to the node serving `slot_id`.
    pub fn slot_id(slot_type: SlotType, slot_id: i32) -> Self {
        Route::SlotId { slot_type, slot_id }
    }

    /// Route to the node serving the slot of `key`.
    pub fn slot_key(slot_type: SlotType, key: impl Into<String>) -> Self {
        Route::SlotKey {
            slot_type,
            key: key.into(),
        }
    }

    /// Route to the node at `host:port`.
    pub fn by_address(host: impl Into<String>, port: i32) -> Self {
        Route::ByAddress {
            host: host.into(),
            port,
        }
    }

    /// Parse a `host:port` string into a [`Route::ByAddress`].
    ///
    /// The string must split on `:` into exactly two parts and the port must
    /// fit in an `i32`.
    pub fn parse_address(address: &str) -> Result<Self, RouteError> {
        let (host, port) = split_address(address)?;
        Ok(Route::ByAddress {
            host: host.to_string(),
            port,
        })
    }

    /// Returns true for routes that may fan out to more than one node.
    ///
    /// Atomic batches cannot use these.
    #[inline]
    pub fn is_multi_node(&self) -> bool {
        matches!(self, Route::AllNodes | Route::AllPrimaries)
    }

    /// Resolve slot routes to their hash slot. Other routes have no slot.
    pub fn slot(&self) -> Result<Option<u16>, RouteError> {
        match self {
            Route::SlotId { slot_id, .. } => {
                if is_valid_slot(i64::from(*slot_id)) {
                    Ok(Some(*slot_id as u16))
                } else {
                    Err(RouteError::SlotOutOfRange(*slot_id))
                }
            }
            Route::SlotKey { key, .. } => Ok(Some(hash_slot(key.as_bytes()))),
            _ => Ok(None),
        }
    }

    /// Wire representation handed to the executor.
    pub fn to_info(&self) -> RouteInfo {
        let mut info = RouteInfo {
            route_type: RouteType::of(self),
            slot_id: None,
            slot_key: None,
            slot_type: None,
            hostname: None,
            port: None,
        };
        match self {
            Route::AllNodes | Route::AllPrimaries | Route::Random => {}
            Route::SlotId { slot_type, slot_id } => {
                info.slot_type = Some(*slot_type);
                info.slot_id = Some(*slot_id);
            }
            Route::SlotKey { slot_type, key } => {
                info.slot_type = Some(*slot_type);
                info.slot_key = Some(key.clone());
            }
            Route::ByAddress { host, port } => {
                info.hostname = Some(host.clone());
                info.port = Some(*port);
            }
        }
        info
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse_address(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::AllNodes => f.write_str("all nodes"),
            Route::AllPrimaries => f.write_str("all primaries"),
            Route::Random => f.write_str("random node"),
            Route::SlotId { slot_type, slot_id } => write!(f, "slot {slot_id} ({slot_type:?})"),
            Route::SlotKey { slot_type, key } => write!(f, "slot of key '{key}' ({slot_type:?})"),
            Route::ByAddress { host, port } => write!(f, "{host}:{port}"),
        }
    }
}

/// Split `host:port`, rejecting anything but exactly two parts.
pub(crate) fn split_address(address: &str) -> Result<(&str, i32), RouteError> {
    let mut parts = address.split(':');
    let (Some(host), Some(port), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RouteError::MalformedAddress(address.to_string()));
    };
    let port = port
        .parse::<i32>()
        .map_err(|_| RouteError::InvalidPort(port.to_string()))?;
    Ok((host, port))
}

// ── Wire format ─────────────────────────────────────────────────────────

/// Discriminant of a [`RouteInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    AllNodes,
    AllPrimaries,
    Random,
    SlotId,
    SlotKey,
    ByAddress,
}

impl RouteType {
    fn of(route: &Route) -> Self {
        match route {
            Route::AllNodes => RouteType::AllNodes,
            Route::AllPrimaries => RouteType::AllPrimaries,
            Route::Random => RouteType::Random,
            Route::SlotId { .. } => RouteType::SlotId,
            Route::SlotKey { .. } => RouteType::SlotKey,
            Route::ByAddress { .. } => RouteType::ByAddress,
        }
    }
}

/// Flat route description sent to the executor.
///
/// Only the fields belonging to `route_type` are populated:
/// slot routes carry `slot_type` plus `slot_id` or `slot_key`,
/// address routes carry `hostname` and `port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub route_type: RouteType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_type: Option<SlotType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_node() {
        assert!(Route::AllNodes.is_multi_node());
        assert!(Route::AllPrimaries.is_multi_node());
        assert!(!Route::Random.is_multi_node());
        assert!(!Route::slot_id(SlotType::Primary, 42).is_multi_node());
        assert!(!Route::slot_key(SlotType::Replica, "abc").is_multi_node());
        assert!(!Route::by_address("10.0.0.1", 7000).is_multi_node());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(
            Route::parse_address("10.0.0.1:7000").unwrap(),
            Route::by_address("10.0.0.1", 7000)
        );
        assert_eq!(
            "localhost:6379".parse::<Route>().unwrap(),
            Route::by_address("localhost", 6379)
        );
    }

    #[test]
    fn test_parse_address_too_many_parts() {
        assert_eq!(
            Route::parse_address("host:1:2"),
            Err(RouteError::MalformedAddress("host:1:2".into()))
        );
    }

    #[test]
    fn test_parse_address_missing_port() {
        assert_eq!(
            Route::parse_address("host"),
            Err(RouteError::MalformedAddress("host".into()))
        );
    }

    #[test]
    fn test_parse_address_bad_port() {
        assert_eq!(
            Route::parse_address("host:abc"),
            Err(RouteError::InvalidPort("abc".into()))
        );
        assert_eq!(
            Route::parse_address("host:99999999999"),
            Err(RouteError::InvalidPort("99999999999".into()))
        );
    }

    #[test]
    fn test_slot_resolution() {
        assert_eq!(Route::slot_id(SlotType::Primary, 42).slot(), Ok(Some(42)));
        assert_eq!(
            Route::slot_key(SlotType::Primary, "foo").slot(),
            Ok(Some(12182))
        );
        assert_eq!(
            Route::slot_key(SlotType::Primary, "{foo}.bar").slot(),
            Ok(Some(12182))
        );
        assert_eq!(Route::Random.slot(), Ok(None));
        assert_eq!(
            Route::slot_id(SlotType::Primary, 16384).slot(),
            Err(RouteError::SlotOutOfRange(16384))
        );
    }

    #[test]
    fn test_info_simple() {
        let info = Route::AllPrimaries.to_info();
        assert_eq!(info.route_type, RouteType::AllPrimaries);
        assert!(info.slot_id.is_none());
        assert!(info.slot_key.is_none());
        assert!(info.slot_type.is_none());
        assert!(info.hostname.is_none());
        assert!(info.port.is_none());
    }

    #[test]
    fn test_info_slot_key() {
        let info = Route::slot_key(SlotType::Replica, "user:1").to_info();
        assert_eq!(info.route_type, RouteType::SlotKey);
        assert_eq!(info.slot_type, Some(SlotType::Replica));
        assert_eq!(info.slot_key.as_deref(), Some("user:1"));
        assert!(info.slot_id.is_none());
    }

    #[test]
    fn test_info_serializes_only_populated_fields() {
        let json = serde_json::to_value(Route::by_address("h", 7000).to_info()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"route_type": "by_address", "hostname": "h", "port": 7000})
        );
    }
}
