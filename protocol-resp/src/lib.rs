//! Raw reply model and cluster slot math for Redis/Valkey-compatible stores.
//!
//! This crate holds the pieces of the protocol that a batch engine needs
//! without owning a connection:
//!
//! - **Values**: the untyped reply tree ([`Value`]) handed back by the
//!   execution core, plus [`ValueKind`] shape tags for type checks.
//! - **Cluster**: CRC16 and hash-slot computation used to resolve key-based
//!   routes.
//!
//! # Example
//!
//! ```
//! use protocol_resp::{Value, ValueKind, hash_slot};
//!
//! let reply = Value::bulk_string(b"myvalue");
//! assert_eq!(reply.kind(), ValueKind::BulkString);
//! assert_eq!(reply.as_str(), Some("myvalue"));
//!
//! assert_eq!(hash_slot(b"{user}.name"), hash_slot(b"{user}.email"));
//! ```

pub mod cluster;
mod value;

pub use cluster::{SLOT_COUNT, crc16, hash_slot, is_valid_slot};
pub use value::{Value, ValueKind};
