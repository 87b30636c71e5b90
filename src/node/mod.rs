//! Workflow-host collaborators: per-node configuration storage and the
//! startup registration handshake.

pub mod registration;
pub mod store;

pub use store::{ConfigStore, HttpConfigStore, MemoryConfigStore, NodeConfig};
