//! Dual-backed progress persistence.
//!
//! Every snapshot goes to the device cache first and then, for signed-in
//! viewers, to the remote store. Neither path ever fails the caller: local
//! errors are logged and swallowed, remote writes run detached.

mod disk;
mod http;
mod memory;
mod store;

pub use disk::{DiskProgressCache, ProgressCacheRoot};
pub use http::{HttpProgressClient, UpsertPayload};
pub use memory::MemoryProgressCache;
pub use store::ProgressStore;
