//! Foreign-function marshalling layer for the Umbra ledger core.
//!
//! The only crate with knowledge of the boundary calling convention.
//! Hosts in a different memory-management regime call the exported
//! `umbra_*` functions; every structured input crosses as a
//! `(ptr, len)` byte buffer in the canonical encoding, every opaque
//! object crosses as a `u64` handle, and every operation returns a
//! heap-allocated result envelope (see [`envelope`]).
//!
//! Three guarantees hold at this layer and nowhere else:
//!
//! - no panic ever unwinds across the boundary: every export runs its
//!   core work inside `catch_unwind` and converts a caught panic into an
//!   `InternalError` envelope;
//! - no released object is ever touched: handles are
//!   `(slot, generation)` pairs and stale generations report
//!   `HandleNotFound`;
//! - the host always gets a definite, decodable outcome.

mod context;
mod envelope;
mod exports;
mod handle;

pub use context::{umbra_init, umbra_teardown};
pub use envelope::{umbra_alloc, umbra_free, umbra_result_free};
pub use exports::*;
pub use handle::{HandleObject, HandleTable};
