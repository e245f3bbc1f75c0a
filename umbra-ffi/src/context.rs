//! The process-wide engine context.
//!
//! The host constructs the context once with [`umbra_init`] and tears it
//! down explicitly with [`umbra_teardown`]; there is no implicit
//! runtime-start hook and no garbage-collected teardown. The handle
//! table and the accumulator are the only shared mutable state in the
//! engine; each sits behind its own lock so read-only derivations
//! (commitments, nullifiers, payload assembly) run fully in parallel on
//! caller threads.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use umbra_accumulator::MerkleAccumulator;
use umbra_common::{CoreError, CoreResult};

use crate::envelope::{envelope_err, envelope_ok};
use crate::handle::HandleTable;

pub(crate) struct EngineContext {
    handles: Mutex<HandleTable>,
    accumulator: Mutex<MerkleAccumulator>,
}

impl EngineContext {
    fn new() -> Self {
        EngineContext {
            handles: Mutex::new(HandleTable::new()),
            accumulator: Mutex::new(MerkleAccumulator::new()),
        }
    }

    pub(crate) fn handles(&self) -> MutexGuard<'_, HandleTable> {
        // A poisoned lock means a panic was already converted to an
        // InternalError envelope; the data is a handle arena, not an
        // invariant-bearing structure, so continuing is safe.
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn accumulator(&self) -> MutexGuard<'_, MerkleAccumulator> {
        self.accumulator.lock().unwrap_or_else(|e| e.into_inner())
    }
}

static CONTEXT: Mutex<Option<Arc<EngineContext>>> = Mutex::new(None);

/// Fetch the live context or report that the host never initialized.
pub(crate) fn context() -> CoreResult<Arc<EngineContext>> {
    CONTEXT
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .cloned()
        .ok_or_else(|| {
            CoreError::InternalError("engine not initialized; call umbra_init first".into())
        })
}

/// Initialize the engine context.
///
/// Idempotent: a second call while initialized reports `InternalError`
/// rather than silently discarding live handles.
#[no_mangle]
pub extern "C" fn umbra_init() -> *mut u8 {
    let mut guard = CONTEXT.lock().unwrap_or_else(|e| e.into_inner());
    if guard.is_some() {
        return envelope_err(&CoreError::InternalError(
            "engine already initialized".into(),
        ));
    }
    *guard = Some(Arc::new(EngineContext::new()));
    debug!("engine context initialized");
    envelope_ok(&[])
}

/// Tear the engine down, dropping every live handle (secret keys are
/// zeroized by their drop impls) and the accumulator.
#[no_mangle]
pub extern "C" fn umbra_teardown() -> *mut u8 {
    let previous = CONTEXT
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .take();
    match previous {
        Some(ctx) => {
            debug!(live_handles = ctx.handles().len(), "engine context torn down");
            envelope_ok(&[])
        }
        None => envelope_err(&CoreError::InternalError(
            "engine not initialized; call umbra_init first".into(),
        )),
    }
}
