//! Per-test state isolation.
//!
//! A window opens with [`IsolationManager::begin`], which copies the entire
//! ledger state, and closes with [`IsolationManager::end`], which rebinds that
//! copy. Windows are strictly sequential.

use crate::error::IsolationError;
use hostevm_ledger::{LedgerStateSnapshot, StateStore};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque token for an open isolation window
#[derive(Debug)]
pub struct SnapshotHandle {
    window: u64,
    snapshot: LedgerStateSnapshot,
}

impl SnapshotHandle {
    /// Window this handle was issued for
    pub fn window(&self) -> u64 {
        self.window
    }
}

/// Brackets tests with full-state copy and restore
pub struct IsolationManager<S: StateStore + ?Sized> {
    store: Arc<S>,
    open: Mutex<Option<u64>>,
    next_window: AtomicU64,
}

impl<S: StateStore + ?Sized> IsolationManager<S> {
    /// Create a manager over `store`
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            open: Mutex::new(None),
            next_window: AtomicU64::new(1),
        }
    }

    /// Currently open window, if any
    pub fn open_window(&self) -> Option<u64> {
        *self.open.lock()
    }

    /// Capture the state and open a window
    pub fn begin(&self) -> Result<SnapshotHandle, IsolationError> {
        let mut open = self.open.lock();
        if let Some(window) = *open {
            return Err(IsolationError::WindowOpen(window));
        }

        let snapshot = self
            .store
            .copy()
            .map_err(|e| IsolationError::Copy(e.to_string()))?;
        let window = self.next_window.fetch_add(1, Ordering::SeqCst);
        *open = Some(window);
        tracing::debug!(window, "isolation window opened");
        Ok(SnapshotHandle { window, snapshot })
    }

    /// Restore the state captured by `handle` and close its window
    pub fn end(&self, handle: SnapshotHandle) -> Result<(), IsolationError> {
        let mut open = self.open.lock();
        if *open != Some(handle.window) {
            return Err(IsolationError::ForeignHandle {
                got: handle.window,
                open: *open,
            });
        }

        self.store.rebind(handle.snapshot);
        *open = None;
        tracing::debug!(window = handle.window, "isolation window restored");
        Ok(())
    }

    /// Open a window that restores when the guard is dropped
    pub fn begin_guard(&self) -> Result<IsolationGuard<'_, S>, IsolationError> {
        let handle = self.begin()?;
        Ok(IsolationGuard {
            manager: self,
            handle: Some(handle),
        })
    }

    /// Run `test` inside a window
    pub async fn run<F, Fut, T>(&self, test: F) -> Result<T, IsolationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let guard = self.begin_guard()?;
        let output = test().await;
        guard.finish()?;
        Ok(output)
    }
}

/// Restores the captured state on drop, including during unwinding
pub struct IsolationGuard<'a, S: StateStore + ?Sized> {
    manager: &'a IsolationManager<S>,
    handle: Option<SnapshotHandle>,
}

impl<S: StateStore + ?Sized> IsolationGuard<'_, S> {
    /// Window this guard holds
    pub fn window(&self) -> Option<u64> {
        self.handle.as_ref().map(SnapshotHandle::window)
    }

    /// Restore now, reporting any error
    pub fn finish(mut self) -> Result<(), IsolationError> {
        match self.handle.take() {
            Some(handle) => self.manager.end(handle),
            None => Ok(()),
        }
    }
}

impl<S: StateStore + ?Sized> Drop for IsolationGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.manager.end(handle) {
                tracing::error!(error = %e, "failed to restore isolation window");
            }
        }
    }
}
