//! Per-call expansion context.
//!
//! A [`Context`] travels with every expansion call and is handed to every
//! fetcher. It carries typed request values (a database pool, the caller's
//! identity, the handler registry to fall back to) and a cancellation
//! signal that fetchers may observe.
//!
//! The engine itself never inspects the cancellation signal; honouring it is
//! up to the fetch implementation.
//!
//! # Usage
//!
//! ```rust
//! use setin_core::Context;
//!
//! struct TenantId(u32);
//!
//! let ctx = Context::new().with_value(TenantId(7));
//! assert_eq!(ctx.value::<TenantId>().map(|t| t.0), Some(7));
//! assert!(!ctx.is_cancelled());
//!
//! ctx.cancel();
//! assert!(ctx.is_cancelled());
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

type Values = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Cheap-to-clone expansion context (Arc internals).
///
/// Contexts derived with [`Context::with_value`] share the cancellation
/// signal of the context they were derived from.
#[derive(Clone)]
pub struct Context {
    values: Arc<Values>,
    cancel: Arc<watch::Sender<bool>>,
}

impl Context {
    /// Create an empty, uncancelled context.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            values: Arc::new(HashMap::new()),
            cancel: Arc::new(tx),
        }
    }

    /// Derive a context that also carries `value`.
    ///
    /// A value of the same type already present is shadowed.
    pub fn with_value<T: Any + Send + Sync>(&self, value: T) -> Self {
        self.with_shared(Arc::new(value))
    }

    /// Derive a context that carries an already shared value.
    pub fn with_shared<T: Any + Send + Sync>(&self, value: Arc<T>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(TypeId::of::<T>(), value);
        Self {
            values: Arc::new(values),
            cancel: Arc::clone(&self.cancel),
        }
    }

    /// Look up a value by type.
    pub fn value<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.values
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Signal cancellation to everything holding this context.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Returns `true` once [`Context::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Wait until the context is cancelled.
    ///
    /// Intended for `tokio::select!` inside fetchers.
    pub async fn cancelled(&self) {
        let mut rx = self.cancel.subscribe();
        // The sender lives as long as `self`, so `wait_for` cannot fail here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
