//! Named handlers and tester chains.
//!
//! [`HandlerMapping`] maps relation names to [`Handler`]s and acts as an
//! exact-match [`Tester`]. [`Testers`] chains testers in registration order;
//! the first one that recognises a name handles it.

use crate::setiner::Setiner;
use async_trait::async_trait;
use setin_core::{Context, Error, Handler, Node, Result, Tester};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// HandlerMapping
// ============================================================================

/// Relation name to handler.
pub struct HandlerMapping<T> {
    handlers: HashMap<String, Arc<dyn Handler<T>>>,
}

impl<T: Send + 'static> HandlerMapping<T> {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Builder: add a handler under `name`, replacing any previous one.
    pub fn with_handler<H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T> + 'static,
    {
        self.insert(name, Arc::new(handler));
        self
    }

    /// Add a shared handler under `name`, returning the one it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn Handler<T>>,
    ) -> Option<Arc<dyn Handler<T>>> {
        self.handlers.insert(name.into(), handler)
    }

    /// Handler registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Handler<T>>> {
        self.handlers.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler registered under `name`, if any.
    ///
    /// Returns `Ok(false)` when nothing is registered under `name`.
    pub async fn expand_one(&self, ctx: &Context, datas: &mut [&mut T], name: &str) -> Result<bool> {
        let Some(handler) = self.handlers.get(name) else {
            return Ok(false);
        };
        tracing::trace!(relation = name, roots = datas.len(), "running handler");
        handler.handle(ctx, datas).await?;
        Ok(true)
    }

    /// Run the handlers for every name in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing handler, or with [`Error::UnknownRelation`]
    /// at the first name with no handler.
    pub async fn expand(&self, ctx: &Context, datas: &mut [&mut T], names: &[&str]) -> Result<()> {
        for name in names {
            if !self.expand_one(ctx, datas, name).await? {
                return Err(Error::unknown_relation(*name));
            }
        }
        Ok(())
    }

    /// A tester chain holding just this mapping.
    pub fn into_testers(self) -> Testers<T> {
        Testers::new().with_tester(self)
    }

    /// A Setiner driven by this mapping.
    pub fn into_setiner(self) -> Setiner<T>
    where
        T: Node,
    {
        Setiner::new(self.into_testers())
    }
}

impl<T: Send + 'static> Default for HandlerMapping<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for HandlerMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort_unstable();
        f.debug_struct("HandlerMapping")
            .field("names", &names)
            .finish()
    }
}

#[async_trait]
impl<T: Send + 'static> Tester<T> for HandlerMapping<T> {
    async fn test(&self, ctx: &Context, datas: &mut [&mut T], setin: &str) -> Result<bool> {
        self.expand_one(ctx, datas, setin).await
    }
}

// ============================================================================
// Testers
// ============================================================================

/// Ordered tester chain.
pub struct Testers<T> {
    testers: Vec<Arc<dyn Tester<T>>>,
}

impl<T: Send + 'static> Testers<T> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            testers: Vec::new(),
        }
    }

    /// Builder: append a tester.
    pub fn with_tester<X>(mut self, tester: X) -> Self
    where
        X: Tester<T> + 'static,
    {
        self.testers.push(Arc::new(tester));
        self
    }

    /// Append a shared tester.
    pub fn push(&mut self, tester: Arc<dyn Tester<T>>) {
        self.testers.push(tester);
    }

    /// Builder: append every tester of `other` after this chain's.
    pub fn append(mut self, other: Testers<T>) -> Self {
        self.testers.extend(other.testers);
        self
    }

    /// Number of testers in the chain.
    pub fn len(&self) -> usize {
        self.testers.len()
    }

    /// Returns `true` if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.testers.is_empty()
    }

    /// Offer `setin` to each tester in order until one handles it.
    ///
    /// Returns `Ok(false)` when no tester recognised it.
    pub async fn try_expand(&self, ctx: &Context, datas: &mut [&mut T], setin: &str) -> Result<bool> {
        for tester in &self.testers {
            if tester.test(ctx, datas, setin).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Like [`Testers::try_expand`], but an unrecognised name is an error.
    pub async fn expand_one(&self, ctx: &Context, datas: &mut [&mut T], setin: &str) -> Result<()> {
        if self.try_expand(ctx, datas, setin).await? {
            Ok(())
        } else {
            Err(Error::unknown_relation(setin))
        }
    }

    /// [`Testers::expand_one`] for each name, stopping at the first error.
    pub async fn expand(&self, ctx: &Context, datas: &mut [&mut T], setins: &[&str]) -> Result<()> {
        for setin in setins {
            self.expand_one(ctx, datas, setin).await?;
        }
        Ok(())
    }

    /// A Setiner driven by this chain.
    pub fn into_setiner(self) -> Setiner<T>
    where
        T: Node,
    {
        Setiner::new(self)
    }
}

impl<T: Send + 'static> Default for Testers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Testers<T> {
    fn clone(&self) -> Self {
        Self {
            testers: self.testers.clone(),
        }
    }
}

impl<T> fmt::Debug for Testers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Testers")
            .field("len", &self.testers.len())
            .finish()
    }
}

#[async_trait]
impl<T: Send + 'static> Tester<T> for Testers<T> {
    async fn test(&self, ctx: &Context, datas: &mut [&mut T], setin: &str) -> Result<bool> {
        self.try_expand(ctx, datas, setin).await
    }
}

// ============================================================================
// Tests
// ============================================================================
