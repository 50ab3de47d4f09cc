//! Handler traits.
//!
//! Three seams, from most to least typed:
//!
//! - [`Handler`] expands one relation on a root collection of `T`
//! - [`Tester`] decides whether it handles a path segment, and handles it
//! - [`NodeHandler`] expands paths on type-erased [`Node`]s; this is what a
//!   handler registry stores

use crate::context::Context;
use crate::error::Result;
use crate::node::Node;
use async_trait::async_trait;
use std::sync::Arc;

/// Expands one relation on a collection of root items.
#[async_trait]
pub trait Handler<T>: Send + Sync {
    /// Load and attach the relation on every item of `datas`.
    async fn handle(&self, ctx: &Context, datas: &mut [&mut T]) -> Result<()>;
}

/// An exact-match handler: reports whether it recognised `setin`.
#[async_trait]
pub trait Tester<T>: Send + Sync {
    /// Handle `setin` if recognised. `Ok(false)` means "not mine".
    async fn test(&self, ctx: &Context, datas: &mut [&mut T], setin: &str) -> Result<bool>;
}

/// Expands paths on values whose type is only known at runtime.
#[async_trait]
pub trait NodeHandler: Send + Sync {
    /// Resolve every path in `paths` against `nodes`.
    async fn expand_nodes(
        &self,
        ctx: &Context,
        nodes: &mut [&mut dyn Node],
        paths: &[&str],
    ) -> Result<()>;
}

#[async_trait]
impl<T, H> Handler<T> for Arc<H>
where
    T: Send + 'static,
    H: Handler<T> + ?Sized,
{
    async fn handle(&self, ctx: &Context, datas: &mut [&mut T]) -> Result<()> {
        (**self).handle(ctx, datas).await
    }
}

#[async_trait]
impl<T, H> Tester<T> for Arc<H>
where
    T: Send + 'static,
    H: Tester<T> + ?Sized,
{
    async fn test(&self, ctx: &Context, datas: &mut [&mut T], setin: &str) -> Result<bool> {
        (**self).test(ctx, datas, setin).await
    }
}
