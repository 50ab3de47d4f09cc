//! Fetcher trait and closure adapter.
//!
//! A [`Fetcher`] loads the sub-resources for a batch of keys, typically with
//! one database query or remote call. The loader calls it at most once per
//! expansion and always with a duplicate-free key list.

use async_trait::async_trait;
use setin_core::{BoxError, Context};
use std::future::Future;
use std::sync::Arc;

/// Batched sub-resource source.
///
/// # Errors
///
/// Whatever the fetch returns is handed back to the caller of the expansion
/// untouched, wrapped in [`setin_core::Error::Fetch`].
///
/// # Cancellation
///
/// The [`Context`] is the caller's; honouring [`Context::cancelled`] is up to
/// the implementation.
#[async_trait]
pub trait Fetcher<K, S>: Send + Sync {
    /// Fetch the sub-resources referenced by `keys`.
    ///
    /// Items may come back in any order, and keys with nothing behind them
    /// may simply be missing from the result.
    async fn fetch(&self, ctx: &Context, keys: Vec<K>) -> Result<Vec<S>, BoxError>;
}

#[async_trait]
impl<K, S, F> Fetcher<K, S> for Arc<F>
where
    K: Send + 'static,
    S: Send + 'static,
    F: Fetcher<K, S> + ?Sized,
{
    async fn fetch(&self, ctx: &Context, keys: Vec<K>) -> Result<Vec<S>, BoxError> {
        (**self).fetch(ctx, keys).await
    }
}

/// [`Fetcher`] backed by an async closure. Built with [`fetch_fn`].
#[derive(Clone)]
pub struct FetchFn<F> {
    f: F,
}

/// Adapt an async closure into a [`Fetcher`].
///
/// The closure receives its own clone of the context, so the returned future
/// does not borrow from the caller.
///
/// ```rust
/// use setin_core::{BoxError, Context};
/// use setin_loader::{fetch_fn, Fetcher};
///
/// let squares = fetch_fn(|_ctx: Context, keys: Vec<u32>| async move {
///     Ok::<_, BoxError>(keys.into_iter().map(|k| k * k).collect::<Vec<u32>>())
/// });
///
/// let out = tokio_test::block_on(squares.fetch(&Context::new(), vec![2, 3])).unwrap();
/// assert_eq!(out, vec![4, 9]);
/// ```
pub fn fetch_fn<K, S, F, Fut>(f: F) -> FetchFn<F>
where
    K: Send + 'static,
    S: Send + 'static,
    F: Fn(Context, Vec<K>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<S>, BoxError>> + Send + 'static,
{
    FetchFn { f }
}

#[async_trait]
impl<K, S, F, Fut> Fetcher<K, S> for FetchFn<F>
where
    K: Send + 'static,
    S: Send + 'static,
    F: Fn(Context, Vec<K>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<S>, BoxError>> + Send + 'static,
{
    async fn fetch(&self, ctx: &Context, keys: Vec<K>) -> Result<Vec<S>, BoxError> {
        (self.f)(ctx.clone(), keys).await
    }
}
