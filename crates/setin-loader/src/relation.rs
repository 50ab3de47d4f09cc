//! Relations: a loader form with its callables bound, usable as a [`Handler`].
//!
//! ```rust
//! use std::collections::HashMap;
//! use setin_core::{BoxError, Context, Handler};
//! use setin_loader::{fetch_fn, Relation};
//!
//! #[derive(Clone)]
//! struct Customer { id: u32 }
//! struct Order { customer_id: u32, customer: Option<Customer> }
//!
//! let relation = Relation::new(
//!     |order: &Order| [order.customer_id],
//!     fetch_fn(|_ctx: Context, keys: Vec<u32>| async move {
//!         Ok::<_, BoxError>(keys.into_iter().map(|id| Customer { id }).collect::<Vec<_>>())
//!     }),
//!     |customer: &Customer| customer.id,
//!     |order: &mut Order, lookup: &HashMap<u32, Customer>| {
//!         order.customer = lookup.get(&order.customer_id).cloned();
//!     },
//! );
//!
//! let mut order = Order { customer_id: 4, customer: None };
//! tokio_test::block_on(relation.handle(&Context::new(), &mut [&mut order])).unwrap();
//! assert_eq!(order.customer.map(|c| c.id), Some(4));
//! ```

use crate::fetcher::Fetcher;
use crate::load::{Identified, load, load_many};
use async_trait::async_trait;
use setin_core::{Context, Handler, Result};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

type KeysFn<T, K> = Box<dyn Fn(&T) -> Vec<K> + Send + Sync>;
type KeyFn<T, K> = Box<dyn Fn(&T) -> K + Send + Sync>;
type MergeFn<T, L> = Box<dyn Fn(&mut T, &L) + Send + Sync>;

// ============================================================================
// Relation
// ============================================================================

/// Forward relation: roots reference keys, each sub-resource has one key.
pub struct Relation<T, K, S> {
    root_keys: KeysFn<T, K>,
    fetcher: Arc<dyn Fetcher<K, S>>,
    sub_key: KeyFn<S, K>,
    merge: MergeFn<T, HashMap<K, S>>,
}

impl<T, K, S> Relation<T, K, S>
where
    T: 'static,
    K: Send + 'static,
    S: Send + 'static,
{
    /// Bind the callables of a forward relation.
    pub fn new<R, I, F, SK, M>(root_keys: R, fetcher: F, sub_key: SK, merge: M) -> Self
    where
        R: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = K>,
        F: Fetcher<K, S> + 'static,
        SK: Fn(&S) -> K + Send + Sync + 'static,
        M: Fn(&mut T, &HashMap<K, S>) + Send + Sync + 'static,
    {
        Self {
            root_keys: Box::new(move |data: &T| root_keys(data).into_iter().collect()),
            fetcher: Arc::new(fetcher),
            sub_key: Box::new(sub_key),
            merge: Box::new(merge),
        }
    }

    /// Forward relation whose sub-resources carry their own key.
    pub fn by_id<R, I, F, M>(root_keys: R, fetcher: F, merge: M) -> Self
    where
        R: Fn(&T) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = K>,
        F: Fetcher<K, S> + 'static,
        S: Identified<Id = K>,
        M: Fn(&mut T, &HashMap<K, S>) + Send + Sync + 'static,
    {
        Self::new(root_keys, fetcher, S::id, merge)
    }
}

#[async_trait]
impl<T, K, S> Handler<T> for Relation<T, K, S>
where
    T: Send + 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    async fn handle(&self, ctx: &Context, datas: &mut [&mut T]) -> Result<()> {
        load(
            ctx,
            datas,
            &self.root_keys,
            &*self.fetcher,
            &self.sub_key,
            |data: &mut T, lookup: &HashMap<K, S>| (self.merge)(data, lookup),
        )
        .await
    }
}

impl<T, K, S> fmt::Debug for Relation<T, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("root", &std::any::type_name::<T>())
            .field("sub", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ReversedRelation
// ============================================================================

/// Reversed relation: each root has one key, sub-resources declare the keys
/// of the roots they belong to.
pub struct ReversedRelation<T, K, S> {
    root_key: KeyFn<T, K>,
    fetcher: Arc<dyn Fetcher<K, S>>,
    sub_keys: KeysFn<S, K>,
    merge: MergeFn<T, HashMap<K, Vec<S>>>,
}

impl<T, K, S> ReversedRelation<T, K, S>
where
    T: 'static,
    K: Send + 'static,
    S: Send + 'static,
{
    /// Bind the callables of a reversed relation.
    pub fn new<RK, F, SK, I, M>(root_key: RK, fetcher: F, sub_keys: SK, merge: M) -> Self
    where
        RK: Fn(&T) -> K + Send + Sync + 'static,
        F: Fetcher<K, S> + 'static,
        SK: Fn(&S) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = K>,
        M: Fn(&mut T, &HashMap<K, Vec<S>>) + Send + Sync + 'static,
    {
        Self {
            root_key: Box::new(root_key),
            fetcher: Arc::new(fetcher),
            sub_keys: Box::new(move |sub: &S| sub_keys(sub).into_iter().collect()),
            merge: Box::new(merge),
        }
    }

    /// Reversed relation whose roots carry their own key.
    pub fn by_id<F, SK, I, M>(fetcher: F, sub_keys: SK, merge: M) -> Self
    where
        T: Identified<Id = K>,
        F: Fetcher<K, S> + 'static,
        SK: Fn(&S) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = K>,
        M: Fn(&mut T, &HashMap<K, Vec<S>>) + Send + Sync + 'static,
    {
        Self::new(T::id, fetcher, sub_keys, merge)
    }
}

#[async_trait]
impl<T, K, S> Handler<T> for ReversedRelation<T, K, S>
where
    T: Send + 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &Context, datas: &mut [&mut T]) -> Result<()> {
        load_many(
            ctx,
            datas,
            |data: &T| std::iter::once((self.root_key)(data)),
            &*self.fetcher,
            &self.sub_keys,
            |data: &mut T, lookup: &HashMap<K, Vec<S>>| (self.merge)(data, lookup),
        )
        .await
    }
}

impl<T, K, S> fmt::Debug for ReversedRelation<T, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReversedRelation")
            .field("root", &std::any::type_name::<T>())
            .field("sub", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ManyRelation
// ============================================================================

/// Many-to-many relation: roots reference many keys, sub-resources declare
/// many keys.
pub struct ManyRelation<T, K, S> {
    root_keys: KeysFn<T, K>,
    fetcher: Arc<dyn Fetcher<K, S>>,
    sub_keys: KeysFn<S, K>,
    merge: MergeFn<T, HashMap<K, Vec<S>>>,
}

impl<T, K, S> ManyRelation<T, K, S>
where
    T: 'static,
    K: Send + 'static,
    S: Send + 'static,
{
    /// Bind the callables of a many-to-many relation.
    pub fn new<R, RI, F, SK, SI, M>(root_keys: R, fetcher: F, sub_keys: SK, merge: M) -> Self
    where
        R: Fn(&T) -> RI + Send + Sync + 'static,
        RI: IntoIterator<Item = K>,
        F: Fetcher<K, S> + 'static,
        SK: Fn(&S) -> SI + Send + Sync + 'static,
        SI: IntoIterator<Item = K>,
        M: Fn(&mut T, &HashMap<K, Vec<S>>) + Send + Sync + 'static,
    {
        Self {
            root_keys: Box::new(move |data: &T| root_keys(data).into_iter().collect()),
            fetcher: Arc::new(fetcher),
            sub_keys: Box::new(move |sub: &S| sub_keys(sub).into_iter().collect()),
            merge: Box::new(merge),
        }
    }
}

#[async_trait]
impl<T, K, S> Handler<T> for ManyRelation<T, K, S>
where
    T: Send + 'static,
    K: Eq + Hash + Clone + Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
{
    async fn handle(&self, ctx: &Context, datas: &mut [&mut T]) -> Result<()> {
        load_many(
            ctx,
            datas,
            &self.root_keys,
            &*self.fetcher,
            &self.sub_keys,
            |data: &mut T, lookup: &HashMap<K, Vec<S>>| (self.merge)(data, lookup),
        )
        .await
    }
}

impl<T, K, S> fmt::Debug for ManyRelation<T, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManyRelation")
            .field("root", &std::any::type_name::<T>())
            .field("sub", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}
