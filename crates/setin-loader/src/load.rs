//! The batched loading algorithm.
//!
//! Every form follows the same four steps:
//!
//! 1. collect the keys every root references, deduplicated in first-seen order
//! 2. fetch them with a single call
//! 3. index the fetched items by key
//! 4. merge, once per root, in root order
//!
//! An empty root collection does nothing at all. Roots that reference no keys
//! skip the fetch but are still merged (against an empty lookup), so merge
//! callbacks can reset stale state.

use crate::fetcher::Fetcher;
use setin_core::{Context, Error, Result};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Values that carry their own key.
pub trait Identified {
    /// Key type.
    type Id;

    /// This value's key.
    fn id(&self) -> Self::Id;
}

/// Deduplicate keys, keeping the first occurrence of each.
pub fn dedup_keys<K, I>(keys: I) -> Vec<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut seen = HashSet::new();
    keys.into_iter()
        .filter(|key| seen.insert(key.clone()))
        .collect()
}

fn collect_keys<T, K, R, I>(datas: &[&mut T], root_keys: &R) -> Vec<K>
where
    K: Eq + Hash + Clone,
    R: Fn(&T) -> I,
    I: IntoIterator<Item = K>,
{
    dedup_keys(datas.iter().flat_map(|data| root_keys(&**data)))
}

async fn fetch_all<K, S, F>(ctx: &Context, fetcher: &F, keys: Vec<K>, roots: usize) -> Result<Vec<S>>
where
    K: Send + 'static,
    S: Send + 'static,
    F: Fetcher<K, S> + ?Sized,
{
    if keys.is_empty() {
        tracing::debug!(roots, "no keys referenced; skipping fetch");
        return Ok(Vec::new());
    }

    let requested = keys.len();
    let subs = fetcher.fetch(ctx, keys).await.map_err(Error::Fetch)?;
    tracing::debug!(roots, requested, fetched = subs.len(), "batched fetch complete");
    Ok(subs)
}

fn group_by_keys<K, S, SK, I>(subs: Vec<S>, sub_keys: &SK) -> HashMap<K, Vec<S>>
where
    K: Eq + Hash + Clone,
    S: Clone,
    SK: Fn(&S) -> I,
    I: IntoIterator<Item = K>,
{
    let mut lookup: HashMap<K, Vec<S>> = HashMap::new();
    for sub in subs {
        let mut owners = dedup_keys(sub_keys(&sub));
        if let Some(last) = owners.pop() {
            for key in owners {
                lookup.entry(key).or_default().push(sub.clone());
            }
            lookup.entry(last).or_default().push(sub);
        }
    }
    lookup
}

/// Forward form: each root references keys, each fetched item has one key.
///
/// `merge` receives a `key -> item` lookup; on key collision the item fetched
/// last wins.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the fetcher fails; no root is merged then.
pub async fn load<T, K, S, F, R, I, SK, M>(
    ctx: &Context,
    datas: &mut [&mut T],
    root_keys: R,
    fetcher: &F,
    sub_key: SK,
    mut merge: M,
) -> Result<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Send + 'static,
    F: Fetcher<K, S> + ?Sized,
    R: Fn(&T) -> I,
    I: IntoIterator<Item = K>,
    SK: Fn(&S) -> K,
    M: FnMut(&mut T, &HashMap<K, S>),
{
    if datas.is_empty() {
        return Ok(());
    }

    let keys = collect_keys(datas, &root_keys);
    let subs = fetch_all(ctx, fetcher, keys, datas.len()).await?;

    let lookup: HashMap<K, S> = subs.into_iter().map(|sub| (sub_key(&sub), sub)).collect();
    for data in datas.iter_mut() {
        merge(&mut **data, &lookup);
    }
    Ok(())
}

/// Reversed form: each root has one key, each fetched item declares the keys
/// of the roots it belongs to.
///
/// `merge` receives a `key -> items` lookup with items in fetch order. An
/// item declaring several keys is cloned into each of their lists.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the fetcher fails; no root is merged then.
pub async fn load_reversed<T, K, S, F, RK, SK, I, M>(
    ctx: &Context,
    datas: &mut [&mut T],
    root_key: RK,
    fetcher: &F,
    sub_keys: SK,
    merge: M,
) -> Result<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Clone + Send + 'static,
    F: Fetcher<K, S> + ?Sized,
    RK: Fn(&T) -> K,
    SK: Fn(&S) -> I,
    I: IntoIterator<Item = K>,
    M: FnMut(&mut T, &HashMap<K, Vec<S>>),
{
    load_many(
        ctx,
        datas,
        |data: &T| std::iter::once(root_key(data)),
        fetcher,
        sub_keys,
        merge,
    )
    .await
}

/// General form: roots reference many keys, items declare many keys.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the fetcher fails; no root is merged then.
pub async fn load_many<T, K, S, F, R, RI, SK, SI, M>(
    ctx: &Context,
    datas: &mut [&mut T],
    root_keys: R,
    fetcher: &F,
    sub_keys: SK,
    mut merge: M,
) -> Result<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Clone + Send + 'static,
    F: Fetcher<K, S> + ?Sized,
    R: Fn(&T) -> RI,
    RI: IntoIterator<Item = K>,
    SK: Fn(&S) -> SI,
    SI: IntoIterator<Item = K>,
    M: FnMut(&mut T, &HashMap<K, Vec<S>>),
{
    if datas.is_empty() {
        return Ok(());
    }

    let keys = collect_keys(datas, &root_keys);
    let subs = fetch_all(ctx, fetcher, keys, datas.len()).await?;

    let lookup = group_by_keys(subs, &sub_keys);
    for data in datas.iter_mut() {
        merge(&mut **data, &lookup);
    }
    Ok(())
}

/// [`load`] for sub-resources keyed by their own [`Identified::id`].
pub async fn load_by_id<T, K, S, F, R, I, M>(
    ctx: &Context,
    datas: &mut [&mut T],
    root_keys: R,
    fetcher: &F,
    merge: M,
) -> Result<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    S: Identified<Id = K> + Send + 'static,
    F: Fetcher<K, S> + ?Sized,
    R: Fn(&T) -> I,
    I: IntoIterator<Item = K>,
    M: FnMut(&mut T, &HashMap<K, S>),
{
    load(ctx, datas, root_keys, fetcher, S::id, merge).await
}

/// [`load_reversed`] for roots keyed by their own [`Identified::id`].
pub async fn load_reversed_by_id<T, K, S, F, SK, I, M>(
    ctx: &Context,
    datas: &mut [&mut T],
    fetcher: &F,
    sub_keys: SK,
    merge: M,
) -> Result<()>
where
    T: Identified<Id = K>,
    K: Eq + Hash + Clone + Send + 'static,
    S: Clone + Send + 'static,
    F: Fetcher<K, S> + ?Sized,
    SK: Fn(&S) -> I,
    I: IntoIterator<Item = K>,
    M: FnMut(&mut T, &HashMap<K, Vec<S>>),
{
    load_reversed(ctx, datas, T::id, fetcher, sub_keys, merge).await
}

// ============================================================================
// Tests
// ============================================================================
