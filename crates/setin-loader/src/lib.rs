//! Setin Loader — batched sub-resource loading.
//!
//! Given a collection of root items, the loader collects every key they
//! reference, fetches the sub-resources for all of them with one call, and
//! merges the results back into each root. This avoids issuing one fetch per
//! root (the N+1 query problem).
//!
//! # Modules
//!
//! - [`fetcher`]: The [`Fetcher`] trait and [`fetch_fn`] closure adapter
//! - [`load`]: The loading algorithm in forward, reversed and many-to-many form
//! - [`relation`]: Loader forms bound into reusable [`setin_core::Handler`]s

#![forbid(unsafe_code)]

pub mod fetcher;
pub mod load;
pub mod relation;

mod proptests;

pub use fetcher::{FetchFn, Fetcher, fetch_fn};
pub use load::{
    Identified, dedup_keys, load, load_by_id, load_many, load_reversed, load_reversed_by_id,
};
pub use relation::{ManyRelation, Relation, ReversedRelation};
