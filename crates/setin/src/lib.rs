//! Setin — batched sub-resource expansion driven by path expressions.
//!
//! A caller holding a collection of root items (posts, orders) asks for
//! related sub-resources by path (`"Author"`, `"Comments-Author"`,
//! `"(Tags)(Author-Profile)"`). Every segment is expanded with one batched
//! fetch for the whole collection, and nested paths cross from one type to
//! the next through a [`HandlerRegistry`].
//!
//! # Modules
//!
//! - [`tester`]: Named handler mappings and tester chains
//! - [`setiner`]: The root-level path interpreter
//! - [`registry`]: Type identity to type-erased handler
//! - [`action`]: A Setiner with roots and default paths bound
//!
//! The building blocks live in `setin-core` (paths, nodes, traits, errors)
//! and `setin-loader` (batched loading); the common items are re-exported
//! here.

#![forbid(unsafe_code)]

pub mod action;
pub mod registry;
pub mod setiner;
pub mod tester;

mod proptests;

pub use action::SetinAction;
pub use registry::HandlerRegistry;
pub use setiner::Setiner;
pub use tester::{HandlerMapping, Testers};

pub use setin_core::{
    AsNode, BoxError, Context, Error, ErrorHandling, ExpandConfig, Handler, Indirection, Node,
    NodeHandler, Result, Tester, TypeIdent, async_trait, expression, get, node,
};
pub use setin_loader::{
    FetchFn, Fetcher, Identified, ManyRelation, Relation, ReversedRelation, dedup_keys, fetch_fn,
    load, load_by_id, load_many, load_reversed, load_reversed_by_id,
};
