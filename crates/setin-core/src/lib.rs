//! Setin Core — shared types, traits, errors, and path expressions.
//!
//! This crate provides the foundational types used across all Setin crates.
//! It has no internal Setin dependencies.
//!
//! # Modules
//!
//! - [`config`]: Expansion configuration
//! - [`context`]: Per-call context (typed values, cancellation)
//! - [`error`]: Error types and Result alias
//! - [`expression`]: Path expression parsing and scanning
//! - [`handler`]: Handler, tester, and type-erased handler traits
//! - [`node`]: Navigable values and the sub-data accessor

#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod expression;
pub mod handler;
pub mod node;

mod proptests;

// Re-export key types at crate root for convenience
pub use config::{ErrorHandling, ExpandConfig};
pub use context::Context;
pub use error::{BoxError, Error, Result};
pub use handler::{Handler, NodeHandler, Tester};
pub use node::{AsNode, Indirection, Node, TypeIdent, get};

// Re-exported so implementors can write `#[setin_core::async_trait]`.
pub use async_trait::async_trait;
