//! Handler registry: type identity to type-erased handler.
//!
//! The registry is how a path crosses from one type to another. When a path
//! navigates from a `Post` into its `Comments` and then dispatches
//! (`Comments-Author`), the `Author` relation belongs to `Comment`, so the
//! registry looks up the handler registered for `Comment` and hands it the
//! rest of the path.
//!
//! Registration needs `&mut self`; once built, a registry is shared as an
//! `Arc<HandlerRegistry>` and is read-only from then on. It reaches a
//! [`Setiner`](crate::Setiner) either bound directly or through the
//! [`Context`] (`ctx.with_shared(Arc::clone(&registry))`, or
//! `ctx.with_value(registry)` for a registry that is not shared elsewhere).

use futures::future::BoxFuture;
use setin_core::expression::{Step, next_step};
use setin_core::{Context, Error, Node, NodeHandler, Result, TypeIdent, get};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-identity keyed table of [`NodeHandler`]s.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TypeIdent, Arc<dyn NodeHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for the essential type of `T`.
    ///
    /// `register::<Comment>` also covers `Box<Comment>`, `Vec<Comment>` and
    /// `Option<Comment>`.
    pub fn register<T, H>(&mut self, handler: H) -> &mut Self
    where
        T: Node,
        H: NodeHandler + 'static,
    {
        self.register_ident(T::essential_type(), Arc::new(handler));
        self
    }

    /// Builder form of [`HandlerRegistry::register`].
    pub fn with_handler<T, H>(mut self, handler: H) -> Self
    where
        T: Node,
        H: NodeHandler + 'static,
    {
        self.register::<T, H>(handler);
        self
    }

    /// Register a shared handler under an explicit identity, returning the
    /// handler it replaced.
    pub fn register_ident(
        &mut self,
        ident: TypeIdent,
        handler: Arc<dyn NodeHandler>,
    ) -> Option<Arc<dyn NodeHandler>> {
        tracing::debug!(%ident, "registering handler");
        self.handlers.insert(ident, handler)
    }

    /// Handler registered for `ident`.
    pub fn lookup(&self, ident: &TypeIdent) -> Option<&Arc<dyn NodeHandler>> {
        self.handlers.get(ident)
    }

    /// Returns `true` if a handler is registered for `ident`.
    pub fn contains(&self, ident: &TypeIdent) -> bool {
        self.handlers.contains_key(ident)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Resolve `paths` against `nodes`, stopping at the first error.
    ///
    /// Each node is flattened first, so a `Vec<Comment>` passed as one node
    /// is treated as its comments.
    pub async fn dispatch(
        &self,
        ctx: &Context,
        nodes: &mut [&mut dyn Node],
        paths: &[&str],
    ) -> Result<()> {
        let ident = nodes.first().map(|node| node.type_ident());
        for path in paths {
            let mut elements = Vec::new();
            for node in nodes.iter_mut() {
                node.collect_elements(&mut elements);
            }
            resolve_nodes(ctx, Some(self), ident, elements, path).await?;
        }
        Ok(())
    }

    /// [`HandlerRegistry::dispatch`] on a single value.
    pub async fn dispatch_value<N: Node>(
        &self,
        ctx: &Context,
        value: &mut N,
        paths: &[&str],
    ) -> Result<()> {
        self.dispatch(ctx, &mut [value.as_node_mut()], paths).await
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut idents: Vec<&str> = self.handlers.keys().map(TypeIdent::name).collect();
        idents.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("types", &idents)
            .finish()
    }
}

// ============================================================================
// Type-erased path interpreter
// ============================================================================

/// Reborrow a node collection for one sibling of a group.
pub(crate) fn reborrow<'b>(nodes: &'b mut [&mut dyn Node]) -> Vec<&'b mut dyn Node> {
    nodes
        .iter_mut()
        .map(|node| &mut **node as &mut dyn Node)
        .collect()
}

/// Navigate every node into `name`, flattening the members.
///
/// The identity of the result is taken from the first member, so it is
/// `None` only when there were no nodes to navigate.
pub(crate) fn navigate<'n>(
    nodes: Vec<&'n mut dyn Node>,
    name: &str,
) -> Result<(Option<TypeIdent>, Vec<&'n mut dyn Node>)> {
    let mut ident = None;
    let mut members = Vec::with_capacity(nodes.len());
    for node in nodes {
        let member = get(node, name)?;
        if ident.is_none() {
            ident = Some(member.type_ident());
        }
        member.collect_elements(&mut members);
    }
    Ok((ident, members))
}

/// Interpret `path` against `nodes`, whose essential type is `ident`.
///
/// A `-` step hands the rest of the path to the handler registered for
/// `ident`; a trailing bare name is navigated (and so checked) but nothing
/// is expanded on it.
pub(crate) fn resolve_nodes<'a>(
    ctx: &'a Context,
    registry: Option<&'a HandlerRegistry>,
    ident: Option<TypeIdent>,
    nodes: Vec<&'a mut dyn Node>,
    path: &'a str,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let mut ident = ident;
        let mut nodes = nodes;
        let mut path = path;

        loop {
            tracing::trace!(path, nodes = nodes.len(), "resolving step");
            match next_step(path)? {
                Step::Empty => return Ok(()),
                Step::Skip(rest) => path = rest,
                Step::Dispatch(rest) => {
                    let Some(ident) = ident else {
                        return Ok(());
                    };
                    let handler = registry
                        .and_then(|registry| registry.lookup(&ident))
                        .ok_or_else(|| Error::unregistered(ident.name(), rest))?;
                    tracing::debug!(%ident, path = rest, nodes = nodes.len(), "dispatching");
                    return handler.expand_nodes(ctx, &mut nodes, &[rest]).await;
                }
                Step::Group(parts) => match parts.as_slice() {
                    [] => return Ok(()),
                    [single] => path = *single,
                    _ => {
                        for part in parts.iter().copied() {
                            resolve_nodes(ctx, registry, ident, reborrow(&mut nodes), part).await?;
                        }
                        return Ok(());
                    }
                },
                Step::Navigate { name, rest } => {
                    if !name.is_empty() {
                        (ident, nodes) = navigate(nodes, name)?;
                    }
                    path = rest;
                }
                Step::Literal(name) => {
                    navigate(nodes, name)?;
                    return Ok(());
                }
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
