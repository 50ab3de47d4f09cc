//! Setiner: the root-level path interpreter.
//!
//! A [`Setiner<T>`] expands path expressions on a collection of `T`:
//!
//! - a bare name (`Author`) is a relation, handled by the first tester that
//!   recognises it
//! - `-name` is the same relation addressed explicitly; if no tester handles
//!   it and the remainder is itself a path, it goes to the handler registry
//! - `name.rest` / `name-rest` navigate into a member of every root and keep
//!   resolving there, crossing to other types through the registry
//! - `(a)(b)` resolves each group independently against the same roots
//!
//! Paths are resolved one after the other; with the default
//! [`ErrorHandling::FailFast`] the first failure ends the call, and anything
//! merged before it stays merged.

use crate::action::SetinAction;
use crate::registry::{HandlerRegistry, navigate, resolve_nodes};
use crate::tester::Testers;
use async_trait::async_trait;
use futures::future::BoxFuture;
use setin_core::expression::{Step, next_step};
use setin_core::{Context, Error, ErrorHandling, ExpandConfig, Node, NodeHandler, Result};
use std::fmt;
use std::sync::Arc;

/// Root-level path interpreter for collections of `T`.
pub struct Setiner<T> {
    testers: Testers<T>,
    registry: Option<Arc<HandlerRegistry>>,
    config: ExpandConfig,
    label: String,
}

impl<T: Node> Setiner<T> {
    /// Create a Setiner with the given testers and default configuration.
    pub fn new(testers: Testers<T>) -> Self {
        Self {
            testers,
            registry: None,
            config: ExpandConfig::default(),
            label: format!("Setiner<{}>", std::any::type_name::<T>()),
        }
    }

    /// Builder: bind a handler registry.
    ///
    /// Without one, the registry carried by the [`Context`] (if any) is used,
    /// whether it was attached with [`Context::with_shared`] or as a value
    /// (`HandlerRegistry` or `Arc<HandlerRegistry>`).
    pub fn with_registry(mut self, registry: Arc<HandlerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Builder: replace the configuration.
    pub fn with_config(mut self, config: ExpandConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: name used in unknown-relation errors.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Name used in unknown-relation errors.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current configuration.
    pub fn config(&self) -> &ExpandConfig {
        &self.config
    }

    /// The tester chain.
    pub fn testers(&self) -> &Testers<T> {
        &self.testers
    }

    /// Start an [`SetinAction`] bound to this Setiner.
    pub fn action<'d>(&self) -> SetinAction<'_, 'd, T> {
        SetinAction::new(self)
    }

    /// Expand every path on `datas`, in order.
    ///
    /// # Errors
    ///
    /// With [`ErrorHandling::FailFast`], the first error. With
    /// [`ErrorHandling::Collect`], every path is attempted and the failures
    /// come back as one [`Error::Aggregate`] (or the error itself if only
    /// one path failed).
    pub async fn expand(&self, ctx: &Context, datas: &mut [&mut T], paths: &[&str]) -> Result<()> {
        let mut errors = Vec::new();
        for path in paths {
            match self.resolve(ctx, datas, path).await {
                Ok(()) => {}
                Err(err) if self.config.error_handling == ErrorHandling::Collect => {
                    tracing::debug!(setiner = %self.label, path, error = %err, "path failed");
                    errors.push(err);
                }
                Err(err) => return Err(err),
            }
        }
        Error::aggregate(errors)
    }

    /// Expand on a single optional item. `None` is a no-op.
    pub async fn expand_data(&self, ctx: &Context, data: Option<&mut T>, paths: &[&str]) -> Result<()> {
        match data {
            Some(data) => self.expand(ctx, &mut [data], paths).await,
            None => Ok(()),
        }
    }

    /// Expand on a slice of owned items.
    pub async fn expand_values(&self, ctx: &Context, values: &mut [T], paths: &[&str]) -> Result<()> {
        let mut datas: Vec<&mut T> = values.iter_mut().collect();
        self.expand(ctx, &mut datas, paths).await
    }

    fn fallback_registry(&self, ctx: &Context) -> Option<Arc<HandlerRegistry>> {
        if !self.config.registry_fallback {
            return None;
        }
        self.registry
            .clone()
            .or_else(|| ctx.value::<HandlerRegistry>())
            .or_else(|| ctx.value::<Arc<HandlerRegistry>>().map(|shared| Arc::clone(&*shared)))
    }

    fn resolve<'a>(
        &'a self,
        ctx: &'a Context,
        datas: &'a mut [&mut T],
        path: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut path = path;

            loop {
                tracing::trace!(setiner = %self.label, path, "resolving step");
                match next_step(path)? {
                    Step::Empty => return Ok(()),
                    Step::Skip(rest) => path = rest,
                    Step::Literal(name) => return self.expand_relation(ctx, datas, name).await,
                    Step::Dispatch(rest) => {
                        if self.testers.try_expand(ctx, datas, rest).await? {
                            return Ok(());
                        }
                        if next_step(rest)?.is_literal() {
                            return Err(Error::unknown_relation_in(rest, self.label.as_str()));
                        }
                        let handler = self
                            .fallback_registry(ctx)
                            .and_then(|registry| registry.lookup(&T::essential_type()).cloned());
                        if let Some(handler) = handler {
                            tracing::debug!(setiner = %self.label, path = rest, "delegating to registry");
                            let mut nodes = erase(datas);
                            return handler.expand_nodes(ctx, &mut nodes, &[rest]).await;
                        }
                        path = rest;
                    }
                    Step::Group(parts) => match parts.as_slice() {
                        [] => return Ok(()),
                        [single] => path = *single,
                        _ => {
                            for part in parts.iter().copied() {
                                self.resolve(ctx, &mut *datas, part).await?;
                            }
                            return Ok(());
                        }
                    },
                    Step::Navigate { name, rest } => {
                        let registry = self.fallback_registry(ctx);
                        let (ident, members) = navigate(erase(datas), name)?;
                        return resolve_nodes(ctx, registry.as_deref(), ident, members, rest).await;
                    }
                }
            }
        })
    }

    async fn expand_relation(&self, ctx: &Context, datas: &mut [&mut T], name: &str) -> Result<()> {
        if self.testers.try_expand(ctx, datas, name).await? {
            Ok(())
        } else {
            Err(Error::unknown_relation_in(name, self.label.as_str()))
        }
    }
}

fn erase<'b, T: Node>(datas: &'b mut [&mut T]) -> Vec<&'b mut dyn Node> {
    datas
        .iter_mut()
        .map(|data| &mut **data as &mut dyn Node)
        .collect()
}

#[async_trait]
impl<T: Node> NodeHandler for Setiner<T> {
    async fn expand_nodes(
        &self,
        ctx: &Context,
        nodes: &mut [&mut dyn Node],
        paths: &[&str],
    ) -> Result<()> {
        let mut datas: Vec<&mut T> = Vec::with_capacity(nodes.len());
        for node in nodes.iter_mut() {
            let given = node.type_ident();
            let data = node
                .as_any_mut()
                .downcast_mut::<T>()
                .ok_or_else(|| Error::bad_type(std::any::type_name::<T>(), given.name()))?;
            datas.push(data);
        }
        self.expand(ctx, &mut datas, paths).await
    }
}

impl<T> fmt::Debug for Setiner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setiner")
            .field("label", &self.label)
            .field("testers", &self.testers)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
