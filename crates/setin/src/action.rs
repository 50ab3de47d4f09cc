//! Expansion actions: a Setiner with its roots and paths bound.
//!
//! ```rust,ignore
//! setiner
//!     .action()
//!     .with_values(&mut posts)
//!     .with_paths(["Author", "Comments-Author"])
//!     .expand(&ctx)
//!     .await?;
//! ```

use crate::setiner::Setiner;
use setin_core::{Context, Node, Result};
use std::fmt;

/// A [`Setiner`], a root collection and default paths.
pub struct SetinAction<'s, 'd, T> {
    setiner: &'s Setiner<T>,
    datas: Vec<&'d mut T>,
    paths: Vec<String>,
}

impl<'s, 'd, T: Node> SetinAction<'s, 'd, T> {
    /// An action with no roots and no paths.
    pub fn new(setiner: &'s Setiner<T>) -> Self {
        Self {
            setiner,
            datas: Vec::new(),
            paths: Vec::new(),
        }
    }

    /// Bind a single item; `None` binds an empty collection.
    pub fn with_data(mut self, data: Option<&'d mut T>) -> Self {
        self.datas = data.into_iter().collect();
        self
    }

    /// Bind a collection of items.
    pub fn with_datas<I>(mut self, datas: I) -> Self
    where
        I: IntoIterator<Item = &'d mut T>,
    {
        self.datas = datas.into_iter().collect();
        self
    }

    /// Bind a collection with gaps; absent entries are dropped.
    pub fn with_optional_datas<I>(mut self, datas: I) -> Self
    where
        I: IntoIterator<Item = Option<&'d mut T>>,
    {
        self.datas = datas.into_iter().flatten().collect();
        self
    }

    /// Bind every item of a slice of owned values.
    pub fn with_values(mut self, values: &'d mut [T]) -> Self {
        self.datas = values.iter_mut().collect();
        self
    }

    /// Set the default paths.
    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Default paths.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Number of bound roots.
    pub fn len(&self) -> usize {
        self.datas.len()
    }

    /// Returns `true` if no roots are bound.
    pub fn is_empty(&self) -> bool {
        self.datas.is_empty()
    }

    /// Expand the default paths on the bound roots.
    pub async fn expand(&mut self, ctx: &Context) -> Result<()> {
        self.expand_with(ctx, &[]).await
    }

    /// Expand `paths` on the bound roots; an empty list means the defaults.
    pub async fn expand_with(&mut self, ctx: &Context, paths: &[&str]) -> Result<()> {
        if !paths.is_empty() {
            return self.setiner.expand(ctx, &mut self.datas, paths).await;
        }
        let defaults: Vec<&str> = self.paths.iter().map(String::as_str).collect();
        self.setiner.expand(ctx, &mut self.datas, &defaults).await
    }

    /// Expand the default paths on `data` instead of the bound roots.
    pub async fn expand_data(&self, ctx: &Context, data: Option<&mut T>) -> Result<()> {
        self.setiner.expand_data(ctx, data, &self.default_paths()).await
    }

    /// Expand the default paths on `datas` instead of the bound roots.
    pub async fn expand_datas(&self, ctx: &Context, datas: &mut [&mut T]) -> Result<()> {
        self.setiner.expand(ctx, datas, &self.default_paths()).await
    }

    /// Expand the default paths on `values` instead of the bound roots.
    pub async fn expand_values(&self, ctx: &Context, values: &mut [T]) -> Result<()> {
        self.setiner
            .expand_values(ctx, values, &self.default_paths())
            .await
    }

    fn default_paths(&self) -> Vec<&str> {
        self.paths.iter().map(String::as_str).collect()
    }
}

impl<T> fmt::Debug for SetinAction<'_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetinAction")
            .field("setiner", self.setiner)
            .field("roots", &self.datas.len())
            .field("paths", &self.paths)
            .finish()
    }
}
