//! # setin-cli
//!
//! Command implementations behind the `setin` binary. Each command returns
//! the text to print so it can be tested without capturing stdout.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use anyhow::{Context as _, Result};
use serde::Serialize;
use setin::ExpandConfig;
use setin::expression::{explain, parse};
use std::path::Path;

/// One parsed expression, as printed by `setin parse`.
#[derive(Debug, Serialize)]
pub struct ParsedExpression {
    /// Expression as given on the command line
    pub expression: String,
    /// Independent sub-expressions
    pub parts: Vec<String>,
}

/// Parse every expression and render the results as pretty JSON.
///
/// Fails on the first malformed expression.
pub fn parse_command(exprs: &[String]) -> Result<String> {
    let parsed = exprs
        .iter()
        .map(|expr| {
            let parts = parse(expr).with_context(|| format!("cannot parse `{expr}`"))?;
            Ok(ParsedExpression {
                expression: expr.clone(),
                parts,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(count = parsed.len(), "parsed expressions");
    Ok(serde_json::to_string_pretty(&parsed)?)
}

/// Describe how a path will be interpreted, one step per line.
pub fn explain_command(path: &str) -> Result<String> {
    let lines = explain(path).with_context(|| format!("cannot explain `{path}`"))?;
    if lines.is_empty() {
        return Ok("(nothing to expand)".to_string());
    }
    Ok(lines.join("\n"))
}

/// Render the effective configuration as TOML.
///
/// Without a file this is the default configuration.
pub fn config_command(path: Option<&Path>) -> Result<String> {
    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            ExpandConfig::load(path)
                .with_context(|| format!("cannot load {}", path.display()))?
        }
        None => ExpandConfig::default(),
    };
    Ok(config.to_toml_string()?)
}
