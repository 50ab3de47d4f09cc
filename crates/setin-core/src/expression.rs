//! Path expressions.
//!
//! A path expression names what to expand, starting from a root item:
//!
//! | syntax           | meaning                                                    |
//! |------------------|------------------------------------------------------------|
//! | `Tags`           | relation `Tags` on the roots                               |
//! | `Author.Profile` | navigate into `Author`, then into `Profile`                |
//! | `Author-Avatar`  | navigate into `Author`, then hand `Avatar` to its handler  |
//! | `(Tags)(Author)` | expand `Tags` and `Author` independently on the same value |
//!
//! [`parse`] splits bracketed groups; [`next_step`] is the scanner both
//! interpreters use to walk a path one step at a time.
//!
//! # Example
//!
//! ```
//! use setin_core::expression::parse;
//!
//! assert_eq!(parse("(A)B(C)").unwrap(), vec!["A", "B", "C"]);
//! assert!(parse("(A))").is_err());
//! ```

use crate::error::{Error, Result};

/// Characters that end a name inside a path.
pub const DELIMITERS: &[char] = &['.', '-', '('];

const UNCLOSED: &str = "unclosed `(`";
const UNMATCHED: &str = "unmatched `)`";

/// Split an expression into its sub-expressions.
///
/// Leading and trailing whitespace is ignored. Bracketed groups become their
/// own entries (without the brackets), as does any text between them. A group
/// that is one bracketed group as a whole collapses to its content, so
/// `((A))` yields `A`.
pub fn parse(expr: &str) -> Result<Vec<String>> {
    Ok(split(expr.trim())?
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Borrowing variant of [`parse`] used by the interpreters; `expr` must
/// already be trimmed.
pub fn split(expr: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut rest = expr;

    'segment: while !rest.is_empty() {
        let mut depth = 0usize;
        let mut open = 0;

        for (i, byte) in rest.bytes().enumerate() {
            match byte {
                b'(' => {
                    if depth == 0 {
                        if i > 0 {
                            parts.push(&rest[..i]);
                        }
                        open = i;
                    }
                    depth += 1;
                }
                b')' => {
                    if depth == 0 {
                        return Err(Error::malformed(rest, UNMATCHED));
                    }
                    depth -= 1;
                    if depth == 0 {
                        parts.push(collapse(&rest[open + 1..i]));
                        rest = &rest[i + 1..];
                        continue 'segment;
                    }
                }
                _ => {}
            }
        }

        if depth != 0 {
            return Err(Error::malformed(rest, UNCLOSED));
        }
        parts.push(rest);
        break;
    }

    Ok(parts)
}

/// Strip bracket pairs that wrap the whole of an (already balanced) group.
fn collapse(mut group: &str) -> &str {
    while group.starts_with('(') && closing_index(group) == Some(group.len() - 1) {
        group = &group[1..group.len() - 1];
    }
    group
}

/// Index of the `)` matching the `(` at index 0.
fn closing_index(group: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, byte) in group.bytes().enumerate() {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// One step of a path, as seen from its current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<'a> {
    /// Nothing left to resolve.
    Empty,
    /// Leading `.`: continue with the remainder on the same value.
    Skip(&'a str),
    /// Leading `-`: hand the remainder to the handler of the current value.
    Dispatch(&'a str),
    /// Leading `(`: independent sub-expressions applied to the same value.
    Group(Vec<&'a str>),
    /// `name` followed by a delimiter: navigate into `name`, then resolve `rest`.
    Navigate {
        /// Member to navigate into
        name: &'a str,
        /// Remainder, starting at the delimiter
        rest: &'a str,
    },
    /// A bare name with no delimiter at all.
    Literal(&'a str),
}

impl Step<'_> {
    /// Returns `true` for a bare name, i.e. a final literal match rather than
    /// something a handler has to interpret.
    pub fn is_literal(&self) -> bool {
        matches!(self, Step::Literal(_))
    }
}

/// Scan the next step of `path`.
///
/// Fails only when a leading group has unbalanced parentheses.
pub fn next_step(path: &str) -> Result<Step<'_>> {
    let path = path.trim();
    match path.as_bytes().first() {
        None => Ok(Step::Empty),
        Some(b'.') => Ok(Step::Skip(&path[1..])),
        Some(b'-') => Ok(Step::Dispatch(path[1..].trim())),
        Some(b'(') => Ok(Step::Group(split(path)?)),
        Some(_) => match path.find(DELIMITERS) {
            None => Ok(Step::Literal(path)),
            Some(index) => Ok(Step::Navigate {
                name: path[..index].trim(),
                rest: &path[index..],
            }),
        },
    }
}

/// Describe how a path will be interpreted, one line per step.
///
/// Nested lines are indented by two spaces per level.
pub fn explain(path: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    explain_into(path, 0, false, &mut lines)?;
    Ok(lines)
}

fn explain_into(path: &str, depth: usize, nested: bool, lines: &mut Vec<String>) -> Result<()> {
    let indent = "  ".repeat(depth);
    let mut path = path;
    let mut nested = nested;

    loop {
        match next_step(path)? {
            Step::Empty => return Ok(()),
            Step::Skip(rest) => path = rest,
            Step::Literal(name) if nested => {
                lines.push(format!("{indent}navigate `{name}`"));
                return Ok(());
            }
            Step::Literal(name) => {
                lines.push(format!("{indent}relation `{name}`"));
                return Ok(());
            }
            Step::Dispatch(rest) => {
                if let Step::Literal(name) = next_step(rest)? {
                    lines.push(format!("{indent}relation `{name}`"));
                    return Ok(());
                }
                lines.push(format!("{indent}handler of current type:"));
                return explain_into(rest, depth + 1, false, lines);
            }
            Step::Group(parts) => match parts.as_slice() {
                [] => return Ok(()),
                [single] => path = *single,
                _ => {
                    lines.push(format!("{indent}group of {}:", parts.len()));
                    for part in parts.iter() {
                        explain_into(part, depth + 1, nested, lines)?;
                    }
                    return Ok(());
                }
            },
            Step::Navigate { name, rest } => {
                if !name.is_empty() {
                    lines.push(format!("{indent}navigate `{name}`"));
                    nested = true;
                }
                path = rest;
            }
        }
    }
}

/// Render independent sub-expressions as one grouped expression.
///
/// ```
/// use setin_core::expression::group;
///
/// assert_eq!(group(["Tags", "Author-Avatar"]), "(Tags)(Author-Avatar)");
/// ```
pub fn group<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .map(|part| format!("({})", part.as_ref().trim()))
        .collect()
}

/// Render a path that navigates `names` in order and then dispatches
/// `relation` on the innermost value.
///
/// ```
/// use setin_core::expression::subdata_expression;
///
/// assert_eq!(subdata_expression(["a", "b", "c"], "D"), "a.b.c-D");
/// ```
pub fn subdata_expression<I, S>(names: I, relation: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let chain: Vec<String> = names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .collect();
    format!("{}-{}", chain.join("."), relation.trim())
}
