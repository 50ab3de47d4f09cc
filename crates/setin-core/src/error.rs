//! Error types for Setin.
//!
//! Errors fall into four families:
//!
//! - **parse**: a path expression with unbalanced parentheses
//! - **unknown relation**: no tester or registered handler matches a name
//! - **bad type**: navigation found no such member, or a value of the wrong shape
//! - **fetch**: errors raised by caller-supplied fetchers, passed through untouched

/// Boxed error returned by fetchers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while expanding sub-resources.
///
/// All error variants are marked with `#[non_exhaustive]` to allow
/// adding new error types without breaking changes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Path expression with unbalanced parentheses
    #[error("Malformed path expression `{expression}`: {reason}")]
    MalformedExpression {
        /// The offending (remaining) expression
        expression: String,
        /// What is unbalanced
        reason: &'static str,
    },

    /// A literal relation name matched no tester
    #[error("Unknown relation: {name}{}", owner_suffix(.owner))]
    UnknownRelation {
        /// Relation name as written in the path
        name: String,
        /// Interpreter that raised the error, if known
        owner: Option<String>,
    },

    /// No handler registered for the type a path dispatched on
    #[error("No handler registered for {type_name} (path `{path}`)")]
    UnregisteredType {
        /// Essential type name of the value
        type_name: &'static str,
        /// Residual path that needed the handler
        path: String,
    },

    /// Navigation step named a member that does not exist
    #[error("Not found: {type_name}.{name}")]
    NotFound {
        /// Type that was searched
        type_name: &'static str,
        /// Member name
        name: String,
    },

    /// Value has the wrong shape for the operation
    #[error("Bad type: expected {expected}, given {given}")]
    BadType {
        /// Expected type description
        expected: String,
        /// Actual type description
        given: String,
    },

    /// Error returned by a fetcher, unchanged
    #[error(transparent)]
    Fetch(BoxError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Several paths failed (collecting error handling)
    #[error("{} paths failed; first: {}", .errors.len(), first_message(.errors))]
    Aggregate {
        /// Errors in path order
        errors: Vec<Error>,
    },
}

/// Convenience `Result` type alias for Setin operations.
pub type Result<T> = std::result::Result<T, Error>;

fn owner_suffix(owner: &Option<String>) -> String {
    match owner {
        Some(owner) => format!(" (in {owner})"),
        None => String::new(),
    }
}

fn first_message(errors: &[Error]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

impl Error {
    /// Creates a malformed-expression error.
    pub fn malformed<S: Into<String>>(expression: S, reason: &'static str) -> Self {
        Error::MalformedExpression {
            expression: expression.into(),
            reason,
        }
    }

    /// Creates an unknown-relation error without an owner.
    pub fn unknown_relation<S: Into<String>>(name: S) -> Self {
        Error::UnknownRelation {
            name: name.into(),
            owner: None,
        }
    }

    /// Creates an unknown-relation error raised by a named interpreter.
    pub fn unknown_relation_in<S, O>(name: S, owner: O) -> Self
    where
        S: Into<String>,
        O: Into<String>,
    {
        Error::UnknownRelation {
            name: name.into(),
            owner: Some(owner.into()),
        }
    }

    /// Creates an error for a dispatch on a type with no registered handler.
    pub fn unregistered<S: Into<String>>(type_name: &'static str, path: S) -> Self {
        Error::UnregisteredType {
            type_name,
            path: path.into(),
        }
    }

    /// Creates a not-found error for a member lookup.
    pub fn not_found<S: Into<String>>(type_name: &'static str, name: S) -> Self {
        Error::NotFound {
            type_name,
            name: name.into(),
        }
    }

    /// Creates a bad-type error.
    pub fn bad_type<E, G>(expected: E, given: G) -> Self
    where
        E: Into<String>,
        G: Into<String>,
    {
        Error::BadType {
            expected: expected.into(),
            given: given.into(),
        }
    }

    /// Wraps a fetcher error.
    pub fn fetch<E: Into<BoxError>>(source: E) -> Self {
        Error::Fetch(source.into())
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Folds collected errors: none is success, one is returned as is.
    pub fn aggregate(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Aggregate { errors }),
        }
    }

    /// Returns whether this is a path expression parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::MalformedExpression { .. })
    }

    /// Returns whether no tester or handler matched.
    pub fn is_unknown_relation(&self) -> bool {
        matches!(
            self,
            Error::UnknownRelation { .. } | Error::UnregisteredType { .. }
        )
    }

    /// Returns whether navigation or a shape check failed.
    pub fn is_bad_type(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::BadType { .. })
    }

    /// Returns whether the error came from a fetcher.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }
}
