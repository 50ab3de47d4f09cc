//! Property-based tests for path expressions.
