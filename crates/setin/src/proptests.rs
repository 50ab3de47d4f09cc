//! Property-based tests for the root-level interpreter.
