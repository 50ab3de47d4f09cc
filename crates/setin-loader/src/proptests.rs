//! Property-based tests for the loading algorithm.
