//! Property-based tests for mirroring guarantees

mod convergence;
