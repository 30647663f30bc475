//! Error types for the front-end.
//!
//! Parse and semantic errors are separate taxonomies, both wrapped in a
//! positioned [`errors::Error`]. Neither kind aborts its phase: errors are
//! accumulated and reported together. Internal invariant violations are
//! panics, never values of these types.

pub mod errors;

#[cfg(test)]
mod tests;
