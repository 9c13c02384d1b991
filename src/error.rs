//! Error types for the cachemux library.
//!
//! The public cache operations are infallible by design: an absent key is a
//! normal `None` return and invalid construction parameters degrade to an
//! inert cache rather than failing. The only error type in the crate backs
//! the debug-only `check_invariants` methods on cache cores and data
//! structures.
//!
//! ## Example Usage
//!
//! ```
//! use cachemux::policy::lru::LruCore;
//!
//! let mut cache: LruCore<u32, &str> = LruCore::new(4);
//! cache.insert(1, "one");
//! cache.check_invariants().expect("lru invariants hold");
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by the `check_invariants` methods available in test and debug
/// builds (e.g. [`LruCore::check_invariants`](crate::policy::lru::LruCore::check_invariants)).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
