//! Depth limiting for recursive signature walks.

use std::ops::{Deref, DerefMut};

use crate::{Error::RecursionLimit, Result};

/// Bounded depth counter for one top-level resolution call.
///
/// Every level of descent calls [`RecursionGuard::enter`] and keeps the
/// returned [`DepthScope`] alive while it works on its children. Dropping the
/// scope leaves the level again, so the counter is restored on every exit
/// path, including early returns through `?`.
#[derive(Debug)]
pub struct RecursionGuard {
    depth: usize,
    max_depth: usize,
}

impl RecursionGuard {
    /// Creates a guard that allows `max_depth` nested levels
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        RecursionGuard {
            depth: 0,
            max_depth,
        }
    }

    /// Enters one more level of nesting.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the maximum depth is
    /// already reached. The depth is left untouched in that case.
    pub fn enter(&mut self) -> Result<DepthScope<'_>> {
        if self.depth >= self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }

        self.depth += 1;
        Ok(DepthScope { guard: self })
    }

    /// The number of currently entered levels
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The configured maximum depth
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// One entered level of a [`RecursionGuard`], left again on drop.
///
/// Dereferences to the guard, so nested levels are entered through the scope
/// of the enclosing one.
#[derive(Debug)]
pub struct DepthScope<'a> {
    guard: &'a mut RecursionGuard,
}

impl Deref for DepthScope<'_> {
    type Target = RecursionGuard;

    fn deref(&self) -> &Self::Target {
        self.guard
    }
}

impl DerefMut for DepthScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard
    }
}

impl Drop for DepthScope<'_> {
    fn drop(&mut self) {
        self.guard.depth -= 1;
    }
}
