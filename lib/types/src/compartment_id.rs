use std::fmt::Display;
use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
};

/// Unique ID to identify a compartment.
///
/// Every handle to an object owned by a compartment also contains the ID of
/// the compartment. This is used to check that a handle is always used with
/// the compartment that created it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CompartmentId(NonZeroUsize);

impl Default for CompartmentId {
    // Allocates a unique ID for a new compartment.
    fn default() -> Self {
        // No overflow checking is needed here: overflowing this would take
        // thousands of years.
        static NEXT_ID: AtomicUsize = AtomicUsize::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroUsize::new(id).unwrap_or(NonZeroUsize::MIN))
    }
}

impl Display for CompartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
