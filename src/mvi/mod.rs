//! Model-View-Intent primitives shared by the stateful parts of the crate.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ View
//!    ↑                              │
//!    └──────────────────────────────┘
//! ```
//!
//! Reducers are pure: every side effect (spawning, killing, writing to a
//! process) happens in the caller around the dispatch.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::State;

/// Run a reducer over a state field in place.
///
/// The field type must implement `Default`, which is left behind while the
/// reducer owns the old value.
#[macro_export]
macro_rules! dispatch_mvi {
    ($target:expr, $reducer:ty, $intent:expr) => {
        $target = <$reducer as $crate::mvi::Reducer>::reduce(std::mem::take(&mut $target), $intent)
    };
}
