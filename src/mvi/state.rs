//! Base trait for reducer-managed state.

/// Marker trait for state objects.
///
/// States are small value types: cloneable for snapshots, comparable so
/// observers can detect transitions, and defaulted to their initial phase.
pub trait State: Clone + PartialEq + Default + Send + 'static {}
