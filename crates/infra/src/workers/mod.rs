//! Background workers.

pub mod reconciler;

pub use reconciler::{CounterReconciler, ReconcilerHandle};
