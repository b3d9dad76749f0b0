//! Infrastructure layer: persistence, ownership resolution and the
//! application lifecycle built on top of the domain crates.

pub mod lifecycle;
pub mod ownership;
pub mod postings;
pub mod store;
pub mod workers;

pub use lifecycle::{
    ApplicationLifecycle, ApplicationWithPosting, EmployerApplicationView, LifecycleError, ReconcileReport,
};
pub use ownership::{OwnedApplication, OwnershipError, OwnershipResolver};
pub use postings::PostingService;
pub use store::{
    CounterDrift, CounterUpdate, InMemoryPlacementStore, PlacementStore, PostgresPlacementStore, PostingFilter,
    RemovedApplication, StoreError,
};
pub use workers::{CounterReconciler, ReconcilerHandle};
