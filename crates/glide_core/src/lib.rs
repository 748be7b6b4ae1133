//! Glide Core Runtime
//!
//! Foundational primitives shared by the Glide crates:
//!
//! - **Atomic floats**: [`AtomicF32`] for values read every frame without locking
//! - **Shared scalars**: [`SharedScalar`] pairs a value with a change version so
//!   observers can detect writes without subscribing
//! - **Snapshots**: [`SnapshotCell`] publishes immutable `Arc<T>` snapshots so a
//!   reader never sees a half-written structure
//! - **Listeners**: [`Listeners`] fan-out for edge-triggered notifications
//!
//! # Example
//!
//! ```rust
//! use glide_core::{SharedScalar, SnapshotCell};
//!
//! let position = SharedScalar::new(0.0);
//! let seen = position.version();
//! position.set(120.0);
//! assert!(position.changed_since(seen));
//!
//! let table = SnapshotCell::new(vec![600.0_f32, 400.0, 80.0]);
//! let snapshot = table.load();
//! table.publish(vec![600.0, 300.0, 80.0]);
//! assert_eq!(snapshot[1], 400.0); // old readers keep their snapshot
//! assert_eq!(table.load()[1], 300.0);
//! ```

pub mod atomic;
pub mod listeners;
pub mod shared;

pub use atomic::AtomicF32;
pub use listeners::{ListenerId, Listeners};
pub use shared::{SharedScalar, SnapshotCell};

use std::sync::PoisonError;

/// Take the guard out of a poisoned lock
///
/// A panic in another holder leaves the protected data intact for these
/// types, so the value is still usable.
pub(crate) fn recover<G>(err: PoisonError<G>) -> G {
    tracing::warn!("recovering from a poisoned lock");
    err.into_inner()
}
