//! Domain model for parcel tracking.
//!
//! # Responsibility
//! - Define the records shared by storage, services and front ends.
//!
//! # Invariants
//! - Every stored parcel is identified by a storage-assigned `ParcelNumber`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod parcel;
