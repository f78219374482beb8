//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the parcel data access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs distinguish `NotFound` from storage failures.
//! - No retries; every engine error reaches the caller.

pub mod parcel_repo;
