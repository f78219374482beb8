//! Parcel use-case service.
//!
//! # Responsibility
//! - Provide the tracker use cases (register, advance, re-address, remove).
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass the repository status guards.
//! - Log lines carry identifiers and statuses only, never addresses.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, RepoResult};
use log::{debug, info};

/// Use-case service wrapper for parcel tracking.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client`, stamped with the current time.
    ///
    /// Returns the stored parcel with its assigned number.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> RepoResult<Parcel> {
        let mut parcel = Parcel::registered_now(client, address);
        parcel.number = self.repo.add(&parcel)?;
        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            parcel.number, parcel.client
        );
        Ok(parcel)
    }

    /// Gets one parcel; missing parcels yield `RepoError::NotFound`.
    pub fn parcel(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        self.repo.get(number)
    }

    pub fn client_parcels(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let parcels = self.repo.get_by_client(client)?;
        debug!(
            "event=parcel_list module=service status=ok client={} count={}",
            client,
            parcels.len()
        );
        Ok(parcels)
    }

    /// Moves a parcel one step along `registered -> sent -> delivered`.
    ///
    /// # Contract
    /// - Returns the new status.
    /// - Returns `None` without writing when the parcel is already delivered.
    pub fn next_status(&self, number: ParcelNumber) -> RepoResult<Option<ParcelStatus>> {
        let parcel = self.repo.get(number)?;
        let Some(next) = parcel.status.next() else {
            debug!(
                "event=parcel_next_status module=service status=skipped number={} reason=final_status",
                number
            );
            return Ok(None);
        };

        self.repo.set_status(number, next)?;
        info!(
            "event=parcel_next_status module=service status=ok number={} from={} to={}",
            number, parcel.status, next
        );
        Ok(Some(next))
    }

    /// Overrides the status unconditionally.
    ///
    /// Returns whether a row changed; `false` means the parcel is missing.
    pub fn set_status(&self, number: ParcelNumber, status: ParcelStatus) -> RepoResult<bool> {
        let changed = self.repo.set_status(number, status)? > 0;
        info!(
            "event=parcel_set_status module=service status=ok number={} to={} changed={}",
            number, status, changed
        );
        Ok(changed)
    }

    /// Changes the delivery address while the parcel is still registered.
    ///
    /// Returns whether a row changed; `false` means the parcel is missing or
    /// has already been sent.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> RepoResult<bool> {
        let changed = self.repo.set_address(number, address)? > 0;
        info!(
            "event=parcel_change_address module=service status=ok number={} changed={}",
            number, changed
        );
        Ok(changed)
    }

    /// Deletes a parcel while it is still registered.
    ///
    /// Returns whether a row was removed.
    pub fn remove(&self, number: ParcelNumber) -> RepoResult<bool> {
        let removed = self.repo.delete(number)? > 0;
        info!(
            "event=parcel_remove module=service status=ok number={} removed={}",
            number, removed
        );
        Ok(removed)
    }
}
