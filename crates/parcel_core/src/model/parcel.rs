//! Parcel domain model.
//!
//! # Responsibility
//! - Define the shipping record persisted by the parcel store.
//! - Own the status vocabulary and its wire names.
//!
//! # Invariants
//! - `number` is assigned by storage and never reused for another parcel.
//! - `client` and `created_at` never change after creation.
//! - `address` is editable only while `status == ParcelStatus::Registered`.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Storage-assigned parcel number.
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel.
pub type ClientId = i64;

/// Delivery lifecycle state of a parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted but not shipped. Address edits and deletion are allowed.
    Registered,
    /// Handed over to the carrier.
    Sent,
    /// Received by the client.
    Delivered,
}

impl ParcelStatus {
    /// Returns the stable name stored in `parcel.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
        }
    }

    /// Returns the status that follows this one, or `None` for the final state.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Registered => Some(Self::Sent),
            Self::Sent => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl Display for ParcelStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status name is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelStatusParseError(pub String);

impl Display for ParcelStatusParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown parcel status `{}`; expected registered|sent|delivered",
            self.0
        )
    }
}

impl Error for ParcelStatusParseError {}

impl FromStr for ParcelStatus {
    type Err = ParcelStatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "registered" => Ok(Self::Registered),
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            other => Err(ParcelStatusParseError(other.to_string())),
        }
    }
}

/// Shipping record tracked by the parcel store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// `0` until the parcel has been stored.
    pub number: ParcelNumber,
    pub client: ClientId,
    pub status: ParcelStatus,
    pub address: String,
    /// RFC 3339 timestamp in UTC.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved parcel in the `registered` state.
    pub fn new(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            number: 0,
            client,
            status: ParcelStatus::Registered,
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Creates an unsaved `registered` parcel stamped with the current UTC time.
    pub fn registered_now(client: ClientId, address: impl Into<String>) -> Self {
        Self::new(client, address, now_rfc3339())
    }

    /// Whether address edits and deletion are still permitted.
    pub fn is_editable(&self) -> bool {
        self.status == ParcelStatus::Registered
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::{Parcel, ParcelStatus};
    use chrono::DateTime;

    #[test]
    fn status_names_roundtrip_through_from_str() {
        for status in [
            ParcelStatus::Registered,
            ParcelStatus::Sent,
            ParcelStatus::Delivered,
        ] {
            assert_eq!(status.as_str().parse::<ParcelStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_name_is_rejected() {
        let err = "lost".parse::<ParcelStatus>().unwrap_err();
        assert!(err.to_string().contains("lost"));
    }

    #[test]
    fn next_advances_until_delivered() {
        assert_eq!(ParcelStatus::Registered.next(), Some(ParcelStatus::Sent));
        assert_eq!(ParcelStatus::Sent.next(), Some(ParcelStatus::Delivered));
        assert_eq!(ParcelStatus::Delivered.next(), None);
    }

    #[test]
    fn registered_now_stamps_parseable_utc_time() {
        let parcel = Parcel::registered_now(1000, "test");
        assert_eq!(parcel.number, 0);
        assert!(parcel.is_editable());
        assert!(parcel.created_at.ends_with('Z'));
        DateTime::parse_from_rfc3339(&parcel.created_at).unwrap();
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&ParcelStatus::Registered).unwrap();
        assert_eq!(json, "\"registered\"");
    }
}
