//! Location and local time collaborators
//!
//! Resolves an approximate location from the public IP once per run and
//! formats the current time in that location's timezone.

mod clock;
mod ipinfo;

pub use clock::now_formatted;
pub use ipinfo::IpInfoLocator;

use async_trait::async_trait;

/// A location label with its IANA timezone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub label: String,
    pub timezone: String,
}

impl Location {
    /// Sentinel used whenever lookup fails
    pub fn unknown() -> Self {
        Self {
            label: "Unknown Location".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

/// Geolocation lookup
#[async_trait]
pub trait Locator: Send + Sync {
    /// Resolve the current location, falling back to `Location::unknown()`
    async fn locate(&self) -> Location;
}
