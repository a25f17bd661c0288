//! IP-based geolocation via ipinfo.io

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use super::{Location, Locator};

const IPINFO_URL: &str = "https://ipinfo.io/json";

/// Errors that can occur during a lookup
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("request to ipinfo.io failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Locator backed by the ipinfo.io JSON endpoint
pub struct IpInfoLocator {
    client: Client,
}

impl IpInfoLocator {
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
        Ok(Self { client })
    }

    async fn fetch(&self) -> Result<IpInfo, LocateError> {
        let info = self
            .client
            .get(IPINFO_URL)
            .send()
            .await?
            .error_for_status()?
            .json::<IpInfo>()
            .await?;
        Ok(info)
    }
}

#[async_trait]
impl Locator for IpInfoLocator {
    async fn locate(&self) -> Location {
        match self.fetch().await {
            Ok(info) => {
                let location = info.into_location();
                info!(
                    location = %location.label,
                    timezone = %location.timezone,
                    "retrieved IP-based location"
                );
                location
            }
            Err(e) => {
                warn!(error = %e, "could not determine location");
                Location::unknown()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpInfo {
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
    timezone: Option<String>,
}

impl IpInfo {
    fn into_location(self) -> Location {
        let label = format!(
            "{}, {}, {}",
            self.city.as_deref().unwrap_or("Unknown City"),
            self.region.as_deref().unwrap_or("Unknown Region"),
            self.country.as_deref().unwrap_or("Unknown Country"),
        );
        Location {
            label,
            timezone: self.timezone.unwrap_or_else(|| "UTC".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let info: IpInfo = serde_json::from_str(
            r#"{"ip":"1.2.3.4","city":"Boston","region":"Massachusetts","country":"US","timezone":"America/New_York"}"#,
        )
        .unwrap();
        assert_eq!(
            info.into_location(),
            Location {
                label: "Boston, Massachusetts, US".to_string(),
                timezone: "America/New_York".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let info: IpInfo = serde_json::from_str(r#"{"country":"FR"}"#).unwrap();
        let location = info.into_location();
        assert_eq!(location.label, "Unknown City, Unknown Region, FR");
        assert_eq!(location.timezone, "UTC");
    }
}
