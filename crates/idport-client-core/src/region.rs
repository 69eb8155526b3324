//! Region wizard: offer a country change when the network-derived location
//! disagrees with the stored profile country.
//!
//! The change action is gated on a finished lookup that returned a country
//! different from the profile's; the local profile is patched only after the
//! remote update resolved successfully.

use async_trait::async_trait;

use crate::profile::ProfileField;
use crate::session::{AccountSession, ProfileTransport};

/// Seam for the third-party IP-geolocation service. Unauthenticated; only
/// the country code is consumed.
#[async_trait]
pub trait LocationLookup {
    type Error: std::fmt::Display + Send;

    async fn current_country(&self) -> Result<Option<String>, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryLookup {
    Pending,
    Failed,
    Resolved(String),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionWizard {
    lookup: CountryLookup,
}

impl Default for RegionWizard {
    fn default() -> Self {
        Self {
            lookup: CountryLookup::Pending,
        }
    }
}

impl RegionWizard {
    /// Run the IP lookup once. A transport failure is remembered; the wizard
    /// simply stays disabled.
    pub async fn resolve<L: LocationLookup>(&mut self, lookup: &L) {
        self.lookup = match lookup.current_country().await {
            Ok(Some(country)) => CountryLookup::Resolved(country),
            Ok(None) => CountryLookup::Unknown,
            Err(error) => {
                tracing::warn!(%error, "ip location lookup failed");
                CountryLookup::Failed
            }
        };
    }

    #[must_use]
    pub fn lookup(&self) -> &CountryLookup {
        &self.lookup
    }

    #[must_use]
    pub fn looked_up_country(&self) -> Option<&str> {
        match &self.lookup {
            CountryLookup::Resolved(country) => Some(country),
            _ => None,
        }
    }

    /// Whether the change-country action is enabled: lookup finished with a
    /// country that differs from the stored one.
    #[must_use]
    pub fn can_change(&self, profile_country: Option<&str>) -> bool {
        match &self.lookup {
            CountryLookup::Resolved(country) => profile_country != Some(country.as_str()),
            _ => false,
        }
    }

    /// Confirm the change: remote update first, local patch only on success.
    /// Returns the server acknowledgement message.
    pub async fn confirm<A: ProfileTransport>(
        &self,
        session: &mut AccountSession,
        api: &A,
    ) -> Result<Option<String>, A::Error> {
        let Some(country) = self.looked_up_country().map(str::to_string) else {
            return Ok(None);
        };
        if !self.can_change(session.profile.country.as_deref()) {
            return Ok(None);
        }

        let message = api.update_country(session.token()).await?;
        session.profile.apply(ProfileField::Country, &country);
        Ok(Some(message))
    }
}
