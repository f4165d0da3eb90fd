use std::fmt;

use crate::error::{Error, Result};

/// The four configuration values a purge needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ApiKey,
    Email,
    Site,
    Zone,
}

impl Field {
    /// Key used in the config file and environment
    pub fn key(self) -> &'static str {
        match self {
            Field::ApiKey => "CLOUDFLARE_API_KEY",
            Field::Email => "CLOUDFLARE_EMAIL",
            Field::Site => "CLOUDFLARE_SITE",
            Field::Zone => "CLOUDFLARE_ZONE",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Field::ApiKey => "-k",
            Field::Email => "-e",
            Field::Site => "-s",
            Field::Zone => "-z",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Field::ApiKey => "Cloudflare API key",
            Field::Email => "Cloudflare account email",
            Field::Site => "site name",
            Field::Zone => "zone identifier",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        [Field::ApiKey, Field::Email, Field::Site, Field::Zone]
            .into_iter()
            .find(|f| f.key() == key)
    }
}

/// Partial configuration contributed by a single source
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub site: Option<String>,
    pub zone: Option<String>,
}

impl ConfigLayer {
    /// Set a field, treating blank values as unset
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let slot = match field {
            Field::ApiKey => &mut self.api_key,
            Field::Email => &mut self.email,
            Field::Site => &mut self.site,
            Field::Zone => &mut self.zone,
        };
        *slot = Some(value.to_string());
    }

    /// Apply `higher` on top of `self`; any field `higher` sets wins.
    pub fn overlay(self, higher: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            api_key: non_empty(higher.api_key).or(self.api_key),
            email: non_empty(higher.email).or(self.email),
            site: non_empty(higher.site).or(self.site),
            zone: non_empty(higher.zone).or(self.zone),
        }
    }

    pub fn into_configuration(self) -> Configuration {
        Configuration {
            api_key: non_empty(self.api_key),
            email: non_empty(self.email),
            site: non_empty(self.site),
            zone: non_empty(self.zone),
        }
    }
}

impl fmt::Debug for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLayer")
            .field("api_key", &self.api_key.as_deref().map(mask))
            .field("email", &self.email)
            .field("site", &self.site)
            .field("zone", &self.zone)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fully resolved configuration for one invocation.
///
/// Values are fixed once resolution finishes. Steps that fill in a missing
/// value (`with_site`, `with_zone`) return a new configuration.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    api_key: Option<String>,
    email: Option<String>,
    site: Option<String>,
    zone: Option<String>,
}

impl Configuration {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn site(&self) -> Option<&str> {
        self.site.as_deref()
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    pub fn with_site(self, site: impl Into<String>) -> Self {
        Self {
            site: non_empty(Some(site.into())),
            ..self
        }
    }

    pub fn with_zone(self, zone: impl Into<String>) -> Self {
        Self {
            zone: non_empty(Some(zone.into())),
            ..self
        }
    }

    pub fn require_email(&self) -> Result<&str> {
        self.email().ok_or(Error::MissingField(Field::Email))
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key().ok_or(Error::MissingField(Field::ApiKey))
    }

    pub fn require_zone(&self) -> Result<&str> {
        self.zone().ok_or(Error::MissingField(Field::Zone))
    }

    /// Email and API key together, as sent with every API request
    pub fn credentials(&self) -> Result<Credentials<'_>> {
        let email = self.require_email()?;
        let api_key = self.require_api_key()?;
        Ok(Credentials { email, api_key })
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("api_key", &self.api_key.as_deref().map(mask))
            .field("email", &self.email)
            .field("site", &self.site)
            .field("zone", &self.zone)
            .finish()
    }
}

/// Authentication pair for the Cloudflare API
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub api_key: &'a str,
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_key", &mask(self.api_key))
            .finish()
    }
}

/// Keep the first four characters of a secret
pub fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}
