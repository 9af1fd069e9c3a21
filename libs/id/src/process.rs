//! The composite process GUID.
//!
//! A process GUID identifies one concrete, deployable revision of a logical
//! process. It is derived from the owning application GUID plus a
//! process-version token and renders as `{app}-{version}`. The application
//! half is stable across revisions; the version half rotates on every
//! intentional restart or redeploy.

use crate::{AppGuid, GuidError, VersionGuid};

/// Identity of one revision of a logical process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessGuid {
    app: AppGuid,
    version: VersionGuid,
}

impl ProcessGuid {
    /// Derives a process GUID from its application and version halves.
    #[must_use]
    pub const fn from_parts(app: AppGuid, version: VersionGuid) -> Self {
        Self { app, version }
    }

    /// The stable application half.
    #[must_use]
    pub const fn app(&self) -> AppGuid {
        self.app
    }

    /// The per-revision version half.
    #[must_use]
    pub const fn version(&self) -> VersionGuid {
        self.version
    }

    /// Parses a process GUID from its `{app}-{version}` form.
    ///
    /// The application half never contains a `-`, so the first one is the
    /// composite separator.
    pub fn parse(s: &str) -> Result<Self, GuidError> {
        if s.is_empty() {
            return Err(GuidError::Empty);
        }

        let Some((app_str, version_str)) = s.split_once('-') else {
            return Err(GuidError::MissingVersionToken);
        };

        let app = AppGuid::parse(app_str)?;
        let version = VersionGuid::parse(version_str)?;

        Ok(Self { app, version })
    }
}

impl std::fmt::Display for ProcessGuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.app, self.version)
    }
}

impl std::str::FromStr for ProcessGuid {
    type Err = GuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for ProcessGuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ProcessGuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
