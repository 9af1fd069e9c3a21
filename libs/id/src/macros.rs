//! Macro for defining typed GUID types.

/// Defines a typed GUID with a fixed prefix.
///
/// Generates a newtype wrapper around ULID with:
/// - A `PREFIX` constant
/// - `new()` to mint a fresh GUID (tests and fixtures only; production
///   GUIDs come from the desired-state authority)
/// - `parse()` with strict prefix checking
/// - `Display`, `FromStr`, `Serialize`, and `Deserialize` implementations
/// - `Ord`, `Hash`, and the other standard derives
///
/// # Example
///
/// ```ignore
/// define_guid!(AppGuid, "app");
///
/// let guid = AppGuid::new();
/// let parsed: AppGuid = "app_01HV4Z2WQXKJNM8GPQY6VBKC3D".parse()?;
/// ```
#[macro_export]
macro_rules! define_guid {
    ($name:ident, $prefix:literal) => {
        /// A typed GUID for this resource kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::Ulid);

        impl $name {
            /// The prefix for this GUID type.
            pub const PREFIX: &'static str = $prefix;

            /// Mints a GUID with a fresh ULID.
            #[must_use]
            pub fn new() -> Self {
                Self($crate::Ulid::new())
            }

            /// Wraps a raw ULID.
            #[must_use]
            pub const fn from_ulid(ulid: $crate::Ulid) -> Self {
                Self(ulid)
            }

            /// Parses a GUID from its `{prefix}_{ulid}` form.
            pub fn parse(s: &str) -> Result<Self, $crate::GuidError> {
                if s.is_empty() {
                    return Err($crate::GuidError::Empty);
                }

                let Some((prefix, ulid_str)) = s.split_once('_') else {
                    return Err($crate::GuidError::MissingSeparator);
                };

                if prefix != Self::PREFIX {
                    return Err($crate::GuidError::InvalidPrefix {
                        expected: Self::PREFIX,
                        actual: prefix.to_string(),
                    });
                }

                let ulid = ulid_str
                    .parse::<$crate::Ulid>()
                    .map_err(|e| $crate::GuidError::InvalidUlid(e.to_string()))?;

                Ok(Self(ulid))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::GuidError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
