//! Macro for implementing Display and FromStr for status enums
//!
//! Status enums carry a canonical string form (upper-case for access
//! statuses). Parsing accepts any ASCII casing of that form.
//!
//! # Example
//!
//! ```rust
//! use metricspace_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Visibility {
//!     Shown,
//!     Hidden,
//! }
//!
//! impl_domain_status_conversions!(Visibility {
//!     Shown => "SHOWN",
//!     Hidden => "HIDDEN",
//! });
//!
//! assert_eq!(Visibility::Shown.as_str(), "SHOWN");
//! assert_eq!(Visibility::Shown.to_string(), "SHOWN");
//! assert_eq!("hidden".parse::<Visibility>(), Ok(Visibility::Hidden));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// This macro generates:
/// - `as_str`: the canonical string of each variant, the single table the
///   other impls read from
/// - Display trait: writes `as_str`
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
