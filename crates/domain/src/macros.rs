//! Macro for implementing string conversions on persisted enums
//!
//! Session enums travel as plain strings (in storage, on the wire and on the
//! command line). This macro generates `as_str`, `Display` and `FromStr` from
//! a single variant-to-string table.
//!
//! # Example
//!
//! ```rust
//! use flowlab_domain::impl_wire_value_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Grant {
//!     Code,
//!     Refresh,
//! }
//!
//! impl_wire_value_conversions!(Grant {
//!     Code => "authorization_code",
//!     Refresh => "refresh_token",
//! });
//!
//! assert_eq!(Grant::Code.as_str(), "authorization_code");
//! assert_eq!("REFRESH_TOKEN".parse::<Grant>().unwrap(), Grant::Refresh);
//! ```

/// Implements `as_str`, `Display` and `FromStr` for wire-value enums
///
/// # Features
///
/// - Case-insensitive parsing (`"S256"` and `"s256"` both work)
/// - Output is always the exact string from the table
/// - Parse failures are `FlowError::InvalidInput` naming the enum
#[macro_export]
macro_rules! impl_wire_value_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form
            #[must_use]
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
            type Err = $crate::errors::FlowError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::errors::FlowError::InvalidInput(format!(
                    "Invalid {}: {}",
                    stringify!($enum_name),
                    s
                )))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::errors::FlowError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestMethod {
        Basic,
        Post,
    }

    impl_wire_value_conversions!(TestMethod {
        Basic => "client_secret_basic",
        Post => "client_secret_post",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestMethod::Basic.to_string(), "client_secret_basic");
        assert_eq!(TestMethod::Post.as_str(), "client_secret_post");
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(TestMethod::from_str("Client_Secret_Post").unwrap(), TestMethod::Post);
    }

    #[test]
    fn test_fromstr_invalid() {
        let err = TestMethod::from_str("private_key_jwt").unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(ref msg) if msg.contains("TestMethod")));
        assert!(TestMethod::from_str("").is_err());
    }
}
