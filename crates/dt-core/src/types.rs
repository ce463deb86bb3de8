//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A physical quantity was negative or not a finite number.
    #[error("{field} must be a non-negative finite number, got {value}")]
    QuantityOutOfRange { field: &'static str, value: f64 },

    /// Invalid vehicle type value.
    #[error("invalid vehicle type: {value}")]
    InvalidVehicleType { value: String },

    /// Invalid roster role value.
    #[error("invalid role: {value}")]
    InvalidRole { value: String },

    /// The final odometer reading did not advance past the initial one.
    #[error("final odometer ({final_km} km) must be greater than initial ({initial_km} km)")]
    OdometerNotIncreasing { initial_km: f64, final_km: f64 },

    /// The derived trip distance is too large to be a real drive.
    #[error("trip distance {distance_km} km exceeds the plausible single-trip maximum")]
    ImplausibleDistance { distance_km: f64 },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated user identifier.
    ///
    /// User IDs must be non-empty strings. They identify personnel across the
    /// drive log, workout log, and roster.
    UserId, "user ID"
);

define_string_id!(
    /// A validated vehicle identifier (the MID number painted on the hull).
    ///
    /// Vehicle IDs must be non-empty strings. They identify the individual
    /// vehicle driven, not its platform type.
    VehicleId, "vehicle ID"
);

/// Generates a validated non-negative quantity newtype backed by `f64`.
///
/// Values must be finite and non-negative. Deserialization clamps negative
/// values to zero to be lenient with external data.
macro_rules! define_quantity {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
        pub struct $name(f64);

        impl $name {
            /// The zero quantity.
            pub const ZERO: Self = Self(0.0);

            /// Creates a new quantity after validation.
            ///
            /// Returns an error if the value is negative, NaN, or infinite.
            pub fn new(value: f64) -> Result<Self, ValidationError> {
                if !value.is_finite() || value < 0.0 {
                    return Err(ValidationError::QuantityOutOfRange {
                        field: $field_name,
                        value,
                    });
                }
                Ok(Self(value))
            }

            /// Creates a quantity, clamping negatives and NaN to zero.
            #[must_use]
            pub const fn clamped(value: f64) -> Self {
                if value.is_nan() || value < 0.0 {
                    Self(0.0)
                } else {
                    Self(value)
                }
            }

            /// Returns the inner f64 value.
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.1}", self.0)
            }
        }

        impl TryFrom<f64> for $name {
            type Error = ValidationError;

            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(quantity: $name) -> Self {
                quantity.0
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.0.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = f64::deserialize(deserializer)?;
                // Clamp on deserialization to be lenient with external data
                Ok(Self::clamped(value))
            }
        }
    };
}

define_quantity!(
    /// A distance in kilometers.
    ///
    /// Used for trip distances and rolling-window totals.
    Kilometers, "kilometers"
);

define_quantity!(
    /// A weight in kilograms.
    ///
    /// Used for strength workout entries.
    Kilograms, "kilograms"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_rejects_empty() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("alice").is_ok());
    }

    #[test]
    fn vehicle_id_rejects_empty() {
        assert!(VehicleId::new("").is_err());
        assert!(VehicleId::new("MID-1234").is_ok());
    }

    #[test]
    fn user_id_serde_roundtrip() {
        let id = UserId::new("alice").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice\"");
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn user_id_serde_rejects_empty() {
        let result: Result<UserId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn kilometers_validates_range() {
        assert!(Kilometers::new(0.0).is_ok());
        assert!(Kilometers::new(12.5).is_ok());
        assert!(Kilometers::new(-0.1).is_err());
        assert!(Kilometers::new(f64::NAN).is_err());
        assert!(Kilometers::new(f64::INFINITY).is_err());
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for boundary tests"
    )]
    fn kilometers_clamped_handles_edge_cases() {
        assert_eq!(Kilometers::clamped(-5.0).value(), 0.0);
        assert_eq!(Kilometers::clamped(f64::NAN).value(), 0.0);
        assert_eq!(Kilometers::clamped(3.2).value(), 3.2);
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "exact equality intended for boundary tests"
    )]
    fn kilometers_serde_clamps_negative() {
        let parsed: Kilometers = serde_json::from_str("-2.5").unwrap();
        assert_eq!(parsed.value(), 0.0);

        let parsed: Kilometers = serde_json::from_str("2.5").unwrap();
        assert_eq!(parsed.value(), 2.5);
    }

    #[test]
    fn kilograms_validates_range() {
        assert!(Kilograms::new(60.0).is_ok());
        assert!(Kilograms::new(0.0).is_ok());
        assert!(Kilograms::new(-1.0).is_err());
    }

    #[test]
    fn user_id_as_ref() {
        let id = UserId::new("bob").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "bob");
    }

    #[test]
    fn vehicle_id_display() {
        let id = VehicleId::new("MID-42").unwrap();
        assert_eq!(id.to_string(), "MID-42");
    }
}
