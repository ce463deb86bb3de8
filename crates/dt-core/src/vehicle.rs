//! Vehicle platform types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// A vehicle platform a driver can hold currency on.
///
/// This enum encodes the platforms the unit operates, preventing invalid
/// string values. Currency is tracked independently per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    /// Terrex infantry carrier vehicle.
    Terrex,
    /// Belrex protected combat support vehicle.
    Belrex,
}

impl VehicleType {
    /// All known platforms, in display order.
    pub const ALL: [Self; 2] = [Self::Terrex, Self::Belrex];

    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Terrex => "terrex",
            Self::Belrex => "belrex",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for VehicleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terrex" => Ok(Self::Terrex),
            "belrex" => Ok(Self::Belrex),
            _ => Err(ValidationError::InvalidVehicleType {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_type_from_str() {
        assert_eq!("terrex".parse::<VehicleType>().unwrap(), VehicleType::Terrex);
        assert_eq!("belrex".parse::<VehicleType>().unwrap(), VehicleType::Belrex);
        assert!("ltav".parse::<VehicleType>().is_err());
        assert!("Terrex".parse::<VehicleType>().is_err());
    }

    #[test]
    fn vehicle_type_as_str() {
        assert_eq!(VehicleType::Terrex.as_str(), "terrex");
        assert_eq!(VehicleType::Belrex.as_str(), "belrex");
    }

    #[test]
    fn vehicle_type_serde_roundtrip() {
        let json = serde_json::to_string(&VehicleType::Terrex).unwrap();
        assert_eq!(json, "\"terrex\"");
        let parsed: VehicleType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, VehicleType::Terrex);
    }
}
