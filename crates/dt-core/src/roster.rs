//! Roster entries and roles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{UserId, ValidationError};
use crate::vehicle::VehicleType;

/// What a person does in the unit.
///
/// This enum encodes the valid roles, replacing loose admin flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Line trooper.
    Trooper,
    /// Vehicle or section commander.
    Commander,
    /// Administrator with access to team-wide views.
    Admin,
}

impl Role {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trooper => "trooper",
            Self::Commander => "commander",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trooper" => Ok(Self::Trooper),
            "commander" => Ok(Self::Commander),
            "admin" => Ok(Self::Admin),
            _ => Err(ValidationError::InvalidRole {
                value: s.to_string(),
            }),
        }
    }
}

/// One person on the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Stable identifier used across the drive and workout logs.
    pub user: UserId,

    /// Name shown in reports.
    pub display_name: String,

    /// Rank string, free-form.
    pub rank: String,

    /// Platoon or section the person belongs to.
    pub unit: String,

    /// Role in the unit.
    pub role: Role,

    /// Platforms the person is qualified on. Currency is only evaluated
    /// for qualified combinations.
    pub qualifications: Vec<VehicleType>,
}

impl RosterEntry {
    /// Whether the person holds a qualification on the platform.
    #[must_use]
    pub fn is_qualified(&self, vehicle_type: VehicleType) -> bool {
        self.qualifications.contains(&vehicle_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(qualifications: Vec<VehicleType>) -> RosterEntry {
        RosterEntry {
            user: UserId::new("alice").unwrap(),
            display_name: "CPL Alice Tan".to_string(),
            rank: "CPL".to_string(),
            unit: "Platoon 1".to_string(),
            role: Role::Trooper,
            qualifications,
        }
    }

    #[test]
    fn role_from_str() {
        assert_eq!("trooper".parse::<Role>().unwrap(), Role::Trooper);
        assert_eq!("commander".parse::<Role>().unwrap(), Role::Commander);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("officer".parse::<Role>().is_err());
    }

    #[test]
    fn qualification_check() {
        let terrex_only = entry(vec![VehicleType::Terrex]);
        assert!(terrex_only.is_qualified(VehicleType::Terrex));
        assert!(!terrex_only.is_qualified(VehicleType::Belrex));

        let dual = entry(vec![VehicleType::Terrex, VehicleType::Belrex]);
        assert!(dual.is_qualified(VehicleType::Belrex));

        let none = entry(vec![]);
        assert!(!none.is_qualified(VehicleType::Terrex));
    }

    #[test]
    fn roster_entry_serde_roundtrip() {
        let original = entry(vec![VehicleType::Terrex]);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: RosterEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }
}
