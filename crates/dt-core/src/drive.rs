//! Drive log records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Kilometers, UserId, ValidationError, VehicleId};
use crate::vehicle::VehicleType;
use crate::window::Dated;

/// The longest single trip accepted at the capture boundary, in kilometers.
///
/// Anything above this is treated as a data-entry error (a mistyped odometer
/// reading), not a real drive.
pub const MAX_TRIP_KM: f64 = 1000.0;

/// One logged trip.
///
/// Records are immutable once constructed and the log is append-only; there
/// is no update or delete anywhere in the system. `DriveRecord::new` is the
/// validation boundary: the engine downstream trusts these invariants and
/// never re-checks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDriveRecord")]
pub struct DriveRecord {
    /// Who drove.
    pub user: UserId,

    /// The date of the drive. Date granularity only; the source data has no
    /// time-of-day.
    pub date: NaiveDate,

    /// Which platform was driven.
    pub vehicle_type: VehicleType,

    /// The individual vehicle (MID number).
    pub vehicle_id: VehicleId,

    /// Odometer reading at the start of the trip.
    pub initial_odometer_km: Kilometers,

    /// Odometer reading at the end of the trip.
    pub final_odometer_km: Kilometers,

    /// Trip distance, derived from the odometer readings.
    pub distance_km: Kilometers,
}

impl DriveRecord {
    /// Creates a validated drive record.
    ///
    /// The final odometer reading must be strictly greater than the initial
    /// one, and the derived distance must not exceed [`MAX_TRIP_KM`].
    pub fn new(
        user: UserId,
        date: NaiveDate,
        vehicle_type: VehicleType,
        vehicle_id: VehicleId,
        initial_odometer_km: Kilometers,
        final_odometer_km: Kilometers,
    ) -> Result<Self, ValidationError> {
        if final_odometer_km.value() <= initial_odometer_km.value() {
            return Err(ValidationError::OdometerNotIncreasing {
                initial_km: initial_odometer_km.value(),
                final_km: final_odometer_km.value(),
            });
        }
        let distance = final_odometer_km.value() - initial_odometer_km.value();
        if distance > MAX_TRIP_KM {
            return Err(ValidationError::ImplausibleDistance {
                distance_km: distance,
            });
        }
        let distance_km = Kilometers::new(distance)?;
        Ok(Self {
            user,
            date,
            vehicle_type,
            vehicle_id,
            initial_odometer_km,
            final_odometer_km,
            distance_km,
        })
    }
}

impl Dated for DriveRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Wire shape for deserialization. Distance is recomputed from the odometer
/// readings so stored values cannot drift from the invariant.
#[derive(Deserialize)]
struct RawDriveRecord {
    user: UserId,
    date: NaiveDate,
    vehicle_type: VehicleType,
    vehicle_id: VehicleId,
    initial_odometer_km: Kilometers,
    final_odometer_km: Kilometers,
}

impl TryFrom<RawDriveRecord> for DriveRecord {
    type Error = ValidationError;

    fn try_from(raw: RawDriveRecord) -> Result<Self, Self::Error> {
        Self::new(
            raw.user,
            raw.date,
            raw.vehicle_type,
            raw.vehicle_id,
            raw.initial_odometer_km,
            raw.final_odometer_km,
        )
    }
}
