//! Building records: the daily-ticked entities of the simulation

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingId, CityId, Position, SimHour};
use crate::entity::needs::FundamentalNeed;

/// Highest reachable upgrade stage for either track
pub const MAX_STAGE: u8 = 5;

/// Closed set of building kinds, with kind-specific state inline
///
/// The cascade dispatches on this tag; there is no building inheritance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BuildingKind {
    Home {
        /// Rent accrued per day
        daily_rent: f32,
        /// Running ledger: negative means rent is owed
        rent_ledger: f32,
    },
    Workplace {
        base_wage: f32,
        inventory: f32,
        stockpile: f32,
        /// Productivity-weighted hours worked since the last daily pass
        worker_hours: f32,
    },
    Restaurant,
    Park,
    Hospital,
    School,
    CultureHall,
}

impl BuildingKind {
    pub fn home(daily_rent: f32) -> Self {
        BuildingKind::Home {
            daily_rent,
            rent_ledger: 0.0,
        }
    }

    pub fn workplace(base_wage: f32) -> Self {
        BuildingKind::Workplace {
            base_wage,
            inventory: 0.0,
            stockpile: 100.0,
            worker_hours: 0.0,
        }
    }

    pub fn is_workplace(&self) -> bool {
        matches!(self, BuildingKind::Workplace { .. })
    }
}

/// What needs a location can fulfil, plus its environmental pull
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationProfile {
    pub provides_food: bool,
    pub provides_rest: bool,
    pub provides_social: bool,
    pub provides_facilities: bool,
    pub provides_healthcare: bool,
    pub provides_culture: bool,
    pub provides_work: bool,
    /// -3.0 (hazardous) to +2.0 (healing)
    pub environmental_quality: f32,
}

impl LocationProfile {
    /// Default capability set per building kind
    pub fn for_kind(kind: &BuildingKind) -> Self {
        match kind {
            BuildingKind::Home { .. } => Self {
                provides_food: true,
                provides_rest: true,
                provides_social: false,
                provides_facilities: true,
                provides_healthcare: false,
                provides_culture: false,
                provides_work: false,
                environmental_quality: 0.5,
            },
            BuildingKind::Workplace { .. } => Self {
                provides_food: false,
                provides_rest: false,
                provides_social: true,
                provides_facilities: true,
                provides_healthcare: false,
                provides_culture: false,
                provides_work: true,
                environmental_quality: -0.5,
            },
            BuildingKind::Restaurant => Self {
                provides_food: true,
                provides_rest: false,
                provides_social: true,
                provides_facilities: true,
                provides_healthcare: false,
                provides_culture: false,
                provides_work: false,
                environmental_quality: 0.0,
            },
            BuildingKind::Park => Self {
                provides_food: false,
                provides_rest: true,
                provides_social: true,
                provides_facilities: false,
                provides_healthcare: false,
                provides_culture: true,
                provides_work: false,
                environmental_quality: 1.5,
            },
            BuildingKind::Hospital => Self {
                provides_food: false,
                provides_rest: true,
                provides_social: false,
                provides_facilities: true,
                provides_healthcare: true,
                provides_culture: false,
                provides_work: false,
                environmental_quality: 2.0,
            },
            BuildingKind::School | BuildingKind::CultureHall => Self {
                provides_food: false,
                provides_rest: false,
                provides_social: true,
                provides_facilities: true,
                provides_healthcare: false,
                provides_culture: true,
                provides_work: false,
                environmental_quality: 0.5,
            },
        }
    }

    pub fn is_hazardous(&self) -> bool {
        self.environmental_quality < -1.0
    }

    pub fn is_healing(&self) -> bool {
        self.environmental_quality > 0.0
    }
}

/// A simulated building
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    pub name: String,
    pub city: CityId,
    pub position: Position,
    pub kind: BuildingKind,
    pub profile: LocationProfile,

    /// 0-100; the building is unusable at 0
    pub maintenance: f32,
    /// 0-100
    pub cleanliness: f32,

    /// Upgrade stages, 0-5, advanced by banked work-hours
    pub efficiency_stage: u8,
    pub prestige_stage: u8,
    pub efficiency_work_hours: f32,
    pub prestige_work_hours: f32,

    pub occupants: u32,
    pub capacity: u32,

    pub condemned: bool,
    /// Consecutive days with maintenance at the floor
    pub days_unmaintained: u32,

    pub created_hour: SimHour,
}

impl Building {
    pub fn new(
        id: BuildingId,
        name: String,
        city: CityId,
        position: Position,
        kind: BuildingKind,
        capacity: u32,
        created_hour: SimHour,
    ) -> Self {
        let profile = LocationProfile::for_kind(&kind);
        Self {
            id,
            name,
            city,
            position,
            kind,
            profile,
            maintenance: 100.0,
            cleanliness: 100.0,
            efficiency_stage: 0,
            prestige_stage: 0,
            efficiency_work_hours: 0.0,
            prestige_work_hours: 0.0,
            occupants: 0,
            capacity,
            condemned: false,
            days_unmaintained: 0,
            created_hour,
        }
    }

    pub fn has_room(&self) -> bool {
        !self.condemned && self.occupants < self.capacity
    }

    /// Whether this location can serve the given fundamental need for a
    /// visitor (home-only capabilities require the visitor to live here)
    pub fn can_fulfil(&self, need: FundamentalNeed, is_resident: bool) -> bool {
        if self.condemned {
            return false;
        }
        match need {
            FundamentalNeed::Consumption => self.profile.provides_food,
            FundamentalNeed::Rest => self.profile.provides_rest && is_resident,
            FundamentalNeed::Connection => {
                self.profile.provides_social || self.profile.provides_culture
            }
            FundamentalNeed::Waste => self.profile.provides_facilities,
            FundamentalNeed::Environment => {
                self.profile.environmental_quality > 0.0
                    || self.profile.provides_healthcare
                    || (is_resident && self.profile.provides_rest)
            }
        }
    }

    /// Production multiplier from the efficiency track: +20% per stage
    pub fn efficiency_factor(&self) -> f32 {
        1.0 + self.efficiency_stage as f32 * 0.2
    }

    /// Consumption multiplier from the efficiency track: -10% per stage
    pub fn consumption_factor(&self) -> f32 {
        1.0 - self.efficiency_stage as f32 * 0.1
    }
}
