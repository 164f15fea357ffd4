//! Discrete event records for the narrative layer
//!
//! Every consequence the simulation wants downstream consumers to see is
//! appended to the world's event log as one of these. The log is
//! append-only and keyed by (entity, hour).

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildingId, CityId, PersonId, SimHour};
use crate::entity::needs::{FundamentalNeed, NeedChannel};

/// Which entity an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Person(PersonId),
    Building(BuildingId),
    City(CityId),
}

/// Hard state transitions triggered by threshold breaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdKind {
    Death,
    ForcedRest,
    Eviction,
    Condemnation,
    Decline,
    DeclineCleared,
    Unrest,
    UnrestCleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingEventKind {
    Maintained,
    Cleaned,
    Upgraded,
    ProductionHalted,
    RentCollected,
}

/// Events generated during simulation ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    /// A person set out for another building
    Movement {
        person: PersonId,
        from: BuildingId,
        to: BuildingId,
        hour: SimHour,
        reason: FundamentalNeed,
        travel_hours: u64,
    },
    /// A person acted on a need and some amount landed
    NeedFulfilled {
        person: PersonId,
        building: BuildingId,
        hour: SimHour,
        channel: NeedChannel,
        amount: f32,
    },
    /// A completed work shift
    Work {
        person: PersonId,
        building: BuildingId,
        hour: SimHour,
        hours_worked: f32,
        wage: f32,
        productivity: f32,
    },
    /// A social interaction at some venue
    Social {
        person: PersonId,
        building: BuildingId,
        hour: SimHour,
    },
    /// Something happened to a building
    Building {
        building: BuildingId,
        hour: SimHour,
        kind: BuildingEventKind,
        value: f32,
    },
    /// A threshold breach fired its transition
    Threshold {
        entity: EntityRef,
        hour: SimHour,
        kind: ThresholdKind,
    },
}

impl SimulationEvent {
    /// The entity this event is keyed under
    pub fn entity(&self) -> EntityRef {
        match self {
            SimulationEvent::Movement { person, .. }
            | SimulationEvent::NeedFulfilled { person, .. }
            | SimulationEvent::Work { person, .. }
            | SimulationEvent::Social { person, .. } => EntityRef::Person(*person),
            SimulationEvent::Building { building, .. } => EntityRef::Building(*building),
            SimulationEvent::Threshold { entity, .. } => *entity,
        }
    }

    pub fn hour(&self) -> SimHour {
        match self {
            SimulationEvent::Movement { hour, .. }
            | SimulationEvent::NeedFulfilled { hour, .. }
            | SimulationEvent::Work { hour, .. }
            | SimulationEvent::Social { hour, .. }
            | SimulationEvent::Building { hour, .. }
            | SimulationEvent::Threshold { hour, .. } => *hour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_keying() {
        let event = SimulationEvent::Threshold {
            entity: EntityRef::City(CityId(3)),
            hour: 42,
            kind: ThresholdKind::Unrest,
        };
        assert_eq!(event.entity(), EntityRef::City(CityId(3)));
        assert_eq!(event.hour(), 42);
    }

    #[test]
    fn test_event_serializes() {
        let event = SimulationEvent::NeedFulfilled {
            person: PersonId(1),
            building: BuildingId(2),
            hour: 7,
            channel: NeedChannel::Consumption,
            amount: 25.0,
        };
        let json = serde_json::to_string(&event).expect("serializable");
        assert!(json.contains("Consumption"));
    }
}
