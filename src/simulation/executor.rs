//! Action executor: applies plans, mutates actor and target, emits events
//!
//! Validation happens before any mutation; a rejected action leaves no
//! trace. Threshold transitions (death, forced rest, eviction) also fire
//! here, logged as events rather than errors.

use ahash::AHashMap;

use crate::core::config::config;
use crate::core::error::{Result, SimError};
use crate::core::types::{BuildingId, SimHour};
use crate::entity::building::{Building, BuildingKind};
use crate::entity::needs::NeedChannel;
use crate::entity::person::{Person, PersonStatus};
use crate::simulation::events::{
    BuildingEventKind, EntityRef, SimulationEvent, ThresholdKind,
};
use crate::simulation::rates::{action, thresholds};
use crate::simulation::resolver::PlannedAction;

/// Apply a planned action for one person
pub fn apply(
    person: &mut Person,
    buildings: &mut [Building],
    index: &AHashMap<BuildingId, usize>,
    plan: PlannedAction,
    hour: SimHour,
    events: &mut Vec<SimulationEvent>,
) -> Result<()> {
    match plan {
        PlannedAction::Work => {
            let workplace = person
                .workplace
                .ok_or_else(|| SimError::Validation("work without a workplace".into()))?;
            if person.location != workplace {
                return Err(SimError::Validation("work away from the workplace".into()));
            }
            let idx = *index
                .get(&workplace)
                .ok_or(SimError::UnknownBuilding(workplace))?;
            if !buildings[idx].kind.is_workplace() {
                return Err(SimError::Validation("work target is not a workplace".into()));
            }

            let productivity = person.productivity();
            person.status = PersonStatus::Working {
                until_hour: hour + action::WORK_DURATION,
            };
            person.set_channel(
                NeedChannel::Rest,
                person.rest + action::WORK_REST_COST,
            );
            person.set_channel(
                NeedChannel::Stress,
                person.stress + action::WORK_STRESS_GAIN,
            );
            let wage = person.fulfill(NeedChannel::Income, action::WORK_INCOME_GAIN);

            person.shifts_worked += 1;
            if person.shifts_worked == 1 {
                // First job is a milestone
                person.grant_achievement();
            }

            if let BuildingKind::Workplace { worker_hours, .. } = &mut buildings[idx].kind {
                *worker_hours += action::WORK_DURATION as f32 * productivity;
            }

            events.push(SimulationEvent::Work {
                person: person.id,
                building: workplace,
                hour,
                hours_worked: action::WORK_DURATION as f32,
                wage,
                productivity,
            });
        }

        PlannedAction::Sleep => {
            person.status = PersonStatus::Sleeping {
                until_hour: hour + action::SLEEP_DURATION,
            };
            person.forced_rest = false;
            let applied = person.fulfill(NeedChannel::Rest, action::SLEEP_REST_GAIN);
            events.push(SimulationEvent::NeedFulfilled {
                person: person.id,
                building: person.location,
                hour,
                channel: NeedChannel::Rest,
                amount: applied,
            });
        }

        PlannedAction::Eat => {
            let idx = location_index(person, index)?;
            if !buildings[idx].profile.provides_food {
                return Err(SimError::Validation("nothing to eat here".into()));
            }
            person.status = PersonStatus::Eating {
                until_hour: hour + action::EAT_DURATION,
            };
            let applied = person.fulfill(NeedChannel::Consumption, action::EAT_CONSUMPTION_GAIN);
            person.set_channel(NeedChannel::Income, person.income - action::MEAL_COST);
            events.push(SimulationEvent::NeedFulfilled {
                person: person.id,
                building: person.location,
                hour,
                channel: NeedChannel::Consumption,
                amount: applied,
            });
        }

        PlannedAction::Socialize => {
            let idx = location_index(person, index)?;
            let profile = &buildings[idx].profile;
            if !profile.provides_social && !profile.provides_culture {
                return Err(SimError::Validation("no company to be found here".into()));
            }
            person.status = PersonStatus::Socializing {
                until_hour: hour + action::SOCIALIZE_DURATION,
            };
            let applied = person.fulfill(NeedChannel::Social, action::SOCIALIZE_SOCIAL_GAIN);
            person.fulfill(NeedChannel::Connection, action::SOCIALIZE_CONNECTION_GAIN);
            person.fulfill(NeedChannel::Stress, action::SOCIALIZE_STRESS_RELIEF);
            events.push(SimulationEvent::Social {
                person: person.id,
                building: person.location,
                hour,
            });
            events.push(SimulationEvent::NeedFulfilled {
                person: person.id,
                building: person.location,
                hour,
                channel: NeedChannel::Social,
                amount: applied,
            });
        }

        PlannedAction::UseFacilities => {
            let idx = location_index(person, index)?;
            if !buildings[idx].profile.provides_facilities {
                return Err(SimError::Validation("no facilities here".into()));
            }
            person.status = PersonStatus::UsingFacilities {
                until_hour: hour + action::FACILITIES_DURATION,
            };
            let applied = person.fulfill(NeedChannel::Waste, action::FACILITIES_WASTE_RELIEF);
            events.push(SimulationEvent::NeedFulfilled {
                person: person.id,
                building: person.location,
                hour,
                channel: NeedChannel::Waste,
                amount: applied,
            });
        }

        PlannedAction::Maintain(target) => {
            let idx = *index.get(&target).ok_or(SimError::UnknownBuilding(target))?;
            if person.location != target {
                return Err(SimError::Validation("maintenance from a distance".into()));
            }
            person.status = PersonStatus::Maintaining {
                until_hour: hour + action::MAINTAIN_DURATION,
                building: target,
            };
            let building = &mut buildings[idx];
            building.maintenance = (building.maintenance + action::MAINTAIN_GAIN).min(100.0);
            events.push(SimulationEvent::Building {
                building: target,
                hour,
                kind: BuildingEventKind::Maintained,
                value: action::MAINTAIN_GAIN,
            });
        }

        PlannedAction::Clean(target) => {
            let idx = *index.get(&target).ok_or(SimError::UnknownBuilding(target))?;
            if person.location != target {
                return Err(SimError::Validation("cleaning from a distance".into()));
            }
            person.status = PersonStatus::Cleaning {
                until_hour: hour + action::CLEAN_DURATION,
                building: target,
            };
            let building = &mut buildings[idx];
            building.cleanliness = (building.cleanliness + action::CLEAN_GAIN).min(100.0);
            events.push(SimulationEvent::Building {
                building: target,
                hour,
                kind: BuildingEventKind::Cleaned,
                value: action::CLEAN_GAIN,
            });
        }

        PlannedAction::PayRent => {
            let home = person
                .home
                .ok_or_else(|| SimError::Validation("rent without a home".into()))?;
            let idx = *index.get(&home).ok_or(SimError::UnknownBuilding(home))?;
            let BuildingKind::Home { rent_ledger, .. } = &mut buildings[idx].kind else {
                return Err(SimError::Validation("rent target is not a home".into()));
            };
            let owed = (-*rent_ledger).max(0.0);
            let paid = owed.min(person.income.max(0.0));
            if paid > 0.0 {
                *rent_ledger += paid;
                person.set_channel(NeedChannel::Income, person.income - paid);
                events.push(SimulationEvent::Building {
                    building: home,
                    hour,
                    kind: BuildingEventKind::RentCollected,
                    value: paid,
                });
            }
        }

        PlannedAction::Travel { to, need } => {
            let idx = *index.get(&to).ok_or(SimError::UnknownBuilding(to))?;
            if to == person.location {
                return Err(SimError::Validation("already there".into()));
            }
            if !buildings[idx].has_room() {
                return Err(SimError::Validation("destination is full".into()));
            }
            let from_idx = location_index(person, index)?;
            let distance = buildings[from_idx]
                .position
                .distance(&buildings[idx].position);
            let travel_hours =
                ((distance / config().travel_units_per_hour).ceil() as u64).max(1);

            person.status = PersonStatus::InTransit {
                until_hour: hour + travel_hours,
                to,
            };
            person.set_channel(
                NeedChannel::Rest,
                person.rest + action::MOVE_REST_COST_PER_HOUR * travel_hours as f32,
            );
            events.push(SimulationEvent::Movement {
                person: person.id,
                from: person.location,
                to,
                hour,
                reason: need,
                travel_hours,
            });
        }
    }

    Ok(())
}

fn location_index(person: &Person, index: &AHashMap<BuildingId, usize>) -> Result<usize> {
    index
        .get(&person.location)
        .copied()
        .ok_or(SimError::UnknownBuilding(person.location))
}

/// Fire any hard transitions this person's counters have earned
///
/// Death wins over everything and fires exactly once; forced rest arms a
/// flag the scheduler honors on the next selection; eviction clears the
/// home reference.
pub fn apply_thresholds(person: &mut Person, hour: SimHour, events: &mut Vec<SimulationEvent>) {
    if !person.alive {
        return;
    }

    if person.hours_starving >= thresholds::STARVATION_HOURS {
        person.alive = false;
        person.status = PersonStatus::Idle;
        events.push(SimulationEvent::Threshold {
            entity: EntityRef::Person(person.id),
            hour,
            kind: ThresholdKind::Death,
        });
        return;
    }

    if person.hours_exhausted >= thresholds::EXHAUSTION_HOURS && !person.forced_rest {
        person.forced_rest = true;
        events.push(SimulationEvent::Threshold {
            entity: EntityRef::Person(person.id),
            hour,
            kind: ThresholdKind::ForcedRest,
        });
    }

    if person.hours_insolvent >= thresholds::INSOLVENCY_HOURS {
        person.hours_insolvent = 0;
        if person.home.take().is_some() {
            events.push(SimulationEvent::Threshold {
                entity: EntityRef::Person(person.id),
                hour,
                kind: ThresholdKind::Eviction,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CityId, PersonId, Position};

    fn setup() -> (Person, Vec<Building>, AHashMap<BuildingId, usize>) {
        let buildings = vec![
            Building::new(
                BuildingId(1),
                "Rowhouse".into(),
                CityId(1),
                Position::new(0.0, 0.0),
                BuildingKind::home(10.0),
                4,
                0,
            ),
            Building::new(
                BuildingId(2),
                "Mill".into(),
                CityId(1),
                Position::new(30.0, 40.0),
                BuildingKind::workplace(5.0),
                10,
                0,
            ),
        ];
        let index = buildings
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id, i))
            .collect();
        let mut person = Person::new(PersonId(1), "Asha".into(), BuildingId(1), 0);
        person.home = Some(BuildingId(1));
        person.workplace = Some(BuildingId(2));
        (person, buildings, index)
    }

    #[test]
    fn test_work_requires_presence() {
        let (mut person, mut buildings, index) = setup();
        let mut events = Vec::new();
        let result = apply(
            &mut person,
            &mut buildings,
            &index,
            PlannedAction::Work,
            0,
            &mut events,
        );
        assert!(result.is_err());
        // Rejected pre-mutation: nothing changed
        assert_eq!(person.status, PersonStatus::Idle);
        assert!(events.is_empty());
    }

    #[test]
    fn test_work_applies_deltas_and_accrues_hours() {
        let (mut person, mut buildings, index) = setup();
        person.location = BuildingId(2);
        let rest_before = person.rest;
        let mut events = Vec::new();
        apply(
            &mut person,
            &mut buildings,
            &index,
            PlannedAction::Work,
            0,
            &mut events,
        )
        .expect("valid work");

        assert_eq!(person.rest, rest_before + action::WORK_REST_COST);
        assert!(matches!(person.status, PersonStatus::Working { until_hour: 8 }));
        let BuildingKind::Workplace { worker_hours, .. } = &buildings[1].kind else {
            panic!("mill is a workplace");
        };
        assert!(*worker_hours > 0.0);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_travel_time_scales_with_distance() {
        let (mut person, mut buildings, index) = setup();
        let mut events = Vec::new();
        apply(
            &mut person,
            &mut buildings,
            &index,
            PlannedAction::Travel {
                to: BuildingId(2),
                need: crate::entity::needs::FundamentalNeed::Environment,
            },
            10,
            &mut events,
        )
        .expect("valid travel");

        // Distance 50 at 10 units/hour
        assert!(matches!(
            person.status,
            PersonStatus::InTransit { until_hour: 15, to: BuildingId(2) }
        ));
        assert!(matches!(events[0], SimulationEvent::Movement { travel_hours: 5, .. }));
    }

    #[test]
    fn test_eat_costs_income() {
        let (mut person, mut buildings, index) = setup();
        person.consumption = 40.0;
        let income_before = person.income;
        let mut events = Vec::new();
        apply(
            &mut person,
            &mut buildings,
            &index,
            PlannedAction::Eat,
            0,
            &mut events,
        )
        .expect("home provides food");
        assert_eq!(person.consumption, 65.0);
        assert_eq!(person.income, income_before - action::MEAL_COST);
    }

    #[test]
    fn test_pay_rent_settles_ledger() {
        let (mut person, mut buildings, index) = setup();
        if let BuildingKind::Home { rent_ledger, .. } = &mut buildings[0].kind {
            *rent_ledger = -30.0;
        }
        person.income = 100.0;
        let mut events = Vec::new();
        apply(
            &mut person,
            &mut buildings,
            &index,
            PlannedAction::PayRent,
            0,
            &mut events,
        )
        .expect("valid payment");
        let BuildingKind::Home { rent_ledger, .. } = &buildings[0].kind else {
            panic!("rowhouse is a home");
        };
        assert_eq!(*rent_ledger, 0.0);
        assert_eq!(person.income, 70.0);
    }

    #[test]
    fn test_starvation_death_fires_once() {
        let (mut person, _, _) = setup();
        person.hours_starving = thresholds::STARVATION_HOURS;
        let mut events = Vec::new();
        apply_thresholds(&mut person, 24, &mut events);
        apply_thresholds(&mut person, 25, &mut events);

        assert!(!person.alive);
        let deaths = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    SimulationEvent::Threshold { kind: ThresholdKind::Death, .. }
                )
            })
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_eviction_clears_home() {
        let (mut person, _, _) = setup();
        person.hours_insolvent = thresholds::INSOLVENCY_HOURS;
        let mut events = Vec::new();
        apply_thresholds(&mut person, 200, &mut events);
        assert_eq!(person.home, None);
        assert!(events.iter().any(|e| {
            matches!(
                e,
                SimulationEvent::Threshold { kind: ThresholdKind::Eviction, .. }
            )
        }));
    }
}
