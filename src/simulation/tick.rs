//! Tick scheduler: the single entry point for world advancement
//!
//! One monotonic hour counter drives three cadences: persons every hour,
//! buildings every 24th, cities every 168th. Manual ticks, skips, and the
//! autoticker all funnel through `run_hour`, and entities always update in
//! arena insertion order so identical inputs give identical worlds.

use rayon::prelude::*;

use crate::core::calendar::HOURS_PER_DAY;
use crate::core::config::config;
use crate::core::types::SimHour;
use crate::entity::building::LocationProfile;
use crate::entity::needs::NeedChannel;
use crate::entity::person::PersonStatus;
use crate::simulation::calculator;
use crate::simulation::cascade;
use crate::simulation::events::SimulationEvent;
use crate::simulation::executor;
use crate::simulation::resolver::{self, PlannedAction};
use crate::world::World;

/// The city cadence: seven 24-hour days, regardless of the 6-day calendar week
pub const HOURS_PER_WEEK: u64 = 7 * HOURS_PER_DAY;

/// Which scopes a given hour reaches
///
/// Weekly hours are also daily hours (168 is a multiple of 24), so the
/// cadence forms a strict ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickCadence {
    Hourly,
    Daily,
    Weekly,
}

impl TickCadence {
    pub fn for_hour(hour: SimHour) -> Self {
        if hour % HOURS_PER_WEEK == 0 {
            TickCadence::Weekly
        } else if hour % HOURS_PER_DAY == 0 {
            TickCadence::Daily
        } else {
            TickCadence::Hourly
        }
    }

    pub fn runs_building_scope(&self) -> bool {
        matches!(self, TickCadence::Daily | TickCadence::Weekly)
    }

    pub fn runs_city_scope(&self) -> bool {
        matches!(self, TickCadence::Weekly)
    }
}

/// Advance the world by exactly one hour
///
/// 1. Advance the clock.
/// 2. Calculator pass over every living person (independent, parallel above
///    the configured threshold; everything downstream waits on the join).
/// 3. In insertion order: threshold transitions, status expiry, and action
///    selection/execution for idle persons.
/// 4. Building-scope cascade on daily hours, city-scope on weekly hours.
pub fn run_hour(world: &mut World) -> Vec<SimulationEvent> {
    let mut events = Vec::new();

    world.clock.advance();
    let hour = world.clock.current_hour();
    let cadence = TickCadence::for_hour(hour);

    advance_needs(world);

    for i in 0..world.people.len() {
        let was_alive = world.people[i].alive;
        executor::apply_thresholds(&mut world.people[i], hour, &mut events);
        if !world.people[i].alive {
            if was_alive {
                // A death frees the spot the person occupied
                let location = world.people[i].location;
                if let Some(&bi) = world.building_index.get(&location) {
                    world.buildings[bi].occupants =
                        world.buildings[bi].occupants.saturating_sub(1);
                }
            }
            continue;
        }

        expire_status(world, i, hour);

        if world.people[i].status.is_idle() {
            let plan = if world.people[i].forced_rest {
                Some((NeedChannel::Rest, PlannedAction::Sleep))
            } else {
                resolver::select_action(
                    &world.people[i],
                    &world.buildings,
                    world.strategy.as_ref(),
                )
            };
            if let Some((channel, plan)) = plan {
                let person = &mut world.people[i];
                if let Err(err) = executor::apply(
                    person,
                    &mut world.buildings,
                    &world.building_index,
                    plan,
                    hour,
                    &mut events,
                ) {
                    tracing::debug!(
                        person = person.id.0,
                        ?channel,
                        %err,
                        "action rejected"
                    );
                }
            }
        }
    }

    if cadence.runs_building_scope() {
        tracing::debug!(day = hour / HOURS_PER_DAY, "building-scope cascade");
        cascade::propagate_buildings(
            &mut world.buildings,
            &world.cities,
            &world.city_index,
            hour,
            &mut events,
        );
    }
    if cadence.runs_city_scope() {
        tracing::debug!(week = hour / HOURS_PER_WEEK, "city-scope cascade");
        cascade::propagate_cities(
            &mut world.cities,
            &world.people,
            &mut world.buildings,
            hour,
            &mut events,
        );
    }

    events
}

/// Hourly calculator pass; per-person work is independent, so large worlds
/// fan out over rayon and join before anything order-dependent runs.
fn advance_needs(world: &mut World) {
    let contexts: Vec<Option<(LocationProfile, bool)>> = world
        .people
        .iter()
        .map(|p| {
            world.building_index.get(&p.location).map(|&i| {
                let building = &world.buildings[i];
                (building.profile, p.home == Some(p.location))
            })
        })
        .collect();

    if world.people.len() >= config().parallel_threshold {
        world
            .people
            .par_iter_mut()
            .zip(contexts.par_iter())
            .for_each(|(person, ctx)| {
                if let Some((profile, at_home)) = ctx {
                    calculator::advance(person, profile, *at_home, 1);
                }
            });
    } else {
        for (person, ctx) in world.people.iter_mut().zip(contexts.iter()) {
            if let Some((profile, at_home)) = ctx {
                calculator::advance(person, profile, *at_home, 1);
            }
        }
    }
}

/// Complete any status whose hour has come
fn expire_status(world: &mut World, i: usize, hour: SimHour) {
    let status = world.people[i].status;
    let Some(until) = status.until_hour() else {
        return;
    };
    if until > hour {
        return;
    }

    if let PersonStatus::InTransit { to, .. } = status {
        let from = world.people[i].location;
        let room = world
            .building_index
            .get(&to)
            .map(|&bi| world.buildings[bi].has_room())
            .unwrap_or(false);
        if room {
            if let Some(&bi) = world.building_index.get(&from) {
                world.buildings[bi].occupants = world.buildings[bi].occupants.saturating_sub(1);
            }
            if let Some(&bi) = world.building_index.get(&to) {
                world.buildings[bi].occupants += 1;
            }
            world.people[i].location = to;
        } else {
            tracing::debug!(person = world.people[i].id.0, to = to.0, "arrival bounced, no room");
        }
    }

    world.people[i].status = PersonStatus::Idle;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_ladder() {
        assert_eq!(TickCadence::for_hour(1), TickCadence::Hourly);
        assert_eq!(TickCadence::for_hour(24), TickCadence::Daily);
        assert_eq!(TickCadence::for_hour(48), TickCadence::Daily);
        assert_eq!(TickCadence::for_hour(168), TickCadence::Weekly);
        assert!(TickCadence::Weekly.runs_building_scope());
        assert!(!TickCadence::Daily.runs_city_scope());
    }
}
