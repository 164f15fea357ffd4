//! Cascade propagator: building-scope daily and city-scope weekly passes
//!
//! Individual effects aggregate upward (occupancy wears buildings, stressed
//! residents erode stability, worker-hours become production) and selected
//! aggregates flow back down (city infrastructure scales building wear).

use ahash::AHashMap;

use crate::core::config::config;
use crate::core::types::{BuildingId, CityId, SimHour};
use crate::entity::building::{Building, BuildingKind, MAX_STAGE};
use crate::entity::city::City;
use crate::entity::needs::SpecializedRole;
use crate::entity::person::Person;
use crate::simulation::events::{
    BuildingEventKind, EntityRef, SimulationEvent, ThresholdKind,
};
use crate::simulation::rates::{action, building as rates, city as city_rates, thresholds, upgrades};

/// Daily building-scope pass
pub fn propagate_buildings(
    buildings: &mut [Building],
    cities: &[City],
    city_index: &AHashMap<CityId, usize>,
    hour: SimHour,
    events: &mut Vec<SimulationEvent>,
) {
    for building in buildings.iter_mut() {
        if building.condemned {
            continue;
        }

        // City infrastructure feeds back as a wear multiplier
        let infra_mult = city_index
            .get(&building.city)
            .map(|&i| cities[i].maintenance_multiplier())
            .unwrap_or(1.0);

        let occupants = building.occupants as f32;
        let maintenance_decay =
            (rates::MAINTENANCE_BASE + occupants * rates::MAINTENANCE_PER_OCCUPANT) * infra_mult;
        building.maintenance = (building.maintenance + maintenance_decay).clamp(0.0, 100.0);

        let cleanliness_decay =
            rates::CLEANLINESS_BASE + occupants * rates::CLEANLINESS_PER_OCCUPANT;
        building.cleanliness = (building.cleanliness + cleanliness_decay).clamp(0.0, 100.0);

        let efficiency_factor = building.efficiency_factor();
        let consumption_factor = building.consumption_factor();
        let condition_factor = building.maintenance / 100.0;
        let capacity = building.capacity.max(1) as f32;
        let mut banked_hours = 0.0;

        match &mut building.kind {
            BuildingKind::Home {
                daily_rent,
                rent_ledger,
            } => {
                *rent_ledger -= *daily_rent;
            }
            BuildingKind::Workplace {
                inventory,
                stockpile,
                worker_hours,
                ..
            } => {
                let workers = *worker_hours / action::WORK_DURATION as f32;
                let consumption = (rates::CONSUMPTION_BASE
                    + workers * rates::CONSUMPTION_PER_WORKER)
                    * consumption_factor;

                // Overcrowded floors and skeleton crews both hurt output
                let staffing = workers / capacity;
                let staffing_factor = if staffing > 0.8 {
                    0.9
                } else if staffing < 0.2 {
                    0.7
                } else {
                    1.0
                };

                if *stockpile > 0.0 {
                    *stockpile = (*stockpile - consumption).max(0.0);
                    let production = (rates::PRODUCTION_BASE
                        + workers * rates::PRODUCTION_PER_WORKER)
                        * efficiency_factor
                        * condition_factor
                        * staffing_factor;
                    *inventory = (*inventory + production).min(rates::MAX_INVENTORY);
                } else {
                    events.push(SimulationEvent::Building {
                        building: building.id,
                        hour,
                        kind: BuildingEventKind::ProductionHalted,
                        value: 0.0,
                    });
                }

                banked_hours = *worker_hours * upgrades::UPGRADE_HOURS_SHARE;
                *worker_hours = 0.0;
            }
            _ => {}
        }

        if banked_hours > 0.0 {
            building.efficiency_work_hours += banked_hours;
            building.prestige_work_hours += banked_hours;
            advance_upgrades(building, hour, events);
        }

        // Condemnation counter
        if building.maintenance <= 0.0 {
            building.days_unmaintained += 1;
            if building.days_unmaintained >= thresholds::CONDEMNATION_DAYS {
                building.condemned = true;
                events.push(SimulationEvent::Threshold {
                    entity: EntityRef::Building(building.id),
                    hour,
                    kind: ThresholdKind::Condemnation,
                });
            }
        } else {
            building.days_unmaintained = 0;
        }
    }
}

/// Spend banked work-hours on the two upgrade tracks, capped at stage 5
fn advance_upgrades(building: &mut Building, hour: SimHour, events: &mut Vec<SimulationEvent>) {
    while building.efficiency_stage < MAX_STAGE
        && building.efficiency_work_hours >= upgrades::EFFICIENCY_STAGE_HOURS
    {
        building.efficiency_work_hours -= upgrades::EFFICIENCY_STAGE_HOURS;
        building.efficiency_stage += 1;
        events.push(SimulationEvent::Building {
            building: building.id,
            hour,
            kind: BuildingEventKind::Upgraded,
            value: building.efficiency_stage as f32,
        });
    }
    while building.prestige_stage < MAX_STAGE
        && building.prestige_work_hours >= upgrades::PRESTIGE_STAGE_HOURS
    {
        building.prestige_work_hours -= upgrades::PRESTIGE_STAGE_HOURS;
        building.prestige_stage += 1;
        events.push(SimulationEvent::Building {
            building: building.id,
            hour,
            kind: BuildingEventKind::Upgraded,
            value: building.prestige_stage as f32,
        });
    }
}

/// Weekly city-scope pass
pub fn propagate_cities(
    cities: &mut [City],
    people: &[Person],
    buildings: &mut [Building],
    hour: SimHour,
    events: &mut Vec<SimulationEvent>,
) {
    // Where does each person live, city-wise?
    let home_city: AHashMap<BuildingId, CityId> =
        buildings.iter().map(|b| (b.id, b.city)).collect();

    for city in cities.iter_mut() {
        let residents: Vec<&Person> = people
            .iter()
            .filter(|p| p.alive)
            .filter(|p| {
                p.home
                    .and_then(|h| home_city.get(&h))
                    .is_some_and(|&c| c == city.id)
            })
            .collect();

        city.population = residents.len() as u32;

        // Infrastructure wears with the population it serves
        let decay = city.population as f32 * city_rates::PUBLIC_WORKS_PER_RESIDENT;
        city.public_works = (city.public_works + decay).clamp(0.0, 100.0);

        // Services cost, taxes collect
        let service_cost = city.population as f32 / 100.0 * city_rates::SERVICE_COST_PER_100;
        city.tax_reserve -= service_cost;

        let tax_rate = config().tax_rate;
        let collected: f32 = residents
            .iter()
            .filter(|p| p.workplace.is_some())
            .map(|p| p.income.max(0.0) * tax_rate)
            .sum();
        city.tax_base = collected;
        city.tax_reserve += collected;

        // Employment
        let workforce = residents
            .iter()
            .filter(|p| (18..=65).contains(&p.age))
            .count();
        let employed = residents.iter().filter(|p| p.workplace.is_some()).count();
        city.unemployment_rate = if workforce > 0 {
            (workforce.saturating_sub(employed)) as f32 / workforce as f32 * 100.0
        } else {
            0.0
        };

        // Social cohesion
        let stressed = residents
            .iter()
            .filter(|p| p.stress > thresholds::STRESS_CRITICAL)
            .count() as f32;
        city.stability =
            (city.stability - stressed * city_rates::STABILITY_PER_STRESSED).clamp(0.0, 100.0);
        if workforce > 0 && city.unemployment_rate < 5.0 {
            city.stability =
                (city.stability + city_rates::FULL_EMPLOYMENT_BONUS).min(100.0);
        }

        city.health = mean_or(residents.iter().map(|p| p.environment), 100.0);
        city.safety = 100.0 - mean_or(residents.iter().map(|p| p.threat), 0.0);
        city.average_happiness = mean_or(
            residents.iter().map(|p| {
                let basics = (p.consumption + p.rest + p.safety) / 3.0;
                (basics + p.community) / 2.0
            }),
            70.0,
        );

        // Development accrues from specialized residents over the week
        let artists = residents
            .iter()
            .filter(|p| p.role == SpecializedRole::Artist)
            .count() as f32;
        let scientists = residents
            .iter()
            .filter(|p| p.role == SpecializedRole::Scientist)
            .count() as f32;
        city.culture += artists * city_rates::ARTIST_CULTURE_RATE * 168.0;
        city.science += scientists * city_rates::SCIENTIST_SCIENCE_RATE * 168.0;

        let achievement_points: f32 = residents.iter().map(|p| p.achievements / 20.0).sum();
        let self_actualized = residents.iter().filter(|p| p.progression > 80.0).count() as f32;

        // Trade and building prestige need the city's buildings
        let mut stage_sum = 0u32;
        let mut exported = 0.0;
        let mut starved = 0u32;
        for building in buildings.iter_mut().filter(|b| b.city == city.id) {
            stage_sum += building.prestige_stage as u32;
            if let BuildingKind::Workplace {
                inventory,
                stockpile,
                ..
            } = &mut building.kind
            {
                // A tenth of finished goods ships out each week
                let out = *inventory * 0.1;
                *inventory -= out;
                exported += out;
                if *stockpile <= 0.0 {
                    *stockpile += rates::IMPORT_RESTOCK;
                    starved += 1;
                }
            }
        }

        city.prestige += stage_sum as f32
            + achievement_points
            + self_actualized * city_rates::SELF_ACTUALIZED_PRESTIGE;

        city.export_rate = exported;
        city.tax_reserve += exported * city_rates::EXPORT_REVENUE;
        city.import_rate = starved as f32 * 10.0;
        city.tax_reserve -= city.import_rate * city_rates::IMPORT_COST;

        // Threshold counters
        if city.tax_reserve < 0.0 {
            city.weeks_in_deficit += 1;
            if city.weeks_in_deficit >= thresholds::DECLINE_WEEKS && !city.in_decline {
                city.in_decline = true;
                events.push(SimulationEvent::Threshold {
                    entity: EntityRef::City(city.id),
                    hour,
                    kind: ThresholdKind::Decline,
                });
            }
        } else {
            city.weeks_in_deficit = 0;
            if city.in_decline {
                city.in_decline = false;
                events.push(SimulationEvent::Threshold {
                    entity: EntityRef::City(city.id),
                    hour,
                    kind: ThresholdKind::DeclineCleared,
                });
            }
        }

        if city.stability < thresholds::UNREST_STABILITY {
            city.weeks_low_stability += 1;
            if city.weeks_low_stability >= thresholds::UNREST_WEEKS && !city.in_unrest {
                city.in_unrest = true;
                events.push(SimulationEvent::Threshold {
                    entity: EntityRef::City(city.id),
                    hour,
                    kind: ThresholdKind::Unrest,
                });
            }
        } else {
            city.weeks_low_stability = 0;
            if city.in_unrest {
                city.in_unrest = false;
                events.push(SimulationEvent::Threshold {
                    entity: EntityRef::City(city.id),
                    hour,
                    kind: ThresholdKind::UnrestCleared,
                });
            }
        }

        city.last_update_hour = hour;
    }
}

fn mean_or(values: impl Iterator<Item = f32>, default: f32) -> f32 {
    let mut sum = 0.0;
    let mut count = 0u32;
    for v in values {
        sum += v;
        count += 1;
    }
    if count > 0 {
        sum / count as f32
    } else {
        default
    }
}
