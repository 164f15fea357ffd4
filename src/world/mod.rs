//! World arena: entity storage, control surface, and query surface
//!
//! All entities live in insertion-ordered arenas addressed by integer ids;
//! entities hold ids, never references. Every mutation funnels through the
//! scheduler entry point via `tick`/`skip`/`check_autotick`, so a tick is
//! one serialized unit against the store.

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::{SystemTime, UNIX_EPOCH};

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::core::calendar::{SimClock, TimePeriod, Valley};
use crate::core::error::{Result, SimError};
use crate::core::types::{BuildingId, CityId, PersonId, Position, SimHour};
use crate::entity::building::{Building, BuildingKind};
use crate::entity::city::City;
use crate::entity::needs::{NeedChannel, SpecializedRole};
use crate::entity::person::{Person, PersonStatus};
use crate::simulation::autotick::{Autoticker, AutotickerStatus, TickRate};
use crate::simulation::events::{EntityRef, SimulationEvent};
use crate::simulation::resolver::{self, LocationStrategy, NearestCheapest};
use crate::simulation::tick::run_hour;

/// Storage seam for the out-of-scope persistence collaborator
///
/// The world commits each tick's event batch through this; a rejected
/// commit rolls the whole tick back.
pub trait EventSink {
    fn append(&mut self, batch: &[SimulationEvent]) -> Result<()>;
}

/// The simulation world
pub struct World {
    pub clock: SimClock,
    pub running: bool,
    pub autoticker: Autoticker,

    pub(crate) people: Vec<Person>,
    pub(crate) person_index: AHashMap<PersonId, usize>,
    next_person_id: u32,

    pub(crate) buildings: Vec<Building>,
    pub(crate) building_index: AHashMap<BuildingId, usize>,
    next_building_id: u32,

    pub(crate) cities: Vec<City>,
    pub(crate) city_index: AHashMap<CityId, usize>,
    next_city_id: u32,

    pub(crate) strategy: Box<dyn LocationStrategy>,

    /// Append-only event log, keyed by (entity, hour)
    pub events: Vec<SimulationEvent>,
}

/// Mutable state captured before a committed tick, for rollback
struct Snapshot {
    clock: SimClock,
    running: bool,
    autoticker: Autoticker,
    people: Vec<Person>,
    buildings: Vec<Building>,
    cities: Vec<City>,
    event_len: usize,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            clock: SimClock::new(),
            running: true,
            autoticker: Autoticker::default(),
            people: Vec::new(),
            person_index: AHashMap::new(),
            next_person_id: 1,
            buildings: Vec::new(),
            building_index: AHashMap::new(),
            next_building_id: 1,
            cities: Vec::new(),
            city_index: AHashMap::new(),
            next_city_id: 1,
            strategy: Box::new(NearestCheapest),
            events: Vec::new(),
        }
    }

    /// Swap in a different location-selection heuristic
    pub fn set_location_strategy(&mut self, strategy: Box<dyn LocationStrategy>) {
        self.strategy = strategy;
    }

    // === SPAWNING ===

    pub fn spawn_city(&mut self, name: &str, valley: Valley) -> CityId {
        let id = CityId(self.next_city_id);
        self.next_city_id += 1;
        let city = City::new(id, name.to_string(), valley, self.clock.current_hour());
        self.city_index.insert(id, self.cities.len());
        self.cities.push(city);
        id
    }

    pub fn spawn_building(
        &mut self,
        name: &str,
        city: CityId,
        kind: BuildingKind,
        position: Position,
        capacity: u32,
    ) -> Result<BuildingId> {
        if !self.city_index.contains_key(&city) {
            return Err(SimError::UnknownCity(city));
        }
        let id = BuildingId(self.next_building_id);
        self.next_building_id += 1;
        let building = Building::new(
            id,
            name.to_string(),
            city,
            position,
            kind,
            capacity,
            self.clock.current_hour(),
        );
        self.building_index.insert(id, self.buildings.len());
        self.buildings.push(building);
        Ok(id)
    }

    pub fn spawn_person(
        &mut self,
        name: &str,
        home: Option<BuildingId>,
        workplace: Option<BuildingId>,
        at: BuildingId,
    ) -> Result<PersonId> {
        for reference in [Some(at), home, workplace].into_iter().flatten() {
            if !self.building_index.contains_key(&reference) {
                return Err(SimError::UnknownBuilding(reference));
            }
        }
        let at_idx = self.building_index[&at];
        if !self.buildings[at_idx].has_room() {
            return Err(SimError::Validation(format!(
                "building {:?} is at capacity",
                at
            )));
        }

        let id = PersonId(self.next_person_id);
        self.next_person_id += 1;
        let mut person = Person::new(id, name.to_string(), at, self.clock.current_hour());
        person.home = home;
        person.workplace = workplace;

        self.buildings[at_idx].occupants += 1;
        self.person_index.insert(id, self.people.len());
        self.people.push(person);
        Ok(id)
    }

    /// Record a partnership; both relationship channels pin at the cap and
    /// stay there until the bond changes (they do not decay).
    pub fn form_partnership(&mut self, a: PersonId, b: PersonId) -> Result<()> {
        if a == b {
            return Err(SimError::Validation("partnership needs two people".into()));
        }
        for id in [a, b] {
            if !self.person_index.contains_key(&id) {
                return Err(SimError::UnknownPerson(id));
            }
        }
        for (me, them) in [(a, b), (b, a)] {
            let idx = self.person_index[&me];
            self.people[idx].partner = Some(them);
            self.people[idx].refresh_bonds();
        }
        Ok(())
    }

    /// Record a friendship; the social channel steps up with friend count
    pub fn form_friendship(&mut self, a: PersonId, b: PersonId) -> Result<()> {
        if a == b {
            return Err(SimError::Validation("friendship needs two people".into()));
        }
        for id in [a, b] {
            if !self.person_index.contains_key(&id) {
                return Err(SimError::UnknownPerson(id));
            }
        }
        for (me, them) in [(a, b), (b, a)] {
            let idx = self.person_index[&me];
            if !self.people[idx].friends.contains(&them) {
                self.people[idx].friends.push(them);
            }
            self.people[idx].refresh_bonds();
        }
        Ok(())
    }

    // === ENTITY ACCESS ===

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.person_index.get(&id).map(|&i| &self.people[i])
    }

    /// Mutable access for the seeding collaborator and tests
    pub fn person_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.person_index.get(&id).map(|&i| &mut self.people[i])
    }

    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.building_index.get(&id).map(|&i| &self.buildings[i])
    }

    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.building_index.get(&id).map(|&i| &mut self.buildings[i])
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.city_index.get(&id).map(|&i| &self.cities[i])
    }

    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.city_index.get(&id).map(|&i| &mut self.cities[i])
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn living_count(&self) -> usize {
        self.people.iter().filter(|p| p.alive).count()
    }

    // === CONTROL SURFACE ===

    /// Advance one simulated hour; a paused world no-ops
    pub fn tick(&mut self) -> Result<Vec<SimulationEvent>> {
        if !self.running {
            tracing::debug!("tick requested while paused");
            return Ok(Vec::new());
        }
        let events = run_hour(self);
        self.events.extend(events.iter().cloned());
        Ok(events)
    }

    /// Advance `n` hours through the same entry point as `tick`
    pub fn skip(&mut self, n: u64) -> Result<Vec<SimulationEvent>> {
        let mut all = Vec::new();
        for _ in 0..n {
            all.extend(self.tick()?);
        }
        Ok(all)
    }

    /// Pause or resume; returns the new running state
    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        if self.running {
            tracing::info!(hour = self.clock.current_hour(), "simulation resumed");
        } else {
            tracing::info!(hour = self.clock.current_hour(), "simulation paused");
        }
        self.running
    }

    pub fn start_autoticker(&mut self) -> Result<()> {
        self.autoticker.start(now_ms())
    }

    pub fn stop_autoticker(&mut self) -> Result<()> {
        self.autoticker.stop()
    }

    pub fn set_tick_rate(&mut self, rate: TickRate) -> Result<()> {
        self.autoticker.set_rate(rate, now_ms())
    }

    pub fn autoticker_status(&self) -> AutotickerStatus {
        self.autoticker.status(now_ms())
    }

    /// Poll the autoticker against the real clock
    pub fn check_autotick(&mut self) -> Result<u64> {
        self.check_autotick_at(now_ms())
    }

    /// Poll the autoticker at an explicit wall-clock time
    ///
    /// Returns how many simulated hours were applied. A paused world
    /// consumes nothing; due hours wait for resume.
    pub fn check_autotick_at(&mut self, now_ms: i64) -> Result<u64> {
        if !self.running {
            return Ok(0);
        }
        let due = self.autoticker.hours_due(now_ms);
        for _ in 0..due {
            self.tick()?;
        }
        Ok(due)
    }

    /// Advance one hour and commit its events through the storage seam;
    /// a rejected commit rolls the whole tick back.
    pub fn tick_with_sink(&mut self, sink: &mut dyn EventSink) -> Result<Vec<SimulationEvent>> {
        let snapshot = self.snapshot();
        let events = self.tick()?;
        if let Err(err) = sink.append(&events) {
            self.restore(snapshot);
            return Err(SimError::Storage(err.to_string()));
        }
        Ok(events)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            clock: self.clock,
            running: self.running,
            autoticker: self.autoticker,
            people: self.people.clone(),
            buildings: self.buildings.clone(),
            cities: self.cities.clone(),
            event_len: self.events.len(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.clock = snapshot.clock;
        self.running = snapshot.running;
        self.autoticker = snapshot.autoticker;
        self.people = snapshot.people;
        self.buildings = snapshot.buildings;
        self.cities = snapshot.cities;
        self.events.truncate(snapshot.event_len);
    }

    // === QUERY SURFACE ===

    pub fn current_hour(&self) -> SimHour {
        self.clock.current_hour()
    }

    pub fn person_needs(&self, id: PersonId) -> Result<PersonNeedsView> {
        let person = self.person(id).ok_or(SimError::UnknownPerson(id))?;
        Ok(PersonNeedsView {
            id: person.id,
            name: person.name.clone(),
            alive: person.alive,
            status: person.status,
            location: person.location,
            home: person.home,
            workplace: person.workplace,
            consumption: person.consumption,
            environment: person.environment,
            connection: person.connection,
            rest: person.rest,
            waste: person.waste,
            threat: person.threat,
            income: person.income,
            stress: person.stress,
            safety: person.safety,
            relationship: person.relationship,
            social: person.social,
            community: person.community,
            achievements: person.achievements,
            progression: person.progression,
            level_adequacy: [
                person.level_1_adequacy(),
                person.level_2_adequacy(),
                person.level_3_adequacy(),
                person.level_4_adequacy(),
                person.progression,
            ],
            most_pressing: resolver::most_pressing(person),
        })
    }

    pub fn building_status(&self, id: BuildingId) -> Result<BuildingStatusView> {
        let building = self.building(id).ok_or(SimError::UnknownBuilding(id))?;
        Ok(BuildingStatusView {
            id: building.id,
            name: building.name.clone(),
            city: building.city,
            kind: building.kind.clone(),
            maintenance: building.maintenance,
            cleanliness: building.cleanliness,
            occupants: building.occupants,
            capacity: building.capacity,
            efficiency_stage: building.efficiency_stage,
            prestige_stage: building.prestige_stage,
            condemned: building.condemned,
        })
    }

    pub fn city_status(&self, id: CityId) -> Result<CityStatusView> {
        let city = self.city(id).ok_or(SimError::UnknownCity(id))?;
        let hour = self.clock.current_hour();
        Ok(CityStatusView {
            id: city.id,
            name: city.name.clone(),
            valley: city.valley,
            local_hour: city.valley.local_hour(hour),
            local_period: city.valley.local_period(hour),
            population: city.population,
            public_works: city.public_works,
            tax_base: city.tax_base,
            tax_reserve: city.tax_reserve,
            stability: city.stability,
            health: city.health,
            safety: city.safety,
            culture: city.culture,
            science: city.science,
            prestige: city.prestige,
            unemployment_rate: city.unemployment_rate,
            average_happiness: city.average_happiness,
            in_decline: city.in_decline,
            in_unrest: city.in_unrest,
        })
    }

    /// Events recorded for one entity, oldest first
    pub fn events_for(&self, entity: EntityRef) -> Vec<&SimulationEvent> {
        self.events.iter().filter(|e| e.entity() == entity).collect()
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// === STATUS VIEWS ===

#[derive(Debug, Clone, Serialize)]
pub struct PersonNeedsView {
    pub id: PersonId,
    pub name: String,
    pub alive: bool,
    pub status: PersonStatus,
    pub location: BuildingId,
    pub home: Option<BuildingId>,
    pub workplace: Option<BuildingId>,
    pub consumption: f32,
    pub environment: f32,
    pub connection: f32,
    pub rest: f32,
    pub waste: f32,
    pub threat: f32,
    pub income: f32,
    pub stress: f32,
    pub safety: f32,
    pub relationship: f32,
    pub social: f32,
    pub community: f32,
    pub achievements: f32,
    pub progression: f32,
    pub level_adequacy: [f32; 5],
    pub most_pressing: Option<(NeedChannel, f32)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingStatusView {
    pub id: BuildingId,
    pub name: String,
    pub city: CityId,
    pub kind: BuildingKind,
    pub maintenance: f32,
    pub cleanliness: f32,
    pub occupants: u32,
    pub capacity: u32,
    pub efficiency_stage: u8,
    pub prestige_stage: u8,
    pub condemned: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityStatusView {
    pub id: CityId,
    pub name: String,
    pub valley: Valley,
    pub local_hour: u32,
    pub local_period: TimePeriod,
    pub population: u32,
    pub public_works: f32,
    pub tax_base: f32,
    pub tax_reserve: f32,
    pub stability: f32,
    pub health: f32,
    pub safety: f32,
    pub culture: f32,
    pub science: f32,
    pub prestige: f32,
    pub unemployment_rate: f32,
    pub average_happiness: f32,
    pub in_decline: bool,
    pub in_unrest: bool,
}

// === SHARED ACCESS ===

/// Handle for hosts that poll the autoticker from another thread
///
/// `tick` and `check_autotick` contend on one mutex with a single retry,
/// surfacing `SimError::Conflict` (transient, retry-safe) when two advances
/// race. Queries lock the same mutex, so they observe pre- or post-tick
/// snapshots only.
#[derive(Clone)]
pub struct SharedWorld {
    inner: Arc<Mutex<World>>,
}

impl SharedWorld {
    pub fn new(world: World) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    fn lock_with_retry(&self) -> Result<MutexGuard<'_, World>> {
        match self.inner.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::WouldBlock) => {
                std::thread::yield_now();
                self.inner.try_lock().map_err(|_| SimError::Conflict)
            }
            Err(TryLockError::Poisoned(_)) => Err(SimError::Conflict),
        }
    }

    pub fn tick(&self) -> Result<Vec<SimulationEvent>> {
        self.lock_with_retry()?.tick()
    }

    pub fn check_autotick(&self) -> Result<u64> {
        self.lock_with_retry()?.check_autotick()
    }

    pub fn check_autotick_at(&self, now_ms: i64) -> Result<u64> {
        self.lock_with_retry()?.check_autotick_at(now_ms)
    }

    /// Run a closure against a consistent world snapshot
    pub fn with<R>(&self, f: impl FnOnce(&World) -> R) -> Result<R> {
        let guard = self.lock_with_retry()?;
        Ok(f(&guard))
    }
}

// === SEEDING ===

const GIVEN_NAMES: &[&str] = &[
    "Asha", "Bren", "Caro", "Dain", "Eira", "Fenn", "Galia", "Hodd", "Imre", "Joss",
    "Kaede", "Lior", "Mina", "Nadir", "Oved", "Petra", "Quill", "Rosti", "Sef", "Tamsin",
];

const VALLEYS: &[Valley] = &[Valley::Day, Valley::Dusk, Valley::Night, Valley::Dawn];

/// Build a small self-sufficient town, deterministically from a seed
///
/// One city, enough homes for everyone, a mill, a tavern, a park and a
/// hospital; every person gets a home and most get mill jobs. Useful for
/// the CLI and for tests that want a live world without a seeding pipeline.
pub fn demo_world(seed: u64, people: usize) -> World {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut world = World::new();

    let valley = *VALLEYS.choose(&mut rng).unwrap_or(&Valley::Day);
    let city = world.spawn_city("Guild", valley);

    let homes_needed = people.div_ceil(4).max(1);
    let mut homes = Vec::with_capacity(homes_needed);
    for i in 0..homes_needed {
        let position = Position::new(
            rng.gen_range(-40.0_f32..40.0),
            rng.gen_range(-40.0_f32..40.0),
        );
        let home = world
            .spawn_building(
                &format!("Rowhouse {}", i + 1),
                city,
                BuildingKind::home(10.0),
                position,
                4,
            )
            .expect("city exists");
        homes.push(home);
    }

    let mill = world
        .spawn_building(
            "Old Mill",
            city,
            BuildingKind::workplace(5.0),
            Position::new(25.0, 0.0),
            people.max(4) as u32,
        )
        .expect("city exists");
    world
        .spawn_building(
            "Brass Tavern",
            city,
            BuildingKind::Restaurant,
            Position::new(5.0, 10.0),
            30,
        )
        .expect("city exists");
    world
        .spawn_building(
            "Riverside Green",
            city,
            BuildingKind::Park,
            Position::new(-10.0, 15.0),
            50,
        )
        .expect("city exists");
    world
        .spawn_building(
            "Infirmary",
            city,
            BuildingKind::Hospital,
            Position::new(0.0, -20.0),
            20,
        )
        .expect("city exists");

    for i in 0..people {
        let home = homes[i / 4];
        let name = format!(
            "{} {}",
            GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())],
            i + 1
        );
        let employed = rng.gen_bool(0.8);
        let id = world
            .spawn_person(&name, Some(home), employed.then_some(mill), home)
            .expect("seeded buildings exist");
        if let Some(person) = world.person_mut(id) {
            person.age = rng.gen_range(18..70);
            if rng.gen_bool(0.1) {
                person.role = *[SpecializedRole::Artist, SpecializedRole::Scientist]
                    .choose(&mut rng)
                    .unwrap_or(&SpecializedRole::None);
            }
        }
    }

    world
}
