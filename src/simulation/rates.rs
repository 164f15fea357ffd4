//! Rate and threshold constant tables
//!
//! Signed per-unit rates: negative depletes, positive replenishes. Person
//! rates are per hour, building rates per day, city rates per weekly pass.

/// Person-level rates (per hour)
pub mod person {
    // Level 1: physiological
    pub const CONSUMPTION_IDLE: f32 = -2.0;
    pub const CONSUMPTION_WORKING: f32 = -3.0;
    pub const CONSUMPTION_SLEEPING: f32 = -1.5;

    pub const ENVIRONMENT_NEUTRAL: f32 = -1.0;
    /// Hazardous locations triple the neutral depletion
    pub const ENVIRONMENT_HAZARD_MULTIPLIER: f32 = 3.0;
    pub const ENVIRONMENT_HEALING: f32 = 0.5;

    pub const CONNECTION_BASE: f32 = -0.5;

    /// Rest depletes at this rate except while asleep; action deltas
    /// (work fatigue, sleep recovery) land separately in the executor
    pub const REST_IDLE: f32 = -1.5;
    /// Extra rest drain per 10 points of stress
    pub const STRESS_TO_REST_FACTOR: f32 = -0.1;

    pub const WASTE_ACCUMULATION: f32 = 2.0;

    // Level 2: safety and security (threat and stress are inverted: these
    // rates move the raw value, so negative means calming down)
    pub const THREAT_DECAY: f32 = -0.5;
    pub const THREAT_HAZARDOUS: f32 = 2.0;
    pub const THREAT_SAFE_BUILDING: f32 = -1.0;

    pub const INCOME_LIVING_COST: f32 = -0.2;
    /// Extra safety drain per hour while insolvent
    pub const INSOLVENT_SAFETY_LOSS: f32 = -0.5;
    pub const INSOLVENT_STRESS_GAIN: f32 = 0.5;

    pub const STRESS_RECOVERY: f32 = -0.3;

    pub const SAFETY_BASE: f32 = -0.2;
    pub const SAFETY_AT_HOME: f32 = 1.0;
    pub const SAFETY_SAFE_LOCATION: f32 = 0.5;
    pub const SAFETY_UNSAFE_AREA: f32 = -2.0;

    // Level 3: belonging
    pub const COMMUNITY_BASE: f32 = -0.3;
    pub const COMMUNITY_SOCIALIZING: f32 = 3.0;

    // Level 5: self-actualization
    pub const PROGRESSION_MEANINGFUL_WORK: f32 = 0.5;
}

/// Building-level rates (per day)
pub mod building {
    pub const MAINTENANCE_BASE: f32 = -2.0;
    pub const MAINTENANCE_PER_OCCUPANT: f32 = -0.5;
    pub const CLEANLINESS_BASE: f32 = -3.0;
    pub const CLEANLINESS_PER_OCCUPANT: f32 = -1.0;

    pub const CONSUMPTION_BASE: f32 = 10.0;
    pub const CONSUMPTION_PER_WORKER: f32 = 5.0;
    pub const PRODUCTION_BASE: f32 = 5.0;
    pub const PRODUCTION_PER_WORKER: f32 = 10.0;
    pub const MAX_INVENTORY: f32 = 1000.0;
    pub const MAX_STOCKPILE: f32 = 1000.0;

    /// Stockpile granted per starved workplace when a city imports
    pub const IMPORT_RESTOCK: f32 = 100.0;
}

/// City-level rates (per weekly pass)
pub mod city {
    pub const PUBLIC_WORKS_PER_RESIDENT: f32 = -0.01;
    pub const SERVICE_COST_PER_100: f32 = 1.0;
    pub const IMPORT_COST: f32 = 10.0;
    pub const EXPORT_REVENUE: f32 = 15.0;
    pub const STABILITY_PER_STRESSED: f32 = 0.1;
    /// Stability bonus when unemployment stays under 5%
    pub const FULL_EMPLOYMENT_BONUS: f32 = 10.0;
    pub const ARTIST_CULTURE_RATE: f32 = 0.5;
    pub const SCIENTIST_SCIENCE_RATE: f32 = 0.3;
    /// Prestige granted per self-actualized resident (progression > 80)
    pub const SELF_ACTUALIZED_PRESTIGE: f32 = 5.0;
}

/// Action durations and deltas
pub mod action {
    pub const MOVE_REST_COST_PER_HOUR: f32 = -2.0;

    pub const WORK_DURATION: u64 = 8;
    pub const WORK_REST_COST: f32 = -16.0;
    pub const WORK_STRESS_GAIN: f32 = 5.0;
    pub const WORK_INCOME_GAIN: f32 = 40.0;

    pub const SLEEP_DURATION: u64 = 8;
    pub const SLEEP_REST_GAIN: f32 = 64.0;

    pub const EAT_DURATION: u64 = 1;
    pub const EAT_CONSUMPTION_GAIN: f32 = 25.0;
    pub const MEAL_COST: f32 = 5.0;

    pub const SOCIALIZE_DURATION: u64 = 2;
    pub const SOCIALIZE_SOCIAL_GAIN: f32 = 10.0;
    pub const SOCIALIZE_CONNECTION_GAIN: f32 = 10.0;
    pub const SOCIALIZE_STRESS_RELIEF: f32 = 5.0;

    pub const FACILITIES_DURATION: u64 = 1;
    pub const FACILITIES_WASTE_RELIEF: f32 = 50.0;

    pub const MAINTAIN_DURATION: u64 = 4;
    pub const MAINTAIN_GAIN: f32 = 20.0;

    pub const CLEAN_DURATION: u64 = 2;
    pub const CLEAN_GAIN: f32 = 30.0;
}

/// Threshold values and durations for hard transitions
pub mod thresholds {
    /// A channel counts as met at or above this; the resolver only acts below it
    pub const NEED_ADEQUATE: f32 = 50.0;
    /// A channel is critically low below this
    pub const NEED_CRITICAL_LOW: f32 = 20.0;
    /// Waste is critical above this
    pub const WASTE_CRITICAL: f32 = 80.0;
    /// Stress counts as "stressed" for city stability above this
    pub const STRESS_CRITICAL: f32 = 70.0;
    /// Income below this bleeds safety and adds stress
    pub const INCOME_CRITICAL: f32 = 10.0;

    /// Consecutive hours at consumption 0 before death
    pub const STARVATION_HOURS: u32 = 24;
    /// Consecutive hours at rest 0 before forced rest
    pub const EXHAUSTION_HOURS: u32 = 48;
    /// Consecutive hours insolvent (income below 0) before eviction
    pub const INSOLVENCY_HOURS: u32 = 168;
    /// Consecutive days at maintenance 0 before condemnation
    pub const CONDEMNATION_DAYS: u32 = 30;
    /// Consecutive weeks with a negative reserve before decline
    pub const DECLINE_WEEKS: u32 = 4;
    /// Consecutive weeks under this stability before unrest
    pub const UNREST_STABILITY: f32 = 20.0;
    pub const UNREST_WEEKS: u32 = 2;
}

/// Upgrade track constants
pub mod upgrades {
    /// Banked work-hours needed per efficiency stage
    pub const EFFICIENCY_STAGE_HOURS: f32 = 100.0;
    /// Banked work-hours needed per prestige stage
    pub const PRESTIGE_STAGE_HOURS: f32 = 200.0;
    /// Share of daily worker-hours banked toward each upgrade track
    pub const UPGRADE_HOURS_SHARE: f32 = 0.1;
}
