//! Person records: the hourly-ticked entities of the simulation

use serde::{Deserialize, Serialize};

use crate::core::config::config;
use crate::core::types::{BuildingId, SimHour, PersonId};
use crate::entity::needs::{
    NeedChannel, SpecializedRole, INCOME_MAX, INCOME_MIN, L3_CAP, NEED_MAX,
};

/// What a person is currently doing, and until which hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PersonStatus {
    Idle,
    Working { until_hour: SimHour },
    Sleeping { until_hour: SimHour },
    Eating { until_hour: SimHour },
    Socializing { until_hour: SimHour },
    UsingFacilities { until_hour: SimHour },
    Maintaining { until_hour: SimHour, building: BuildingId },
    Cleaning { until_hour: SimHour, building: BuildingId },
    InTransit { until_hour: SimHour, to: BuildingId },
}

impl PersonStatus {
    pub fn until_hour(&self) -> Option<SimHour> {
        match self {
            PersonStatus::Idle => None,
            PersonStatus::Working { until_hour }
            | PersonStatus::Sleeping { until_hour }
            | PersonStatus::Eating { until_hour }
            | PersonStatus::Socializing { until_hour }
            | PersonStatus::UsingFacilities { until_hour }
            | PersonStatus::Maintaining { until_hour, .. }
            | PersonStatus::Cleaning { until_hour, .. }
            | PersonStatus::InTransit { until_hour, .. } => Some(*until_hour),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PersonStatus::Idle)
    }
}

/// A simulated person
///
/// Need channels live flat on the record; adequacy helpers aggregate them
/// per Maslow level. All mutation routes through the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub age: u32,
    pub home: Option<BuildingId>,
    pub workplace: Option<BuildingId>,
    pub location: BuildingId,
    pub role: SpecializedRole,
    pub status: PersonStatus,
    pub alive: bool,

    /// Relationship ledger backing the Level-3 channels; these do not decay
    pub partner: Option<PersonId>,
    pub friends: Vec<PersonId>,

    // Level 1: physiological (0-100)
    pub consumption: f32,
    pub environment: f32,
    pub connection: f32,
    pub rest: f32,
    /// Inverted: 0 is empty, 100 is overflowing
    pub waste: f32,

    // Level 2: safety and security
    /// Inverted: 0 is untroubled
    pub threat: f32,
    /// Own scale: debt to savings, see INCOME_MIN/INCOME_MAX
    pub income: f32,
    /// Inverted: 0 is calm
    pub stress: f32,
    pub safety: f32,

    // Level 3: belonging (each capped at L3_CAP)
    pub relationship: f32,
    pub social: f32,
    pub community: f32,

    // Level 4: esteem (20 per achievement)
    pub achievements: f32,

    // Level 5: self-actualization
    pub progression: f32,

    // Consecutive-hour threshold counters
    pub hours_starving: u32,
    pub hours_exhausted: u32,
    pub hours_insolvent: u32,
    /// Set when exhaustion forces sleep over whatever the resolver wants
    pub forced_rest: bool,

    pub shifts_worked: u32,

    pub last_update_hour: SimHour,
    pub birth_hour: SimHour,
}

impl Person {
    pub fn new(id: PersonId, name: String, location: BuildingId, birth_hour: SimHour) -> Self {
        Self {
            id,
            name,
            age: 25,
            home: None,
            workplace: None,
            location,
            role: SpecializedRole::None,
            status: PersonStatus::Idle,
            alive: true,

            partner: None,
            friends: Vec::new(),

            consumption: 70.0,
            environment: 80.0,
            connection: 50.0,
            rest: 80.0,
            waste: 20.0,

            threat: 20.0,
            income: 50.0,
            stress: 30.0,
            safety: 70.0,

            relationship: 0.0,
            social: 0.0,
            community: 20.0,

            achievements: 0.0,
            progression: 0.0,

            hours_starving: 0,
            hours_exhausted: 0,
            hours_insolvent: 0,
            forced_rest: false,

            shifts_worked: 0,

            last_update_hour: birth_hour,
            birth_hour,
        }
    }

    pub fn channel_value(&self, channel: NeedChannel) -> f32 {
        match channel {
            NeedChannel::Consumption => self.consumption,
            NeedChannel::Environment => self.environment,
            NeedChannel::Connection => self.connection,
            NeedChannel::Rest => self.rest,
            NeedChannel::Waste => self.waste,
            NeedChannel::Threat => self.threat,
            NeedChannel::Income => self.income,
            NeedChannel::Stress => self.stress,
            NeedChannel::Safety => self.safety,
            NeedChannel::Relationship => self.relationship,
            NeedChannel::Social => self.social,
            NeedChannel::Community => self.community,
            NeedChannel::Achievement => self.achievements,
            NeedChannel::Progression => self.progression,
        }
    }

    /// Average adequacy of Level 1 needs (inverted channels count as 100 - value)
    pub fn level_1_adequacy(&self) -> f32 {
        (self.consumption + self.environment + self.connection + self.rest + (NEED_MAX - self.waste))
            / 5.0
    }

    /// Average adequacy of Level 2 needs
    ///
    /// Income is an economic channel on its own scale and stays out of the
    /// gating aggregate.
    pub fn level_2_adequacy(&self) -> f32 {
        (self.safety + (NEED_MAX - self.threat) + (NEED_MAX - self.stress)) / 3.0
    }

    /// Level 3 aggregates as a sum: the three sub-channels cap at 33.3 each,
    /// so full belonging reads just under 100.
    pub fn level_3_adequacy(&self) -> f32 {
        self.relationship + self.social + self.community
    }

    pub fn level_4_adequacy(&self) -> f32 {
        self.achievements
    }

    pub fn level_adequacy(&self, level: u8) -> f32 {
        match level {
            1 => self.level_1_adequacy(),
            2 => self.level_2_adequacy(),
            3 => self.level_3_adequacy(),
            4 => self.level_4_adequacy(),
            _ => self.progression,
        }
    }

    /// Whether a level currently accepts fulfillment: every level below it
    /// must aggregate at or above the adequacy threshold.
    pub fn level_active(&self, level: u8) -> bool {
        let threshold = config().adequacy_threshold;
        match level {
            0 | 1 => true,
            2..=5 => {
                self.level_active(level - 1) && self.level_adequacy(level - 1) >= threshold
            }
            _ => false,
        }
    }

    /// Apply fulfillment to a channel, honoring level gating and clamps
    ///
    /// Returns the amount actually applied: zero when the level below is
    /// inadequate. Depletion never goes through here.
    pub fn fulfill(&mut self, channel: NeedChannel, amount: f32) -> f32 {
        if !self.level_active(channel.level()) {
            return 0.0;
        }
        let before = self.channel_value(channel);
        let raw = if channel.is_inverted() {
            before - amount
        } else {
            before + amount
        };
        let after = clamp_channel(channel, raw);
        self.set_channel(channel, after);
        (after - before).abs()
    }

    pub(crate) fn set_channel(&mut self, channel: NeedChannel, value: f32) {
        let value = clamp_channel(channel, value);
        match channel {
            NeedChannel::Consumption => self.consumption = value,
            NeedChannel::Environment => self.environment = value,
            NeedChannel::Connection => self.connection = value,
            NeedChannel::Rest => self.rest = value,
            NeedChannel::Waste => self.waste = value,
            NeedChannel::Threat => self.threat = value,
            NeedChannel::Income => self.income = value,
            NeedChannel::Stress => self.stress = value,
            NeedChannel::Safety => self.safety = value,
            NeedChannel::Relationship => self.relationship = value,
            NeedChannel::Social => self.social = value,
            NeedChannel::Community => self.community = value,
            NeedChannel::Achievement => self.achievements = value,
            NeedChannel::Progression => self.progression = value,
        }
    }

    /// Work output scaling from current needs, clamped to [0.1, 2.0]
    ///
    /// Hunger, exhaustion, bad surroundings, stress and fear all cut output;
    /// satisfied belonging, esteem and actualization grant bonuses.
    pub fn productivity(&self) -> f32 {
        let mut productivity: f32 = 1.0;

        if self.consumption < 30.0 {
            productivity *= 0.5;
        }
        if self.rest < 30.0 {
            productivity *= 0.6;
        }
        if self.environment < 40.0 {
            productivity *= 0.8;
        }

        if self.level_active(2) {
            if self.stress > 70.0 {
                productivity *= 0.7;
            }
            if self.safety < 40.0 {
                productivity *= 0.8;
            }
        }

        if self.level_active(3) && self.community > 20.0 {
            productivity *= 1.1;
        }
        if self.level_active(4) && self.achievements > 60.0 {
            productivity *= 1.2;
        }
        if self.level_active(5) && self.progression > 50.0 {
            productivity *= 1.3;
        }

        productivity.clamp(0.1, 2.0)
    }

    /// Record an earned achievement (20 points each, capped at 100)
    pub fn grant_achievement(&mut self) {
        self.achievements = (self.achievements + 20.0).min(NEED_MAX);
    }

    /// Recompute the ledger-backed Level-3 channels: a partner pins
    /// relationship at its cap, friends fill the social channel stepwise.
    pub fn refresh_bonds(&mut self) {
        self.relationship = if self.partner.is_some() { L3_CAP } else { 0.0 };
        let from_friends = self.friends.len() as f32 * (L3_CAP / 3.0);
        self.social = self.social.max(from_friends.min(L3_CAP));
    }
}

/// Clamp a value to the declared range of its channel
pub fn clamp_channel(channel: NeedChannel, value: f32) -> f32 {
    match channel {
        NeedChannel::Income => value.clamp(INCOME_MIN, INCOME_MAX),
        NeedChannel::Relationship | NeedChannel::Social | NeedChannel::Community => {
            value.clamp(0.0, L3_CAP)
        }
        _ => value.clamp(0.0, NEED_MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::BuildingId;

    fn test_person() -> Person {
        Person::new(PersonId(1), "Asha".into(), BuildingId(1), 0)
    }

    #[test]
    fn test_new_person_level_1_adequate() {
        let p = test_person();
        assert!(p.level_1_adequacy() >= 50.0);
        assert!(p.level_active(2));
    }

    #[test]
    fn test_gating_blocks_higher_fulfillment() {
        let mut p = test_person();
        p.consumption = 0.0;
        p.rest = 0.0;
        p.environment = 0.0;
        p.connection = 0.0;
        p.waste = 100.0;
        assert!(!p.level_active(2));

        let applied = p.fulfill(NeedChannel::Safety, 10.0);
        assert_eq!(applied, 0.0);
        assert_eq!(p.safety, 70.0);
    }

    #[test]
    fn test_fulfillment_clamps_at_max() {
        let mut p = test_person();
        p.consumption = 95.0;
        let applied = p.fulfill(NeedChannel::Consumption, 25.0);
        assert_eq!(p.consumption, 100.0);
        assert!((applied - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverted_fulfillment_reduces_value() {
        let mut p = test_person();
        p.waste = 80.0;
        p.fulfill(NeedChannel::Waste, 50.0);
        assert_eq!(p.waste, 30.0);
    }

    #[test]
    fn test_l3_channels_cap() {
        let mut p = test_person();
        // Make levels 1-2 adequate so fulfillment lands
        p.relationship = 0.0;
        let _ = p.fulfill(NeedChannel::Relationship, 50.0);
        assert!(p.relationship <= L3_CAP);
    }

    #[test]
    fn test_level_3_aggregates_as_sum() {
        let mut p = test_person();
        p.relationship = 33.3;
        p.social = 33.3;
        p.community = 33.3;
        assert!(p.level_3_adequacy() > 99.0);
    }

    #[test]
    fn test_productivity_penalties_stack() {
        let mut p = test_person();
        p.consumption = 10.0;
        p.rest = 10.0;
        let hungry_tired = p.productivity();
        assert!((hungry_tired - 0.3).abs() < 0.05);
    }
}
