//! Need channels and the Maslow-level structure that gates them

use serde::{Deserialize, Serialize};

/// Upper bound for ordinary need channels
pub const NEED_MAX: f32 = 100.0;
/// Cap for each Level-3 sub-channel (relationship, social, community)
pub const L3_CAP: f32 = 33.3;
/// Income runs on its own scale: savings accumulate above 100, debt bottoms out here
pub const INCOME_MIN: f32 = -100.0;
pub const INCOME_MAX: f32 = 1000.0;
/// Income below this line counts as insolvent
pub const INSOLVENCY_LINE: f32 = 0.0;

/// One scalar dimension of a person's well-being
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeedChannel {
    // Level 1: physiological
    Consumption,
    Environment,
    Connection,
    Rest,
    Waste,
    // Level 2: safety and security
    Threat,
    Income,
    Stress,
    Safety,
    // Level 3: belonging
    Relationship,
    Social,
    Community,
    // Level 4: esteem
    Achievement,
    // Level 5: self-actualization
    Progression,
}

/// The five fundamental needs locations can fulfil
///
/// Every channel maps onto one of these when the resolver goes looking for
/// a place to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundamentalNeed {
    Environment,
    Consumption,
    Connection,
    Rest,
    Waste,
}

impl NeedChannel {
    /// Maslow tier this channel belongs to
    pub fn level(&self) -> u8 {
        match self {
            NeedChannel::Consumption
            | NeedChannel::Environment
            | NeedChannel::Connection
            | NeedChannel::Rest
            | NeedChannel::Waste => 1,
            NeedChannel::Threat
            | NeedChannel::Income
            | NeedChannel::Stress
            | NeedChannel::Safety => 2,
            NeedChannel::Relationship | NeedChannel::Social | NeedChannel::Community => 3,
            NeedChannel::Achievement => 4,
            NeedChannel::Progression => 5,
        }
    }

    /// Inverted channels read high when things are bad (waste piles up,
    /// stress and threat build); fulfillment drives them down.
    pub fn is_inverted(&self) -> bool {
        matches!(
            self,
            NeedChannel::Waste | NeedChannel::Stress | NeedChannel::Threat
        )
    }

    /// Fixed urgency weight for priority resolution
    pub fn urgency_weight(&self) -> f32 {
        match self {
            NeedChannel::Waste => 10.0,
            NeedChannel::Consumption => 8.0,
            NeedChannel::Rest => 7.0,
            NeedChannel::Safety | NeedChannel::Threat => 6.0,
            NeedChannel::Income => 5.0,
            NeedChannel::Environment => 4.0,
            NeedChannel::Stress => 3.0,
            NeedChannel::Connection
            | NeedChannel::Relationship
            | NeedChannel::Social
            | NeedChannel::Community => 2.0,
            NeedChannel::Achievement | NeedChannel::Progression => 1.0,
        }
    }

    /// Which fundamental need a location must provide to act on this channel
    pub fn fundamental(&self) -> FundamentalNeed {
        match self {
            NeedChannel::Consumption => FundamentalNeed::Consumption,
            NeedChannel::Rest => FundamentalNeed::Rest,
            NeedChannel::Waste => FundamentalNeed::Waste,
            NeedChannel::Connection
            | NeedChannel::Relationship
            | NeedChannel::Social
            | NeedChannel::Community
            | NeedChannel::Stress => FundamentalNeed::Connection,
            // Safety, threat, income, environment and the top tiers resolve
            // through environment-grade locations (home, healthcare, work).
            _ => FundamentalNeed::Environment,
        }
    }
}

/// Specialized roles a self-actualized person can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecializedRole {
    None,
    Artist,
    Scientist,
    Leader,
    Educator,
    Healer,
}
