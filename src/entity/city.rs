//! City records: the weekly-ticked aggregates of the simulation

use serde::{Deserialize, Serialize};

use crate::core::calendar::Valley;
use crate::core::types::{CityId, SimHour};

/// A simulated city
///
/// Most fields are aggregates recomputed by the weekly cascade; only
/// `public_works` feeds back down to buildings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub valley: Valley,
    pub founded_hour: SimHour,

    /// Count of persons whose home lies in this city; recomputed weekly
    pub population: u32,

    // Infrastructure and economy
    /// 0-100, infrastructure health
    pub public_works: f32,
    pub tax_base: f32,
    pub tax_reserve: f32,
    pub import_rate: f32,
    pub export_rate: f32,

    // Safety and social cohesion (0-100)
    pub stability: f32,
    pub health: f32,
    pub safety: f32,

    // Development (cumulative)
    pub culture: f32,
    pub science: f32,
    pub prestige: f32,

    // Derived metrics
    pub unemployment_rate: f32,
    pub average_happiness: f32,

    // Threshold counters and states
    pub weeks_in_deficit: u32,
    pub weeks_low_stability: u32,
    pub in_decline: bool,
    pub in_unrest: bool,

    pub last_update_hour: SimHour,
}

impl City {
    pub fn new(id: CityId, name: String, valley: Valley, founded_hour: SimHour) -> Self {
        Self {
            id,
            name,
            valley,
            founded_hour,
            population: 0,

            public_works: 100.0,
            tax_base: 0.0,
            tax_reserve: 1000.0,
            import_rate: 0.0,
            export_rate: 0.0,

            stability: 100.0,
            health: 100.0,
            safety: 100.0,

            culture: 0.0,
            science: 0.0,
            prestige: 0.0,

            unemployment_rate: 0.0,
            average_happiness: 70.0,

            weeks_in_deficit: 0,
            weeks_low_stability: 0,
            in_decline: false,
            in_unrest: false,

            last_update_hour: founded_hour,
        }
    }

    /// Multiplier city infrastructure applies to building maintenance decay
    ///
    /// Healthy infrastructure (100) halves wear; collapsed infrastructure
    /// (0) doubles it.
    pub fn maintenance_multiplier(&self) -> f32 {
        2.0 - self.public_works / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maintenance_multiplier_range() {
        let mut city = City::new(CityId(1), "Aira".into(), Valley::Night, 0);
        assert!((city.maintenance_multiplier() - 1.0).abs() < 1e-6);
        city.public_works = 0.0;
        assert!((city.maintenance_multiplier() - 2.0).abs() < 1e-6);
        city.public_works = 50.0;
        assert!((city.maintenance_multiplier() - 1.5).abs() < 1e-6);
    }
}
