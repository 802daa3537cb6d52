//! Cost model: how many points a unit is worth

use crate::unit::Stats;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Share of `reach * power` charged on top of the individual stat costs
const SYNERGY_FACTOR: f64 = 0.1;

/// Tunable cost parameters. These are the eight genes the balancer evolves.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Costs {
    pub health_factor: f64,
    pub reach_factor: f64,
    pub reach_exponent: f64,
    pub move_factor: f64,
    pub move_exponent: f64,
    pub power_factor: f64,
    pub power_exponent: f64,
    /// Most points a single unit may be worth
    pub max_total: f64,
}

impl Default for Costs {
    fn default() -> Self {
        Self {
            health_factor: 1.0,
            reach_factor: 2.0,
            reach_exponent: 1.1,
            move_factor: 1.0,
            move_exponent: 1.1,
            power_factor: 3.0,
            power_exponent: 1.2,
            max_total: 30.0,
        }
    }
}

impl Costs {
    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading cost model {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing cost model {}", path.display()))
    }

    /// Point cost of a unit with the given stats and summed ability cost.
    /// Always rounded up to a whole number of points.
    pub fn total_cost(&self, stats: &Stats, ability_cost: f64) -> f64 {
        let health = stats.health as f64 * self.health_factor;
        let reach = exponential_cost(stats.reach, self.reach_factor, self.reach_exponent);
        let movement = exponential_cost(stats.move_range, self.move_factor, self.move_exponent);
        let power = exponential_cost(stats.power, self.power_factor, self.power_exponent);
        let synergy = (stats.reach as f64 * self.reach_factor)
            * (stats.power as f64 * self.power_factor)
            * SYNERGY_FACTOR;

        (health + reach + movement + power + synergy + ability_cost).ceil()
    }
}

/// `value * factor * exponent^(value - 1)`
pub fn exponential_cost(value: i32, factor: f64, exponent: f64) -> f64 {
    value as f64 * factor * exponent.powi(value - 1)
}
