//! Gene layout of a cost model and per-gene bounds

use std::fmt;

use escarmouche_core::Costs;
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// Genes
// ============================================================================

/// One tunable parameter of [`Costs`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gene {
    HealthFactor,
    ReachFactor,
    ReachExponent,
    MoveFactor,
    MoveExponent,
    PowerFactor,
    PowerExponent,
    MaxTotal,
}

/// Inclusive value range
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.min + rng.gen::<f64>() * (self.max - self.min)
    }
}

/// How a gene is seeded, perturbed, and bounded
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneBounds {
    /// Uniform range for the initial population
    pub seed: Range,
    /// Full width of the mutation noise, centred on zero
    pub noise: f64,
    /// Valid range; every produced value lies inside it
    pub valid: Range,
}

impl Gene {
    pub const ALL: [Gene; 8] = [
        Gene::HealthFactor,
        Gene::ReachFactor,
        Gene::ReachExponent,
        Gene::MoveFactor,
        Gene::MoveExponent,
        Gene::PowerFactor,
        Gene::PowerExponent,
        Gene::MaxTotal,
    ];

    pub fn bounds(self) -> GeneBounds {
        let (seed, noise, valid) = match self {
            Gene::HealthFactor => (Range::new(0.5, 2.5), 0.2, Range::new(0.1, 5.0)),
            Gene::ReachFactor => (Range::new(1.0, 4.0), 0.4, Range::new(0.1, 8.0)),
            Gene::ReachExponent => (Range::new(1.0, 1.5), 0.1, Range::new(1.0, 2.0)),
            Gene::MoveFactor => (Range::new(0.5, 2.5), 0.2, Range::new(0.1, 5.0)),
            Gene::MoveExponent => (Range::new(1.0, 1.5), 0.1, Range::new(1.0, 2.0)),
            Gene::PowerFactor => (Range::new(1.0, 5.0), 0.4, Range::new(0.1, 10.0)),
            Gene::PowerExponent => (Range::new(1.0, 1.5), 0.1, Range::new(1.0, 2.0)),
            Gene::MaxTotal => (Range::new(20.0, 40.0), 4.0, Range::new(10.0, 60.0)),
        };
        GeneBounds { seed, noise, valid }
    }

    pub fn name(self) -> &'static str {
        match self {
            Gene::HealthFactor => "health_factor",
            Gene::ReachFactor => "reach_factor",
            Gene::ReachExponent => "reach_exponent",
            Gene::MoveFactor => "move_factor",
            Gene::MoveExponent => "move_exponent",
            Gene::PowerFactor => "power_factor",
            Gene::PowerExponent => "power_exponent",
            Gene::MaxTotal => "max_total",
        }
    }

    pub fn get(self, costs: &Costs) -> f64 {
        match self {
            Gene::HealthFactor => costs.health_factor,
            Gene::ReachFactor => costs.reach_factor,
            Gene::ReachExponent => costs.reach_exponent,
            Gene::MoveFactor => costs.move_factor,
            Gene::MoveExponent => costs.move_exponent,
            Gene::PowerFactor => costs.power_factor,
            Gene::PowerExponent => costs.power_exponent,
            Gene::MaxTotal => costs.max_total,
        }
    }

    pub fn get_mut(self, costs: &mut Costs) -> &mut f64 {
        match self {
            Gene::HealthFactor => &mut costs.health_factor,
            Gene::ReachFactor => &mut costs.reach_factor,
            Gene::ReachExponent => &mut costs.reach_exponent,
            Gene::MoveFactor => &mut costs.move_factor,
            Gene::MoveExponent => &mut costs.move_exponent,
            Gene::PowerFactor => &mut costs.power_factor,
            Gene::PowerExponent => &mut costs.power_exponent,
            Gene::MaxTotal => &mut costs.max_total,
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Individuals
// ============================================================================

/// A candidate cost model and its last measured fitness
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub costs: Costs,
    /// 0 until evaluated
    pub fitness: f64,
}

impl Individual {
    pub fn new(costs: Costs) -> Self {
        Self { costs, fitness: 0.0 }
    }

    /// Every gene drawn uniformly from its seed range
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut costs = Costs::default();
        for gene in Gene::ALL {
            *gene.get_mut(&mut costs) = gene.bounds().seed.sample(rng);
        }
        Self::new(costs)
    }
}

/// True if every gene of `costs` lies in its valid range
pub fn in_bounds(costs: &Costs) -> bool {
    Gene::ALL
        .iter()
        .all(|gene| gene.bounds().valid.contains(gene.get(costs)))
}
