//! Fuzzy rule inference
//!
//! A [`RuleBook`] declares linguistic variables (each a set of named terms
//! with a membership shape) and `when ... then ...` rules over them. The
//! [`FuzzyEngine`] evaluates rules with min for conjunction and max for
//! aggregation and reports, for every output variable, the truth degree of
//! each of its terms. Turning that into a crisp value is left to the caller.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Crisp input values by variable name
pub type Values = BTreeMap<String, f64>;

// ============================================================================
// RULE BOOK
// ============================================================================

/// Membership function of a term
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    /// 1 up to `full`, falling to 0 at `zero`
    LeftShoulder { full: f64, zero: f64 },
    /// 0 at `left`, 1 at `peak`, 0 at `right`
    Triangle { left: f64, peak: f64, right: f64 },
    /// 0 up to `zero`, rising to 1 at `full`
    RightShoulder { zero: f64, full: f64 },
}

impl Shape {
    /// Degree of membership of `x`, in [0, 1]
    pub fn membership(&self, x: f64) -> f64 {
        let degree = match *self {
            Shape::LeftShoulder { full, zero } => {
                if x <= full {
                    1.0
                } else if x >= zero {
                    0.0
                } else {
                    (zero - x) / (zero - full)
                }
            }
            Shape::Triangle { left, peak, right } => {
                if x <= left || x >= right {
                    if x == peak {
                        1.0
                    } else {
                        0.0
                    }
                } else if x <= peak {
                    (x - left) / (peak - left)
                } else {
                    (right - x) / (right - peak)
                }
            }
            Shape::RightShoulder { zero, full } => {
                if x >= full {
                    1.0
                } else if x <= zero {
                    0.0
                } else {
                    (x - zero) / (full - zero)
                }
            }
        };
        degree.clamp(0.0, 1.0)
    }
}

/// A named term of a variable
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    #[serde(flatten)]
    pub shape: Shape,
}

/// A linguistic variable
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub terms: Vec<Term>,
}

/// `variable is term`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub variable: String,
    pub term: String,
}

/// `when a is x and b is y then c is z`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub when: Vec<Clause>,
    pub then: Clause,
}

/// Variables and rules, as loaded from JSON
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    pub variables: Vec<Variable>,
    pub rules: Vec<Rule>,
}

impl RuleBook {
    pub fn from_json(json: &str) -> Result<Self, FuzzyError> {
        serde_json::from_str(json).map_err(|e| FuzzyError::Parse(e.to_string()))
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading rule book {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing rule book {}", path.display()))
    }

    /// Rules for the strategic preferences of a unit in play
    pub fn strategy() -> Result<Self, FuzzyError> {
        Self::from_json(include_str!("../data/strategy_rules.json"))
    }

    /// Rules mapping unit cost and expertise to a rank
    pub fn ranking() -> Result<Self, FuzzyError> {
        Self::from_json(include_str!("../data/rank_rules.json"))
    }

    fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FuzzyError {
    #[error("could not parse rule book: {0}")]
    Parse(String),
    #[error("rule {rule} refers to unknown variable {variable:?}")]
    UnknownVariable { rule: usize, variable: String },
    #[error("rule {rule} refers to unknown term {term:?} of {variable:?}")]
    UnknownTerm { rule: usize, variable: String, term: String },
    #[error("no value given for input variable {0:?}")]
    MissingInput(String),
    #[error("input {variable:?} is not a number: {value}")]
    InvalidInput { variable: String, value: f64 },
}

// ============================================================================
// INFERENCE
// ============================================================================

/// Truth degree of every term of every output variable
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inference {
    outputs: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Inference {
    /// Term truths of one output variable
    pub fn variable(&self, name: &str) -> Option<&BTreeMap<String, f64>> {
        self.outputs.get(name)
    }

    /// Truth of `variable is term`, 0 if it never fired
    pub fn truth(&self, variable: &str, term: &str) -> f64 {
        self.outputs
            .get(variable)
            .and_then(|terms| terms.get(term))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Anything that can turn crisp inputs into term truths
pub trait RuleEngine: Send + Sync {
    fn infer(&self, values: &Values) -> Result<Inference, FuzzyError>;
}

/// Mamdani-style min/max evaluation of a validated [`RuleBook`]
#[derive(Clone, Debug)]
pub struct FuzzyEngine {
    book: RuleBook,
}

impl FuzzyEngine {
    /// Build an engine, checking that every rule refers to known variables
    /// and terms
    pub fn new(book: RuleBook) -> Result<Self, FuzzyError> {
        for (index, rule) in book.rules.iter().enumerate() {
            for clause in rule.when.iter().chain(std::iter::once(&rule.then)) {
                let variable = book.variable(&clause.variable).ok_or_else(|| {
                    FuzzyError::UnknownVariable {
                        rule: index,
                        variable: clause.variable.clone(),
                    }
                })?;
                if !variable.terms.iter().any(|t| t.name == clause.term) {
                    return Err(FuzzyError::UnknownTerm {
                        rule: index,
                        variable: clause.variable.clone(),
                        term: clause.term.clone(),
                    });
                }
            }
        }
        Ok(Self { book })
    }

    pub fn strategy() -> Result<Self, FuzzyError> {
        Self::new(RuleBook::strategy()?)
    }

    pub fn ranking() -> Result<Self, FuzzyError> {
        Self::new(RuleBook::ranking()?)
    }

    pub fn rule_book(&self) -> &RuleBook {
        &self.book
    }

    fn clause_truth(&self, clause: &Clause, values: &Values) -> Result<f64, FuzzyError> {
        let value = *values
            .get(&clause.variable)
            .ok_or_else(|| FuzzyError::MissingInput(clause.variable.clone()))?;
        if value.is_nan() {
            return Err(FuzzyError::InvalidInput {
                variable: clause.variable.clone(),
                value,
            });
        }
        // Validated in new()
        let truth = self
            .book
            .variable(&clause.variable)
            .and_then(|v| v.terms.iter().find(|t| t.name == clause.term))
            .map_or(0.0, |t| t.shape.membership(value));
        Ok(truth)
    }
}

impl RuleEngine for FuzzyEngine {
    fn infer(&self, values: &Values) -> Result<Inference, FuzzyError> {
        let mut inference = Inference::default();

        for rule in &self.book.rules {
            let mut strength: f64 = 1.0;
            for clause in &rule.when {
                strength = strength.min(self.clause_truth(clause, values)?);
            }

            let slot = inference
                .outputs
                .entry(rule.then.variable.clone())
                .or_default()
                .entry(rule.then.term.clone())
                .or_insert(0.0);
            *slot = slot.max(strength);
        }

        Ok(inference)
    }
}
