use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::variables::{Fuzzified, VariableId, VariableSet};

/// Label accepted by any clause to mean "this variable does not matter".
pub const ANY_LABEL: &str = "any";

/// Rule output as written in a policy document.
///
/// A band is reduced to its midpoint when the rule base is compiled, so inference
/// and defuzzification only ever see scalars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Consequent {
    Scalar(f64),
    Band { min: f64, max: f64 },
}

impl Consequent {
    pub fn crisp(&self) -> f64 {
        match *self {
            Consequent::Scalar(value) => value,
            Consequent::Band { min, max } => min + (max - min) / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseSpec {
    pub variable: VariableId,
    pub label: String,
}

impl ClauseSpec {
    pub fn new(variable: VariableId, label: impl Into<String>) -> Self {
        Self {
            variable,
            label: label.into(),
        }
    }
}

/// Declarative rule: the conjunction of `when` implies `then`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub when: Vec<ClauseSpec>,
    pub then: Consequent,
}

impl RuleSpec {
    pub fn new(when: Vec<ClauseSpec>, then: Consequent) -> Self {
        Self { when, then }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum LabelRef {
    Any,
    Index(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    variable: VariableId,
    label: LabelRef,
}

/// Compiled rule with label references resolved against the variable set.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    index: usize,
    clauses: Vec<Clause>,
    consequent: f64,
    description: String,
}

impl Rule {
    /// Position of the rule in the policy document, starting at 1.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn consequent(&self) -> f64 {
        self.consequent
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn strength(&self, fuzzified: &Fuzzified) -> f64 {
        self.clauses
            .iter()
            .map(|clause| match clause.label {
                LabelRef::Any => 1.0,
                LabelRef::Index(index) => fuzzified.degree(clause.variable, index),
            })
            .fold(1.0, f64::min)
    }
}

/// A rule paired with its firing strength for one inference call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activation<'a> {
    pub rule: &'a Rule,
    pub strength: f64,
}

impl Activation<'_> {
    /// Descending strength, ties kept in rule order.
    pub fn explanation_order(a: &Self, b: &Self) -> Ordering {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.rule.index.cmp(&b.rule.index))
    }
}

/// Ordered, immutable rule collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBase {
    rules: Vec<Rule>,
}

impl RuleBase {
    pub fn compile(specs: &[RuleSpec], variables: &VariableSet) -> Result<Self, RuleError> {
        if specs.is_empty() {
            return Err(RuleError::Empty);
        }

        let mut rules = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let consequent = match spec.then {
                Consequent::Scalar(value) if !value.is_finite() => {
                    return Err(RuleError::InvalidConsequent { rule: index + 1 })
                }
                Consequent::Band { min, max } if !min.is_finite() || !max.is_finite() || max < min => {
                    return Err(RuleError::InvalidConsequent { rule: index + 1 })
                }
                other => other.crisp(),
            };

            let mut clauses = Vec::with_capacity(spec.when.len());
            let mut parts = Vec::with_capacity(spec.when.len());
            for clause in &spec.when {
                let variable = variables.get(clause.variable).ok_or(RuleError::UnknownVariable {
                    rule: index + 1,
                    variable: clause.variable,
                })?;
                let label = if clause.label == ANY_LABEL {
                    LabelRef::Any
                } else {
                    let position = variable.label_index(&clause.label).ok_or_else(|| {
                        RuleError::UnknownLabel {
                            rule: index + 1,
                            variable: clause.variable,
                            label: clause.label.clone(),
                        }
                    })?;
                    LabelRef::Index(position)
                };
                parts.push(format!("{} is {}", clause.variable.label(), clause.label));
                clauses.push(Clause {
                    variable: clause.variable,
                    label,
                });
            }

            let condition = if parts.is_empty() {
                "always".to_string()
            } else {
                parts.join(" and ")
            };
            rules.push(Rule {
                index,
                clauses,
                consequent,
                description: format!("R{}: if {} then {}", index + 1, condition, consequent),
            });
        }

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Every rule with a positive firing strength, in rule order.
    pub fn evaluate(&self, fuzzified: &Fuzzified) -> Vec<Activation<'_>> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let strength = rule.strength(fuzzified);
                (strength > 0.0).then_some(Activation { rule, strength })
            })
            .collect()
    }
}

/// Construction-time defects in the rule base.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("rule base is empty")]
    Empty,
    #[error("rule {rule} references undeclared variable {}", .variable.label())]
    UnknownVariable { rule: usize, variable: VariableId },
    #[error("rule {rule} references unknown label '{label}' of {}", .variable.label())]
    UnknownLabel {
        rule: usize,
        variable: VariableId,
        label: String,
    },
    #[error("rule {rule} has a non-finite consequent or an inverted band")]
    InvalidConsequent { rule: usize },
}
