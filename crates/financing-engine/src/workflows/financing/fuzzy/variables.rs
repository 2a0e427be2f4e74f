use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::membership::{MembershipShape, ShapeError};

/// Linguistic variables consumed by the rule base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableId {
    IncomeLevel,
    PaymentToIncome,
    OtherDebtToIncome,
    DownPaymentRatio,
    RequestedAmount,
    LoanToIncome,
}

impl VariableId {
    pub const fn label(self) -> &'static str {
        match self {
            VariableId::IncomeLevel => "income_level",
            VariableId::PaymentToIncome => "payment_to_income",
            VariableId::OtherDebtToIncome => "other_debt_to_income",
            VariableId::DownPaymentRatio => "down_payment_ratio",
            VariableId::RequestedAmount => "requested_amount",
            VariableId::LoanToIncome => "loan_to_income",
        }
    }
}

/// A labelled membership function, e.g. `"high"` over income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzySet {
    pub label: String,
    pub shape: MembershipShape,
}

impl FuzzySet {
    pub fn new(label: impl Into<String>, shape: MembershipShape) -> Self {
        Self {
            label: label.into(),
            shape,
        }
    }

    pub fn degree(&self, x: f64) -> f64 {
        self.shape.degree(x)
    }
}

/// Inclusive range inputs are clamped into before fuzzification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub fn clamp(&self, x: f64) -> f64 {
        if x.is_nan() {
            x
        } else {
            x.clamp(self.min, self.max)
        }
    }
}

/// Named variable with ordered labels over a numeric domain.
///
/// When the input value is absent the variable reports `neutral_label` at full
/// degree (every other label at zero); without a neutral label every degree is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyVariable {
    pub id: VariableId,
    pub domain: Domain,
    pub sets: Vec<FuzzySet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral_label: Option<String>,
}

impl FuzzyVariable {
    pub fn new(id: VariableId, domain: Domain, sets: Vec<FuzzySet>) -> Self {
        Self {
            id,
            domain,
            sets,
            neutral_label: None,
        }
    }

    pub fn with_neutral_label(mut self, label: impl Into<String>) -> Self {
        self.neutral_label = Some(label.into());
        self
    }

    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.sets.iter().position(|set| set.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|set| set.label.as_str())
    }

    /// Degrees for every label, in label order.
    pub fn degree_vector(&self, value: Option<f64>) -> Vec<f64> {
        match value {
            Some(x) => {
                let x = self.domain.clamp(x);
                self.sets.iter().map(|set| set.degree(x)).collect()
            }
            None => self
                .sets
                .iter()
                .map(|set| {
                    if self.neutral_label.as_deref() == Some(set.label.as_str()) {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect(),
        }
    }

    /// Label to degree mapping, mainly for explanations and tests.
    pub fn degrees(&self, value: Option<f64>) -> BTreeMap<String, f64> {
        self.sets
            .iter()
            .map(|set| set.label.clone())
            .zip(self.degree_vector(value))
            .collect()
    }

    pub(crate) fn validate(&self) -> Result<(), VariableError> {
        if self.sets.is_empty() {
            return Err(VariableError::NoLabels(self.id));
        }
        if !self.domain.min.is_finite()
            || !self.domain.max.is_finite()
            || self.domain.max < self.domain.min
        {
            return Err(VariableError::InvalidDomain(self.id));
        }
        for (index, set) in self.sets.iter().enumerate() {
            if self.sets[..index].iter().any(|other| other.label == set.label) {
                return Err(VariableError::DuplicateLabel {
                    variable: self.id,
                    label: set.label.clone(),
                });
            }
            set.shape
                .validate()
                .map_err(|source| VariableError::Shape {
                    variable: self.id,
                    label: set.label.clone(),
                    source,
                })?;
        }
        if let Some(neutral) = &self.neutral_label {
            if self.label_index(neutral).is_none() {
                return Err(VariableError::UnknownNeutralLabel {
                    variable: self.id,
                    label: neutral.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Construction-time defects in a variable definition.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VariableError {
    #[error("variable {} declares no labels", .0.label())]
    NoLabels(VariableId),
    #[error("variable {} has an empty or non-finite domain", .0.label())]
    InvalidDomain(VariableId),
    #[error("variable {} declares label '{label}' twice", .variable.label())]
    DuplicateLabel { variable: VariableId, label: String },
    #[error("variable {} neutral label '{label}' is not one of its labels", .variable.label())]
    UnknownNeutralLabel { variable: VariableId, label: String },
    #[error("variable {} label '{label}': {source}", .variable.label())]
    Shape {
        variable: VariableId,
        label: String,
        source: ShapeError,
    },
    #[error("variable {} is declared more than once", .0.label())]
    Duplicate(VariableId),
}

/// Crisp inputs for one inference call. Missing entries are treated as absent values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableValues {
    values: BTreeMap<VariableId, f64>,
}

impl VariableValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: VariableId, value: Option<f64>) -> Self {
        self.set(id, value);
        self
    }

    pub fn set(&mut self, id: VariableId, value: Option<f64>) {
        match value {
            Some(value) => {
                self.values.insert(id, value);
            }
            None => {
                self.values.remove(&id);
            }
        }
    }

    pub fn get(&self, id: VariableId) -> Option<f64> {
        self.values.get(&id).copied()
    }
}

/// Degrees of every label of every variable for one set of inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Fuzzified {
    degrees: BTreeMap<VariableId, Vec<f64>>,
}

impl Fuzzified {
    pub fn degree(&self, id: VariableId, label_index: usize) -> f64 {
        self.degrees
            .get(&id)
            .and_then(|degrees| degrees.get(label_index))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Read-only collection of variables, built once per engine.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSet {
    variables: BTreeMap<VariableId, FuzzyVariable>,
}

impl VariableSet {
    pub fn new(variables: Vec<FuzzyVariable>) -> Result<Self, VariableError> {
        let mut map = BTreeMap::new();
        for variable in variables {
            variable.validate()?;
            let id = variable.id;
            if map.insert(id, variable).is_some() {
                return Err(VariableError::Duplicate(id));
            }
        }
        Ok(Self { variables: map })
    }

    pub fn get(&self, id: VariableId) -> Option<&FuzzyVariable> {
        self.variables.get(&id)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn fuzzify(&self, values: &VariableValues) -> Fuzzified {
        let degrees = self
            .variables
            .iter()
            .map(|(id, variable)| (*id, variable.degree_vector(values.get(*id))))
            .collect();
        Fuzzified { degrees }
    }
}
