//! Policy configuration: every threshold, shape, rule and wording the engine
//! uses, loaded once and validated before any evaluation runs.

mod standard;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::decision::{CutoffTable, DecisionAssembler, DecisionStatus, ScoreScale, StatusVocabulary};
use super::domain::ProductType;
use super::fuzzy::{Defuzzifier, FuzzyVariable, RuleBase, RuleError, RuleSpec, VariableError, VariableSet};
use super::knockout::{KnockoutCheck, KnockoutGate};
use super::tenor::{ProductScheme, TenorSearch};

pub use standard::{indonesian_vocabulary, standard_vocabulary};

/// Complete, serializable financing policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub scale: ScoreScale,
    pub variables: Vec<FuzzyVariable>,
    pub rules: Vec<RuleSpec>,
    /// Score used when no rule fires.
    pub fallback_score: f64,
    pub knockout: Vec<KnockoutCheck>,
    pub schemes: Vec<ProductScheme>,
    pub tenor_search: TenorSearch,
    /// Down-payment share used to infer the principal when only a down payment is known.
    pub assumed_down_payment_share: f64,
    pub decision: DecisionAssembler,
}

impl EngineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let file = File::open(path.as_ref()).map_err(PolicyError::Read)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PolicyError> {
        serde_json::from_reader(reader).map_err(PolicyError::Parse)
    }

    pub fn with_vocabulary(mut self, vocabulary: StatusVocabulary) -> Self {
        self.decision.vocabulary = vocabulary;
        self
    }

    pub fn to_json_pretty(&self) -> Result<String, PolicyError> {
        serde_json::to_string_pretty(self).map_err(PolicyError::Parse)
    }

    /// Checks every construction-time invariant and builds the runtime tables.
    pub(crate) fn compile(&self) -> Result<CompiledPolicy, PolicyError> {
        let scale = self.scale;
        let variables = VariableSet::new(self.variables.clone())?;
        let rules = RuleBase::compile(&self.rules, &variables)?;

        if let Some(rule) = rules
            .rules()
            .iter()
            .find(|rule| !scale.contains(rule.consequent()))
        {
            return Err(PolicyError::ConsequentOutOfScale {
                rule: rule.number(),
                value: rule.consequent(),
            });
        }
        if !scale.contains(self.fallback_score) {
            return Err(PolicyError::ScoreOutOfScale {
                name: "fallback_score",
                value: self.fallback_score,
            });
        }
        if !scale.contains(self.decision.review_score) {
            return Err(PolicyError::ScoreOutOfScale {
                name: "review_score",
                value: self.decision.review_score,
            });
        }

        check_cutoffs("status", &self.decision.status_cutoffs, scale)?;
        check_cutoffs("risk", &self.decision.risk_cutoffs, scale)?;
        for status in DecisionStatus::ALL {
            if self.decision.vocabulary.entry(status).is_none() {
                return Err(PolicyError::MissingStatusEntry(status));
            }
        }

        let search = &self.tenor_search;
        check_ratio("tenor_search.target_ratio", search.target_ratio)?;
        check_ratio("tenor_search.acceptable_low_ratio", search.acceptable_low_ratio)?;
        check_ratio(
            "tenor_search.strong_down_payment_ratio",
            search.strong_down_payment_ratio,
        )?;
        if search.acceptable_low_ratio > search.target_ratio {
            return Err(PolicyError::InvalidRatio {
                name: "tenor_search.acceptable_low_ratio",
                value: search.acceptable_low_ratio,
            });
        }
        if !(self.assumed_down_payment_share > 0.0 && self.assumed_down_payment_share <= 1.0) {
            return Err(PolicyError::InvalidRatio {
                name: "assumed_down_payment_share",
                value: self.assumed_down_payment_share,
            });
        }
        let notes = &self.decision.payment_notes;
        check_ratio("payment_notes.safe_ratio", notes.safe_ratio)?;
        check_ratio("payment_notes.moderate_ratio", notes.moderate_ratio)?;

        let mut schemes = BTreeMap::new();
        for scheme in &self.schemes {
            if scheme.min_tenor == 0 || scheme.max_tenor < scheme.min_tenor || scheme.tenor_step == 0
            {
                return Err(PolicyError::InvalidTenorRange(scheme.product));
            }
            if !scheme.annual_margin.is_finite() || scheme.annual_margin < 0.0 {
                return Err(PolicyError::InvalidRate(scheme.product));
            }
            if schemes.insert(scheme.product, *scheme).is_some() {
                return Err(PolicyError::DuplicateScheme(scheme.product));
            }
        }
        if let Some(product) = ProductType::ALL
            .into_iter()
            .find(|product| !schemes.contains_key(product))
        {
            return Err(PolicyError::MissingScheme(product));
        }

        for check in &self.knockout {
            check_knockout(check)?;
        }

        Ok(CompiledPolicy {
            variables,
            rules,
            gate: KnockoutGate::new(self.knockout.clone()),
            defuzzifier: Defuzzifier::new(self.fallback_score),
            schemes,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Runtime tables built from a validated [`EngineConfig`].
#[derive(Debug, Clone)]
pub(crate) struct CompiledPolicy {
    pub variables: VariableSet,
    pub rules: RuleBase,
    pub gate: KnockoutGate,
    pub defuzzifier: Defuzzifier,
    pub schemes: BTreeMap<ProductType, ProductScheme>,
}

fn check_cutoffs<T: Copy>(
    table: &'static str,
    cutoffs: &CutoffTable<T>,
    scale: ScoreScale,
) -> Result<(), PolicyError> {
    if let Some(tier) = cutoffs.tiers.iter().find(|tier| !scale.contains(tier.min_score)) {
        return Err(PolicyError::CutoffOutOfScale {
            table,
            value: tier.min_score,
        });
    }
    if !cutoffs.is_strictly_descending() {
        return Err(PolicyError::CutoffsNotDescending(table));
    }
    Ok(())
}

fn check_ratio(name: &'static str, value: f64) -> Result<(), PolicyError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PolicyError::InvalidRatio { name, value })
    }
}

fn check_knockout(check: &KnockoutCheck) -> Result<(), PolicyError> {
    match check {
        KnockoutCheck::MinimumIncomeWithObligations { minimum_salary, .. } => {
            check_ratio("minimum_income_with_obligations.minimum_salary", *minimum_salary)
        }
        KnockoutCheck::MaximumDebtBurden { max_ratio, .. } => {
            check_ratio("maximum_debt_burden.max_ratio", *max_ratio)
        }
        _ => Ok(()),
    }
}

/// Malformed policy detected while loading or constructing the engine.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to parse policy document: {0}")]
    Parse(#[source] serde_json::Error),
    #[error(transparent)]
    Variable(#[from] VariableError),
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error("rule {rule} consequent {value} is outside the score scale")]
    ConsequentOutOfScale { rule: usize, value: f64 },
    #[error("{name} {value} is outside the score scale")]
    ScoreOutOfScale { name: &'static str, value: f64 },
    #[error("{table} cutoff {value} is outside the score scale")]
    CutoffOutOfScale { table: &'static str, value: f64 },
    #[error("{0} cutoffs must be strictly descending")]
    CutoffsNotDescending(&'static str),
    #[error("status {0:?} has no vocabulary entry")]
    MissingStatusEntry(DecisionStatus),
    #[error("{name} must be a finite non-negative ratio, found {value}")]
    InvalidRatio { name: &'static str, value: f64 },
    #[error("product {} has an empty or invalid tenor range", .0.label())]
    InvalidTenorRange(ProductType),
    #[error("product {} has an invalid annual margin", .0.label())]
    InvalidRate(ProductType),
    #[error("product {} is configured more than once", .0.label())]
    DuplicateScheme(ProductType),
    #[error("product {} has no scheme", .0.label())]
    MissingScheme(ProductType),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::financing::decision::CutoffTier;
    use crate::workflows::financing::fuzzy::{Consequent, MembershipShape};

    #[test]
    fn standard_policy_compiles() {
        let compiled = EngineConfig::standard().compile().expect("standard policy is valid");
        assert_eq!(compiled.variables.len(), 6);
        assert_eq!(compiled.rules.len(), 15);
        assert_eq!(compiled.schemes.len(), ProductType::ALL.len());
    }

    #[test]
    fn inverted_membership_breakpoints_are_fatal() {
        let mut config = EngineConfig::standard();
        config.variables[0].sets[0].shape = MembershipShape::Triangular {
            a: 0.5,
            b: 0.4,
            c: 0.1,
        };
        assert!(matches!(config.compile(), Err(PolicyError::Variable(_))));
    }

    #[test]
    fn consequents_must_fit_the_scale() {
        let mut config = EngineConfig::standard();
        config.rules[0].then = Consequent::Scalar(120.0);
        assert!(matches!(
            config.compile(),
            Err(PolicyError::ConsequentOutOfScale { rule: 1, .. })
        ));
    }

    #[test]
    fn cutoffs_must_descend() {
        let mut config = EngineConfig::standard();
        config.decision.status_cutoffs.tiers.push(CutoffTier {
            min_score: 80.0,
            value: DecisionStatus::Approve,
        });
        assert!(matches!(
            config.compile(),
            Err(PolicyError::CutoffsNotDescending("status"))
        ));
    }

    #[test]
    fn every_product_needs_a_scheme() {
        let mut config = EngineConfig::standard();
        config
            .schemes
            .retain(|scheme| scheme.product != ProductType::MotorUsed);
        assert!(matches!(
            config.compile(),
            Err(PolicyError::MissingScheme(ProductType::MotorUsed))
        ));
    }

    #[test]
    fn empty_tenor_range_is_rejected() {
        let mut config = EngineConfig::standard();
        config.schemes[0].max_tenor = config.schemes[0].min_tenor - 1;
        assert!(matches!(config.compile(), Err(PolicyError::InvalidTenorRange(_))));
    }

    #[test]
    fn missing_vocabulary_entries_are_rejected() {
        let mut config = EngineConfig::standard();
        config
            .decision
            .vocabulary
            .entries
            .retain(|entry| entry.status != DecisionStatus::InvalidInput);
        assert!(matches!(
            config.compile(),
            Err(PolicyError::MissingStatusEntry(DecisionStatus::InvalidInput))
        ));
    }

    #[test]
    fn policy_round_trips_through_json() {
        let config = EngineConfig::standard();
        let json = config.to_json_pretty().expect("serializes");
        let parsed = EngineConfig::from_reader(json.as_bytes()).expect("parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn unreadable_policy_file_reports_read_error() {
        let error = EngineConfig::from_path("/nonexistent/financing-policy.json")
            .expect_err("missing file fails");
        assert!(matches!(error, PolicyError::Read(_)));
    }
}
