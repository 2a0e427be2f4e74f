use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::decision::{DecisionDetail, DecisionRecord};
use super::domain::ApplicantProfile;
use super::fuzzy::{VariableId, VariableValues};
use super::intake::ApplicationSubmission;
use super::knockout::{GateInput, GateOutcome};
use super::policy::{CompiledPolicy, EngineConfig, PolicyError};
use super::tenor::{PaymentPlan, PlanRequest};

/// Crisp inputs and derived payment figures of one applicant, computed before the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub principal: f64,
    pub plan: PaymentPlan,
    pub debt_to_income: Option<f64>,
    pub down_payment_ratio: Option<f64>,
    pub loan_to_income: Option<f64>,
    /// Term the maturity checks assume: the planned tenor, or the product's
    /// shortest term when the plan has none.
    pub maturity_tenor: u32,
}

impl Inference {
    fn variable_values(&self, profile: &ApplicantProfile) -> VariableValues {
        VariableValues::new()
            .with(VariableId::IncomeLevel, Some(profile.salary))
            .with(VariableId::RequestedAmount, Some(self.principal))
            .with(VariableId::PaymentToIncome, self.plan.payment_to_income)
            .with(VariableId::OtherDebtToIncome, self.debt_to_income)
            .with(VariableId::DownPaymentRatio, self.down_payment_ratio)
            .with(VariableId::LoanToIncome, self.loan_to_income)
    }

    fn detail(&self) -> DecisionDetail {
        DecisionDetail {
            tenor_months: self.plan.tenor_months,
            tenor_source: Some(self.plan.source),
            annual_rate: Some(self.plan.annual_rate),
            monthly_installment: Some(self.plan.installment),
            principal: Some(self.principal),
            payment_to_income: self.plan.payment_to_income,
            debt_to_income: self.debt_to_income,
            down_payment_ratio: self.down_payment_ratio,
            loan_to_income: self.loan_to_income,
            ..DecisionDetail::default()
        }
    }
}

/// Financing decision engine. Built once from a validated policy and shared
/// read-only between evaluations.
#[derive(Debug, Clone)]
pub struct FinancingEngine {
    config: EngineConfig,
    compiled: CompiledPolicy,
}

impl FinancingEngine {
    pub fn new(config: EngineConfig) -> Result<Self, PolicyError> {
        let compiled = config.compile()?;
        info!(
            variables = compiled.variables.len(),
            rules = compiled.rules.len(),
            knockout_checks = compiled.gate.checks().len(),
            policy_version = %config.decision.vocabulary.version,
            "financing engine constructed"
        );
        Ok(Self { config, compiled })
    }

    pub fn standard() -> Result<Self, PolicyError> {
        Self::new(EngineConfig::standard())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Principal, payment plan and ratios for a profile.
    pub fn infer(&self, profile: &ApplicantProfile) -> Option<Inference> {
        let scheme = self.compiled.schemes.get(&profile.product)?;

        let principal = if profile.requested_amount > 0.0 {
            profile.requested_amount
        } else {
            profile
                .down_payment
                .map_or(0.0, |dp| dp / self.config.assumed_down_payment_share)
        };
        let down_payment_ratio = profile
            .down_payment
            .filter(|dp| *dp > 0.0 && principal > 0.0)
            .map(|dp| dp / principal);

        let plan = self.config.tenor_search.plan(
            scheme,
            &PlanRequest {
                salary: profile.salary,
                principal,
                annual_rate: profile.annual_margin.unwrap_or(scheme.annual_margin),
                down_payment_ratio,
                tenor_hint: profile.tenor_months,
                quoted_installment: profile.monthly_installment,
            },
        );

        let per_salary = |amount: f64| (profile.salary > 0.0).then(|| amount / profile.salary);
        Some(Inference {
            principal,
            debt_to_income: per_salary(profile.other_obligations),
            down_payment_ratio,
            loan_to_income: per_salary(principal),
            maturity_tenor: plan.tenor_months.unwrap_or(scheme.min_tenor),
            plan,
        })
    }

    pub fn evaluate(&self, profile: &ApplicantProfile) -> DecisionRecord {
        let assembler = &self.config.decision;
        if let Err(reason) = check_profile(profile) {
            return assembler.invalid_input(&reason);
        }
        let Some(inference) = self.infer(profile) else {
            return assembler.invalid_input(&format!(
                "no scheme configured for product {}",
                profile.product.label()
            ));
        };

        let gate_input = GateInput {
            profile,
            installment: inference.plan.installment,
            tenor_months: Some(inference.maturity_tenor),
        };
        match self.compiled.gate.evaluate(&gate_input) {
            GateOutcome::Pass => {}
            GateOutcome::Fail { check, reason } => {
                debug!(%check, %reason, product = profile.product.label(), "application knocked out");
                return assembler.knocked_out(&check, &reason, inference.detail());
            }
            GateOutcome::MandatoryReview { check, reason } => {
                debug!(%check, %reason, "application routed to mandatory review");
                return assembler.mandatory_review(&check, &reason, inference.detail());
            }
        }

        let values = inference.variable_values(profile);
        let fuzzified = self.compiled.variables.fuzzify(&values);
        let activations = self.compiled.rules.evaluate(&fuzzified);
        let defuzzified = self.compiled.defuzzifier.defuzzify(&activations);
        if defuzzified.fell_back {
            warn!(
                payment_to_income = ?inference.plan.payment_to_income,
                debt_to_income = ?inference.debt_to_income,
                down_payment_ratio = ?inference.down_payment_ratio,
                loan_to_income = ?inference.loan_to_income,
                salary = profile.salary,
                fallback = defuzzified.score,
                "no rule fired; fallback score applied"
            );
        }

        let mut detail = inference.detail();
        detail.fallback_applied = defuzzified.fell_back;
        assembler.scored(self.config.scale, defuzzified.score, &activations, detail)
    }

    pub fn evaluate_submission(&self, submission: &ApplicationSubmission) -> DecisionRecord {
        match submission.normalize() {
            Ok(profile) => self.evaluate(&profile),
            Err(err) => {
                debug!(id = ?submission.id, error = %err, "submission rejected at intake");
                self.config.decision.invalid_input(&err.to_string())
            }
        }
    }

    /// Evaluates independent profiles in parallel; output order matches input order.
    pub fn evaluate_batch(&self, profiles: &[ApplicantProfile]) -> Vec<DecisionRecord> {
        let records: Vec<DecisionRecord> =
            profiles.par_iter().map(|profile| self.evaluate(profile)).collect();
        info!(
            evaluated = records.len(),
            by_status = ?status_counts(&records),
            "batch evaluation complete"
        );
        records
    }

    pub fn evaluate_submissions(&self, submissions: &[ApplicationSubmission]) -> Vec<DecisionRecord> {
        let records: Vec<DecisionRecord> = submissions
            .par_iter()
            .map(|submission| self.evaluate_submission(submission))
            .collect();
        info!(
            evaluated = records.len(),
            by_status = ?status_counts(&records),
            "batch evaluation complete"
        );
        records
    }
}

fn check_profile(profile: &ApplicantProfile) -> Result<(), String> {
    let amounts = [
        ("salary", Some(profile.salary)),
        ("requested_amount", Some(profile.requested_amount)),
        ("other_obligations", Some(profile.other_obligations)),
        ("down_payment", profile.down_payment),
        ("monthly_installment", profile.monthly_installment),
        ("annual_margin", profile.annual_margin),
    ];
    for (field, value) in amounts {
        if let Some(value) = value.filter(|v| !v.is_finite() || *v < 0.0) {
            return Err(format!(
                "{field} must be a finite non-negative number, found {value}"
            ));
        }
    }
    if profile.tenor_months == Some(0) {
        return Err("tenor must be a positive whole number of months, found '0'".to_string());
    }
    Ok(())
}

fn status_counts(records: &[DecisionRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(format!("{:?}", record.status)).or_insert(0) += 1;
    }
    counts
}
