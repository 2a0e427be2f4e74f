use serde::{Deserialize, Serialize};

use super::domain::{ApplicantProfile, JobCategory, ProductType, ResidenceType};

/// Which monthly burden the debt-burden ceiling is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtBurdenBasis {
    /// The installment of the financing being requested.
    Installment,
    /// The applicant's existing obligations only.
    OtherObligations,
    /// Requested installment plus existing obligations.
    Combined,
}

/// Basis used by the standard policy.
pub const DEFAULT_DEBT_BURDEN_BASIS: DebtBurdenBasis = DebtBurdenBasis::Installment;

impl DebtBurdenBasis {
    fn burden(self, input: &GateInput<'_>) -> f64 {
        match self {
            DebtBurdenBasis::Installment => input.installment,
            DebtBurdenBasis::OtherObligations => input.profile.other_obligations,
            DebtBurdenBasis::Combined => input.installment + input.profile.other_obligations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeCeiling {
    pub job: JobCategory,
    pub max_age: u32,
}

/// A single hard eligibility check. Product lists left empty apply to every product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum KnockoutCheck {
    /// Self-employed applicants without a fixed income go to manual review instead of failing.
    SelfEmployedWithoutIncome,
    PositiveIncome,
    PositiveInstallment,
    InstallmentBelowIncome,
    ResidenceRestriction {
        disallowed: Vec<ResidenceType>,
    },
    AgeAtMaturity {
        ceilings: Vec<AgeCeiling>,
    },
    MinimumIncomeWithObligations {
        #[serde(default)]
        products: Vec<ProductType>,
        minimum_salary: f64,
    },
    MaximumDebtBurden {
        #[serde(default)]
        products: Vec<ProductType>,
        basis: DebtBurdenBasis,
        max_ratio: f64,
    },
}

/// Applicant record plus the payment figures derived before the gate runs.
#[derive(Debug, Clone, Copy)]
pub struct GateInput<'a> {
    pub profile: &'a ApplicantProfile,
    pub installment: f64,
    /// Term used for age at maturity; `None` checks the current age only.
    pub tenor_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    Pass,
    Fail { check: String, reason: String },
    MandatoryReview { check: String, reason: String },
}

impl GateOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, GateOutcome::Pass)
    }
}

fn applies_to(products: &[ProductType], product: ProductType) -> bool {
    products.is_empty() || products.contains(&product)
}

impl KnockoutCheck {
    pub fn name(&self) -> &'static str {
        match self {
            KnockoutCheck::SelfEmployedWithoutIncome => "self_employed_without_income",
            KnockoutCheck::PositiveIncome => "positive_income",
            KnockoutCheck::PositiveInstallment => "positive_installment",
            KnockoutCheck::InstallmentBelowIncome => "installment_below_income",
            KnockoutCheck::ResidenceRestriction { .. } => "residence_restriction",
            KnockoutCheck::AgeAtMaturity { .. } => "age_at_maturity",
            KnockoutCheck::MinimumIncomeWithObligations { .. } => {
                "minimum_income_with_obligations"
            }
            KnockoutCheck::MaximumDebtBurden { .. } => "maximum_debt_burden",
        }
    }

    pub fn evaluate(&self, input: &GateInput<'_>) -> GateOutcome {
        let profile = input.profile;
        let fail = |reason: String| GateOutcome::Fail {
            check: self.name().to_string(),
            reason,
        };

        match self {
            KnockoutCheck::SelfEmployedWithoutIncome => {
                if profile.job_category == JobCategory::SelfEmployed && profile.salary <= 0.0 {
                    return GateOutcome::MandatoryReview {
                        check: self.name().to_string(),
                        reason: "self-employed applicant without a fixed income requires a field survey"
                            .to_string(),
                    };
                }
            }
            KnockoutCheck::PositiveIncome => {
                if profile.salary <= 0.0 {
                    return fail("declared monthly income must be positive".to_string());
                }
            }
            KnockoutCheck::PositiveInstallment => {
                if input.installment <= 0.0 {
                    return fail("there is no installment to finance".to_string());
                }
            }
            KnockoutCheck::InstallmentBelowIncome => {
                if input.installment >= profile.salary {
                    return fail(format!(
                        "installment {:.0} is not below the monthly salary {:.0}",
                        input.installment, profile.salary
                    ));
                }
            }
            KnockoutCheck::ResidenceRestriction { disallowed } => {
                if let Some(residence) = profile.residence.filter(|r| disallowed.contains(r)) {
                    return fail(format!(
                        "residence type '{}' is not accepted",
                        residence.label()
                    ));
                }
            }
            KnockoutCheck::AgeAtMaturity { ceilings } => {
                let ceiling = ceilings
                    .iter()
                    .find(|ceiling| ceiling.job == profile.job_category);
                if let (Some(age), Some(ceiling)) = (profile.age, ceiling) {
                    let at_maturity =
                        f64::from(age) + f64::from(input.tenor_months.unwrap_or(0)) / 12.0;
                    if at_maturity > f64::from(ceiling.max_age) {
                        return fail(format!(
                            "age at maturity {:.1} exceeds the {} year ceiling for {}",
                            at_maturity,
                            ceiling.max_age,
                            ceiling.job.label()
                        ));
                    }
                }
            }
            KnockoutCheck::MinimumIncomeWithObligations {
                products,
                minimum_salary,
            } => {
                if applies_to(products, profile.product)
                    && profile.other_obligations > 0.0
                    && profile.salary < *minimum_salary
                {
                    return fail(format!(
                        "salary below {:.0} with existing obligations is not accepted for {}",
                        minimum_salary,
                        profile.product.label()
                    ));
                }
            }
            KnockoutCheck::MaximumDebtBurden {
                products,
                basis,
                max_ratio,
            } => {
                if applies_to(products, profile.product) && profile.salary > 0.0 {
                    let ratio = basis.burden(input) / profile.salary;
                    if ratio > *max_ratio {
                        return fail(format!(
                            "debt burden is {:.1}% of salary, above the {:.0}% ceiling",
                            ratio * 100.0,
                            max_ratio * 100.0
                        ));
                    }
                }
            }
        }

        GateOutcome::Pass
    }
}

/// Ordered sequence of knockout checks; the first non-passing outcome wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnockoutGate {
    checks: Vec<KnockoutCheck>,
}

impl KnockoutGate {
    pub fn new(checks: Vec<KnockoutCheck>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[KnockoutCheck] {
        &self.checks
    }

    pub fn evaluate(&self, input: &GateInput<'_>) -> GateOutcome {
        self.checks
            .iter()
            .map(|check| check.evaluate(input))
            .find(|outcome| !outcome.is_pass())
            .unwrap_or(GateOutcome::Pass)
    }
}
