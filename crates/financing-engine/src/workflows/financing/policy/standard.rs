use super::EngineConfig;
use crate::workflows::financing::decision::{
    CutoffTable, CutoffTier, DecisionAssembler, DecisionStatus, PaymentNotes, RiskBand,
    ScoreScale, StatusEntry, StatusVocabulary,
};
use crate::workflows::financing::domain::{JobCategory, ProductType, ResidenceType};
use crate::workflows::financing::fuzzy::{
    ClauseSpec, Consequent, Domain, FuzzySet, FuzzyVariable, MembershipShape, RuleSpec,
    VariableId,
};
use crate::workflows::financing::knockout::{AgeCeiling, KnockoutCheck, DEFAULT_DEBT_BURDEN_BASIS};
use crate::workflows::financing::tenor::{ProductScheme, TenorSearch};

const APPROVE: f64 = 85.0;
const CONSIDER: f64 = 50.0;
const REJECT: f64 = 25.0;


fn car_products() -> Vec<ProductType> {
    ProductType::ALL
        .into_iter()
        .filter(|product| product.is_car())
        .collect()
}

fn tri(a: f64, b: f64, c: f64) -> MembershipShape {
    MembershipShape::Triangular { a, b, c }
}

fn trap(a: f64, b: f64, c: f64, d: f64) -> MembershipShape {
    MembershipShape::Trapezoidal { a, b, c, d }
}

fn variable(
    id: VariableId,
    min: f64,
    max: f64,
    sets: Vec<(&str, MembershipShape)>,
) -> FuzzyVariable {
    FuzzyVariable::new(
        id,
        Domain { min, max },
        sets.into_iter()
            .map(|(label, shape)| FuzzySet::new(label, shape))
            .collect(),
    )
}

fn variables() -> Vec<FuzzyVariable> {
    const MILLION: f64 = 1_000_000.0;
    vec![
        variable(
            VariableId::PaymentToIncome,
            0.0,
            1.5,
            vec![
                ("very_low", trap(0.0, 0.0, 0.18, 0.25)),
                ("low", tri(0.22, 0.28, 0.33)),
                ("medium", tri(0.30, 0.40, 0.50)),
                ("high", trap(0.45, 0.60, 1.5, 1.5)),
            ],
        ),
        variable(
            VariableId::OtherDebtToIncome,
            0.0,
            0.6,
            vec![
                ("low", trap(0.0, 0.0, 0.10, 0.15)),
                ("medium", tri(0.10, 0.20, 0.30)),
                ("high", trap(0.20, 0.30, 0.6, 0.6)),
            ],
        ),
        variable(
            VariableId::DownPaymentRatio,
            0.0,
            1.0,
            vec![
                ("low", trap(0.0, 0.0, 0.12, 0.16)),
                ("medium", tri(0.12, 0.20, 0.30)),
                ("high", trap(0.24, 0.35, 1.0, 1.0)),
            ],
        )
        .with_neutral_label("medium"),
        variable(
            VariableId::IncomeLevel,
            0.0,
            50.0 * MILLION,
            vec![
                ("low", trap(0.0, 0.0, 2.5 * MILLION, 4.0 * MILLION)),
                ("medium", trap(2.5 * MILLION, 4.0 * MILLION, 6.0 * MILLION, 8.0 * MILLION)),
                ("high", trap(6.0 * MILLION, 8.0 * MILLION, 50.0 * MILLION, 50.0 * MILLION)),
            ],
        ),
        variable(
            VariableId::RequestedAmount,
            0.0,
            5_000.0 * MILLION,
            vec![
                ("small", trap(0.0, 0.0, 10.0 * MILLION, 15.0 * MILLION)),
                ("medium", tri(10.0 * MILLION, 20.0 * MILLION, 35.0 * MILLION)),
                (
                    "large",
                    trap(30.0 * MILLION, 50.0 * MILLION, 5_000.0 * MILLION, 5_000.0 * MILLION),
                ),
            ],
        ),
        // principal in months of salary
        variable(
            VariableId::LoanToIncome,
            0.0,
            50.0,
            vec![
                ("low", trap(0.0, 0.0, 3.0, 4.0)),
                ("medium", tri(3.0, 5.0, 8.0)),
                ("high", trap(7.0, 10.0, 50.0, 50.0)),
            ],
        ),
    ]
}

fn rule(clauses: &[(VariableId, &str)], then: Consequent) -> RuleSpec {
    RuleSpec::new(
        clauses
            .iter()
            .map(|(variable, label)| ClauseSpec::new(*variable, *label))
            .collect(),
        then,
    )
}

fn rules() -> Vec<RuleSpec> {
    use VariableId::{
        DownPaymentRatio as Dp, IncomeLevel as Income, LoanToIncome as Lti,
        OtherDebtToIncome as Cli, PaymentToIncome as Pti, RequestedAmount as Amount,
    };
    let scalar = Consequent::Scalar;

    vec![
        rule(&[(Pti, "very_low")], scalar(APPROVE)),
        rule(&[(Pti, "low"), (Cli, "low")], scalar(APPROVE)),
        rule(&[(Pti, "low"), (Dp, "high")], scalar(APPROVE)),
        rule(&[(Pti, "medium"), (Cli, "low"), (Dp, "high")], scalar(APPROVE)),
        rule(&[(Income, "high"), (Cli, "low")], scalar(APPROVE)),
        rule(
            &[(Pti, "medium"), (Cli, "low")],
            Consequent::Band {
                min: 45.0,
                max: 55.0,
            },
        ),
        rule(&[(Pti, "medium"), (Cli, "medium")], scalar(CONSIDER)),
        rule(&[(Pti, "medium"), (Cli, "high")], scalar(REJECT)),
        rule(&[(Pti, "high"), (Cli, "low")], scalar(CONSIDER)),
        rule(&[(Pti, "high"), (Cli, "medium")], scalar(REJECT)),
        rule(&[(Pti, "high"), (Cli, "high")], scalar(REJECT)),
        rule(&[(Dp, "low"), (Cli, "high")], scalar(REJECT)),
        rule(&[(Dp, "high"), (Cli, "low")], scalar(CONSIDER)),
        rule(
            &[(Income, "low"), (Amount, "large")],
            Consequent::Band {
                min: 15.0,
                max: 35.0,
            },
        ),
        rule(&[(Lti, "high"), (Dp, "low")], scalar(20.0)),
    ]
}

fn knockout() -> Vec<KnockoutCheck> {
    vec![
        KnockoutCheck::SelfEmployedWithoutIncome,
        KnockoutCheck::PositiveIncome,
        KnockoutCheck::PositiveInstallment,
        KnockoutCheck::InstallmentBelowIncome,
        KnockoutCheck::ResidenceRestriction {
            disallowed: vec![ResidenceType::Boarding],
        },
        KnockoutCheck::AgeAtMaturity {
            ceilings: vec![
                AgeCeiling {
                    job: JobCategory::Employee,
                    max_age: 55,
                },
                AgeCeiling {
                    job: JobCategory::CivilServant,
                    max_age: 55,
                },
                AgeCeiling {
                    job: JobCategory::SelfEmployed,
                    max_age: 60,
                },
            ],
        },
        KnockoutCheck::MinimumIncomeWithObligations {
            products: car_products(),
            minimum_salary: 10_000_000.0,
        },
        KnockoutCheck::MaximumDebtBurden {
            products: car_products(),
            basis: DEFAULT_DEBT_BURDEN_BASIS,
            max_ratio: 0.30,
        },
    ]
}

fn schemes() -> Vec<ProductScheme> {
    vec![
        ProductScheme::new(ProductType::MotorNew, 12, 48, 0.20),
        ProductScheme::new(ProductType::MotorUsed, 12, 48, 0.21),
        ProductScheme::new(ProductType::CarNew, 12, 48, 0.16),
        ProductScheme::new(ProductType::CarUsed, 12, 48, 0.17),
        ProductScheme::new(ProductType::GeneralDana, 12, 48, 0.16),
    ]
}

fn entry(
    status: DecisionStatus,
    label: &str,
    rationale: &[&str],
    suggestion: Option<&str>,
) -> StatusEntry {
    StatusEntry {
        status,
        label: label.to_string(),
        rationale: rationale.iter().map(|line| line.to_string()).collect(),
        suggestion: suggestion.map(str::to_string),
    }
}

/// English status wording of the standard policy.
pub fn standard_vocabulary() -> StatusVocabulary {
    StatusVocabulary {
        version: "standard-2024.1".to_string(),
        entries: vec![
            entry(
                DecisionStatus::Approve,
                "APPROVE",
                &[
                    "Payment-to-income ratio is low.",
                    "Other obligations are under control.",
                    "Down payment supports the financing.",
                ],
                None,
            ),
            entry(
                DecisionStatus::Consider,
                "CONSIDER",
                &[
                    "Some indicators are adequate.",
                    "The application needs further review.",
                ],
                Some("Consider a larger down payment or a smaller amount."),
            ),
            entry(
                DecisionStatus::Reject,
                "REJECT",
                &[
                    "Payment or other obligations are high relative to income.",
                    "Down payment is low or income is insufficient.",
                ],
                Some("Reduce the requested amount or settle other obligations first."),
            ),
            entry(
                DecisionStatus::KnockedOut,
                "KNOCKED OUT",
                &["A basic eligibility requirement was not met."],
                None,
            ),
            entry(
                DecisionStatus::InvalidInput,
                "INVALID INPUT",
                &["The application could not be read."],
                Some("Correct the application data and submit again."),
            ),
        ],
    }
}

/// Indonesian status wording, as used by the field survey teams.
pub fn indonesian_vocabulary() -> StatusVocabulary {
    StatusVocabulary {
        version: "id-2024.1".to_string(),
        entries: vec![
            entry(
                DecisionStatus::Approve,
                "LAYAK",
                &["Pendapatan memadai.", "Jenis pekerjaan dan cicilan sesuai."],
                None,
            ),
            entry(
                DecisionStatus::Consider,
                "PERLU SURVEY",
                &[
                    "Data perlu tinjauan lebih lanjut.",
                    "Beberapa indikator belum optimal.",
                ],
                Some("Perlu tinjauan lapangan atau dokumen tambahan untuk validasi."),
            ),
            entry(
                DecisionStatus::Reject,
                "TIDAK LAYAK",
                &[
                    "Pendapatan atau pekerjaan kurang mendukung.",
                    "Beban cicilan terlalu tinggi.",
                ],
                Some("Kurangi jumlah pengajuan atau pastikan cicilan lain telah lunas."),
            ),
            entry(
                DecisionStatus::KnockedOut,
                "DITOLAK",
                &["Gagal lolos syarat dasar (aturan keras)."],
                None,
            ),
            entry(
                DecisionStatus::InvalidInput,
                "DATA TIDAK VALID",
                &["Data pengajuan tidak dapat dibaca."],
                Some("Perbaiki data atau hubungi admin."),
            ),
        ],
    }
}

impl EngineConfig {
    /// Built-in policy: 0-100 scale, PTI target 0.33, knockouts for car products.
    pub fn standard() -> Self {
        Self {
            scale: ScoreScale::Percent,
            variables: variables(),
            rules: rules(),
            fallback_score: CONSIDER,
            knockout: knockout(),
            schemes: schemes(),
            tenor_search: TenorSearch {
                target_ratio: 0.33,
                acceptable_low_ratio: 0.25,
                strong_down_payment_ratio: 0.24,
            },
            assumed_down_payment_share: 0.20,
            decision: DecisionAssembler {
                status_cutoffs: CutoffTable::new(
                    vec![
                        CutoffTier {
                            min_score: 60.0,
                            value: DecisionStatus::Approve,
                        },
                        CutoffTier {
                            min_score: 40.0,
                            value: DecisionStatus::Consider,
                        },
                    ],
                    DecisionStatus::Reject,
                ),
                risk_cutoffs: CutoffTable::new(
                    vec![
                        CutoffTier {
                            min_score: 70.0,
                            value: RiskBand::Low,
                        },
                        CutoffTier {
                            min_score: 55.0,
                            value: RiskBand::Medium,
                        },
                    ],
                    RiskBand::High,
                ),
                vocabulary: standard_vocabulary(),
                review_score: 55.0,
                fired_rule_limit: 5,
                payment_notes: PaymentNotes {
                    safe_ratio: 0.33,
                    moderate_ratio: 0.50,
                },
            },
        }
    }
}
