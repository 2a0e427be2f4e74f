use serde::{Deserialize, Serialize};

use super::fuzzy::Activation;
use super::tenor::TenorSource;

/// Ordinal outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionStatus {
    Approve,
    Consider,
    Reject,
    KnockedOut,
    InvalidInput,
}

impl DecisionStatus {
    pub const ALL: [DecisionStatus; 5] = [
        DecisionStatus::Approve,
        DecisionStatus::Consider,
        DecisionStatus::Reject,
        DecisionStatus::KnockedOut,
        DecisionStatus::InvalidInput,
    ];

    /// Statuses that may carry an improvement suggestion.
    pub fn accepts_suggestion(self) -> bool {
        !matches!(self, DecisionStatus::Approve | DecisionStatus::KnockedOut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

/// Scale every score, consequent and cutoff of a policy is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// 0 to 100, reported with two decimals.
    Percent,
    /// 0 to 1, reported with four decimals.
    Unit,
}

impl ScoreScale {
    pub fn max(self) -> f64 {
        match self {
            ScoreScale::Percent => 100.0,
            ScoreScale::Unit => 1.0,
        }
    }

    pub fn contains(self, value: f64) -> bool {
        value.is_finite() && (0.0..=self.max()).contains(&value)
    }

    pub fn round(self, score: f64) -> f64 {
        match self {
            ScoreScale::Percent => round_to(score, 2),
            ScoreScale::Unit => round_to(score, 4),
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoffTier<T> {
    pub min_score: f64,
    pub value: T,
}

/// Ordered cutoff table: the first tier whose `min_score` the score reaches wins,
/// scores below every tier map to `floor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffTable<T> {
    pub tiers: Vec<CutoffTier<T>>,
    pub floor: T,
}

impl<T: Copy> CutoffTable<T> {
    pub fn new(tiers: Vec<CutoffTier<T>>, floor: T) -> Self {
        Self { tiers, floor }
    }

    pub fn classify(&self, score: f64) -> T {
        self.tiers
            .iter()
            .find(|tier| score >= tier.min_score)
            .map_or(self.floor, |tier| tier.value)
    }

    pub(crate) fn is_strictly_descending(&self) -> bool {
        self.tiers
            .windows(2)
            .all(|pair| pair[0].min_score > pair[1].min_score)
    }
}

/// Fixed wording attached to a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: DecisionStatus,
    pub label: String,
    pub rationale: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Versioned lookup from status to label, rationale and suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusVocabulary {
    pub version: String,
    pub entries: Vec<StatusEntry>,
}

impl StatusVocabulary {
    pub fn entry(&self, status: DecisionStatus) -> Option<&StatusEntry> {
        self.entries.iter().find(|entry| entry.status == status)
    }
}

/// Thresholds of the short payment note attached to scored decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentNotes {
    pub safe_ratio: f64,
    pub moderate_ratio: f64,
}

impl PaymentNotes {
    pub fn describe(&self, payment_to_income: f64) -> &'static str {
        if payment_to_income <= self.safe_ratio {
            "payment within safe range"
        } else if payment_to_income <= self.moderate_ratio {
            "payment moderately high"
        } else {
            "payment very high"
        }
    }
}

/// Figures derived while evaluating; serialized as the record's `detail`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionDetail {
    pub tenor_months: Option<u32>,
    pub tenor_source: Option<TenorSource>,
    pub annual_rate: Option<f64>,
    pub monthly_installment: Option<f64>,
    pub principal: Option<f64>,
    pub payment_to_income: Option<f64>,
    pub debt_to_income: Option<f64>,
    pub down_payment_ratio: Option<f64>,
    pub loan_to_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knockout_check: Option<String>,
    #[serde(default)]
    pub fallback_applied: bool,
}

impl DecisionDetail {
    fn rounded(mut self) -> Self {
        let ratio = |value: Option<f64>| value.map(|v| round_to(v, 4));
        self.annual_rate = ratio(self.annual_rate);
        self.payment_to_income = ratio(self.payment_to_income);
        self.debt_to_income = ratio(self.debt_to_income);
        self.down_payment_ratio = ratio(self.down_payment_ratio);
        self.loan_to_income = ratio(self.loan_to_income);
        self.monthly_installment = self.monthly_installment.map(f64::round);
        self.principal = self.principal.map(f64::round);
        self
    }
}

/// Explanation entry for one fired rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiredRule {
    pub rule: String,
    pub strength: f64,
    pub consequent: f64,
}

/// Decision returned to the caller; created fresh per evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub status: DecisionStatus,
    pub status_label: String,
    pub risk_band: RiskBand,
    pub score: f64,
    pub manual_review: bool,
    pub rationale: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub policy_version: String,
    pub detail: DecisionDetail,
    pub fired_rules: Vec<FiredRule>,
}

/// Maps scores and gate outcomes to decision records using injected policy tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionAssembler {
    pub status_cutoffs: CutoffTable<DecisionStatus>,
    pub risk_cutoffs: CutoffTable<RiskBand>,
    pub vocabulary: StatusVocabulary,
    /// Score reported for applicants routed to mandatory review.
    pub review_score: f64,
    /// Number of fired rules listed in an explanation.
    pub fired_rule_limit: usize,
    pub payment_notes: PaymentNotes,
}

impl DecisionAssembler {
    pub fn scored(
        &self,
        scale: ScoreScale,
        score: f64,
        activations: &[Activation<'_>],
        mut detail: DecisionDetail,
    ) -> DecisionRecord {
        let status = self.status_cutoffs.classify(score);
        detail.payment_note = detail
            .payment_to_income
            .map(|ratio| self.payment_notes.describe(ratio).to_string());

        let mut ordered = activations.to_vec();
        ordered.sort_by(Activation::explanation_order);
        let fired_rules = ordered
            .iter()
            .take(self.fired_rule_limit)
            .map(|activation| FiredRule {
                rule: activation.rule.description().to_string(),
                strength: round_to(activation.strength, 3),
                consequent: activation.rule.consequent(),
            })
            .collect();

        self.record(
            status,
            self.risk_cutoffs.classify(score),
            scale.round(score),
            false,
            None,
            detail,
            fired_rules,
        )
    }

    pub fn knocked_out(&self, check: &str, reason: &str, mut detail: DecisionDetail) -> DecisionRecord {
        detail.knockout_check = Some(check.to_string());
        self.record(
            DecisionStatus::KnockedOut,
            RiskBand::High,
            0.0,
            false,
            Some(reason),
            detail,
            Vec::new(),
        )
    }

    pub fn mandatory_review(
        &self,
        check: &str,
        reason: &str,
        mut detail: DecisionDetail,
    ) -> DecisionRecord {
        detail.knockout_check = Some(check.to_string());
        self.record(
            DecisionStatus::Consider,
            self.risk_cutoffs.classify(self.review_score),
            self.review_score,
            true,
            Some(reason),
            detail,
            Vec::new(),
        )
    }

    pub fn invalid_input(&self, reason: &str) -> DecisionRecord {
        self.record(
            DecisionStatus::InvalidInput,
            RiskBand::High,
            0.0,
            false,
            Some(reason),
            DecisionDetail::default(),
            Vec::new(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        status: DecisionStatus,
        risk_band: RiskBand,
        score: f64,
        manual_review: bool,
        lead_reason: Option<&str>,
        detail: DecisionDetail,
        fired_rules: Vec<FiredRule>,
    ) -> DecisionRecord {
        let entry = self.vocabulary.entry(status);
        let mut rationale: Vec<String> = lead_reason.map(str::to_string).into_iter().collect();
        rationale.extend(entry.map(|entry| entry.rationale.clone()).unwrap_or_default());

        DecisionRecord {
            status,
            status_label: entry
                .map(|entry| entry.label.clone())
                .unwrap_or_else(|| format!("{status:?}")),
            risk_band,
            score,
            manual_review,
            rationale,
            suggestion: entry
                .filter(|_| status.accepts_suggestion())
                .and_then(|entry| entry.suggestion.clone()),
            policy_version: self.vocabulary.version.clone(),
            detail: detail.rounded(),
            fired_rules,
        }
    }
}
