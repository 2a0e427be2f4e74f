//! Financing application decisions: intake normalization, knockout gate, tenor
//! planning, fuzzy scoring, and the service/router surface around them.

pub mod amortization;
pub mod decision;
pub mod domain;
mod engine;
pub mod fuzzy;
pub mod import;
pub mod intake;
pub mod knockout;
pub mod money;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod tenor;

#[cfg(test)]
mod tests;

pub use amortization::monthly_payment;
pub use decision::{
    CutoffTable, CutoffTier, DecisionAssembler, DecisionDetail, DecisionRecord, DecisionStatus,
    FiredRule, PaymentNotes, RiskBand, ScoreScale, StatusEntry, StatusVocabulary,
};
pub use domain::{ApplicantProfile, ApplicationId, JobCategory, ProductType, ResidenceType};
pub use engine::{FinancingEngine, Inference};
pub use import::{ApplicationCsvImporter, ImportError};
pub use intake::{ApplicationSubmission, FieldInput, InvalidInput};
pub use knockout::{
    AgeCeiling, DebtBurdenBasis, GateInput, GateOutcome, KnockoutCheck, KnockoutGate,
};
pub use money::{parse_amount, MoneyError};
pub use policy::{indonesian_vocabulary, standard_vocabulary, EngineConfig, PolicyError};
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationStatus, ApplicationStatusView,
    RepositoryError,
};
pub use router::financing_router;
pub use service::{ApplicationServiceError, FinancingApplicationService, PendingRunSummary};
pub use tenor::{PaymentPlan, PlanRequest, ProductScheme, TenorSearch, TenorSource};
