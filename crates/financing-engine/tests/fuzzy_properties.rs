//! Property checks for the membership primitives, the tenor planner and scoring bounds.

use financing_engine::workflows::financing::fuzzy::{ramp_down, ramp_up, trapezoidal, triangular};
use financing_engine::workflows::financing::{
    monthly_payment, ApplicantProfile, DecisionStatus, EngineConfig, FinancingEngine, JobCategory,
    PlanRequest, ProductScheme, ProductType, TenorSearch,
};
use proptest::prelude::*;

fn sorted_points(count: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1_000.0f64..1_000.0, count).prop_map(|mut points| {
        points.sort_by(f64::total_cmp);
        points
    })
}

fn search() -> TenorSearch {
    TenorSearch {
        target_ratio: 0.33,
        acceptable_low_ratio: 0.25,
        strong_down_payment_ratio: 0.24,
    }
}

#[test]
fn standard_labels_are_exact_at_their_cores() {
    for variable in EngineConfig::standard().variables {
        for set in &variable.sets {
            let center = set.shape.core_center();
            let degrees = variable.degrees(Some(center));
            for (label, degree) in &degrees {
                let expected = if *label == set.label { 1.0 } else { 0.0 };
                assert_eq!(
                    *degree,
                    expected,
                    "{} {label} at the core of {}",
                    variable.id.label(),
                    set.label
                );
            }
        }
    }
}

proptest! {
    #[test]
    fn triangular_stays_in_unit_interval(points in sorted_points(3), x in -2_000.0f64..2_000.0) {
        let degree = triangular(x, points[0], points[1], points[2]);
        prop_assert!((0.0..=1.0).contains(&degree));
    }

    #[test]
    fn trapezoidal_stays_in_unit_interval(points in sorted_points(4), x in -2_000.0f64..2_000.0) {
        let degree = trapezoidal(x, points[0], points[1], points[2], points[3]);
        prop_assert!((0.0..=1.0).contains(&degree));
        if points[1] <= x && x <= points[2] {
            prop_assert_eq!(degree, 1.0);
        }
    }

    #[test]
    fn ramps_are_complementary(points in sorted_points(2), x in -2_000.0f64..2_000.0) {
        prop_assume!(points[1] > points[0]);
        let up = ramp_up(x, points[0], points[1]);
        let down = ramp_down(x, points[0], points[1]);
        prop_assert!((up + down - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_rate_divides_principal_evenly(principal in 0.0f64..1e10, months in 1u32..120) {
        let payment = monthly_payment(principal, 0.0, months);
        prop_assert!((payment - principal / f64::from(months)).abs() <= 1e-6 * principal.max(1.0));
    }

    #[test]
    fn positive_rate_costs_more_than_zero_rate(principal in 1.0f64..1e10, rate in 0.01f64..0.5, months in 1u32..120) {
        prop_assert!(monthly_payment(principal, rate, months) > principal / f64::from(months));
    }

    #[test]
    fn planned_tenor_stays_in_product_range(
        salary in 0.0f64..1e9,
        principal in 0.0f64..1e10,
        dp_ratio in proptest::option::of(0.0f64..1.0),
        hint in proptest::option::of(0u32..200),
    ) {
        let scheme = ProductScheme::new(ProductType::CarNew, 12, 48, 0.16);
        let plan = search().plan(&scheme, &PlanRequest {
            salary,
            principal,
            annual_rate: 0.16,
            down_payment_ratio: dp_ratio,
            tenor_hint: hint,
            quoted_installment: None,
        });
        let months = plan.tenor_months.expect("tenor always planned without a quote");
        prop_assert!((12..=48).contains(&months));
        prop_assert!(plan.installment >= 0.0);
    }

    #[test]
    fn scored_decisions_stay_within_consequent_hull(
        salary in 1_000_000.0f64..60_000_000.0,
        requested in 1_000_000.0f64..600_000_000.0,
        obligations in 0.0f64..10_000_000.0,
        down_payment in proptest::option::of(0.0f64..100_000_000.0),
    ) {
        let engine = FinancingEngine::standard().expect("standard policy compiles");
        let mut profile = ApplicantProfile::new(salary, requested, JobCategory::Employee, ProductType::GeneralDana)
            .with_other_obligations(obligations);
        if let Some(dp) = down_payment {
            profile = profile.with_down_payment(dp);
        }

        let record = engine.evaluate(&profile);
        let repeat = engine.evaluate(&profile);
        prop_assert_eq!(&record, &repeat);
        prop_assert_eq!(
            serde_json::to_vec(&record).expect("serializes"),
            serde_json::to_vec(&repeat).expect("serializes")
        );
        if matches!(record.status, DecisionStatus::Approve | DecisionStatus::Consider | DecisionStatus::Reject)
            && !record.manual_review
        {
            prop_assert!(record.score >= 20.0 && record.score <= 85.0, "score {}", record.score);
        }
    }
}
