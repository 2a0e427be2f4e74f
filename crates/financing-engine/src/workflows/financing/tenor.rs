use serde::{Deserialize, Serialize};

use super::amortization::monthly_payment;
use super::domain::ProductType;

/// Tenor range and default margin of one financing product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductScheme {
    pub product: ProductType,
    pub min_tenor: u32,
    pub max_tenor: u32,
    #[serde(default = "default_tenor_step")]
    pub tenor_step: u32,
    /// Default annual margin as a fraction, e.g. `0.16`.
    pub annual_margin: f64,
}

fn default_tenor_step() -> u32 {
    1
}

impl ProductScheme {
    pub fn new(product: ProductType, min_tenor: u32, max_tenor: u32, annual_margin: f64) -> Self {
        Self {
            product,
            min_tenor,
            max_tenor,
            tenor_step: 1,
            annual_margin,
        }
    }

    /// Every selectable tenor, shortest first.
    pub fn tenors(&self) -> impl Iterator<Item = u32> {
        (self.min_tenor..=self.max_tenor).step_by(self.tenor_step.max(1) as usize)
    }

    pub fn clamp(&self, months: u32) -> u32 {
        months.clamp(self.min_tenor, self.max_tenor)
    }
}

/// Policy parameters of the tenor search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TenorSearch {
    /// Payment-to-income ratio the search aims for.
    pub target_ratio: f64,
    /// Lower edge of the band the strong-down-payment preference accepts.
    pub acceptable_low_ratio: f64,
    /// Down-payment-to-principal ratio from which shorter terms are preferred.
    pub strong_down_payment_ratio: f64,
}

/// How the tenor of a plan was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenorSource {
    /// Caller's tenor, inside the product range.
    Supplied,
    /// Caller's tenor, moved to the nearest edge of the product range.
    Clamped,
    /// Term whose ratio is closest to the target.
    Optimized,
    /// Shortest term inside the acceptable band, chosen for a strong down payment.
    ShortestInBand,
    /// No usable salary or principal; the longest term is assumed.
    MaximumTerm,
    /// The caller quoted the installment; no term was searched.
    Quoted,
}

/// Inputs to one plan computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanRequest {
    pub salary: f64,
    pub principal: f64,
    pub annual_rate: f64,
    pub down_payment_ratio: Option<f64>,
    pub tenor_hint: Option<u32>,
    pub quoted_installment: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub tenor_months: Option<u32>,
    pub annual_rate: f64,
    pub installment: f64,
    pub payment_to_income: Option<f64>,
    pub source: TenorSource,
}

impl TenorSearch {
    pub fn plan(&self, scheme: &ProductScheme, request: &PlanRequest) -> PaymentPlan {
        let ratio_of = |installment: f64| {
            (request.salary > 0.0).then(|| installment / request.salary)
        };

        if let Some(installment) = request.quoted_installment.filter(|value| *value > 0.0) {
            return PaymentPlan {
                tenor_months: request.tenor_hint.map(|months| scheme.clamp(months)),
                annual_rate: request.annual_rate,
                installment,
                payment_to_income: ratio_of(installment),
                source: TenorSource::Quoted,
            };
        }

        if let Some(hint) = request.tenor_hint {
            let months = scheme.clamp(hint);
            let installment = monthly_payment(request.principal, request.annual_rate, months);
            return PaymentPlan {
                tenor_months: Some(months),
                annual_rate: request.annual_rate,
                installment,
                payment_to_income: ratio_of(installment),
                source: if months == hint {
                    TenorSource::Supplied
                } else {
                    TenorSource::Clamped
                },
            };
        }

        if request.salary <= 0.0 || request.principal <= 0.0 {
            let months = scheme.max_tenor;
            return PaymentPlan {
                tenor_months: Some(months),
                annual_rate: request.annual_rate,
                installment: monthly_payment(request.principal.max(0.0), request.annual_rate, months),
                payment_to_income: None,
                source: TenorSource::MaximumTerm,
            };
        }

        let candidates: Vec<(u32, f64, f64)> = scheme
            .tenors()
            .map(|months| {
                let installment = monthly_payment(request.principal, request.annual_rate, months);
                (months, installment, installment / request.salary)
            })
            .collect();

        let strong_down_payment = request
            .down_payment_ratio
            .is_some_and(|ratio| ratio >= self.strong_down_payment_ratio);
        if strong_down_payment {
            let shortest_in_band = candidates.iter().find(|(_, _, ratio)| {
                (self.acceptable_low_ratio..=self.target_ratio).contains(ratio)
            });
            if let Some(&(months, installment, ratio)) = shortest_in_band {
                return PaymentPlan {
                    tenor_months: Some(months),
                    annual_rate: request.annual_rate,
                    installment,
                    payment_to_income: Some(ratio),
                    source: TenorSource::ShortestInBand,
                };
            }
        }

        // min_by keeps the first, shorter, term on ties
        let best = candidates.iter().min_by(|a, b| {
            (a.2 - self.target_ratio)
                .abs()
                .total_cmp(&(b.2 - self.target_ratio).abs())
        });

        match best {
            Some(&(months, installment, ratio)) => PaymentPlan {
                tenor_months: Some(months),
                annual_rate: request.annual_rate,
                installment,
                payment_to_income: Some(ratio),
                source: TenorSource::Optimized,
            },
            None => {
                let months = scheme.max_tenor;
                let installment = monthly_payment(request.principal, request.annual_rate, months);
                PaymentPlan {
                    tenor_months: Some(months),
                    annual_rate: request.annual_rate,
                    installment,
                    payment_to_income: ratio_of(installment),
                    source: TenorSource::MaximumTerm,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search() -> TenorSearch {
        TenorSearch {
            target_ratio: 0.33,
            acceptable_low_ratio: 0.25,
            strong_down_payment_ratio: 0.24,
        }
    }

    fn general() -> ProductScheme {
        ProductScheme::new(ProductType::GeneralDana, 12, 48, 0.16)
    }

    fn request(salary: f64, principal: f64) -> PlanRequest {
        PlanRequest {
            salary,
            principal,
            annual_rate: 0.16,
            down_payment_ratio: None,
            tenor_hint: None,
            quoted_installment: None,
        }
    }

    #[test]
    fn optimizer_picks_term_closest_to_target() {
        let plan = search().plan(&general(), &request(10_000_000.0, 100_000_000.0));
        assert_eq!(plan.source, TenorSource::Optimized);
        let months = plan.tenor_months.expect("tenor selected");
        let chosen = plan.payment_to_income.expect("ratio computed");

        for other in general().tenors() {
            let ratio = monthly_payment(100_000_000.0, 0.16, other) / 10_000_000.0;
            assert!((chosen - 0.33).abs() <= (ratio - 0.33).abs(), "{other} beats {months}");
        }
    }

    #[test]
    fn strong_down_payment_prefers_shortest_term_in_band() {
        let mut req = request(10_000_000.0, 100_000_000.0);
        req.down_payment_ratio = Some(0.30);
        let plan = search().plan(&general(), &req);

        assert_eq!(plan.source, TenorSource::ShortestInBand);
        let months = plan.tenor_months.expect("tenor selected");
        let ratio = plan.payment_to_income.expect("ratio computed");
        assert!((0.25..=0.33).contains(&ratio));
        let shorter = monthly_payment(100_000_000.0, 0.16, months - 1) / 10_000_000.0;
        assert!(shorter > 0.33);
    }

    #[test]
    fn strong_down_payment_without_band_candidate_falls_back_to_closest() {
        let mut req = request(10_000_000.0, 20_000_000.0);
        req.down_payment_ratio = Some(0.50);
        let plan = search().plan(&general(), &req);
        assert_eq!(plan.source, TenorSource::Optimized);
        assert_eq!(plan.tenor_months, Some(12));
    }

    #[test]
    fn supplied_tenor_is_clamped_never_replaced() {
        let mut req = request(10_000_000.0, 100_000_000.0);
        req.tenor_hint = Some(60);
        let plan = search().plan(&general(), &req);
        assert_eq!(plan.tenor_months, Some(48));
        assert_eq!(plan.source, TenorSource::Clamped);

        req.tenor_hint = Some(24);
        let plan = search().plan(&general(), &req);
        assert_eq!(plan.tenor_months, Some(24));
        assert_eq!(plan.source, TenorSource::Supplied);
        assert_eq!(plan.installment, monthly_payment(100_000_000.0, 0.16, 24));
    }

    #[test]
    fn degenerate_inputs_use_maximum_term_without_ratio() {
        let plan = search().plan(&general(), &request(0.0, 100_000_000.0));
        assert_eq!(plan.tenor_months, Some(48));
        assert_eq!(plan.payment_to_income, None);
        assert_eq!(plan.source, TenorSource::MaximumTerm);
        assert_eq!(plan.installment, monthly_payment(100_000_000.0, 0.16, 48));

        let plan = search().plan(&general(), &request(5_000_000.0, 0.0));
        assert_eq!(plan.installment, 0.0);
    }

    #[test]
    fn quoted_installment_is_used_verbatim() {
        let mut req = request(5_000_000.0, 20_000_000.0);
        req.quoted_installment = Some(1_400_000.0);
        let plan = search().plan(&general(), &req);
        assert_eq!(plan.source, TenorSource::Quoted);
        assert_eq!(plan.installment, 1_400_000.0);
        assert_eq!(plan.tenor_months, None);
        assert!((plan.payment_to_income.expect("ratio") - 0.28).abs() < 1e-12);
    }

    #[test]
    fn stepped_schemes_only_offer_steps() {
        let scheme = ProductScheme {
            tenor_step: 6,
            ..general()
        };
        let tenors: Vec<u32> = scheme.tenors().collect();
        assert_eq!(tenors, vec![12, 18, 24, 30, 36, 42, 48]);
    }
}
