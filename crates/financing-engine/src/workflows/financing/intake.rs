//! Normalization of loosely-typed submissions into [`ApplicantProfile`]s.

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantProfile, JobCategory, ProductType, ResidenceType};
use super::money::{parse_amount, MoneyError};

const MAX_AGE: u32 = 120;

/// Field value as it arrives from a form, a JSON client or a CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput {
    Number(f64),
    Text(String),
}

impl From<f64> for FieldInput {
    fn from(value: f64) -> Self {
        FieldInput::Number(value)
    }
}

impl From<&str> for FieldInput {
    fn from(value: &str) -> Self {
        FieldInput::Text(value.to_string())
    }
}

/// Raw application as submitted. Field aliases accept the Indonesian names used
/// by the order intake forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "gaji", alias = "income")]
    pub salary: Option<FieldInput>,
    #[serde(alias = "pengajuan_baru", alias = "nominal")]
    pub requested_amount: Option<FieldInput>,
    #[serde(alias = "cicilan_lain")]
    pub other_obligations: Option<FieldInput>,
    #[serde(alias = "dp")]
    pub down_payment: Option<FieldInput>,
    #[serde(alias = "item", alias = "jenis_pengajuan")]
    pub product: Option<String>,
    #[serde(alias = "pekerjaan", alias = "job_category")]
    pub job: Option<String>,
    pub tenor: Option<FieldInput>,
    #[serde(alias = "angsuran", alias = "installment")]
    pub monthly_installment: Option<FieldInput>,
    #[serde(alias = "margin_tahunan")]
    pub annual_margin: Option<FieldInput>,
    #[serde(alias = "usia")]
    pub age: Option<FieldInput>,
    #[serde(alias = "tempat_tinggal")]
    pub residence: Option<String>,
}

/// Per-field intake failure. Surfaced as an `InvalidInput` decision, never as a crash.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidInput {
    #[error("{field}: {source}")]
    Money {
        field: &'static str,
        source: MoneyError,
    },
    #[error("{field} must be a finite non-negative number, found {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("unknown product '{0}'")]
    UnknownProduct(String),
    #[error("unknown job category '{0}'")]
    UnknownJob(String),
    #[error("unknown residence type '{0}'")]
    UnknownResidence(String),
    #[error("tenor must be a positive whole number of months, found '{0}'")]
    InvalidTenor(String),
    #[error("age must be a whole number of years up to 120, found '{0}'")]
    InvalidAge(String),
    #[error("annual margin must be a finite non-negative fraction, found '{0}'")]
    InvalidMargin(String),
}

fn amount(field: &'static str, input: Option<&FieldInput>) -> Result<Option<f64>, InvalidInput> {
    let value = match input {
        None => return Ok(None),
        Some(FieldInput::Number(value)) => *value,
        Some(FieldInput::Text(text)) => {
            parse_amount(text).map_err(|source| InvalidInput::Money { field, source })?
        }
    };
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidInput::Negative { field, value });
    }
    Ok(Some(value))
}

fn whole_number(input: Option<&FieldInput>) -> Option<Result<u32, String>> {
    let parsed = match input? {
        FieldInput::Number(value) => {
            if value.is_finite() && *value >= 0.0 && value.fract() == 0.0 && *value <= f64::from(u32::MAX)
            {
                Ok(*value as u32)
            } else {
                Err(value.to_string())
            }
        }
        FieldInput::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            // leading digits, optionally followed by a unit word such as "bulan"
            let split = trimmed
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(trimmed.len());
            let (digits, rest) = trimmed.split_at(split);
            let rest = rest.trim_start();
            if rest.is_empty() || rest.starts_with(|c: char| c.is_alphabetic()) {
                digits.parse::<u32>().map_err(|_| trimmed.to_string())
            } else {
                Err(trimmed.to_string())
            }
        }
    };
    Some(parsed)
}

fn label(input: Option<&String>) -> Option<&str> {
    input.map(|value| value.trim()).filter(|value| !value.is_empty())
}

impl ApplicationSubmission {
    /// Validates every field and produces the normalized profile. Missing money
    /// fields default to zero; a missing or unknown product or job is invalid.
    pub fn normalize(&self) -> Result<ApplicantProfile, InvalidInput> {
        let salary = amount("salary", self.salary.as_ref())?.unwrap_or(0.0);
        let requested_amount =
            amount("requested_amount", self.requested_amount.as_ref())?.unwrap_or(0.0);
        let other_obligations =
            amount("other_obligations", self.other_obligations.as_ref())?.unwrap_or(0.0);
        let down_payment =
            amount("down_payment", self.down_payment.as_ref())?.filter(|value| *value > 0.0);
        let monthly_installment = amount("monthly_installment", self.monthly_installment.as_ref())?
            .filter(|value| *value > 0.0);

        let product_label = label(self.product.as_ref())
            .ok_or(InvalidInput::Missing { field: "product" })?;
        let product = ProductType::parse(product_label)
            .ok_or_else(|| InvalidInput::UnknownProduct(product_label.to_string()))?;
        let job_label =
            label(self.job.as_ref()).ok_or(InvalidInput::Missing { field: "job" })?;
        let job_category = JobCategory::parse(job_label)
            .ok_or_else(|| InvalidInput::UnknownJob(job_label.to_string()))?;
        let residence = match label(self.residence.as_ref()) {
            Some(raw) => Some(
                ResidenceType::parse(raw)
                    .ok_or_else(|| InvalidInput::UnknownResidence(raw.to_string()))?,
            ),
            None => None,
        };

        let tenor_months = match whole_number(self.tenor.as_ref()) {
            Some(Ok(0)) => return Err(InvalidInput::InvalidTenor("0".to_string())),
            Some(Ok(months)) => Some(months),
            Some(Err(raw)) => return Err(InvalidInput::InvalidTenor(raw)),
            None => None,
        };
        let age = match whole_number(self.age.as_ref()) {
            Some(Ok(years)) if years <= MAX_AGE => Some(years),
            Some(Ok(years)) => return Err(InvalidInput::InvalidAge(years.to_string())),
            Some(Err(raw)) => return Err(InvalidInput::InvalidAge(raw)),
            None => None,
        };
        let annual_margin = margin(self.annual_margin.as_ref())?;

        Ok(ApplicantProfile {
            salary,
            requested_amount,
            other_obligations,
            down_payment,
            job_category,
            product,
            tenor_months,
            age,
            residence,
            monthly_installment,
            annual_margin,
        })
    }
}

fn margin(input: Option<&FieldInput>) -> Result<Option<f64>, InvalidInput> {
    let value = match input {
        None => return Ok(None),
        Some(FieldInput::Number(value)) => *value,
        Some(FieldInput::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let (number, percent) = match trimmed.strip_suffix('%') {
                Some(number) => (number.trim(), true),
                None => (trimmed, false),
            };
            let parsed: f64 = number
                .replace(',', ".")
                .parse()
                .map_err(|_| InvalidInput::InvalidMargin(trimmed.to_string()))?;
            if percent {
                parsed / 100.0
            } else {
                parsed
            }
        }
    };
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidInput::InvalidMargin(value.to_string()));
    }
    // margins written as whole percentages, e.g. 16
    Ok(Some(if value > 1.0 { value / 100.0 } else { value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indonesian_field_names_and_text_amounts_normalize() {
        let submission: ApplicationSubmission = serde_json::from_value(serde_json::json!({
            "gaji": "Rp 7,5 jt",
            "pengajuan_baru": 25_000_000,
            "cicilan_lain": "500 rb",
            "dp": "5.000.000",
            "item": "Motor Bekas",
            "pekerjaan": "karyawan",
            "usia": "35",
            "margin_tahunan": "21%"
        }))
        .expect("valid submission");

        let profile = submission.normalize().expect("normalizes");
        assert_eq!(profile.salary, 7_500_000.0);
        assert_eq!(profile.requested_amount, 25_000_000.0);
        assert_eq!(profile.other_obligations, 500_000.0);
        assert_eq!(profile.down_payment, Some(5_000_000.0));
        assert_eq!(profile.product, ProductType::MotorUsed);
        assert_eq!(profile.job_category, JobCategory::Employee);
        assert_eq!(profile.age, Some(35));
        assert_eq!(profile.annual_margin, Some(0.21));
        assert_eq!(profile.tenor_months, None);
    }

    #[test]
    fn whole_percent_margins_are_scaled() {
        let submission = ApplicationSubmission {
            annual_margin: Some(16.0.into()),
            ..base()
        };
        assert_eq!(submission.normalize().expect("valid").annual_margin, Some(0.16));
    }

    fn base() -> ApplicationSubmission {
        ApplicationSubmission {
            salary: Some(10_000_000.0.into()),
            requested_amount: Some(100_000_000.0.into()),
            product: Some("general-dana".to_string()),
            job: Some("employee".to_string()),
            ..ApplicationSubmission::default()
        }
    }

    #[test]
    fn negative_amounts_are_invalid() {
        let submission = ApplicationSubmission {
            other_obligations: Some((-1.0).into()),
            ..base()
        };
        assert_eq!(
            submission.normalize(),
            Err(InvalidInput::Negative {
                field: "other_obligations",
                value: -1.0
            })
        );
    }

    #[test]
    fn unparsable_money_is_invalid() {
        let submission = ApplicationSubmission {
            salary: Some("sepuluh juta".into()),
            ..base()
        };
        assert!(matches!(
            submission.normalize(),
            Err(InvalidInput::Money { field: "salary", .. })
        ));
    }

    #[test]
    fn unknown_labels_are_invalid() {
        let submission = ApplicationSubmission {
            product: Some("boat".to_string()),
            ..base()
        };
        assert_eq!(
            submission.normalize(),
            Err(InvalidInput::UnknownProduct("boat".to_string()))
        );

        let submission = ApplicationSubmission {
            job: None,
            ..base()
        };
        assert_eq!(
            submission.normalize(),
            Err(InvalidInput::Missing { field: "job" })
        );
    }

    #[test]
    fn tenor_accepts_month_suffix_and_rejects_zero() {
        let submission = ApplicationSubmission {
            tenor: Some("24 bulan".into()),
            ..base()
        };
        assert_eq!(submission.normalize().expect("valid").tenor_months, Some(24));

        let submission = ApplicationSubmission {
            tenor: Some(0.0.into()),
            ..base()
        };
        assert_eq!(
            submission.normalize(),
            Err(InvalidInput::InvalidTenor("0".to_string()))
        );

        let submission = ApplicationSubmission {
            tenor: Some("24.5".into()),
            ..base()
        };
        assert_eq!(
            submission.normalize(),
            Err(InvalidInput::InvalidTenor("24.5".to_string()))
        );

        let submission = ApplicationSubmission {
            tenor: Some("dua tahun".into()),
            ..base()
        };
        assert!(matches!(
            submission.normalize(),
            Err(InvalidInput::InvalidTenor(_))
        ));
    }

    #[test]
    fn zero_down_payment_and_installment_count_as_absent() {
        let submission = ApplicationSubmission {
            down_payment: Some(0.0.into()),
            monthly_installment: Some("0".into()),
            ..base()
        };
        let profile = submission.normalize().expect("valid");
        assert_eq!(profile.down_payment, None);
        assert_eq!(profile.monthly_installment, None);
    }

    #[test]
    fn fractional_age_is_rejected_as_text_and_number() {
        for age in [FieldInput::from("41,5"), FieldInput::Number(41.5)] {
            let submission = ApplicationSubmission {
                age: Some(age),
                ..base()
            };
            assert!(matches!(
                submission.normalize(),
                Err(InvalidInput::InvalidAge(_))
            ));
        }
    }

    #[test]
    fn decimal_comma_salary_keeps_its_magnitude() {
        let submission = ApplicationSubmission {
            salary: Some("Rp 3.000.000,00".into()),
            ..base()
        };
        assert_eq!(submission.normalize().expect("valid").salary, 3_000_000.0);
    }
}
