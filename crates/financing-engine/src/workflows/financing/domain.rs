use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted financing applications.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized applicant record consumed by the engine. Monetary values are in
/// whole currency units per month unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub salary: f64,
    pub requested_amount: f64,
    #[serde(default)]
    pub other_obligations: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment: Option<f64>,
    pub job_category: JobCategory,
    pub product: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenor_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residence: Option<ResidenceType>,
    /// Installment quoted by the caller; when present the optimizer is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_installment: Option<f64>,
    /// Annual margin overriding the product scheme default, as a fraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_margin: Option<f64>,
}

impl ApplicantProfile {
    pub fn new(
        salary: f64,
        requested_amount: f64,
        job_category: JobCategory,
        product: ProductType,
    ) -> Self {
        Self {
            salary,
            requested_amount,
            other_obligations: 0.0,
            down_payment: None,
            job_category,
            product,
            tenor_months: None,
            age: None,
            residence: None,
            monthly_installment: None,
            annual_margin: None,
        }
    }

    pub fn with_other_obligations(mut self, amount: f64) -> Self {
        self.other_obligations = amount;
        self
    }

    pub fn with_down_payment(mut self, amount: f64) -> Self {
        self.down_payment = Some(amount);
        self
    }

    pub fn with_tenor(mut self, months: u32) -> Self {
        self.tenor_months = Some(months);
        self
    }

    pub fn with_age(mut self, years: u32) -> Self {
        self.age = Some(years);
        self
    }

    pub fn with_residence(mut self, residence: ResidenceType) -> Self {
        self.residence = Some(residence);
        self
    }

    pub fn with_installment(mut self, amount: f64) -> Self {
        self.monthly_installment = Some(amount);
        self
    }

    pub fn with_annual_margin(mut self, margin: f64) -> Self {
        self.annual_margin = Some(margin);
        self
    }
}

/// Closed job taxonomy produced by the upstream classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    CivilServant,
    Employee,
    Professional,
    SelfEmployed,
    Freelancer,
    Driver,
    Laborer,
    Farmer,
    Unemployed,
}

impl JobCategory {
    pub const ALL: [JobCategory; 9] = [
        JobCategory::CivilServant,
        JobCategory::Employee,
        JobCategory::Professional,
        JobCategory::SelfEmployed,
        JobCategory::Freelancer,
        JobCategory::Driver,
        JobCategory::Laborer,
        JobCategory::Farmer,
        JobCategory::Unemployed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            JobCategory::CivilServant => "civil_servant",
            JobCategory::Employee => "employee",
            JobCategory::Professional => "professional",
            JobCategory::SelfEmployed => "self_employed",
            JobCategory::Freelancer => "freelancer",
            JobCategory::Driver => "driver",
            JobCategory::Laborer => "laborer",
            JobCategory::Farmer => "farmer",
            JobCategory::Unemployed => "unemployed",
        }
    }

    /// Case-insensitive lookup accepting the canonical label, spaced or hyphenated
    /// variants and the Indonesian category names.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize_label(raw);
        let category = match key.as_str() {
            "civil_servant" | "pns" | "pegawai_negeri" | "asn" => JobCategory::CivilServant,
            "employee" | "karyawan" | "pegawai_swasta" | "pegawai" | "staff" => {
                JobCategory::Employee
            }
            "professional" | "profesional" => JobCategory::Professional,
            "self_employed" | "wiraswasta" | "pengusaha" | "pedagang" => JobCategory::SelfEmployed,
            "freelancer" | "freelance" | "pekerja_lepas" => JobCategory::Freelancer,
            "driver" | "sopir" | "ojol" => JobCategory::Driver,
            "laborer" | "buruh" => JobCategory::Laborer,
            "farmer" | "petani" | "nelayan" => JobCategory::Farmer,
            "unemployed" | "tidak_bekerja" | "pengangguran" => JobCategory::Unemployed,
            _ => return None,
        };
        Some(category)
    }
}

/// Financing products offered, each with its own tenor range and margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    MotorNew,
    MotorUsed,
    CarNew,
    CarUsed,
    GeneralDana,
}

impl ProductType {
    pub const ALL: [ProductType; 5] = [
        ProductType::MotorNew,
        ProductType::MotorUsed,
        ProductType::CarNew,
        ProductType::CarUsed,
        ProductType::GeneralDana,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ProductType::MotorNew => "motor-new",
            ProductType::MotorUsed => "motor-used",
            ProductType::CarNew => "car-new",
            ProductType::CarUsed => "car-used",
            ProductType::GeneralDana => "general-dana",
        }
    }

    pub fn is_car(self) -> bool {
        matches!(self, ProductType::CarNew | ProductType::CarUsed)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize_label(raw);
        let product = match key.as_str() {
            "motor_new" | "motor_baru" => ProductType::MotorNew,
            "motor_used" | "motor_bekas" => ProductType::MotorUsed,
            "car_new" | "mobil_baru" => ProductType::CarNew,
            "car_used" | "mobil_bekas" => ProductType::CarUsed,
            "general_dana" | "general" | "dana" | "multiguna" => ProductType::GeneralDana,
            other if other.starts_with("amanah") => ProductType::GeneralDana,
            _ => return None,
        };
        Some(product)
    }
}

/// Where the applicant currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidenceType {
    Owned,
    Family,
    Rented,
    Company,
    Boarding,
}

impl ResidenceType {
    pub const fn label(self) -> &'static str {
        match self {
            ResidenceType::Owned => "owned",
            ResidenceType::Family => "family",
            ResidenceType::Rented => "rented",
            ResidenceType::Company => "company",
            ResidenceType::Boarding => "boarding",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize_label(raw);
        let residence = match key.as_str() {
            "owned" | "own" | "milik_sendiri" | "rumah_sendiri" => ResidenceType::Owned,
            "family" | "keluarga" | "orang_tua" => ResidenceType::Family,
            "rented" | "rent" | "kontrak" | "sewa" => ResidenceType::Rented,
            "company" | "dinas" | "mess" => ResidenceType::Company,
            "boarding" | "kost" | "kos" => ResidenceType::Boarding,
            _ => return None,
        };
        Some(residence)
    }
}

fn normalize_label(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
