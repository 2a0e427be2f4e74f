//! CSV export of pending applications, one submission per row.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::intake::{ApplicationSubmission, FieldInput};

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read application export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid application CSV data: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ApplicationCsvImporter;

impl ApplicationCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ApplicationSubmission>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads every row; cells stay text so amount parsing happens at intake.
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ApplicationSubmission>, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut submissions = Vec::new();

        for record in csv_reader.deserialize::<ApplicationRow>() {
            submissions.push(record?.into_submission());
        }

        Ok(submissions)
    }
}

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    salary: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    requested_amount: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    other_obligations: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    down_payment: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    product: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    job: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tenor: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    installment: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    age: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    residence: Option<String>,
}

impl ApplicationRow {
    fn into_submission(self) -> ApplicationSubmission {
        let text = |value: Option<String>| value.map(FieldInput::Text);
        ApplicationSubmission {
            id: self.id,
            salary: text(self.salary),
            requested_amount: text(self.requested_amount),
            other_obligations: text(self.other_obligations),
            down_payment: text(self.down_payment),
            product: self.product,
            job: self.job,
            tenor: text(self.tenor),
            monthly_installment: text(self.installment),
            annual_margin: None,
            age: text(self.age),
            residence: self.residence,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_text_submissions() {
        let csv = "id,salary,requested_amount,other_obligations,down_payment,product,job,tenor,installment,age,residence\n\
                   A-1,Rp 10 jt,100000000,,,general-dana,karyawan,,,,\n\
                   A-2,6000000,150.000.000,3 jt,,mobil bekas,employee,48,,41,kontrak\n";
        let submissions = ApplicationCsvImporter::from_reader(csv.as_bytes()).expect("valid csv");

        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].id.as_deref(), Some("A-1"));
        assert_eq!(submissions[0].salary, Some(FieldInput::Text("Rp 10 jt".to_string())));
        assert_eq!(submissions[0].other_obligations, None);
        assert_eq!(submissions[1].tenor, Some(FieldInput::Text("48".to_string())));
        assert_eq!(submissions[1].residence.as_deref(), Some("kontrak"));

        let profile = submissions[1].normalize().expect("row normalizes");
        assert_eq!(profile.requested_amount, 150_000_000.0);
        assert_eq!(profile.other_obligations, 3_000_000.0);
    }

    #[test]
    fn missing_columns_are_absent_fields() {
        let csv = "salary,product,job\n5000000,motor baru,driver\n";
        let submissions = ApplicationCsvImporter::from_reader(csv.as_bytes()).expect("valid csv");
        assert_eq!(submissions[0].id, None);
        assert_eq!(submissions[0].tenor, None);
        assert!(submissions[0].normalize().is_ok());
    }

    #[test]
    fn missing_file_reports_io_error() {
        let error = ApplicationCsvImporter::from_path("/nonexistent/applications.csv")
            .expect_err("missing file fails");
        assert!(matches!(error, ImportError::Io(_)));
    }
}
