use crate::cli::PolicyArgs;
use crate::infra::build_engine;
use clap::Args;
use financing_engine::config::AppConfig;
use financing_engine::error::AppError;
use financing_engine::telemetry;
use financing_engine::workflows::financing::{
    ApplicationCsvImporter, ApplicationSubmission, DecisionRecord,
};
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct EvaluateArgs {
    /// Application JSON (object or array). Read from stdin when neither --input nor --csv is given.
    #[arg(long, conflicts_with = "csv")]
    pub(crate) input: Option<String>,
    /// CSV export with one application per row
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Print full decision records as JSON
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubmissionInput {
    Many(Vec<ApplicationSubmission>),
    One(Box<ApplicationSubmission>),
}

impl SubmissionInput {
    fn into_vec(self) -> Vec<ApplicationSubmission> {
        match self {
            SubmissionInput::Many(submissions) => submissions,
            SubmissionInput::One(submission) => vec![*submission],
        }
    }
}

pub(crate) fn parse_submissions(raw: &str) -> Result<Vec<ApplicationSubmission>, AppError> {
    let input: SubmissionInput = serde_json::from_str(raw)?;
    Ok(input.into_vec())
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let engine = build_engine(&config.policy, &args.policy)?;

    let submissions = match (args.csv, args.input) {
        (Some(path), _) => ApplicationCsvImporter::from_path(path)?,
        (None, Some(raw)) => parse_submissions(&raw)?,
        (None, None) => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            parse_submissions(&raw)?
        }
    };

    let records = engine.evaluate_submissions(&submissions);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for (index, (submission, record)) in submissions.iter().zip(&records).enumerate() {
            let name = submission
                .id
                .clone()
                .unwrap_or_else(|| format!("#{}", index + 1));
            println!("{}", render_decision(&name, record));
        }
    }

    Ok(())
}

pub(crate) fn run_policy(args: PolicyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = build_engine(&config.policy, &args)?;
    println!("{}", engine.config().to_json_pretty()?);
    Ok(())
}

pub(crate) fn render_decision(name: &str, record: &DecisionRecord) -> String {
    let mut lines = vec![format!(
        "{name}: {} (score {:.2}, risk {:?}{})",
        record.status_label,
        record.score,
        record.risk_band,
        if record.manual_review {
            ", manual review"
        } else {
            ""
        }
    )];

    let detail = &record.detail;
    if let (Some(installment), Some(tenor)) = (detail.monthly_installment, detail.tenor_months) {
        lines.push(format!("  installment {installment:.0} over {tenor} months"));
    }
    if let Some(note) = &detail.payment_note {
        lines.push(format!("  {note}"));
    }
    lines.extend(record.rationale.iter().map(|line| format!("  - {line}")));
    if let Some(suggestion) = &record.suggestion {
        lines.push(format!("  suggestion: {suggestion}"));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use financing_engine::workflows::financing::{DecisionStatus, FinancingEngine};

    #[test]
    fn accepts_single_object_and_array() {
        let one = parse_submissions(r#"{"gaji":"10jt","item":"general","pekerjaan":"karyawan"}"#)
            .expect("object parses");
        assert_eq!(one.len(), 1);

        let many = parse_submissions(r#"[{"id":"a"},{"id":"b"}]"#).expect("array parses");
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].id.as_deref(), Some("b"));

        assert!(matches!(parse_submissions("nope"), Err(AppError::Input(_))));
    }

    #[test]
    fn rendered_decision_lists_rationale() {
        let engine = FinancingEngine::standard().expect("standard policy compiles");
        let submissions = parse_submissions(
            r#"{"gaji":"Rp 10.000.000","nominal":"100 juta","item":"general","pekerjaan":"karyawan"}"#,
        )
        .expect("parses");
        let record = engine.evaluate_submission(&submissions[0]);
        assert_eq!(record.status, DecisionStatus::Approve);

        let text = render_decision("order-1", &record);
        assert!(text.starts_with("order-1: APPROVE"));
        assert!(text.contains("  - Payment-to-income ratio is low."));
        assert!(!text.contains("suggestion:"));
    }
}
