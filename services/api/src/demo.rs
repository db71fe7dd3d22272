use crate::infra::{build_assessment_service, AssessmentService};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use support_ai::config::AppConfig;
use support_ai::error::AppError;
use support_ai::workflows::eligibility::{
    ApplicantBatchImporter, AssessmentReport, EducationLevel, EmploymentStatus, SignalSet,
    ValidatedRecord, SIGNALS_BASIS,
};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Path to a JSON applicant record
    #[arg(long)]
    pub(crate) record: PathBuf,
    /// Print the full report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one applicant per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Emit one JSON object per applicant instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Include the narrated explanation for each household
    #[arg(long)]
    pub(crate) explain: bool,
}

fn load_service() -> Result<AssessmentService, AppError> {
    let config = AppConfig::load()?;
    build_assessment_service(&config.eligibility)
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.record)?;
    let record: ValidatedRecord = serde_json::from_str(&raw)?;

    let service = load_service()?;
    let report = service.assess(&record)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_report(&report, true);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let applicants = ApplicantBatchImporter::from_path(&args.csv)?;
    let service = load_service()?;

    if !args.json {
        println!(
            "{:<12} {:<14} {:>11} {:>9}",
            "applicant", "decision", "probability", "anomalies"
        );
    }

    for applicant in applicants {
        let report = service.assess(&applicant.validation.record)?;
        if args.json {
            let line = json!({
                "applicant_id": applicant.applicant_id,
                "anomalies": applicant.validation.anomalies,
                "report": report,
            });
            println!("{}", serde_json::to_string(&line)?);
        } else {
            let probability = report
                .outcome
                .probability
                .map(|p| format!("{p:.3}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<12} {:<14} {:>11} {:>9}",
                applicant.applicant_id,
                report.outcome.decision.label(),
                probability,
                applicant.validation.anomalies.len()
            );
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Social support eligibility demo");
    let service = load_service()?;

    for (label, record) in sample_households() {
        println!("\n== {label}");
        let report = service.assess(&record)?;
        render_report(&report, args.explain);
    }

    Ok(())
}

fn render_report(report: &AssessmentReport, explain: bool) {
    println!(
        "Assessed at {}",
        report.assessed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}", report.summary);
    if let Some(probability) = report.outcome.probability {
        println!("Probability: {probability:.3}");
    }

    if let Some(line) = report.signals.as_ref().map(audit_rules_line) {
        println!("{line}");
    }

    if !report.enablement.is_empty() {
        println!("Enablement: {}", report.enablement.reasons.join("; "));
    }

    if let Some(follow_up) = &report.follow_up {
        println!("\n{follow_up}");
    }

    if explain {
        if let Some(explanation) = &report.explanation {
            println!("\n{explanation}");
        }
    }
}

fn audit_rules_line(signals: &SignalSet) -> String {
    let flags: Vec<&str> = signals.triggered().iter().map(|flag| flag.name()).collect();
    let listed = if flags.is_empty() {
        "none triggered".to_string()
    } else {
        flags.join(", ")
    };
    format!("Audit rules ({SIGNALS_BASIS}): {listed}")
}

fn sample_households() -> Vec<(&'static str, ValidatedRecord)> {
    vec![
        (
            "Unemployed family of four",
            ValidatedRecord {
                income: Some(3_000.0),
                family_size: Some(4),
                employment_years: Some(1),
                employment_status: Some(EmploymentStatus::Unemployed),
                education_level: Some(EducationLevel::HighSchool),
                assets: Some(0.0),
                liabilities: Some(5_000.0),
                credit_score: None,
            },
        ),
        (
            "Self-employed couple",
            ValidatedRecord {
                income: Some(32_000.0),
                family_size: Some(2),
                employment_years: Some(6),
                employment_status: Some(EmploymentStatus::SelfEmployed),
                education_level: Some(EducationLevel::Bachelor),
                assets: Some(20_000.0),
                liabilities: Some(12_000.0),
                credit_score: Some(690.0),
            },
        ),
        (
            "Salaried single professional",
            ValidatedRecord {
                income: Some(150_000.0),
                family_size: Some(1),
                employment_years: Some(10),
                employment_status: Some(EmploymentStatus::Employed),
                education_level: Some(EducationLevel::Masters),
                assets: Some(300_000.0),
                liabilities: Some(40_000.0),
                credit_score: Some(760.0),
            },
        ),
        (
            "Incomplete application",
            ValidatedRecord {
                income: Some(4_200.0),
                ..ValidatedRecord::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_households_cover_manual_review() {
        let households = sample_households();

        assert_eq!(households.len(), 4);
        let incomplete = &households[3].1;
        assert!(incomplete.employment_status.is_none());
        assert!(households[..3]
            .iter()
            .all(|(_, record)| record.income.is_some() && record.family_size.is_some()));
    }

    #[test]
    fn audit_rules_line_carries_proxy_caveat() {
        let (_, record) = &sample_households()[0];
        let line = audit_rules_line(&SignalSet::from_record(record));

        assert!(line.starts_with("Audit rules ("));
        assert!(line.contains("not the model's decision path"));
        assert!(line.ends_with("rule_negative_net_worth_unemployed"));
    }

    #[test]
    fn audit_rules_line_keeps_caveat_when_nothing_fires() {
        let (_, record) = &sample_households()[2];
        let line = audit_rules_line(&SignalSet::from_record(record));

        assert!(line.contains(SIGNALS_BASIS));
        assert!(line.ends_with(": none triggered"));
    }
}
