use super::decision::SignalSet;
use super::domain::{EligibilityDecision, EligibilityOutcome, ValidatedRecord};
use super::enablement::EnablementRecommendation;
use super::readiness::ReadinessResult;

/// Read-only view handed to a narrator. Narrators describe the outcome; they never revise it.
#[derive(Debug, Clone, Copy)]
pub struct ExplanationContext<'a> {
    pub record: &'a ValidatedRecord,
    pub readiness: &'a ReadinessResult,
    pub outcome: &'a EligibilityOutcome,
    pub signals: Option<&'a SignalSet>,
    pub enablement: &'a EnablementRecommendation,
}

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("explanation narrator unavailable: {0}")]
    Unavailable(String),
}

/// Seam for an external natural-language narrator.
pub trait ExplanationNarrator: Send + Sync {
    fn narrate(&self, context: &ExplanationContext<'_>) -> Result<String, NarrationError>;
}

/// Deterministic narrator that restates the outcome section by section.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator;

impl ExplanationNarrator for TemplateNarrator {
    fn narrate(&self, context: &ExplanationContext<'_>) -> Result<String, NarrationError> {
        let sections = [
            section("Decision Summary", decision_lines(context)),
            section("Key Signals", signal_lines(context)),
            section("Decision Logic", logic_lines(context)),
            section("Enablement Support", enablement_lines(context.enablement)),
            section("Next Steps", next_step_lines(context)),
        ];
        Ok(sections.join("\n\n"))
    }
}

fn section(title: &str, lines: Vec<String>) -> String {
    let mut body = format!("#### {title}");
    for line in lines {
        body.push_str("\n- ");
        body.push_str(&line);
    }
    body
}

fn decision_lines(context: &ExplanationContext<'_>) -> Vec<String> {
    let outcome = context.outcome;
    let mut lines = vec![format!("Decision: {}.", outcome.decision)];
    if let Some(probability) = outcome.probability {
        lines.push(format!(
            "Estimated likelihood of matching the support-need pattern: {probability:.3}."
        ));
    }
    lines.push(format!("Basis: {}.", outcome.reason));
    lines
}

fn signal_lines(context: &ExplanationContext<'_>) -> Vec<String> {
    let Some(signals) = context.signals else {
        return vec!["No signals were computed because the application was not scored.".into()];
    };

    let mut lines = Vec::new();
    match signals.income_per_capita {
        Some(value) => lines.push(format!("Income per household member: {value:.2}.")),
        None => lines.push("Income per household member: unknown.".into()),
    }
    match signals.net_worth {
        Some(value) => lines.push(format!("Net worth (assets minus liabilities): {value:.2}.")),
        None => lines.push("Net worth: unknown, assets or liabilities were not stated.".into()),
    }

    let triggered = signals.triggered();
    if triggered.is_empty() {
        lines.push("None of the audit rules were triggered.".into());
    } else {
        for flag in triggered {
            lines.push(format!("`{}`: {}.", flag.name(), flag.description()));
        }
    }
    lines
}

fn logic_lines(context: &ExplanationContext<'_>) -> Vec<String> {
    match context.outcome.decision {
        EligibilityDecision::ManualReview => {
            let missing: Vec<&str> = context
                .readiness
                .missing_fields
                .iter()
                .map(|field| field.title())
                .collect();
            vec![format!(
                "The application could not be scored because required information is missing: {}.",
                missing.join(", ")
            )]
        }
        decision => vec![
            format!(
                "The eligibility model, constrained to respond to income, household size, \
                 tenure, credit standing and net worth in fixed policy directions, placed \
                 this application in the {decision} band."
            ),
            "The audit rules listed above are human-readable proxies computed from the \
             application. They are not the model's decision path."
                .into(),
        ],
    }
}

fn enablement_lines(enablement: &EnablementRecommendation) -> Vec<String> {
    if enablement.is_empty() {
        return vec!["No enablement support was recommended.".into()];
    }

    let mut lines = Vec::new();
    if enablement.job_matching {
        lines.push("Job matching.".into());
    }
    if enablement.training {
        lines.push("Upskilling and training.".into());
    }
    if enablement.career_counseling {
        lines.push("Career counseling.".into());
    }
    if !enablement.reasons.is_empty() {
        lines.push(format!("Reasons: {}.", enablement.reasons.join("; ")));
    }
    lines
}

fn next_step_lines(context: &ExplanationContext<'_>) -> Vec<String> {
    let line = match context.outcome.decision {
        EligibilityDecision::Approve => {
            "The application proceeds to disbursement review by a case officer."
        }
        EligibilityDecision::SoftDecline => {
            "The applicant may reapply with updated documents or engage with the recommended \
             support programmes."
        }
        EligibilityDecision::Reject => {
            "The applicant may request a review or engage with the recommended support \
             programmes."
        }
        EligibilityDecision::ManualReview => {
            "Provide the missing information so the application can be assessed."
        }
    };
    vec![line.to_string()]
}

/// Status block shown in the conversational channel.
pub fn decision_summary(outcome: &EligibilityOutcome) -> String {
    format!(
        "### Eligibility Decision\n**Status:** {}\n\n**Reason:** {}",
        outcome.decision, outcome.reason
    )
}

/// Follow-up request for missing mandatory fields; `None` once the record is ready.
pub fn missing_information_prompt(readiness: &ReadinessResult) -> Option<String> {
    if readiness.is_ready() {
        return None;
    }

    let fields: Vec<String> = readiness
        .missing_fields
        .iter()
        .map(|field| format!("• {}", field.title()))
        .collect();

    Some(format!(
        "We need a bit more information to continue.\n\nPlease provide the following:\n{}\n\n\
         You can type it or upload another document.",
        fields.join("\n")
    ))
}
