//! Diagnosis stage progression.
//!
//! greeting → problem_identification → symptom_analysis → recommendation → completed
//!
//! Stages only move forward. `completed` is reached only through
//! `complete()`, which the orchestrator calls when the conversation ends or
//! a diagnostic report is generated. Going back to `greeting` requires
//! replacing the whole memory.

use crate::models::{DiagnosisStage, DiagnosticContext};

/// Thresholds for the automatic stage triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePolicy {
    /// Collected symptoms needed to reach `recommendation`.
    pub recommendation_symptom_threshold: usize,
}

impl Default for StagePolicy {
    fn default() -> Self {
        Self {
            recommendation_symptom_threshold: 3,
        }
    }
}

/// Stage the context has earned from its contents alone.
///
/// - any user utterance → `problem_identification`
/// - at least one symptom → `symptom_analysis`
/// - enough symptoms, or a proposed solution → `recommendation`
pub fn earned_stage(
    context: &DiagnosticContext,
    user_has_spoken: bool,
    policy: &StagePolicy,
) -> DiagnosisStage {
    let symptoms = context.collected_symptoms.len();
    let threshold = policy.recommendation_symptom_threshold.max(1);

    if !context.suggested_solutions.is_empty() || symptoms >= threshold {
        DiagnosisStage::Recommendation
    } else if symptoms > 0 {
        DiagnosisStage::SymptomAnalysis
    } else if user_has_spoken {
        DiagnosisStage::ProblemIdentification
    } else {
        DiagnosisStage::Greeting
    }
}

/// Move forward to `target` if it is later than the current stage.
///
/// Earlier targets and `completed` are ignored. Returns whether the stage changed.
pub fn advance_stage(context: &mut DiagnosticContext, target: DiagnosisStage) -> bool {
    if target == DiagnosisStage::Completed {
        tracing::debug!("Ignoring automatic transition to completed");
        return false;
    }
    if target <= context.diagnosis_stage {
        return false;
    }
    tracing::info!(
        from = %context.diagnosis_stage,
        to = %target,
        "Diagnosis stage advanced"
    );
    context.diagnosis_stage = target;
    true
}

/// Mark the diagnosis as finished.
pub fn complete(context: &mut DiagnosticContext) {
    if context.diagnosis_stage != DiagnosisStage::Completed {
        tracing::info!(from = %context.diagnosis_stage, "Diagnosis completed");
        context.diagnosis_stage = DiagnosisStage::Completed;
    }
}

/// Parse a stage name suggested by the reasoning service.
pub fn parse_stage_hint(hint: Option<&str>) -> Option<DiagnosisStage> {
    hint.and_then(|h| h.trim().to_lowercase().parse().ok())
}
