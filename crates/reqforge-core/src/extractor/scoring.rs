//! Confidence scoring and clarification prompts.

use crate::config::LOW_CONFIDENCE_THRESHOLD;
use crate::models::{AuthType, DatabaseType, ProjectRequirements};

/// Words whose presence signals a well-formed request.
pub const KEYWORDS: &[&str] = &[
    "create",
    "build",
    "design",
    "api",
    "database",
    "user",
    "authentication",
    "model",
    "endpoint",
];

const NAME_WEIGHT: f64 = 0.2;
const MODELS_WEIGHT: f64 = 0.3;
const FRAMEWORK_WEIGHT: f64 = 0.2;
const KEYWORD_WEIGHT: f64 = 0.05;
const KEYWORD_CAP: f64 = 0.3;
const ISSUE_PENALTY: f64 = 0.1;

pub const AMBIGUOUS_PROMPT: &str =
    "The description is ambiguous. Please provide more specific details.";
pub const NO_MODELS_PROMPT: &str =
    "No clear data models detected. What entities should the API manage?";
pub const SINGLE_MODEL_PROMPT: &str =
    "Only one model detected. Are there other entities or relationships?";
pub const AUTH_PROMPT: &str =
    "User management detected but no authentication specified. What type of authentication do you need?";
pub const PAYMENT_DATABASE_PROMPT: &str =
    "Payment processing mentioned but SQLite selected. Consider a more robust database for production.";

/// Number of [`KEYWORDS`] occurring anywhere in `text` (substring match).
pub fn keyword_hits(text: &str) -> usize {
    KEYWORDS.iter().filter(|kw| text.contains(*kw)).count()
}

/// Confidence in `[0, 1]` for an extraction.
///
/// `framework_resolved` is whether the classifier found a concrete framework,
/// before any default was applied.
pub fn confidence_score(requirements: &ProjectRequirements, text: &str, framework_resolved: bool) -> f64 {
    let mut score = 0.0;
    if !requirements.project_name.is_empty() {
        score += NAME_WEIGHT;
    }
    if !requirements.models.is_empty() {
        score += MODELS_WEIGHT;
    }
    if framework_resolved {
        score += FRAMEWORK_WEIGHT;
    }
    score += (KEYWORD_WEIGHT * keyword_hits(text) as f64).min(KEYWORD_CAP);
    score -= ISSUE_PENALTY * requirements.validation_issues.len() as f64;
    score.clamp(0.0, 1.0)
}

/// Clarification prompts; each rule is checked independently.
pub fn clarifications(requirements: &ProjectRequirements, text: &str) -> Vec<String> {
    let mentions_user = text.contains("user");
    let mut prompts = Vec::new();
    if requirements.confidence_score < LOW_CONFIDENCE_THRESHOLD {
        prompts.push(AMBIGUOUS_PROMPT);
    }
    if requirements.models.is_empty() {
        prompts.push(NO_MODELS_PROMPT);
    }
    if requirements.models.len() == 1 && !mentions_user {
        prompts.push(SINGLE_MODEL_PROMPT);
    }
    if requirements.auth_type == AuthType::None && mentions_user {
        prompts.push(AUTH_PROMPT);
    }
    if text.contains("payment") && requirements.database_type == DatabaseType::Sqlite {
        prompts.push(PAYMENT_DATABASE_PROMPT);
    }
    prompts.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::entities::fallback_model;
    use crate::models::{Severity, ValidationIssue};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_keyword_hits_are_substring_matches() {
        assert_eq!(keyword_hits("create a blog api with user authentication"), 4);
        // "users" still counts as "user"
        assert_eq!(keyword_hits("users"), 1);
        assert_eq!(keyword_hits("nothing here"), 0);
    }

    #[test]
    fn test_confidence_score_components() {
        let mut req = ProjectRequirements::new("blog", "a blog");
        req.models.push(fallback_model());
        let text = "create a blog api with user authentication";
        assert!(approx(confidence_score(&req, text, false), 0.2 + 0.3 + 0.2));
        assert!(approx(confidence_score(&req, text, true), 0.2 + 0.3 + 0.2 + 0.2));
    }

    #[test]
    fn test_keyword_bonus_is_capped() {
        let req = ProjectRequirements::new("", "x");
        let text = KEYWORDS.join(" ");
        assert!(approx(confidence_score(&req, &text, false), 0.3));
    }

    #[test]
    fn test_issues_penalize_and_clamp() {
        let mut req = ProjectRequirements::new("", "x");
        for _ in 0..3 {
            req.validation_issues.push(ValidationIssue {
                field: "description".to_string(),
                message: "m".to_string(),
                suggestion: None,
                severity: Severity::Warning,
            });
        }
        assert!(approx(confidence_score(&req, "api", false), 0.0));
    }

    #[test]
    fn test_clarifications_are_independent() {
        let mut req = ProjectRequirements::new("shop", "x");
        req.models.push(fallback_model());
        req.auth_type = AuthType::None;
        req.database_type = DatabaseType::Sqlite;
        req.confidence_score = 0.3;
        let prompts = clarifications(&req, "a shop taking payments from users");
        assert_eq!(prompts, vec![AMBIGUOUS_PROMPT, AUTH_PROMPT, PAYMENT_DATABASE_PROMPT]);
    }

    #[test]
    fn test_single_model_prompt() {
        let mut req = ProjectRequirements::new("shop", "x");
        req.models.push(fallback_model());
        req.confidence_score = 0.9;
        assert_eq!(clarifications(&req, "an inventory service"), vec![SINGLE_MODEL_PROMPT]);
        req.models.clear();
        assert_eq!(clarifications(&req, "an inventory service"), vec![NO_MODELS_PROMPT]);
    }
}
