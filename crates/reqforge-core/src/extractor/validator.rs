//! Input pre-checks and structural validation of extracted requirements.

use std::collections::HashSet;

use crate::config::ExtractorConfig;
use crate::errors::{RequirementsError, RequirementsResult};
use crate::models::{ProjectRequirements, Severity, ValidationIssue};

const DATABASE_MENTIONS: &[&str] = &["postgresql", "mysql", "sqlite", "mongodb"];

fn warning(field: &str, message: &str, suggestion: &str) -> ValidationIssue {
    ValidationIssue {
        field: field.to_string(),
        message: message.to_string(),
        suggestion: Some(suggestion.to_string()),
        severity: Severity::Warning,
    }
}

/// Reject unusable descriptions and collect advisory issues for the rest.
///
/// Empty input and input shorter than `min_description_length` (counted in
/// characters after trimming) are hard errors; everything else is advisory.
pub fn check_description(
    description: &str,
    config: &ExtractorConfig,
) -> RequirementsResult<Vec<ValidationIssue>> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(RequirementsError::Validation(
            "Description cannot be empty".to_string(),
        ));
    }
    let length = trimmed.chars().count();
    if length < config.min_description_length {
        return Err(RequirementsError::Validation(format!(
            "Description is too short ({length} characters, minimum {})",
            config.min_description_length
        )));
    }

    let lowered = trimmed.to_lowercase();
    let mut issues = Vec::new();
    if length > config.max_description_length {
        issues.push(warning(
            "description",
            "Description is very long",
            "Consider breaking down into smaller, focused descriptions",
        ));
    }
    if lowered.contains("no authentication") && lowered.contains("user") {
        issues.push(warning(
            "authentication",
            "Contradictory authentication requirements detected",
            "Clarify whether user management requires authentication",
        ));
    }
    let databases = DATABASE_MENTIONS
        .iter()
        .filter(|db| lowered.contains(*db))
        .count();
    if databases > 1 {
        issues.push(warning(
            "database",
            "Multiple database types mentioned",
            "Please specify which database you prefer",
        ));
    }
    Ok(issues)
}

/// Structural checks, in order, stopping at the first failure.
pub fn validate(requirements: &ProjectRequirements) -> RequirementsResult<()> {
    if requirements.project_name.trim().is_empty() {
        return Err(RequirementsError::Validation(
            "Project name is required".to_string(),
        ));
    }
    if requirements.description.trim().is_empty() {
        return Err(RequirementsError::Validation(
            "Description is required".to_string(),
        ));
    }
    if requirements.models.is_empty() {
        return Err(RequirementsError::Validation(
            "At least one model is required".to_string(),
        ));
    }

    let mut model_names = HashSet::new();
    for model in &requirements.models {
        if !model_names.insert(model.name.as_str()) {
            return Err(RequirementsError::Validation(format!(
                "Duplicate model name: {}",
                model.name
            )));
        }
    }

    for model in &requirements.models {
        let mut field_names = HashSet::new();
        for field in &model.fields {
            if !field_names.insert(field.name.as_str()) {
                return Err(RequirementsError::Validation(format!(
                    "Duplicate field name '{}' in model {}",
                    field.name, model.name
                )));
            }
        }
    }

    for rel in &requirements.relationships {
        for end in [&rel.from_model, &rel.to_model] {
            if !model_names.contains(end.as_str()) {
                return Err(RequirementsError::Validation(format!(
                    "Relationship {} -> {} references unknown model {end}",
                    rel.from_model, rel.to_model
                )));
            }
        }
    }
    Ok(())
}
