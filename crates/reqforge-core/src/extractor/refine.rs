//! User feedback overlay for already-extracted requirements.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::REFINE_CONFIDENCE_BUMP;
use crate::errors::RequirementsResult;
use crate::extractor::endpoints::synthesize_endpoints;
use crate::extractor::naming::table_name;
use crate::extractor::normalizer::normalize;
use crate::extractor::resolution::resolve_defaults;
use crate::extractor::scoring::clarifications;
use crate::extractor::validator::validate;
use crate::models::{AuthType, DatabaseType, FrameworkType, ModelField, ProjectRequirements};

/// Partial overrides for one model, keyed by its current name in [`Feedback::models`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelCorrection {
    pub name: Option<String>,
    pub description: Option<String>,
    pub table_name: Option<String>,
    /// Replaces the model's field list; synthesized fields are restored afterwards.
    pub fields: Option<Vec<ModelField>>,
}

/// User corrections accepted by `refine_requirements`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Feedback {
    pub models: IndexMap<String, ModelCorrection>,
    pub framework: Option<String>,
    pub database: Option<String>,
    pub auth: Option<String>,
}

impl Feedback {
    pub fn from_json(raw: &str) -> RequirementsResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
            && self.framework.is_none()
            && self.database.is_none()
            && self.auth.is_none()
    }
}

fn apply_model_correction(
    requirements: &mut ProjectRequirements,
    current: &str,
    correction: &ModelCorrection,
) {
    let Some(model) = requirements.models.iter_mut().find(|m| m.name == current) else {
        tracing::warn!("Feedback names unknown model {current}, skipping");
        return;
    };
    if let Some(description) = &correction.description {
        model.description = description.clone();
    }
    if let Some(fields) = &correction.fields {
        model.fields = fields.clone();
    }
    model.ensure_synthesized_fields();

    let renamed = correction
        .name
        .as_ref()
        .filter(|name| name.as_str() != current)
        .cloned();
    if let Some(new_name) = &renamed {
        model.name = new_name.clone();
        model.table_name = table_name(new_name);
    }
    if let Some(table) = &correction.table_name {
        model.table_name = table.clone();
    }

    if let Some(new_name) = renamed {
        for rel in &mut requirements.relationships {
            if rel.from_model == current {
                rel.from_model = new_name.clone();
            }
            if rel.to_model == current {
                rel.to_model = new_name.clone();
            }
        }
    }
}

/// Overlay `feedback` on `requirements` and re-derive everything that depends on it.
///
/// Technology strings are parsed before any change is made.  Afterwards AUTO
/// values are resolved, endpoints regenerated and the result validated; the
/// confidence score is bumped and clarifications recomputed.
pub fn apply_feedback(
    mut requirements: ProjectRequirements,
    feedback: &Feedback,
) -> RequirementsResult<ProjectRequirements> {
    let framework = feedback
        .framework
        .as_deref()
        .map(str::parse::<FrameworkType>)
        .transpose()?;
    let database = feedback
        .database
        .as_deref()
        .map(str::parse::<DatabaseType>)
        .transpose()?;
    let auth = feedback
        .auth
        .as_deref()
        .map(str::parse::<AuthType>)
        .transpose()?;

    for (current, correction) in &feedback.models {
        apply_model_correction(&mut requirements, current, correction);
    }
    if let Some(framework) = framework {
        requirements.framework = framework;
    }
    if let Some(database) = database {
        requirements.database_type = database;
    }
    if let Some(auth) = auth {
        requirements.auth_type = auth;
    }

    resolve_defaults(&mut requirements);
    requirements.endpoints = synthesize_endpoints(&requirements);
    validate(&requirements)?;

    requirements.confidence_score = (requirements.confidence_score + REFINE_CONFIDENCE_BUMP).min(1.0);
    let text = normalize(&requirements.description, &requirements.language);
    requirements.needs_clarification = clarifications(&requirements, &text);
    tracing::info!(
        "Refined requirements, confidence now {:.2}",
        requirements.confidence_score
    );
    Ok(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RequirementsError;
    use crate::extractor::entities::fallback_model;
    use crate::models::{FieldType, ModelDefinition, Relationship, RelationshipType};

    fn base() -> ProjectRequirements {
        let mut req = ProjectRequirements::new("shop", "a shop with users and orders");
        let user = ModelDefinition {
            name: "User".to_string(),
            table_name: "users".to_string(),
            ..fallback_model()
        };
        let order = ModelDefinition {
            name: "Order".to_string(),
            table_name: "orders".to_string(),
            ..fallback_model()
        };
        req.models = vec![user, order];
        req.relationships.push(Relationship {
            from_model: "User".to_string(),
            to_model: "Order".to_string(),
            relationship_type: RelationshipType::OneToMany,
            foreign_key: Some("user_id".to_string()),
            related_name: Some("orders".to_string()),
        });
        req.confidence_score = 0.7;
        req
    }

    #[test]
    fn test_feedback_from_json() {
        let feedback = Feedback::from_json(
            r#"{"framework": "django", "models": {"User": {"name": "Member"}}}"#,
        )
        .unwrap();
        assert_eq!(feedback.framework.as_deref(), Some("django"));
        assert_eq!(feedback.models["User"].name.as_deref(), Some("Member"));
        assert!(feedback.database.is_none());
        assert!(!feedback.is_empty());
        assert!(Feedback::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn test_framework_feedback_leaves_models_alone() {
        let req = base();
        let models = req.models.clone();
        let feedback = Feedback {
            framework: Some("django".to_string()),
            ..Feedback::default()
        };
        let refined = apply_feedback(req, &feedback).unwrap();
        assert_eq!(refined.framework, FrameworkType::Django);
        assert_eq!(refined.models, models);
    }

    #[test]
    fn test_confidence_bump_is_capped() {
        let refined = apply_feedback(base(), &Feedback::default()).unwrap();
        assert!((refined.confidence_score - 0.9).abs() < 1e-9);
        let refined = apply_feedback(refined, &Feedback::default()).unwrap();
        assert!((refined.confidence_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rename_updates_relationships_and_endpoints() {
        let mut feedback = Feedback::default();
        feedback.models.insert(
            "User".to_string(),
            ModelCorrection {
                name: Some("Member".to_string()),
                ..ModelCorrection::default()
            },
        );
        let refined = apply_feedback(base(), &feedback).unwrap();
        let member = refined.model("Member").unwrap();
        assert_eq!(member.table_name, "members");
        assert_eq!(refined.relationships[0].from_model, "Member");
        assert!(refined.endpoints.iter().any(|e| e.path == "/members/{id}/orders/"));
        assert!(refined.model("User").is_none());
    }

    #[test]
    fn test_table_name_change_moves_traversal_route() {
        let feedback =
            Feedback::from_json(r#"{"models": {"Order": {"table_name": "purchase_orders"}}}"#).unwrap();
        let refined = apply_feedback(base(), &feedback).unwrap();
        let paths: Vec<&str> = refined.endpoints.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"/purchase_orders/"));
        assert!(paths.contains(&"/users/{id}/purchase_orders/"));
        assert!(!paths.iter().any(|p| p.ends_with("/orders/")));
    }

    #[test]
    fn test_field_replacement_restores_synthesized_fields() {
        let mut feedback = Feedback::default();
        feedback.models.insert(
            "Order".to_string(),
            ModelCorrection {
                fields: Some(vec![ModelField::new("total", FieldType::Decimal)]),
                table_name: Some("purchase_orders".to_string()),
                ..ModelCorrection::default()
            },
        );
        let refined = apply_feedback(base(), &feedback).unwrap();
        let order = refined.model("Order").unwrap();
        let names: Vec<&str> = order.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "total", "created_at", "updated_at"]);
        assert_eq!(order.table_name, "purchase_orders");
    }

    #[test]
    fn test_unknown_model_is_skipped() {
        let mut feedback = Feedback::default();
        feedback
            .models
            .insert("Ghost".to_string(), ModelCorrection::default());
        let refined = apply_feedback(base(), &feedback).unwrap();
        assert_eq!(refined.model_names(), vec!["User", "Order"]);
    }

    #[test]
    fn test_invalid_technology_fails_before_mutation() {
        let mut feedback = Feedback {
            auth: Some("carrier pigeon".to_string()),
            ..Feedback::default()
        };
        feedback.models.insert(
            "User".to_string(),
            ModelCorrection {
                name: Some("Member".to_string()),
                ..ModelCorrection::default()
            },
        );
        let err = apply_feedback(base(), &feedback).unwrap_err();
        assert!(matches!(err, RequirementsError::AuthMethodNotSupported(_)));
    }

    #[test]
    fn test_rename_into_duplicate_fails_validation() {
        let mut feedback = Feedback::default();
        feedback.models.insert(
            "Order".to_string(),
            ModelCorrection {
                name: Some("User".to_string()),
                ..ModelCorrection::default()
            },
        );
        assert!(apply_feedback(base(), &feedback).unwrap_err().is_validation());
    }
}
