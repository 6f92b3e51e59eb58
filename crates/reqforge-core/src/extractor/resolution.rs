//! Default-selection policy for AUTO values and explicit generation overrides.

use serde::Deserialize;

use crate::errors::RequirementsResult;
use crate::extractor::endpoints::synthesize_endpoints;
use crate::extractor::validator::validate;
use crate::models::{ApiType, AuthType, DatabaseType, FrameworkType, ProjectRequirements};

/// Model count at or above which the batteries-included framework is chosen.
pub const DJANGO_MODEL_THRESHOLD: usize = 5;
/// Model count above which a server database is chosen.
pub const POSTGRES_MODEL_THRESHOLD: usize = 3;

const ACCOUNT_MODELS: &[&str] = &["user", "account", "customer"];

fn has_account_model(requirements: &ProjectRequirements) -> bool {
    requirements
        .models
        .iter()
        .any(|m| ACCOUNT_MODELS.contains(&m.name.to_lowercase().as_str()))
}

/// Replace every AUTO selection with its policy default.  Concrete values are untouched.
pub fn resolve_defaults(requirements: &mut ProjectRequirements) {
    let model_count = requirements.models.len();
    if requirements.framework == FrameworkType::Auto {
        requirements.framework =
            if model_count >= DJANGO_MODEL_THRESHOLD || requirements.api_type == ApiType::GraphQl {
                FrameworkType::Django
            } else {
                FrameworkType::FastApi
            };
    }
    if requirements.database_type == DatabaseType::Auto {
        requirements.database_type = if model_count > POSTGRES_MODEL_THRESHOLD {
            DatabaseType::PostgreSql
        } else {
            DatabaseType::Sqlite
        };
    }
    if requirements.auth_type == AuthType::Auto {
        requirements.auth_type = if has_account_model(requirements) {
            AuthType::Jwt
        } else {
            AuthType::None
        };
    }
    if requirements.api_type == ApiType::Auto {
        requirements.api_type = ApiType::Rest;
    }
}

/// Caller-supplied technology choices that beat detection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub framework: Option<String>,
    pub database: Option<String>,
    pub auth_method: Option<String>,
}

/// Apply explicit overrides, resolve what is still AUTO, regenerate endpoints and validate.
///
/// Every override string is parsed before anything is changed, so an
/// unsupported value leaves `requirements` as it was.
pub fn apply_overrides(
    mut requirements: ProjectRequirements,
    overrides: &Overrides,
) -> RequirementsResult<ProjectRequirements> {
    let framework = overrides
        .framework
        .as_deref()
        .map(str::parse::<FrameworkType>)
        .transpose()?;
    let database = overrides
        .database
        .as_deref()
        .map(str::parse::<DatabaseType>)
        .transpose()?;
    let auth = overrides
        .auth_method
        .as_deref()
        .map(str::parse::<AuthType>)
        .transpose()?;

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
    tracing::info!(
        "Applied overrides: framework={} database={} auth={}",
        requirements.framework.as_str(),
        requirements.database_type.as_str(),
        requirements.auth_type.as_str(),
    );
    Ok(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RequirementsError;
    use crate::extractor::entities::fallback_model;
    use crate::models::ModelDefinition;

    fn named(name: &str) -> ModelDefinition {
        ModelDefinition {
            name: name.to_string(),
            ..fallback_model()
        }
    }

    fn with_models(names: &[&str]) -> ProjectRequirements {
        let mut req = ProjectRequirements::new("demo", "a demo project");
        req.models = names.iter().map(|n| named(n)).collect();
        req
    }

    #[test]
    fn test_small_project_defaults() {
        let mut req = with_models(&["Note"]);
        resolve_defaults(&mut req);
        assert_eq!(req.framework, FrameworkType::FastApi);
        assert_eq!(req.database_type, DatabaseType::Sqlite);
        assert_eq!(req.auth_type, AuthType::None);
        assert_eq!(req.api_type, ApiType::Rest);
    }

    #[test]
    fn test_large_project_defaults() {
        let mut req = with_models(&["User", "Product", "Order", "Review", "Category"]);
        resolve_defaults(&mut req);
        assert_eq!(req.framework, FrameworkType::Django);
        assert_eq!(req.database_type, DatabaseType::PostgreSql);
        assert_eq!(req.auth_type, AuthType::Jwt);
    }

    #[test]
    fn test_thresholds_are_exclusive_where_documented() {
        let mut req = with_models(&["A", "B", "C"]);
        resolve_defaults(&mut req);
        assert_eq!(req.database_type, DatabaseType::Sqlite);

        let mut req = with_models(&["A", "B", "C", "D"]);
        resolve_defaults(&mut req);
        assert_eq!(req.database_type, DatabaseType::PostgreSql);
        assert_eq!(req.framework, FrameworkType::FastApi);
    }

    #[test]
    fn test_graphql_selects_django() {
        let mut req = with_models(&["Customer"]);
        req.api_type = ApiType::GraphQl;
        resolve_defaults(&mut req);
        assert_eq!(req.framework, FrameworkType::Django);
        assert_eq!(req.api_type, ApiType::GraphQl);
        assert_eq!(req.auth_type, AuthType::Jwt);
    }

    #[test]
    fn test_concrete_values_are_kept() {
        let mut req = with_models(&["User"]);
        req.auth_type = AuthType::Session;
        req.database_type = DatabaseType::MongoDb;
        resolve_defaults(&mut req);
        assert_eq!(req.auth_type, AuthType::Session);
        assert_eq!(req.database_type, DatabaseType::MongoDb);
    }

    #[test]
    fn test_apply_overrides_beats_detection() {
        let mut req = with_models(&["User", "Post"]);
        req.framework = FrameworkType::FastApi;
        let overrides = Overrides {
            framework: Some("django".to_string()),
            database: Some("postgres".to_string()),
            auth_method: Some("none".to_string()),
        };
        let req = apply_overrides(req, &overrides).unwrap();
        assert_eq!(req.framework, FrameworkType::Django);
        assert_eq!(req.database_type, DatabaseType::PostgreSql);
        assert_eq!(req.auth_type, AuthType::None);
        assert_eq!(req.endpoints.len(), 5 * 2 + 2);
    }

    #[test]
    fn test_apply_overrides_rejects_unknown_values() {
        let req = with_models(&["User"]);
        let err = apply_overrides(
            req.clone(),
            &Overrides {
                framework: Some("flask".to_string()),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, RequirementsError::FrameworkNotSupported(ref v) if v == "flask"));

        let err = apply_overrides(
            req.clone(),
            &Overrides {
                database: Some("oracle".to_string()),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, RequirementsError::DatabaseNotSupported(_)));

        let err = apply_overrides(
            req,
            &Overrides {
                auth_method: Some("kerberos".to_string()),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, RequirementsError::AuthMethodNotSupported(_)));
    }

    #[test]
    fn test_apply_overrides_without_values_resolves_auto() {
        let req = apply_overrides(with_models(&["User"]), &Overrides::default()).unwrap();
        assert_eq!(req.auth_type, AuthType::Jwt);
        assert_eq!(req.endpoints.len(), 5 + 3 + 2);
    }
}
