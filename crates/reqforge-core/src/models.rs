//! Shared typed models produced by the extraction pipeline and consumed by renderers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{RequirementsError, RequirementsResult};

/// Name of the synthesized primary-key field placed first in every model.
pub const ID_FIELD: &str = "id";
/// Audit fields appended last to every model.
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Field names the extractor owns; never inferred from text.
pub const SYNTHESIZED_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

// ---------------------------------------------------------------------------
// Technology selections
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameworkType {
    #[serde(rename = "fastapi")]
    FastApi,
    #[serde(rename = "django")]
    Django,
    #[serde(rename = "auto")]
    Auto,
}

impl FrameworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameworkType::FastApi => "fastapi",
            FrameworkType::Django => "django",
            FrameworkType::Auto => "auto",
        }
    }
}

impl FromStr for FrameworkType {
    type Err = RequirementsError;

    fn from_str(s: &str) -> RequirementsResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "fastapi" | "fast_api" | "fast api" => Ok(FrameworkType::FastApi),
            "django" => Ok(FrameworkType::Django),
            "auto" => Ok(FrameworkType::Auto),
            _ => Err(RequirementsError::FrameworkNotSupported(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    PostgreSql,
    MySql,
    Sqlite,
    MongoDb,
    DynamoDb,
    Firestore,
    Auto,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::PostgreSql => "postgresql",
            DatabaseType::MySql => "mysql",
            DatabaseType::Sqlite => "sqlite",
            DatabaseType::MongoDb => "mongodb",
            DatabaseType::DynamoDb => "dynamodb",
            DatabaseType::Firestore => "firestore",
            DatabaseType::Auto => "auto",
        }
    }
}

impl FromStr for DatabaseType {
    type Err = RequirementsError;

    fn from_str(s: &str) -> RequirementsResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseType::PostgreSql),
            "mysql" | "mariadb" => Ok(DatabaseType::MySql),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            "mongodb" | "mongo" => Ok(DatabaseType::MongoDb),
            "dynamodb" => Ok(DatabaseType::DynamoDb),
            "firestore" => Ok(DatabaseType::Firestore),
            "auto" => Ok(DatabaseType::Auto),
            _ => Err(RequirementsError::DatabaseNotSupported(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    Jwt,
    Session,
    ApiKey,
    #[serde(rename = "oauth2")]
    OAuth2,
    None,
    Auto,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Jwt => "jwt",
            AuthType::Session => "session",
            AuthType::ApiKey => "api_key",
            AuthType::OAuth2 => "oauth2",
            AuthType::None => "none",
            AuthType::Auto => "auto",
        }
    }
}

impl FromStr for AuthType {
    type Err = RequirementsError;

    fn from_str(s: &str) -> RequirementsResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "jwt" => Ok(AuthType::Jwt),
            "session" => Ok(AuthType::Session),
            "api_key" | "apikey" | "api key" => Ok(AuthType::ApiKey),
            "oauth2" | "oauth" => Ok(AuthType::OAuth2),
            "none" => Ok(AuthType::None),
            "auto" => Ok(AuthType::Auto),
            _ => Err(RequirementsError::AuthMethodNotSupported(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    Rest,
    GraphQl,
    Hybrid,
    Auto,
}

impl ApiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiType::Rest => "rest",
            ApiType::GraphQl => "graphql",
            ApiType::Hybrid => "hybrid",
            ApiType::Auto => "auto",
        }
    }
}

impl FromStr for ApiType {
    type Err = RequirementsError;

    fn from_str(s: &str) -> RequirementsResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "rest" | "restful" => Ok(ApiType::Rest),
            "graphql" => Ok(ApiType::GraphQl),
            "hybrid" => Ok(ApiType::Hybrid),
            "auto" => Ok(ApiType::Auto),
            _ => Err(RequirementsError::Validation(format!(
                "Unknown API type '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Text,
    Integer,
    Decimal,
    Boolean,
    Datetime,
    Date,
    Time,
    Email,
    Url,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Datetime => "datetime",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Email => "email",
            FieldType::Url => "url",
        }
    }
}

impl FromStr for FieldType {
    type Err = RequirementsError;

    fn from_str(s: &str) -> RequirementsResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "string" | "str" => Ok(FieldType::String),
            "text" => Ok(FieldType::Text),
            "integer" | "int" => Ok(FieldType::Integer),
            "decimal" | "float" => Ok(FieldType::Decimal),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "datetime" => Ok(FieldType::Datetime),
            "date" => Ok(FieldType::Date),
            "time" => Ok(FieldType::Time),
            "email" => Ok(FieldType::Email),
            "url" => Ok(FieldType::Url),
            _ => Err(RequirementsError::Extension(format!(
                "Unknown field type '{s}'"
            ))),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default value of a field or parameter. `Now` is a marker, never a timestamp.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDefault", into = "RawDefault")]
pub enum DefaultValue {
    Now,
    Bool(bool),
    Int(i64),
    Str(String),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawDefault {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<RawDefault> for DefaultValue {
    fn from(raw: RawDefault) -> Self {
        match raw {
            RawDefault::Bool(b) => DefaultValue::Bool(b),
            RawDefault::Int(i) => DefaultValue::Int(i),
            RawDefault::Str(s) if s == "now" => DefaultValue::Now,
            RawDefault::Str(s) => DefaultValue::Str(s),
        }
    }
}

impl From<DefaultValue> for RawDefault {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Now => RawDefault::Str("now".to_string()),
            DefaultValue::Bool(b) => RawDefault::Bool(b),
            DefaultValue::Int(i) => RawDefault::Int(i),
            DefaultValue::Str(s) => RawDefault::Str(s),
        }
    }
}

/// A single field of a data model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub validation_rules: Vec<String>,
    #[serde(default)]
    pub description: String,
}

fn default_true() -> bool {
    true
}

impl ModelField {
    /// A required, non-unique, non-indexed field with no default.
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required: true,
            unique: false,
            indexed: false,
            default: None,
            validation_rules: Vec::new(),
            description: String::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn rule(mut self, rule: &str) -> Self {
        self.validation_rules.push(rule.to_string());
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// The synthesized primary key.
    pub fn id() -> Self {
        Self::new(ID_FIELD, FieldType::Integer)
            .unique()
            .indexed()
            .describe("Primary key")
    }

    /// The two audit timestamps, in order.
    pub fn audit_fields() -> [Self; 2] {
        [
            Self::new(CREATED_AT_FIELD, FieldType::Datetime)
                .indexed()
                .with_default(DefaultValue::Now)
                .describe("Creation timestamp"),
            Self::new(UPDATED_AT_FIELD, FieldType::Datetime)
                .with_default(DefaultValue::Now)
                .describe("Last update timestamp"),
        ]
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// A data model derived from a detected entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub fields: Vec<ModelField>,
    pub table_name: String,
    #[serde(default)]
    pub description: String,
}

impl ModelDefinition {
    pub fn field(&self, name: &str) -> Option<&ModelField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields other than the synthesized `id` and audit timestamps.
    pub fn declared_fields(&self) -> impl Iterator<Item = &ModelField> {
        self.fields
            .iter()
            .filter(|f| !SYNTHESIZED_FIELDS.contains(&f.name.as_str()))
    }

    /// Put `id` first and the audit fields last, adding whichever are missing.
    pub fn ensure_synthesized_fields(&mut self) {
        match self.fields.iter().position(|f| f.name == ID_FIELD) {
            Some(0) => {}
            Some(pos) => {
                let id = self.fields.remove(pos);
                self.fields.insert(0, id);
            }
            None => self.fields.insert(0, ModelField::id()),
        }
        for audit in ModelField::audit_fields() {
            match self.fields.iter().position(|f| f.name == audit.name) {
                Some(pos) => {
                    let existing = self.fields.remove(pos);
                    self.fields.push(existing);
                }
                None => self.fields.push(audit),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::OneToOne => "one_to_one",
            RelationshipType::OneToMany => "one_to_many",
            RelationshipType::ManyToOne => "many_to_one",
            RelationshipType::ManyToMany => "many_to_many",
        }
    }
}

/// A typed edge between two extracted models.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from_model: String,
    pub to_model: String,
    pub relationship_type: RelationshipType,
    #[serde(default)]
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub related_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndpointParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: FieldType,
    pub required: bool,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub description: String,
}

/// A derived API endpoint. Never hand-authored; regenerated from models.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    pub path: String,
    pub method: HttpMethod,
    pub description: String,
    #[serde(default)]
    pub model: Option<String>,
    pub auth_required: bool,
    #[serde(default)]
    pub parameters: Vec<EndpointParameter>,
}

// ---------------------------------------------------------------------------
// Advisory data
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleContext {
    ConditionalLogic,
    Validation,
    Workflow,
}

/// A condition → action pair lifted from the description. Not validated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    pub condition: String,
    pub action: String,
    pub priority: u8,
    pub context: RuleContext,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// An advisory problem found in the input description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    pub severity: Severity,
}

/// Value produced by a custom registry pattern's handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomMatch {
    pub pattern_name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub cors_enabled: bool,
    pub rate_limiting: bool,
    pub caching: bool,
    pub file_uploads: bool,
    pub real_time: bool,
    pub background_tasks: bool,
    pub use_celery: bool,
    pub use_redis: bool,
    pub use_elasticsearch: bool,
    pub containerize: bool,
    pub include_tests: bool,
    pub include_docs: bool,
    pub logging_level: String,
    pub third_party_integrations: Vec<String>,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            cors_enabled: true,
            rate_limiting: false,
            caching: false,
            file_uploads: false,
            real_time: false,
            background_tasks: false,
            use_celery: false,
            use_redis: false,
            use_elasticsearch: false,
            containerize: true,
            include_tests: true,
            include_docs: true,
            logging_level: "INFO".to_string(),
            third_party_integrations: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate root
// ---------------------------------------------------------------------------

/// Everything extracted from one project description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequirements {
    pub project_name: String,
    pub description: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub framework: FrameworkType,
    pub database_type: DatabaseType,
    pub auth_type: AuthType,
    pub api_type: ApiType,
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub endpoints: Vec<EndpointDefinition>,
    #[serde(default)]
    pub business_rules: Vec<BusinessRule>,
    #[serde(flatten)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub custom_matches: Vec<CustomMatch>,
    #[serde(default)]
    pub validation_issues: Vec<ValidationIssue>,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub needs_clarification: Vec<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl ProjectRequirements {
    /// An empty requirements object with every selection left on AUTO.
    pub fn new(project_name: &str, description: &str) -> Self {
        Self {
            project_name: project_name.to_string(),
            description: description.to_string(),
            language: default_language(),
            framework: FrameworkType::Auto,
            database_type: DatabaseType::Auto,
            auth_type: AuthType::Auto,
            api_type: ApiType::Auto,
            models: Vec::new(),
            relationships: Vec::new(),
            endpoints: Vec::new(),
            business_rules: Vec::new(),
            features: FeatureFlags::default(),
            custom_matches: Vec::new(),
            validation_issues: Vec::new(),
            confidence_score: 0.0,
            needs_clarification: Vec::new(),
        }
    }

    pub fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn to_json(&self) -> RequirementsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> RequirementsResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing_reports_category_specific_errors() {
        assert_eq!("Django".parse::<FrameworkType>().unwrap(), FrameworkType::Django);
        assert_eq!("postgres".parse::<DatabaseType>().unwrap(), DatabaseType::PostgreSql);
        assert_eq!("api_key".parse::<AuthType>().unwrap(), AuthType::ApiKey);

        assert!(matches!(
            "flask".parse::<FrameworkType>(),
            Err(RequirementsError::FrameworkNotSupported(_))
        ));
        assert!(matches!(
            "oracle".parse::<DatabaseType>(),
            Err(RequirementsError::DatabaseNotSupported(_))
        ));
        assert!(matches!(
            "saml".parse::<AuthType>(),
            Err(RequirementsError::AuthMethodNotSupported(_))
        ));
    }

    #[test]
    fn test_enum_serialization_matches_as_str() {
        for db in [
            DatabaseType::PostgreSql,
            DatabaseType::MySql,
            DatabaseType::Sqlite,
            DatabaseType::MongoDb,
            DatabaseType::DynamoDb,
            DatabaseType::Firestore,
            DatabaseType::Auto,
        ] {
            let json = serde_json::to_string(&db).unwrap();
            assert_eq!(json, format!("\"{}\"", db.as_str()));
        }
        assert_eq!(serde_json::to_string(&AuthType::OAuth2).unwrap(), "\"oauth2\"");
        assert_eq!(serde_json::to_string(&AuthType::ApiKey).unwrap(), "\"api_key\"");
        assert_eq!(serde_json::to_string(&FrameworkType::FastApi).unwrap(), "\"fastapi\"");
        assert_eq!(serde_json::to_string(&ApiType::GraphQl).unwrap(), "\"graphql\"");
        assert_eq!(serde_json::to_string(&HttpMethod::Delete).unwrap(), "\"DELETE\"");
    }

    #[test]
    fn test_default_value_now_marker() {
        let field = ModelField::new("created_at", FieldType::Datetime).with_default(DefaultValue::Now);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["default"], "now");
        assert_eq!(json["type"], "datetime");

        let back: ModelField = serde_json::from_value(json).unwrap();
        assert_eq!(back.default, Some(DefaultValue::Now));
    }

    #[test]
    fn test_model_field_deserializes_with_defaults() {
        let field: ModelField =
            serde_json::from_str(r#"{"name": "sku", "type": "string", "unique": true}"#).unwrap();
        assert!(field.required);
        assert!(field.unique);
        assert!(!field.indexed);
        assert!(field.validation_rules.is_empty());
    }

    #[test]
    fn test_ensure_synthesized_fields_orders_id_and_audit() {
        let mut model = ModelDefinition {
            name: "Widget".to_string(),
            fields: vec![
                ModelField::new("created_at", FieldType::Datetime),
                ModelField::new("name", FieldType::String),
            ],
            table_name: "widgets".to_string(),
            description: String::new(),
        };
        model.ensure_synthesized_fields();
        let names: Vec<&str> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "created_at", "updated_at"]);

        let declared: Vec<&str> = model.declared_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(declared, vec!["name"]);
    }

    #[test]
    fn test_requirements_json_flattens_features() {
        let mut req = ProjectRequirements::new("shop", "an online shop api");
        req.features.file_uploads = true;
        let json: serde_json::Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();
        assert_eq!(json["file_uploads"], true);
        assert_eq!(json["cors_enabled"], true);
        assert_eq!(json["framework"], "auto");

        let back = ProjectRequirements::from_json(&req.to_json().unwrap()).unwrap();
        assert_eq!(back, req);
    }
}
