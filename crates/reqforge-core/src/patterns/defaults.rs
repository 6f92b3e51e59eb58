//! Curated default patterns seeded into every extractor's registry.
//!
//! Order within each table is significant: the classifiers stop at the first
//! match, so e.g. PostgreSQL wins over SQLite when both are mentioned.

use crate::errors::RequirementsResult;
use crate::models::{ApiType, AuthType, DatabaseType, FieldType, FrameworkType};
use crate::patterns::registry::{PatternCategory, PatternRegistry, PatternValue};

pub const FRAMEWORK_PATTERNS: &[(&str, FrameworkType)] = &[
    (r"\b(fastapi|fast\s*api)\b", FrameworkType::FastApi),
    (r"\b(django|django\s*rest)\b", FrameworkType::Django),
    (r"\b(api|rest|restful)\b", FrameworkType::Auto),
];

pub const DATABASE_PATTERNS: &[(&str, DatabaseType)] = &[
    (r"\b(postgresql|postgres|pg)\b", DatabaseType::PostgreSql),
    (r"\b(mysql|mariadb)\b", DatabaseType::MySql),
    (r"\b(sqlite|sqlite3)\b", DatabaseType::Sqlite),
    (r"\b(mongodb|mongo|nosql)\b", DatabaseType::MongoDb),
    (r"\b(dynamodb|dynamo)\b", DatabaseType::DynamoDb),
    (r"\b(firestore|firebase)\b", DatabaseType::Firestore),
];

pub const AUTH_PATTERNS: &[(&str, AuthType)] = &[
    (r"\b(jwt|json\s*web\s*tokens?|bearer)\b", AuthType::Jwt),
    (r"\b(session|cookie)s?\b", AuthType::Session),
    (r"\b(api\s*keys?|tokens?)\b", AuthType::ApiKey),
    (r"\b(oauth|oauth2|social\s*login)\b", AuthType::OAuth2),
    (r"\b(no\s*auth(entication)?|public)\b", AuthType::None),
];

pub const API_TYPE_PATTERNS: &[(&str, ApiType)] = &[
    (r"\b(hybrid|rest\b.*\bgraphql|graphql\b.*\brest)\b", ApiType::Hybrid),
    (r"\b(graphql|graph\s*ql)\b", ApiType::GraphQl),
    (r"\b(rest|restful)\b", ApiType::Rest),
];

pub const FIELD_TYPE_PATTERNS: &[(&str, FieldType)] = &[
    (r"\b(email|mail)\b", FieldType::Email),
    (r"\b(url|link|website|homepage)\b", FieldType::Url),
    (r"\b(phone|telephone|mobile)\b", FieldType::String),
    (r"\b(password|pass)\b", FieldType::String),
    (r"\b(description|content|text|body|bio|notes?|address)\b", FieldType::Text),
    (r"\b(price|cost|amount|salary|balance|total)\b", FieldType::Decimal),
    (r"\b(count|quantity|number|age|stock|rating|score)\b", FieldType::Integer),
    (r"\b(active|enabled|published|verified|approved)\b", FieldType::Boolean),
    (r"\b(date|birthday|deadline)\b", FieldType::Date),
    (r"\b(time|duration)\b", FieldType::Time),
    (r"\b(created|updated|born|timestamp)\b", FieldType::Datetime),
    (r"\b(name|title|label)\b", FieldType::String),
];

fn seed<V: Copy>(
    registry: &mut PatternRegistry,
    category: PatternCategory,
    table: &[(&str, V)],
    wrap: fn(V) -> PatternValue,
) -> RequirementsResult<usize> {
    let mut added = 0;
    for (pattern, value) in table {
        // A caller's earlier registration of the same pattern wins.
        if registry.contains(category, pattern) {
            continue;
        }
        registry.register(category, pattern, wrap(*value))?;
        added += 1;
    }
    Ok(added)
}

/// Seed the curated default pattern set into `registry`.
///
/// Patterns already present are left untouched.  Returns how many entries were added.
pub fn seed_defaults(registry: &mut PatternRegistry) -> RequirementsResult<usize> {
    let mut added = 0;
    added += seed(registry, PatternCategory::Framework, FRAMEWORK_PATTERNS, PatternValue::Framework)?;
    added += seed(registry, PatternCategory::Database, DATABASE_PATTERNS, PatternValue::Database)?;
    added += seed(registry, PatternCategory::Auth, AUTH_PATTERNS, PatternValue::Auth)?;
    added += seed(registry, PatternCategory::ApiType, API_TYPE_PATTERNS, PatternValue::ApiType)?;
    added += seed(registry, PatternCategory::FieldType, FIELD_TYPE_PATTERNS, PatternValue::FieldType)?;
    tracing::debug!("Seeded {added} default patterns");
    Ok(added)
}

/// A fresh registry holding only the default patterns.
pub fn default_registry() -> RequirementsResult<PatternRegistry> {
    let mut registry = PatternRegistry::new();
    seed_defaults(&mut registry)?;
    Ok(registry)
}
