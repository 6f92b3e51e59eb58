//! Extensible, insertion-ordered pattern registry.
//!
//! Every category maps a regex source string to a compiled, case-insensitive
//! [`Regex`] plus the value it stands for.  Iteration order is registration
//! order, and callers stop at the first match, so earlier registrations take
//! precedence.  Re-registering an existing pattern replaces its value but keeps
//! its position.
//!
//! Custom patterns carry a handler closure instead of a value.  Handlers are
//! expected to be pure functions of the captures they receive; the registry
//! cannot enforce that.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::{Captures, Regex, RegexBuilder};

use crate::errors::{RequirementsError, RequirementsResult};
use crate::models::{ApiType, AuthType, DatabaseType, FieldType, FrameworkType};

/// Callback invoked with the captures of a custom pattern match.
pub type CustomHandler = Arc<dyn Fn(&Captures<'_>) -> Option<String> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternCategory {
    Framework,
    Database,
    Auth,
    ApiType,
    FieldType,
    Custom,
}

impl PatternCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternCategory::Framework => "framework",
            PatternCategory::Database => "database",
            PatternCategory::Auth => "auth",
            PatternCategory::ApiType => "api_type",
            PatternCategory::FieldType => "field_type",
            PatternCategory::Custom => "custom",
        }
    }
}

impl FromStr for PatternCategory {
    type Err = RequirementsError;

    fn from_str(s: &str) -> RequirementsResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "framework" => Ok(PatternCategory::Framework),
            "database" => Ok(PatternCategory::Database),
            "auth" => Ok(PatternCategory::Auth),
            "api_type" | "api" => Ok(PatternCategory::ApiType),
            "field_type" | "field" => Ok(PatternCategory::FieldType),
            "custom" => Ok(PatternCategory::Custom),
            _ => Err(RequirementsError::Extension(format!(
                "Unknown pattern category '{s}'"
            ))),
        }
    }
}

/// Value half of a registration.  Must agree with the target category.
#[derive(Clone)]
pub enum PatternValue {
    Framework(FrameworkType),
    Database(DatabaseType),
    Auth(AuthType),
    ApiType(ApiType),
    FieldType(FieldType),
    Custom(CustomHandler),
}

impl PatternValue {
    fn category(&self) -> PatternCategory {
        match self {
            PatternValue::Framework(_) => PatternCategory::Framework,
            PatternValue::Database(_) => PatternCategory::Database,
            PatternValue::Auth(_) => PatternCategory::Auth,
            PatternValue::ApiType(_) => PatternCategory::ApiType,
            PatternValue::FieldType(_) => PatternCategory::FieldType,
            PatternValue::Custom(_) => PatternCategory::Custom,
        }
    }
}

impl fmt::Debug for PatternValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternValue::Framework(v) => write!(f, "Framework({v:?})"),
            PatternValue::Database(v) => write!(f, "Database({v:?})"),
            PatternValue::Auth(v) => write!(f, "Auth({v:?})"),
            PatternValue::ApiType(v) => write!(f, "ApiType({v:?})"),
            PatternValue::FieldType(v) => write!(f, "FieldType({v:?})"),
            PatternValue::Custom(_) => f.write_str("Custom(<handler>)"),
        }
    }
}

/// A compiled pattern and the value it maps to.
#[derive(Clone, Debug)]
pub struct PatternEntry<V> {
    regex: Regex,
    pub value: V,
}

impl<V> PatternEntry<V> {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A named free-form pattern whose matches are interpreted by a handler.
#[derive(Clone)]
pub struct CustomPattern {
    pub name: String,
    regex: Regex,
    handler: CustomHandler,
}

impl CustomPattern {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Run the handler over every match in `text`, keeping non-empty results.
    pub fn apply(&self, text: &str) -> Vec<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| (self.handler)(&caps))
            .collect()
    }
}

impl fmt::Debug for CustomPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPattern")
            .field("name", &self.name)
            .field("regex", &self.regex.as_str())
            .finish_non_exhaustive()
    }
}

/// Compile a registry pattern.  All registry regexes are case-insensitive.
pub fn compile_pattern(pattern: &str) -> RequirementsResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| RequirementsError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[derive(Clone, Debug, Default)]
pub struct PatternRegistry {
    framework: IndexMap<String, PatternEntry<FrameworkType>>,
    database: IndexMap<String, PatternEntry<DatabaseType>>,
    auth: IndexMap<String, PatternEntry<AuthType>>,
    api_type: IndexMap<String, PatternEntry<ApiType>>,
    field_type: IndexMap<String, PatternEntry<FieldType>>,
    custom: IndexMap<String, CustomPattern>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pattern` under `category`.
    ///
    /// The regex is compiled before anything is inserted, so a failed
    /// registration leaves the registry untouched.  For custom patterns the
    /// pattern string doubles as the pattern name.
    pub fn register(
        &mut self,
        category: PatternCategory,
        pattern: &str,
        value: PatternValue,
    ) -> RequirementsResult<()> {
        if value.category() != category {
            return Err(RequirementsError::Extension(format!(
                "Value {value:?} cannot be registered under the '{}' category",
                category.as_str()
            )));
        }
        let regex = compile_pattern(pattern)?;
        let key = pattern.to_string();
        match value {
            PatternValue::Framework(v) => {
                self.framework.insert(key, PatternEntry { regex, value: v });
            }
            PatternValue::Database(v) => {
                self.database.insert(key, PatternEntry { regex, value: v });
            }
            PatternValue::Auth(v) => {
                self.auth.insert(key, PatternEntry { regex, value: v });
            }
            PatternValue::ApiType(v) => {
                self.api_type.insert(key, PatternEntry { regex, value: v });
            }
            PatternValue::FieldType(v) => {
                self.field_type.insert(key, PatternEntry { regex, value: v });
            }
            PatternValue::Custom(handler) => {
                self.custom.insert(
                    key.clone(),
                    CustomPattern {
                        name: key,
                        regex,
                        handler,
                    },
                );
            }
        }
        tracing::debug!("Registered {} pattern: {pattern}", category.as_str());
        Ok(())
    }

    /// Register a string-valued pattern, parsing `value` for the category.
    ///
    /// Custom patterns cannot be registered this way since they need a handler.
    pub fn register_str(
        &mut self,
        category: PatternCategory,
        pattern: &str,
        value: &str,
    ) -> RequirementsResult<()> {
        let parsed = match category {
            PatternCategory::Framework => PatternValue::Framework(value.parse()?),
            PatternCategory::Database => PatternValue::Database(value.parse()?),
            PatternCategory::Auth => PatternValue::Auth(value.parse()?),
            PatternCategory::ApiType => PatternValue::ApiType(value.parse()?),
            PatternCategory::FieldType => PatternValue::FieldType(value.parse()?),
            PatternCategory::Custom => {
                return Err(RequirementsError::Extension(
                    "Custom patterns require a handler, not a string value".to_string(),
                ))
            }
        };
        self.register(category, pattern, parsed)
    }

    pub fn register_framework(&mut self, pattern: &str, value: FrameworkType) -> RequirementsResult<()> {
        self.register(PatternCategory::Framework, pattern, PatternValue::Framework(value))
    }

    pub fn register_database(&mut self, pattern: &str, value: DatabaseType) -> RequirementsResult<()> {
        self.register(PatternCategory::Database, pattern, PatternValue::Database(value))
    }

    pub fn register_auth(&mut self, pattern: &str, value: AuthType) -> RequirementsResult<()> {
        self.register(PatternCategory::Auth, pattern, PatternValue::Auth(value))
    }

    pub fn register_api_type(&mut self, pattern: &str, value: ApiType) -> RequirementsResult<()> {
        self.register(PatternCategory::ApiType, pattern, PatternValue::ApiType(value))
    }

    pub fn register_field_type(&mut self, pattern: &str, value: FieldType) -> RequirementsResult<()> {
        self.register(PatternCategory::FieldType, pattern, PatternValue::FieldType(value))
    }

    /// Register a named custom pattern whose matches are passed to `handler`.
    pub fn register_custom<F>(&mut self, name: &str, pattern: &str, handler: F) -> RequirementsResult<()>
    where
        F: Fn(&Captures<'_>) -> Option<String> + Send + Sync + 'static,
    {
        let regex = compile_pattern(pattern)?;
        self.custom.insert(
            name.to_string(),
            CustomPattern {
                name: name.to_string(),
                regex,
                handler: Arc::new(handler),
            },
        );
        tracing::debug!("Registered custom pattern: {name}");
        Ok(())
    }

    pub fn contains(&self, category: PatternCategory, pattern: &str) -> bool {
        match category {
            PatternCategory::Framework => self.framework.contains_key(pattern),
            PatternCategory::Database => self.database.contains_key(pattern),
            PatternCategory::Auth => self.auth.contains_key(pattern),
            PatternCategory::ApiType => self.api_type.contains_key(pattern),
            PatternCategory::FieldType => self.field_type.contains_key(pattern),
            PatternCategory::Custom => self.custom.contains_key(pattern),
        }
    }

    /// Ordered `(pattern, value)` pairs for a category.
    ///
    /// Custom entries report their regex source as the value.
    pub fn get(&self, category: PatternCategory) -> Vec<(String, String)> {
        fn pairs<V>(map: &IndexMap<String, PatternEntry<V>>, show: fn(&V) -> &'static str) -> Vec<(String, String)> {
            map.iter()
                .map(|(pattern, entry)| (pattern.clone(), show(&entry.value).to_string()))
                .collect()
        }
        match category {
            PatternCategory::Framework => pairs(&self.framework, FrameworkType::as_str),
            PatternCategory::Database => pairs(&self.database, DatabaseType::as_str),
            PatternCategory::Auth => pairs(&self.auth, AuthType::as_str),
            PatternCategory::ApiType => pairs(&self.api_type, ApiType::as_str),
            PatternCategory::FieldType => pairs(&self.field_type, FieldType::as_str),
            PatternCategory::Custom => self
                .custom
                .iter()
                .map(|(name, custom)| (name.clone(), custom.regex.as_str().to_string()))
                .collect(),
        }
    }

    pub fn framework_patterns(&self) -> &IndexMap<String, PatternEntry<FrameworkType>> {
        &self.framework
    }

    pub fn database_patterns(&self) -> &IndexMap<String, PatternEntry<DatabaseType>> {
        &self.database
    }

    pub fn auth_patterns(&self) -> &IndexMap<String, PatternEntry<AuthType>> {
        &self.auth
    }

    pub fn api_type_patterns(&self) -> &IndexMap<String, PatternEntry<ApiType>> {
        &self.api_type
    }

    pub fn field_type_patterns(&self) -> &IndexMap<String, PatternEntry<FieldType>> {
        &self.field_type
    }

    pub fn custom_patterns(&self) -> &IndexMap<String, CustomPattern> {
        &self.custom
    }

    pub fn len(&self, category: PatternCategory) -> usize {
        match category {
            PatternCategory::Framework => self.framework.len(),
            PatternCategory::Database => self.database.len(),
            PatternCategory::Auth => self.auth.len(),
            PatternCategory::ApiType => self.api_type.len(),
            PatternCategory::FieldType => self.field_type.len(),
            PatternCategory::Custom => self.custom.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.framework.is_empty()
            && self.database.is_empty()
            && self.auth.is_empty()
            && self.api_type.is_empty()
            && self.field_type.is_empty()
            && self.custom.is_empty()
    }
}

/// Value of the first entry whose regex matches `text`, in registration order.
pub fn first_match<V: Copy>(patterns: &IndexMap<String, PatternEntry<V>>, text: &str) -> Option<V> {
    patterns
        .values()
        .find(|entry| entry.is_match(text))
        .map(|entry| entry.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_invalid_regex_without_inserting() {
        let mut registry = PatternRegistry::new();
        let err = registry
            .register_database(r"\b(postgres", DatabaseType::PostgreSql)
            .unwrap_err();
        assert!(matches!(err, RequirementsError::InvalidPattern { .. }));
        assert_eq!(registry.len(PatternCategory::Database), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_mismatched_category() {
        let mut registry = PatternRegistry::new();
        let err = registry
            .register(
                PatternCategory::Auth,
                r"\bjwt\b",
                PatternValue::Database(DatabaseType::Sqlite),
            )
            .unwrap_err();
        assert!(matches!(err, RequirementsError::Extension(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_preserves_insertion_order() {
        let mut registry = PatternRegistry::new();
        registry.register_database(r"\bsqlite\b", DatabaseType::Sqlite).unwrap();
        registry.register_database(r"\bpostgres\b", DatabaseType::PostgreSql).unwrap();
        registry.register_database(r"\bmysql\b", DatabaseType::MySql).unwrap();
        let pairs = registry.get(PatternCategory::Database);
        let values: Vec<&str> = pairs.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, vec!["sqlite", "postgresql", "mysql"]);
    }

    #[test]
    fn test_reregistering_keeps_position_and_replaces_value() {
        let mut registry = PatternRegistry::new();
        registry.register_auth(r"\bjwt\b", AuthType::Jwt).unwrap();
        registry.register_auth(r"\bsession\b", AuthType::Session).unwrap();
        registry.register_auth(r"\bjwt\b", AuthType::ApiKey).unwrap();
        let pairs = registry.get(PatternCategory::Auth);
        assert_eq!(pairs[0], (r"\bjwt\b".to_string(), "api_key".to_string()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_first_match_wins_in_registration_order() {
        let mut registry = PatternRegistry::new();
        registry.register_database(r"\bpostgres\b", DatabaseType::PostgreSql).unwrap();
        registry.register_database(r"\bsqlite\b", DatabaseType::Sqlite).unwrap();
        let text = "use sqlite for tests and postgres in production";
        assert_eq!(
            first_match(registry.database_patterns(), text),
            Some(DatabaseType::PostgreSql)
        );
        assert_eq!(first_match(registry.database_patterns(), "flat files"), None);
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let mut registry = PatternRegistry::new();
        registry.register_framework(r"\bdjango\b", FrameworkType::Django).unwrap();
        assert_eq!(
            first_match(registry.framework_patterns(), "Build it with DJANGO"),
            Some(FrameworkType::Django)
        );
    }

    #[test]
    fn test_register_str_parses_values() {
        let mut registry = PatternRegistry::new();
        registry
            .register_str(PatternCategory::FieldType, r"\bsku\b", "string")
            .unwrap();
        assert!(registry.contains(PatternCategory::FieldType, r"\bsku\b"));

        let err = registry
            .register_str(PatternCategory::Framework, r"\bflask\b", "flask")
            .unwrap_err();
        assert!(matches!(err, RequirementsError::FrameworkNotSupported(_)));

        let err = registry
            .register_str(PatternCategory::Custom, r"\bx\b", "x")
            .unwrap_err();
        assert!(matches!(err, RequirementsError::Extension(_)));
    }

    #[test]
    fn test_custom_pattern_handler_receives_captures() {
        let mut registry = PatternRegistry::new();
        registry
            .register_custom("currency", r"\bin\s+(usd|eur|gbp)\b", |caps| {
                caps.get(1).map(|m| m.as_str().to_uppercase())
            })
            .unwrap();
        let custom = &registry.custom_patterns()["currency"];
        assert_eq!(custom.apply("prices in eur, refunds in usd"), vec!["EUR", "USD"]);
        assert!(custom.apply("no currency here").is_empty());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("api".parse::<PatternCategory>().unwrap(), PatternCategory::ApiType);
        assert_eq!("Field_Type".parse::<PatternCategory>().unwrap(), PatternCategory::FieldType);
        assert!("colour".parse::<PatternCategory>().is_err());
    }
}
