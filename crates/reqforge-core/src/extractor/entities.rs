//! Entity detection and per-entity field synthesis.
//!
//! Entities come from a curated noun vocabulary grouped into families, then
//! from explicit declarations such as "create a widget model".  Each
//! detected entity becomes a model whose fields are the archetype template
//! (if the entity has one), followed by fields inferred from the words that
//! follow "`<entity>` with/has/including ..." phrases, wrapped between the
//! synthesized `id` and the audit timestamps.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{MAX_FIELD_NAME_LENGTH, MIN_FIELD_NAME_LENGTH};
use crate::errors::{RequirementsError, RequirementsResult};
use crate::extractor::naming::{pascal_case, pluralize, singularize, table_name};
use crate::models::{DefaultValue, FieldType, ModelDefinition, ModelField, SYNTHESIZED_FIELDS};
use crate::patterns::registry::{first_match, PatternRegistry};

/// Name of the model synthesized when no entity is recognized.
pub const FALLBACK_MODEL_NAME: &str = "Item";

/// Entity vocabulary, one family per line.  Family order is scan order.
pub const ENTITY_FAMILIES: &[&[&str]] = &[
    &["user", "customer", "client", "account", "person", "member"],
    &["product", "item", "merchandise"],
    &["order", "purchase", "transaction", "sale"],
    &["post", "article", "entry"],
    &["comment", "review", "feedback"],
    &["category", "tag", "label"],
    &["project", "task", "todo", "assignment"],
    &["team", "organization", "company", "group"],
    &["message", "notification", "alert"],
    &["file", "document", "attachment"],
    &["invoice", "payment"],
    &["event", "booking", "reservation"],
];

const IRREGULAR_PLURALS: &[(&str, &str)] = &[("person", "people")];

const STOP_WORDS: &[&str] = &[
    "and", "or", "the", "with", "for", "can", "will", "should", "must", "may", "has", "have",
    "having", "had", "many", "one", "multiple", "each", "every", "their", "its", "his", "her",
    "also", "field", "fields", "who", "which", "that", "this", "these", "those", "they", "them",
    "are", "is", "was", "were", "be", "been", "not", "all", "any", "some", "other", "more",
    "like", "such", "including", "includes", "include", "contains", "contain", "plus", "etc",
    "from", "into", "about", "per", "both", "own", "optional", "required", "unique", "an",
    "as", "at", "by", "of", "on", "in", "to", "our", "your", "but", "than", "then", "when",
    "where", "while", "well", "just", "only", "via", "using", "use", "need", "needs", "allow",
    "allows", "let", "lets", "belong", "belongs", "owned", "related", "linked", "connected",
];

// Words that look like declared entity names but are not.
const DECLARATION_EXCLUDED: &[&str] = &[
    "api", "app", "web", "site", "data", "database", "new", "main", "simple", "basic", "custom",
    "single", "separate",
];

/// Plural form of a vocabulary or declared noun.
pub fn plural_of(noun: &str) -> String {
    IRREGULAR_PLURALS
        .iter()
        .find(|(singular, _)| *singular == noun)
        .map(|(_, plural)| plural.to_string())
        .unwrap_or_else(|| pluralize(noun))
}

struct EntityPattern {
    regex: Regex,
    // Surface form (singular or plural) → singular noun.
    forms: HashMap<String, &'static str>,
}

static ENTITY_PATTERNS: LazyLock<Vec<EntityPattern>> = LazyLock::new(|| {
    ENTITY_FAMILIES
        .iter()
        .map(|family| {
            let mut forms = HashMap::new();
            let mut alternation = Vec::new();
            for noun in family.iter() {
                let plural = plural_of(noun);
                alternation.push(regex::escape(&plural));
                alternation.push(regex::escape(noun));
                forms.insert(plural, *noun);
                forms.insert(noun.to_string(), *noun);
            }
            EntityPattern {
                regex: Regex::new(&format!(r"\b({})\b", alternation.join("|"))).unwrap(),
                forms,
            }
        })
        .collect()
});

static DECLARATION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(?:create|build|design|manage|track|store)\s+(?:an?\s+|the\s+)?([a-z]+)\s+(?:models?|entit(?:y|ies)|tables?|collections?)\b",
        r"\b(?:an?|the)\s+([a-z]+)\s+(?:model|entity|table|collection)\b",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

static CANDIDATE_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-z][a-z_]*)\b").unwrap());

/// Singular vocabulary noun for a surface form, irregular plurals included.
pub fn vocabulary_noun(word: &str) -> Option<&'static str> {
    ENTITY_PATTERNS
        .iter()
        .find_map(|pattern| pattern.forms.get(word).copied())
}

/// Singular entity noun for any captured word.
pub fn entity_noun(word: &str) -> String {
    vocabulary_noun(word)
        .map(str::to_string)
        .unwrap_or_else(|| singularize(word))
}

/// Detected entity nouns (lowercase, singular), deduplicated in scan order.
///
/// Vocabulary families are scanned first, then explicit declarations.
pub fn detect_entities(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for pattern in ENTITY_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(singular) = pattern.forms.get(&caps[1]) else {
                continue;
            };
            if !found.iter().any(|e| e == singular) {
                found.push(singular.to_string());
            }
        }
    }
    for re in DECLARATION_RES.iter() {
        for caps in re.captures_iter(text) {
            let noun = entity_noun(&caps[1]);
            if noun.len() <= 2
                || DECLARATION_EXCLUDED.contains(&noun.as_str())
                || STOP_WORDS.contains(&noun.as_str())
                || found.contains(&noun)
            {
                continue;
            }
            found.push(noun);
        }
    }
    found
}

/// The archetype whose template an entity uses, if any.
pub fn archetype_of(entity: &str) -> Option<&'static str> {
    match entity {
        "user" | "account" | "member" => Some("user"),
        "product" | "item" => Some("product"),
        "order" | "purchase" => Some("order"),
        "post" | "article" => Some("post"),
        "comment" | "review" => Some("comment"),
        _ => None,
    }
}

/// Hand-curated fields for a known archetype.
pub fn archetype_fields(archetype: &str) -> Option<Vec<ModelField>> {
    let fields = match archetype {
        "user" => vec![
            ModelField::new("email", FieldType::Email)
                .unique()
                .indexed()
                .rule("email_format")
                .rule("unique"),
            ModelField::new("username", FieldType::String)
                .unique()
                .indexed()
                .rule("min_length:3")
                .rule("alphanumeric"),
            ModelField::new("password_hash", FieldType::String).rule("min_length:8"),
            ModelField::new("first_name", FieldType::String).optional(),
            ModelField::new("last_name", FieldType::String).optional(),
            ModelField::new("is_active", FieldType::Boolean).with_default(DefaultValue::Bool(true)),
        ],
        "product" => vec![
            ModelField::new("name", FieldType::String)
                .indexed()
                .rule("min_length:1")
                .rule("max_length:255"),
            ModelField::new("description", FieldType::Text).optional(),
            ModelField::new("price", FieldType::Decimal).rule("min_value:0"),
            ModelField::new("sku", FieldType::String).optional().unique().indexed(),
            ModelField::new("stock_quantity", FieldType::Integer)
                .with_default(DefaultValue::Int(0))
                .rule("min_value:0"),
            ModelField::new("is_active", FieldType::Boolean)
                .indexed()
                .with_default(DefaultValue::Bool(true)),
        ],
        "order" => vec![
            ModelField::new("order_number", FieldType::String).unique().indexed(),
            ModelField::new("customer_id", FieldType::Integer).indexed(),
            ModelField::new("total_amount", FieldType::Decimal).rule("min_value:0"),
            ModelField::new("status", FieldType::String)
                .indexed()
                .with_default(DefaultValue::Str("pending".to_string()))
                .rule("choices:pending,processing,shipped,delivered,cancelled"),
            ModelField::new("order_date", FieldType::Datetime).with_default(DefaultValue::Now),
        ],
        "post" => vec![
            ModelField::new("title", FieldType::String)
                .indexed()
                .rule("min_length:1")
                .rule("max_length:255"),
            ModelField::new("content", FieldType::Text),
            ModelField::new("excerpt", FieldType::Text).optional(),
            ModelField::new("published", FieldType::Boolean)
                .indexed()
                .with_default(DefaultValue::Bool(false)),
            ModelField::new("publish_date", FieldType::Datetime).optional(),
            ModelField::new("author_id", FieldType::Integer).indexed(),
        ],
        "comment" => vec![
            ModelField::new("content", FieldType::Text),
            ModelField::new("rating", FieldType::Integer)
                .optional()
                .rule("min_value:1")
                .rule("max_value:5"),
            ModelField::new("is_approved", FieldType::Boolean).with_default(DefaultValue::Bool(false)),
        ],
        _ => return None,
    };
    Some(fields)
}

/// Minimal template for entities without an archetype.
pub fn generic_fields() -> Vec<ModelField> {
    vec![
        ModelField::new("name", FieldType::String).indexed(),
        ModelField::new("description", FieldType::Text).optional(),
    ]
}

fn context_regex(entity: &str) -> RequirementsResult<Regex> {
    let pattern = format!(
        r"\b(?:{}|{})\s+(?:with|has|have|having|including|includes|contains?)\s+([^.;!?]+)",
        regex::escape(&plural_of(entity)),
        regex::escape(entity),
    );
    Regex::new(&pattern).map_err(|e| {
        RequirementsError::NlpParsing(format!("context pattern for entity '{entity}': {e}"))
    })
}

/// Type of a context-inferred field: first matching field-type pattern, else string.
pub fn classify_field(name: &str, registry: &PatternRegistry) -> FieldType {
    first_match(registry.field_type_patterns(), name).unwrap_or(FieldType::String)
}

fn is_candidate(word: &str, excluded: &[String]) -> bool {
    (MIN_FIELD_NAME_LENGTH..=MAX_FIELD_NAME_LENGTH).contains(&word.len())
        && !STOP_WORDS.contains(&word)
        && !SYNTHESIZED_FIELDS.contains(&word)
        && !excluded.iter().any(|e| e == word)
}

/// Fields mentioned after "`<entity>` with/has/including ..." phrases.
///
/// `entities` are excluded from candidacy (they are relationships, not
/// columns).  At most `max_fields` distinct fields are returned.
pub fn context_fields(
    entity: &str,
    text: &str,
    registry: &PatternRegistry,
    entities: &[String],
    max_fields: usize,
) -> RequirementsResult<Vec<ModelField>> {
    let excluded: Vec<String> = entities
        .iter()
        .flat_map(|e| [e.clone(), plural_of(e)])
        .collect();
    let re = context_regex(entity)?;
    let mut fields: Vec<ModelField> = Vec::new();
    for caps in re.captures_iter(text) {
        for word in CANDIDATE_WORD_RE.captures_iter(&caps[1]) {
            if fields.len() >= max_fields {
                return Ok(fields);
            }
            let name = &word[1];
            if !is_candidate(name, &excluded) || fields.iter().any(|f| f.name == name) {
                continue;
            }
            let field_type = classify_field(name, registry);
            let mut field = ModelField::new(name, field_type)
                .optional()
                .describe(&format!("Additional {name} field"));
            match field_type {
                FieldType::Email => field = field.rule("email_format"),
                FieldType::Url => field = field.rule("url_format"),
                _ => {}
            }
            fields.push(field);
        }
    }
    Ok(fields)
}

/// Build the model for one detected entity.
pub fn build_model(
    entity: &str,
    text: &str,
    registry: &PatternRegistry,
    entities: &[String],
    max_fields: usize,
) -> RequirementsResult<ModelDefinition> {
    let name = pascal_case(entity);
    let mut fields = vec![ModelField::id()];
    fields.extend(
        archetype_of(entity)
            .and_then(archetype_fields)
            .unwrap_or_else(generic_fields),
    );
    for field in context_fields(entity, text, registry, entities, max_fields)? {
        // Template fields win over inferred ones with the same name.
        if !fields.iter().any(|f| f.name == field.name) {
            fields.push(field);
        }
    }
    fields.extend(ModelField::audit_fields());
    Ok(ModelDefinition {
        table_name: table_name(&name),
        description: format!("{name} entity"),
        name,
        fields,
    })
}

/// The single generic model used when no entity is recognized.
pub fn fallback_model() -> ModelDefinition {
    let mut fields = vec![ModelField::id()];
    fields.extend(generic_fields());
    fields.extend(ModelField::audit_fields());
    ModelDefinition {
        name: FALLBACK_MODEL_NAME.to_string(),
        fields,
        table_name: table_name(FALLBACK_MODEL_NAME),
        description: "Generic item entity".to_string(),
    }
}

/// Detected entities and the models built from them.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityExtraction {
    /// Lowercase singular nouns, empty when the fallback model was used.
    pub entities: Vec<String>,
    pub models: Vec<ModelDefinition>,
}

/// Detect entities in `text` and synthesize their models.  Never returns zero models.
pub fn extract_models(
    text: &str,
    registry: &PatternRegistry,
    max_fields: usize,
) -> RequirementsResult<EntityExtraction> {
    let entities = detect_entities(text);
    if entities.is_empty() {
        tracing::debug!("No entities recognized, using fallback model {FALLBACK_MODEL_NAME}");
        return Ok(EntityExtraction {
            entities,
            models: vec![fallback_model()],
        });
    }
    let models = entities
        .iter()
        .map(|entity| build_model(entity, text, registry, &entities, max_fields))
        .collect::<RequirementsResult<Vec<_>>>()?;
    tracing::debug!("Extracted {} models: {:?}", models.len(), entities);
    Ok(EntityExtraction { entities, models })
}
