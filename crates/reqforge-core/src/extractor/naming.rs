//! Naming helpers: project names, singular/plural forms, model identifiers.

use std::sync::LazyLock;

use regex::Regex;

pub const FALLBACK_PROJECT_NAME: &str = "generated_api";

// Ordered from most to least explicit.
static PROJECT_NAME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(
            r#"(?:project|app|application|system|platform|service)\s+(?:called|named)\s+["']?([a-z][a-z0-9_-]{2,30})"#,
        )
        .unwrap(),
        Regex::new(
            r"(?:create|build|develop|design|make)\s+(?:a\s+|an\s+)?([a-z][a-z0-9 ]{2,30}?)\s+(?:api|system|platform|app|application|service)\b",
        )
        .unwrap(),
        Regex::new(r"^([a-z][a-z0-9 ]{2,30}?)\s+(?:api|system|platform|app|application)\b").unwrap(),
    ]
});

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([a-z]{3,15})\b").unwrap());

static NON_IDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_]").unwrap());

const NAME_FILLER_WORDS: &[&str] = &[
    "create", "build", "develop", "design", "make", "the", "for", "and", "with", "api", "new",
];

fn slug(raw: &str) -> String {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join("_");
    NON_IDENT_RE
        .replace_all(&joined.replace('-', "_"), "")
        .into_owned()
}

/// Derive a snake_case project name from normalized text.
pub fn extract_project_name(text: &str) -> String {
    for re in PROJECT_NAME_RES.iter() {
        if let Some(caps) = re.captures(text) {
            let name = slug(&caps[1]);
            if name.len() >= 3 {
                return name;
            }
        }
    }
    WORD_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|word| !NAME_FILLER_WORDS.contains(&word.as_str()))
        .map(|word| format!("{word}_api"))
        .unwrap_or_else(|| FALLBACK_PROJECT_NAME.to_string())
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// English plural of a lowercase noun (enough for table and route names).
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Inverse of [`pluralize`] for regular nouns; leaves singular words alone.
pub fn singularize(word: &str) -> String {
    if word.len() > 3 {
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
    }
    for suffix in ["ches", "shes", "sses", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// `order_item` / `order item` → `OrderItem`.
pub fn pascal_case(word: &str) -> String {
    word.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Table name for a model: lowercase, snake_case, plural.
pub fn table_name(model_name: &str) -> String {
    let mut snake = String::new();
    for (i, c) in model_name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            snake.push('_');
        }
        snake.extend(c.to_lowercase());
    }
    pluralize(&snake)
}
