//! Text normalization ahead of pattern matching.
//!
//! Lowercases, trims and collapses whitespace.  For the supported non-English
//! languages a fixed substitution table then maps common domain terms to
//! their English equivalents.  Substitutions respect word boundaries and carry
//! a trailing plural `s` over to the English term.

use std::sync::LazyLock;

use regex::Regex;

pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr", "de"];

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const SPANISH_TERMS: &[(&str, &str)] = &[
    ("base de datos", "database"),
    ("autenticación", "authentication"),
    ("crear", "create"),
    ("construir", "build"),
    ("diseñar", "design"),
    ("usuario", "user"),
    ("cliente", "customer"),
    ("producto", "product"),
    ("pedido", "order"),
    ("comentario", "comment"),
    ("categoría", "category"),
    ("artículo", "article"),
];

const FRENCH_TERMS: &[(&str, &str)] = &[
    ("base de données", "database"),
    ("authentification", "authentication"),
    ("créer", "create"),
    ("construire", "build"),
    ("concevoir", "design"),
    ("utilisateur", "user"),
    ("client", "customer"),
    ("produit", "product"),
    ("commande", "order"),
    ("commentaire", "comment"),
    ("catégorie", "category"),
    ("article", "article"),
];

const GERMAN_TERMS: &[(&str, &str)] = &[
    ("authentifizierung", "authentication"),
    ("datenbank", "database"),
    ("erstellen", "create"),
    ("bauen", "build"),
    ("entwerfen", "design"),
    ("benutzer", "user"),
    ("kunde", "customer"),
    ("produkt", "product"),
    ("bestellung", "order"),
    ("kommentar", "comment"),
    ("kategorie", "category"),
    ("artikel", "article"),
];

struct Substitution {
    regex: Regex,
    replacement: String,
}

fn build_table(terms: &[(&str, &str)]) -> Vec<Substitution> {
    terms
        .iter()
        .map(|(foreign, english)| Substitution {
            regex: Regex::new(&format!(r"\b{}(s?)\b", regex::escape(foreign))).unwrap(),
            replacement: format!("{english}${{1}}"),
        })
        .collect()
}

static SPANISH: LazyLock<Vec<Substitution>> = LazyLock::new(|| build_table(SPANISH_TERMS));
static FRENCH: LazyLock<Vec<Substitution>> = LazyLock::new(|| build_table(FRENCH_TERMS));
static GERMAN: LazyLock<Vec<Substitution>> = LazyLock::new(|| build_table(GERMAN_TERMS));

/// Reduce a language tag such as `es-MX` to its primary code.
pub fn primary_language(language: &str) -> String {
    language
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

pub fn is_supported_language(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&primary_language(language).as_str())
}

fn substitutions(language: &str) -> Option<&'static [Substitution]> {
    match primary_language(language).as_str() {
        "es" => Some(SPANISH.as_slice()),
        "fr" => Some(FRENCH.as_slice()),
        "de" => Some(GERMAN.as_slice()),
        _ => None,
    }
}

/// Collapse whitespace runs to one space, trim and lowercase.
pub fn clean(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(text.trim(), " ")
        .to_lowercase()
}

/// Normalize `text` for matching, translating known terms for `language`.
///
/// Unsupported language codes get the basic cleanup only.
pub fn normalize(text: &str, language: &str) -> String {
    let mut normalized = clean(text);
    if let Some(table) = substitutions(language) {
        for sub in table {
            normalized = sub
                .regex
                .replace_all(&normalized, sub.replacement.as_str())
                .into_owned();
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_lowercases() {
        assert_eq!(
            normalize("  Build a   Blog\tAPI\n with Users ", "en"),
            "build a blog api with users"
        );
    }

    #[test]
    fn test_normalize_spanish_terms() {
        assert_eq!(
            normalize("Crear una API con usuarios y base de datos", "es"),
            "create una api con users y database"
        );
    }

    #[test]
    fn test_normalize_french_and_german_terms() {
        assert_eq!(
            normalize("Créer une API pour les utilisateurs", "fr"),
            "create une api pour les users"
        );
        assert_eq!(
            normalize("Benutzer und Datenbank", "de-AT"),
            "user und database"
        );
    }

    #[test]
    fn test_substitution_respects_word_boundaries() {
        // "pedido" must not be rewritten inside a longer word.
        assert_eq!(normalize("pedidoslargos", "es"), "pedidoslargos");
        assert_eq!(normalize("pedidos", "es"), "orders");
    }

    #[test]
    fn test_unsupported_language_passes_through() {
        assert_eq!(normalize("Crear usuario", "pt"), "crear usuario");
        assert_eq!(normalize("Crear usuario", "xx-YY"), "crear usuario");
    }

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("es-MX"), "es");
        assert_eq!(primary_language(" FR_ca "), "fr");
        assert!(is_supported_language("de"));
        assert!(!is_supported_language("it"));
    }
}
