//! Relationship extraction between already-detected entities.

use std::sync::LazyLock;

use regex::Regex;

use crate::extractor::entities::{entity_noun, plural_of};
use crate::extractor::naming::pascal_case;
use crate::models::{Relationship, RelationshipType};

// Families are evaluated in this order; all matches of a family are kept.
static RELATIONSHIP_RES: LazyLock<Vec<(RelationshipType, Regex)>> = LazyLock::new(|| {
    [
        (
            RelationshipType::ManyToOne,
            r"\b(\w+)\s+(?:belongs?\s+to|(?:is|are)\s+(?:owned|created)\s+by)\s+(?:an?\s+|the\s+)?(\w+)",
        ),
        (
            RelationshipType::OneToMany,
            r"\b(\w+)\s+(?:has|have|can\s+have|contains?)\s+(?:many|multiple)\s+(\w+)",
        ),
        (
            RelationshipType::OneToOne,
            r"\b(\w+)\s+(?:has|have|contains?)\s+(?:one|an?)\s+(\w+)",
        ),
        (
            RelationshipType::ManyToMany,
            r"\b(\w+)\s+(?:and|with)\s+(\w+)\s+(?:are\s+)?(?:related|connected|linked)\b",
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

/// Map a captured word onto a detected entity, accepting plural forms.
fn resolve_entity<'a>(word: &str, entities: &'a [String]) -> Option<&'a str> {
    let noun = entity_noun(word);
    entities
        .iter()
        .find(|e| e.as_str() == word || **e == noun)
        .map(String::as_str)
}

fn relationship(from: &str, to: &str, kind: RelationshipType) -> Relationship {
    let (foreign_key, related_name) = match kind {
        RelationshipType::ManyToOne | RelationshipType::OneToOne => {
            (Some(format!("{to}_id")), Some(plural_of(from)))
        }
        RelationshipType::OneToMany => (Some(format!("{from}_id")), Some(plural_of(to))),
        RelationshipType::ManyToMany => (None, Some(plural_of(from))),
    };
    Relationship {
        from_model: pascal_case(from),
        to_model: pascal_case(to),
        relationship_type: kind,
        foreign_key,
        related_name,
    }
}

/// Typed edges between `entities` (lowercase singular nouns) found in `text`.
///
/// Matches naming anything other than a detected entity are discarded; no
/// entity is ever created here.  With `dedupe`, repeated (from, to, type)
/// triples collapse to their first occurrence.
pub fn extract_relationships(text: &str, entities: &[String], dedupe: bool) -> Vec<Relationship> {
    let mut found: Vec<Relationship> = Vec::new();
    for (kind, re) in RELATIONSHIP_RES.iter() {
        for caps in re.captures_iter(text) {
            let (Some(from), Some(to)) = (
                resolve_entity(&caps[1], entities),
                resolve_entity(&caps[2], entities),
            ) else {
                continue;
            };
            let rel = relationship(from, to, *kind);
            if dedupe
                && found.iter().any(|r| {
                    r.from_model == rel.from_model
                        && r.to_model == rel.to_model
                        && r.relationship_type == rel.relationship_type
                })
            {
                continue;
            }
            found.push(rel);
        }
    }
    tracing::debug!("Extracted {} relationships", found.len());
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_one_to_many_with_plural_target() {
        let rels = extract_relationships(
            "each user has many posts",
            &entities(&["user", "post"]),
            true,
        );
        assert_eq!(rels.len(), 1);
        let rel = &rels[0];
        assert_eq!(rel.from_model, "User");
        assert_eq!(rel.to_model, "Post");
        assert_eq!(rel.relationship_type, RelationshipType::OneToMany);
        assert_eq!(rel.foreign_key.as_deref(), Some("user_id"));
        assert_eq!(rel.related_name.as_deref(), Some("posts"));
    }

    #[test]
    fn test_many_to_one_hints() {
        let rels = extract_relationships(
            "every order belongs to a customer",
            &entities(&["customer", "order"]),
            true,
        );
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].from_model, "Order");
        assert_eq!(rels[0].to_model, "Customer");
        assert_eq!(rels[0].relationship_type, RelationshipType::ManyToOne);
        assert_eq!(rels[0].foreign_key.as_deref(), Some("customer_id"));
    }

    #[test]
    fn test_one_to_one_and_many_to_many() {
        let ents = entities(&["user", "file", "product", "category"]);
        let rels = extract_relationships(
            "a user has one file. products and categories are linked",
            &ents,
            true,
        );
        let kinds: Vec<RelationshipType> = rels.iter().map(|r| r.relationship_type).collect();
        assert_eq!(kinds, vec![RelationshipType::OneToOne, RelationshipType::ManyToMany]);
        assert_eq!(rels[1].from_model, "Product");
        assert_eq!(rels[1].to_model, "Category");
        assert_eq!(rels[1].foreign_key, None);
    }

    #[test]
    fn test_irregular_plural_resolves_to_entity() {
        let rels = extract_relationships(
            "each team has many people in the directory",
            &entities(&["person", "team"]),
            true,
        );
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].from_model, "Team");
        assert_eq!(rels[0].to_model, "Person");
        assert_eq!(rels[0].foreign_key.as_deref(), Some("team_id"));
        assert_eq!(rels[0].related_name.as_deref(), Some("people"));
    }

    #[test]
    fn test_unknown_nouns_are_discarded() {
        let rels = extract_relationships(
            "each user has many friends and a wallet belongs to a user",
            &entities(&["user"]),
            true,
        );
        assert!(rels.is_empty());
    }

    #[test]
    fn test_dedupe_is_configurable() {
        let text = "a user has many posts. the user has many posts";
        let ents = entities(&["user", "post"]);
        assert_eq!(extract_relationships(text, &ents, true).len(), 1);
        assert_eq!(extract_relationships(text, &ents, false).len(), 2);
    }

    #[test]
    fn test_no_entities_no_relationships() {
        assert!(extract_relationships("a has many b", &[], true).is_empty());
    }
}
