//! Business-rule extraction.
//!
//! Rules are advisory: every match becomes one [`BusinessRule`] with the
//! priority of its family, contradictory rules are kept side by side and
//! nothing is de-duplicated.  Patterns run per sentence so a condition never
//! spans a sentence break.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::{BusinessRule, RuleContext};

pub const CONDITIONAL_PRIORITY: u8 = 1;
pub const VALIDATION_PRIORITY: u8 = 2;
pub const WORKFLOW_PRIORITY: u8 = 3;

type RuleBuilder = fn(&Captures<'_>) -> (String, String);

struct RuleFamily {
    context: RuleContext,
    priority: u8,
    patterns: Vec<(Regex, RuleBuilder)>,
}

static SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.;!?]+").unwrap());

static DETERMINER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?:the|a|an|each|every|all|any)\s+)+").unwrap());

/// Strip leading determiners: "the email" → "email".
fn subject(raw: &str) -> String {
    DETERMINER_RE.replace(raw.trim(), "").trim().to_string()
}

fn pair(caps: &Captures<'_>) -> (String, String) {
    (caps[1].trim().to_string(), caps[2].trim().to_string())
}

fn modal(caps: &Captures<'_>) -> (String, String) {
    (
        caps[1].trim().to_string(),
        format!("{} {}", &caps[2], caps[3].trim()),
    )
}

fn validating(caps: &Captures<'_>, action: String) -> (String, String) {
    (format!("validating {}", subject(&caps[1])), action)
}

fn entry(pattern: &str, build: RuleBuilder) -> (Regex, RuleBuilder) {
    (Regex::new(pattern).unwrap(), build)
}

static FAMILIES: LazyLock<Vec<RuleFamily>> = LazyLock::new(|| {
    vec![
        RuleFamily {
            context: RuleContext::ConditionalLogic,
            priority: CONDITIONAL_PRIORITY,
            patterns: vec![
                entry(r"\bif\s+([^,]+?),?\s+then\s+(.+)", pair),
                entry(r"\bwhen\s+([^,]+),\s*(.+)", pair),
                entry(r"\bunless\s+([^,]+),\s*(.+)", pair),
                entry(r"\bonly\s+([^,]+?)\s+can\s+(.+)", pair),
                entry(r"([^,]+?)\s+(must|should|cannot)\s+(.+)", modal),
            ],
        },
        RuleFamily {
            context: RuleContext::Validation,
            priority: VALIDATION_PRIORITY,
            patterns: vec![
                entry(r"([^,]+?)\s+must\s+be\s+(?:unique|distinct)\b", |caps| {
                    validating(caps, format!("ensure {} is unique", subject(&caps[1])))
                }),
                entry(r"([^,]+?)\s+(?:is\s+|are\s+)?required\b", |caps| {
                    validating(caps, format!("ensure {} is required", subject(&caps[1])))
                }),
                entry(r"([^,]+?)\s+(?:is\s+|are\s+)?optional\b", |caps| {
                    validating(caps, format!("make {} optional", subject(&caps[1])))
                }),
                entry(
                    r"([^,]+?)\s+must\s+(?:be|have)\s+(?:at\s+least|minimum|min)\s+(\d+)",
                    |caps| validating(caps, format!("ensure {} is at least {}", subject(&caps[1]), &caps[2])),
                ),
                entry(
                    r"([^,]+?)\s+must\s+(?:be|have)\s+(?:at\s+most|maximum|max)\s+(\d+)",
                    |caps| validating(caps, format!("ensure {} is at most {}", subject(&caps[1]), &caps[2])),
                ),
            ],
        },
        RuleFamily {
            context: RuleContext::Workflow,
            priority: WORKFLOW_PRIORITY,
            patterns: vec![
                entry(r"\b(?:after|once)\s+([^,]+),\s*(.+)", pair),
                entry(
                    r"\bstatus\s+(?:(?:changes|moves|goes|transitions)\s+)?from\s+(\w+)\s+to\s+(\w+)",
                    |caps| (format!("status is {}", &caps[1]), format!("set status to {}", &caps[2])),
                ),
            ],
        },
    ]
});

/// Business rules found in `text`, grouped by family then pattern.
pub fn extract_rules(text: &str) -> Vec<BusinessRule> {
    let sentences: Vec<&str> = SENTENCE_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let mut rules = Vec::new();
    for family in FAMILIES.iter() {
        for (re, build) in &family.patterns {
            for sentence in &sentences {
                for caps in re.captures_iter(sentence) {
                    let (condition, action) = build(&caps);
                    if condition.is_empty() || action.is_empty() {
                        continue;
                    }
                    rules.push(BusinessRule {
                        condition,
                        action,
                        priority: family.priority,
                        context: family.context,
                    });
                }
            }
        }
    }
    tracing::debug!("Extracted {} business rules", rules.len());
    rules
}
