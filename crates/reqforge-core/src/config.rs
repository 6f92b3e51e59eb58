//! Extractor configuration and shared guard constants.

// Description guards
pub const MIN_DESCRIPTION_LENGTH: usize = 10;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

// Field inference guards
pub const MAX_CONTEXT_FIELDS: usize = 20;
pub const MIN_FIELD_NAME_LENGTH: usize = 3;
pub const MAX_FIELD_NAME_LENGTH: usize = 20;

// Confidence scoring
pub const REFINE_CONFIDENCE_BUMP: f64 = 0.2;
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Tunables for a [`RequirementExtractor`](crate::extractor::RequirementExtractor).
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractorConfig {
    /// Trimmed descriptions shorter than this fail validation outright.
    pub min_description_length: usize,
    /// Longer descriptions pass, but carry an advisory warning.
    pub max_description_length: usize,
    /// Upper bound on context-inferred fields per model.
    pub max_context_fields: usize,
    /// Collapse relationships with the same (from, to, type) triple.
    pub dedupe_relationships: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_description_length: MIN_DESCRIPTION_LENGTH,
            max_description_length: MAX_DESCRIPTION_LENGTH,
            max_context_fields: MAX_CONTEXT_FIELDS,
            dedupe_relationships: true,
        }
    }
}

impl ExtractorConfig {
    /// Build a config from defaults overlaid with `REQFORGE_*` environment variables.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = env_usize("REQFORGE_MIN_DESCRIPTION_LENGTH") {
            config.min_description_length = value;
        }
        if let Some(value) = env_usize("REQFORGE_MAX_DESCRIPTION_LENGTH") {
            config.max_description_length = value;
        }
        if let Some(value) = env_usize("REQFORGE_MAX_CONTEXT_FIELDS") {
            config.max_context_fields = value;
        }
        if let Ok(val) = std::env::var("REQFORGE_DEDUPE_RELATIONSHIPS") {
            config.dedupe_relationships = parse_flag(&val, config.dedupe_relationships);
        }
        config
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring non-numeric value for {key}: {raw:?}");
            None
        }
    }
}

fn parse_flag(raw: &str, fallback: bool) -> bool {
    let v = raw.trim().to_lowercase();
    match v.as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_guard_constants() {
        let config = ExtractorConfig::default();
        assert_eq!(config.min_description_length, MIN_DESCRIPTION_LENGTH);
        assert_eq!(config.max_description_length, MAX_DESCRIPTION_LENGTH);
        assert_eq!(config.max_context_fields, MAX_CONTEXT_FIELDS);
        assert!(config.dedupe_relationships);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("ON", false));
        assert!(parse_flag(" yes ", false));
        assert!(!parse_flag("off", true));
        assert!(!parse_flag("0", true));
        // Unknown values keep the fallback
        assert!(parse_flag("maybe", true));
        assert!(!parse_flag("maybe", false));
    }
}
