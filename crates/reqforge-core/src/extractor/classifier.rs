//! Classifier stage: technology detection, feature flags and integrations.
//!
//! Each detector is independent and stateless.  Registry-driven detectors
//! return the value of the first registered pattern that matches, or the
//! category's AUTO sentinel.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ApiType, AuthType, CustomMatch, DatabaseType, FeatureFlags, FrameworkType};
use crate::patterns::registry::{first_match, PatternRegistry};

/// Output of the four registry-driven detectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub framework: FrameworkType,
    pub database: DatabaseType,
    pub auth: AuthType,
    pub api_type: ApiType,
}

pub fn detect_framework(registry: &PatternRegistry, text: &str) -> FrameworkType {
    first_match(registry.framework_patterns(), text).unwrap_or(FrameworkType::Auto)
}

pub fn detect_database(registry: &PatternRegistry, text: &str) -> DatabaseType {
    first_match(registry.database_patterns(), text).unwrap_or(DatabaseType::Auto)
}

pub fn detect_auth(registry: &PatternRegistry, text: &str) -> AuthType {
    first_match(registry.auth_patterns(), text).unwrap_or(AuthType::Auto)
}

pub fn detect_api_type(registry: &PatternRegistry, text: &str) -> ApiType {
    first_match(registry.api_type_patterns(), text).unwrap_or(ApiType::Auto)
}

pub fn classify(registry: &PatternRegistry, text: &str) -> Classification {
    let classification = Classification {
        framework: detect_framework(registry, text),
        database: detect_database(registry, text),
        auth: detect_auth(registry, text),
        api_type: detect_api_type(registry, text),
    };
    tracing::debug!(
        "Classified framework={} database={} auth={} api={}",
        classification.framework.as_str(),
        classification.database.as_str(),
        classification.auth.as_str(),
        classification.api_type.as_str(),
    );
    classification
}

// ---------------------------------------------------------------------------
// Feature flags
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Feature {
    Cors,
    RateLimiting,
    Caching,
    FileUploads,
    RealTime,
    BackgroundTasks,
    Celery,
    Redis,
    Elasticsearch,
    Containerize,
}

static FEATURE_RES: LazyLock<Vec<(Feature, Regex)>> = LazyLock::new(|| {
    [
        (Feature::Cors, r"\b(cors|cross[\s-]origin|frontend|web\s*app)\b"),
        (Feature::RateLimiting, r"\b(rate[\s-]*limit\w*|throttl\w*|quotas?|ddos)\b"),
        (Feature::Caching, r"\b(cach\w*|redis|memcache\w*)\b"),
        (Feature::FileUploads, r"\b(uploads?|files?|images?|documents?|attachments?)\b"),
        (Feature::RealTime, r"\b(real[\s-]*time|websockets?|live|push\s+notifications?)\b"),
        (Feature::BackgroundTasks, r"\b(background|async\s+tasks?|queues?|jobs?)\b"),
        (Feature::Celery, r"\b(celery|task\s+queues?|background\s+jobs?)\b"),
        (Feature::Redis, r"\b(redis|cach\w*|session\s+store)\b"),
        (Feature::Elasticsearch, r"\b(elasticsearch|full[\s-]text|search\w*)\b"),
        (Feature::Containerize, r"\b(docker|containers?|kubernetes|deploy\w*)\b"),
    ]
    .into_iter()
    .map(|(feature, pattern)| (feature, Regex::new(pattern).unwrap()))
    .collect()
});

static INTEGRATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(stripe|payments?|sendgrid|mailgun|aws|amazon|s3|google|firebase|facebook|social|twilio|slack)\b")
        .unwrap()
});

/// Feature flags switched on by keywords in `text`; others keep their defaults.
pub fn detect_features(text: &str) -> FeatureFlags {
    let mut flags = FeatureFlags::default();
    for (feature, re) in FEATURE_RES.iter() {
        if !re.is_match(text) {
            continue;
        }
        match feature {
            Feature::Cors => flags.cors_enabled = true,
            Feature::RateLimiting => flags.rate_limiting = true,
            Feature::Caching => flags.caching = true,
            Feature::FileUploads => flags.file_uploads = true,
            Feature::RealTime => flags.real_time = true,
            Feature::BackgroundTasks => flags.background_tasks = true,
            Feature::Celery => flags.use_celery = true,
            Feature::Redis => flags.use_redis = true,
            Feature::Elasticsearch => flags.use_elasticsearch = true,
            Feature::Containerize => flags.containerize = true,
        }
    }
    flags.third_party_integrations = detect_integrations(text);
    flags
}

/// Third-party services mentioned in `text`, deduplicated in first-seen order.
pub fn detect_integrations(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in INTEGRATION_RE.captures_iter(text) {
        let name = match &caps[1] {
            "payments" => "payment".to_string(),
            other => other.to_string(),
        };
        if !found.contains(&name) {
            found.push(name);
        }
    }
    found
}

/// Run every registered custom pattern over `text`.
pub fn apply_custom_patterns(registry: &PatternRegistry, text: &str) -> Vec<CustomMatch> {
    registry
        .custom_patterns()
        .values()
        .flat_map(|custom| {
            custom.apply(text).into_iter().map(|value| CustomMatch {
                pattern_name: custom.name.clone(),
                value,
            })
        })
        .collect()
}
