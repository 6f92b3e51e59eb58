//! Requirement extraction pipeline.
//!
//! ```text
//! description ─▶ check ─▶ normalize ─▶ classify ─┐
//!                                   └▶ entities ─┴▶ relationships ─▶ rules
//!   ─▶ features ─▶ custom patterns ─▶ resolve AUTO ─▶ endpoints ─▶ score ─▶ validate
//! ```
//!
//! Every stage is a pure function of the normalized text and the pattern
//! registry.  The registry is shared behind an `Arc<RwLock<..>>`: an extraction
//! holds the read lock for its whole run, registration takes the write lock.

pub mod classifier;
pub mod endpoints;
pub mod entities;
pub mod naming;
pub mod normalizer;
pub mod refine;
pub mod relationships;
pub mod resolution;
pub mod rules;
pub mod scoring;
pub mod validator;

use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use regex::Captures;

use crate::config::ExtractorConfig;
use crate::errors::{RequirementsError, RequirementsResult};
use crate::models::{FrameworkType, ProjectRequirements, ValidationIssue};
use crate::patterns::defaults::seed_defaults;
use crate::patterns::registry::{PatternCategory, PatternRegistry, PatternValue};

use self::refine::Feedback;
use self::resolution::Overrides;

/// Turns free-form project descriptions into [`ProjectRequirements`].
///
/// Cheap to clone; clones share one pattern registry.
#[derive(Clone)]
pub struct RequirementExtractor {
    registry: Arc<RwLock<PatternRegistry>>,
    config: ExtractorConfig,
}

impl RequirementExtractor {
    /// An extractor with default config and a freshly seeded registry.
    pub fn new() -> RequirementsResult<Self> {
        Self::with_config(ExtractorConfig::default())
    }

    pub fn with_config(config: ExtractorConfig) -> RequirementsResult<Self> {
        Self::with_registry(PatternRegistry::new(), config)
    }

    /// Use a caller-prepared registry.  Defaults are seeded after the caller's
    /// patterns, and identical pattern strings keep the caller's value.
    pub fn with_registry(registry: PatternRegistry, config: ExtractorConfig) -> RequirementsResult<Self> {
        Self::with_shared_registry(Arc::new(RwLock::new(registry)), config)
    }

    /// Share one registry between several extractors so they agree on vocabulary.
    pub fn with_shared_registry(
        registry: Arc<RwLock<PatternRegistry>>,
        config: ExtractorConfig,
    ) -> RequirementsResult<Self> {
        seed_defaults(&mut registry.write())?;
        Ok(Self { registry, config })
    }

    pub fn registry(&self) -> Arc<RwLock<PatternRegistry>> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Register a pattern; waits for in-flight extractions to finish.
    ///
    /// New pattern strings go after every existing entry of the category,
    /// and lookups stop at the first match.  A broad default such as the
    /// framework entry `\b(api|rest|restful)\b` therefore shadows any later
    /// pattern whenever the text says "api".  To change what an existing
    /// pattern yields, register that same pattern string again: the value is
    /// replaced in place.
    pub fn register_pattern(
        &self,
        category: PatternCategory,
        pattern: &str,
        value: PatternValue,
    ) -> RequirementsResult<()> {
        self.registry.write().register(category, pattern, value)
    }

    pub fn register_custom_pattern<F>(&self, name: &str, pattern: &str, handler: F) -> RequirementsResult<()>
    where
        F: Fn(&Captures<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.registry.write().register_custom(name, pattern, handler)
    }

    /// Run the full pipeline over `description`.
    ///
    /// Fails with `Validation` for empty or too-short input and for
    /// structurally invalid results; any other internal failure surfaces as
    /// `NlpParsing`.
    pub fn extract_requirements(
        &self,
        description: &str,
        language: &str,
    ) -> RequirementsResult<ProjectRequirements> {
        let registry = self.registry.read();
        self.extract_with(&registry, description, language)
    }

    /// Extract many `(description, language)` jobs in parallel against one
    /// registry snapshot.  Results come back in job order.
    pub fn extract_batch(&self, jobs: &[(String, String)]) -> Vec<RequirementsResult<ProjectRequirements>> {
        let registry = self.registry.read();
        let registry: &PatternRegistry = &registry;
        tracing::info!("Extracting batch of {} descriptions", jobs.len());
        jobs.par_iter()
            .map(|(description, language)| self.extract_with(registry, description, language))
            .collect()
    }

    pub fn refine_requirements(
        &self,
        requirements: ProjectRequirements,
        feedback: &Feedback,
    ) -> RequirementsResult<ProjectRequirements> {
        refine::apply_feedback(requirements, feedback)
    }

    pub fn validate_requirements(&self, requirements: &ProjectRequirements) -> RequirementsResult<()> {
        validator::validate(requirements)
    }

    pub fn apply_overrides(
        &self,
        requirements: ProjectRequirements,
        overrides: &Overrides,
    ) -> RequirementsResult<ProjectRequirements> {
        resolution::apply_overrides(requirements, overrides)
    }

    fn extract_with(
        &self,
        registry: &PatternRegistry,
        description: &str,
        language: &str,
    ) -> RequirementsResult<ProjectRequirements> {
        let issues = validator::check_description(description, &self.config)?;
        self.run_pipeline(registry, description, language, issues)
            .map_err(|err| match err {
                RequirementsError::Validation(_) | RequirementsError::NlpParsing(_) => err,
                other => RequirementsError::NlpParsing(format!("Failed to extract requirements: {other}")),
            })
    }

    fn run_pipeline(
        &self,
        registry: &PatternRegistry,
        description: &str,
        language: &str,
        issues: Vec<ValidationIssue>,
    ) -> RequirementsResult<ProjectRequirements> {
        let language = match normalizer::primary_language(language) {
            code if code.is_empty() => "en".to_string(),
            code => code,
        };
        if !normalizer::is_supported_language(&language) {
            tracing::debug!("No term table for language {language}, using basic normalization");
        }
        let text = normalizer::normalize(description, &language);

        let mut requirements =
            ProjectRequirements::new(&naming::extract_project_name(&text), description);
        requirements.language = language;

        let classification = classifier::classify(registry, &text);
        requirements.framework = classification.framework;
        requirements.database_type = classification.database;
        requirements.auth_type = classification.auth;
        requirements.api_type = classification.api_type;

        let extraction = entities::extract_models(&text, registry, self.config.max_context_fields)?;
        requirements.relationships = relationships::extract_relationships(
            &text,
            &extraction.entities,
            self.config.dedupe_relationships,
        );
        requirements.models = extraction.models;
        requirements.business_rules = rules::extract_rules(&text);
        requirements.features = classifier::detect_features(&text);
        requirements.custom_matches = classifier::apply_custom_patterns(registry, &text);
        requirements.validation_issues = issues;

        resolution::resolve_defaults(&mut requirements);
        requirements.endpoints = endpoints::synthesize_endpoints(&requirements);

        let framework_resolved = classification.framework != FrameworkType::Auto;
        requirements.confidence_score =
            scoring::confidence_score(&requirements, &text, framework_resolved);
        requirements.needs_clarification = scoring::clarifications(&requirements, &text);

        validator::validate(&requirements)?;
        tracing::info!(
            "Extracted {} models, {} endpoints for {} (confidence {:.2})",
            requirements.models.len(),
            requirements.endpoints.len(),
            requirements.project_name,
            requirements.confidence_score,
        );
        Ok(requirements)
    }
}
