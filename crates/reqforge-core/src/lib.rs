//! reqforge core library: turns natural-language API descriptions into
//! structured, validated project requirements.
//!
//! The pipeline (see [`extractor`]) normalizes the text, classifies the
//! technology stack against an extensible [`patterns::registry::PatternRegistry`],
//! extracts data models, relationships and business rules, derives REST
//! endpoints and scores its own confidence.  The result is a
//! [`models::ProjectRequirements`] that code renderers consume.
//!
//! Built with the `python` feature the crate is also a Python extension
//! module (`_reqforge_core`) via PyO3.

pub mod config;
pub mod errors;
pub mod extractor;
pub mod models;
pub mod patterns;

#[cfg(feature = "python")]
mod python;

pub use config::ExtractorConfig;
pub use errors::{RequirementsError, RequirementsResult};
pub use extractor::refine::{Feedback, ModelCorrection};
pub use extractor::resolution::Overrides;
pub use extractor::RequirementExtractor;
pub use models::ProjectRequirements;

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: _reqforge_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _reqforge_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // -- Guards --------------------------------------------------------------
    m.add("MIN_DESCRIPTION_LENGTH", config::MIN_DESCRIPTION_LENGTH)?;
    m.add("MAX_DESCRIPTION_LENGTH", config::MAX_DESCRIPTION_LENGTH)?;
    m.add("MAX_CONTEXT_FIELDS", config::MAX_CONTEXT_FIELDS)?;
    m.add(
        "SUPPORTED_LANGUAGES",
        extractor::normalizer::SUPPORTED_LANGUAGES.to_vec(),
    )?;

    // -- Extraction ----------------------------------------------------------
    m.add_class::<python::PyRequirementExtractor>()?;
    m.add_function(wrap_pyfunction!(python::extract_requirements, m)?)?;

    Ok(())
}
