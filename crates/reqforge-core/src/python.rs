//! Python bindings.
//!
//! Values cross the boundary as plain dicts and lists: Rust types are
//! serialized with serde_json and rebuilt on the Python side with the stdlib
//! `json` module, and the reverse for arguments.

use pyo3::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ExtractorConfig;
use crate::errors::RequirementsError;
use crate::extractor::refine::Feedback;
use crate::extractor::resolution::Overrides;
use crate::extractor::RequirementExtractor;
use crate::models::ProjectRequirements;
use crate::patterns::registry::PatternCategory;

fn to_py<T: Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let raw = serde_json::to_string(value).map_err(RequirementsError::from)?;
    let json = py.import("json")?;
    Ok(json.call_method1("loads", (raw,))?.unbind())
}

fn from_py<T: DeserializeOwned>(py: Python<'_>, obj: &Bound<'_, PyAny>) -> PyResult<T> {
    let json = py.import("json")?;
    let raw: String = json.call_method1("dumps", (obj,))?.extract()?;
    let value = serde_json::from_str(&raw).map_err(RequirementsError::from)?;
    Ok(value)
}

/// Python-facing wrapper around [`RequirementExtractor`].
#[pyclass(name = "RequirementExtractor")]
pub struct PyRequirementExtractor {
    inner: RequirementExtractor,
}

#[pymethods]
impl PyRequirementExtractor {
    /// New extractor configured from `REQFORGE_*` environment variables.
    #[new]
    fn new() -> PyResult<Self> {
        let inner = RequirementExtractor::with_config(ExtractorConfig::from_env())?;
        Ok(Self { inner })
    }

    #[pyo3(signature = (description, language="en"))]
    fn extract_requirements(&self, py: Python<'_>, description: &str, language: &str) -> PyResult<PyObject> {
        let requirements = py.allow_threads(|| self.inner.extract_requirements(description, language))?;
        to_py(py, &requirements)
    }

    fn refine_requirements(
        &self,
        py: Python<'_>,
        requirements: &Bound<'_, PyAny>,
        feedback: &Bound<'_, PyAny>,
    ) -> PyResult<PyObject> {
        let requirements: ProjectRequirements = from_py(py, requirements)?;
        let feedback: Feedback = from_py(py, feedback)?;
        let refined = self.inner.refine_requirements(requirements, &feedback)?;
        to_py(py, &refined)
    }

    /// Returns `True` or raises `ValueError` naming the first failed check.
    fn validate_requirements(&self, py: Python<'_>, requirements: &Bound<'_, PyAny>) -> PyResult<bool> {
        let requirements: ProjectRequirements = from_py(py, requirements)?;
        self.inner.validate_requirements(&requirements)?;
        Ok(true)
    }

    /// Register a pattern.  For the `custom` category `value` must be a
    /// callable taking the list of match groups (group 0 first) and returning
    /// a string or `None`; the pattern string doubles as its name.
    ///
    /// The registry lock is taken with the GIL released: in-flight
    /// extractions hold the read side and may call back into Python.
    fn register_pattern(
        &self,
        py: Python<'_>,
        category: &str,
        pattern: &str,
        value: &Bound<'_, PyAny>,
    ) -> PyResult<()> {
        let category: PatternCategory = category.parse()?;
        if category != PatternCategory::Custom {
            let value: String = value.extract()?;
            py.allow_threads(|| {
                self.inner
                    .registry()
                    .write()
                    .register_str(category, pattern, &value)
            })?;
            return Ok(());
        }
        if !value.is_callable() {
            return Err(RequirementsError::Extension(
                "Custom patterns need a callable handler".to_string(),
            )
            .into());
        }
        let callback: Py<PyAny> = value.clone().unbind();
        let name = pattern.to_string();
        let handler = move |caps: &regex::Captures<'_>| {
            let groups: Vec<Option<String>> = caps
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect();
            Python::with_gil(|py| match callback.call1(py, (groups,)) {
                Ok(result) => {
                    let result = result.bind(py);
                    if result.is_none() {
                        None
                    } else {
                        result.str().ok().map(|s| s.to_string())
                    }
                }
                Err(err) => {
                    tracing::warn!("Custom pattern handler {name} raised: {err}");
                    None
                }
            })
        };
        py.allow_threads(|| self.inner.register_custom_pattern(pattern, pattern, handler))?;
        Ok(())
    }

    /// Ordered `(pattern, value)` pairs registered under `category`.
    fn get_patterns(&self, category: &str) -> PyResult<Vec<(String, String)>> {
        let category: PatternCategory = category.parse()?;
        Ok(self.inner.registry().read().get(category))
    }

    #[pyo3(signature = (requirements, framework=None, database=None, auth_method=None))]
    fn apply_overrides(
        &self,
        py: Python<'_>,
        requirements: &Bound<'_, PyAny>,
        framework: Option<String>,
        database: Option<String>,
        auth_method: Option<String>,
    ) -> PyResult<PyObject> {
        let requirements: ProjectRequirements = from_py(py, requirements)?;
        let overrides = Overrides {
            framework,
            database,
            auth_method,
        };
        let resolved = self.inner.apply_overrides(requirements, &overrides)?;
        to_py(py, &resolved)
    }
}

/// One-shot extraction with a fresh extractor.
#[pyfunction]
#[pyo3(signature = (description, language="en"))]
pub fn extract_requirements(py: Python<'_>, description: &str, language: &str) -> PyResult<PyObject> {
    let extractor = RequirementExtractor::with_config(ExtractorConfig::from_env())?;
    let requirements = py.allow_threads(|| extractor.extract_requirements(description, language))?;
    to_py(py, &requirements)
}
