//! Service-key resolution
//!
//! Parses a located description document and pulls out the identifier of
//! its service shape, then derives the names the generator is configured
//! with.

use crate::error::UnitError;
use crate::naming::snake_case;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Separator between a shape's namespace and its name (`com.amazonaws.s3#AmazonS3`).
const SHAPE_ID_SEPARATOR: char = '#';

/// Names derived from a service key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedNames {
    /// Last dot-delimited segment of the key's namespace (`s3`).
    pub model_name: String,
    /// `model_name` run through [`snake_case`].
    pub module_name: String,
    /// Prefix concatenated with `module_name` (`aws.s3`).
    pub namespace: String,
}

impl DerivedNames {
    pub fn from_service_key(service_key: &str, namespace_prefix: &str) -> Self {
        let shape_namespace = service_key
            .split(SHAPE_ID_SEPARATOR)
            .next()
            .unwrap_or(service_key);
        let model_name = shape_namespace
            .rsplit('.')
            .next()
            .unwrap_or(shape_namespace)
            .to_string();
        let module_name = snake_case(&model_name);
        let namespace = format!("{}{}", namespace_prefix, module_name);

        Self {
            model_name,
            module_name,
            namespace,
        }
    }
}

/// Evaluate "the key of the first shape whose `type` is `service`".
///
/// Returns `None` when the document has no `shapes` object or no service
/// shape in it. Shapes are visited in document order.
pub fn find_service_key(document: &Value) -> Option<&str> {
    document
        .get("shapes")?
        .as_object()?
        .iter()
        .find(|(_, shape)| shape.get("type").and_then(Value::as_str) == Some("service"))
        .map(|(key, _)| key.as_str())
}

/// Read `path` and resolve its service key.
pub fn resolve_service_key(path: &Path) -> Result<String, UnitError> {
    let raw = std::fs::read_to_string(path).map_err(|e| UnitError::io(path, e))?;
    let document: Value = serde_json::from_str(&raw).map_err(|source| UnitError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    find_service_key(&document)
        .map(str::to_string)
        .ok_or_else(|| UnitError::Resolution(path.to_path_buf()))
}
