//! Resolved service model consumed by the generator.
//!
//! The model is produced by an external loader and is read-only for the
//! duration of a generation run. It can be loaded from JSON or YAML, either
//! from a local file or over HTTP.
//!
//! # Examples
//!
//! ```no_run
//! use svcgen_core::model::ServiceModel;
//! use svcgen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let model = ServiceModel::from_file("service-model.yaml").await?;
//! for name in model.sorted_operation_names() {
//!     println!("operation: {}", name);
//! }
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use crate::shape::ShapeDescriptor;
use crate::Error;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Outcome key of the status code used when an operation succeeds.
pub const SUCCESS_OUTCOME: &str = "success";

const DEFAULT_SUCCESS_STATUS: u16 = 200;

/// An already-resolved description of a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceModel {
    /// Operations keyed by their unique name. Iteration order is unspecified.
    #[serde(default)]
    pub operations: HashMap<String, OperationDescription>,

    /// Shapes operations refer to, keyed by shape name.
    #[serde(default)]
    pub shapes: HashMap<String, ShapeDescription>,
}

/// A single operation of the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDescription {
    /// Name of the input shape, if the operation takes one
    #[serde(default)]
    pub input: Option<String>,

    /// Name of the output shape, if the operation returns one
    #[serde(default)]
    pub output: Option<String>,

    /// Declared error identifiers, in declaration order
    #[serde(default)]
    pub errors: Vec<String>,

    /// How the operation is bound to HTTP
    #[serde(default)]
    pub http: HttpBinding,
}

/// HTTP binding metadata of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpBinding {
    /// Request path template (e.g. "/users/{id}")
    #[serde(default = "default_path")]
    pub path: String,

    /// Request method
    #[serde(default)]
    pub method: HttpMethod,

    /// Status code per outcome: `success` or a declared error identifier
    #[serde(default)]
    pub status_codes: BTreeMap<String, u16>,
}

impl HttpBinding {
    /// Status code returned when the operation succeeds.
    pub fn success_status(&self) -> u16 {
        self.status_codes
            .get(SUCCESS_OUTCOME)
            .copied()
            .unwrap_or(DEFAULT_SUCCESS_STATUS)
    }

    /// Status code mapped to a declared error, if any.
    pub fn error_status(&self, error: &str) -> Option<u16> {
        self.status_codes.get(error).copied()
    }
}

fn default_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named shape: the wire-level fields of an input or output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescription {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// One wire-level field of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Name of the field on the wire
    pub name: String,
    /// Where the field travels
    #[serde(default)]
    pub location: FieldLocation,
    /// Target type of the field (e.g. "String", "i64")
    #[serde(rename = "type")]
    pub target_type: String,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        location: FieldLocation,
        target_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            target_type: target_type.into(),
        }
    }
}

/// Location of a field within an HTTP exchange.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    Header,
    Path,
    Query,
    #[default]
    Body,
}

impl FieldLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Header, Self::Path, Self::Query, Self::Body].into_iter()
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ServiceModel {
    /// Load a model from a file or URL (supports both YAML and JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        if location.starts_with("http://") || location.starts_with("https://") {
            return Self::from_url(location).await;
        }

        Self::from_file(location).await
    }

    /// Load a model from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::model(format!(
                "Failed to parse service model at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Load a model from a URL (supports both YAML and JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        let response = reqwest::get(url).await.map_err(|e| {
            Error::model(format!("Failed to fetch service model from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::model(format!(
                "Failed to fetch service model from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            Error::model(format!("Failed to read response from {}: {}", url, e))
        })?;

        Self::parse_content(&content).map_err(|e| {
            Error::model(format!(
                "Failed to parse service model from {}: {}",
                url, e
            ))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> Result<Self, String> {
        match serde_json::from_str(content) {
            Ok(model) => Ok(model),
            // YAML is a superset of JSON, so its error is the more useful one to report
            Err(_) => serde_yaml::from_str(content)
                .map_err(|e| format!("content is neither a valid JSON nor YAML model: {e}")),
        }
    }

    /// Operation names in ascending lexical order.
    pub fn sorted_operation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a shape reference made by `operation` into a descriptor.
    pub fn resolve_shape(&self, operation: &str, shape: &str) -> crate::Result<ShapeDescriptor> {
        self.shapes
            .get(shape)
            .map(|description| ShapeDescriptor::new(shape, description.fields.clone()))
            .ok_or_else(|| Error::ModelResolution {
                operation: operation.to_string(),
                shape: shape.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const MODEL_YAML: &str = r#"
operations:
  GetUser:
    input: UserIdInput
    output: UserOutput
    errors: [NotFound]
    http:
      path: /users/{id}
      method: GET
      status_codes:
        success: 200
        NotFound: 404
  CreateUser:
    input: CreateUserInput
    http:
      path: /users
      method: POST
shapes:
  UserIdInput:
    fields:
      - { name: id, location: path, type: String }
  UserOutput:
    fields:
      - { name: name, type: String }
  CreateUserInput:
    fields:
      - { name: name, location: body, type: String }
"#;

    #[test]
    fn test_parse_yaml_model() {
        let model = ServiceModel::parse_content(MODEL_YAML).expect("valid model");
        assert_eq!(model.operations.len(), 2);

        let get_user = &model.operations["GetUser"];
        assert_eq!(get_user.input.as_deref(), Some("UserIdInput"));
        assert_eq!(get_user.http.method, HttpMethod::Get);
        assert_eq!(get_user.http.success_status(), 200);
        assert_eq!(get_user.http.error_status("NotFound"), Some(404));

        let output = &model.shapes["UserOutput"];
        assert_eq!(output.fields[0].location, FieldLocation::Body);
    }

    #[test]
    fn test_parse_json_model() {
        let json = r#"{
            "operations": { "Ping": { "http": { "path": "/ping" } } },
            "shapes": {}
        }"#;
        let model = ServiceModel::parse_content(json).expect("valid model");
        let ping = &model.operations["Ping"];
        assert_eq!(ping.http.path, "/ping");
        assert_eq!(ping.http.method, HttpMethod::Get);
        assert!(ping.input.is_none());
        assert!(ping.errors.is_empty());
    }

    #[test]
    fn test_parse_invalid_content() {
        let err = ServiceModel::parse_content("operations: [unterminated").unwrap_err();
        assert!(err.contains("neither"));
    }

    #[test]
    fn test_sorted_operation_names() {
        let model = ServiceModel::parse_content(MODEL_YAML).expect("valid model");
        assert_eq!(model.sorted_operation_names(), vec!["CreateUser", "GetUser"]);
    }

    #[test]
    fn test_resolve_missing_shape() {
        let model = ServiceModel::parse_content(MODEL_YAML).expect("valid model");
        let err = model.resolve_shape("GetUser", "Nope").unwrap_err();
        match err {
            Error::ModelResolution { operation, shape } => {
                assert_eq!(operation, "GetUser");
                assert_eq!(shape, "Nope");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_shape() -> crate::Result<()> {
        let model = ServiceModel::parse_content(MODEL_YAML).map_err(Error::model)?;
        let descriptor = model.resolve_shape("GetUser", "UserIdInput")?;
        assert_eq!(descriptor.type_name(), "UserIdInput");
        assert_eq!(descriptor.fields().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_from_file() -> crate::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("model.yaml");
        tokio::fs::write(&path, MODEL_YAML).await?;

        let model = ServiceModel::from_file(&path).await?;
        assert!(model.operations.contains_key("CreateUser"));

        let via_location = ServiceModel::from_file_or_url(path.to_string_lossy()).await?;
        assert_eq!(model, via_location);
        Ok(())
    }

    #[tokio::test]
    async fn test_from_file_reports_path() -> crate::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.yaml");
        tokio::fs::write(&path, "operations: [").await?;

        let err = ServiceModel::from_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
        Ok(())
    }
}
