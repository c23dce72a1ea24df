//! Configuration management for svcgen code generation.
//!
//! This module defines the `Config` struct and related functionality for managing
//! code generation settings. The configuration can be loaded from a YAML or TOML
//! file, created programmatically, or assembled from command-line arguments.
//!
//! # Examples
//!
//! ```no_run
//! use svcgen_core::artifact::ArtifactKind;
//! use svcgen_core::config::{Config, ErrorDeclaration};
//!
//! // Create a new config programmatically
//! let mut config = Config::new("PetStore", "pet-store.yaml", "generated");
//! config.artifact_kinds = vec![ArtifactKind::Client, ArtifactKind::MockClient];
//! config.error_declaration = ErrorDeclaration::External {
//!     library_import: "pet_store_errors".to_string(),
//! };
//!
//! // Or load from a config file
//! # async fn load() -> svcgen_core::Result<()> {
//! let config = Config::from_file("svcgen.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::artifact::ArtifactKind;
use crate::utils::{is_valid_identifier, to_upper_camel_case};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration for svcgen generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base name used for namespacing, headers and destination paths
    pub base_name: String,

    /// Path or URL of the service model (YAML or JSON)
    pub model_path: String,

    /// Output directory for generated artifacts
    pub output_dir: String,

    /// Artifact kinds to generate
    #[serde(default = "default_artifact_kinds")]
    pub artifact_kinds: Vec<ArtifactKind>,

    /// Literal text prepended to every artifact
    #[serde(default)]
    pub file_header: Option<String>,

    /// Where the validation error type comes from
    #[serde(default)]
    pub error_declaration: ErrorDeclaration,

    /// Optional directory holding a `header.rs.tera` override
    #[serde(default)]
    pub template_dir: Option<String>,

    /// Settings for the API gateway client
    #[serde(default)]
    pub gateway: GatewayOptions,

    /// Whether hand-edited server artifacts are regenerated
    #[serde(default)]
    pub generation_type: GenerationType,
}

/// How a run treats artifacts that already exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    /// Generate and overwrite every artifact
    #[default]
    Server,
    /// Keep existing user-owned artifacts such as handler stubs
    ServerUpdate,
}

impl FromStr for GenerationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "server" => Ok(Self::Server),
            "server_update" | "serverupdate" => Ok(Self::ServerUpdate),
            _ => Err(format!("Unknown generation type: {}", s)),
        }
    }
}

impl fmt::Display for GenerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => f.write_str("server"),
            Self::ServerUpdate => f.write_str("server_update"),
        }
    }
}

/// How generated HTTP inputs obtain their validation error type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ErrorDeclaration {
    /// Declare the type in the generated artifact
    #[default]
    Inline,
    /// Import the type from an existing library
    External { library_import: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOptions {
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub sign_all_headers: bool,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            content_type: default_content_type(),
            sign_all_headers: false,
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new(
        base_name: impl Into<String>,
        model_path: impl Into<String>,
        output_dir: impl Into<String>,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            model_path: model_path.into(),
            output_dir: output_dir.into(),
            artifact_kinds: default_artifact_kinds(),
            file_header: None,
            error_declaration: ErrorDeclaration::default(),
            template_dir: None,
            gateway: GatewayOptions::default(),
            generation_type: GenerationType::default(),
        }
    }

    /// Load configuration from a file; `.toml` files are read as TOML, anything else as YAML
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config: Self = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check the settings generation relies on.
    pub fn validate(&self) -> crate::Result<()> {
        let type_prefix = to_upper_camel_case(&self.base_name);
        if !is_valid_identifier(&type_prefix) {
            return Err(crate::Error::config(format!(
                "base name '{}' does not produce a valid identifier",
                self.base_name
            )));
        }
        if self.artifact_kinds.is_empty() {
            return Err(crate::Error::config("no artifact kinds requested"));
        }
        if let ErrorDeclaration::External { library_import } = &self.error_declaration {
            if library_import.trim().is_empty() {
                return Err(crate::Error::config(
                    "external error declaration needs a library import",
                ));
            }
        }
        Ok(())
    }
}

fn default_artifact_kinds() -> Vec<ArtifactKind> {
    ArtifactKind::all().collect()
}

fn default_content_type() -> String {
    "application/json".to_string()
}
