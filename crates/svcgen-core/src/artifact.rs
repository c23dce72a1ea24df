//! Artifact kinds and the text sink a generation pass appends to.
//!
//! # Examples
//!
//! ```
//! use svcgen_core::artifact::ArtifactKind;
//! use std::str::FromStr;
//!
//! let kind = ArtifactKind::from_str("mock_client").unwrap();
//! assert_eq!(kind, ArtifactKind::MockClient);
//! assert_eq!(kind.to_string(), "mock_client");
//! assert_eq!(
//!     kind.destination("PetStore").to_string_lossy(),
//!     "pet_store/mock_client.rs"
//! );
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::utils::to_snake_case;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Supported artifact flavors.
///
/// Declaration order is the order in which a run generates them: the kinds
/// that define types come before the kinds that only reference them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// HTTP request input types
    HttpInput,
    /// HTTP response output types
    HttpOutput,
    /// Enumeration of the model's operations
    ModelOperations,
    /// Enumeration of the model's declared errors
    ModelErrors,
    /// Server operation handler stubs
    ServerStubs,
    /// Routing table from HTTP routes to operations
    ServerHandlerSelector,
    /// Client protocol trait
    Client,
    /// Mock client returning default outputs
    MockClient,
    /// Mock client failing every call
    ThrowingMockClient,
    /// Client calling through an API gateway
    ApiGatewayClient,
}

/// Scope within which emitted type names must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeNamespace {
    /// Types shared by every HTTP input/output artifact
    Http,
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "server_stubs" => Ok(Self::ServerStubs),
            "server_handler_selector" => Ok(Self::ServerHandlerSelector),
            "model_errors" => Ok(Self::ModelErrors),
            "client" => Ok(Self::Client),
            "mock_client" => Ok(Self::MockClient),
            "throwing_mock_client" => Ok(Self::ThrowingMockClient),
            "api_gateway_client" => Ok(Self::ApiGatewayClient),
            "model_operations" => Ok(Self::ModelOperations),
            "http_input" => Ok(Self::HttpInput),
            "http_output" => Ok(Self::HttpOutput),
            _ => Err(format!("Unknown artifact kind: {}", s)),
        }
    }
}

impl ArtifactKind {
    /// Returns the artifact identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerStubs => "server_stubs",
            Self::ServerHandlerSelector => "server_handler_selector",
            Self::ModelErrors => "model_errors",
            Self::Client => "client",
            Self::MockClient => "mock_client",
            Self::ThrowingMockClient => "throwing_mock_client",
            Self::ApiGatewayClient => "api_gateway_client",
            Self::ModelOperations => "model_operations",
            Self::HttpInput => "http_input",
            Self::HttpOutput => "http_output",
        }
    }

    /// Returns an iterator over all artifact kinds, in generation order
    pub fn all() -> impl Iterator<Item = Self> {
        use ArtifactKind::*;
        [
            HttpInput,
            HttpOutput,
            ModelOperations,
            ModelErrors,
            ServerStubs,
            ServerHandlerSelector,
            Client,
            MockClient,
            ThrowingMockClient,
            ApiGatewayClient,
        ]
        .into_iter()
    }

    /// Namespace this kind defines types in; `None` for kinds that only
    /// reference types defined elsewhere.
    pub fn namespace(&self) -> Option<TypeNamespace> {
        match self {
            Self::HttpInput | Self::HttpOutput => Some(TypeNamespace::Http),
            _ => None,
        }
    }

    /// Whether a server update run keeps an existing artifact of this kind,
    /// since its content is meant to be edited by hand.
    pub fn is_user_owned(&self) -> bool {
        matches!(self, Self::ServerStubs)
    }

    /// Destination of this kind's artifact, relative to the output directory.
    pub fn destination(&self, base_name: &str) -> PathBuf {
        Path::new(&to_snake_case(base_name)).join(format!("{}.rs", self.as_str()))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One generated output unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Destination relative to the output directory
    pub path: PathBuf,
    pub content: String,
}

/// Accumulates the text of one artifact in emission order.
#[derive(Debug, Default)]
pub struct FileBuilder {
    content: String,
}

impl FileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text verbatim.
    pub fn append(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Append text and terminate it with a newline.
    pub fn append_line(&mut self, line: &str) {
        self.content.push_str(line);
        self.content.push('\n');
    }

    /// Append a block, separated from the previous one by a blank line.
    pub fn append_block(&mut self, block: &str) {
        if !self.content.is_empty() && !self.content.ends_with("\n\n") {
            if !self.content.ends_with('\n') {
                self.content.push('\n');
            }
            self.content.push('\n');
        }
        self.append(block);
        if !block.ends_with('\n') {
            self.content.push('\n');
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn finish(self, kind: ArtifactKind, path: PathBuf) -> Artifact {
        Artifact {
            kind,
            path,
            content: self.content,
        }
    }
}
