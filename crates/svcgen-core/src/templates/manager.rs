//! Loading and rendering of header templates

// Internal imports (std, crate)
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    artifact::ArtifactKind,
    error::{Error, Result},
};

// External imports (alphabetized)
use serde::Serialize;
use tera::{Context, Tera};

/// Name of the template rendered at the top of every artifact.
pub const HEADER_TEMPLATE: &str = "header.rs.tera";

const BUILTIN_HEADER: &str = r#"{% if file_header %}{{ file_header }}
{% endif %}// -- Generated Code; do not edit --
//
// {{ file_name }}
// {{ module_name }}
//
{% for import in imports %}
use {{ import }};
{%- endfor %}
"#;

/// Values available to the header template.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderContext<'a> {
    pub file_header: Option<&'a str>,
    pub base_name: &'a str,
    pub kind: ArtifactKind,
    pub file_name: String,
    pub module_name: String,
    /// Merged, sorted and deduplicated import paths
    pub imports: Vec<String>,
}

/// Manages loading and rendering of header templates
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
    /// Directory the templates were loaded from, if not built in
    template_dir: Option<PathBuf>,
}

impl TemplateManager {
    /// Create a TemplateManager, loading overrides from `template_dir` when given.
    ///
    /// Templates missing from the directory fall back to the built-in ones.
    pub fn new(template_dir: Option<&Path>) -> Result<Self> {
        let mut tera = match template_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(Error::config(format!(
                        "Template directory not found: {}",
                        dir.display()
                    )));
                }
                let dir_str = dir.to_str().ok_or_else(|| {
                    Error::config(format!(
                        "Template path contains invalid UTF-8: {}",
                        dir.display()
                    ))
                })?;
                Tera::new(&format!("{}/**/*.tera", dir_str))?
            }
            None => Tera::default(),
        };

        if !tera.get_template_names().any(|name| name == HEADER_TEMPLATE) {
            tera.add_raw_template(HEADER_TEMPLATE, BUILTIN_HEADER)?;
        }

        log::debug!(
            "Loaded templates: {:?}",
            tera.get_template_names().collect::<Vec<_>>()
        );

        Ok(Self {
            tera: Arc::new(tera),
            template_dir: template_dir.map(Path::to_path_buf),
        })
    }

    /// Directory overrides were loaded from
    pub fn template_dir(&self) -> Option<&Path> {
        self.template_dir.as_deref()
    }

    /// Check if a template exists
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template(name).is_ok()
    }

    /// Render the header of one artifact
    pub fn render_header(&self, header: &HeaderContext<'_>) -> Result<String> {
        let context = Context::from_serialize(header)?;
        self.tera.render(HEADER_TEMPLATE, &context).map_err(|e| {
            log::error!("Template rendering failed for '{}': {}", HEADER_TEMPLATE, e);
            Error::Tera(e)
        })
    }
}
