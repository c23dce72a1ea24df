//! Shape type definitions and the per-operation aliases that name them.
//!
//! A shape is defined only in the fragment whose binding carries a
//! definition, under the name the run settled on for its structure; every
//! other operation bound to the same structure gets an alias to that name.

use std::fmt::Write;

use super::{OperationView, RenderContext, ShapeDirection};
use crate::artifact::ArtifactKind;
use crate::config::ErrorDeclaration;
use crate::error::Result;
use crate::model::FieldLocation;
use crate::shape::ShapeDescriptor;
use crate::utils::{to_field_name, to_screaming_snake_case};

const INLINE_VALIDATION_ERROR: &str = r#"/// An HTTP input failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}"#;

pub(super) fn imports(ctx: &RenderContext<'_>, direction: ShapeDirection) -> Vec<String> {
    let mut imports = vec!["serde::{Deserialize, Serialize}".to_string()];
    match direction {
        ShapeDirection::Input => {
            if let ErrorDeclaration::External { library_import } = ctx.error_declaration {
                imports.push(format!("{library_import}::ValidationError"));
            }
        }
        ShapeDirection::Output => {
            // Outputs may alias types first defined as inputs
            if ctx.requested.contains(&ArtifactKind::HttpInput) {
                imports.push("super::http_input::*".to_string());
            }
        }
    }
    imports
}

pub(super) fn prologue(
    ctx: &RenderContext<'_>,
    direction: ShapeDirection,
) -> Result<Option<String>> {
    let inline = direction == ShapeDirection::Input
        && *ctx.error_declaration == ErrorDeclaration::Inline;
    Ok(inline.then(|| INLINE_VALIDATION_ERROR.to_string()))
}

pub(super) fn render_operation(
    _ctx: &RenderContext<'_>,
    view: &OperationView<'_>,
    direction: ShapeDirection,
) -> Result<String> {
    let mut out = String::new();
    let (binding, alias, role) = match direction {
        ShapeDirection::Input => (
            view.input.as_ref(),
            format!("{}HttpRequestInput", view.type_name()),
            "request input",
        ),
        ShapeDirection::Output => (
            view.output.as_ref(),
            format!("{}HttpResponseOutput", view.type_name()),
            "response output",
        ),
    };

    if let Some(binding) = binding {
        if let Some(definition) = &binding.definition {
            define(&mut out, view.name, &binding.type_name, definition, direction)?;
            writeln!(out)?;
        }
    }

    writeln!(out, "/// HTTP {role} of the {} operation.", view.name)?;
    let target = binding.map_or("()", |binding| binding.type_name.as_str());
    write!(out, "pub type {alias} = {target};")?;
    Ok(out)
}

fn define(
    out: &mut String,
    operation: &str,
    type_name: &str,
    shape: &ShapeDescriptor,
    direction: ShapeDirection,
) -> Result<()> {
    writeln!(
        out,
        "/// `{}` shape, first bound by the {operation} operation.",
        shape.shape_name()
    )?;
    writeln!(
        out,
        "#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]"
    )?;
    if shape.fields().is_empty() {
        writeln!(out, "pub struct {type_name} {{}}")?;
    } else {
        writeln!(out, "pub struct {type_name} {{")?;
        for field in shape.fields() {
            let ident = to_field_name(&field.name);
            writeln!(out, "    /// {} field", field.location)?;
            if ident.trim_start_matches("r#") != field.name {
                writeln!(out, "    #[serde(rename = {:?})]", field.name)?;
            }
            writeln!(out, "    pub {ident}: {},", field.target_type)?;
        }
        writeln!(out, "}}")?;
    }

    let mut members = Vec::new();
    for location in FieldLocation::all() {
        let names: Vec<String> = shape
            .fields_at(location)
            .map(|field| format!("{:?}", field.name))
            .collect();
        if !names.is_empty() {
            members.push(format!(
                "    pub const {}_FIELDS: &'static [&'static str] = &[{}];",
                to_screaming_snake_case(location.as_str()),
                names.join(", ")
            ));
        }
    }
    if direction == ShapeDirection::Input {
        members.push(validate(shape)?);
    }
    if !members.is_empty() {
        writeln!(out)?;
        writeln!(out, "impl {type_name} {{")?;
        writeln!(out, "{}", members.join("\n\n"))?;
        writeln!(out, "}}")?;
    }
    Ok(())
}

/// Path parameters typed as strings must not be empty.
fn validate(shape: &ShapeDescriptor) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "    /// Checks the constraints the HTTP binding places on this input.")?;
    writeln!(out, "    pub fn validate(&self) -> Result<(), ValidationError> {{")?;
    for field in shape
        .fields_at(FieldLocation::Path)
        .filter(|field| field.target_type == "String")
    {
        writeln!(out, "        if self.{}.is_empty() {{", to_field_name(&field.name))?;
        writeln!(
            out,
            "            return Err(ValidationError::new({:?}, \"path parameter must not be empty\"));",
            field.name
        )?;
        writeln!(out, "        }}")?;
    }
    writeln!(out, "        Ok(())")?;
    write!(out, "    }}")?;
    Ok(out)
}
