//! Enumeration of the errors the model declares, and which of them each
//! operation can report.

use std::fmt::Write;

use super::{OperationView, RenderContext, UNMAPPED_ERROR_STATUS};
use crate::error::Result;
use crate::utils::{to_screaming_snake_case, to_upper_camel_case};

pub(super) fn prologue(ctx: &RenderContext<'_>) -> Result<String> {
    let mut out = String::new();
    let name = ctx.errors_enum();

    writeln!(out, "/// Errors declared by the {} model.", ctx.base_name)?;
    writeln!(
        out,
        "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]"
    )?;
    writeln!(out, "pub enum {name} {{")?;
    for variant in ctx.declared_errors.keys() {
        writeln!(out, "    {variant},")?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl {name} {{")?;
    writeln!(out, "    /// Identifier of the error in the service model.")?;
    writeln!(out, "    pub fn identity(&self) -> &'static str {{")?;
    writeln!(out, "        match *self {{")?;
    for (variant, identity) in &ctx.declared_errors {
        writeln!(out, "            Self::{variant} => {identity:?},")?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    pub fn from_identity(identity: &str) -> Option<Self> {{")?;
    writeln!(out, "        match identity {{")?;
    for (variant, identity) in &ctx.declared_errors {
        writeln!(out, "            {identity:?} => Some(Self::{variant}),")?;
    }
    writeln!(out, "            _ => None,")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl std::fmt::Display for {name} {{")?;
    writeln!(
        out,
        "    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {{"
    )?;
    writeln!(out, "        f.write_str(self.identity())")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    write!(out, "impl std::error::Error for {name} {{}}")?;
    Ok(out)
}

pub(super) fn render_operation(ctx: &RenderContext<'_>, view: &OperationView<'_>) -> Result<String> {
    let name = ctx.errors_enum();
    let http = &view.description.http;
    let entries: Vec<String> = view
        .description
        .errors
        .iter()
        .map(|error| {
            format!(
                "({name}::{}, {})",
                to_upper_camel_case(error),
                http.error_status(error).unwrap_or(UNMAPPED_ERROR_STATUS)
            )
        })
        .collect();

    let mut out = String::new();
    writeln!(
        out,
        "/// Errors the {} operation can report, with their HTTP status codes.",
        view.name
    )?;
    write!(
        out,
        "pub const {}_ERRORS: &[({name}, u16)] = &[{}];",
        to_screaming_snake_case(view.name),
        entries.join(", ")
    )?;
    Ok(out)
}
