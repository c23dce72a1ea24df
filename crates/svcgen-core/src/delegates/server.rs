//! Server operation handler stubs.

use std::fmt::Write;

use super::{OperationView, RenderContext, UNMAPPED_ERROR_STATUS};
use crate::error::Result;
use crate::utils::to_upper_camel_case;

pub(super) fn context_name(ctx: &RenderContext<'_>) -> String {
    format!("{}OperationsContext", ctx.type_prefix)
}

pub(super) fn prologue(ctx: &RenderContext<'_>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "/// Context handed to every {} operation handler.", ctx.base_name)?;
    writeln!(out, "#[derive(Debug, Clone, Default)]")?;
    write!(out, "pub struct {} {{}}", context_name(ctx))?;
    Ok(out)
}

pub(super) fn render_operation(ctx: &RenderContext<'_>, view: &OperationView<'_>) -> Result<String> {
    let mut out = String::new();
    let http = &view.description.http;

    let error_type = if view.description.errors.is_empty() {
        "std::convert::Infallible".to_string()
    } else {
        let error_type = format!("{}Error", view.type_name());
        writeln!(out, "/// Errors the {} operation can report.", view.name)?;
        writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]")?;
        writeln!(out, "pub enum {error_type} {{")?;
        for error in &view.description.errors {
            writeln!(out, "    {},", to_upper_camel_case(error))?;
        }
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "impl {error_type} {{")?;
        writeln!(out, "    /// HTTP status code the error is reported with.")?;
        writeln!(out, "    pub fn status_code(&self) -> u16 {{")?;
        writeln!(out, "        match self {{")?;
        for error in &view.description.errors {
            let status = http.error_status(error).unwrap_or(UNMAPPED_ERROR_STATUS);
            writeln!(out, "            Self::{} => {status},", to_upper_camel_case(error))?;
        }
        writeln!(out, "        }}")?;
        writeln!(out, "    }}")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        error_type
    };

    let mut params = Vec::new();
    if let Some(input) = view.input_type() {
        params.push(format!("_input: {input}"));
    }
    params.push(format!("_context: &{}", context_name(ctx)));

    let output = view.output_type();
    writeln!(out, "/// Handler for the {} operation.", view.name)?;
    writeln!(out, "///")?;
    writeln!(
        out,
        "/// Bound to `{}`; responds with {} on success.",
        view.route(),
        http.success_status()
    )?;
    writeln!(
        out,
        "pub fn {}({}) -> Result<{output}, {error_type}> {{",
        view.handler_name(),
        params.join(", ")
    )?;
    if output == "()" {
        writeln!(out, "    Ok(())")?;
    } else {
        writeln!(out, "    Ok({output}::default())")?;
    }
    write!(out, "}}")?;
    Ok(out)
}
