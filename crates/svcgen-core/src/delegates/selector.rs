//! Routing table selecting the operation, and its handler, for a request.
//!
//! Routes are listed in operation name order; when two operations share a
//! route, the first one listed is selected.

use std::fmt::Write;

use super::{OperationView, RenderContext};
use crate::error::Result;
use crate::utils::to_screaming_snake_case;

pub(super) fn route_name(ctx: &RenderContext<'_>) -> String {
    format!("{}Route", ctx.type_prefix)
}

fn table_name(ctx: &RenderContext<'_>) -> String {
    format!("{}_ROUTES", to_screaming_snake_case(ctx.base_name))
}

pub(super) fn imports(ctx: &RenderContext<'_>) -> Vec<String> {
    vec![format!("super::model_operations::{}", ctx.operations_enum())]
}

pub(super) fn prologue(ctx: &RenderContext<'_>) -> Result<String> {
    let mut out = String::new();
    let route = route_name(ctx);

    writeln!(out, "/// HTTP route of one {} operation.", ctx.base_name)?;
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq)]")?;
    writeln!(out, "pub struct {route} {{")?;
    writeln!(out, "    pub method: &'static str,")?;
    writeln!(out, "    /// Path template; a `{{label}}` segment matches any one segment")?;
    writeln!(out, "    pub path: &'static str,")?;
    writeln!(out, "    pub operation: {},", ctx.operations_enum())?;
    writeln!(out, "    /// Server stub handling the operation")?;
    writeln!(out, "    pub handler: &'static str,")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl {route} {{")?;
    writeln!(out, "    /// Whether this route serves `method` on the concrete `path`.")?;
    writeln!(out, "    pub fn matches(&self, method: &str, path: &str) -> bool {{")?;
    writeln!(out, "        if !self.method.eq_ignore_ascii_case(method) {{")?;
    writeln!(out, "            return false;")?;
    writeln!(out, "        }}")?;
    writeln!(out, "        let mut template = self.path.trim_matches('/').split('/');")?;
    writeln!(out, "        let mut actual = path.trim_matches('/').split('/');")?;
    writeln!(out, "        loop {{")?;
    writeln!(out, "            match (template.next(), actual.next()) {{")?;
    writeln!(out, "                (None, None) => return true,")?;
    writeln!(out, "                (Some(expected), Some(segment)) => {{")?;
    writeln!(
        out,
        "                    let is_label = expected.starts_with('{{') && expected.ends_with('}}');"
    )?;
    writeln!(out, "                    if !is_label && expected != segment {{")?;
    writeln!(out, "                        return false;")?;
    writeln!(out, "                    }}")?;
    writeln!(out, "                }}")?;
    writeln!(out, "                _ => return false,")?;
    writeln!(out, "            }}")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "/// Routes of every {} operation.", ctx.base_name)?;
    write!(out, "pub const {}: &[{route}] = &[", table_name(ctx))?;
    Ok(out)
}

pub(super) fn render_operation(ctx: &RenderContext<'_>, view: &OperationView<'_>) -> Result<String> {
    let http = &view.description.http;
    Ok(format!(
        "    {} {{ method: {:?}, path: {:?}, operation: {}::{}, handler: {:?} }},",
        route_name(ctx),
        http.method.as_str(),
        http.path,
        ctx.operations_enum(),
        view.type_name(),
        view.handler_name()
    ))
}

pub(super) fn epilogue(ctx: &RenderContext<'_>) -> String {
    format!(
        "];\n\n\
         /// Route serving `method` on `path`, if any.\n\
         pub fn select_route(method: &str, path: &str) -> Option<&'static {route}> {{\n    \
         {table}.iter().find(|route| route.matches(method, path))\n\
         }}",
        route = route_name(ctx),
        table = table_name(ctx)
    )
}
