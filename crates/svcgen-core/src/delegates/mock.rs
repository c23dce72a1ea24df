//! Mock clients: one answering every call with defaults, one failing every call.

use std::fmt::Write;

use super::client::signature;
use super::{OperationView, RenderContext};
use crate::error::Result;

pub(super) fn imports(ctx: &RenderContext<'_>) -> Vec<String> {
    let mut imports = vec![format!(
        "super::client::{{{}, {}}}",
        ctx.client_error(),
        ctx.client_trait()
    )];
    imports.extend(ctx.shape_imports());
    imports
}

pub(super) fn client_name(ctx: &RenderContext<'_>, throwing: bool) -> String {
    if throwing {
        format!("Throwing{}Client", ctx.type_prefix)
    } else {
        format!("Mock{}Client", ctx.type_prefix)
    }
}

pub(super) fn prologue(ctx: &RenderContext<'_>, throwing: bool) -> Result<String> {
    let mut out = String::new();
    let name = client_name(ctx, throwing);
    if throwing {
        writeln!(out, "/// {} client failing every call with `error`.", ctx.base_name)?;
        writeln!(out, "#[derive(Debug, Clone)]")?;
        writeln!(out, "pub struct {name} {{")?;
        writeln!(out, "    pub error: {},", ctx.client_error())?;
        writeln!(out, "}}")?;
    } else {
        writeln!(out, "/// {} client answering every call with a default output.", ctx.base_name)?;
        writeln!(out, "#[derive(Debug, Clone, Default)]")?;
        writeln!(out, "pub struct {name};")?;
    }
    writeln!(out)?;
    write!(out, "impl {} for {name} {{", ctx.client_trait())?;
    Ok(out)
}

pub(super) fn render_operation(
    ctx: &RenderContext<'_>,
    view: &OperationView<'_>,
    throwing: bool,
) -> Result<String> {
    let mut out = String::new();
    // Mocks ignore their input
    writeln!(out, "    {} {{", signature(ctx, view, "_input"))?;
    if throwing {
        writeln!(out, "        Err(self.error.clone())")?;
    } else if view.output.is_none() {
        writeln!(out, "        Ok(())")?;
    } else {
        writeln!(out, "        Ok({}::default())", view.output_type())?;
    }
    write!(out, "    }}")?;
    Ok(out)
}
