//! Enumeration of the model's operations.

use std::fmt::Write;

use super::{OperationView, RenderContext};
use crate::error::Result;

pub(super) fn prologue(ctx: &RenderContext<'_>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "/// Operations of the {} model.", ctx.base_name)?;
    writeln!(
        out,
        "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]"
    )?;
    write!(out, "pub enum {} {{", ctx.operations_enum())?;
    Ok(out)
}

pub(super) fn render_operation(view: &OperationView<'_>) -> Result<String> {
    Ok(format!("    /// `{}`\n    {},", view.route(), view.type_name()))
}
