//! Client protocol trait and the error type every client reports.

use std::fmt::Write;

use super::{OperationView, RenderContext};
use crate::error::Result;

/// Variants every client error carries besides the declared errors.
pub(crate) const BUILTIN_ERROR_VARIANTS: &[&str] = &["UnexpectedStatus", "Transport"];

pub(super) fn prologue(ctx: &RenderContext<'_>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "/// Errors reported by {} clients.", ctx.base_name)?;
    writeln!(out, "#[derive(Debug, Clone, PartialEq, Eq)]")?;
    writeln!(out, "pub enum {} {{", ctx.client_error())?;
    for variant in ctx.declared_errors.keys() {
        writeln!(out, "    {variant},")?;
    }
    writeln!(out, "    /// The service answered with a status no operation declares.")?;
    writeln!(out, "    UnexpectedStatus(u16),")?;
    writeln!(out, "    /// The request never produced a response.")?;
    writeln!(out, "    Transport(String),")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "/// Operations a {} client can invoke.", ctx.base_name)?;
    write!(out, "pub trait {} {{", ctx.client_trait())?;
    Ok(out)
}

/// Signature shared by the trait and every implementation of it; the
/// input, when there is one, is bound to `input_param`.
pub(super) fn signature(ctx: &RenderContext<'_>, view: &OperationView<'_>, input_param: &str) -> String {
    let mut params = vec!["&self".to_string()];
    if let Some(input) = view.input_type() {
        params.push(format!("{input_param}: {input}"));
    }
    format!(
        "fn {}({}) -> Result<{}, {}>",
        view.fn_name(),
        params.join(", "),
        view.output_type(),
        ctx.client_error()
    )
}

pub(super) fn render_operation(ctx: &RenderContext<'_>, view: &OperationView<'_>) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "    /// Invokes {} (`{}`).", view.name, view.route())?;
    write!(out, "    {};", signature(ctx, view, "input"))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{all_kinds, context, get_user, view};
    use super::*;
    use crate::config::ErrorDeclaration;

    #[test]
    fn test_prologue_lists_declared_errors() -> Result<()> {
        let requested = all_kinds();
        let declaration = ErrorDeclaration::Inline;
        let ctx = context(&requested, &declaration, &["not_found", "Throttled"]);
        let prologue = prologue(&ctx)?;
        assert!(prologue.contains("pub enum PetStoreError {\n    NotFound,\n    Throttled,\n"));
        assert!(prologue.ends_with("pub trait PetStoreClientProtocol {"));
        for variant in BUILTIN_ERROR_VARIANTS {
            assert!(prologue.contains(&format!("    {variant}(")));
        }
        Ok(())
    }

    #[test]
    fn test_trait_method() -> Result<()> {
        let requested = all_kinds();
        let declaration = ErrorDeclaration::Inline;
        let ctx = context(&requested, &declaration, &[]);
        let description = get_user();
        let fragment = render_operation(&ctx, &view("GetUser", &description))?;
        assert_eq!(
            fragment,
            "    /// Invokes GetUser (`GET /users/{id}`).\n    fn get_user(&self, input: UserIdInput) -> Result<UserOutput, PetStoreError>;"
        );
        Ok(())
    }

    #[test]
    fn test_signature_without_input() {
        let requested = all_kinds();
        let declaration = ErrorDeclaration::Inline;
        let ctx = context(&requested, &declaration, &[]);
        let description = get_user();
        let mut view = view("ListUsers", &description);
        view.input = None;
        assert_eq!(
            signature(&ctx, &view, "input"),
            "fn list_users(&self) -> Result<UserOutput, PetStoreError>"
        );
    }

    #[test]
    fn test_keyword_operation_is_escaped() -> Result<()> {
        let requested = all_kinds();
        let declaration = ErrorDeclaration::Inline;
        let ctx = context(&requested, &declaration, &[]);
        let description = get_user();
        let fragment = render_operation(&ctx, &view("Match", &description))?;
        assert!(fragment.contains(
            "    fn r#match(&self, input: UserIdInput) -> Result<UserOutput, PetStoreError>;"
        ));
        Ok(())
    }
}
