//! Client routing every call through an API gateway transport.

use std::fmt::Write;

use super::client::signature;
use super::{OperationView, RenderContext};
use crate::config::GatewayOptions;
use crate::error::Result;

pub(super) fn imports(ctx: &RenderContext<'_>) -> Vec<String> {
    let mut imports = vec![
        format!(
            "super::client::{{{}, {}}}",
            ctx.client_error(),
            ctx.client_trait()
        ),
        "serde::de::DeserializeOwned".to_string(),
        "serde::Serialize".to_string(),
    ];
    imports.extend(ctx.shape_imports());
    imports
}

pub(super) fn client_name(ctx: &RenderContext<'_>) -> String {
    format!("ApiGateway{}Client", ctx.type_prefix)
}

pub(super) fn prologue(ctx: &RenderContext<'_>, options: &GatewayOptions) -> Result<String> {
    let mut out = String::new();
    let error = ctx.client_error();
    let client = client_name(ctx);

    writeln!(out, "/// A request as handed to the gateway transport.")?;
    writeln!(out, "#[derive(Debug, Clone, PartialEq, Eq)]")?;
    writeln!(out, "pub struct GatewayRequest {{")?;
    writeln!(out, "    pub method: &'static str,")?;
    writeln!(out, "    pub path: String,")?;
    writeln!(out, "    pub content_type: &'static str,")?;
    writeln!(out, "    /// Sign every header rather than the minimal set")?;
    writeln!(out, "    pub sign_all_headers: bool,")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "/// Signs and executes gateway requests.")?;
    writeln!(out, "pub trait GatewayTransport {{")?;
    writeln!(
        out,
        "    fn execute<I: Serialize, O: DeserializeOwned>(&self, request: GatewayRequest, input: I) -> Result<O, {error}>;"
    )?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "/// {} client calling through an API gateway stage.", ctx.base_name)?;
    writeln!(out, "#[derive(Debug, Clone)]")?;
    writeln!(out, "pub struct {client}<T> {{")?;
    writeln!(out, "    pub transport: T,")?;
    writeln!(out, "    pub stage: String,")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl<T> {client}<T> {{")?;
    writeln!(out, "    pub fn new(transport: T, stage: impl Into<String>) -> Self {{")?;
    writeln!(out, "        Self {{ transport, stage: stage.into() }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    fn request(&self, method: &'static str, path: &str) -> GatewayRequest {{")?;
    writeln!(out, "        GatewayRequest {{")?;
    writeln!(out, "            method,")?;
    writeln!(out, "            path: format!(\"/{{}}{{}}\", self.stage, path),")?;
    writeln!(out, "            content_type: {:?},", options.content_type)?;
    writeln!(out, "            sign_all_headers: {},", options.sign_all_headers)?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    write!(
        out,
        "impl<T: GatewayTransport> {} for {client}<T> {{",
        ctx.client_trait()
    )?;
    Ok(out)
}

pub(super) fn render_operation(ctx: &RenderContext<'_>, view: &OperationView<'_>) -> Result<String> {
    let mut out = String::new();
    let http = &view.description.http;
    let input = if view.input.is_some() { "input" } else { "()" };

    writeln!(out, "    {} {{", signature(ctx, view, "input"))?;
    writeln!(
        out,
        "        let request = self.request({:?}, {:?});",
        http.method.as_str(),
        http.path
    )?;
    writeln!(out, "        self.transport.execute(request, {input})")?;
    write!(out, "    }}")?;
    Ok(out)
}
