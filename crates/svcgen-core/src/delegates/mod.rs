//! Per-flavor rendering policies.
//!
//! Every artifact kind is rendered by one [`Delegate`]. Delegates are
//! stateless: they see one operation at a time through an [`OperationView`]
//! and keep nothing between calls. Whether a shape type is defined or only
//! referenced has already been decided by the driver's ledger and arrives
//! here resolved in each [`ShapeBinding`].

mod client;
mod errors;
mod gateway;
mod http_shape;
mod mock;
mod operations;
mod selector;
mod server;

pub(crate) use client::BUILTIN_ERROR_VARIANTS;

// Internal imports (std, crate)
use std::collections::{BTreeMap, BTreeSet};

use crate::artifact::ArtifactKind;
use crate::config::{Config, ErrorDeclaration, GatewayOptions};
use crate::error::{Error, Result};
use crate::model::{OperationDescription, ServiceModel};
use crate::shape::ShapeDescriptor;
use crate::utils::{to_field_name, to_snake_case, to_upper_camel_case};

/// Status reported for a declared error the HTTP binding does not map.
const UNMAPPED_ERROR_STATUS: u16 = 500;

/// Which side of the HTTP exchange an operation shape is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeDirection {
    Input,
    Output,
}

/// Rendering policy of one artifact flavor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delegate {
    /// Operation handler stubs with per-operation error enums
    ServerStub,
    /// Client protocol trait
    Client,
    /// Client implementation that succeeds with defaults, or fails every call
    MockClient { throwing: bool },
    /// Client implementation routing calls through an API gateway transport
    ApiGatewayClient(GatewayOptions),
    /// Enumeration of the model's operations
    Operations,
    /// Enumeration of the model's declared errors
    ModelErrors,
    /// Routing table from HTTP routes to operations
    HandlerSelector,
    /// Shape type definitions and per-operation aliases
    HttpShape(ShapeDirection),
}

/// Run-wide values every delegate may read.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub base_name: &'a str,
    /// UpperCamelCase form of the base name, prefixed to shared type names
    pub type_prefix: String,
    pub error_declaration: &'a ErrorDeclaration,
    /// Kinds generated in this run
    pub requested: &'a BTreeSet<ArtifactKind>,
    /// Union of every operation's declared errors, keyed by variant name
    pub declared_errors: BTreeMap<String, String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        base_name: &'a str,
        error_declaration: &'a ErrorDeclaration,
        requested: &'a BTreeSet<ArtifactKind>,
        model: &ServiceModel,
    ) -> Self {
        let declared_errors = model
            .operations
            .values()
            .flat_map(|operation| operation.errors.iter())
            .map(|error| (to_upper_camel_case(error), error.clone()))
            .collect();
        Self {
            base_name,
            type_prefix: to_upper_camel_case(base_name),
            error_declaration,
            requested,
            declared_errors,
        }
    }

    /// Glob imports of the shape artifacts generated alongside this one.
    pub(crate) fn shape_imports(&self) -> Vec<String> {
        let mut imports = Vec::new();
        if self.requested.contains(&ArtifactKind::HttpInput) {
            imports.push("super::http_input::*".to_string());
        }
        if self.requested.contains(&ArtifactKind::HttpOutput) {
            imports.push("super::http_output::*".to_string());
        }
        imports
    }

    pub(crate) fn client_trait(&self) -> String {
        format!("{}ClientProtocol", self.type_prefix)
    }

    pub(crate) fn client_error(&self) -> String {
        format!("{}Error", self.type_prefix)
    }

    pub(crate) fn operations_enum(&self) -> String {
        format!("{}ModelOperations", self.type_prefix)
    }

    pub(crate) fn errors_enum(&self) -> String {
        format!("{}ModelErrors", self.type_prefix)
    }

    /// Type names the delegates emit besides shape types, each paired with
    /// the artifact or operation that owns it.
    ///
    /// Shape types are glob-imported next to all of these, so a shape may
    /// not take any of their names.
    pub fn reserved_type_names(&self, operations: &[&str]) -> Vec<(String, String)> {
        let shared = [
            ("ValidationError".to_string(), ArtifactKind::HttpInput),
            (self.operations_enum(), ArtifactKind::ModelOperations),
            (self.errors_enum(), ArtifactKind::ModelErrors),
            (server::context_name(self), ArtifactKind::ServerStubs),
            (selector::route_name(self), ArtifactKind::ServerHandlerSelector),
            (self.client_error(), ArtifactKind::Client),
            (self.client_trait(), ArtifactKind::Client),
            (mock::client_name(self, false), ArtifactKind::MockClient),
            (mock::client_name(self, true), ArtifactKind::ThrowingMockClient),
            ("GatewayRequest".to_string(), ArtifactKind::ApiGatewayClient),
            ("GatewayTransport".to_string(), ArtifactKind::ApiGatewayClient),
            (gateway::client_name(self), ArtifactKind::ApiGatewayClient),
        ];
        let mut reserved: Vec<(String, String)> = shared
            .into_iter()
            .map(|(name, kind)| (name, kind.as_str().to_string()))
            .collect();
        for &operation in operations {
            let type_name = to_upper_camel_case(operation);
            for suffix in ["HttpRequestInput", "HttpResponseOutput", "Error"] {
                reserved.push((format!("{type_name}{suffix}"), operation.to_string()));
            }
        }
        reserved
    }
}

/// How an operation refers to one of its shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeBinding {
    /// Name to reference the type by
    pub type_name: String,
    /// Present when this fragment must define the type
    pub definition: Option<ShapeDescriptor>,
}

impl ShapeBinding {
    pub fn reference(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            definition: None,
        }
    }

    /// Define `descriptor` under `type_name`, the name the run settled on
    /// for its structure.
    pub fn define(type_name: impl Into<String>, descriptor: ShapeDescriptor) -> Self {
        Self {
            type_name: type_name.into(),
            definition: Some(descriptor),
        }
    }
}

/// One operation as a delegate sees it.
#[derive(Debug, Clone)]
pub struct OperationView<'a> {
    pub name: &'a str,
    pub description: &'a OperationDescription,
    pub input: Option<ShapeBinding>,
    pub output: Option<ShapeBinding>,
}

impl OperationView<'_> {
    /// Generated method name, escaped when it is a keyword
    pub fn fn_name(&self) -> String {
        to_field_name(self.name)
    }

    /// Name of the server stub handling the operation
    pub fn handler_name(&self) -> String {
        format!("handle_{}", to_snake_case(self.name))
    }

    /// Generated type-level name
    pub fn type_name(&self) -> String {
        to_upper_camel_case(self.name)
    }

    pub fn input_type(&self) -> Option<&str> {
        self.input.as_ref().map(|binding| binding.type_name.as_str())
    }

    /// Output type, `()` when the operation returns nothing
    pub fn output_type(&self) -> &str {
        self.output
            .as_ref()
            .map_or("()", |binding| binding.type_name.as_str())
    }

    /// `METHOD /path` of the HTTP binding
    pub fn route(&self) -> String {
        format!(
            "{} {}",
            self.description.http.method, self.description.http.path
        )
    }
}

impl Delegate {
    /// Whether this delegate binds the operation's input shape.
    pub fn wants_input(&self) -> bool {
        !matches!(self, Self::HttpShape(ShapeDirection::Output))
    }

    /// Whether this delegate binds the operation's output shape.
    pub fn wants_output(&self) -> bool {
        !matches!(self, Self::HttpShape(ShapeDirection::Input))
    }

    /// Import paths the artifact header must declare.
    pub fn imports(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        match self {
            Self::ServerStub | Self::Client => ctx.shape_imports(),
            Self::MockClient { .. } => mock::imports(ctx),
            Self::ApiGatewayClient(_) => gateway::imports(ctx),
            Self::Operations | Self::ModelErrors => Vec::new(),
            Self::HandlerSelector => selector::imports(ctx),
            Self::HttpShape(direction) => http_shape::imports(ctx, *direction),
        }
    }

    /// Declarations emitted once, before the first operation.
    pub fn prologue(&self, ctx: &RenderContext<'_>) -> Result<Option<String>> {
        let prologue = match self {
            Self::ServerStub => Some(server::prologue(ctx)?),
            Self::Client => Some(client::prologue(ctx)?),
            Self::MockClient { throwing } => Some(mock::prologue(ctx, *throwing)?),
            Self::ApiGatewayClient(options) => Some(gateway::prologue(ctx, options)?),
            Self::Operations => Some(operations::prologue(ctx)?),
            Self::ModelErrors => Some(errors::prologue(ctx)?),
            Self::HandlerSelector => Some(selector::prologue(ctx)?),
            Self::HttpShape(direction) => http_shape::prologue(ctx, *direction)?,
        };
        Ok(prologue)
    }

    /// Fragment for one operation.
    pub fn render_operation(
        &self,
        ctx: &RenderContext<'_>,
        view: &OperationView<'_>,
    ) -> Result<String> {
        match self {
            Self::ServerStub => server::render_operation(ctx, view),
            Self::Client => client::render_operation(ctx, view),
            Self::MockClient { throwing } => mock::render_operation(ctx, view, *throwing),
            Self::ApiGatewayClient(_) => gateway::render_operation(ctx, view),
            Self::Operations => operations::render_operation(view),
            Self::ModelErrors => errors::render_operation(ctx, view),
            Self::HandlerSelector => selector::render_operation(ctx, view),
            Self::HttpShape(direction) => http_shape::render_operation(ctx, view, *direction),
        }
    }

    /// Text closing what the prologue opened.
    pub fn epilogue(&self, ctx: &RenderContext<'_>) -> Option<String> {
        match self {
            Self::Client | Self::MockClient { .. } | Self::ApiGatewayClient(_) | Self::Operations => {
                Some("}".to_string())
            }
            Self::HandlerSelector => Some(selector::epilogue(ctx)),
            Self::ServerStub | Self::ModelErrors | Self::HttpShape(_) => None,
        }
    }
}

/// The delegate of every kind a run may generate.
#[derive(Debug, Clone, Default)]
pub struct Delegates {
    by_kind: BTreeMap<ArtifactKind, Delegate>,
}

impl Delegates {
    pub fn new() -> Self {
        Self::default()
    }

    /// One delegate for each of the configured artifact kinds.
    pub fn from_config(config: &Config) -> Self {
        let mut delegates = Self::new();
        for kind in &config.artifact_kinds {
            delegates.insert(*kind, Self::standard(*kind, &config.gateway));
        }
        delegates
    }

    /// The delegate that renders `kind` by default.
    pub fn standard(kind: ArtifactKind, gateway: &GatewayOptions) -> Delegate {
        match kind {
            ArtifactKind::ServerStubs => Delegate::ServerStub,
            ArtifactKind::Client => Delegate::Client,
            ArtifactKind::MockClient => Delegate::MockClient { throwing: false },
            ArtifactKind::ThrowingMockClient => Delegate::MockClient { throwing: true },
            ArtifactKind::ApiGatewayClient => Delegate::ApiGatewayClient(gateway.clone()),
            ArtifactKind::ModelOperations => Delegate::Operations,
            ArtifactKind::ModelErrors => Delegate::ModelErrors,
            ArtifactKind::ServerHandlerSelector => Delegate::HandlerSelector,
            ArtifactKind::HttpInput => Delegate::HttpShape(ShapeDirection::Input),
            ArtifactKind::HttpOutput => Delegate::HttpShape(ShapeDirection::Output),
        }
    }

    pub fn insert(&mut self, kind: ArtifactKind, delegate: Delegate) -> Option<Delegate> {
        self.by_kind.insert(kind, delegate)
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&Delegate> {
        self.by_kind.get(&kind)
    }

    /// Delegate for a requested kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no delegate was registered for `kind`.
    pub fn require(&self, kind: ArtifactKind) -> Result<&Delegate> {
        self.get(kind)
            .ok_or_else(|| Error::config(format!("no delegate registered for artifact kind '{kind}'")))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, FieldLocation, HttpMethod};

    /// Context over every kind for a model declaring `errors`.
    pub(crate) fn context<'a>(
        requested: &'a BTreeSet<ArtifactKind>,
        error_declaration: &'a ErrorDeclaration,
        errors: &[&str],
    ) -> RenderContext<'a> {
        let mut model = ServiceModel::default();
        model.operations.insert(
            "Any".to_string(),
            OperationDescription {
                errors: errors.iter().map(|e| e.to_string()).collect(),
                ..Default::default()
            },
        );
        RenderContext::new("PetStore", error_declaration, requested, &model)
    }

    pub(crate) fn all_kinds() -> BTreeSet<ArtifactKind> {
        ArtifactKind::all().collect()
    }

    pub(crate) fn get_user() -> OperationDescription {
        let mut description = OperationDescription {
            input: Some("UserIdInput".to_string()),
            output: Some("UserOutput".to_string()),
            errors: vec!["NotFound".to_string()],
            ..Default::default()
        };
        description.http.path = "/users/{id}".to_string();
        description.http.method = HttpMethod::Get;
        description.http.status_codes.insert("NotFound".to_string(), 404);
        description
    }

    pub(crate) fn user_id_input() -> ShapeDescriptor {
        ShapeDescriptor::new(
            "UserIdInput",
            vec![FieldDescriptor::new("id", FieldLocation::Path, "String")],
        )
    }

    pub(crate) fn user_output() -> ShapeDescriptor {
        ShapeDescriptor::new(
            "UserOutput",
            vec![
                FieldDescriptor::new("userName", FieldLocation::Body, "String"),
                FieldDescriptor::new("etag", FieldLocation::Header, "String"),
            ],
        )
    }

    pub(crate) fn view<'a>(name: &'a str, description: &'a OperationDescription) -> OperationView<'a> {
        OperationView {
            name,
            description,
            input: Some(ShapeBinding::reference("UserIdInput")),
            output: Some(ShapeBinding::reference("UserOutput")),
        }
    }

    #[test]
    fn test_from_config_covers_requested_kinds() {
        let mut config = Config::new("PetStore", "model.yaml", "out");
        config.artifact_kinds = vec![ArtifactKind::Client, ArtifactKind::ThrowingMockClient];
        let delegates = Delegates::from_config(&config);

        assert_eq!(delegates.get(ArtifactKind::Client), Some(&Delegate::Client));
        assert_eq!(
            delegates.get(ArtifactKind::ThrowingMockClient),
            Some(&Delegate::MockClient { throwing: true })
        );
        let err = delegates.require(ArtifactKind::ServerStubs).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_shape_selection() {
        let input = Delegate::HttpShape(ShapeDirection::Input);
        let output = Delegate::HttpShape(ShapeDirection::Output);
        assert!(input.wants_input() && !input.wants_output());
        assert!(!output.wants_input() && output.wants_output());
        assert!(Delegate::Client.wants_input() && Delegate::Client.wants_output());
    }

    #[test]
    fn test_context_collects_declared_errors() {
        let requested = all_kinds();
        let declaration = ErrorDeclaration::Inline;
        let ctx = context(&requested, &declaration, &["Throttled", "not_found", "Throttled"]);
        assert_eq!(ctx.type_prefix, "PetStore");
        assert_eq!(
            ctx.declared_errors.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["NotFound", "Throttled"]
        );
        assert_eq!(ctx.declared_errors["NotFound"], "not_found");
        assert_eq!(ctx.client_trait(), "PetStoreClientProtocol");
    }

    #[test]
    fn test_shape_imports_follow_requested_kinds() {
        let requested: BTreeSet<_> = [ArtifactKind::Client, ArtifactKind::HttpOutput].into();
        let declaration = ErrorDeclaration::Inline;
        let ctx = context(&requested, &declaration, &[]);
        assert_eq!(ctx.shape_imports(), vec!["super::http_output::*".to_string()]);
    }

    #[test]
    fn test_view_names() {
        let description = get_user();
        let mut view = view("GetUser", &description);
        assert_eq!(view.fn_name(), "get_user");
        assert_eq!(view.handler_name(), "handle_get_user");
        assert_eq!(view.type_name(), "GetUser");
        assert_eq!(view.route(), "GET /users/{id}");
        assert_eq!(view.output_type(), "UserOutput");
        view.output = None;
        assert_eq!(view.output_type(), "()");
    }

    #[test]
    fn test_keyword_operations_get_safe_method_names() {
        let description = get_user();
        assert_eq!(view("Match", &description).fn_name(), "r#match");
        assert_eq!(view("Type", &description).handler_name(), "handle_type");
        assert_eq!(view("Self", &description).fn_name(), "self_");
    }

    #[test]
    fn test_reserved_type_names() {
        let requested = all_kinds();
        let declaration = ErrorDeclaration::Inline;
        let ctx = context(&requested, &declaration, &[]);
        let reserved = ctx.reserved_type_names(&["GetUser"]);
        let owner_of = |name: &str| {
            reserved
                .iter()
                .find(|(reserved_name, _)| reserved_name == name)
                .map(|(_, owner)| owner.as_str())
        };

        assert_eq!(owner_of("ValidationError"), Some("http_input"));
        assert_eq!(owner_of("PetStoreError"), Some("client"));
        assert_eq!(owner_of("ThrowingPetStoreClient"), Some("throwing_mock_client"));
        assert_eq!(owner_of("ApiGatewayPetStoreClient"), Some("api_gateway_client"));
        assert_eq!(owner_of("PetStoreRoute"), Some("server_handler_selector"));
        assert_eq!(owner_of("GetUserHttpRequestInput"), Some("GetUser"));
        assert_eq!(owner_of("GetUserHttpResponseOutput"), Some("GetUser"));
        assert_eq!(owner_of("GetUserError"), Some("GetUser"));
        assert_eq!(owner_of("UserIdInput"), None);
    }

    #[test]
    fn test_delegates_are_deterministic() -> Result<()> {
        let requested = all_kinds();
        let declaration = ErrorDeclaration::Inline;
        let ctx = context(&requested, &declaration, &["NotFound"]);
        let description = get_user();
        let view = view("GetUser", &description);

        for kind in ArtifactKind::all() {
            let delegate = Delegates::standard(kind, &GatewayOptions::default());
            assert_eq!(
                delegate.render_operation(&ctx, &view)?,
                delegate.render_operation(&ctx, &view)?,
                "{kind} must render deterministically"
            );
        }
        Ok(())
    }
}
