//! Generation driver.
//!
//! A run first settles, in a [`ShapePlan`], the name of every shape the
//! model's operations refer to. Then, for every requested artifact kind, the
//! driver walks the operations in ascending lexical order, lets the run's
//! [`EmissionLedger`] decide which fragment defines each shared shape type,
//! and collects the delegate fragments into one [`Artifact`]. Every kind is
//! rendered before anything is persisted, so a failing run leaves nothing
//! half-written behind.

// Internal imports (std, crate)
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use crate::artifact::{Artifact, ArtifactKind, FileBuilder, TypeNamespace};
use crate::config::{Config, ErrorDeclaration, GenerationType};
use crate::delegates::{
    Delegate, Delegates, OperationView, RenderContext, ShapeBinding, ShapeDirection,
    BUILTIN_ERROR_VARIANTS,
};
use crate::error::{Error, Result};
use crate::ledger::{EmissionLedger, EmitDecision};
use crate::model::{OperationDescription, ServiceModel};
use crate::persist::ArtifactWriter;
use crate::plan::{PlannedShape, ShapePlan};
use crate::templates::{HeaderContext, TemplateManager};
use crate::utils::{to_snake_case, to_upper_camel_case};

// External imports (alphabetized)
use futures::future::join_all;

type Ledgers = BTreeMap<TypeNamespace, EmissionLedger>;

/// Orchestrates one generation run per call.
#[derive(Debug, Clone)]
pub struct Driver {
    base_name: String,
    file_header: Option<String>,
    error_declaration: ErrorDeclaration,
    generation_type: GenerationType,
    templates: TemplateManager,
}

impl Driver {
    pub fn new(config: &Config) -> Result<Self> {
        let templates = TemplateManager::new(config.template_dir.as_deref().map(Path::new))?;
        Ok(Self {
            base_name: config.base_name.clone(),
            file_header: config.file_header.clone(),
            error_declaration: config.error_declaration.clone(),
            generation_type: config.generation_type,
            templates,
        })
    }

    /// Render one artifact per requested kind without persisting anything.
    ///
    /// # Errors
    ///
    /// Fails on the first unresolved shape reference, naming collision or
    /// missing delegate, whichever kinds are requested.
    pub fn render(
        &self,
        model: &ServiceModel,
        kinds: &[ArtifactKind],
        delegates: &Delegates,
    ) -> Result<Vec<Artifact>> {
        let requested: BTreeSet<ArtifactKind> = kinds.iter().copied().collect();
        let operations = sorted_operations(model)?;
        check_error_variants(&operations)?;
        let ctx = RenderContext::new(&self.base_name, &self.error_declaration, &requested, model);

        let names: Vec<&str> = operations.iter().map(|&(name, _)| name).collect();
        let plan = ShapePlan::build(model, &operations, &ctx.reserved_type_names(&names))?;

        let mut ledgers = Ledgers::new();
        let mut artifacts = Vec::with_capacity(requested.len());
        for kind in &requested {
            let delegate = delegates.require(*kind)?;
            artifacts.push(self.render_kind(&operations, *kind, delegate, &ctx, &plan, &mut ledgers)?);
        }
        Ok(artifacts)
    }

    /// Render every requested kind, then persist the artifacts concurrently.
    ///
    /// A persistence failure does not stop sibling artifacts from being
    /// persisted; every failure is reported. In a server update run,
    /// user-owned artifacts that already exist are left untouched and are
    /// not part of the result.
    pub async fn generate<W: ArtifactWriter>(
        &self,
        model: &ServiceModel,
        kinds: &[ArtifactKind],
        delegates: &Delegates,
        writer: &W,
    ) -> Result<Vec<Artifact>> {
        let mut artifacts = self.render(model, kinds, delegates)?;

        if self.generation_type == GenerationType::ServerUpdate {
            let mut kept = Vec::with_capacity(artifacts.len());
            for artifact in artifacts {
                if artifact.kind.is_user_owned() && writer.exists(&artifact.path).await {
                    log::info!(
                        "Keeping existing {} artifact: {}",
                        artifact.kind,
                        artifact.path.display()
                    );
                } else {
                    kept.push(artifact);
                }
            }
            artifacts = kept;
        }

        let results = join_all(artifacts.iter().map(|artifact| writer.persist(artifact))).await;
        let mut failures = Vec::new();
        for (artifact, result) in artifacts.iter().zip(results) {
            match result {
                Ok(path) => log::info!("Generated {} artifact: {}", artifact.kind, path.display()),
                Err(e) => {
                    log::error!("Failed to persist {} artifact: {}", artifact.kind, e);
                    failures.push(e);
                }
            }
        }

        match Error::from_failures(failures) {
            Some(e) => Err(e),
            None => Ok(artifacts),
        }
    }

    fn render_kind(
        &self,
        operations: &[(&str, &OperationDescription)],
        kind: ArtifactKind,
        delegate: &Delegate,
        ctx: &RenderContext<'_>,
        plan: &ShapePlan,
        ledgers: &mut Ledgers,
    ) -> Result<Artifact> {
        log::info!("Rendering {} artifact ({} operations)", kind, operations.len());
        let path = kind.destination(&self.base_name);

        let mut builder = FileBuilder::new();
        builder.append(&self.render_header(kind, &path, delegate, ctx)?);
        if let Some(prologue) = delegate.prologue(ctx)? {
            builder.append_block(&prologue);
        }

        for &(name, description) in operations {
            let input = plan.get(name, ShapeDirection::Input);
            let output = plan.get(name, ShapeDirection::Output);
            let view = match kind.namespace() {
                Some(namespace) => {
                    let ledger = ledgers.entry(namespace).or_default();
                    OperationView {
                        name,
                        description,
                        input: match input {
                            Some(planned) if delegate.wants_input() => Some(bind(ledger, name, planned)?),
                            _ => None,
                        },
                        output: match output {
                            Some(planned) if delegate.wants_output() => Some(bind(ledger, name, planned)?),
                            _ => None,
                        },
                    }
                }
                None => OperationView {
                    name,
                    description,
                    input: plan.reference(name, ShapeDirection::Input),
                    output: plan.reference(name, ShapeDirection::Output),
                },
            };
            builder.append_block(&delegate.render_operation(ctx, &view)?);
        }

        if let Some(epilogue) = delegate.epilogue(ctx) {
            builder.append_line(&epilogue);
        }
        Ok(builder.finish(kind, path))
    }

    fn render_header(
        &self,
        kind: ArtifactKind,
        path: &Path,
        delegate: &Delegate,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        let imports: BTreeSet<String> = delegate.imports(ctx).into_iter().collect();
        let header = HeaderContext {
            file_header: self.file_header.as_deref(),
            base_name: &self.base_name,
            kind,
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            module_name: to_snake_case(&self.base_name),
            imports: imports.into_iter().collect(),
        };
        self.templates.render_header(&header)
    }
}

/// Operations in ascending lexical order of name.
///
/// Two names may not produce the same generated function or type name.
fn sorted_operations(model: &ServiceModel) -> Result<Vec<(&str, &OperationDescription)>> {
    let mut operations: Vec<(&str, &OperationDescription)> = model
        .operations
        .iter()
        .map(|(name, description)| (name.as_str(), description))
        .collect();
    operations.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let mut fn_names: HashMap<String, &str> = HashMap::new();
    let mut type_names: HashMap<String, &str> = HashMap::new();
    for &(name, _) in &operations {
        for (symbol, seen) in [
            (to_snake_case(name), &mut fn_names),
            (to_upper_camel_case(name), &mut type_names),
        ] {
            if let Some(existing) = seen.insert(symbol.clone(), name) {
                return Err(Error::NamingCollision {
                    name: symbol,
                    existing_operation: existing.to_string(),
                    operation: name.to_string(),
                });
            }
        }
    }
    Ok(operations)
}

/// Declared errors become enum variants: within the run, one variant name
/// stands for one error identifier, and never for a built-in client variant.
fn check_error_variants(operations: &[(&str, &OperationDescription)]) -> Result<()> {
    // Variant -> (identifier, owner); built-ins have no identifier
    let mut seen: HashMap<String, (Option<&str>, &str)> = BUILTIN_ERROR_VARIANTS
        .iter()
        .map(|variant| (variant.to_string(), (None, ArtifactKind::Client.as_str())))
        .collect();

    for &(name, description) in operations {
        let mut in_operation = HashSet::new();
        for error in &description.errors {
            let variant = to_upper_camel_case(error);
            let existing = seen.get(&variant).copied();
            let collision = match existing {
                Some((identifier, owner)) if identifier != Some(error.as_str()) => Some(owner),
                Some(_) if !in_operation.insert(variant.clone()) => Some(name),
                Some(_) => None,
                None => {
                    in_operation.insert(variant.clone());
                    seen.insert(variant.clone(), (Some(error.as_str()), name));
                    None
                }
            };
            if let Some(owner) = collision {
                return Err(Error::NamingCollision {
                    name: variant,
                    existing_operation: owner.to_string(),
                    operation: name.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Let the ledger decide whether this operation defines its planned shape.
fn bind(ledger: &mut EmissionLedger, operation: &str, planned: &PlannedShape) -> Result<ShapeBinding> {
    let descriptor = &planned.descriptor;
    match ledger.should_emit(descriptor.identity(), &planned.type_name, operation)? {
        EmitDecision::Emit => {
            log::debug!(
                "Emitting {} for {} ({})",
                planned.type_name,
                operation,
                descriptor.identity()
            );
            Ok(ShapeBinding::define(&planned.type_name, descriptor.clone()))
        }
        EmitDecision::Skip {
            origin_operation,
            type_name,
        } => {
            log::debug!(
                "Skipping {} for {}: already emitted as {} by {}",
                descriptor.type_name(),
                operation,
                type_name,
                origin_operation
            );
            Ok(ShapeBinding::reference(type_name))
        }
    }
}
