//! Up-front resolution and naming of every shape a run refers to.
//!
//! Before any artifact is rendered, the driver resolves the input and the
//! output of every operation and settles the name each structure is emitted
//! under: inputs first, then outputs, operations in ascending name order,
//! against a ledger already holding the generator's own type names. The
//! outcome does not depend on which artifact kinds are requested, so every
//! artifact of a run, whatever its siblings, refers to a structure by the
//! same name, and a collision or dangling reference fails every run alike.

use std::collections::BTreeMap;

use crate::delegates::{ShapeBinding, ShapeDirection};
use crate::error::Result;
use crate::ledger::{EmissionLedger, EmitDecision};
use crate::model::{OperationDescription, ServiceModel};
use crate::shape::ShapeDescriptor;

/// A resolved operation shape and the name it is emitted under.
#[derive(Debug, Clone)]
pub struct PlannedShape {
    pub descriptor: ShapeDescriptor,
    pub type_name: String,
}

#[derive(Debug, Default)]
pub struct ShapePlan {
    shapes: BTreeMap<(String, ShapeDirection), PlannedShape>,
}

impl ShapePlan {
    /// Resolve and name the shapes of `operations`, given in ascending name
    /// order, after claiming the `reserved` `(name, owner)` pairs.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ModelResolution`](crate::Error::ModelResolution)
    /// on the first dangling shape reference and with
    /// [`Error::NamingCollision`](crate::Error::NamingCollision) when two
    /// different structures, or a structure and a reserved name, would share
    /// a name.
    pub fn build(
        model: &ServiceModel,
        operations: &[(&str, &OperationDescription)],
        reserved: &[(String, String)],
    ) -> Result<Self> {
        let mut ledger = EmissionLedger::new();
        for (name, owner) in reserved {
            ledger.reserve(name, owner)?;
        }

        log::debug!("Planning shape type names for {} operations", operations.len());
        let mut plan = Self::default();
        for direction in [ShapeDirection::Input, ShapeDirection::Output] {
            for &(name, description) in operations {
                let shape = match direction {
                    ShapeDirection::Input => description.input.as_deref(),
                    ShapeDirection::Output => description.output.as_deref(),
                };
                let Some(shape) = shape else {
                    continue;
                };

                let descriptor = model.resolve_shape(name, shape)?;
                let type_name = match ledger.should_emit(
                    descriptor.identity(),
                    descriptor.type_name(),
                    name,
                )? {
                    EmitDecision::Emit => descriptor.type_name().to_string(),
                    EmitDecision::Skip { type_name, .. } => type_name,
                };
                plan.shapes.insert(
                    (name.to_string(), direction),
                    PlannedShape {
                        descriptor,
                        type_name,
                    },
                );
            }
        }
        Ok(plan)
    }

    pub fn get(&self, operation: &str, direction: ShapeDirection) -> Option<&PlannedShape> {
        self.shapes.get(&(operation.to_string(), direction))
    }

    /// Binding referring to the operation's shape by its settled name.
    pub fn reference(&self, operation: &str, direction: ShapeDirection) -> Option<ShapeBinding> {
        self.get(operation, direction)
            .map(|planned| ShapeBinding::reference(planned.type_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{FieldDescriptor, FieldLocation, ShapeDescription};

    fn shape(fields: &[(&str, FieldLocation)]) -> ShapeDescription {
        ShapeDescription {
            fields: fields
                .iter()
                .map(|(name, location)| FieldDescriptor::new(*name, *location, "String"))
                .collect(),
        }
    }

    fn operation(input: Option<&str>, output: Option<&str>) -> OperationDescription {
        OperationDescription {
            input: input.map(str::to_string),
            output: output.map(str::to_string),
            ..Default::default()
        }
    }

    fn build(model: &ServiceModel, reserved: &[(String, String)]) -> Result<ShapePlan> {
        let mut operations: Vec<_> = model
            .operations
            .iter()
            .map(|(name, description)| (name.as_str(), description))
            .collect();
        operations.sort_unstable_by(|a, b| a.0.cmp(b.0));
        ShapePlan::build(model, &operations, reserved)
    }

    #[test]
    fn test_inputs_are_named_before_outputs() -> Result<()> {
        let mut model = ServiceModel::default();
        model.shapes.insert("AaaOutput".into(), shape(&[("id", FieldLocation::Path)]));
        model.shapes.insert("UserIdInput".into(), shape(&[("id", FieldLocation::Path)]));
        model.operations.insert("Aaa".into(), operation(None, Some("AaaOutput")));
        model.operations.insert("GetUser".into(), operation(Some("UserIdInput"), None));

        let plan = build(&model, &[])?;
        let output = plan.get("Aaa", ShapeDirection::Output).map(|p| p.type_name.as_str());
        assert_eq!(output, Some("UserIdInput"));
        assert_eq!(
            plan.reference("GetUser", ShapeDirection::Input),
            Some(ShapeBinding::reference("UserIdInput"))
        );
        assert!(plan.get("GetUser", ShapeDirection::Output).is_none());
        Ok(())
    }

    #[test]
    fn test_collision_between_input_and_output() {
        let mut model = ServiceModel::default();
        model.shapes.insert("user_id".into(), shape(&[("id", FieldLocation::Path)]));
        model.shapes.insert("UserId".into(), shape(&[("name", FieldLocation::Body)]));
        model.operations.insert("GetUser".into(), operation(Some("user_id"), Some("UserId")));

        let err = build(&model, &[]).unwrap_err();
        assert!(matches!(err, Error::NamingCollision { ref name, .. } if name == "UserId"));
    }

    #[test]
    fn test_outputs_are_resolved_too() {
        let mut model = ServiceModel::default();
        model.operations.insert("Zed".into(), operation(None, Some("Missing")));

        let err = build(&model, &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::ModelResolution { ref operation, ref shape } if operation == "Zed" && shape == "Missing"
        ));
    }

    #[test]
    fn test_reserved_names_are_claimed_first() {
        let mut model = ServiceModel::default();
        model.shapes.insert("ValidationError".into(), shape(&[("id", FieldLocation::Path)]));
        model.operations.insert("Alpha".into(), operation(Some("ValidationError"), None));

        let reserved = [("ValidationError".to_string(), "http_input".to_string())];
        let err = build(&model, &reserved).unwrap_err();
        assert!(matches!(
            err,
            Error::NamingCollision { ref existing_operation, ref operation, .. }
                if existing_operation == "http_input" && operation == "Alpha"
        ));
    }
}
