//! Run-scoped record of emitted type definitions.
//!
//! The driver owns its ledgers for the duration of a run and passes them
//! explicitly; nothing here is global. A structural identity is defined at
//! most once per ledger, and an emitted name is never reused for a different
//! identity or for a symbol the generator [reserved](EmissionLedger::reserve).

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::shape::StructuralIdentity;

/// Outcome of consulting the ledger for one shape reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitDecision {
    /// First sight: the caller defines the type.
    Emit,
    /// Already defined; reference `type_name` instead of redefining it.
    Skip {
        origin_operation: String,
        type_name: String,
    },
}

#[derive(Debug, Clone)]
struct LedgerEntry {
    type_name: String,
    operation: String,
}

#[derive(Debug, Default)]
pub struct EmissionLedger {
    by_identity: HashMap<StructuralIdentity, LedgerEntry>,
    /// Every taken name and the operation or artifact owning it
    by_name: HashMap<String, String>,
}

impl EmissionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for a symbol the generator emits itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NamingCollision`] when `name` is already taken.
    pub fn reserve(&mut self, name: &str, owner: &str) -> Result<()> {
        if let Some(existing) = self.by_name.get(name) {
            return Err(Error::NamingCollision {
                name: name.to_string(),
                existing_operation: existing.clone(),
                operation: owner.to_string(),
            });
        }
        self.by_name.insert(name.to_string(), owner.to_string());
        Ok(())
    }

    /// Decide whether `operation` should emit a definition for `identity`
    /// under `type_name`, recording it on first sight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NamingCollision`] when `type_name` was already emitted
    /// for a structurally different shape or is reserved.
    pub fn should_emit(
        &mut self,
        identity: &StructuralIdentity,
        type_name: &str,
        operation: &str,
    ) -> Result<EmitDecision> {
        if let Some(entry) = self.by_identity.get(identity) {
            return Ok(EmitDecision::Skip {
                origin_operation: entry.operation.clone(),
                type_name: entry.type_name.clone(),
            });
        }

        if let Some(existing) = self.by_name.get(type_name) {
            return Err(Error::NamingCollision {
                name: type_name.to_string(),
                existing_operation: existing.clone(),
                operation: operation.to_string(),
            });
        }

        self.by_name
            .insert(type_name.to_string(), operation.to_string());
        self.by_identity.insert(
            identity.clone(),
            LedgerEntry {
                type_name: type_name.to_string(),
                operation: operation.to_string(),
            },
        );
        Ok(EmitDecision::Emit)
    }

    /// Operation that first emitted `identity`, if any.
    pub fn origin_of(&self, identity: &StructuralIdentity) -> Option<&str> {
        self.by_identity
            .get(identity)
            .map(|entry| entry.operation.as_str())
    }

    /// Name under which `identity` was emitted, if it was.
    pub fn type_name_of(&self, identity: &StructuralIdentity) -> Option<&str> {
        self.by_identity
            .get(identity)
            .map(|entry| entry.type_name.as_str())
    }

    /// Number of distinct definitions emitted so far.
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, FieldLocation};

    fn identity(fields: &[(&str, FieldLocation, &str)]) -> StructuralIdentity {
        let fields: Vec<_> = fields
            .iter()
            .map(|(name, location, ty)| FieldDescriptor::new(*name, *location, *ty))
            .collect();
        StructuralIdentity::of(&fields)
    }

    #[test]
    fn test_first_sight_emits_then_skips() -> Result<()> {
        let mut ledger = EmissionLedger::new();
        let id = identity(&[("id", FieldLocation::Path, "String")]);

        assert_eq!(ledger.should_emit(&id, "UserIdInput", "GetOrder")?, EmitDecision::Emit);
        assert_eq!(
            ledger.should_emit(&id, "UserIdInput", "GetUser")?,
            EmitDecision::Skip {
                origin_operation: "GetOrder".to_string(),
                type_name: "UserIdInput".to_string(),
            }
        );
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.origin_of(&id), Some("GetOrder"));
        assert_eq!(ledger.type_name_of(&id), Some("UserIdInput"));
        Ok(())
    }

    #[test]
    fn test_structural_match_reuses_first_name() -> Result<()> {
        let mut ledger = EmissionLedger::new();
        let id = identity(&[("id", FieldLocation::Path, "String")]);

        ledger.should_emit(&id, "UserIdInput", "GetOrder")?;
        let decision = ledger.should_emit(&id, "OrderKey", "GetUser")?;
        assert_eq!(
            decision,
            EmitDecision::Skip {
                origin_operation: "GetOrder".to_string(),
                type_name: "UserIdInput".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_name_collision_is_an_error() -> Result<()> {
        let mut ledger = EmissionLedger::new();
        let by_path = identity(&[("id", FieldLocation::Path, "String")]);
        let by_query = identity(&[("id", FieldLocation::Query, "String")]);

        ledger.should_emit(&by_path, "UserIdInput", "GetOrder")?;
        let err = ledger
            .should_emit(&by_query, "UserIdInput", "GetUser")
            .unwrap_err();
        match err {
            Error::NamingCollision {
                name,
                existing_operation,
                operation,
            } => {
                assert_eq!(name, "UserIdInput");
                assert_eq!(existing_operation, "GetOrder");
                assert_eq!(operation, "GetUser");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The failed attempt records nothing
        assert_eq!(ledger.len(), 1);
        assert!(ledger.origin_of(&by_query).is_none());
        Ok(())
    }

    #[test]
    fn test_reserved_names_are_never_emitted() -> Result<()> {
        let mut ledger = EmissionLedger::new();
        ledger.reserve("ValidationError", "http_input")?;
        ledger.reserve("GetUserHttpRequestInput", "GetUser")?;

        let id = identity(&[("id", FieldLocation::Path, "String")]);
        let err = ledger
            .should_emit(&id, "ValidationError", "Alpha")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NamingCollision { ref name, ref existing_operation, ref operation }
                if name == "ValidationError" && existing_operation == "http_input" && operation == "Alpha"
        ));
        assert!(ledger.is_empty());

        let err = ledger.reserve("ValidationError", "client").unwrap_err();
        assert!(matches!(err, Error::NamingCollision { .. }));
        Ok(())
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = EmissionLedger::new();
        assert!(ledger.is_empty());
    }
}
