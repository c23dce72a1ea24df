//! Resolved shape descriptors and their structural identity.
//!
//! A [`ShapeDescriptor`] is what an operation's input or output resolves to:
//! the model's shape name, the type name it is emitted under, and its
//! wire-level fields. Deduplication never compares names; it compares the
//! [`StructuralIdentity`], a canonical signature over the set of
//! `(name, location, type)` triples that ignores field declaration order.

use std::fmt;

use crate::model::{FieldDescriptor, FieldLocation};
use crate::utils::to_upper_camel_case;

/// Canonical, order-independent signature of a shape's field set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuralIdentity(Vec<FieldDescriptor>);

impl StructuralIdentity {
    pub fn of(fields: &[FieldDescriptor]) -> Self {
        let mut fields = fields.to_vec();
        fields.sort();
        Self(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StructuralIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("{}");
        }
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}@{}:{}", field.name, field.location, field.target_type)?;
        }
        Ok(())
    }
}

/// A resolved operation input or output.
#[derive(Debug, Clone)]
pub struct ShapeDescriptor {
    shape_name: String,
    type_name: String,
    fields: Vec<FieldDescriptor>,
    identity: StructuralIdentity,
}

impl ShapeDescriptor {
    pub fn new(shape_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let shape_name = shape_name.into();
        let identity = StructuralIdentity::of(&fields);
        Self {
            type_name: to_upper_camel_case(&shape_name),
            shape_name,
            fields,
            identity,
        }
    }

    /// Name of the shape in the model
    pub fn shape_name(&self) -> &str {
        &self.shape_name
    }

    /// Name the shape is emitted under
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Fields in model declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn identity(&self) -> &StructuralIdentity {
        &self.identity
    }

    /// Fields bound to one location, in declaration order.
    pub fn fields_at(&self, location: FieldLocation) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(move |f| f.location == location)
    }
}

/// Descriptors are equal when they are structurally identical.
impl PartialEq for ShapeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for ShapeDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, location: FieldLocation, ty: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, location, ty)
    }

    #[test]
    fn test_identity_ignores_field_order() {
        let a = StructuralIdentity::of(&[
            field("id", FieldLocation::Path, "String"),
            field("limit", FieldLocation::Query, "i32"),
        ]);
        let b = StructuralIdentity::of(&[
            field("limit", FieldLocation::Query, "i32"),
            field("id", FieldLocation::Path, "String"),
        ]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_identity_distinguishes_location_and_type() {
        let path = StructuralIdentity::of(&[field("id", FieldLocation::Path, "String")]);
        let query = StructuralIdentity::of(&[field("id", FieldLocation::Query, "String")]);
        let number = StructuralIdentity::of(&[field("id", FieldLocation::Path, "i64")]);
        assert_ne!(path, query);
        assert_ne!(path, number);
    }

    #[test]
    fn test_identity_signature() {
        let identity = StructuralIdentity::of(&[
            field("name", FieldLocation::Body, "String"),
            field("id", FieldLocation::Path, "String"),
        ]);
        assert_eq!(identity.to_string(), "id@path:String,name@body:String");
        assert_eq!(StructuralIdentity::of(&[]).to_string(), "{}");
        assert!(StructuralIdentity::of(&[]).is_empty());
    }

    #[test]
    fn test_descriptor_equality_ignores_names() {
        let fields = vec![field("id", FieldLocation::Path, "String")];
        let a = ShapeDescriptor::new("UserIdInput", fields.clone());
        let b = ShapeDescriptor::new("OrderKey", fields);
        assert_eq!(a, b);
        assert_eq!(a.type_name(), "UserIdInput");
        assert_eq!(b.type_name(), "OrderKey");
    }

    #[test]
    fn test_type_name_follows_naming_convention() {
        let descriptor = ShapeDescriptor::new("user_id_input", Vec::new());
        assert_eq!(descriptor.shape_name(), "user_id_input");
        assert_eq!(descriptor.type_name(), "UserIdInput");
    }

    #[test]
    fn test_fields_at() {
        let descriptor = ShapeDescriptor::new(
            "Mixed",
            vec![
                field("id", FieldLocation::Path, "String"),
                field("token", FieldLocation::Header, "String"),
                field("owner", FieldLocation::Path, "String"),
            ],
        );
        let names: Vec<_> = descriptor
            .fields_at(FieldLocation::Path)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "owner"]);
    }
}
