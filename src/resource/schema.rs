//! Resource Schema
//!
//! Static description of each resource kind: which fields exist, who may set
//! them and what a change to them implies. The host engine reads these to
//! know which attributes are required, computed, or force a replacement.

use serde::Serialize;

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
}

/// One attribute of a resource kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: FieldType,
    /// Caller must supply a value
    pub required: bool,
    /// Caller may supply a value
    pub optional: bool,
    /// Value may be filled in without the caller (server or generated)
    pub computed: bool,
    /// Changing the value replaces the resource instead of updating it
    pub force_new: bool,
    /// Field carries the server-issued identifier
    pub identifier: bool,
}

impl FieldDef {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::String,
            required: true,
            optional: false,
            computed: false,
            force_new: false,
            identifier: false,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::String,
            required: false,
            optional: true,
            computed: false,
            force_new: false,
            identifier: false,
        }
    }

    /// Server-issued identifier: computed only, never caller-supplied
    pub const fn identifier(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::String,
            required: false,
            optional: false,
            computed: true,
            force_new: false,
            identifier: true,
        }
    }

    /// Read-only attribute mirrored from the server
    pub const fn mirrored(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::String,
            required: false,
            optional: false,
            computed: true,
            force_new: false,
            identifier: false,
        }
    }

    pub const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub const fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Whether a caller may place a value in desired state
    pub fn caller_settable(&self) -> bool {
        self.required || self.optional
    }
}

/// Field set of one resource kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDef {
    pub name: &'static str,
    /// Collection path segment on the remote service
    pub collection: &'static str,
    pub fields: Vec<FieldDef>,
}

/// Schema definition that breaks a structural rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("resource '{0}' must have exactly one identifier field, found {1}")]
    IdentifierCount(&'static str, usize),
    #[error(
        "identifier '{field}' of resource '{resource}' must be computed and not caller-settable"
    )]
    CallerSuppliedIdentifier {
        resource: &'static str,
        field: &'static str,
    },
    #[error("field '{field}' of resource '{resource}' cannot be both required and optional")]
    Conflicting {
        resource: &'static str,
        field: &'static str,
    },
}

impl ResourceDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn identifier(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.identifier)
    }

    /// Check the structural rules every kind must obey
    pub fn validate(&self) -> Result<(), SchemaError> {
        let identifiers: Vec<&FieldDef> = self.fields.iter().filter(|f| f.identifier).collect();
        if identifiers.len() != 1 {
            return Err(SchemaError::IdentifierCount(self.name, identifiers.len()));
        }

        let id = identifiers[0];
        if !id.computed || id.caller_settable() {
            return Err(SchemaError::CallerSuppliedIdentifier {
                resource: self.name,
                field: id.name,
            });
        }

        if let Some(field) = self.fields.iter().find(|f| f.required && f.optional) {
            return Err(SchemaError::Conflicting {
                resource: self.name,
                field: field.name,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(fields: Vec<FieldDef>) -> ResourceDef {
        ResourceDef {
            name: "thing",
            collection: "things",
            fields,
        }
    }

    #[test]
    fn test_valid_definition() {
        let d = def(vec![FieldDef::identifier("id"), FieldDef::required("value")]);
        assert!(d.validate().is_ok());
        assert_eq!(d.identifier().map(|f| f.name), Some("id"));
        assert!(d.field("value").unwrap().required);
        assert!(d.field("missing").is_none());
    }

    #[test]
    fn test_missing_identifier_rejected() {
        let d = def(vec![FieldDef::required("value")]);
        assert_eq!(d.validate(), Err(SchemaError::IdentifierCount("thing", 0)));
    }

    #[test]
    fn test_two_identifiers_rejected() {
        let d = def(vec![FieldDef::identifier("id"), FieldDef::identifier("other")]);
        assert_eq!(d.validate(), Err(SchemaError::IdentifierCount("thing", 2)));
    }

    #[test]
    fn test_caller_supplied_identifier_rejected() {
        let mut id = FieldDef::identifier("id");
        id.optional = true;
        let d = def(vec![id]);
        assert!(matches!(
            d.validate(),
            Err(SchemaError::CallerSuppliedIdentifier { field: "id", .. })
        ));
    }

    #[test]
    fn test_required_and_optional_conflict() {
        let mut title = FieldDef::required("title");
        title.optional = true;
        let d = def(vec![FieldDef::identifier("id"), title]);
        assert!(matches!(
            d.validate(),
            Err(SchemaError::Conflicting { field: "title", .. })
        ));
    }

    #[test]
    fn test_builder_flags() {
        let title = FieldDef::optional("title").computed().force_new();
        assert!(title.optional && title.computed && title.force_new);
        assert!(title.caller_settable());
        assert!(!FieldDef::mirrored("book_id").caller_settable());
    }
}
