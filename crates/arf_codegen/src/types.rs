//! Conversion of resolved IDL types into target type expressions.

use arf_ast::{DeclId, Declaration, DeclarationKind, Schema, Type, TypeRef};

use crate::{
    dialect::{Dialect, NoQualifier, Qualifier},
    error::{CodegenError, Result},
    names,
};

static NO_QUALIFIER: NoQualifier = NoQualifier;

/// Converts types for one dialect, resolving user references against `schema`.
#[derive(Clone, Copy)]
pub struct TypeMapper<'a> {
    schema: &'a Schema,
    dialect: &'a dyn Dialect,
    qualifier: &'a dyn Qualifier,
}

impl<'a> TypeMapper<'a> {
    /// A mapper that never prefixes cross-package references.
    pub fn new(schema: &'a Schema, dialect: &'a dyn Dialect) -> Self {
        Self {
            schema,
            dialect,
            qualifier: &NO_QUALIFIER,
        }
    }

    pub fn with_qualifier(self, qualifier: &'a dyn Qualifier) -> Self {
        Self { qualifier, ..self }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn convert(&self, ty: &Type) -> Result<String> {
        let converted = match ty {
            Type::Primitive(name) => match name.as_str() {
                "timestamp" => self.dialect.timestamp(),
                "bytes" => self.dialect.bytes(),
                other => self.dialect.scalar(other),
            },
            Type::Optional(inner) => self.dialect.optional(self.convert(inner)?),
            Type::Array(element) => self.dialect.array(self.convert(element)?),
            Type::Map(key, value) => self
                .dialect
                .map(self.convert(key)?, self.convert(value)?),
            Type::UserRef(reference) => {
                let (id, _) = self.resolve(reference)?;
                self.dialect.user(self.canonical_name(id)?)
            }
            Type::QualifiedUserRef {
                reference,
                origin_package,
            } => {
                let (id, decl) = self.resolve(reference)?;
                let prefix = self.qualifier.resolve(&decl.name, origin_package);
                self.dialect.user(prefix + &self.canonical_name(id)?)
            }
        };

        Ok(converted)
    }

    /// Like [`TypeMapper::convert`], but structs are wrapped in the dialect's reference
    /// marker. Enums and everything else stay by value.
    pub fn maybe_pointer(&self, ty: &Type) -> Result<String> {
        let converted = self.convert(ty)?;
        if self.is_struct(ty)? {
            Ok(self.dialect.pointer(converted))
        } else {
            Ok(converted)
        }
    }

    pub fn is_struct(&self, ty: &Type) -> Result<bool> {
        match ty.reference() {
            Some(reference) => Ok(self.resolve(reference)?.1.is_struct()),
            None => Ok(false),
        }
    }

    pub fn canonical_name(&self, id: DeclId) -> Result<String> {
        names::canonical_name(self.schema, self.dialect, id)
    }

    pub fn canonical_path(&self, package: &str, id: DeclId) -> Result<String> {
        names::canonical_path(self.schema, self.dialect, package, id)
    }

    /// Finds the struct or enum a reference was bound to.
    pub fn resolve(&self, reference: &TypeRef) -> Result<(DeclId, &'a Declaration)> {
        let unresolved = || CodegenError::UnresolvedTypeReference {
            name: reference.name.clone(),
        };

        let id = reference.resolved.ok_or_else(unresolved)?;
        let decl = self.schema.get(id).ok_or_else(unresolved)?;

        match &decl.kind {
            DeclarationKind::Struct(_) | DeclarationKind::Enum(_) => Ok((id, decl)),
            kind => Err(CodegenError::UnsupportedTypeKind {
                name: reference.name.clone(),
                kind: kind.describe(),
            }),
        }
    }
}
