use serde::{Deserialize, Serialize};

use super::DeclId;

/// A type expression as written in a field, parameter or return position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Primitive(String),
    Optional(Box<Type>),
    Array(Box<Type>),
    Map(Box<Type>, Box<Type>),
    UserRef(TypeRef),
    /// A reference to a declaration living in another package.
    QualifiedUserRef {
        reference: TypeRef,
        origin_package: String,
    },
}

/// A name together with the declaration the resolver bound it to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default)]
    pub resolved: Option<DeclId>,
}

impl Type {
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::Primitive(name.into())
    }

    pub fn optional(inner: Type) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn array(element: Type) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    pub fn user(name: impl Into<String>, resolved: DeclId) -> Self {
        Self::UserRef(TypeRef {
            name: name.into(),
            resolved: Some(resolved),
        })
    }

    pub fn qualified(
        name: impl Into<String>,
        resolved: DeclId,
        origin_package: impl Into<String>,
    ) -> Self {
        Self::QualifiedUserRef {
            reference: TypeRef {
                name: name.into(),
                resolved: Some(resolved),
            },
            origin_package: origin_package.into(),
        }
    }

    /// The user reference carried by this type, if it is one.
    pub fn reference(&self) -> Option<&TypeRef> {
        match self {
            Type::UserRef(reference) | Type::QualifiedUserRef { reference, .. } => Some(reference),
            _ => None,
        }
    }
}

impl From<&str> for Type {
    fn from(value: &str) -> Self {
        Type::primitive(value)
    }
}
