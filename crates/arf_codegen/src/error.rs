use arf_ast::DeclId;

/// Failures raised while generating code.
///
/// Type and shape errors are local to one declaration; the generators record them and
/// move on to the next sibling. Option errors abort generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    #[error("type `{name}` refers to a {kind}, only structs and enums can be used as types")]
    UnsupportedTypeKind { name: String, kind: &'static str },

    #[error("type `{name}` was not resolved to a declaration")]
    UnresolvedTypeReference { name: String },

    #[error("indent level cannot go below zero")]
    InvalidIndentState,

    #[error("client view of method `{method}` does not mirror back to the server view")]
    NonInvolutiveClientTransform { method: String },

    #[error("method `{method}` declares more than one {direction} stream")]
    MultipleStreams {
        method: String,
        direction: StreamDirection,
    },

    #[error("declaration {0} is not part of the schema")]
    UnknownDeclaration(DeclId),

    #[error("declaration {0} is nested inside itself")]
    CyclicDeclaration(DeclId),

    #[error("packages `{first}` and `{second}` both map to Go package `{name}`")]
    DuplicateGoPackage {
        name: String,
        first: String,
        second: String,
    },

    #[error("unknown output language `{0}`: only 'go'/'golang' and 'ruby' are supported")]
    UnknownLanguage(String),

    #[error("invalid mapping `{0}`: expected the format some.package.name=value")]
    InvalidMapping(String),

    #[error("invalid module `{module}` for package `{package}`")]
    InvalidRubyModule { package: String, module: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamDirection {
    Input,
    Output,
}

impl std::fmt::Display for StreamDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamDirection::Input => f.write_str("input"),
            StreamDirection::Output => f.write_str("output"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodegenError>;
