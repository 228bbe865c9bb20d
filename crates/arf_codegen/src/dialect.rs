use heck::{ToSnakeCase, ToUpperCamelCase};

/// Literal tokens a target wraps around converted types and names.
///
/// The shape of generated signatures and the canonical naming scheme never depend on
/// the dialect; only the strings produced here do.
pub trait Dialect {
    /// Type used for the `timestamp` primitive.
    fn timestamp(&self) -> String;

    /// Type used for the `bytes` primitive.
    fn bytes(&self) -> String;

    /// Any other primitive. Names are assumed to be valid in the target already.
    fn scalar(&self, name: &str) -> String {
        name.to_string()
    }

    fn optional(&self, inner: String) -> String;

    fn array(&self, element: String) -> String;

    fn map(&self, key: String, value: String) -> String;

    /// Reference to a struct or enum, given its (possibly prefixed) canonical name.
    fn user(&self, name: String) -> String {
        name
    }

    /// Marks a struct as passed by reference.
    fn pointer(&self, inner: String) -> String;

    fn type_segment(&self, name: &str) -> String {
        name.to_upper_camel_case()
    }

    /// Joins the segments of a nested type name.
    fn type_separator(&self) -> &str {
        ""
    }

    fn path_segment(&self, name: &str) -> String {
        name.to_snake_case()
    }
}

/// Computes the namespace prefix for a type declared in another package.
pub trait Qualifier {
    /// Returns the prefix for `name` declared in `origin_package`, empty when none is
    /// needed.
    fn resolve(&self, name: &str, origin_package: &str) -> String;
}

/// Qualifier for single-package output: never adds a prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQualifier;

impl Qualifier for NoQualifier {
    fn resolve(&self, _name: &str, _origin_package: &str) -> String {
        String::new()
    }
}
