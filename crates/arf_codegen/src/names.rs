//! Canonical identifiers for nested declarations.
//!
//! A struct `Leaf` nested in `Inner` nested in `Outer` gets the flat name `OuterInnerLeaf`
//! (used as the type name in generated code) and the path `pkg/outer/inner/leaf` (used as
//! the registry key at runtime). Both only depend on the ownership chain, so they stay
//! stable across regenerations.

use arf_ast::{DeclId, Schema};

use crate::{
    dialect::Dialect,
    error::{CodegenError, Result},
};

/// Names of `id` and all its enclosing declarations, outermost first.
///
/// A chain longer than the arena can only come from a parent cycle and fails with
/// [`CodegenError::CyclicDeclaration`].
pub fn ancestry(schema: &Schema, id: DeclId) -> Result<Vec<&str>> {
    let mut names = Vec::new();
    let mut next = Some(id);

    while let Some(current) = next {
        if names.len() >= schema.declarations.len() {
            return Err(CodegenError::CyclicDeclaration(id));
        }
        let decl = schema
            .get(current)
            .ok_or(CodegenError::UnknownDeclaration(current))?;
        names.push(decl.name.as_str());
        next = decl.parent;
    }

    names.reverse();
    Ok(names)
}

pub fn canonical_name(schema: &Schema, dialect: &dyn Dialect, id: DeclId) -> Result<String> {
    let segments: Vec<String> = ancestry(schema, id)?
        .into_iter()
        .map(|name| dialect.type_segment(name))
        .collect();

    Ok(segments.join(dialect.type_separator()))
}

pub fn canonical_path(
    schema: &Schema,
    dialect: &dyn Dialect,
    package: &str,
    id: DeclId,
) -> Result<String> {
    let mut path = package.to_string();
    for name in ancestry(schema, id)? {
        path.push('/');
        path.push_str(&dialect.path_segment(name));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use arf_ast::{EnumMember, SchemaBuilder};

    use super::*;

    struct Plain;

    impl Dialect for Plain {
        fn timestamp(&self) -> String {
            "timestamp".into()
        }

        fn bytes(&self) -> String {
            "bytes".into()
        }

        fn optional(&self, inner: String) -> String {
            inner
        }

        fn array(&self, element: String) -> String {
            element
        }

        fn map(&self, key: String, value: String) -> String {
            format!("{key}{value}")
        }

        fn pointer(&self, inner: String) -> String {
            inner
        }
    }

    struct Scoped;

    impl Dialect for Scoped {
        fn timestamp(&self) -> String {
            "Time".into()
        }

        fn bytes(&self) -> String {
            "String".into()
        }

        fn optional(&self, inner: String) -> String {
            inner
        }

        fn array(&self, element: String) -> String {
            element
        }

        fn map(&self, key: String, value: String) -> String {
            format!("{key}{value}")
        }

        fn pointer(&self, inner: String) -> String {
            inner
        }

        fn type_separator(&self) -> &str {
            "::"
        }
    }

    #[test]
    fn outer_inner_leaf() {
        let mut builder = SchemaBuilder::new();
        let pkg = builder.package("pkg");
        let outer = builder.add_struct(pkg, "Outer");
        let inner = builder.add_struct_in(outer, "Inner");
        let leaf = builder.add_struct_in(inner, "Leaf");
        let schema = builder.build();

        assert_eq!(canonical_name(&schema, &Plain, leaf).unwrap(), "OuterInnerLeaf");
        assert_eq!(
            canonical_path(&schema, &Plain, "pkg", leaf).unwrap(),
            "pkg/outer/inner/leaf"
        );
        assert_eq!(
            canonical_name(&schema, &Scoped, leaf).unwrap(),
            "Outer::Inner::Leaf"
        );
    }

    #[test]
    fn every_depth_concatenates_the_whole_chain() {
        let names = ["user_profile", "addressBook", "Entry", "phone-kind", "x"];
        let expected = ["UserProfile", "AddressBook", "Entry", "PhoneKind", "X"];
        let slugs = ["user_profile", "address_book", "entry", "phone_kind", "x"];

        for depth in 0..names.len() {
            let mut builder = SchemaBuilder::new();
            let pkg = builder.package("org.example");
            let mut id = builder.add_struct(pkg, names[0]);
            for name in &names[1..=depth] {
                id = builder.add_struct_in(id, *name);
            }
            let schema = builder.build();

            assert_eq!(
                canonical_name(&schema, &Plain, id).unwrap(),
                expected[..=depth].concat()
            );
            assert_eq!(
                canonical_path(&schema, &Plain, "org.example", id).unwrap(),
                format!("org.example/{}", slugs[..=depth].join("/"))
            );
        }
    }

    #[test]
    fn enums_use_the_same_chain() {
        let mut builder = SchemaBuilder::new();
        let pkg = builder.package("pkg");
        let outer = builder.add_struct(pkg, "order");
        let status = builder.add_enum_in(outer, "status", vec![EnumMember::new("open", 0)]);
        let schema = builder.build();

        assert_eq!(canonical_name(&schema, &Plain, status).unwrap(), "OrderStatus");
        assert_eq!(
            canonical_path(&schema, &Plain, "pkg", status).unwrap(),
            "pkg/order/status"
        );
    }

    #[test]
    fn dangling_parent_is_reported() {
        let mut builder = SchemaBuilder::new();
        let pkg = builder.package("pkg");
        let outer = builder.add_struct(pkg, "Outer");
        let mut schema = builder.build();
        schema.declarations[outer.index()].parent = Some(DeclId(42));

        assert_eq!(
            canonical_name(&schema, &Plain, outer),
            Err(CodegenError::UnknownDeclaration(DeclId(42)))
        );
    }

    #[test]
    fn parent_cycles_are_reported() {
        let mut builder = SchemaBuilder::new();
        let pkg = builder.package("pkg");
        let outer = builder.add_struct(pkg, "Outer");
        let inner = builder.add_struct_in(outer, "Inner");
        let mut schema = builder.build();

        schema.declarations[outer.index()].parent = Some(outer);
        assert_eq!(
            canonical_name(&schema, &Plain, outer),
            Err(CodegenError::CyclicDeclaration(outer))
        );

        schema.declarations[outer.index()].parent = Some(inner);
        assert_eq!(
            canonical_path(&schema, &Plain, "pkg", inner),
            Err(CodegenError::CyclicDeclaration(inner))
        );
    }
}
