use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::{
    service::{MethodParam, MethodReturn, ServiceBody, ServiceMethod},
    structure::{EnumBody, EnumMember, Field, StructBody},
    types::{Type, TypeRef},
};

mod service;
mod structure;
mod types;

/// Index of a declaration inside its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub usize);

impl DeclId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a package inside its [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    /// Enclosing struct, if any. Only meant for walking the name chain upwards.
    #[serde(default)]
    pub parent: Option<DeclId>,
    pub package: String,
    #[serde(default)]
    pub comments: Vec<String>,
    /// Message of a `deprecated` annotation.
    #[serde(default)]
    pub deprecated: Option<String>,
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Struct(StructBody),
    Enum(EnumBody),
    Service(ServiceBody),
}

impl DeclarationKind {
    pub fn describe(&self) -> &'static str {
        match self {
            DeclarationKind::Struct(_) => "struct",
            DeclarationKind::Enum(_) => "enum",
            DeclarationKind::Service(_) => "service",
        }
    }
}

impl Declaration {
    pub fn as_struct(&self) -> Option<&StructBody> {
        match &self.kind {
            DeclarationKind::Struct(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumBody> {
        match &self.kind {
            DeclarationKind::Enum(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceBody> {
        match &self.kind {
            DeclarationKind::Service(body) => Some(body),
            _ => None,
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, DeclarationKind::Struct(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Dotted package name, e.g. `org.example.users`.
    pub name: String,
    #[serde(default)]
    pub structs: Vec<DeclId>,
    #[serde(default)]
    pub enums: Vec<DeclId>,
    #[serde(default)]
    pub services: Vec<DeclId>,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            structs: Vec::new(),
            enums: Vec::new(),
            services: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Last segment of the dotted name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Arena holding every resolved declaration of a compilation, grouped by package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub declarations: Vec<Declaration>,
    pub packages: Vec<Package>,
}

impl Schema {
    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.0)
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|package| package.name == name)
    }

    /// Iterates from `id` up to its outermost enclosing declaration.
    ///
    /// Stops early when a parent id is not part of the arena, and after at most one step
    /// per declaration when the parent links form a cycle.
    pub fn parents(&self, id: DeclId) -> impl Iterator<Item = (DeclId, &Declaration)> + '_ {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let current = next?;
            let decl = self.get(current)?;
            next = decl.parent;
            Some((current, decl))
        })
        .take(self.declarations.len())
    }
}

/// Incremental construction of a [`Schema`].
///
/// Ids are handed out before bodies are complete so that fields can reference their own
/// struct or declarations added later.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(&mut self, name: impl Into<String>) -> PackageId {
        self.schema.packages.push(Package::new(name));
        PackageId(self.schema.packages.len() - 1)
    }

    pub fn add_struct(&mut self, package: PackageId, name: impl Into<String>) -> DeclId {
        let id = self.push(package, None, name.into(), DeclarationKind::Struct(StructBody::default()));
        self.schema.packages[package.0].structs.push(id);
        id
    }

    pub fn add_enum(
        &mut self,
        package: PackageId,
        name: impl Into<String>,
        members: Vec<EnumMember>,
    ) -> DeclId {
        let id = self.push(package, None, name.into(), DeclarationKind::Enum(EnumBody { members }));
        self.schema.packages[package.0].enums.push(id);
        id
    }

    pub fn add_service(
        &mut self,
        package: PackageId,
        name: impl Into<String>,
        methods: Vec<ServiceMethod>,
    ) -> DeclId {
        let id = self.push(
            package,
            None,
            name.into(),
            DeclarationKind::Service(ServiceBody { methods }),
        );
        self.schema.packages[package.0].services.push(id);
        id
    }

    /// Adds a struct nested inside `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a struct of this builder.
    pub fn add_struct_in(&mut self, parent: DeclId, name: impl Into<String>) -> DeclId {
        let package = self.package_of(parent);
        let id = self.push(
            package,
            Some(parent),
            name.into(),
            DeclarationKind::Struct(StructBody::default()),
        );
        self.struct_body(parent).structs.push(id);
        id
    }

    /// Adds an enum nested inside `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a struct of this builder.
    pub fn add_enum_in(
        &mut self,
        parent: DeclId,
        name: impl Into<String>,
        members: Vec<EnumMember>,
    ) -> DeclId {
        let package = self.package_of(parent);
        let id = self.push(
            package,
            Some(parent),
            name.into(),
            DeclarationKind::Enum(EnumBody { members }),
        );
        self.struct_body(parent).enums.push(id);
        id
    }

    /// # Panics
    ///
    /// Panics if `owner` is not a struct of this builder.
    pub fn add_field(&mut self, owner: DeclId, field: Field) -> &mut Self {
        self.struct_body(owner).fields.push(field);
        self
    }

    pub fn comment(&mut self, id: DeclId, line: impl Into<String>) -> &mut Self {
        if let Some(decl) = self.schema.declarations.get_mut(id.0) {
            decl.comments.push(line.into());
        }
        self
    }

    pub fn deprecate(&mut self, id: DeclId, message: impl Into<String>) -> &mut Self {
        if let Some(decl) = self.schema.declarations.get_mut(id.0) {
            decl.deprecated = Some(message.into());
        }
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }

    fn push(
        &mut self,
        package: PackageId,
        parent: Option<DeclId>,
        name: String,
        kind: DeclarationKind,
    ) -> DeclId {
        let package = self.schema.packages[package.0].name.clone();
        self.schema.declarations.push(Declaration {
            name,
            parent,
            package,
            comments: Vec::new(),
            deprecated: None,
            kind,
        });
        DeclId(self.schema.declarations.len() - 1)
    }

    fn package_of(&self, id: DeclId) -> PackageId {
        let name = &self.schema.declarations[id.0].package;
        let index = self
            .schema
            .packages
            .iter()
            .position(|package| &package.name == name)
            .expect("declaration belongs to a package of this builder");
        PackageId(index)
    }

    fn struct_body(&mut self, id: DeclId) -> &mut StructBody {
        match &mut self.schema.declarations[id.0].kind {
            DeclarationKind::Struct(body) => body,
            other => panic!("expected a struct, got {}", other.describe()),
        }
    }
}
