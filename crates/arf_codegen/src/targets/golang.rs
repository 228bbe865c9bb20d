//! Go output: one `<name>.arf.go` file per package.
//!
//! Structs and enums become plain Go types. Each service produces a server interface
//! with one handler per method, a client interface, and the responder types the
//! handler and call signatures refer to. Imports are collected while the body is
//! rendered and prepended once it is complete.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
};

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use phf::phf_set;

use arf_ast::{DeclId, DeclarationKind, Package, Schema, Type};

use crate::{
    dialect::{Dialect, Qualifier},
    error::{CodegenError, Result},
    generator::{Diagnostics, Generated, GeneratedFile, Generator},
    method::{MethodDefinition, Param, Returns, Signature},
    options::GeneratorOptions,
    targets::{write_comment_lines, write_comments},
    types::TypeMapper,
    writer::IndentedWriter,
};

const HEADER: &str = "// Code generated by arfc. DO NOT EDIT.";
const RUNTIME_IMPORT: &str = "github.com/arf-rpc/arf-go";

static GO_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface",
    "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
};

/// Parameter names the signatures introduce themselves.
static SIGNATURE_NAMES: phf::Set<&'static str> = phf_set! {
    "ctx", "inStream", "outStream", "inOutStream", "responder",
};

/// Packages every generated file may import under their own name.
const FIXED_IMPORTS: [&str; 3] = ["arf", "context", "time"];

/// Go type expressions. Remembers whether `time` has to be imported.
#[derive(Debug, Default)]
pub struct Go {
    uses_time: Cell<bool>,
}

impl Go {
    pub fn uses_time(&self) -> bool {
        self.uses_time.get()
    }
}

impl Dialect for Go {
    fn timestamp(&self) -> String {
        self.uses_time.set(true);
        "time.Time".into()
    }

    fn bytes(&self) -> String {
        "[]byte".into()
    }

    fn optional(&self, inner: String) -> String {
        format!("*{inner}")
    }

    fn array(&self, element: String) -> String {
        format!("[]{element}")
    }

    fn map(&self, key: String, value: String) -> String {
        format!("map[{key}]{value}")
    }

    fn pointer(&self, inner: String) -> String {
        format!("*{inner}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Import {
    alias: String,
    path: String,
}

impl Import {
    fn line(&self) -> String {
        if self.path.rsplit('/').next() == Some(self.alias.as_str()) {
            format!("\"{}\"", self.path)
        } else {
            format!("{} \"{}\"", self.alias, self.path)
        }
    }
}

/// Prefixes references to other packages with their Go package name and records the
/// import they need, keyed by IDL package.
///
/// Aliases are unique within a file: a name taken by a fixed import gets a trailing
/// `_`, a name taken by another package gets a counter.
struct Imports<'a> {
    options: &'a GeneratorOptions,
    current: &'a str,
    packages: RefCell<BTreeMap<String, Import>>,
}

impl<'a> Imports<'a> {
    fn new(options: &'a GeneratorOptions, current: &'a str) -> Self {
        Self {
            options,
            current,
            packages: RefCell::new(BTreeMap::new()),
        }
    }

    fn snapshot(&self) -> BTreeMap<String, Import> {
        self.packages.borrow().clone()
    }

    fn restore(&self, packages: BTreeMap<String, Import>) {
        *self.packages.borrow_mut() = packages;
    }

    /// Import lines, ordered by path.
    fn into_lines(self) -> Vec<String> {
        let mut imports: Vec<Import> = self.packages.into_inner().into_values().collect();
        imports.sort_by(|a, b| (&a.path, &a.alias).cmp(&(&b.path, &b.alias)));
        imports.iter().map(Import::line).collect()
    }
}

impl Qualifier for Imports<'_> {
    fn resolve(&self, _name: &str, origin_package: &str) -> String {
        if origin_package == self.current {
            return String::new();
        }

        let mut packages = self.packages.borrow_mut();
        if let Some(import) = packages.get(origin_package) {
            return format!("{}.", import.alias);
        }

        let name = package_name(self.options, origin_package);
        let path = match &self.options.go_module {
            Some(module) => format!("{}/{name}", module.trim_end_matches('/')),
            None => name.clone(),
        };

        let base = if FIXED_IMPORTS.contains(&name.as_str()) {
            format!("{name}_")
        } else {
            name
        };
        let mut alias = base.clone();
        let mut counter = 2;
        while packages.values().any(|import| import.alias == alias) {
            alias = format!("{base}{counter}");
            counter += 1;
        }

        packages.insert(
            origin_package.to_string(),
            Import {
                alias: alias.clone(),
                path,
            },
        );
        format!("{alias}.")
    }
}

/// Type mapping for one package, together with the imports its rendered declarations
/// need.
struct Scope<'a> {
    mapper: TypeMapper<'a>,
    dialect: &'a Go,
    imports: &'a Imports<'a>,
}

impl Scope<'_> {
    /// [`Diagnostics::render`] that also forgets the imports a failed render asked for.
    fn render<F>(
        &self,
        diagnostics: &mut Diagnostics,
        what: &str,
        w: &mut IndentedWriter,
        render: F,
    ) where
        F: FnOnce(&mut IndentedWriter) -> Result<()>,
    {
        let uses_time = self.dialect.uses_time();
        let packages = self.imports.snapshot();
        if !diagnostics.render(what, w, render) {
            self.dialect.uses_time.set(uses_time);
            self.imports.restore(packages);
        }
    }
}

/// Go package name for an IDL package: the configured one, or the snake cased last
/// segment.
pub fn package_name(options: &GeneratorOptions, package: &str) -> String {
    match options.go_packages.get(package) {
        Some(name) => name.clone(),
        None => package
            .rsplit('.')
            .next()
            .unwrap_or(package)
            .to_snake_case(),
    }
}

/// Escapes identifiers that collide with Go keywords.
fn identifier(name: &str) -> String {
    let name = name.to_lower_camel_case();
    if GO_KEYWORDS.contains(name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

fn param_type(param: &Param) -> String {
    match param {
        Param::Context => "context.Context".into(),
        Param::Value { ty, .. } => ty.clone(),
        Param::InStreamer(ty) => format!("arf.InStreamer[{ty}]"),
        Param::OutStreamer(ty) => format!("arf.OutStreamer[{ty}]"),
        Param::InOutStreamer { input, output } => format!("arf.InOutStreamer[{input}, {output}]"),
        Param::Responder(name) => format!("*{name}"),
    }
}

fn streamer(
    mapper: &TypeMapper<'_>,
    input: Option<&Type>,
    output: Option<&Type>,
) -> Result<Option<String>> {
    let streamer = match (input, output) {
        (Some(input), Some(output)) => Some(format!(
            "arf.InOutStreamer[{}, {}]",
            mapper.maybe_pointer(input)?,
            mapper.maybe_pointer(output)?
        )),
        (Some(input), None) => Some(format!("arf.InStreamer[{}]", mapper.maybe_pointer(input)?)),
        (None, Some(output)) => Some(format!("arf.OutStreamer[{}]", mapper.maybe_pointer(output)?)),
        (None, None) => None,
    };
    Ok(streamer)
}

/// Parameter names of `signature`. IDL names that collide with a keyword, a name the
/// signature introduces or an earlier parameter get trailing underscores.
fn param_names(signature: &Signature) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(signature.params.len());
    for param in &signature.params {
        let mut name = identifier(param.name());
        if let Param::Value { .. } = param {
            while SIGNATURE_NAMES.contains(name.as_str()) || names.contains(&name) {
                name.push('_');
            }
        }
        names.push(name);
    }
    names
}

fn write_signature(w: &mut IndentedWriter, signature: &Signature) {
    let params = param_names(signature)
        .iter()
        .zip(&signature.params)
        .map(|(name, param)| format!("{name} {}", param_type(param)))
        .collect::<Vec<_>>()
        .join(", ");

    write!(w, "{}({params})", signature.name.to_upper_camel_case());
    match &signature.returns {
        Returns::Error => writeln!(w, " error"),
        Returns::Values(values) => writeln!(w, " ({}, error)", values.join(", ")),
    }
}

pub struct GoGenerator<'a> {
    schema: &'a Schema,
    options: &'a GeneratorOptions,
}

impl<'a> GoGenerator<'a> {
    pub fn new(schema: &'a Schema, options: &'a GeneratorOptions) -> Self {
        Self { schema, options }
    }

    fn write_declaration(
        &self,
        scope: &Scope<'_>,
        package: &str,
        id: DeclId,
        w: &mut IndentedWriter,
        diagnostics: &mut Diagnostics,
    ) {
        let mapper = &scope.mapper;
        let what = format!("declaration {id}");
        let Some(decl) = diagnostics.check(
            &what,
            self.schema.get(id).ok_or(CodegenError::UnknownDeclaration(id)),
        ) else {
            return;
        };

        match &decl.kind {
            DeclarationKind::Struct(body) => {
                scope.render(diagnostics, &format!("struct {}", decl.name), w, |w| {
                    let name = mapper.canonical_name(id)?;
                    write_comments(w, "//", &decl.comments);
                    if let Some(message) = &decl.deprecated {
                        writeln!(w, "// Deprecated: {message}");
                    }
                    writeln!(w, "type {name} struct {{");
                    w.increase_indent();
                    for field in &body.fields {
                        write_comment_lines(w, "//", &field.comments);
                        writeln!(
                            w,
                            "{} {} `arf:\"{}\"`",
                            field.name.to_upper_camel_case(),
                            mapper.maybe_pointer(&field.ty)?,
                            field.id
                        );
                    }
                    w.decrease_indent()?;
                    writeln!(w, "}}");
                    w.line_break();
                    writeln!(
                        w,
                        "func (*{name}) ArfStructID() string {{ return \"{}\" }}",
                        mapper.canonical_path(package, id)?
                    );
                    Ok(())
                });

                for &nested in body.structs.iter().chain(&body.enums) {
                    self.write_declaration(scope, package, nested, w, diagnostics);
                }
            }
            DeclarationKind::Enum(body) => {
                scope.render(diagnostics, &format!("enum {}", decl.name), w, |w| {
                    let name = mapper.canonical_name(id)?;
                    write_comments(w, "//", &decl.comments);
                    if let Some(message) = &decl.deprecated {
                        writeln!(w, "// Deprecated: {message}");
                    }
                    writeln!(w, "type {name} int64");
                    if body.members.is_empty() {
                        return Ok(());
                    }

                    w.line_break();
                    writeln!(w, "const (");
                    w.increase_indent();
                    for member in &body.members {
                        writeln!(
                            w,
                            "{name}{} {name} = {}",
                            member.name.to_upper_camel_case(),
                            member.value
                        );
                    }
                    w.decrease_indent()?;
                    writeln!(w, ")");
                    Ok(())
                });
            }
            DeclarationKind::Service(_) => {
                diagnostics.check::<()>(
                    &what,
                    Err(CodegenError::UnsupportedTypeKind {
                        name: decl.name.clone(),
                        kind: decl.kind.describe(),
                    }),
                );
            }
        }
    }

    fn write_service(
        &self,
        scope: &Scope<'_>,
        package: &str,
        id: DeclId,
        w: &mut IndentedWriter,
        diagnostics: &mut Diagnostics,
    ) {
        let mapper = &scope.mapper;
        let what = format!("service {id}");
        let Some(decl) = diagnostics.check(
            &what,
            self.schema.get(id).ok_or(CodegenError::UnknownDeclaration(id)),
        ) else {
            return;
        };
        let Some(service) = decl.as_service() else {
            diagnostics.check::<()>(
                &what,
                Err(CodegenError::UnsupportedTypeKind {
                    name: decl.name.clone(),
                    kind: decl.kind.describe(),
                }),
            );
            return;
        };

        let Some(path) = diagnostics.check(&what, mapper.canonical_path(package, id)) else {
            return;
        };

        let name = decl.name.to_upper_camel_case();
        let mut definitions = Vec::new();
        for method in &service.methods {
            let what = format!("method {}.{}", decl.name, method.name);
            let definition = MethodDefinition::new(package, &decl.name, method)
                .and_then(|definition| definition.check_involution().map(|_| definition));
            if let Some(definition) = diagnostics.check(&what, definition) {
                definitions.push(definition);
            }
        }

        write_comments(w, "//", &decl.comments);
        if let Some(message) = &decl.deprecated {
            writeln!(w, "// Deprecated: {message}");
        }
        writeln!(w, "const {name}ServiceID = \"{path}\"");

        w.line_break();
        writeln!(w, "type {name}Server interface {{");
        w.increase_indent();
        let mut responders = Vec::new();
        for definition in &definitions {
            let what = format!("handler {}.{}", decl.name, definition.name());
            scope.render(diagnostics, &what, w, |w| {
                let signature = Signature::synthesize(definition, mapper)?;
                write_comment_lines(w, "//", &definition.method().comments);
                write_signature(w, &signature);
                if signature.responder.is_some() {
                    responders.push(definition);
                }
                Ok(())
            });
        }
        close_block(w, diagnostics);

        for definition in responders {
            let what = format!("responder {}.{}", decl.name, definition.name());
            scope.render(diagnostics, &what, w, |w| {
                write_server_responder(w, mapper, definition)
            });
        }

        w.line_break();
        writeln!(w, "type {name}Client interface {{");
        w.increase_indent();
        let mut client_responders = Vec::new();
        for definition in &definitions {
            let what = format!("call {}.{}", decl.name, definition.name());
            scope.render(diagnostics, &what, w, |w| {
                let signature = Signature::synthesize_call(definition, mapper)?;
                write_comment_lines(w, "//", &definition.method().comments);
                write_signature(w, &signature);
                if signature.responder.is_some() {
                    client_responders.push(definition.for_client());
                }
                Ok(())
            });
        }
        close_block(w, diagnostics);

        for client in &client_responders {
            let what = format!("client responder {}.{}", decl.name, client.name());
            scope.render(diagnostics, &what, w, |w| {
                write_client_responder(w, mapper, client)
            });
        }
    }

    /// Two packages sharing a Go package name would be written to the same file.
    fn check_package_name(&self, package: &Package, name: &str) -> Result<()> {
        let other = self.schema.packages.iter().find(|other| {
            other.name != package.name && package_name(self.options, &other.name) == name
        });

        match other {
            Some(other) => {
                let (first, second) = if package.name < other.name {
                    (package.name.clone(), other.name.clone())
                } else {
                    (other.name.clone(), package.name.clone())
                };
                Err(CodegenError::DuplicateGoPackage {
                    name: name.to_string(),
                    first,
                    second,
                })
            }
            None => Ok(()),
        }
    }

    fn write_header(
        &self,
        package: &Package,
        name: &str,
        uses_time: bool,
        imports: Vec<String>,
    ) -> Result<IndentedWriter> {
        let has_services = !package.services.is_empty();
        let mut w = IndentedWriter::with_indent_unit("\t");
        writeln!(w, "{HEADER}");
        write_comments(&mut w, "//", &package.comments);
        writeln!(w, "package {name}");

        let mut standard = Vec::new();
        if has_services {
            standard.push("\"context\"".to_string());
        }
        if uses_time {
            standard.push("\"time\"".to_string());
        }
        let mut third_party = imports;
        if has_services {
            third_party.insert(0, format!("arf \"{RUNTIME_IMPORT}\""));
        }
        if standard.is_empty() && third_party.is_empty() {
            return Ok(w);
        }

        w.line_break();
        writeln!(w, "import (");
        w.increase_indent();
        for import in &standard {
            writeln!(w, "{import}");
        }
        if !standard.is_empty() && !third_party.is_empty() {
            w.line_break();
        }
        for import in &third_party {
            writeln!(w, "{import}");
        }
        w.decrease_indent()?;
        writeln!(w, ")");
        Ok(w)
    }
}

fn close_block(w: &mut IndentedWriter, diagnostics: &mut Diagnostics) {
    diagnostics.check("interface", w.decrease_indent());
    writeln!(w, "}}");
}

fn write_server_responder(
    w: &mut IndentedWriter,
    mapper: &TypeMapper<'_>,
    definition: &MethodDefinition<'_>,
) -> Result<()> {
    let name = definition.responder_name();
    let stream = streamer(mapper, definition.input_stream(), definition.output_stream())?;
    let outputs = definition
        .outputs()
        .iter()
        .map(|value| mapper.maybe_pointer(value.ty))
        .collect::<Result<Vec<_>>>()?;

    w.line_break();
    writeln!(w, "type {name} struct {{");
    w.increase_indent();
    writeln!(w, "arf.Responder");
    if let Some(stream) = &stream {
        writeln!(w, "Stream {stream}");
    }
    w.decrease_indent()?;
    writeln!(w, "}}");

    let params = outputs
        .iter()
        .enumerate()
        .map(|(index, ty)| format!("v{index} {ty}"))
        .collect::<Vec<_>>()
        .join(", ");
    let args = (0..outputs.len())
        .map(|index| format!("v{index}"))
        .collect::<Vec<_>>()
        .join(", ");

    w.line_break();
    writeln!(w, "func (r *{name}) Respond({params}) error {{");
    w.increase_indent();
    writeln!(w, "return r.Responder.Respond({args})");
    w.decrease_indent()?;
    writeln!(w, "}}");
    Ok(())
}

fn write_client_responder(
    w: &mut IndentedWriter,
    mapper: &TypeMapper<'_>,
    client: &MethodDefinition<'_>,
) -> Result<()> {
    let name = client.responder_name();
    let stream = streamer(mapper, client.input_stream(), client.output_stream())?;
    let received = client
        .inputs()
        .iter()
        .map(|value| mapper.maybe_pointer(value.ty))
        .collect::<Result<Vec<_>>>()?;

    w.line_break();
    writeln!(w, "type {name} struct {{");
    w.increase_indent();
    writeln!(w, "arf.Responder");
    if let Some(stream) = &stream {
        writeln!(w, "Stream {stream}");
    }
    w.decrease_indent()?;
    writeln!(w, "}}");

    if received.is_empty() {
        return Ok(());
    }

    let values = (0..received.len())
        .map(|index| format!("v{index}"))
        .collect::<Vec<_>>();
    w.line_break();
    writeln!(
        w,
        "func (r *{name}) Result() ({}, error) {{",
        received.join(", ")
    );
    w.increase_indent();
    for (value, ty) in values.iter().zip(&received) {
        writeln!(w, "var {value} {ty}");
    }
    let targets = values
        .iter()
        .map(|value| format!("&{value}"))
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(w, "err := r.Responder.Result({targets})");
    writeln!(w, "return {}, err", values.join(", "));
    w.decrease_indent()?;
    writeln!(w, "}}");
    Ok(())
}

impl Generator for GoGenerator<'_> {
    fn generate(&self, package: &Package) -> Result<Generated> {
        let name = package_name(self.options, &package.name);
        self.check_package_name(package, &name)?;

        let dialect = Go::default();
        let imports = Imports::new(self.options, &package.name);
        let scope = Scope {
            mapper: TypeMapper::new(self.schema, &dialect).with_qualifier(&imports),
            dialect: &dialect,
            imports: &imports,
        };

        let mut diagnostics = Diagnostics::default();
        let mut body = IndentedWriter::with_indent_unit("\t");

        for &id in package.structs.iter().chain(&package.enums) {
            self.write_declaration(&scope, &package.name, id, &mut body, &mut diagnostics);
        }
        for &id in &package.services {
            self.write_service(&scope, &package.name, id, &mut body, &mut diagnostics);
        }

        let header = self.write_header(package, &name, dialect.uses_time(), imports.into_lines())?;
        body.merge(header);

        let diagnostics = diagnostics.into_vec();
        log::debug!(
            "rendered go package {name}, {} declarations skipped",
            diagnostics.len()
        );

        Ok(Generated {
            package: package.name.clone(),
            file: GeneratedFile {
                text: body.to_string(),
                target_dir: self.options.output_dir.join(&name),
                target_file: format!("{name}.arf.go"),
            },
            diagnostics,
        })
    }
}
