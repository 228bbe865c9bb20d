//! Ruby output: one `<module>.arf.rb` file per package, classes nested in the package's
//! modules. Types are declared at runtime, so references are written as strings and
//! resolved by the Ruby library.

use std::path::PathBuf;

use heck::{ToSnakeCase, ToUpperCamelCase};

use arf_ast::{DeclId, Declaration, DeclarationKind, Package, Schema, StructBody};

use crate::{
    dialect::{Dialect, Qualifier},
    error::{CodegenError, Result},
    generator::{Diagnostics, Generated, GeneratedFile, Generator},
    method::MethodDefinition,
    options::GeneratorOptions,
    targets::write_comments,
    types::TypeMapper,
    writer::IndentedWriter,
};

const HEADER: &str = "# Code generated by arfc. DO NOT EDIT.";

#[derive(Debug, Default, Clone, Copy)]
pub struct Ruby;

impl Dialect for Ruby {
    fn timestamp(&self) -> String {
        ":timestamp".into()
    }

    fn bytes(&self) -> String {
        ":bytes".into()
    }

    fn scalar(&self, name: &str) -> String {
        format!(":{name}")
    }

    fn optional(&self, inner: String) -> String {
        format!("{inner}, optional: true")
    }

    fn array(&self, element: String) -> String {
        if element.starts_with(':') {
            format!("ArrayType[{element}]")
        } else {
            format!("ArrayType[{element}].bind(self)")
        }
    }

    fn map(&self, key: String, value: String) -> String {
        if key.starts_with(':') && value.starts_with(':') {
            format!("MapType[{key}, {value}]")
        } else {
            format!("MapType[{key}, {value}].bind(self)")
        }
    }

    fn user(&self, name: String) -> String {
        format!("\"{name}\"")
    }

    fn pointer(&self, inner: String) -> String {
        inner
    }

    fn type_separator(&self) -> &str {
        "::"
    }
}

/// Module segments for `package`: the configured module, or its camel cased segments.
pub fn module_path(options: &GeneratorOptions, package: &str) -> Result<Vec<String>> {
    let modules = match options.ruby_module(package)? {
        Some(module) => module.split("::").map(str::to_string).collect(),
        None => package
            .split('.')
            .map(|segment| segment.to_upper_camel_case())
            .collect(),
    };
    Ok(modules)
}

/// Prefixes references to other packages with their full module path.
struct Modules<'a> {
    options: &'a GeneratorOptions,
    current: &'a str,
}

impl Qualifier for Modules<'_> {
    fn resolve(&self, _name: &str, origin_package: &str) -> String {
        if origin_package == self.current {
            return String::new();
        }

        let modules = module_path(self.options, origin_package).unwrap_or_else(|_| {
            origin_package
                .split('.')
                .map(|segment| segment.to_upper_camel_case())
                .collect()
        });
        format!("{}::", modules.join("::"))
    }
}

pub struct RubyGenerator<'a> {
    schema: &'a Schema,
    options: &'a GeneratorOptions,
}

impl<'a> RubyGenerator<'a> {
    pub fn new(schema: &'a Schema, options: &'a GeneratorOptions) -> Self {
        Self { schema, options }
    }

    fn target(&self, modules: &[String]) -> (PathBuf, String) {
        let (last, parents) = match modules.split_last() {
            Some(split) => split,
            None => return (self.options.output_dir.clone(), "package.arf.rb".into()),
        };

        let dir = if self.options.ruby_flat {
            self.options.output_dir.clone()
        } else {
            parents
                .iter()
                .fold(self.options.output_dir.clone(), |dir, module| {
                    dir.join(module.to_snake_case())
                })
        };
        (dir, format!("{}.arf.rb", last.to_snake_case()))
    }

    fn lookup(&self, id: DeclId, diagnostics: &mut Diagnostics) -> Option<&'a Declaration> {
        diagnostics.check(
            &format!("declaration {id}"),
            self.schema.get(id).ok_or(CodegenError::UnknownDeclaration(id)),
        )
    }

    fn write_declaration(
        &self,
        mapper: &TypeMapper<'_>,
        package: &str,
        id: DeclId,
        w: &mut IndentedWriter,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(decl) = self.lookup(id, diagnostics) else {
            return;
        };

        match &decl.kind {
            DeclarationKind::Struct(body) => {
                let mut class = w.fork();
                let what = format!("struct {}", decl.name);
                let opened = open_struct(mapper, package, id, decl, body, &mut class);
                if diagnostics.check(&what, opened).is_none() {
                    return;
                }

                for &nested in body.structs.iter().chain(&body.enums) {
                    self.write_declaration(mapper, package, nested, &mut class, diagnostics);
                }

                if diagnostics.check(&what, class.decrease_indent()).is_some() {
                    writeln!(class, "end");
                    w.append(class);
                }
            }
            DeclarationKind::Enum(body) => {
                diagnostics.render(&format!("enum {}", decl.name), w, |w| {
                    write_comments(w, "#", &decl.comments);
                    if let Some(message) = &decl.deprecated {
                        writeln!(w, "# Deprecated: {message}");
                    }
                    writeln!(w, "class {} < Arf::RPC::Enum", decl.name.to_upper_camel_case());
                    w.increase_indent();
                    for member in &body.members {
                        writeln!(w, "option {}: {}", member.name.to_snake_case(), member.value);
                    }
                    w.decrease_indent()?;
                    writeln!(w, "end");
                    Ok(())
                });
            }
            DeclarationKind::Service(_) => {
                diagnostics.check::<()>(
                    &format!("declaration {id}"),
                    Err(CodegenError::UnsupportedTypeKind {
                        name: decl.name.clone(),
                        kind: decl.kind.describe(),
                    }),
                );
            }
        }
    }

    /// Writes the server class, or the client class when `client` is set. Both declare
    /// the same RPCs.
    fn write_service(
        &self,
        mapper: &TypeMapper<'_>,
        package: &str,
        id: DeclId,
        client: bool,
        w: &mut IndentedWriter,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(decl) = self.lookup(id, diagnostics) else {
            return;
        };
        let Some(service) = decl.as_service() else {
            diagnostics.check::<()>(
                &format!("declaration {id}"),
                Err(CodegenError::UnsupportedTypeKind {
                    name: decl.name.clone(),
                    kind: decl.kind.describe(),
                }),
            );
            return;
        };

        let mut class = w.fork();
        let what = format!("service {}", decl.name);
        let Some(path) = diagnostics.check(&what, mapper.canonical_path(package, id)) else {
            return;
        };

        write_comments(&mut class, "#", &decl.comments);
        if let Some(message) = &decl.deprecated {
            writeln!(class, "# Deprecated: {message}");
        }
        let name = decl.name.to_upper_camel_case();
        if client {
            writeln!(class, "class {name}Client < Arf::RPC::ClientBase");
        } else {
            writeln!(class, "class {name} < Arf::RPC::ServiceBase");
        }
        class.increase_indent();
        writeln!(class, "arf_service_id \"{path}\"");

        for method in &service.methods {
            let what = format!("method {}.{}", decl.name, method.name);
            diagnostics.render(&what, &mut class, |w| {
                let definition = MethodDefinition::new(package, &decl.name, method)?;
                write_rpc(w, mapper, &definition)
            });
        }

        if diagnostics.check(&what, class.decrease_indent()).is_some() {
            writeln!(class, "end");
            w.append(class);
        }
    }
}

fn open_struct(
    mapper: &TypeMapper<'_>,
    package: &str,
    id: DeclId,
    decl: &Declaration,
    body: &StructBody,
    w: &mut IndentedWriter,
) -> Result<()> {
    write_comments(w, "#", &decl.comments);
    if let Some(message) = &decl.deprecated {
        writeln!(w, "# Deprecated: {message}");
    }
    writeln!(w, "class {} < Arf::RPC::Struct", decl.name.to_upper_camel_case());
    w.increase_indent();
    writeln!(w, "arf_struct_id \"{}\"", mapper.canonical_path(package, id)?);
    for field in &body.fields {
        writeln!(
            w,
            "field {}, :{}, {}",
            field.id,
            field.name.to_snake_case(),
            mapper.convert(&field.ty)?
        );
    }
    Ok(())
}

fn write_rpc(
    w: &mut IndentedWriter,
    mapper: &TypeMapper<'_>,
    definition: &MethodDefinition<'_>,
) -> Result<()> {
    let mut inputs = definition
        .inputs()
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let name = match value.name {
                Some(name) => name.to_snake_case(),
                None => format!("arg{index}"),
            };
            Ok(format!("{name}: {}", mapper.convert(value.ty)?))
        })
        .collect::<Result<Vec<_>>>()?;
    if let Some(stream) = definition.input_stream() {
        inputs.push(format!("_stream: InputStream[{}]", mapper.convert(stream)?));
    }

    let mut outputs = definition
        .outputs()
        .iter()
        .map(|value| mapper.convert(value.ty))
        .collect::<Result<Vec<_>>>()?;
    if let Some(stream) = definition.output_stream() {
        outputs.push(format!("OutputStream[{}]", mapper.convert(stream)?));
    }

    write!(w, "rpc :{}", definition.name().to_snake_case());
    w.increase_indent();
    if !inputs.is_empty() {
        writeln!(w, ",");
        write!(w, "inputs: {{ {} }}", inputs.join(", "));
    }
    if !outputs.is_empty() {
        writeln!(w, ",");
        write!(w, "outputs: [{}]", outputs.join(", "));
    }
    w.decrease_indent()?;
    w.line_break();
    Ok(())
}

impl Generator for RubyGenerator<'_> {
    fn generate(&self, package: &Package) -> Result<Generated> {
        let modules = module_path(self.options, &package.name)?;
        let (target_dir, target_file) = self.target(&modules);

        let qualifier = Modules {
            options: self.options,
            current: &package.name,
        };
        let mapper = TypeMapper::new(self.schema, &Ruby).with_qualifier(&qualifier);
        let mut diagnostics = Diagnostics::default();

        let mut w = IndentedWriter::new();
        writeln!(w, "{HEADER}");
        w.line_break();
        for module in &modules {
            writeln!(w, "module {module}");
            w.increase_indent();
        }

        for &id in package.structs.iter().chain(&package.enums) {
            self.write_declaration(&mapper, &package.name, id, &mut w, &mut diagnostics);
        }
        for client in [false, true] {
            for &id in &package.services {
                self.write_service(&mapper, &package.name, id, client, &mut w, &mut diagnostics);
            }
        }

        for _ in &modules {
            w.decrease_indent()?;
            writeln!(w, "end");
        }

        let diagnostics = diagnostics.into_vec();
        log::debug!(
            "rendered ruby package {}, {} declarations skipped",
            package.name,
            diagnostics.len()
        );

        Ok(Generated {
            package: package.name.clone(),
            file: GeneratedFile {
                text: w.to_string(),
                target_dir,
                target_file,
            },
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use arf_ast::{EnumMember, Field, SchemaBuilder, ServiceMethod, Type};

    use super::*;
    use crate::options::Language;

    fn schema() -> Schema {
        let mut builder = SchemaBuilder::new();
        let pkg = builder.package("org.example.users");
        let user = builder.add_struct(pkg, "user");
        builder.add_field(user, Field::new(0, "name", Type::primitive("string")));
        builder.add_field(user, Field::new(1, "tags", Type::array(Type::primitive("string"))));
        let role = builder.add_enum_in(user, "role", vec![EnumMember::new("admin", 1)]);
        builder.add_field(user, Field::new(2, "role", Type::user("role", role)));
        builder.add_service(
            pkg,
            "users",
            vec![
                ServiceMethod::new("get")
                    .param("id", Type::primitive("string"))
                    .returns(Type::user("user", user)),
                ServiceMethod::new("watch")
                    .stream_param(Type::user("user", user))
                    .stream_returns(Type::user("role", role)),
            ],
        );
        builder.build()
    }

    fn render(schema: &Schema, options: &GeneratorOptions, package: &str) -> Generated {
        let package = schema.package(package).unwrap();
        RubyGenerator::new(schema, options).generate(package).unwrap()
    }

    #[test]
    fn full_package() {
        let schema = schema();
        let options = GeneratorOptions::new(Language::Ruby, "out");
        let generated = render(&schema, &options, "org.example.users");

        assert!(generated.diagnostics.is_empty());
        assert_eq!(generated.file.path(), Path::new("out/org/example/users.arf.rb"));
        assert_eq!(
            generated.file.text,
            r#"# Code generated by arfc. DO NOT EDIT.

module Org
  module Example
    module Users

      class User < Arf::RPC::Struct
        arf_struct_id "org.example.users/user"
        field 0, :name, :string
        field 1, :tags, ArrayType[:string]
        field 2, :role, "User::Role"

        class Role < Arf::RPC::Enum
          option admin: 1
        end
      end

      class Users < Arf::RPC::ServiceBase
        arf_service_id "org.example.users/users"
        rpc :get,
          inputs: { id: :string },
          outputs: ["User"]
        rpc :watch,
          inputs: { _stream: InputStream["User"] },
          outputs: [OutputStream["User::Role"]]
      end

      class UsersClient < Arf::RPC::ClientBase
        arf_service_id "org.example.users/users"
        rpc :get,
          inputs: { id: :string },
          outputs: ["User"]
        rpc :watch,
          inputs: { _stream: InputStream["User"] },
          outputs: [OutputStream["User::Role"]]
      end
    end
  end
end
"#
        );
    }

    #[test]
    fn containers() {
        let schema = schema();
        let mapper = TypeMapper::new(&schema, &Ruby);
        let user = Type::user("user", DeclId(0));

        let cases = [
            (Type::primitive("timestamp"), ":timestamp"),
            (Type::optional(Type::primitive("int32")), ":int32, optional: true"),
            (Type::array(user.clone()), "ArrayType[\"User\"].bind(self)"),
            (
                Type::map(Type::primitive("string"), Type::primitive("bytes")),
                "MapType[:string, :bytes]",
            ),
            (
                Type::map(Type::primitive("string"), user),
                "MapType[:string, \"User\"].bind(self)",
            ),
        ];
        for (ty, expected) in cases {
            assert_eq!(mapper.convert(&ty).unwrap(), expected);
        }
    }

    #[test]
    fn module_mapping_and_flat_layout() {
        let schema = schema();
        let mut options = GeneratorOptions::new(Language::Ruby, "out");
        options
            .ruby_modules
            .insert("org.example.users".into(), "Accounts::Api".into());

        let generated = render(&schema, &options, "org.example.users");
        assert_eq!(generated.file.path(), Path::new("out/accounts/api.arf.rb"));
        assert!(generated
            .file
            .text
            .contains("module Accounts\n  module Api\n\n    class User"));

        options.ruby_flat = true;
        let generated = render(&schema, &options, "org.example.users");
        assert_eq!(generated.file.path(), Path::new("out/api.arf.rb"));
    }

    #[test]
    fn invalid_module_fails_the_package() {
        let schema = schema();
        let mut options = GeneratorOptions::new(Language::Ruby, "out");
        options
            .ruby_modules
            .insert("org.example.users".into(), "accounts".into());

        let package = schema.package("org.example.users").unwrap();
        let result = RubyGenerator::new(&schema, &options).generate(package);
        assert!(matches!(result, Err(CodegenError::InvalidRubyModule { .. })));
    }

    #[test]
    fn foreign_types_use_module_paths() {
        let mut builder = SchemaBuilder::new();
        let users = builder.package("org.example.users");
        let user = builder.add_struct(users, "user");
        let audit = builder.package("org.example.audit");
        let entry = builder.add_struct(audit, "entry");
        builder.add_field(
            entry,
            Field::new(0, "actor", Type::qualified("user", user, "org.example.users")),
        );
        let schema = builder.build();
        let options = GeneratorOptions::new(Language::Ruby, "out");

        let generated = render(&schema, &options, "org.example.audit");
        assert!(generated
            .file
            .text
            .contains("field 0, :actor, \"Org::Example::Users::User\"\n"));
    }
}
