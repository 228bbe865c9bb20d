use std::path::PathBuf;

use arf_ast::{Package, Schema};

use crate::{
    error::{CodegenError, Result},
    options::{GeneratorOptions, Language},
    targets::{golang::GoGenerator, ruby::RubyGenerator},
    writer::IndentedWriter,
};

/// One generated source file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub text: String,
    pub target_dir: PathBuf,
    pub target_file: String,
}

impl GeneratedFile {
    pub fn path(&self) -> PathBuf {
        self.target_dir.join(&self.target_file)
    }
}

/// Output for one package together with the errors of the declarations that were
/// skipped while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub package: String,
    pub file: GeneratedFile,
    pub diagnostics: Vec<CodegenError>,
}

pub trait Generator {
    fn generate(&self, package: &Package) -> Result<Generated>;
}

/// Collects per-declaration failures so that generation can go on with the siblings.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<CodegenError>,
}

impl Diagnostics {
    /// Keeps the error of `result`, if any, and returns the value otherwise.
    pub fn check<T>(&mut self, what: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("skipping {what}: {err}");
                self.errors.push(err);
                None
            }
        }
    }

    /// Renders into a fork of `w` and splices the result back only on success, which is
    /// returned.
    pub fn render<F>(&mut self, what: &str, w: &mut IndentedWriter, render: F) -> bool
    where
        F: FnOnce(&mut IndentedWriter) -> Result<()>,
    {
        let mut fork = w.fork();
        if self.check(what, render(&mut fork)).is_none() {
            return false;
        }
        w.append(fork);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_vec(self) -> Vec<CodegenError> {
        self.errors
    }
}

/// Runs the generator selected by `options` over every package of `schema`, in order.
pub fn generate_all(schema: &Schema, options: &GeneratorOptions) -> Result<Vec<Generated>> {
    let generator: Box<dyn Generator + '_> = match options.language {
        Language::Go => Box::new(GoGenerator::new(schema, options)),
        Language::Ruby => Box::new(RubyGenerator::new(schema, options)),
    };

    schema
        .packages
        .iter()
        .map(|package| {
            log::debug!("generating {} for package {}", options.language, package.name);
            generator.generate(package)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use arf_ast::{EnumMember, Field, SchemaBuilder, ServiceMethod, Type};

    use super::*;

    fn schema() -> Schema {
        let mut builder = SchemaBuilder::new();
        let users = builder.package("org.example.users");
        let user = builder.add_struct(users, "User");
        let role = builder.add_enum_in(user, "Role", vec![EnumMember::new("admin", 1)]);
        builder.add_field(user, Field::new(0, "name", Type::primitive("string")));
        builder.add_field(user, Field::new(1, "role", Type::user("Role", role)));
        builder.add_service(
            users,
            "Users",
            vec![ServiceMethod::new("get")
                .param("id", Type::primitive("string"))
                .returns(Type::user("User", user))],
        );

        let audit = builder.package("org.example.audit");
        let entry = builder.add_struct(audit, "Entry");
        builder.add_field(
            entry,
            Field::new(0, "actor", Type::qualified("User", user, "org.example.users")),
        );

        builder.build()
    }

    #[test]
    fn one_file_per_package() {
        let schema = schema();

        for language in [Language::Go, Language::Ruby] {
            let options = GeneratorOptions::new(language, "out");
            let generated = generate_all(&schema, &options).unwrap();

            assert_eq!(generated.len(), 2);
            assert_eq!(generated[0].package, "org.example.users");
            assert_eq!(generated[1].package, "org.example.audit");
            assert!(generated.iter().all(|g| g.diagnostics.is_empty()));
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let schema = schema();

        for language in [Language::Go, Language::Ruby] {
            let mut options = GeneratorOptions::new(language, "out");
            options.go_module = Some("example.com/gen".into());

            let first = generate_all(&schema, &options).unwrap();
            let second = generate_all(&schema, &options).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn diagnostics_keep_siblings() {
        let mut diagnostics = Diagnostics::default();
        let mut w = IndentedWriter::new();

        diagnostics.render("first", &mut w, |w| {
            w.writeln("first");
            Ok(())
        });
        let rendered = diagnostics.render("broken", &mut w, |w| {
            w.writeln("half");
            Err(CodegenError::InvalidIndentState)
        });
        assert!(!rendered);
        diagnostics.render("third", &mut w, |w| {
            w.writeln("third");
            Ok(())
        });

        assert_eq!(w.to_string(), "first\nthird\n");
        assert_eq!(diagnostics.into_vec(), vec![CodegenError::InvalidIndentState]);
    }
}
