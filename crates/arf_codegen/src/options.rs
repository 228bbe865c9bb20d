use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr, sync::OnceLock};

use regex::Regex;

use crate::error::{CodegenError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Go,
    Ruby,
}

impl FromStr for Language {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "go" | "golang" => Ok(Language::Go),
            "ruby" => Ok(Language::Ruby),
            _ => Err(CodegenError::UnknownLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Go => f.write_str("go"),
            Language::Ruby => f.write_str("ruby"),
        }
    }
}

/// Everything the generators need besides the schema itself.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub language: Language,
    pub output_dir: PathBuf,
    /// Write Ruby files directly into `output_dir` instead of module subdirectories.
    pub ruby_flat: bool,
    /// Package name to Ruby module path, e.g. `org.example` to `Example::Api`.
    pub ruby_modules: BTreeMap<String, String>,
    /// Package name to Go package name.
    pub go_packages: BTreeMap<String, String>,
    /// Base Go module import path of the generated code.
    pub go_module: Option<String>,
}

impl GeneratorOptions {
    pub fn new(language: Language, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            language,
            output_dir: output_dir.into(),
            ruby_flat: false,
            ruby_modules: BTreeMap::new(),
            go_packages: BTreeMap::new(),
            go_module: None,
        }
    }

    /// Options that were set but have no effect for the selected language.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        match self.language {
            Language::Ruby => {
                if !self.go_packages.is_empty() {
                    warnings.push("Providing golang-package with lang Ruby has no effect".into());
                }
                if self.go_module.is_some() {
                    warnings.push("Providing go-module with lang Ruby has no effect".into());
                }
            }
            Language::Go => {
                if !self.ruby_modules.is_empty() {
                    warnings.push("Providing ruby-module with lang Go has no effect".into());
                }
                if self.ruby_flat {
                    warnings.push("Providing ruby-flat with lang Go has no effect".into());
                }
            }
        }
        warnings
    }

    /// Ruby module configured for `package`, validated.
    pub fn ruby_module(&self, package: &str) -> Result<Option<&str>> {
        match self.ruby_modules.get(package) {
            Some(module) if ruby_module_pattern().is_match(module) => Ok(Some(module)),
            Some(module) => Err(CodegenError::InvalidRubyModule {
                package: package.to_string(),
                module: module.clone(),
            }),
            None => Ok(None),
        }
    }
}

fn ruby_module_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Z][a-zA-Z0-9]*)(::([A-Z][a-zA-Z0-9]*))*$").expect("valid pattern")
    })
}

/// Parses a `some.package.name=value` pair.
pub fn parse_mapping(input: &str) -> Result<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CodegenError::InvalidMapping(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_names() {
        assert_eq!("go".parse::<Language>(), Ok(Language::Go));
        assert_eq!("Golang".parse::<Language>(), Ok(Language::Go));
        assert_eq!("RUBY".parse::<Language>(), Ok(Language::Ruby));
        assert_eq!(
            "java".parse::<Language>(),
            Err(CodegenError::UnknownLanguage("java".into()))
        );
    }

    #[test]
    fn mappings() {
        assert_eq!(
            parse_mapping(" org.example = Example::Api "),
            Ok(("org.example".into(), "Example::Api".into()))
        );
        assert!(parse_mapping("org.example").is_err());
        assert!(parse_mapping("=Example").is_err());
        assert!(parse_mapping("org.example=").is_err());
    }

    #[test]
    fn ruby_modules_are_validated() {
        let mut options = GeneratorOptions::new(Language::Ruby, "out");
        options
            .ruby_modules
            .insert("org.example".into(), "Example::Api".into());
        options
            .ruby_modules
            .insert("org.broken".into(), "example::api".into());

        assert_eq!(options.ruby_module("org.example"), Ok(Some("Example::Api")));
        assert_eq!(options.ruby_module("org.other"), Ok(None));
        assert!(matches!(
            options.ruby_module("org.broken"),
            Err(CodegenError::InvalidRubyModule { .. })
        ));
    }

    #[test]
    fn options_for_the_other_language_warn() {
        let mut options = GeneratorOptions::new(Language::Go, "out");
        assert!(options.warnings().is_empty());

        options.ruby_flat = true;
        assert_eq!(
            options.warnings(),
            vec!["Providing ruby-flat with lang Go has no effect".to_string()]
        );
    }
}
