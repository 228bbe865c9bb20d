mod logger;
mod output;

use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use arfc::{
    ast::Schema,
    codegen::{generate_all, parse_mapping, GeneratorOptions, Language},
};
use clap::{Parser, ValueEnum};
use logger::create_logger;

#[derive(Debug, ValueEnum, Clone, Copy)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// Compiles resolved arf schemas into source files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The destination language: go, golang or ruby
    #[arg(short, long, env = "ARFC_LANG")]
    lang: Language,

    /// The resolved schema to generate sources from, as JSON
    #[arg(short, long, env = "ARFC_INPUT")]
    input: PathBuf,

    /// The output directory to write to
    #[arg(short, long, env = "ARFC_OUTPUT")]
    output: PathBuf,

    /// Write Ruby files directly into the output directory, without module subdirectories
    #[arg(long, env = "ARFC_RUBY_FLAT", help_heading = "Ruby")]
    ruby_flat: bool,

    /// Overrides the Ruby module of a package, as some.package.name=Module::Name
    #[arg(
        long,
        env = "ARFC_RUBY_MODULE",
        value_delimiter = ',',
        value_parser = parse_mapping,
        help_heading = "Ruby"
    )]
    ruby_module: Vec<(String, String)>,

    /// Overrides the Go package of a package, as some.package.name=package
    #[arg(
        long,
        env = "ARFC_GOLANG_PACKAGE",
        value_delimiter = ',',
        value_parser = parse_mapping,
        help_heading = "Go"
    )]
    golang_package: Vec<(String, String)>,

    /// Base Go module of the generated code. Read from the closest go.mod when unset
    #[arg(long, env = "ARFC_GO_MODULE", help_heading = "Go")]
    go_module: Option<String>,

    /// The log level to use
    #[arg(value_enum, long, default_value = "info", env = "ARFC_LOG_LEVEL")]
    log_level: LogLevel,

    /// Also write every log line to this file
    #[arg(long, env = "ARFC_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn generator_options(&self) -> Result<GeneratorOptions> {
        let mut options = GeneratorOptions::new(self.lang, &self.output);
        options.ruby_flat = self.ruby_flat;
        options.ruby_modules = self.ruby_module.iter().cloned().collect();
        options.go_packages = self.golang_package.iter().cloned().collect();
        options.go_module = match (&self.go_module, self.lang) {
            (Some(module), _) => Some(module.clone()),
            (None, Language::Go) => Some(output::find_go_module(&self.output)?),
            (None, Language::Ruby) => None,
        };

        Ok(options)
    }
}

/// Generates and writes every package. Returns whether no declaration was skipped.
fn run(args: &Args) -> Result<bool> {
    let options = args.generator_options()?;
    for warning in options.warnings() {
        log::warn!("{warning}");
    }

    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed reading input `{}`", args.input.display()))?;
    let schema: Schema = serde_json::from_str(&source)
        .with_context(|| format!("Failed parsing schema `{}`", args.input.display()))?;

    log::info!(
        "Generating {} sources for {} packages",
        options.language,
        schema.packages.len()
    );
    let generated = generate_all(&schema, &options)?;

    let mut clean = true;
    for package in &generated {
        let path = output::write_file(&package.file)?;
        log::info!("Wrote {}", path.display());

        for diagnostic in &package.diagnostics {
            eprintln!("ERROR: {}: {diagnostic}", package.package);
            clean = false;
        }
    }

    Ok(clean)
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if let Err(err) = create_logger(args.log_file.as_deref(), args.log_level.into()) {
        eprintln!("ERROR: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}
