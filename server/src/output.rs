use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use arfc::codegen::GeneratedFile;

/// Creates the target directory of `file` and writes it, returning the written path.
pub fn write_file(file: &GeneratedFile) -> Result<PathBuf> {
    fs::create_dir_all(&file.target_dir).with_context(|| {
        format!(
            "Failed creating output directory `{}`",
            file.target_dir.display()
        )
    })?;

    let path = file.path();
    fs::write(&path, &file.text)
        .with_context(|| format!("Failed writing output file `{}`", path.display()))?;

    Ok(path)
}

/// Import path of `output` inside the closest enclosing Go module.
///
/// Looks for `go.mod` in `output` and every parent up to the root, then joins the
/// declared module with the location of `output` relative to it.
pub fn find_go_module(output: &Path) -> Result<String> {
    let output = if output.is_absolute() {
        output.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed reading the current directory")?
            .join(output)
    };

    for dir in output.ancestors() {
        let candidate = dir.join("go.mod");
        if !candidate.is_file() {
            continue;
        }

        let contents = fs::read_to_string(&candidate)
            .with_context(|| format!("Failed reading `{}`", candidate.display()))?;
        let Some(module) = module_directive(&contents) else {
            bail!("`{}` has no module directive", candidate.display());
        };
        log::debug!("using go module {module} from {}", candidate.display());

        let mut import_path = module;
        for component in output.strip_prefix(dir)?.components() {
            if let Component::Normal(segment) = component {
                import_path.push('/');
                import_path.push_str(&segment.to_string_lossy());
            }
        }
        return Ok(import_path);
    }

    bail!(
        "No go.mod found in `{}` or any of its parents; set --go-module",
        output.display()
    )
}

fn module_directive(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .find_map(|line| {
            line.strip_prefix("module")
                .filter(|rest| rest.starts_with(char::is_whitespace))
        })
        .map(|module| module.trim().trim_matches('"').to_string())
        .filter(|module| !module.is_empty())
}
