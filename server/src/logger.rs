use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};

/// Logs to stderr at `level`, and everything to `path` when one is given.
pub fn create_logger(path: Option<&Path>, level: LevelFilter) -> Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = path {
        let name = path.display().to_string();
        let error_message = format!("Failed to create log file name: {name}");

        let file = File::create(path).context(error_message)?;
        loggers.push(WriteLogger::new(LevelFilter::max(), Config::default(), file));
    }

    CombinedLogger::init(loggers)?;

    Ok(())
}
