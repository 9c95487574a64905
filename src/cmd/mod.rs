//! CLI subcommand implementations.

pub mod classify;
pub mod replay;
pub mod scan;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Read a file argument, with `-` meaning stdin.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}
