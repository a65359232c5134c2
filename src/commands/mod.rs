pub mod plan;
pub mod run;

use anyhow::{Context, Result};
use regex::Regex;

/// Compile an optional `--include` pattern
fn include_pattern(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).with_context(|| format!("Invalid include pattern: {}", p)))
        .transpose()
}
