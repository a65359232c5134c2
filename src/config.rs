use crate::error::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

pub const DEFAULT_ODD_NAME: &str = "odd.pdf";
pub const DEFAULT_EVEN_NAME: &str = "even.pdf";

/// Everything a pipeline run needs to know about its surroundings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// File name of the document collecting odd-index pages
    pub odd_name: String,
    /// File name of the document collecting even-index pages
    pub even_name: String,
    /// Only input files whose name matches are loaded
    pub include: Option<Regex>,
}

impl PipelineConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        PipelineConfig {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            odd_name: DEFAULT_ODD_NAME.to_string(),
            even_name: DEFAULT_EVEN_NAME.to_string(),
            include: None,
        }
    }

    pub fn odd_path(&self) -> PathBuf {
        self.output_dir.join(&self.odd_name)
    }

    pub fn even_path(&self) -> PathBuf {
        self.output_dir.join(&self.even_name)
    }

    /// Whether a listed input file should take part in the run
    pub fn includes(&self, file_name: &str) -> bool {
        self.include
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(file_name))
    }

    pub fn validate(&self) -> Result<()> {
        for name in [&self.odd_name, &self.even_name] {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(Error::Config(format!(
                    "output name must be a plain file name: {:?}",
                    name
                )));
            }
        }
        if same_dir(&self.input_dir, &self.output_dir) {
            return Err(Error::Config(format!(
                "output directory must differ from input directory {}",
                self.input_dir.display()
            )));
        }
        if self.odd_name == self.even_name {
            return Err(Error::Config(format!(
                "odd and even outputs share the name {:?}",
                self.odd_name
            )));
        }
        Ok(())
    }
}

/// Whether two paths name the same directory, resolving links when both exist
fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
