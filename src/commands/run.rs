use crate::commands::include_pattern;
use crate::config::PipelineConfig;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct RunOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub odd_name: String,
    pub even_name: String,
    pub include: Option<String>,
    pub json: bool,
}

pub async fn run(options: RunOptions) -> Result<()> {
    let config = PipelineConfig {
        include: include_pattern(options.include.as_deref())?,
        odd_name: options.odd_name,
        even_name: options.even_name,
        ..PipelineConfig::new(options.input_dir, options.output_dir)
    };

    let report = Pipeline::new(config.clone())
        .run()
        .await
        .with_context(|| format!("Failed to split PDFs in {}", config.input_dir.display()))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for output in [&report.odd, &report.even] {
        println!(
            "Wrote {} ({} page(s))",
            output.path.display(),
            output.pages
        );
    }

    let padded = report.sources.iter().filter(|s| s.padded).count();
    println!(
        "Split {} file(s); {} padded with a blank page",
        report.sources.len(),
        padded
    );

    Ok(())
}
