use crate::commands::include_pattern;
use crate::config::PipelineConfig;
use crate::pipeline::Pipeline;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub async fn run(input_dir: PathBuf, include: Option<&str>, json: bool) -> Result<()> {
    let mut config = PipelineConfig::new(&input_dir, PathBuf::new());
    config.include = include_pattern(include)?;

    let plans = Pipeline::new(config)
        .plan()
        .await
        .with_context(|| format!("Failed to inspect PDFs in {}", input_dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
        return Ok(());
    }

    if plans.is_empty() {
        println!("No input files found.");
        return Ok(());
    }

    for plan in &plans {
        let padding = if plan.buckets.needs_padding {
            " (+1 blank)"
        } else {
            ""
        };
        println!("{}: {} page(s){}", plan.name, plan.pages, padding);
        println!("  odd:  {}", format_indices(&plan.buckets.odd));
        println!("  even: {}", format_indices(&plan.buckets.even));
    }

    Ok(())
}

fn format_indices(indices: &[usize]) -> String {
    if indices.is_empty() {
        return "-".to_string();
    }
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
