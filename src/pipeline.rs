//! Odd/even page split across every document of an input directory.
//!
//! A run moves through [`Stage`]s in order: the input directory is listed,
//! every file is read and parsed concurrently, each document is padded and
//! its pages copied into parity buckets, the buckets are concatenated in
//! listing order, and finally the two output documents are assembled,
//! serialized and written. Any failure before the writes leaves the output
//! directory untouched.

use crate::aggregate::{aggregate, OutputPages, SourcePages};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::io;
use crate::parity::{classify, PageBuckets};
use crate::pdf::{copy_pages, PageCopy, PdfDocument};
use futures::future::try_join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Listing,
    Loading,
    Processing,
    Merging,
    Finalizing,
    Done,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub name: String,
    /// Page count before padding
    pub pages: usize,
    pub padded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSummary {
    pub path: PathBuf,
    pub pages: usize,
    pub bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub sources: Vec<SourceSummary>,
    pub odd: OutputSummary,
    pub even: OutputSummary,
}

/// How one source would be split, without copying anything
#[derive(Debug, Clone, Serialize)]
pub struct SourcePlan {
    pub name: String,
    pub pages: usize,
    pub buckets: PageBuckets,
}

pub struct Pipeline {
    config: PipelineConfig,
    stage: Stage,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Pipeline {
            config,
            stage: Stage::Listing,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Split every input document and write the two output documents
    pub async fn run(&mut self) -> Result<RunReport> {
        let result = self.execute().await;
        self.settle(result)
    }

    /// List and load the inputs and report how each would be split
    pub async fn plan(&mut self) -> Result<Vec<SourcePlan>> {
        let result = self.execute_plan().await;
        self.settle(result)
    }

    async fn execute(&mut self) -> Result<RunReport> {
        self.config.validate()?;

        self.enter(Stage::Listing);
        let files = self.list_inputs().await?;

        self.enter(Stage::Loading);
        let documents = load_all(&files).await?;

        self.enter(Stage::Processing);
        let (sources, buckets): (Vec<_>, Vec<_>) = documents
            .into_iter()
            .map(process_source)
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        self.enter(Stage::Merging);
        let pages = aggregate(buckets);
        debug!(
            odd = pages.odd.len(),
            even = pages.even.len(),
            "merged page buckets"
        );

        self.enter(Stage::Finalizing);
        let (odd, even) = self.finalize(pages).await?;

        self.enter(Stage::Done);
        Ok(RunReport { sources, odd, even })
    }

    async fn execute_plan(&mut self) -> Result<Vec<SourcePlan>> {
        self.enter(Stage::Listing);
        let files = self.list_inputs().await?;

        self.enter(Stage::Loading);
        let documents = load_all(&files).await?;

        self.enter(Stage::Processing);
        let plans = documents
            .into_iter()
            .map(|doc| {
                let pages = doc.page_count();
                SourcePlan {
                    name: doc.name,
                    pages,
                    buckets: classify(pages),
                }
            })
            .collect();

        self.enter(Stage::Done);
        Ok(plans)
    }

    async fn list_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut files = io::list_files(&self.config.input_dir).await?;
        files.retain(|path| {
            let keep = self.config.includes(&file_name(path));
            if !keep {
                debug!(file = %path.display(), "skipping input not matching filter");
            }
            keep
        });
        info!(
            dir = %self.config.input_dir.display(),
            count = files.len(),
            "listed input files"
        );
        Ok(files)
    }

    async fn finalize(
        &self,
        pages: OutputPages<PageCopy>,
    ) -> Result<(OutputSummary, OutputSummary)> {
        let mut odd_doc = PdfDocument::create(self.config.odd_name.as_str());
        let mut even_doc = PdfDocument::create(self.config.even_name.as_str());
        for page in pages.odd {
            odd_doc.add_page(page)?;
        }
        for page in pages.even {
            even_doc.add_page(page)?;
        }

        let odd_bytes = odd_doc.to_bytes()?;
        let even_bytes = even_doc.to_bytes()?;

        // Nothing on disk changes before this point
        io::ensure_dir(&self.config.output_dir).await?;

        let odd_path = self.config.odd_path();
        let even_path = self.config.even_path();
        tokio::try_join!(
            write_output(&odd_path, &odd_bytes),
            write_output(&even_path, &even_bytes)
        )?;

        Ok((
            OutputSummary {
                path: odd_path,
                pages: odd_doc.page_count(),
                bytes: odd_bytes.len(),
            },
            OutputSummary {
                path: even_path,
                pages: even_doc.page_count(),
                bytes: even_bytes.len(),
            },
        ))
    }

    fn enter(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "pipeline stage");
        self.stage = stage;
    }

    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            error!(stage = ?self.stage, error = %e, "pipeline failed");
            self.stage = Stage::Failed;
        }
        result
    }
}

/// Read and parse every file; results come back in the order of `files`
async fn load_all(files: &[PathBuf]) -> Result<Vec<PdfDocument>> {
    try_join_all(files.iter().map(|path| load_source(path))).await
}

async fn load_source(path: &Path) -> Result<PdfDocument> {
    let bytes = io::read_file(path).await?;
    let doc = PdfDocument::load_mem(file_name(path), &bytes)?;
    debug!(
        file = %path.display(),
        bytes = bytes.len(),
        pages = doc.page_count(),
        "loaded source"
    );
    Ok(doc)
}

fn process_source(mut doc: PdfDocument) -> Result<(SourceSummary, SourcePages<PageCopy>)> {
    let pages = doc.page_count();
    let buckets = classify(pages);
    if buckets.needs_padding {
        doc.append_blank_page()?;
    }

    let odd = copy_pages(&doc, &buckets.odd)?;
    let even = copy_pages(&doc, &buckets.even)?;
    debug!(
        file = %doc.name,
        pages,
        effective = buckets.effective_count(),
        "split source"
    );

    Ok((
        SourceSummary {
            name: doc.name,
            pages,
            padded: buckets.needs_padding,
        },
        SourcePages { odd, even },
    ))
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    io::write_file(path, bytes).await?;
    info!(file = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
