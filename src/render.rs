use crate::config::Config;
use crate::enrich::enrich_bill;
use crate::error::{Error, Result};
use crate::html::bill_context;
use crate::loader::{read_bill_json, BillCorpus};
use crate::pdf::render_pdf;
use crate::site::output_path;
use crate::stats::BillStats;
use crate::template::{Templates, BILL_TEMPLATE};
use crate::types::BillRecord;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// What happened to one output of a bill render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Written,
    /// The output already existed and was left untouched
    Skipped,
    Failed,
}

/// Outcome of rendering one bill file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRender {
    pub slug: String,
    pub html: StepOutcome,
    pub pdf: StepOutcome,
    pub json: StepOutcome,
}

/// Counts from a render-all run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub rendered: usize,
    pub failed: usize,
}

/// Renders bill pages, their PDF exports and JSON copies into the output
/// directory
pub struct BillRenderer<'a> {
    config: &'a Config,
    stats: &'a BillStats,
    templates: &'a Templates,
}

impl<'a> BillRenderer<'a> {
    pub fn new(config: &'a Config, stats: &'a BillStats, templates: &'a Templates) -> Self {
        Self {
            config,
            stats,
            templates,
        }
    }

    /// Render the bill page for an already decoded record
    pub fn render_html(&self, record: BillRecord, now: DateTime<Utc>) -> Result<String> {
        let bill = enrich_bill(record, self.stats, now)?;
        self.templates.render(BILL_TEMPLATE, &bill_context(&bill))
    }

    /// Render one bill file to `<slug>.html`, `<slug>.pdf` and `<slug>.json`
    ///
    /// Outputs that already exist are never overwritten.
    pub async fn render_file(&self, input_path: &Path, now: DateTime<Utc>) -> Result<BillRender> {
        let json = read_bill_json(input_path)?;
        let record: BillRecord = serde_json::from_slice(&json)?;
        let slug = crate::slug::bill_slug(&record.legis_num, &record.title, &record.bill_version);
        if slug.is_empty() {
            tracing::error!("No slug for {}, skipping", input_path.display());
            return Err(Error::EmptySlug(input_path.display().to_string()));
        }

        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir)?;
        let html_path = output_path(output_dir, &slug, "html");
        let pdf_path = output_path(output_dir, &slug, "pdf");
        let json_path = output_path(output_dir, &slug, "json");

        let html = if html_path.exists() {
            tracing::warn!("Output HTML exists: {}", html_path.display());
            StepOutcome::Skipped
        } else {
            tracing::info!("Rendering {}", html_path.display());
            let page = self.render_html(record, now)?;
            std::fs::write(&html_path, page)?;
            StepOutcome::Written
        };

        let pdf = if pdf_path.exists() {
            tracing::warn!("Output PDF exists: {}", pdf_path.display());
            StepOutcome::Skipped
        } else if render_pdf(self.config, &html_path, &pdf_path).await {
            StepOutcome::Written
        } else {
            StepOutcome::Failed
        };

        let json = if json_path.exists() {
            tracing::warn!("Output JSON exists: {}", json_path.display());
            StepOutcome::Skipped
        } else {
            tracing::info!("Copying JSON to {}", json_path.display());
            std::fs::write(&json_path, &json)?;
            StepOutcome::Written
        };

        Ok(BillRender {
            slug,
            html,
            pdf,
            json,
        })
    }

    /// Render every file in the bills directory, logging failures and
    /// continuing with the next file
    pub async fn render_all(&self, now: DateTime<Utc>) -> Result<RenderSummary> {
        let corpus = BillCorpus::new(&self.config.bills_dir);
        let files: Vec<PathBuf> = tokio::task::spawn_blocking(move || corpus.discover())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Task join error: {}", e),
                ))
            })??
            .into_iter()
            .map(|file| file.path)
            .collect();

        let mut summary = RenderSummary::default();
        for path in files {
            tracing::info!("Rendering {}", path.display());
            match self.render_file(&path, now).await {
                Ok(_) => summary.rendered += 1,
                Err(e) => {
                    tracing::error!("Error rendering {}: {}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Rendered {} bills ({} failed)",
            summary.rendered,
            summary.failed
        );
        Ok(summary)
    }
}
