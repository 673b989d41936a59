use crate::error::Result;
use crate::markup::{markdown_to_html, shift_headings};
use crate::metrics::{extract_metrics, ARI_RAW, ARI_YEARS_EDUCATION, RANKED_METRICS};
use crate::slug::{bill_slug, bill_version_description};
use crate::stats::BillStats;
use crate::types::BillRecord;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A bill prepared for rendering
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedBill {
    pub record: BillRecord,
    pub ari_raw: f64,
    pub ari_years_education: u8,
    /// Metric name to its 1..=10 decile rank within the corpus
    pub deciles: IndexMap<String, u8>,
    /// Section-level mentions of the bill's entities, most frequent first
    pub entity_counts: Vec<(String, usize)>,
    pub summary_html: String,
    pub eli5_html: String,
    pub commentary_html: String,
    pub money_commentary_html: Option<String>,
    pub issues_html: Vec<String>,
    /// One entry per section, in section order
    pub section_summaries_html: Vec<String>,
    pub keyword_string: String,
    pub bill_version_description: String,
    pub timestamp: String,
    pub slug: String,
    pub pdf_url: String,
    pub json_url: String,
}

impl EnrichedBill {
    /// Decile rank of a metric, if ranked
    pub fn decile(&self, metric: &str) -> Option<u8> {
        self.deciles.get(metric).copied()
    }
}

/// Add decile ranks, rendered markup and derived fields to a bill
pub fn enrich_bill(record: BillRecord, stats: &BillStats, now: DateTime<Utc>) -> Result<EnrichedBill> {
    let metrics = extract_metrics(&record);

    let mut deciles = IndexMap::with_capacity(RANKED_METRICS.len());
    for metric in RANKED_METRICS {
        let value = metrics.get(metric).copied().unwrap_or(0.0);
        deciles.insert(metric.to_string(), stats.decile_rank(metric, value)?);
    }

    let slug = bill_slug(&record.legis_num, &record.title, &record.bill_version);

    Ok(EnrichedBill {
        ari_raw: metrics[ARI_RAW],
        ari_years_education: metrics[ARI_YEARS_EDUCATION] as u8,
        deciles,
        entity_counts: count_entities(&record),
        summary_html: markdown_to_html(&record.summary),
        eli5_html: markdown_to_html(&record.eli5),
        commentary_html: shift_headings(&markdown_to_html(&record.commentary)),
        money_commentary_html: record
            .money_commentary
            .as_deref()
            .map(|text| shift_headings(&markdown_to_html(text))),
        issues_html: record.issues.iter().map(|i| markdown_to_html(i)).collect(),
        section_summaries_html: record
            .sections
            .iter()
            .map(|s| markdown_to_html(&s.summary))
            .collect(),
        keyword_string: record.keywords.join(", "),
        bill_version_description: bill_version_description(&record.bill_version)
            .unwrap_or("Unknown")
            .to_string(),
        timestamp: now.to_rfc3339(),
        pdf_url: format!("{}.pdf", slug),
        json_url: format!("{}.json", slug),
        slug,
        record,
    })
}

/// Count section mentions of the bill-level entities
///
/// Matching ignores case and surrounding whitespace; counts are keyed by the
/// spelling used in the section.
pub fn count_entities(record: &BillRecord) -> Vec<(String, usize)> {
    let known: HashSet<String> = record
        .entities
        .iter()
        .map(|e| e.trim().to_lowercase())
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for section in &record.sections {
        for entity in &section.entities {
            if known.contains(&entity.trim().to_lowercase()) {
                *counts.entry(entity.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut counts: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(entity, count)| (entity.to_string(), count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
