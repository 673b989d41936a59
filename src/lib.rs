//! Static site generator for parsed legislative bill analyses.
//!
//! This library loads bill records (plain or gzip JSON) from a cache
//! directory, computes corpus statistics and decile ranks for readability and
//! size metrics, and renders per-bill HTML/PDF pages, index pages, a sitemap
//! and a machine-readable index.

pub mod config;
pub mod enrich;
pub mod error;
pub mod html;
pub mod loader;
pub mod logging;
pub mod markup;
pub mod metrics;
pub mod migrate;
pub mod pdf;
pub mod readability;
pub mod render;
pub mod site;
pub mod slug;
pub mod stats;
pub mod template;
pub mod types;

pub use config::{Config, ConfigBuilder, FileConfig};
pub use enrich::{enrich_bill, EnrichedBill};
pub use error::{Error, Result};
pub use loader::{BillCorpus, BillFormat};
pub use metrics::{extract_metrics, MetricSet};
pub use render::{BillRender, BillRenderer, RenderSummary, StepOutcome};
pub use site::{group_bills_by_month, SiteBuilder, SiteReport};
pub use stats::{BillStats, MetricStats};
pub use template::Templates;
pub use types::{BillGroup, BillRecord, BillSection, BillSummary};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::{Config, ConfigBuilder, FileConfig};
    pub use crate::error::{Error, Result};
    pub use crate::loader::BillCorpus;
    pub use crate::render::BillRenderer;
    pub use crate::site::SiteBuilder;
    pub use crate::stats::BillStats;
    pub use crate::template::Templates;
    pub use crate::types::{BillGroup, BillRecord, BillSummary};
    pub use futures::StreamExt;
}
