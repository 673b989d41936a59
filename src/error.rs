use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("File path error: {0}")]
    Path(String),

    #[error("Unrecognized bill file format: {0}")]
    UnknownFormat(String),

    #[error("Cannot aggregate statistics over an empty corpus")]
    EmptyCorpus,

    #[error("Metric '{metric}' missing from bill #{index}")]
    MissingMetric { metric: String, index: usize },

    #[error("Metric '{0}' missing from bill statistics")]
    MissingStat(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("No slug can be derived for bill {0}: legis_num, title and bill_version are empty")]
    EmptySlug(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),
}
