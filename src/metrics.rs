use crate::readability::{ari_raw, ari_years_education};
use crate::types::BillRecord;
use indexmap::IndexMap;

/// Raw numeric fields copied from every bill, in persisted order
pub const RAW_METRICS: [&str; 14] = [
    "num_characters",
    "num_tokens",
    "num_sentences",
    "num_sections",
    "num_nouns",
    "num_verbs",
    "num_adjectives",
    "num_adverbs",
    "num_punctuations",
    "num_numbers",
    "num_entities",
    "avg_token_length",
    "avg_sentence_length",
    "token_entropy",
];

pub const ARI_RAW: &str = "ari_raw";
pub const ARI_YEARS_EDUCATION: &str = "ari_years_education";

/// Metrics that get a decile rank on the bill page
pub const RANKED_METRICS: [&str; 9] = [
    "num_characters",
    "num_tokens",
    "num_sentences",
    "num_sections",
    "avg_token_length",
    "avg_sentence_length",
    "token_entropy",
    ARI_RAW,
    ARI_YEARS_EDUCATION,
];

/// Metric name to value for a single bill
pub type MetricSet = IndexMap<String, f64>;

/// Extract the metric set of a bill
///
/// Missing fields count as zero; the two readability scores are derived from
/// the character, token and sentence counts.
pub fn extract_metrics(record: &BillRecord) -> MetricSet {
    let mut metrics: MetricSet = RAW_METRICS
        .iter()
        .map(|name| (name.to_string(), record.metrics.get(name).unwrap_or(0.0)))
        .collect();

    let raw = ari_raw(
        metrics["num_characters"],
        metrics["num_tokens"],
        metrics["num_sentences"],
    );
    metrics.insert(ARI_RAW.to_string(), raw);
    metrics.insert(
        ARI_YEARS_EDUCATION.to_string(),
        f64::from(ari_years_education(raw)),
    );

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: serde_json::Value) -> BillRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extracts_all_fields_in_order() {
        let metrics = extract_metrics(&record(serde_json::json!({
            "num_characters": 5000,
            "num_tokens": 1000,
            "num_sentences": 50,
            "token_entropy": 7.25
        })));

        let keys: Vec<&str> = metrics.keys().map(String::as_str).collect();
        let mut expected: Vec<&str> = RAW_METRICS.to_vec();
        expected.push(ARI_RAW);
        expected.push(ARI_YEARS_EDUCATION);
        assert_eq!(keys, expected);

        assert_eq!(metrics["num_tokens"], 1000.0);
        assert_eq!(metrics["token_entropy"], 7.25);
        // 4.71 * 5 + 0.5 * 20 - 21.43
        assert!((metrics[ARI_RAW] - 12.12).abs() < 1e-9);
        assert_eq!(metrics[ARI_YEARS_EDUCATION], 13.0);
    }

    #[test]
    fn test_missing_tokens_default_to_zero() {
        let metrics = extract_metrics(&record(serde_json::json!({
            "num_characters": 120,
            "num_sentences": 3
        })));

        assert_eq!(metrics["num_tokens"], 0.0);
        assert_eq!(metrics["num_nouns"], 0.0);
        assert_eq!(metrics[ARI_RAW], 0.0);
        assert_eq!(metrics[ARI_YEARS_EDUCATION], 1.0);
    }
}
