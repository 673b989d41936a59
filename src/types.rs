use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Read an explicit `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A parsed bill analysis record as produced by the upstream parsing pipeline
///
/// Only the fields the generator reads are typed; everything else is kept in
/// `extra` so the record can be written back out unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub legis_num: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bill_version: String,
    /// Publication date, YYYY-MM-DD
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub eli5: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub commentary: String,
    #[serde(default)]
    pub money_commentary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_pages: Option<Number>,
    #[serde(flatten)]
    pub metrics: RecordMetrics,

    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<BillSection>,

    /// Fields not interpreted by the generator
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One section of a bill
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<String>,
    #[serde(flatten)]
    pub metrics: RecordMetrics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw numeric fields shared by bills and sections
///
/// Absent and null values both read as `None`. Numbers keep their JSON
/// representation so integer counts are written back as integers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_characters: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_tokens: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_sentences: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_sections: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_nouns: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_verbs: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_adjectives: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_adverbs: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_punctuations: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_numbers: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_entities: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_token_length: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_sentence_length: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_entropy: Option<Number>,
}

impl RecordMetrics {
    /// Look up a raw metric by its field name
    pub fn get(&self, name: &str) -> Option<f64> {
        let field = match name {
            "num_characters" => &self.num_characters,
            "num_tokens" => &self.num_tokens,
            "num_sentences" => &self.num_sentences,
            "num_sections" => &self.num_sections,
            "num_nouns" => &self.num_nouns,
            "num_verbs" => &self.num_verbs,
            "num_adjectives" => &self.num_adjectives,
            "num_adverbs" => &self.num_adverbs,
            "num_punctuations" => &self.num_punctuations,
            "num_numbers" => &self.num_numbers,
            "num_entities" => &self.num_entities,
            "avg_token_length" => &self.avg_token_length,
            "avg_sentence_length" => &self.avg_sentence_length,
            "token_entropy" => &self.token_entropy,
            _ => return None,
        };
        field.as_ref().and_then(Number::as_f64)
    }
}

/// Bill card shown on the index pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillSummary {
    pub legis_num: String,
    pub title: String,
    pub date: String,
    pub num_pages: f64,
    pub num_sections: f64,
    pub num_tokens: f64,
    /// `eli5` rendered to HTML
    pub eli5: String,
    pub slug: String,
}

/// Bills published in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillGroup {
    /// YYYY-MM
    pub year_month: String,
    /// e.g. "January 2024"
    pub month_name: String,
    /// Sorted by date, newest first
    pub bills: Vec<BillSummary>,
}

/// A bill file discovered in the cache directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillFile {
    pub path: std::path::PathBuf,
    /// Path relative to the bills directory, used for logging and ordering
    pub relative_path: String,
}
