//! Corpus-wide statistics and decile ranking.
//!
//! Statistics are computed once by `calculate-stats` and persisted as JSON.
//! Every render pass loads them into a [`BillStats`] handle, which recomputes
//! the decile boundaries used to rank a bill against the corpus.

use crate::error::{Error, Result};
use crate::metrics::MetricSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of boundaries splitting a metric into ten buckets
pub const DECILE_COUNT: usize = 9;

/// Aggregate statistics for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Per-bill values in corpus order
    pub values: Vec<f64>,
    /// Recomputed from `values` on load, never persisted
    #[serde(skip)]
    pub deciles: [f64; DECILE_COUNT],
}

/// Metric name to aggregate statistics
pub type AggregateStats = IndexMap<String, MetricStats>;

/// Aggregate per-bill metric sets into corpus statistics
///
/// Every metric of the first set is aggregated. A later set missing one of
/// those metrics is an error: skipping it would silently skew the deciles.
pub fn aggregate(metrics: &[MetricSet]) -> Result<AggregateStats> {
    let first = metrics.first().ok_or(Error::EmptyCorpus)?;

    let mut stats = AggregateStats::with_capacity(first.len());
    for metric in first.keys() {
        let values = metrics
            .iter()
            .enumerate()
            .map(|(index, set)| {
                set.get(metric).copied().ok_or_else(|| Error::MissingMetric {
                    metric: metric.clone(),
                    index,
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        stats.insert(metric.clone(), MetricStats::from_values(values)?);
    }

    Ok(stats)
}

impl MetricStats {
    /// Summarize a non-empty list of values
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        let sorted = sorted(&values);
        if sorted.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let n = sorted.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Ok(Self {
            mean,
            median,
            min: sorted[0],
            max: sorted[n - 1],
            deciles: boundaries_of_sorted(&sorted),
            values,
        })
    }
}

/// Nine decile boundaries using the inclusive quantile method
///
/// Boundaries interpolate linearly between order statistics, treating the
/// minimum and maximum as the 0th and 100th percentiles.
pub fn decile_boundaries(values: &[f64]) -> Result<[f64; DECILE_COUNT]> {
    if values.is_empty() {
        return Err(Error::EmptyCorpus);
    }
    Ok(boundaries_of_sorted(&sorted(values)))
}

fn boundaries_of_sorted(sorted: &[f64]) -> [f64; DECILE_COUNT] {
    const BUCKETS: usize = DECILE_COUNT + 1;

    let mut boundaries = [sorted[0]; DECILE_COUNT];
    if sorted.len() == 1 {
        return boundaries;
    }

    let m = sorted.len() - 1;
    for (i, boundary) in boundaries.iter_mut().enumerate() {
        let position = (i + 1) * m;
        let j = position / BUCKETS;
        let delta = (position % BUCKETS) as f64;
        *boundary = (sorted[j] * (BUCKETS as f64 - delta) + sorted[j + 1] * delta) / BUCKETS as f64;
    }
    boundaries
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Bucket (1..=10) of `value` given ascending decile boundaries
///
/// The first boundary the value does not exceed decides the bucket, so a
/// value equal to a boundary lands in the lower bucket.
pub fn decile_number(value: f64, deciles: &[f64]) -> u8 {
    for (i, decile) in deciles.iter().enumerate() {
        if value <= *decile {
            return i as u8 + 1;
        }
    }
    10
}

/// Read-only statistics handle shared by render passes
#[derive(Debug, Clone, PartialEq)]
pub struct BillStats {
    metrics: AggregateStats,
}

impl BillStats {
    /// Build statistics from per-bill metric sets
    pub fn from_metrics(metrics: &[MetricSet]) -> Result<Self> {
        Ok(Self {
            metrics: aggregate(metrics)?,
        })
    }

    /// Load a statistics file written by [`BillStats::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            tracing::error!("Statistics file not readable: {}: {}", path.display(), e);
            Error::Io(e)
        })?;
        let mut metrics: AggregateStats = serde_json::from_str(&contents).map_err(|e| {
            tracing::error!("Invalid JSON in statistics file: {}: {}", path.display(), e);
            Error::Json(e)
        })?;

        for (name, stats) in metrics.iter_mut() {
            stats.deciles = decile_boundaries(&stats.values).map_err(|_| {
                Error::Config(format!(
                    "Metric '{}' in {} has no values",
                    name,
                    path.display()
                ))
            })?;
        }

        tracing::debug!("Loaded statistics for {} metrics from {}", metrics.len(), path.display());
        Ok(Self { metrics })
    }

    /// Write the statistics as pretty JSON, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.metrics)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Statistics of a metric
    pub fn get(&self, metric: &str) -> Option<&MetricStats> {
        self.metrics.get(metric)
    }

    /// All metrics in persisted order
    pub fn metrics(&self) -> &AggregateStats {
        &self.metrics
    }

    /// Number of bills the statistics were computed over
    pub fn corpus_size(&self) -> usize {
        self.metrics.values().next().map_or(0, |s| s.values.len())
    }

    /// Decile bucket of `value` for `metric`
    pub fn decile_rank(&self, metric: &str, value: f64) -> Result<u8> {
        let stats = self
            .get(metric)
            .ok_or_else(|| Error::MissingStat(metric.to_string()))?;
        Ok(decile_number(value, &stats.deciles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric_set(pairs: &[(&str, f64)]) -> MetricSet {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn tens() -> Vec<f64> {
        (1..=10).map(|i| (i * 10) as f64).collect()
    }

    #[test]
    fn test_aggregate_ten_bills() {
        let sets: Vec<MetricSet> = tens()
            .into_iter()
            .map(|v| metric_set(&[("num_tokens", v)]))
            .collect();

        let stats = aggregate(&sets).unwrap();
        let tokens = &stats["num_tokens"];
        assert_eq!(tokens.mean, 55.0);
        assert_eq!(tokens.median, 55.0);
        assert_eq!(tokens.min, 10.0);
        assert_eq!(tokens.max, 100.0);
        assert_eq!(tokens.values, tens());
        assert_eq!(
            tokens.deciles,
            [19.0, 28.0, 37.0, 46.0, 55.0, 64.0, 73.0, 82.0, 91.0]
        );
    }

    #[test]
    fn test_bucket_examples() {
        let deciles = decile_boundaries(&tens()).unwrap();
        assert_eq!(decile_number(10.0, &deciles), 1);
        assert_eq!(decile_number(19.0, &deciles), 1);
        assert_eq!(decile_number(46.0, &deciles), 4);
        assert_eq!(decile_number(47.0, &deciles), 5);
        assert_eq!(decile_number(91.0, &deciles), 9);
        assert_eq!(decile_number(100.0, &deciles), 10);
    }

    #[test]
    fn test_aggregate_single_bill() {
        let sets = vec![metric_set(&[("num_tokens", 42.0), ("token_entropy", 3.5)])];
        let stats = aggregate(&sets).unwrap();

        for (value, metric) in [(42.0, "num_tokens"), (3.5, "token_entropy")] {
            let s = &stats[metric];
            assert_eq!((s.mean, s.median, s.min, s.max), (value, value, value, value));
            assert_eq!(s.deciles, [value; DECILE_COUNT]);
            assert_eq!(decile_number(value, &s.deciles), 1);
        }
    }

    #[test]
    fn test_aggregate_keeps_first_set_order() {
        let sets = vec![
            metric_set(&[("b", 1.0), ("a", 2.0)]),
            metric_set(&[("a", 4.0), ("b", 3.0), ("extra", 9.0)]),
        ];
        let stats = aggregate(&sets).unwrap();
        let keys: Vec<&str> = stats.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(stats["a"].values, vec![2.0, 4.0]);
    }

    #[test]
    fn test_aggregate_empty_is_error() {
        assert!(matches!(aggregate(&[]), Err(Error::EmptyCorpus)));
        assert!(matches!(decile_boundaries(&[]), Err(Error::EmptyCorpus)));
    }

    #[test]
    fn test_aggregate_missing_metric_is_fatal() {
        let sets = vec![
            metric_set(&[("num_tokens", 1.0), ("num_verbs", 1.0)]),
            metric_set(&[("num_tokens", 2.0)]),
        ];
        match aggregate(&sets) {
            Err(Error::MissingMetric { metric, index }) => {
                assert_eq!(metric, "num_verbs");
                assert_eq!(index, 1);
            }
            other => panic!("expected MissingMetric, got {:?}", other),
        }
    }

    #[test]
    fn test_even_median_averages_middle_values() {
        let stats = MetricStats::from_values(vec![4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.values, vec![4.0, 1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_deciles_sorted_and_bracket_median() {
        let samples: Vec<Vec<f64>> = vec![
            vec![5.0],
            vec![3.0, 1.0],
            vec![9.0, 2.0, 2.0, 7.5, 0.25, 14.0, 3.0],
            (0..97).map(|i| ((i * 37) % 101) as f64 / 3.0).collect(),
        ];

        for values in samples {
            let deciles = decile_boundaries(&values).unwrap();
            assert_eq!(deciles.len(), DECILE_COUNT);
            assert!(deciles.windows(2).all(|w| w[0] <= w[1]));

            let median = MetricStats::from_values(values.clone()).unwrap().median;
            assert!(deciles[0] <= median && median <= deciles[DECILE_COUNT - 1]);
        }
    }

    #[test]
    fn test_bucket_monotonic_and_in_range() {
        let deciles = decile_boundaries(&[1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0]).unwrap();
        let mut previous = 1;
        for step in -20..300 {
            let bucket = decile_number(step as f64 / 10.0, &deciles);
            assert!((1..=10).contains(&bucket));
            assert!(bucket >= previous);
            previous = bucket;
        }
    }

    #[test]
    fn test_save_then_load_recomputes_deciles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stats.json");

        let sets: Vec<MetricSet> = tens()
            .into_iter()
            .map(|v| metric_set(&[("num_tokens", v), ("ari_raw", v / 10.0)]))
            .collect();
        let stats = BillStats::from_metrics(&sets).unwrap();
        stats.save(&path).unwrap();

        let persisted: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(persisted["num_tokens"].get("deciles").is_none());
        assert_eq!(persisted["num_tokens"]["values"].as_array().unwrap().len(), 10);

        let loaded = BillStats::load(&path).unwrap();
        assert_eq!(loaded, stats);
        assert_eq!(loaded.corpus_size(), 10);
        assert_eq!(loaded.decile_rank("num_tokens", 100.0).unwrap(), 10);
        assert!(matches!(
            loaded.decile_rank("num_nouns", 1.0),
            Err(Error::MissingStat(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            BillStats::load(&dir.path().join("stats.json")),
            Err(Error::Io(_))
        ));
    }
}
