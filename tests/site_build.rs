use chrono::{DateTime, Utc};
use fbs::loader::{write_bill_file, BillFormat};
use fbs::metrics::{extract_metrics, MetricSet};
use fbs::prelude::*;
use fbs::render::StepOutcome;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn bill_json(legis_num: &str, title: &str, date: &str, scale: u64) -> Value {
    json!({
        "legis_num": legis_num,
        "title": title,
        "bill_version": "ih",
        "date": date,
        "text": "The full text.",
        "summary": "A summary.",
        "eli5": "It does *things*.",
        "commentary": "# Take\n\nSome commentary.",
        "issues": ["Cost"],
        "keywords": ["roads"],
        "num_pages": scale,
        "num_characters": 5000 * scale,
        "num_tokens": 1000 * scale,
        "num_sentences": 50 * scale,
        "num_sections": scale,
        "avg_token_length": 5.0,
        "avg_sentence_length": 20.0,
        "token_entropy": 8.0 + scale as f64,
        "entities": ["EPA"],
        "sections": [
            {"text": "Section text.", "summary": "Section *one*.", "entities": ["EPA"]}
        ]
    })
}

/// Writes a small corpus: two plain files, one gzip file and one broken file
fn write_corpus(bills_dir: &Path) {
    fs::create_dir_all(bills_dir.join("118")).unwrap();
    write_bill_file(
        &bills_dir.join("a.json"),
        &bill_json("H.R. 1", "Clean Water Act", "2024-01-05", 1),
        BillFormat::Json,
    )
    .unwrap();
    write_bill_file(
        &bills_dir.join("118/b.json.gz"),
        &bill_json("S. 2", "Roads and Bridges Act", "2024-02-10", 2),
        BillFormat::Gzip,
    )
    .unwrap();
    write_bill_file(
        &bills_dir.join("c.json"),
        &bill_json("H.R. 3", "Parks Act", "2024-02-20", 3),
        BillFormat::Json,
    )
    .unwrap();
    fs::write(bills_dir.join("broken.json"), b"{ not json").unwrap();
}

fn config_for(root: &Path) -> Config {
    ConfigBuilder::new(root.join("cache"))
        .bills_dir(root.join("bills"))
        .template_dir(templates_dir())
        .output_dir(root.join("dist"))
        .browser("fbs-no-such-browser-binary")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_build_site_writes_every_artifact() {
    let root = tempfile::tempdir().unwrap();
    write_corpus(&root.path().join("bills"));
    let config = config_for(root.path());
    let templates = Templates::new(&config.template_dir).unwrap();

    let report = SiteBuilder::new(&config, &templates).build(now()).await.unwrap();
    assert_eq!(report.bills, 3);
    assert_eq!(report.months, 2);

    let dist = &config.output_dir;
    for name in [
        "index.html",
        "index-2024-01.html",
        "index-2024-02.html",
        "about.html",
        "privacy.html",
        "sitemap.xml",
        "robots.txt",
        "index.json",
    ] {
        assert!(dist.join(name).is_file(), "missing {}", name);
    }

    let index = fs::read_to_string(dist.join("index.html")).unwrap();
    assert!(index.contains("<p class=\"total\">3 bills</p>"));
    assert!(index.contains("February 2024"));
    assert!(index.contains("hr-1-ih-clean-water-act.html"));
    assert!(!index.contains("{{"));

    let february = fs::read_to_string(dist.join("index-2024-02.html")).unwrap();
    let parks = february.find("Parks Act").unwrap();
    let roads = february.find("Roads and Bridges Act").unwrap();
    assert!(parks < roads, "newest bill comes first");
    assert!(!february.contains("Clean Water Act"));

    let entries: Value = serde_json::from_str(&fs::read_to_string(dist.join("index.json")).unwrap()).unwrap();
    let slugs: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["slug"].as_str().unwrap())
        .collect();
    assert_eq!(
        slugs,
        vec!["hr-3-ih-parks-act", "s-2-ih-roads-and-bridges-act", "hr-1-ih-clean-water-act"]
    );
    assert!(entries[0].get("text").is_none());
    assert!(entries[0]["sections"][0].get("text").is_none());

    let sitemap = fs::read_to_string(dist.join("sitemap.xml")).unwrap();
    assert_eq!(sitemap.matches("<url>").count(), 1 + 2 + 3);
    assert!(sitemap.contains("<loc>https://usbills.ai/index-2024-02.html</loc>"));
}

#[tokio::test]
async fn test_build_site_leaves_out_bills_without_slug() {
    let root = tempfile::tempdir().unwrap();
    let bills_dir = root.path().join("bills");
    write_corpus(&bills_dir);
    write_bill_file(
        &bills_dir.join("untitled.json"),
        &json!({"legis_num": "", "title": null, "date": "2024-02-25"}),
        BillFormat::Json,
    )
    .unwrap();
    let config = config_for(root.path());
    let templates = Templates::new(&config.template_dir).unwrap();

    let report = SiteBuilder::new(&config, &templates).build(now()).await.unwrap();
    assert_eq!(report.bills, 3);

    let index = fs::read_to_string(config.output_dir.join("index.json")).unwrap();
    assert!(!index.contains("\"slug\": \"\""));
    let sitemap = fs::read_to_string(config.output_dir.join("sitemap.xml")).unwrap();
    assert!(!sitemap.contains("usbills.ai/.html"));
}

#[tokio::test]
async fn test_build_site_requires_templates() {
    let root = tempfile::tempdir().unwrap();
    write_corpus(&root.path().join("bills"));
    let mut config = config_for(root.path());
    config.template_dir = root.path().join("no-templates");
    let templates = Templates::new(&config.template_dir).unwrap();

    let result = SiteBuilder::new(&config, &templates).build(now()).await;
    assert!(matches!(result, Err(Error::TemplateNotFound(_))));
}

#[tokio::test]
async fn test_render_all_bills_and_no_overwrite() {
    let root = tempfile::tempdir().unwrap();
    write_corpus(&root.path().join("bills"));
    let config = config_for(root.path());

    let bills = BillCorpus::new(&config.bills_dir).load_all().await.unwrap();
    assert_eq!(bills.len(), 3);
    let metrics: Vec<MetricSet> = bills.iter().map(extract_metrics).collect();
    let stats = BillStats::from_metrics(&metrics).unwrap();
    let templates = Templates::new(&config.template_dir).unwrap();
    let renderer = BillRenderer::new(&config, &stats, &templates);

    let summary = renderer.render_all(now()).await.unwrap();
    assert_eq!(summary.rendered, 3);
    assert_eq!(summary.failed, 1);

    let page_path = config.output_dir.join("s-2-ih-roads-and-bridges-act.html");
    let page = fs::read_to_string(&page_path).unwrap();
    assert!(page.contains("<title>S. 2: Roads and Bridges Act</title>"));
    assert!(page.contains("Introduced in House"));
    assert!(page.contains("<h2>Take</h2>"));
    assert!(page.contains("<table class=\"metrics\">"));
    assert!(!page.contains("{{"));

    // the JSON copy of a gzip input is decompressed
    let copy: Value = serde_json::from_slice(
        &fs::read(config.output_dir.join("s-2-ih-roads-and-bridges-act.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(copy["legis_num"], "S. 2");

    fs::write(&page_path, "edited").unwrap();
    let result = renderer
        .render_file(&config.bills_dir.join("118/b.json.gz"), now())
        .await
        .unwrap();
    assert_eq!(result.html, StepOutcome::Skipped);
    assert_eq!(result.json, StepOutcome::Skipped);
    assert_eq!(fs::read_to_string(&page_path).unwrap(), "edited");
}

#[test]
fn test_cli_calculate_stats() {
    let root = tempfile::tempdir().unwrap();
    let bills_dir = root.path().join("bills");
    write_corpus(&bills_dir);
    let stats_path = root.path().join("out").join("stats.json");

    let output = Command::new(env!("CARGO_BIN_EXE_fbs"))
        .arg("calculate-stats")
        .arg("--path")
        .arg(&bills_dir)
        .arg("--stats-path")
        .arg(&stats_path)
        .env("HOME", root.path())
        .env("RUST_LOG", "info")
        .current_dir(root.path())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stats = BillStats::load(&stats_path).unwrap();
    assert_eq!(stats.corpus_size(), 3);
    let tokens = stats.get("num_tokens").unwrap();
    assert_eq!(tokens.min, 1000.0);
    assert_eq!(tokens.max, 3000.0);
    assert_eq!(tokens.median, 2000.0);
    assert_eq!(stats.decile_rank("num_tokens", 1000.0).unwrap(), 1);
    assert_eq!(stats.decile_rank("num_tokens", 3000.0).unwrap(), 10);

    assert!(root.path().join("logs").join("fbs.log").is_file());
}
