use crate::config::Config;
use crate::error::{Error, Result};
use crate::html::{archive_list, month_sections, ArchiveLink};
use crate::loader::{BillCorpus, BillDocument};
use crate::markup::{escape_html, markdown_to_html};
use crate::slug::bill_slug;
use crate::template::{Context, Templates, ABOUT_TEMPLATE, INDEX_TEMPLATE, PRIVACY_TEMPLATE};
use crate::types::{BillGroup, BillRecord, BillSummary};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Number of months shown in full on the main index
pub const RECENT_MONTHS: usize = 3;

/// Fields dropped from every bill and section in `index.json`
const LONG_TEXT_FIELDS: [&str; 3] = ["text", "html", "markdown"];

/// Parse a bill's YYYY-MM-DD publication date
pub fn parse_bill_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| Error::InvalidDate(date.to_string()))
}

/// Index card data for one bill
pub fn bill_summary(record: &BillRecord) -> BillSummary {
    let metric = |name: &str| record.metrics.get(name).unwrap_or(0.0);
    BillSummary {
        legis_num: record.legis_num.clone(),
        title: record.title.clone(),
        date: record.date.clone(),
        num_pages: record
            .num_pages
            .as_ref()
            .and_then(|n| n.as_f64())
            .unwrap_or(0.0),
        num_sections: metric("num_sections"),
        num_tokens: metric("num_tokens"),
        eli5: markdown_to_html(&record.eli5),
        slug: bill_slug(&record.legis_num, &record.title, &record.bill_version),
    }
}

/// Group bills by publication month, keyed `YYYY-MM`
///
/// Bills inside a group are ordered newest first; bills sharing a date keep
/// their input order.
pub fn group_bills_by_month(bills: &[BillRecord]) -> Result<BTreeMap<String, BillGroup>> {
    let mut groups: BTreeMap<String, BillGroup> = BTreeMap::new();

    for bill in bills {
        let date = parse_bill_date(&bill.date)?;
        let year_month = date.format("%Y-%m").to_string();

        groups
            .entry(year_month.clone())
            .or_insert_with(|| BillGroup {
                month_name: date.format("%B %Y").to_string(),
                year_month,
                bills: Vec::new(),
            })
            .bills
            .push(bill_summary(bill));
    }

    for group in groups.values_mut() {
        group.bills.sort_by(|a, b| b.date.cmp(&a.date));
    }

    Ok(groups)
}

/// Placeholder values for the main index
///
/// The most recent months are shown in full; older months become archive
/// links to their own index page.
pub fn main_index_context(groups: &BTreeMap<String, BillGroup>, now: DateTime<Utc>) -> Context {
    let newest_first: Vec<&BillGroup> = groups.values().rev().collect();
    let (recent, older) = newest_first.split_at(newest_first.len().min(RECENT_MONTHS));

    let total_bills: usize = recent.iter().map(|g| g.bills.len()).sum();
    let archives: Vec<ArchiveLink> = older
        .iter()
        .map(|g| ArchiveLink {
            year_month: g.year_month.clone(),
            month_name: g.month_name.clone(),
            count: g.bills.len(),
        })
        .collect();

    let mut context = Context::new();
    context.insert(
        "bills",
        month_sections(recent.iter().map(|g| (g.month_name.as_str(), g.bills.as_slice()))),
    );
    context.insert("archives", archive_list(&archives));
    context.insert("total_bills", total_bills.to_string());
    context.insert("timestamp", now.to_rfc3339());
    context
}

/// Placeholder values for one month's index page
pub fn month_index_context(group: &BillGroup, now: DateTime<Utc>) -> Context {
    let mut context = Context::new();
    context.insert(
        "bills",
        month_sections([(group.month_name.as_str(), group.bills.as_slice())]),
    );
    context.insert("archives", String::new());
    context.insert("total_bills", group.bills.len().to_string());
    context.insert("timestamp", now.to_rfc3339());
    context
}

fn sitemap_url(loc: &str, lastmod: &str, changefreq: &str, priority: &str) -> String {
    format!(
        "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
        escape_html(loc),
        escape_html(lastmod),
        changefreq,
        priority
    )
}

/// Build `sitemap.xml`
///
/// `bills` are listed in the order given, after the homepage and the month
/// indexes (newest month first).
pub fn sitemap_xml(
    bills: &[BillRecord],
    groups: &BTreeMap<String, BillGroup>,
    base_domain: &str,
    today: NaiveDate,
) -> String {
    let today = today.format("%Y-%m-%d").to_string();
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );

    xml.push_str(&sitemap_url(base_domain, &today, "daily", "1.0"));

    for year_month in groups.keys().rev() {
        let loc = format!("{}index-{}.html", base_domain, year_month);
        xml.push_str(&sitemap_url(&loc, &today, "weekly", "0.9"));
    }

    for bill in bills {
        let slug = bill_slug(&bill.legis_num, &bill.title, &bill.bill_version);
        let loc = format!("{}{}.html", base_domain, slug);
        xml.push_str(&sitemap_url(&loc, &bill.date, "weekly", "0.8"));
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Build `robots.txt`: allow every crawler and point at the sitemap
pub fn robots_txt(base_domain: &str) -> String {
    format!("User-Agent: *\nSitemap: {}sitemap.xml\nDisallow:", base_domain)
}

fn strip_long_text(object: &mut serde_json::Map<String, Value>) {
    object.retain(|key, _| !LONG_TEXT_FIELDS.contains(&key.as_str()));
}

/// Build `index.json`: every bill as stored, without its long text fields,
/// tagged with its slug and public JSON URL
pub fn index_json(documents: &[BillDocument], base_domain: &str) -> Result<String> {
    let mut entries = Vec::with_capacity(documents.len());

    for document in documents {
        let bill = &document.record;
        let mut value = document.source.clone();
        if let Value::Object(object) = &mut value {
            strip_long_text(object);
            if let Some(Value::Array(sections)) = object.get_mut("sections") {
                for section in sections.iter_mut() {
                    if let Value::Object(section) = section {
                        strip_long_text(section);
                    }
                }
            }

            let slug = bill_slug(&bill.legis_num, &bill.title, &bill.bill_version);
            object.insert("slug".to_string(), Value::String(slug.clone()));
            object.insert(
                "json_url".to_string(),
                Value::String(format!("{}{}.json", base_domain, slug)),
            );
        }
        entries.push(value);
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    entries.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| Error::Path(format!("index.json is not UTF-8: {}", e)))
}

/// Files written by a site build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    pub bills: usize,
    pub months: usize,
    pub written: Vec<PathBuf>,
}

/// Writes the index pages, sitemap, robots.txt and index.json
pub struct SiteBuilder<'a> {
    config: &'a Config,
    templates: &'a Templates,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(config: &'a Config, templates: &'a Templates) -> Self {
        Self { config, templates }
    }

    fn write(&self, name: &str, contents: &str, report: &mut SiteReport) -> Result<()> {
        let path = self.config.output_dir.join(name);
        std::fs::write(&path, contents).map_err(|e| {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            Error::Io(e)
        })?;
        tracing::debug!("Wrote {}", path.display());
        report.written.push(path);
        Ok(())
    }

    fn render(&self, template: &str, context: &Context) -> Result<String> {
        self.templates.render(template, context).map_err(|e| {
            tracing::error!("Failed to render {}: {}", template, e);
            e
        })
    }

    /// Load the corpus and write every site-level artifact
    pub async fn build(&self, now: DateTime<Utc>) -> Result<SiteReport> {
        tracing::info!("Loading bills...");
        let documents = BillCorpus::new(&self.config.bills_dir).load_documents().await?;
        tracing::info!("Loaded {} bills", documents.len());

        self.build_from(documents, now)
    }

    /// Write every site-level artifact for an already loaded corpus
    pub fn build_from(&self, mut documents: Vec<BillDocument>, now: DateTime<Utc>) -> Result<SiteReport> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        documents.retain(|d| {
            let slug = bill_slug(&d.record.legis_num, &d.record.title, &d.record.bill_version);
            if slug.is_empty() {
                tracing::warn!("Skipping bill dated '{}' with no slug", d.record.date);
            }
            !slug.is_empty()
        });
        let mut report = SiteReport {
            bills: documents.len(),
            ..SiteReport::default()
        };

        documents.sort_by(|a, b| b.record.date.cmp(&a.record.date));
        let index = index_json(&documents, &self.config.base_domain)?;
        let bills: Vec<BillRecord> = documents.into_iter().map(|d| d.record).collect();

        tracing::info!("Grouping bills by month...");
        let groups = group_bills_by_month(&bills)?;
        report.months = groups.len();

        tracing::info!("Generating sitemap...");
        let sitemap = sitemap_xml(&bills, &groups, &self.config.base_domain, now.date_naive());
        self.write("sitemap.xml", &sitemap, &mut report)?;

        tracing::info!("Generating month indexes...");
        for group in groups.values() {
            let html = self.render(INDEX_TEMPLATE, &month_index_context(group, now))?;
            self.write(&format!("index-{}.html", group.year_month), &html, &mut report)?;
        }

        tracing::info!("Generating main index...");
        let html = self.render(INDEX_TEMPLATE, &main_index_context(&groups, now))?;
        self.write("index.html", &html, &mut report)?;

        let mut context = Context::new();
        context.insert("timestamp", now.to_rfc3339());
        tracing::info!("Rendering privacy notice...");
        let html = self.render(PRIVACY_TEMPLATE, &context)?;
        self.write("privacy.html", &html, &mut report)?;
        tracing::info!("Rendering about page...");
        let html = self.render(ABOUT_TEMPLATE, &context)?;
        self.write("about.html", &html, &mut report)?;

        tracing::info!("Generating robots.txt...");
        self.write("robots.txt", &robots_txt(&self.config.base_domain), &mut report)?;

        tracing::info!("Generating index.json...");
        self.write("index.json", &index, &mut report)?;

        tracing::info!(
            "Site generation complete: {} bills in {} months written to {}",
            report.bills,
            report.months,
            self.config.output_dir.display()
        );
        Ok(report)
    }
}

/// Path of an output file for a slug
pub fn output_path(output_dir: &Path, slug: &str, extension: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", slug, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bill(legis_num: &str, title: &str, date: &str) -> BillRecord {
        serde_json::from_value(serde_json::json!({
            "legis_num": legis_num,
            "title": title,
            "bill_version": "ih",
            "date": date,
            "eli5": "Short *version*",
            "num_pages": 3,
            "num_sections": 4,
            "num_tokens": 1200,
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_group_bills_by_month() {
        let bills = vec![
            bill("H.R. 1", "First", "2024-01-05"),
            bill("H.R. 2", "Second", "2024-02-10"),
        ];
        let groups = group_bills_by_month(&bills).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["2024-01"].month_name, "January 2024");
        assert_eq!(groups["2024-02"].month_name, "February 2024");
        assert_eq!(groups["2024-01"].bills.len(), 1);
        assert_eq!(groups["2024-02"].bills.len(), 1);
        assert_eq!(groups["2024-01"].bills[0].slug, "hr-1-ih-first");
        assert_eq!(groups["2024-01"].bills[0].eli5, "<p>Short <em>version</em></p>\n");
        assert_eq!(groups["2024-01"].bills[0].num_tokens, 1200.0);
    }

    #[test]
    fn test_group_sorts_newest_first() {
        let bills = vec![
            bill("H.R. 1", "Early", "2024-01-02"),
            bill("H.R. 2", "Late", "2024-01-30"),
            bill("H.R. 3", "Middle", "2024-01-15"),
        ];
        let groups = group_bills_by_month(&bills).unwrap();
        let dates: Vec<&str> = groups["2024-01"].bills.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-30", "2024-01-15", "2024-01-02"]);
    }

    #[test]
    fn test_group_rejects_bad_date() {
        let bills = vec![bill("H.R. 1", "Bad", "01/05/2024")];
        assert!(matches!(group_bills_by_month(&bills), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_main_index_recent_and_archives() {
        let bills: Vec<BillRecord> = ["2023-10-01", "2023-11-01", "2023-12-01", "2024-01-01", "2024-01-02"]
            .iter()
            .enumerate()
            .map(|(i, date)| bill(&format!("H.R. {}", i + 1), "Act", date))
            .collect();
        let groups = group_bills_by_month(&bills).unwrap();
        let context = main_index_context(&groups, now());

        assert_eq!(context["total_bills"], "4");
        assert!(context["bills"].contains("January 2024"));
        assert!(context["bills"].contains("November 2023"));
        assert!(!context["bills"].contains("October 2023"));
        assert!(context["archives"].contains("index-2023-10.html"));
        assert!(context["archives"].contains("(1 bills)"));
    }

    #[test]
    fn test_robots_txt() {
        insta::assert_snapshot!(robots_txt("https://usbills.ai/"), @r###"
        User-Agent: *
        Sitemap: https://usbills.ai/sitemap.xml
        Disallow:
        "###);
    }

    #[test]
    fn test_sitemap_xml() {
        let bills = vec![bill("H.R. 7", "Roads & Bridges", "2024-01-05")];
        let groups = group_bills_by_month(&bills).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        insta::assert_snapshot!(sitemap_xml(&bills, &groups, "https://usbills.ai/", today), @r###"
        <?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://usbills.ai/</loc>
            <lastmod>2024-03-01</lastmod>
            <changefreq>daily</changefreq>
            <priority>1.0</priority>
          </url>
          <url>
            <loc>https://usbills.ai/index-2024-01.html</loc>
            <lastmod>2024-03-01</lastmod>
            <changefreq>weekly</changefreq>
            <priority>0.9</priority>
          </url>
          <url>
            <loc>https://usbills.ai/hr-7-ih-roads-bridges.html</loc>
            <lastmod>2024-01-05</lastmod>
            <changefreq>weekly</changefreq>
            <priority>0.8</priority>
          </url>
        </urlset>
        "###);
    }

    #[test]
    fn test_index_json_strips_text() {
        let document = BillDocument::from_value(serde_json::json!({
            "legis_num": "S. 5",
            "title": "Act",
            "bill_version": "is",
            "date": "2024-01-05",
            "text": "long",
            "html": "<p>long</p>",
            "markdown": "long",
            "sponsor": "Someone",
            "sections": [{"text": "body", "markdown": "body", "summary": "sum"}]
        }))
        .unwrap();

        let json = index_json(&[document], "https://usbills.ai/").unwrap();
        assert!(json.starts_with("[\n    {\n"));

        let value: Value = serde_json::from_str(&json).unwrap();
        let entry = &value[0];
        assert!(entry.get("text").is_none());
        assert!(entry.get("html").is_none());
        assert!(entry.get("markdown").is_none());
        assert!(entry["sections"][0].get("text").is_none());
        assert!(entry["sections"][0].get("markdown").is_none());
        assert_eq!(entry["sections"][0]["summary"], "sum");
        assert_eq!(entry["sponsor"], "Someone");
        assert_eq!(entry["slug"], "s-5-is-act");
        assert_eq!(entry["json_url"], "https://usbills.ai/s-5-is-act.json");
    }

    #[test]
    fn test_index_json_keeps_stored_fields_verbatim() {
        let document = BillDocument::from_value(serde_json::json!({
            "title": "Act",
            "legis_num": "H.R. 9",
            "eli5": null,
            "num_tokens": 12,
            "date": "2024-01-05"
        }))
        .unwrap();

        let json = index_json(&[document], "https://usbills.ai/").unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = value[0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        assert_eq!(
            keys,
            vec!["title", "legis_num", "eli5", "num_tokens", "date", "slug", "json_url"]
        );
        assert!(value[0]["eli5"].is_null());
        assert_eq!(value[0]["slug"], "hr-9-act");
    }
}
