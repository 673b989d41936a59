//! HTML fragments inserted into the page templates.

use crate::enrich::EnrichedBill;
use crate::markup::escape_html;
use crate::metrics::{ARI_RAW, ARI_YEARS_EDUCATION};
use crate::readability::ari_grade_label;
use crate::template::Context;
use crate::types::BillSummary;

/// Display label of each ranked metric
fn metric_label(metric: &str) -> &str {
    match metric {
        "num_characters" => "Characters",
        "num_tokens" => "Words",
        "num_sentences" => "Sentences",
        "num_sections" => "Sections",
        "avg_token_length" => "Average word length",
        "avg_sentence_length" => "Average sentence length",
        "token_entropy" => "Vocabulary entropy",
        ARI_RAW => "Readability (ARI)",
        ARI_YEARS_EDUCATION => "Education level",
        other => other,
    }
}

/// Format a metric value: whole numbers without decimals, others with two
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Render the table of ranked metrics with their corpus deciles
pub fn metrics_table(bill: &EnrichedBill) -> String {
    let mut rows = String::new();
    for (metric, decile) in &bill.deciles {
        let value = match metric.as_str() {
            ARI_RAW => bill.ari_raw,
            ARI_YEARS_EDUCATION => f64::from(bill.ari_years_education),
            name => bill.record.metrics.get(name).unwrap_or(0.0),
        };
        rows.push_str(&format!(
            "<tr><th scope=\"row\">{}</th><td>{}</td><td class=\"decile decile-{}\">{}/10</td></tr>\n",
            escape_html(metric_label(metric)),
            format_number(value),
            decile,
            decile
        ));
    }
    format!(
        "<table class=\"metrics\">\n<thead><tr><th>Metric</th><th>Value</th><th>Percentile</th></tr></thead>\n<tbody>\n{}</tbody>\n</table>",
        rows
    )
}

fn entity_list(bill: &EnrichedBill) -> String {
    if bill.entity_counts.is_empty() {
        return String::new();
    }
    let items: Vec<String> = bill
        .entity_counts
        .iter()
        .map(|(entity, count)| {
            format!(
                "<li><span class=\"entity\">{}</span> <span class=\"count\">{}</span></li>",
                escape_html(entity),
                count
            )
        })
        .collect();
    format!("<ul class=\"entities\">\n{}\n</ul>", items.join("\n"))
}

fn issue_list(bill: &EnrichedBill) -> String {
    if bill.issues_html.is_empty() {
        return String::new();
    }
    let items: Vec<String> = bill
        .issues_html
        .iter()
        .map(|issue| format!("<li>{}</li>", issue.trim_end()))
        .collect();
    format!("<ul class=\"issues\">\n{}\n</ul>", items.join("\n"))
}

fn section_list(bill: &EnrichedBill) -> String {
    bill.section_summaries_html
        .iter()
        .enumerate()
        .map(|(i, summary)| {
            format!(
                "<section class=\"bill-section\" id=\"section-{}\">\n{}</section>",
                i + 1,
                summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Placeholder values for `bill_details.html`
pub fn bill_context(bill: &EnrichedBill) -> Context {
    let record = &bill.record;
    let mut context = Context::new();

    context.insert("title", escape_html(&record.title));
    context.insert("legis_num", escape_html(&record.legis_num));
    context.insert("bill_version", escape_html(&record.bill_version));
    context.insert(
        "bill_version_description",
        escape_html(&bill.bill_version_description),
    );
    context.insert("date", escape_html(&record.date));
    context.insert("slug", escape_html(&bill.slug));
    context.insert("pdf_url", escape_html(&bill.pdf_url));
    context.insert("json_url", escape_html(&bill.json_url));
    context.insert("keywords", escape_html(&bill.keyword_string));
    context.insert(
        "llm_model_id",
        escape_html(record.llm_model_id.as_deref().unwrap_or("")),
    );
    context.insert("timestamp", escape_html(&bill.timestamp));

    context.insert("summary", bill.summary_html.clone());
    context.insert("eli5", bill.eli5_html.clone());
    context.insert("commentary", bill.commentary_html.clone());
    context.insert(
        "money_commentary",
        bill.money_commentary_html.clone().unwrap_or_default(),
    );
    context.insert("issues", issue_list(bill));
    context.insert("sections", section_list(bill));
    context.insert("entities", entity_list(bill));
    context.insert("metrics", metrics_table(bill));

    context.insert("ari_raw", format!("{:.2}", bill.ari_raw));
    context.insert(
        "ari_years_education",
        bill.ari_years_education.to_string(),
    );
    context.insert(
        "ari_grade",
        ari_grade_label(bill.ari_years_education).to_string(),
    );

    context
}

/// Bill cards for one month
pub fn bill_cards(bills: &[BillSummary]) -> String {
    bills
        .iter()
        .map(|bill| {
            format!(
                r#"<article class="bill">
  <header>
    <h3><a href="{slug}.html">{legis_num}: {title}</a></h3>
    <time datetime="{date}">{date}</time>
  </header>
  <div class="eli5">{eli5}</div>
  <footer>{sections} sections &middot; {tokens} words &middot; {pages} pages</footer>
</article>"#,
                slug = escape_html(&bill.slug),
                legis_num = escape_html(&bill.legis_num),
                title = escape_html(&bill.title),
                date = escape_html(&bill.date),
                eli5 = bill.eli5.trim_end(),
                sections = format_number(bill.num_sections),
                tokens = format_number(bill.num_tokens),
                pages = format_number(bill.num_pages),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One `<section>` per month, each holding its bill cards
pub fn month_sections<'a>(months: impl IntoIterator<Item = (&'a str, &'a [BillSummary])>) -> String {
    months
        .into_iter()
        .map(|(month_name, bills)| {
            format!(
                "<section class=\"month\">\n<h2>{}</h2>\n{}\n</section>",
                escape_html(month_name),
                bill_cards(bills)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A link to an older month's index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLink {
    pub year_month: String,
    pub month_name: String,
    pub count: usize,
}

/// Archive links for months not shown on the main index
pub fn archive_list(archives: &[ArchiveLink]) -> String {
    if archives.is_empty() {
        return String::new();
    }
    let items: Vec<String> = archives
        .iter()
        .map(|a| {
            format!(
                "<li><a href=\"index-{}.html\">{}</a> ({} bills)</li>",
                escape_html(&a.year_month),
                escape_html(&a.month_name),
                a.count
            )
        })
        .collect();
    format!("<ul class=\"archives\">\n{}\n</ul>", items.join("\n"))
}
