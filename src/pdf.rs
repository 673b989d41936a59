use crate::config::Config;
use std::path::Path;
use tokio::process::Command;

/// Command-line flags passed to the headless browser before the output path
pub const BROWSER_FLAGS: [&str; 6] = [
    "--headless",
    "--disable-gpu",
    "--run-all-compositor-stages-before-draw",
    "--no-margins",
    "--no-pdf-header-footer",
    "--print-to-pdf-no-header",
];

/// URL the browser loads to print `html_path`
///
/// The page is addressed relative to the output directory, which is expected
/// to be served at `config.render_base_url`.
pub fn render_url(config: &Config, html_path: &Path) -> String {
    let relative = pathdiff::diff_paths(html_path, &config.output_dir)
        .unwrap_or_else(|| html_path.to_path_buf());
    let relative = relative.to_string_lossy().replace('\\', "/");
    format!(
        "{}{}",
        config.render_base_url,
        relative.trim_start_matches("./")
    )
}

/// Full argument list for printing `html_path` into `pdf_path`
pub fn browser_args(config: &Config, html_path: &Path, pdf_path: &Path) -> Vec<String> {
    let mut args: Vec<String> = BROWSER_FLAGS.iter().map(|s| s.to_string()).collect();
    args.push(format!("--print-to-pdf={}", pdf_path.display()));
    args.push(render_url(config, html_path));
    args
}

/// Print a rendered page to PDF with the configured headless browser
///
/// Returns `false` when the browser cannot be started or exits unsuccessfully.
pub async fn render_pdf(config: &Config, html_path: &Path, pdf_path: &Path) -> bool {
    let args = browser_args(config, html_path, pdf_path);
    tracing::debug!("Running {} {}", config.browser, args.join(" "));

    match Command::new(&config.browser).args(&args).output().await {
        Ok(output) if output.status.success() => {
            tracing::info!("Wrote {}", pdf_path.display());
            true
        }
        Ok(output) => {
            tracing::error!(
                "PDF export of {} failed ({}): {}",
                html_path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            false
        }
        Err(e) => {
            tracing::error!("Failed to run {}: {}", config.browser, e);
            false
        }
    }
}
