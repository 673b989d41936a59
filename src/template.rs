use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;

pub const BILL_TEMPLATE: &str = "bill_details.html";
pub const INDEX_TEMPLATE: &str = "index.html";
pub const ABOUT_TEMPLATE: &str = "about.html";
pub const PRIVACY_TEMPLATE: &str = "privacy.html";

/// Values substituted into a template, keyed by placeholder name
pub type Context = HashMap<&'static str, String>;

/// Page templates loaded from a directory
///
/// Templates are plain HTML with `{{ name }}` placeholders. Values are
/// inserted verbatim, so callers pass escaped text or trusted HTML fragments.
/// Placeholders without a value render empty.
#[derive(Debug)]
pub struct Templates {
    dir: PathBuf,
    placeholder: Regex,
}

impl Templates {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            dir: dir.into(),
            placeholder: Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")?,
        })
    }

    /// Read a template file
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(Error::TemplateNotFound(path.display().to_string()));
        }
        Ok(std::fs::read_to_string(&path)?)
    }

    /// Render a template file with the given context
    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        let source = self.load(name)?;
        Ok(self.render_str(&source, context))
    }

    /// Render template source with the given context
    pub fn render_str(&self, source: &str, context: &Context) -> String {
        self.placeholder
            .replace_all(source, |caps: &regex::Captures| {
                context.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned()
    }
}
