use std::collections::BTreeMap;

use url::Url;

use crate::error::CatalogError;
use crate::html;

/// Mount points a page may carry. Which ones exist decides which viewer
/// modes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Region {
    Grid,
    Details,
}

impl Region {
    pub fn element_id(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Details => "details",
        }
    }
}

/// A rendered page: its location's query parameters, the markup of each
/// mounted region, blocking alerts and non-blocking notices.
#[derive(Debug, Clone, Default)]
pub struct Page {
    params: Vec<(String, String)>,
    regions: BTreeMap<Region, String>,
    alerts: Vec<String>,
    notices: Vec<String>,
}

impl Page {
    /// A page without location or regions.
    pub fn headless() -> Self {
        Self::default()
    }

    /// A page opened at a relative location such as `poster.html?id=1`.
    pub fn at(location: &str) -> Result<Self, CatalogError> {
        let url = Url::parse("http://page.invalid/")?.join(location)?;
        let params = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok(Self { params, ..Self::default() })
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.regions.entry(region).or_default();
        self
    }

    pub fn has(&self, region: Region) -> bool {
        self.regions.contains_key(&region)
    }

    /// First value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the content of a mounted region. Unmounted regions are left
    /// alone.
    pub fn replace(&mut self, region: Region, markup: String) {
        if let Some(slot) = self.regions.get_mut(&region) {
            *slot = markup;
        }
    }

    pub fn markup(&self, region: Region) -> Option<&str> {
        self.regions.get(&region).map(String::as_str)
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn notice(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// The page as a standalone HTML document.
    pub fn to_document(&self, title: &str) -> String {
        let regions: String = self
            .regions
            .iter()
            .map(|(region, markup)| {
                format!(
                    r#"<div id="{id}" class="{id}">{markup}</div>"#,
                    id = region.element_id(),
                    markup = markup
                )
            })
            .collect();
        html::document(title, &regions, &self.alerts, &self.notices)
    }
}
