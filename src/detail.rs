use crate::model::{GeneratedFragment, PosterRecord};

/// The merged, render-ready content of the detail panel. A `None` or empty
/// section is not shown.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub image_url: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub tag_groups: Option<Vec<(String, Vec<String>)>>,
    pub research_description: Option<String>,
    pub source_url: Option<String>,
}

impl DetailView {
    /// Merge a base record with its optional analysis fragment.
    ///
    /// The fragment's simple description wins over the base description. Tag
    /// groups are kept only when some category has a value, and then every
    /// category is kept so empty ones can be shown as such.
    pub fn merge(base: &PosterRecord, fragment: Option<&GeneratedFragment>) -> Self {
        let description = fragment
            .and_then(GeneratedFragment::simple_text)
            .or_else(|| base.description_text())
            .map(str::to_string);

        let tag_groups = fragment
            .map(|f| &f.tags)
            .filter(|groups| groups.has_entries())
            .map(|groups| {
                groups
                    .groups()
                    .iter()
                    .map(|g| {
                        let tags = g.visible_tags().into_iter().map(str::to_string).collect();
                        (g.category.clone(), tags)
                    })
                    .collect()
            });

        Self {
            id: base.id_text(),
            title: base.display_title().to_string(),
            year: base.year_text(),
            image_url: base.image_src().to_string(),
            description,
            tags: base.visible_tags().into_iter().map(str::to_string).collect(),
            tag_groups,
            research_description: fragment
                .and_then(GeneratedFragment::research_text)
                .map(str::to_string),
            source_url: base.source_url().map(str::to_string),
        }
    }

    /// Title followed by the year in parentheses when there is one.
    pub fn heading(&self) -> String {
        match &self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    pub fn tag_refs(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }
}
