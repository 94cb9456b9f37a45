//! HTML rendering for the grid and detail regions.
//!
//! Every piece of record text goes through [`escape_html`] before it is
//! placed in markup, including attribute values.

use crate::detail::DetailView;
use crate::model::PosterRecord;

/// Page the grid links to.
pub const DETAIL_PAGE: &str = "poster.html";

/// Text shown inside an analysis category that has no values.
pub const EMPTY_GROUP: &str = "—";

const EMPTY_GRID: &str = "No posters to show. Check that the poster list endpoint is reachable.";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Relative link to the detail page for a poster id.
pub fn detail_href(id: &str) -> String {
    format!("{}?id={}", DETAIL_PAGE, urlencoding::encode(id))
}

/// Flat tag list, or nothing when no tag has text.
pub fn render_tags(tags: &[&str]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let spans: String = tags
        .iter()
        .map(|t| format!(r#"<span class="tag">{}</span>"#, escape_html(t)))
        .collect();
    format!(r#"<div class="tags">{}</div>"#, spans)
}

/// One block per analysis category, including empty ones.
pub fn render_tag_groups(groups: &[(&str, Vec<&str>)]) -> String {
    let mut blocks = String::new();
    for (category, tags) in groups {
        let body = if tags.is_empty() {
            format!(r#"<div class="tag-group-empty">{}</div>"#, EMPTY_GROUP)
        } else {
            render_tags(tags)
        };
        blocks.push_str(&format!(
            r#"
        <div class="tag-group">
            <div class="tag-group-title">{}</div>
            {}
        </div>"#,
            escape_html(category),
            body
        ));
    }
    format!(r#"<div class="tag-groups">{}</div>"#, blocks)
}

fn render_card(record: &PosterRecord) -> String {
    let year = record
        .year_text()
        .map(|y| format!(r#"<div class="meta">Year: {}</div>"#, escape_html(&y)))
        .unwrap_or_default();

    format!(
        r#"
    <a class="card" href="{}">
        <img src="{}" alt="">
        <div class="content">
            <div class="title">{}</div>
            {}
            {}
        </div>
    </a>"#,
        escape_html(&detail_href(&record.id_text())),
        escape_html(record.image_src()),
        escape_html(record.display_title()),
        year,
        render_tags(&record.visible_tags())
    )
}

/// Markup for the grid region.
pub fn render_grid(records: &[&PosterRecord]) -> String {
    if records.is_empty() {
        return format!(r#"<div class="empty">{}</div>"#, EMPTY_GRID);
    }
    records.iter().map(|r| render_card(r)).collect()
}

/// Markup for the details region.
pub fn render_details(view: &DetailView) -> String {
    let mut body = String::new();

    body.push_str(&format!("<h2>{}</h2>", escape_html(&view.heading())));

    if let Some(description) = &view.description {
        body.push_str(&format!("<p>{}</p>", escape_html(description)));
    }

    if !view.tags.is_empty() {
        body.push_str(r#"<h3 class="section-title">Tags</h3>"#);
        body.push_str(&render_tags(&view.tag_refs()));
    }

    if let Some(groups) = &view.tag_groups {
        body.push_str(r#"<h3 class="section-title">Elements (tags) from the analysis</h3>"#);
        body.push_str(&render_tag_groups(&groups_as_refs(groups)));
    }

    if let Some(research) = &view.research_description {
        body.push_str(r#"<h3 class="section-title">Scientific description</h3>"#);
        body.push_str(&format!("<p>{}</p>", escape_html(research)));
    }

    if let Some(url) = &view.source_url {
        body.push_str(&format!(
            r#"<p><a href="{}" target="_blank" rel="noopener">Source</a></p>"#,
            escape_html(url)
        ));
    }

    format!(
        r#"
    <div><img src="{}" alt=""></div>
    <div>{}</div>"#,
        escape_html(&view.image_url),
        body
    )
}

fn groups_as_refs(groups: &[(String, Vec<String>)]) -> Vec<(&str, Vec<&str>)> {
    groups
        .iter()
        .map(|(category, tags)| (category.as_str(), tags.iter().map(String::as_str).collect()))
        .collect()
}

/// Full document wrapping the rendered regions.
pub fn document(title: &str, regions: &str, alerts: &[String], notices: &[String]) -> String {
    let mut banners = String::new();
    for alert in alerts {
        banners.push_str(&format!(
            r#"<div class="alert" role="alert">{}</div>"#,
            escape_html(alert)
        ));
    }
    for notice in notices {
        banners.push_str(&format!(
            r#"<div class="notice" role="status">{}</div>"#,
            escape_html(notice)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <header><a href="index.html">Posters</a></header>
    {}
    <main>
        {}
    </main>
</body>
</html>"#,
        escape_html(title),
        banners,
        regions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeneratedFragment;
    use serde_json::json;

    fn record(value: serde_json::Value) -> PosterRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_detail_href_encodes_id() {
        assert_eq!(detail_href("1"), "poster.html?id=1");
        assert_eq!(detail_href("a b&c"), "poster.html?id=a%20b%26c");
    }

    #[test]
    fn test_grid_single_card() {
        let nova = record(json!({"id": 1, "title": "Nova", "tags": ["space", "red"]}));
        let html = render_grid(&[&nova]);
        assert_eq!(html.matches(r#"class="card""#).count(), 1);
        assert!(html.contains(r#"<div class="title">Nova</div>"#));
        assert!(html.contains(r#"<span class="tag">space</span><span class="tag">red</span>"#));
        assert!(html.contains("poster.html?id=1"));
        assert!(!html.contains("Year:"));
    }

    #[test]
    fn test_grid_placeholders() {
        assert!(render_grid(&[]).contains(r#"class="empty""#));

        let bare = record(json!({"id": "x", "year": 1944, "tags": ["", "  "]}));
        let html = render_grid(&[&bare]);
        assert!(html.contains("(untitled)"));
        assert!(html.contains("Year: 1944"));
        assert!(!html.contains(r#"class="tags""#));
    }

    #[test]
    fn test_grid_escapes_script() {
        let evil = record(json!({
            "id": "<script>",
            "title": "<script>alert(1)</script>",
            "year": "<script>",
            "tags": ["<script>x</script>"],
            "imageUrl": "\"><script>alert(2)</script>"
        }));
        let html = render_grid(&[&evil]);
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_details_escape_script_everywhere() {
        let evil = record(json!({
            "id": "<script>id</script>",
            "title": "<script>alert(1)</script>",
            "year": "<script>",
            "description": "<script>alert(2)</script>",
            "imageUrl": "\"><script>alert(3)</script>",
            "pageUrl": "javascript:\"><script>alert(4)</script>",
            "tags": ["<script>alert(5)</script>"]
        }));
        let fragment = GeneratedFragment::from_value(json!({
            "research_description": "<script>alert(6)</script>",
            "tags": {"<script>cat</script>": ["<script>alert(7)</script>"], "Objects": []}
        }))
        .unwrap();

        // Base description shown when the fragment has no simple description
        let html = render_details(&DetailView::merge(&evil, Some(&fragment)));
        assert!(html.contains("&lt;script&gt;alert(2)&lt;/script&gt;"));
        assert!(html.contains("&lt;script&gt;cat&lt;/script&gt;"));
        assert!(html.contains("&lt;script&gt;alert(6)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));

        let simple = GeneratedFragment::from_value(json!({
            "simple_description": "<script>alert(8)</script>"
        }))
        .unwrap();
        let html = render_details(&DetailView::merge(&evil, Some(&simple)));
        assert!(html.contains("&lt;script&gt;alert(8)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_tag_groups_with_empty_category() {
        let fragment = GeneratedFragment::from_value(json!({
            "tags": {"Characters": ["A", ""], "Objects": []}
        }))
        .unwrap();
        let groups: Vec<(&str, Vec<&str>)> = fragment
            .tags
            .groups()
            .iter()
            .map(|g| (g.category.as_str(), g.visible_tags()))
            .collect();
        let html = render_tag_groups(&groups);

        let characters = html.find(">Characters<").unwrap();
        let objects = html.find(">Objects<").unwrap();
        assert!(characters < objects);

        let characters_block = &html[characters..objects];
        assert_eq!(characters_block.matches(r#"class="tag""#).count(), 1);
        assert!(characters_block.contains(r#"<span class="tag">A</span>"#));

        let objects_block = &html[objects..];
        assert!(objects_block.contains(EMPTY_GROUP));
        assert!(!objects_block.contains(r#"class="tag""#));
    }

    #[test]
    fn test_document_escapes_alerts() {
        let html = document("Posters", "", &["<b>oops</b>".to_string()], &[]);
        assert!(html.contains("&lt;b&gt;oops&lt;/b&gt;"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
