use tracing::{debug, error, info, warn};

use crate::detail::DetailView;
use crate::error::{CatalogError, ViewError};
use crate::fetch::{Endpoints, Fetch, fetch_fragment, fetch_list};
use crate::filter::filter;
use crate::html::{render_details, render_grid};
use crate::model::{GeneratedFragment, PosterRecord};
use crate::page::{Page, Region};
use crate::store::{KeyValueStore, SnapshotStore};

/// A base record resolved from the snapshot plus whatever analysis could be
/// fetched for it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub base: PosterRecord,
    pub fragment: Option<GeneratedFragment>,
    /// Why the fragment is missing, when that is worth telling the user.
    pub warning: Option<String>,
}

/// The catalog viewer: owns the loaded poster list and the active query, and
/// drives list and detail mode against a [`Page`].
pub struct CatalogViewer<S, F> {
    endpoints: Endpoints,
    fetcher: F,
    snapshot: SnapshotStore<S>,
    records: Vec<PosterRecord>,
    query: String,
    /// Set by the first successful list load. Until then the records are not
    /// the catalog and must not replace the snapshot.
    loaded: bool,
}

impl<S: KeyValueStore, F: Fetch> CatalogViewer<S, F> {
    pub fn new(endpoints: Endpoints, fetcher: F, store: S) -> Self {
        Self {
            endpoints,
            fetcher,
            snapshot: SnapshotStore::new(store),
            records: Vec::new(),
            query: String::new(),
            loaded: false,
        }
    }

    pub fn records(&self) -> &[PosterRecord] {
        &self.records
    }

    /// Records matching the active query, in list order.
    pub fn visible(&self) -> Vec<&PosterRecord> {
        filter(&self.records, &self.query)
    }

    /// Run every mode the page has a region for.
    pub async fn start(&mut self, page: &mut Page) {
        if page.has(Region::Grid) {
            self.load(page).await;
        }
        if page.has(Region::Details) {
            self.open(page).await;
        }
    }

    /// Fetch the poster list and replace the loaded records with it. On
    /// failure the previous records stay and `false` is returned.
    pub async fn load(&mut self, page: &mut Page) -> bool {
        match fetch_list(&self.fetcher, &self.endpoints).await {
            Ok(records) => {
                info!("loaded {} posters from {}", records.len(), self.endpoints.list());
                self.records = records;
                self.loaded = true;
                self.refresh(page);
                true
            }
            Err(e) => {
                warn!("poster list load failed: {}", e);
                false
            }
        }
    }

    pub fn set_query(&mut self, query: &str, page: &mut Page) {
        self.query = query.to_string();
        self.refresh(page);
    }

    pub fn reset(&mut self, page: &mut Page) {
        self.query.clear();
        self.refresh(page);
    }

    /// Re-render the grid for the active query and overwrite the snapshot
    /// with the full record set. The snapshot is only written once a list
    /// has been loaded.
    pub fn refresh(&mut self, page: &mut Page) {
        if page.has(Region::Grid) {
            let markup = render_grid(&filter(&self.records, &self.query));
            page.replace(Region::Grid, markup);
        }
        if !self.loaded {
            return;
        }
        if let Err(e) = self.snapshot.save(&self.records) {
            error!("could not save poster snapshot: {}", e);
        }
    }

    /// Find the poster named by the page's `id` parameter in the snapshot and
    /// fetch its analysis fragment. The fragment is optional; everything
    /// before it is required.
    pub async fn resolve(&self, page: &Page) -> Result<Resolution, ViewError> {
        let id = page
            .param("id")
            .filter(|id| !id.is_empty())
            .ok_or(ViewError::MissingId)?;

        let records = self
            .snapshot
            .load()
            .map_err(ViewError::CorruptSnapshot)?
            .ok_or(ViewError::NoSnapshot)?;

        let base = records
            .into_iter()
            .find(|r| r.id_text() == id)
            .ok_or_else(|| ViewError::NotFound { id: id.to_string() })?;

        let (fragment, warning) = match fetch_fragment(&self.fetcher, &self.endpoints, id).await {
            Ok(fragment) => (fragment, None),
            Err(CatalogError::Status { status: 404, .. }) => {
                debug!("no analysis fragment for poster {}", id);
                (None, None)
            }
            Err(e) => {
                warn!("analysis fragment for poster {} unavailable: {}", id, e);
                let warning = format!("Analysis for this poster is unavailable ({})", e.user_message());
                (None, Some(warning))
            }
        };

        Ok(Resolution { base, fragment, warning })
    }

    /// Detail mode: resolve the poster and render it into the details region.
    /// Fatal errors become a page alert and nothing is rendered.
    pub async fn open(&self, page: &mut Page) -> Option<DetailView> {
        match self.resolve(page).await {
            Ok(resolution) => {
                let view = DetailView::merge(&resolution.base, resolution.fragment.as_ref());
                if let Some(warning) = resolution.warning {
                    page.notice(warning);
                }
                page.replace(Region::Details, render_details(&view));
                Some(view)
            }
            Err(e) => {
                error!("detail view halted: {}", e);
                page.alert(e.user_message());
                None
            }
        }
    }

    pub fn clear_snapshot(&mut self) -> Result<(), CatalogError> {
        self.snapshot.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::fetch::testing::StaticFetcher;
    use crate::html::detail_href;
    use crate::store::{MemoryStore, SNAPSHOT_KEY};

    const LIST: &str = "/data/posters.json";

    fn viewer(fetcher: StaticFetcher) -> CatalogViewer<MemoryStore, StaticFetcher> {
        viewer_with(fetcher, MemoryStore::default())
    }

    fn viewer_with(
        fetcher: StaticFetcher,
        store: MemoryStore,
    ) -> CatalogViewer<MemoryStore, StaticFetcher> {
        let endpoints = Endpoints::from_config(&ViewerConfig::default()).unwrap();
        CatalogViewer::new(endpoints, fetcher, store)
    }

    fn seeded_store(json: &str) -> MemoryStore {
        let mut store = MemoryStore::default();
        store.set(SNAPSHOT_KEY, json).unwrap();
        store
    }

    fn detail_page(id: &str) -> Page {
        Page::at(&detail_href(id)).unwrap().with_region(Region::Details)
    }

    #[tokio::test]
    async fn test_list_mode_renders_and_snapshots() {
        let fetcher = StaticFetcher::new().route(
            LIST,
            200,
            r#"[{"id":1,"title":"Nova","tags":["space","red"]}]"#,
        );
        let mut viewer = viewer(fetcher);
        let mut page = Page::headless().with_region(Region::Grid);
        viewer.start(&mut page).await;

        let grid = page.markup(Region::Grid).unwrap();
        assert_eq!(grid.matches(r#"class="card""#).count(), 1);
        assert!(grid.contains(">Nova<"));
        assert!(grid.contains(r#"<span class="tag">space</span>"#));
        assert!(grid.contains(r#"<span class="tag">red</span>"#));
        assert!(grid.contains("id=1"));

        let saved = viewer.snapshot.load().unwrap().unwrap();
        assert_eq!(saved, viewer.records());
    }

    #[tokio::test]
    async fn test_query_filters_grid_but_snapshot_keeps_all() {
        let fetcher = StaticFetcher::new().route(
            LIST,
            200,
            r#"{"items":[{"id":1,"title":"Nova"},{"id":2,"title":"Katyn"}]}"#,
        );
        let mut viewer = viewer(fetcher);
        let mut page = Page::headless().with_region(Region::Grid);
        viewer.start(&mut page).await;

        viewer.set_query("KAT", &mut page);
        let grid = page.markup(Region::Grid).unwrap();
        assert!(grid.contains(">Katyn<"));
        assert!(!grid.contains(">Nova<"));
        assert_eq!(viewer.snapshot.load().unwrap().unwrap().len(), 2);

        viewer.set_query("zzz", &mut page);
        assert!(page.markup(Region::Grid).unwrap().contains(r#"class="empty""#));

        viewer.reset(&mut page);
        assert_eq!(viewer.visible().len(), 2);
        assert_eq!(page.markup(Region::Grid).unwrap().matches(r#"class="card""#).count(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_records() {
        let fetcher = StaticFetcher::new().route(LIST, 200, r#"[{"id":1}]"#);
        let mut viewer = viewer(fetcher);
        let mut page = Page::headless().with_region(Region::Grid);
        assert!(viewer.load(&mut page).await);

        viewer.fetcher = StaticFetcher::new().route(LIST, 503, "down");
        assert!(!viewer.load(&mut page).await);
        assert_eq!(viewer.records().len(), 1);

        viewer.fetcher = StaticFetcher::offline();
        assert!(!viewer.load(&mut page).await);
        assert_eq!(viewer.records().len(), 1);
        assert!(page.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_detail_without_fragment() {
        let store = seeded_store(r#"[{"id":1,"title":"Nova","description":"-"}]"#);
        let viewer = viewer_with(StaticFetcher::new(), store);
        let mut page = detail_page("1");

        let view = viewer.open(&mut page).await.unwrap();
        assert_eq!(view.title, "Nova");
        assert!(view.description.is_none());
        assert!(view.tag_groups.is_none());
        assert!(view.research_description.is_none());

        let details = page.markup(Region::Details).unwrap();
        assert!(details.contains("<h2>Nova</h2>"));
        assert!(!details.contains("<p>"));
        assert!(!details.contains("section-title"));
        assert!(page.alerts().is_empty());
        assert!(page.notices().is_empty());
        assert_eq!(viewer.fetcher.requested(), vec!["/data/generated/1.json"]);
    }

    #[tokio::test]
    async fn test_detail_merges_fragment() {
        let store = seeded_store(
            r#"[{"id":"p1","title":"Katyn","year":"1944","description":"Base","pageUrl":"https://example.org/p1"}]"#,
        );
        let fetcher = StaticFetcher::new().route(
            "/data/generated/p1.json",
            200,
            r#"{"simple_description":"Simple","research_description":"Deep","tags":{"Kolory":["czerwony"],"Styl":[]}}"#,
        );
        let viewer = viewer_with(fetcher, store);
        let mut page = detail_page("p1");
        viewer.open(&mut page).await.unwrap();

        let details = page.markup(Region::Details).unwrap();
        assert!(details.contains("<h2>Katyn (1944)</h2>"));
        assert!(details.contains("<p>Simple</p>"));
        assert!(!details.contains("Base"));
        assert!(details.contains("Scientific description"));
        assert!(details.contains(">Kolory<"));
        assert!(details.contains(">Styl<"));
        assert!(details.contains(r#"href="https://example.org/p1" target="_blank""#));
    }

    #[tokio::test]
    async fn test_no_snapshot_is_fatal_and_skips_fragment() {
        let viewer = viewer(StaticFetcher::new());
        let mut page = detail_page("1");
        assert!(viewer.open(&mut page).await.is_none());
        assert_eq!(page.alerts().len(), 1);
        assert_eq!(page.markup(Region::Details), Some(""));
        assert!(viewer.fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_missing_id_and_unknown_id() {
        let store = seeded_store(r#"[{"id":1,"title":"Nova"}]"#);
        let viewer = viewer_with(StaticFetcher::new(), store);

        let page = Page::at("poster.html").unwrap();
        assert!(matches!(viewer.resolve(&page).await, Err(ViewError::MissingId)));

        let page = Page::at("poster.html?id=").unwrap();
        assert!(matches!(viewer.resolve(&page).await, Err(ViewError::MissingId)));

        let page = Page::at("poster.html?id=2").unwrap();
        assert!(matches!(
            viewer.resolve(&page).await,
            Err(ViewError::NotFound { .. })
        ));
        assert!(viewer.fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_fatal() {
        let viewer = viewer_with(StaticFetcher::new(), seeded_store("{broken"));
        let page = Page::at("poster.html?id=1").unwrap();
        assert!(matches!(
            viewer.resolve(&page).await,
            Err(ViewError::CorruptSnapshot(_))
        ));
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let store = seeded_store(r#"[{"id":"7","title":"First"},{"id":7,"title":"Second"}]"#);
        let viewer = viewer_with(StaticFetcher::new(), store);
        let resolution = viewer.resolve(&Page::at("poster.html?id=7").unwrap()).await.unwrap();
        assert_eq!(resolution.base.title.as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn test_fragment_failure_is_a_notice() {
        let store = seeded_store(r#"[{"id":1,"title":"Nova"}]"#);
        let fetcher = StaticFetcher::new().route("/data/generated/1.json", 500, "oops");
        let viewer = viewer_with(fetcher, store);
        let mut page = detail_page("1");

        let view = viewer.open(&mut page).await.unwrap();
        assert_eq!(view.title, "Nova");
        assert_eq!(page.notices().len(), 1);
        assert!(page.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_leaves_snapshot_alone() {
        let store = seeded_store(r#"[{"id":1,"title":"Nova"}]"#);
        let mut viewer = viewer_with(StaticFetcher::offline(), store);
        let mut page = Page::headless().with_region(Region::Grid);
        viewer.start(&mut page).await;
        viewer.set_query("nova", &mut page);
        viewer.reset(&mut page);

        assert!(page.markup(Region::Grid).unwrap().contains(r#"class="empty""#));
        let kept = viewer.snapshot.load().unwrap().unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id_text(), "1");
    }

    #[tokio::test]
    async fn test_empty_list_load_still_saves() {
        let store = seeded_store(r#"[{"id":1,"title":"Nova"}]"#);
        let fetcher = StaticFetcher::new().route(LIST, 200, "[]");
        let mut viewer = viewer_with(fetcher, store);
        let mut page = Page::headless().with_region(Region::Grid);
        viewer.start(&mut page).await;
        assert_eq!(viewer.snapshot.load().unwrap(), Some(vec![]));
    }

    #[tokio::test]
    async fn test_list_then_detail_handoff() {
        let fetcher = StaticFetcher::new().route(
            LIST,
            200,
            r#"[{"id":"a b","title":"Spaced"},{"id":2,"title":"Other"}]"#,
        );
        let mut list_viewer = viewer(fetcher);
        let mut list_page = Page::headless().with_region(Region::Grid);
        list_viewer.start(&mut list_page).await;

        let handoff = list_viewer.snapshot.inner().get(SNAPSHOT_KEY).unwrap().unwrap();
        let mut detail_viewer = viewer_with(StaticFetcher::new(), seeded_store(&handoff));
        let mut page = detail_page("a b");
        detail_viewer.start(&mut page).await;
        assert!(page.markup(Region::Details).unwrap().contains("<h2>Spaced</h2>"));
        assert_eq!(detail_viewer.fetcher.requested(), vec!["/data/generated/a%20b.json"]);
    }
}
