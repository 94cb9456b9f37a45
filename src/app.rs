use crate::detail::DetailView;
use crate::error::CatalogError;
use crate::fetch::Fetch;
use crate::html::detail_href;
use crate::model::PosterRecord;
use crate::page::Page;
use crate::store::KeyValueStore;
use crate::viewer::CatalogViewer;

/// Which view is currently active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
}

/// Input mode for the filter bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub const LIST_OVERHEAD: u16 = 9;

/// Terminal browser state on top of a [`CatalogViewer`].
pub struct App<S, F> {
    pub viewer: CatalogViewer<S, F>,
    /// The list page the viewer refreshes through. It has no regions; the
    /// terminal draws the grid itself.
    pub page: Page,
    pub should_quit: bool,
    pub view: View,
    pub show_help: bool,

    // Records matching the filter, in list order
    pub visible: Vec<PosterRecord>,

    // List view state
    pub list_selected: usize, // Index within visible page
    pub list_offset: usize,   // Offset into visible
    pub page_size: usize,

    pub filter: String,
    pub input_mode: InputMode,

    // Detail view state
    pub detail: Option<DetailView>,
    pub detail_scroll: u16,

    /// Blocking message; drawn on top of everything until dismissed.
    pub alert: Option<String>,
    pub status_msg: String,
}

impl<S: KeyValueStore, F: Fetch> App<S, F> {
    pub fn new(viewer: CatalogViewer<S, F>) -> Self {
        Self {
            viewer,
            page: Page::headless(),
            should_quit: false,
            view: View::List,
            show_help: false,

            visible: Vec::new(),

            list_selected: 0,
            list_offset: 0,
            page_size: 20, // Initial default, will be updated on first render/resize

            filter: String::new(),
            input_mode: InputMode::Normal,

            detail: None,
            detail_scroll: 0,

            alert: None,
            status_msg: "Loading posters...".to_string(),
        }
    }

    /// Initial data load.
    pub async fn init(&mut self) {
        if self.viewer.load(&mut self.page).await {
            self.apply_filter();
            self.status_msg = format!("{} posters loaded", self.viewer.records().len());
        } else {
            self.sync_visible();
            self.status_msg = "Could not load the poster list (see log)".to_string();
        }
    }

    /// The current page of visible records.
    pub fn list_items(&self) -> &[PosterRecord] {
        let start = self.list_offset.min(self.visible.len());
        let end = (start + self.page_size).min(self.visible.len());
        &self.visible[start..end]
    }

    pub fn selected(&self) -> Option<&PosterRecord> {
        self.list_items().get(self.list_selected)
    }

    /// Update page size based on terminal height.
    pub fn update_page_size(&mut self, terminal_height: u16) {
        let new_size = terminal_height.saturating_sub(LIST_OVERHEAD) as usize;
        self.page_size = new_size.max(1);
        self.list_selected = self
            .list_selected
            .min(self.list_items().len().saturating_sub(1));
    }

    /// Move selection down in the list.
    pub fn list_next(&mut self) {
        if self.list_items().is_empty() {
            return;
        }
        if self.list_selected + 1 < self.list_items().len() {
            self.list_selected += 1;
        } else {
            // Next page
            let new_offset = self.list_offset + self.page_size;
            if new_offset < self.visible.len() {
                self.list_offset = new_offset;
                self.list_selected = 0;
            }
        }
    }

    /// Move selection up in the list.
    pub fn list_prev(&mut self) {
        if self.list_selected > 0 {
            self.list_selected -= 1;
        } else if self.list_offset > 0 {
            // Prev page
            self.list_offset = self.list_offset.saturating_sub(self.page_size);
            self.list_selected = self.list_items().len().saturating_sub(1);
        }
    }

    pub fn list_page_down(&mut self) {
        let new_offset = self.list_offset + self.page_size;
        if new_offset < self.visible.len() {
            self.list_offset = new_offset;
            self.list_selected = 0;
        } else {
            // Go to end
            self.list_last_page();
        }
    }

    pub fn list_page_up(&mut self) {
        self.list_offset = self.list_offset.saturating_sub(self.page_size);
        self.list_selected = 0;
    }

    pub fn list_first_page(&mut self) {
        self.list_offset = 0;
        self.list_selected = 0;
    }

    pub fn list_last_page(&mut self) {
        if !self.visible.is_empty() {
            self.list_offset = (self.visible.len().saturating_sub(1) / self.page_size) * self.page_size;
            self.list_selected = self.list_items().len().saturating_sub(1);
        }
    }

    /// Push the filter text to the viewer and reset the list. Runs on every
    /// keystroke.
    pub fn apply_filter(&mut self) {
        self.viewer.set_query(&self.filter, &mut self.page);
        self.sync_visible();
    }

    pub fn reset_filter(&mut self) {
        self.filter.clear();
        self.viewer.reset(&mut self.page);
        self.sync_visible();
    }

    fn sync_visible(&mut self) {
        self.visible = self.viewer.visible().into_iter().cloned().collect();
        self.list_offset = 0;
        self.list_selected = 0;
        self.status_msg = self.match_status();
    }

    fn match_status(&self) -> String {
        format!(
            "{} posters match \"{}\"",
            self.visible.len(),
            if self.filter.trim().is_empty() { "all" } else { self.filter.as_str() }
        )
    }

    /// Open the detail view for the selected poster the way the detail page
    /// would: by id, through the snapshot.
    pub async fn open_detail(&mut self) -> Result<(), CatalogError> {
        let Some(id) = self.selected().map(PosterRecord::id_text) else {
            return Ok(());
        };
        let mut page = Page::at(&detail_href(&id))?;
        match self.viewer.open(&mut page).await {
            Some(view) => {
                self.status_msg = page.notices().first().cloned().unwrap_or_default();
                self.detail = Some(view);
                self.detail_scroll = 0;
                self.view = View::Detail;
            }
            None => {
                self.alert = page.alerts().first().cloned();
            }
        }
        Ok(())
    }

    pub fn close_detail(&mut self) {
        self.view = View::List;
        self.detail = None;
        self.status_msg = self.match_status();
    }

    pub fn scroll_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
    }

    pub fn scroll_page_down(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_add(20);
    }

    pub fn scroll_page_up(&mut self) {
        self.detail_scroll = self.detail_scroll.saturating_sub(20);
    }
}
