mod analysis;
mod app;
mod config;
mod detail;
mod error;
mod fetch;
mod filter;
mod html;
mod model;
mod page;
mod store;
mod ui;
mod viewer;

use app::{App, InputMode, View};
use clap::{Parser, Subcommand};
use config::ViewerConfig;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use fetch::{Endpoints, Fetch, HttpFetcher};
use page::{Page, Region};
use std::path::{Path, PathBuf};
use store::{FileStore, KeyValueStore};
use tracing_subscriber::EnvFilter;
use viewer::CatalogViewer;

/// Searchable poster catalog viewer
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL the endpoints are resolved against
    #[arg(long, global = true)]
    origin: Option<String>,

    /// Poster list endpoint (absolute, or relative to the origin)
    #[arg(long, global = true)]
    list_url: Option<String>,

    /// Directory of per-poster analysis fragments
    #[arg(long, global = true)]
    generated_base: Option<String>,

    /// Directory of the local snapshot store
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog in the terminal (default)
    Browse,
    /// Render the poster grid as an HTML page
    List {
        /// Search text applied to title, description and tags
        #[arg(short, long, default_value = "")]
        query: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render one poster's detail page from the cached list
    Detail {
        /// Poster id
        #[arg(short, long)]
        id: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Convert an analysis text into a poster fragment
    Ingest {
        /// Analysis text file
        #[arg(short, long)]
        input: PathBuf,
        /// Poster id the analysis belongs to
        #[arg(long)]
        id: String,
        /// Directory the fragment is written to
        #[arg(short, long, default_value = "data/generated")]
        out_dir: PathBuf,
    },
    /// Forget the cached poster list
    Clear,
}

impl Cli {
    fn config(&self) -> Result<ViewerConfig, error::CatalogError> {
        let mut config = ViewerConfig::load()?;
        if let Some(origin) = &self.origin {
            config.origin = origin.clone();
        }
        if let Some(list_url) = &self.list_url {
            config.list_url = list_url.clone();
        }
        if let Some(base) = &self.generated_base {
            config.generated_base = base.clone();
        }
        if let Some(dir) = &self.store_dir {
            config.store_dir = dir.clone();
        }
        Ok(config)
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("poster_catalog=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.config()?;
    let command = cli.command.unwrap_or(Commands::Browse);

    let store = FileStore::open(&config.store_dir)?;
    if matches!(command, Commands::Browse) {
        init_logging(Some(&config.store_dir.join("viewer.log")))?;
    } else {
        init_logging(None)?;
    }

    match command {
        Commands::Ingest { input, id, out_dir } => {
            if !input.exists() {
                eprintln!("Error: input file not found: {}", input.display());
                std::process::exit(1);
            }
            let out = analysis::ingest_file(&input, &id, &out_dir)?;
            eprintln!("Wrote {}", out.display());
        }
        Commands::Clear => {
            let mut store = store;
            store.clear()?;
            eprintln!("Cleared cached posters in {}", config.store_dir.display());
        }
        Commands::List { query, out } => {
            let mut viewer = CatalogViewer::new(Endpoints::from_config(&config)?, HttpFetcher::new()?, store);
            let mut page = Page::headless().with_region(Region::Grid);
            viewer.start(&mut page).await;
            if !query.is_empty() {
                viewer.set_query(&query, &mut page);
            }
            write_page(&page, "Posters", out.as_deref())?;
        }
        Commands::Detail { id, out } => {
            let viewer = CatalogViewer::new(Endpoints::from_config(&config)?, HttpFetcher::new()?, store);
            let location = match &id {
                Some(id) => html::detail_href(id),
                None => html::DETAIL_PAGE.to_string(),
            };
            let mut page = Page::at(&location)?.with_region(Region::Details);
            let view = viewer.open(&mut page).await;
            for notice in page.notices() {
                eprintln!("Warning: {}", notice);
            }
            match view {
                Some(view) => write_page(&page, &view.heading(), out.as_deref())?,
                None => {
                    for alert in page.alerts() {
                        eprintln!("Error: {}", alert);
                    }
                    std::process::exit(1);
                }
            }
        }
        Commands::Browse => {
            let viewer = CatalogViewer::new(Endpoints::from_config(&config)?, HttpFetcher::new()?, store);

            // Create app
            let mut app = App::new(viewer);
            app.init().await;

            // Init terminal
            let mut terminal = ratatui::init();

            // Initial page size setup
            let size = terminal.size()?;
            app.update_page_size(size.height);

            // Main loop
            let result = run_app(&mut terminal, &mut app).await;

            // Restore terminal
            ratatui::restore();

            if let Err(e) = result {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn write_page(page: &Page, title: &str, out: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let document = page.to_document(title);
    match out {
        Some(path) => {
            std::fs::write(path, document)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", document),
    }
    Ok(())
}

async fn run_app<S: KeyValueStore, F: Fetch>(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App<S, F>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll for events with a 250ms timeout
        if crossterm::event::poll(std::time::Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key).await?;
                }
                Event::Resize(_, height) => {
                    app.update_page_size(height);
                }
                _ => {}
            }
        }
    }
}

async fn handle_key<S: KeyValueStore, F: Fetch>(
    app: &mut App<S, F>,
    key: KeyEvent,
) -> Result<(), Box<dyn std::error::Error>> {
    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    // An alert blocks everything until dismissed
    if app.alert.is_some() {
        app.alert = None;
        return Ok(());
    }

    // Help toggle (global)
    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return Ok(());
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return Ok(());
    }

    if app.input_mode == InputMode::Editing {
        handle_filter_input(app, key);
        return Ok(());
    }
    match app.view {
        View::List => handle_list_key(app, key).await?,
        View::Detail => handle_detail_key(app, key),
    }

    Ok(())
}

fn handle_filter_input<S: KeyValueStore, F: Fetch>(app: &mut App<S, F>, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.filter.pop();
            app.apply_filter();
        }
        KeyCode::Char(c) => {
            app.filter.push(c);
            app.apply_filter();
        }
        _ => {}
    }
}

async fn handle_list_key<S: KeyValueStore, F: Fetch>(
    app: &mut App<S, F>,
    key: KeyEvent,
) -> Result<(), Box<dyn std::error::Error>> {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.list_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.list_prev();
        }
        KeyCode::PageDown => {
            app.list_page_down();
        }
        KeyCode::PageUp => {
            app.list_page_up();
        }
        KeyCode::Char('g') => {
            app.list_first_page();
        }
        KeyCode::Char('G') => {
            app.list_last_page();
        }
        KeyCode::Enter => {
            app.open_detail().await?;
        }
        KeyCode::Esc => {
            if !app.filter.is_empty() {
                app.reset_filter();
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_detail_key<S: KeyValueStore, F: Fetch>(app: &mut App<S, F>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.close_detail();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_down();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_up();
        }
        KeyCode::PageDown => {
            app.scroll_page_down();
        }
        KeyCode::PageUp => {
            app.scroll_page_up();
        }
        _ => {}
    }
}
