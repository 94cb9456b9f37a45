use thiserror::Error;

/// Errors raised while talking to the catalog endpoints, the snapshot store
/// or the local filesystem.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Analysis text is missing one of its section headers")]
    AnalysisFormat,

    #[error("Poster id {0:?} cannot name a fragment file")]
    InvalidId(String),
}

impl CatalogError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Status { url, status } => {
                format!("Server answered {} for {}", status, url)
            }
            CatalogError::Http(e) => format!("Network error: {}", e),
            CatalogError::Url(e) => format!("Bad endpoint address: {}", e),
            CatalogError::Io(e) => format!("File system error: {}", e),
            CatalogError::Serialization(e) => format!("Data format error: {}", e),
            CatalogError::Configuration(msg) => format!("Configuration error: {}", msg),
            CatalogError::AnalysisFormat => {
                "Analysis must contain the simple, research and tags sections".to_string()
            }
            CatalogError::InvalidId(id) => {
                format!("Poster id {:?} contains a path separator or is not a file name", id)
            }
        }
    }
}

/// Errors that stop the detail view. They are shown to the user as a
/// blocking notification and nothing is rendered.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("no id parameter supplied")]
    MissingId,

    #[error("no cached poster list")]
    NoSnapshot,

    #[error("poster {id} not found in the cached list")]
    NotFound { id: String },

    #[error("cached poster list is unreadable: {0}")]
    CorruptSnapshot(#[source] CatalogError),
}

impl ViewError {
    pub fn user_message(&self) -> String {
        match self {
            ViewError::MissingId => "No poster id was given.".to_string(),
            ViewError::NoSnapshot => {
                "No posters in local memory. Go back to the list and refresh.".to_string()
            }
            ViewError::NotFound { id } => {
                format!("Poster {} was not found in the poster list.", id)
            }
            ViewError::CorruptSnapshot(e) => {
                format!("The cached poster list could not be read: {}", e.user_message())
            }
        }
    }
}
