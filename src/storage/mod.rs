use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use crate::models::WorkoutEntry;
use crate::types::Config;

pub mod local;
pub mod sheets;

pub use local::FileStorage;
pub use sheets::{HttpSheetsClient, SheetsStorage};

pub const DEFAULT_SHEET_NAME: &str = "Log";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid remove index {index} ({matches} matching entries)")]
    InvalidIndex { index: usize, matches: usize },

    #[error("no workout log found for year {year}")]
    MissingYearLog { year: i32 },

    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    Config(String),
}

impl StorageError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// The five operations every backend offers. All reads are full scans of the
/// backend's current period; there is no index.
#[allow(async_fn_in_trait)]
pub trait Storage {
    /// Add one entry at the end of the partition its date belongs to.
    async fn append(&self, entry: &WorkoutEntry) -> Result<(), StorageError>;

    /// Up to `limit` most recent entries of the current period, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<WorkoutEntry>, StorageError>;

    /// Every entry dated exactly `date`, in storage order.
    async fn search_by_date(&self, date: &str) -> Result<Vec<WorkoutEntry>, StorageError>;

    /// Remove the `index`-th (0-based) entry among those dated `date`.
    async fn remove_by_date_index(&self, date: &str, index: usize) -> Result<(), StorageError>;

    /// `(day, date)` of the last entry of the current period.
    async fn last_training_day(&self) -> Result<Option<(String, String)>, StorageError>;
}

/// Keep the last `limit` entries, preserving their order.
pub(crate) fn keep_last(mut entries: Vec<WorkoutEntry>, limit: usize) -> Vec<WorkoutEntry> {
    if entries.len() > limit {
        entries.drain(..entries.len() - limit);
    }
    entries
}

/// Position `index` in the list of matches, or `InvalidIndex`.
pub(crate) fn pick<T: Copy>(matches: &[T], index: usize) -> Result<T, StorageError> {
    matches
        .get(index)
        .copied()
        .ok_or(StorageError::InvalidIndex {
            index,
            matches: matches.len(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Sheets,
}

/// Everything needed to pick and open a backend. Environment variables win
/// over config file keys; blank values count as unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend: BackendKind,
    pub log_dir: Option<PathBuf>,
    pub sheet_id: Option<String>,
    pub sheet_name: String,
    pub credentials: Option<PathBuf>,
    pub strict_menus: bool,
}

impl Settings {
    pub fn from_env(cfg: &Config) -> Self {
        Self::resolve(cfg, |key| std::env::var(key).ok())
    }

    pub fn resolve(cfg: &Config, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        let lookup = |env_key: &str, cfg_key: &str| {
            non_blank(env(env_key)).or_else(|| non_blank(cfg.get(cfg_key).map(str::to_string)))
        };

        let backend = match lookup("CALI_STORAGE", "storage") {
            Some(v) if v.eq_ignore_ascii_case("local") => BackendKind::Local,
            _ => BackendKind::Sheets,
        };

        let credentials = non_blank(env("CALI_GOOGLE_CREDENTIALS_JSON"))
            .or_else(|| non_blank(env("GOOGLE_APPLICATION_CREDENTIALS")))
            .or_else(|| non_blank(cfg.get("credentials").map(str::to_string)))
            .map(PathBuf::from);

        let strict_menus = lookup("CALI_STRICT_MENUS", "strict_menus")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Self {
            backend,
            log_dir: lookup("CALI_LOG_DIR", "log_dir").map(PathBuf::from),
            sheet_id: lookup("CALI_SHEET_ID", "sheet_id"),
            sheet_name: lookup("CALI_SHEET_NAME", "sheet_name")
                .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            credentials,
            strict_menus,
        }
    }
}

/// The backend chosen at startup.
pub enum Backend {
    Local(FileStorage),
    Sheets(SheetsStorage<HttpSheetsClient>),
}

impl Backend {
    pub async fn open(settings: &Settings) -> Result<Self, StorageError> {
        match settings.backend {
            BackendKind::Local => {
                let dir = match &settings.log_dir {
                    Some(dir) => dir.clone(),
                    None => FileStorage::default_dir()?,
                };
                let storage = FileStorage::new(dir);
                debug!("using local storage at {}", storage.log_dir().display());
                Ok(Self::Local(storage))
            }

            BackendKind::Sheets => {
                let sheet_id = settings.sheet_id.as_deref().ok_or_else(|| {
                    StorageError::Config(
                        "CALI_SHEET_ID is required (Google Sheets is default; set CALI_STORAGE=local to use local files)"
                            .into(),
                    )
                })?;
                let credentials = settings.credentials.as_deref().ok_or_else(|| {
                    StorageError::Config(
                        "set CALI_GOOGLE_CREDENTIALS_JSON or GOOGLE_APPLICATION_CREDENTIALS".into(),
                    )
                })?;

                debug!("using sheet tab {:?} of spreadsheet {sheet_id}", settings.sheet_name);
                let client = HttpSheetsClient::connect(sheet_id, credentials).await?;
                let storage = SheetsStorage::connect(client, &settings.sheet_name).await?;
                debug!("sheet tab resolved to id {}", storage.sheet_id());
                Ok(Self::Sheets(storage))
            }
        }
    }
}

impl Storage for Backend {
    async fn append(&self, entry: &WorkoutEntry) -> Result<(), StorageError> {
        match self {
            Self::Local(s) => s.append(entry).await,
            Self::Sheets(s) => s.append(entry).await,
        }
    }

    async fn recent(&self, limit: usize) -> Result<Vec<WorkoutEntry>, StorageError> {
        match self {
            Self::Local(s) => s.recent(limit).await,
            Self::Sheets(s) => s.recent(limit).await,
        }
    }

    async fn search_by_date(&self, date: &str) -> Result<Vec<WorkoutEntry>, StorageError> {
        match self {
            Self::Local(s) => s.search_by_date(date).await,
            Self::Sheets(s) => s.search_by_date(date).await,
        }
    }

    async fn remove_by_date_index(&self, date: &str, index: usize) -> Result<(), StorageError> {
        match self {
            Self::Local(s) => s.remove_by_date_index(date, index).await,
            Self::Sheets(s) => s.remove_by_date_index(date, index).await,
        }
    }

    async fn last_training_day(&self) -> Result<Option<(String, String)>, StorageError> {
        match self {
            Self::Local(s) => s.last_training_day().await,
            Self::Sheets(s) => s.last_training_day().await,
        }
    }
}
