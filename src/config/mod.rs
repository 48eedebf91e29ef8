// Customization document - grid dimensions, scale, instrument, custom mapping
//
// Stored as JSON by default; a `.ron` extension selects RON instead.

use crate::grid::model::{BASELINE_OCTAVE, GridError, NoteGrid};
use crate::grid::scale::Scale;
use crate::midi::names::{Instrument, UnknownInstrument};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    #[error("Invalid grid: {0}")]
    Grid(#[from] GridError),

    #[error(transparent)]
    Instrument(#[from] UnknownInstrument),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Ron,
}

impl DocumentFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => DocumentFormat::Ron,
            _ => DocumentFormat::Json,
        }
    }
}

fn default_base_octave() -> i32 {
    BASELINE_OCTAVE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub grid_rows: usize,
    pub grid_columns: usize,
    pub scale: String,
    pub instrument: String,
    #[serde(default = "default_base_octave")]
    pub base_octave: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_mapping: Option<Vec<Vec<u8>>>,
}

impl Default for Customization {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Customization {
    pub fn default_config() -> Self {
        Self {
            grid_rows: 4,
            grid_columns: 8,
            scale: "C Major".to_string(),
            instrument: Instrument::Piano.name().to_string(),
            base_octave: BASELINE_OCTAVE,
            custom_mapping: None,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let config = match DocumentFormat::for_path(path) {
            DocumentFormat::Json => serde_json::from_str(&text)?,
            DocumentFormat::Ron => ron::from_str(&text)?,
        };
        log::debug!("Loaded customization from {}", path.display());
        Ok(config)
    }

    /// Load `path`, falling back to the defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "No customization at {}, using defaults",
                    path.as_ref().display()
                );
                Ok(Self::default_config())
            }
            other => other,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let text = match DocumentFormat::for_path(path) {
            DocumentFormat::Json => serde_json::to_string_pretty(self)?,
            DocumentFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?,
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn scale(&self) -> Result<Scale, ConfigError> {
        Ok(Scale::from_name(&self.scale)?)
    }

    pub fn instrument(&self) -> Result<Instrument, ConfigError> {
        Ok(self.instrument.parse()?)
    }

    /// Build the grid this document describes; a custom mapping wins over the scale
    pub fn to_grid(&self) -> Result<NoteGrid, ConfigError> {
        let grid = match &self.custom_mapping {
            Some(mapping) => NoteGrid::new(
                self.grid_rows,
                self.grid_columns,
                mapping.clone(),
                self.base_octave,
            )?,
            None => NoteGrid::with_scale(
                self.grid_rows,
                self.grid_columns,
                self.base_octave,
                self.scale()?,
            )?,
        };
        Ok(grid)
    }
}

/// `<platform config dir>/padplay/customization.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("padplay").join("customization.json"))
        .ok_or(ConfigError::NoConfigDir)
}
