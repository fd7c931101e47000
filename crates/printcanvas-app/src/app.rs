//! Application shell: opens the saved design, applies one command, saves.

use crate::args::{Cli, Command};
use crate::shortcuts::ShortcutRegistry;
use printcanvas_core::formats::{self, FormatCategory};
use printcanvas_core::storage::{FileStorage, create_default_storage};
use printcanvas_core::{DesignStore, FlushOutcome, Storage, StorageError, StoreConfig};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported to the command-line user.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Failed to render design: {0}")]
    Render(#[from] serde_json::Error),
    #[error("The design could not be saved; the edit was lost")]
    NotSaved,
}

/// Application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Directory for the file slot; `None` uses the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// Print designs as JSON.
    pub json_output: bool,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Configuration from parsed command-line flags.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            data_dir: cli.dir.clone(),
            json_output: cli.json,
            store: StoreConfig::default(),
        }
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create a new application with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self { config }
    }

    fn open_storage(&self) -> Result<Arc<FileStorage>, StorageError> {
        let storage = match &self.config.data_dir {
            Some(dir) => Arc::new(FileStorage::new(dir.clone())?),
            None => create_default_storage()?,
        };
        log::debug!("Using storage at {}", storage.base_path().display());
        Ok(storage)
    }

    /// Run one command and return the text to print.
    pub async fn run(&self, command: Command) -> Result<String, AppError> {
        if !command.uses_store() {
            return Ok(match command {
                Command::Formats => format_table(),
                _ => ShortcutRegistry::describe(),
            });
        }

        let storage = self.open_storage()?;
        let mut store = DesignStore::load(storage, self.config.store.clone()).await;

        if let Some(action) = command.action() {
            action.apply(&mut store);
        }

        match store.flush().await {
            FlushOutcome::Failed => return Err(AppError::NotSaved),
            FlushOutcome::SavedMinimal => {
                log::warn!("Storage is full: only the current design was kept, without its image");
            }
            outcome => log::debug!("Flush: {:?}", outcome),
        }

        if self.config.json_output {
            Ok(serde_json::to_string_pretty(store.design())?)
        } else {
            Ok(describe(&store))
        }
    }
}

/// Human-readable summary of the current design.
pub fn describe<S: Storage>(store: &DesignStore<S>) -> String {
    let design = store.design();
    let format = formats::for_design(design);
    let flips = match (design.flip_x, design.flip_y) {
        (false, false) => "none",
        (true, false) => "horizontal",
        (false, true) => "vertical",
        (true, true) => "both",
    };
    let filter = match design.filter.intensity {
        Some(intensity) => format!("{} ({})", design.filter.kind, intensity),
        None => design.filter.kind.to_string(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "Design {}", design.id);
    let _ = writeln!(out, "  image:    {}", design.image_url.as_deref().unwrap_or("none"));
    let _ = writeln!(out, "  format:   {} ({})", format.id, format.name);
    let _ = writeln!(out, "  scale:    {:.0}%", design.scale * 100.0);
    let _ = writeln!(out, "  rotation: {}°", design.normalized_rotation());
    let _ = writeln!(out, "  flip:     {}", flips);
    let _ = writeln!(out, "  filter:   {}", filter);
    let _ = writeln!(out, "  position: ({}, {})", design.position.x, design.position.y);
    let _ = writeln!(out, "  unsaved:  {}", if design.has_changes { "yes" } else { "no" });
    let _ = writeln!(
        out,
        "  history:  {} undo, {} redo",
        store.history().past.len(),
        store.history().future.len()
    );
    out
}

/// Printable list of formats grouped by category.
pub fn format_table() -> String {
    let mut out = String::new();
    for category in FormatCategory::all() {
        let _ = writeln!(out, "{}", category);
        for f in formats::by_category(category) {
            let _ = writeln!(
                out,
                "  {:6} {:18} {}×{} cm  safety {} mm, content {} mm, bleed {} mm",
                f.id, f.name, f.width, f.height, f.safety_margin, f.content_margin, f.bleed_margin
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn app_in(dir: &std::path::Path, json: bool) -> App {
        App::with_config(AppConfig {
            data_dir: Some(dir.to_path_buf()),
            json_output: json,
            store: StoreConfig::default(),
        })
    }

    #[test]
    fn test_edits_persist_between_runs() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path(), false);

        pollster::block_on(app.run(Command::RotateRight)).unwrap();
        pollster::block_on(app.run(Command::ZoomIn)).unwrap();
        let out = pollster::block_on(app.run(Command::Show)).unwrap();

        assert!(out.contains("rotation: 90°"));
        assert!(out.contains("scale:    110%"));
        assert!(out.contains("history:  2 undo, 0 redo"));

        let out = pollster::block_on(app.run(Command::Undo)).unwrap();
        assert!(out.contains("scale:    100%"));
        assert!(out.contains("history:  1 undo, 1 redo"));
    }

    #[test]
    fn test_reset_removes_file() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path(), false);

        pollster::block_on(app.run(Command::FlipX)).unwrap();
        let slot = dir.path().join("drwpp-design-storage.json");
        assert!(slot.exists());

        pollster::block_on(app.run(Command::Reset)).unwrap();
        assert!(!slot.exists());
    }

    #[test]
    fn test_json_output() {
        let dir = tempdir().unwrap();
        let app = app_in(dir.path(), true);

        let out = pollster::block_on(app.run(Command::Format {
            id: "90x60".to_string(),
        }))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["format"], "90x60");
        assert_eq!(value["formatType"], "landscape");
        assert_eq!(value["hasChanges"], true);
    }

    #[test]
    fn test_format_table() {
        let table = format_table();
        assert!(table.starts_with("square\n"));
        assert!(table.contains("60x90"));
        assert_eq!(table.lines().count(), 12);
    }
}
