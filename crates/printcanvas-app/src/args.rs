//! Command-line argument structures and enums

use crate::actions::EditAction;
use clap::{Parser, Subcommand};
use kurbo::Point;
use printcanvas_core::{FilterKind, FilterSettings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "printcanvas")]
#[command(version)]
#[command(about = "Edit a canvas print design from the command line", long_about = None)]
pub struct Cli {
    /// Directory holding the saved design (default: platform data dir)
    #[arg(short, long, global = true, env = "PRINTCANVAS_DATA_DIR")]
    pub dir: Option<PathBuf>,

    /// Print the design as JSON instead of a summary
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the current design
    Show,

    /// Undo the last edit
    Undo,

    /// Redo the last undone edit
    Redo,

    /// Discard the design and its history
    Reset,

    /// Enlarge the image one step (max 200%)
    ZoomIn,

    /// Shrink the image one step (min 50%)
    ZoomOut,

    /// Rotate a quarter turn counter-clockwise
    RotateLeft,

    /// Rotate a quarter turn clockwise
    RotateRight,

    /// Mirror horizontally
    FlipX,

    /// Mirror vertically
    FlipY,

    /// Apply an image filter
    Filter {
        /// normal, grayscale, sepia, invert, blur, brightness, contrast, saturate or custom
        kind: FilterKind,

        /// Filter strength
        #[arg(short, long)]
        intensity: Option<f64>,

        /// Effect definition for the custom filter
        #[arg(long)]
        css: Option<String>,
    },

    /// Switch print format (see `formats`)
    Format {
        /// Format identifier, e.g. 30x40
        id: String,
    },

    /// Set the image reference
    Image {
        /// URL or data: URI of the uploaded image
        url: String,
    },

    /// Move the image relative to the centre of the print area
    Move {
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },

    /// Mark the design as committed
    Saved,

    /// List available print formats
    Formats,

    /// List editor keyboard shortcuts
    Shortcuts,
}

impl Command {
    /// The store edit this command performs, if it edits anything.
    pub fn action(&self) -> Option<EditAction> {
        let action = match self {
            Command::Show | Command::Formats | Command::Shortcuts => return None,
            Command::Undo => EditAction::Undo,
            Command::Redo => EditAction::Redo,
            Command::Reset => EditAction::Reset,
            Command::ZoomIn => EditAction::ZoomIn,
            Command::ZoomOut => EditAction::ZoomOut,
            Command::RotateLeft => EditAction::RotateLeft,
            Command::RotateRight => EditAction::RotateRight,
            Command::FlipX => EditAction::FlipX,
            Command::FlipY => EditAction::FlipY,
            Command::Filter {
                kind,
                intensity,
                css,
            } => EditAction::SetFilter(FilterSettings {
                kind: *kind,
                intensity: *intensity,
                custom_css: css.clone(),
            }),
            Command::Format { id } => EditAction::SetFormat(id.clone()),
            Command::Image { url } => EditAction::SetImage(url.clone()),
            Command::Move { x, y } => EditAction::MoveTo(Point::new(*x, *y)),
            Command::Saved => EditAction::MarkSaved,
        };
        Some(action)
    }

    /// Whether the command needs the stored design.
    pub fn uses_store(&self) -> bool {
        !matches!(self, Command::Formats | Command::Shortcuts)
    }
}
