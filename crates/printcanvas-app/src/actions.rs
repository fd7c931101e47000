//! Edit actions shared by command-line commands and keyboard shortcuts.

use kurbo::Point;
use printcanvas_core::{DesignStore, FilterSettings, Storage};

/// One user gesture against the design store.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    Undo,
    Redo,
    Reset,
    ZoomIn,
    ZoomOut,
    RotateLeft,
    RotateRight,
    FlipX,
    FlipY,
    SetFilter(FilterSettings),
    SetFormat(String),
    SetImage(String),
    MoveTo(Point),
    MarkSaved,
}

impl EditAction {
    /// Apply the action to `store`.
    pub fn apply<S: Storage>(self, store: &mut DesignStore<S>) {
        log::debug!("Applying {}", self.label());
        match self {
            EditAction::Undo => store.undo(),
            EditAction::Redo => store.redo(),
            EditAction::Reset => store.reset_design(),
            EditAction::ZoomIn => store.zoom_in(),
            EditAction::ZoomOut => store.zoom_out(),
            EditAction::RotateLeft => store.rotate_left(),
            EditAction::RotateRight => store.rotate_right(),
            EditAction::FlipX => store.toggle_flip_x(),
            EditAction::FlipY => store.toggle_flip_y(),
            EditAction::SetFilter(filter) => store.set_filter(filter),
            EditAction::SetFormat(id) => store.set_format(&id),
            EditAction::SetImage(url) => store.set_image(url),
            EditAction::MoveTo(position) => store.move_to(position),
            EditAction::MarkSaved => store.mark_saved(),
        }
    }

    /// Short human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            EditAction::Undo => "Undo",
            EditAction::Redo => "Redo",
            EditAction::Reset => "Start over",
            EditAction::ZoomIn => "Zoom in",
            EditAction::ZoomOut => "Zoom out",
            EditAction::RotateLeft => "Rotate left",
            EditAction::RotateRight => "Rotate right",
            EditAction::FlipX => "Flip horizontally",
            EditAction::FlipY => "Flip vertically",
            EditAction::SetFilter(_) => "Set filter",
            EditAction::SetFormat(_) => "Set format",
            EditAction::SetImage(_) => "Set image",
            EditAction::MoveTo(_) => "Move image",
            EditAction::MarkSaved => "Mark saved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printcanvas_core::{FilterKind, MemoryStorage, StoreConfig};
    use std::sync::Arc;

    #[test]
    fn test_apply_sequence() {
        let mut store = DesignStore::new(Arc::new(MemoryStorage::new()), StoreConfig::default());

        EditAction::RotateRight.apply(&mut store);
        EditAction::FlipY.apply(&mut store);
        EditAction::SetFilter(FilterSettings::new(FilterKind::Sepia)).apply(&mut store);
        EditAction::SetFormat("40x40".to_string()).apply(&mut store);

        assert_eq!(store.design().rotation, 90.0);
        assert!(store.design().flip_y);
        assert_eq!(store.design().filter.kind, FilterKind::Sepia);
        assert_eq!(store.design().format.as_deref(), Some("40x40"));

        EditAction::Undo.apply(&mut store);
        assert_eq!(store.design().format.as_deref(), Some("30x40"));
        EditAction::Redo.apply(&mut store);
        assert_eq!(store.design().format.as_deref(), Some("40x40"));

        EditAction::Reset.apply(&mut store);
        assert!(!store.can_undo());
        assert_eq!(store.design().rotation, 0.0);
    }
}
