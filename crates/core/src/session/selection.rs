use std::path::{Path, PathBuf};

/// At most one selected source image and one annotated output produced
/// from it. Selecting a new source drops the stale annotation; an explicit
/// clear drops both. Existence of either file is re-checked at use, never
/// assumed to persist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSelection {
    source: Option<PathBuf>,
    annotated: Option<PathBuf>,
}

impl ImageSelection {
    pub fn select(&mut self, path: PathBuf) {
        self.source = Some(path);
        self.annotated = None;
    }

    pub fn set_annotated(&mut self, path: PathBuf) {
        self.annotated = Some(path);
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.annotated = None;
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn annotated(&self) -> Option<&Path> {
        self.annotated.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_selection_drops_stale_annotation() {
        let mut selection = ImageSelection::default();
        selection.select(PathBuf::from("a.jpg"));
        selection.set_annotated(PathBuf::from("a_annotated.jpg"));
        selection.select(PathBuf::from("b.jpg"));
        assert_eq!(selection.source(), Some(Path::new("b.jpg")));
        assert_eq!(selection.annotated(), None);
    }

    #[test]
    fn test_clear_drops_both_paths() {
        let mut selection = ImageSelection::default();
        selection.select(PathBuf::from("a.jpg"));
        selection.set_annotated(PathBuf::from("a_annotated.jpg"));
        selection.clear();
        assert_eq!(selection, ImageSelection::default());
    }
}
