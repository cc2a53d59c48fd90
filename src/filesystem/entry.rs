use std::time::SystemTime;

use super::path;

/// Attributes reported by the lister. The navigation core never reads them,
/// they only feed the row rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
    pub is_symlink: bool,
}

/// One item of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
    pub full_path: String,
    pub metadata: EntryMetadata,
}

impl Entry {
    pub fn new(name: impl Into<String>, is_dir: bool, full_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir,
            full_path: full_path.into(),
            metadata: EntryMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: EntryMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Synthetic `..` row pointing at the parent of `dir`.
    pub fn parent_of(dir: &str) -> Self {
        let target = path::parent(dir);
        Self::new("..", true, target)
    }

    pub fn is_parent_link(&self) -> bool {
        self.name == ".."
    }

    /// Name as shown in the list; directories carry a trailing separator.
    pub fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}
