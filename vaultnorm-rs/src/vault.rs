//! Vault scanning and the read-only file index used for link resolution.

use crate::error::{Result, VaultError};
use glob::{glob, Pattern};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

/// Extensions (lowercase, no dot) that mark a file as a note.
pub const NOTE_EXTENSIONS: &[&str] = &["md", "markdown", "mdown"];

/// Image-like attachment extensions. PDFs are embedded like images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "pdf"];

/// Audio/video attachment extensions.
pub const MEDIA_EXTENSIONS: &[&str] = &["mp4", "m4a", "webm", "mov", "mp3", "wav", "ogg"];

/// Lowercased extension of the last path segment, if any.
pub fn extension_of(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    if dot == 0 || dot + 1 == name.len() {
        return None;
    }
    Some(name[dot + 1..].to_lowercase())
}

/// Whether a path names a note file.
pub fn is_note_path(path: &str) -> bool {
    extension_of(path).is_some_and(|ext| NOTE_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether a path names an attachment (image, audio, video or PDF).
pub fn is_asset_path(path: &str) -> bool {
    extension_of(path).is_some_and(|ext| {
        IMAGE_EXTENSIONS.contains(&ext.as_str()) || MEDIA_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Strip a note extension, leaving other extensions alone.
pub fn strip_note_extension(path: &str) -> &str {
    if is_note_path(path) {
        if let Some(dot) = path.rfind('.') {
            return &path[..dot];
        }
    }
    path
}

/// Last segment of a `/`-separated path.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Directory part of a `/`-separated path (`""` for the vault root).
pub fn parent_of(path: &str) -> &str {
    path.rfind('/').map(|i| &path[..i]).unwrap_or("")
}

/// File name without its final extension.
pub fn stem_of(path: &str) -> &str {
    let name = file_name_of(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// Unicode NFC form used for every index key and lookup.
pub(crate) fn nfc(s: &str) -> String {
    s.nfc().collect()
}

/// A note discovered during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    /// Absolute path on disk.
    pub path: PathBuf,

    /// Vault-relative path, `/`-separated, no leading slash.
    pub relative: String,

    /// File name without extension.
    pub stem: String,
}

impl VaultFile {
    /// File name with extension.
    pub fn name(&self) -> &str {
        file_name_of(&self.relative)
    }

    /// Relative path with the note extension removed.
    pub fn relative_no_ext(&self) -> &str {
        strip_note_extension(&self.relative)
    }
}

/// Snapshot of a vault taken once per run.
///
/// Holds every note in sorted order, a lookup from file name and stem to the
/// notes carrying it, and a file-name lookup over all regular files for
/// attachment resolution. Nothing is added after [`VaultIndex::scan`].
#[derive(Debug, Clone)]
pub struct VaultIndex {
    root: PathBuf,
    notes: Vec<VaultFile>,
    by_name: HashMap<String, Vec<usize>>,
    by_relative: HashMap<String, usize>,
    files_by_name: HashMap<String, Vec<String>>,
    all_files: HashMap<String, String>,
}

impl VaultIndex {
    /// Scan a vault root.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self> {
        Self::scan_with_exclusions(root, &[])
    }

    /// Scan a vault root, skipping files that match any of `exclude`
    /// (glob patterns relative to the root, `*` crossing folders).
    pub fn scan_with_exclusions(root: impl AsRef<Path>, exclude: &[String]) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(VaultError::VaultNotFound(root.to_path_buf()));
        }
        let root = root
            .canonicalize()
            .map_err(|_| VaultError::InvalidVaultPath(root.to_path_buf()))?;

        let exclude = exclude
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let pattern = format!(
            "{}/**/*",
            Pattern::escape(&root.to_string_lossy())
        );

        let mut relatives = Vec::new();
        for entry in glob(&pattern)? {
            match entry {
                Ok(path) => {
                    if !path.is_file() {
                        continue;
                    }
                    let Ok(relative) = path.strip_prefix(&root) else {
                        continue;
                    };
                    relatives.push(relative.to_path_buf());
                }
                Err(e) => {
                    warn!("glob error while scanning vault: {}", e);
                }
            }
        }

        // Component-wise order, so "a/b.md" sorts before "a-b.md"
        relatives.sort();

        let mut index = VaultIndex {
            root: root.clone(),
            notes: Vec::new(),
            by_name: HashMap::new(),
            by_relative: HashMap::new(),
            files_by_name: HashMap::new(),
            all_files: HashMap::new(),
        };

        for relative in relatives {
            let rel = to_posix(&relative);
            if exclude.iter().any(|p| p.matches(&rel)) {
                debug!(path = %rel, "excluded from scan");
                continue;
            }

            let key = nfc(&rel);
            index
                .files_by_name
                .entry(nfc(file_name_of(&rel)))
                .or_default()
                .push(rel.clone());
            index.all_files.insert(key.clone(), rel.clone());

            if is_note_path(&rel) {
                let file = VaultFile {
                    path: root.join(&relative),
                    stem: stem_of(&rel).to_string(),
                    relative: rel.clone(),
                };
                let idx = index.notes.len();
                index
                    .by_name
                    .entry(nfc(file.name()))
                    .or_default()
                    .push(idx);
                index.by_name.entry(nfc(&file.stem)).or_default().push(idx);
                index.by_relative.insert(key, idx);
                index.notes.push(file);
            }
        }

        debug!(
            notes = index.notes.len(),
            files = index.all_files.len(),
            "vault scanned"
        );

        Ok(index)
    }

    /// Canonical vault root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All notes in sorted scan order.
    pub fn list_notes(&self) -> &[VaultFile] {
        &self.notes
    }

    /// Notes whose file name or stem equals `name_or_stem`.
    pub fn lookup(&self, name_or_stem: &str) -> Vec<&VaultFile> {
        self.by_name
            .get(&nfc(name_or_stem))
            .map(|ids| ids.iter().map(|&i| &self.notes[i]).collect())
            .unwrap_or_default()
    }

    /// Notes sharing a name with `name`: lookups under `name` and under its
    /// stem, deduplicated, in index order.
    pub fn conflicts(&self, name: &str) -> Vec<&VaultFile> {
        let mut ids: Vec<usize> = Vec::new();
        for key in [name, stem_of(name)] {
            if let Some(found) = self.by_name.get(&nfc(key)) {
                for &i in found {
                    if !ids.contains(&i) {
                        ids.push(i);
                    }
                }
            }
        }
        ids.into_iter().map(|i| &self.notes[i]).collect()
    }

    /// The note at a vault-relative path.
    pub fn note(&self, relative: &str) -> Option<&VaultFile> {
        self.by_relative.get(&nfc(relative)).map(|&i| &self.notes[i])
    }

    /// On-disk spelling of a vault-relative path, if any file exists there.
    pub fn file(&self, relative: &str) -> Option<&str> {
        self.all_files.get(&nfc(relative)).map(String::as_str)
    }

    /// Vault-relative paths of every file named exactly `name`.
    pub fn files_named(&self, name: &str) -> &[String] {
        self.files_by_name
            .get(&nfc(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn setup_test_vault() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(&dir, "Root.md", "root");
        write(&dir, "Sub/Child.md", "child");
        write(&dir, "Other/Child.md", "other child");
        write(&dir, "Long.markdown", "long");
        write(&dir, "assets/img.png", "png");
        write(&dir, ".obsidian/workspace.md", "hidden");
        dir
    }

    #[test]
    fn test_list_notes_sorted() {
        let dir = setup_test_vault();
        let index = VaultIndex::scan(dir.path()).unwrap();
        let rels: Vec<&str> = index.list_notes().iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(
            rels,
            vec![
                ".obsidian/workspace.md",
                "Long.markdown",
                "Other/Child.md",
                "Root.md",
                "Sub/Child.md"
            ]
        );
    }

    #[test]
    fn test_lookup_by_name_and_stem() {
        let dir = setup_test_vault();
        let index = VaultIndex::scan(dir.path()).unwrap();

        assert_eq!(index.lookup("Child").len(), 2);
        assert_eq!(index.lookup("Child.md").len(), 2);
        assert_eq!(index.lookup("Root").len(), 1);
        assert_eq!(index.lookup("Long").len(), 1);
        assert!(index.lookup("Missing").is_empty());
    }

    #[test]
    fn test_conflicts_deduplicated() {
        let dir = setup_test_vault();
        let index = VaultIndex::scan(dir.path()).unwrap();
        let found = index.conflicts("Child.md");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].relative, "Other/Child.md");
        assert_eq!(found[1].relative, "Sub/Child.md");
    }

    #[test]
    fn test_assets_indexed_but_not_notes() {
        let dir = setup_test_vault();
        let index = VaultIndex::scan(dir.path()).unwrap();
        assert_eq!(index.files_named("img.png"), &["assets/img.png".to_string()]);
        assert!(index.note("assets/img.png").is_none());
        assert_eq!(index.file("assets/img.png"), Some("assets/img.png"));
    }

    #[test]
    fn test_hidden_directories_scanned() {
        let dir = setup_test_vault();
        let index = VaultIndex::scan(dir.path()).unwrap();
        assert!(index.note(".obsidian/workspace.md").is_some());
    }

    #[test]
    fn test_default_exclusions_skip_hidden_paths() {
        let dir = setup_test_vault();
        write(&dir, "Sub/.drafts/Draft.md", "draft");
        write(&dir, "Sub/.hidden.png", "png");
        let index = VaultIndex::scan_with_exclusions(dir.path(), &Config::default().exclude).unwrap();
        assert!(index.note(".obsidian/workspace.md").is_none());
        assert!(index.note("Sub/.drafts/Draft.md").is_none());
        assert!(index.files_named(".hidden.png").is_empty());
        assert_eq!(index.list_notes().len(), 4);
    }

    #[test]
    fn test_exclusions() {
        let dir = setup_test_vault();
        let index =
            VaultIndex::scan_with_exclusions(dir.path(), &["Other/*".to_string()]).unwrap();
        assert_eq!(index.lookup("Child").len(), 1);
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let result = VaultIndex::scan(dir.path().join("nope"));
        assert!(matches!(result, Err(VaultError::VaultNotFound(_))));
    }

    #[test]
    fn test_nfc_lookup_matches_nfd_name() {
        let dir = TempDir::new().unwrap();
        // "Café" spelled with a combining acute accent
        write(&dir, "Cafe\u{301}.md", "x");
        let index = VaultIndex::scan(dir.path()).unwrap();
        assert_eq!(index.lookup("Caf\u{e9}").len(), 1);
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(strip_note_extension("a/b.md"), "a/b");
        assert_eq!(strip_note_extension("a/b.MARKDOWN"), "a/b");
        assert_eq!(strip_note_extension("a/b.png"), "a/b.png");
        assert_eq!(stem_of("a/v1.2.md"), "v1.2");
        assert_eq!(parent_of("a/b/c.md"), "a/b");
        assert_eq!(parent_of("c.md"), "");
        assert!(is_asset_path("x/Photo.JPG"));
        assert!(!is_asset_path("x/Note.md"));
        assert_eq!(extension_of(".hidden"), None);
    }
}
