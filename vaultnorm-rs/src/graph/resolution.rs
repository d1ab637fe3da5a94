//! Link target resolution.
//!
//! Note links resolve in this order:
//! 1. Relative to the linking note's folder (as typed, then with a note extension)
//! 2. Relative to the vault root, for rooted (`/x`) or multi-segment targets
//! 3. Unique file name or stem match
//! 4. Unique note whose path ends with the typed multi-segment target
//!
//! Anything else is kept verbatim. Attachments always resolve by file name
//! and are written relative to the linking note.

use crate::vault::{
    file_name_of, is_asset_path, parent_of, strip_note_extension, VaultFile, VaultIndex,
    IMAGE_EXTENSIONS, MEDIA_EXTENSIONS, NOTE_EXTENSIONS,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How note links are shortened when written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Shortest path suffix that is unique in the vault.
    #[default]
    Vault,
    /// Filesystem-relative path from the linking note's folder.
    Relative,
}

/// Why a target was kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// No note carries this name.
    Missing,
    /// This many notes carry the name and nothing narrowed it down.
    Ambiguous(usize),
}

/// Outcome of resolving a note target (anchor already removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A scanned note.
    Note(&'a VaultFile),
    /// An existing file that is not a note (root-relative path).
    File(String),
    /// Nothing matched; the typed path with any note extension removed.
    Verbatim { path: String, reason: Unresolved },
}

impl Resolution<'_> {
    /// Root-relative path without note extension.
    pub fn canonical(&self) -> &str {
        match self {
            Resolution::Note(file) => file.relative_no_ext(),
            Resolution::File(path) => path,
            Resolution::Verbatim { path, .. } => path,
        }
    }

}

/// A note link resolved for both rewriting and the metadata graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTarget<'a> {
    pub resolution: Resolution<'a>,
    pub anchor: Option<String>,
    /// Shortest text form to write inside `[[...]]`, anchor included.
    pub text: String,
    /// Root-relative path of the target note with its extension, when the
    /// target is a scanned note.
    pub metadata_path: Option<String>,
}

/// Resolves raw link text against a vault snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    index: &'a VaultIndex,
    mode: ResolveMode,
}

impl<'a> PathResolver<'a> {
    pub fn new(index: &'a VaultIndex, mode: ResolveMode) -> Self {
        Self { index, mode }
    }

    /// Resolve a note target (no anchor, no alias) typed in `current`.
    pub fn find_note(&self, current: &str, raw: &str) -> Resolution<'a> {
        let raw = raw.trim();
        let current_dir = parent_of(current);

        if let Some(rooted) = raw.strip_prefix('/') {
            if let Some(found) = self.try_path("", rooted) {
                return found;
            }
        } else {
            if let Some(found) = self.try_path(current_dir, raw) {
                return found;
            }
            if raw.contains('/') {
                if let Some(found) = self.try_path("", raw) {
                    return found;
                }
            }
        }

        let typed = raw.trim_start_matches("./").trim_start_matches('/');
        let name = file_name_of(typed);
        let matches = self.notes_named(&[name, strip_note_extension(name)]);

        if matches.len() == 1 {
            return Resolution::Note(matches[0]);
        }

        if typed.contains('/') {
            let typed_no_ext = strip_note_extension(typed);
            let suffix = format!("/{}", typed_no_ext);
            let narrowed: Vec<&VaultFile> = matches
                .iter()
                .copied()
                .filter(|f| {
                    let no_ext = f.relative_no_ext();
                    no_ext == typed_no_ext || no_ext.ends_with(&suffix)
                })
                .collect();
            if narrowed.len() == 1 {
                return Resolution::Note(narrowed[0]);
            }
        }

        let reason = if matches.is_empty() {
            Unresolved::Missing
        } else {
            Unresolved::Ambiguous(matches.len())
        };

        Resolution::Verbatim {
            path: strip_note_extension(typed).to_string(),
            reason,
        }
    }

    /// Rooted form (`/a/b`) of a link body (`target#anchor`), used when
    /// converting Markdown links. Resolving the result again from `current`
    /// always lands on the same note. Unresolved targets keep their typed
    /// text and an empty target yields just the anchor.
    pub fn find_target_path(&self, current: &str, raw: &str) -> String {
        let (target, anchor) = split_anchor(raw);
        let target = target.trim();

        let mut out = if target.is_empty() {
            String::new()
        } else {
            match self.find_note(current, target) {
                Resolution::Verbatim { path, .. } => path,
                resolved => format!("/{}", resolved.canonical()),
            }
        };
        if let Some(anchor) = anchor {
            out.push('#');
            out.push_str(anchor);
        }
        out
    }

    /// Resolve a wikilink body (`target#anchor|alias`) typed in `current`.
    ///
    /// Returns `None` for self-anchors like `#Intro`, which have no target.
    pub fn resolve_note(&self, current: &str, body: &str) -> Option<NoteTarget<'a>> {
        let target_part = body.split_once('|').map(|(t, _)| t).unwrap_or(body);
        let (target, anchor) = split_anchor(target_part);
        let target = target.trim();
        if target.is_empty() {
            return None;
        }

        let resolution = self.find_note(current, target);
        let mut text = match (&resolution, self.mode) {
            (Resolution::Verbatim { path, .. }, _) => path.clone(),
            (_, ResolveMode::Vault) => self.shortest_vault(current, resolution.canonical()),
            (_, ResolveMode::Relative) => {
                relative_path(parent_of(current), resolution.canonical())
            }
        };
        if let Some(anchor) = anchor {
            text.push('#');
            text.push_str(anchor);
        }

        let metadata_path = self.metadata_path(&resolution);

        Some(NoteTarget {
            resolution,
            anchor: anchor.map(str::to_string),
            text,
            metadata_path,
        })
    }

    /// Root-relative note path with extension, if the resolution names a note.
    pub fn metadata_path(&self, resolution: &Resolution<'_>) -> Option<String> {
        match resolution {
            Resolution::Note(file) => Some(file.relative.clone()),
            Resolution::File(_) => None,
            Resolution::Verbatim { path, .. } => NOTE_EXTENSIONS
                .iter()
                .find_map(|ext| self.index.note(&format!("{}.{}", path, ext)))
                .map(|file| file.relative.clone()),
        }
    }

    /// Shortest root-anchored suffix of `canonical` that no other note with
    /// the same name also ends with. A root-level note is its bare stem.
    ///
    /// When the chosen text would resolve to a different note from the
    /// linking note's folder, the rooted full path (`/a/b`) is used instead.
    pub fn shortest_vault(&self, current: &str, canonical: &str) -> String {
        let parts: Vec<&str> = canonical.split('/').collect();
        let name = parts[parts.len() - 1];
        let conflicts = self.index.conflicts(name);

        let is_unique = |suffix: &str| {
            let tail = format!("/{}", suffix);
            let mut matching = conflicts
                .iter()
                .map(|f| f.relative_no_ext())
                .filter(|c| *c == suffix || c.ends_with(&tail));
            matches!((matching.next(), matching.next()), (Some(only), None) if only == canonical)
        };

        // Each extra segment lengthens the candidate, so this order is
        // already (segment count, length) ascending.
        let chosen = if parts.len() == 1 {
            name.to_string()
        } else {
            (2..=parts.len())
                .map(|take| parts[parts.len() - take..].join("/"))
                .find(|candidate| is_unique(candidate))
                .unwrap_or_else(|| canonical.to_string())
        };

        if self.find_note(current, &chosen).canonical() == canonical {
            chosen
        } else {
            format!("/{}", canonical)
        }
    }

    /// Resolve an attachment reference to a path relative to the linking
    /// note's folder. Folders typed in the link are ignored; only the file
    /// name is searched.
    pub fn resolve_asset(&self, current: &str, raw: &str) -> String {
        let target = raw.split_once('|').map(|(t, _)| t).unwrap_or(raw).trim();
        if target.is_empty() {
            return raw.to_string();
        }
        let (path, fragment) = split_anchor(target);
        let name = file_name_of(path.trim());
        if name.is_empty() {
            return String::new();
        }
        let current_dir = parent_of(current);

        let mut candidates: Vec<&str> = if name.contains('.') {
            self.index.files_named(name).iter().map(String::as_str).collect()
        } else {
            IMAGE_EXTENSIONS
                .iter()
                .chain(MEDIA_EXTENSIONS)
                .flat_map(|ext| self.index.files_named(&format!("{}.{}", name, ext)))
                .map(String::as_str)
                .collect()
        };

        let mut out = if candidates.is_empty() {
            name.to_string()
        } else {
            candidates.sort_by_cached_key(|c| {
                let rel = relative_path(current_dir, c);
                let same_dir = if parent_of(c) == current_dir { 0 } else { 1 };
                (same_dir, rel.chars().count(), rel)
            });
            let rel = relative_path(current_dir, candidates[0]);
            if rel.contains('/') && !rel.starts_with("./") && !rel.starts_with("../") {
                format!("./{}", rel)
            } else {
                rel
            }
        };

        if let Some(fragment) = fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    /// Try `raw` as a path under `dir`: exact file first, then with each
    /// note extension.
    fn try_path(&self, dir: &str, raw: &str) -> Option<Resolution<'a>> {
        let joined = join_relative(dir, raw)?;
        if joined.is_empty() {
            return None;
        }
        if let Some(file) = self.index.note(&joined) {
            return Some(Resolution::Note(file));
        }
        if let Some(on_disk) = self.index.file(&joined) {
            return Some(Resolution::File(on_disk.to_string()));
        }
        NOTE_EXTENSIONS
            .iter()
            .find_map(|ext| self.index.note(&format!("{}.{}", joined, ext)))
            .map(Resolution::Note)
    }

    /// Notes registered under any of `keys`, deduplicated, in index order.
    fn notes_named(&self, keys: &[&str]) -> Vec<&'a VaultFile> {
        let mut found: Vec<&'a VaultFile> = Vec::new();
        for key in keys {
            for file in self.index.lookup(key) {
                if !found.iter().any(|f| f.relative == file.relative) {
                    found.push(file);
                }
            }
        }
        found
    }
}

/// Split `target#anchor` at the first `#`.
pub fn split_anchor(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once('#') {
        Some((target, anchor)) => (target, Some(anchor)),
        None => (raw, None),
    }
}

/// Lexically join a relative path onto a root-relative directory.
///
/// Returns `None` when `..` would climb above the vault root.
pub fn join_relative(dir: &str, rel: &str) -> Option<String> {
    let mut parts: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Relative path from root-relative directory `from_dir` to root-relative
/// path `to`, using `..` segments as needed.
pub fn relative_path(from_dir: &str, to: &str) -> String {
    let from: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let target: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; from.len() - common];
    segments.extend_from_slice(&target[common..]);

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Check if a target looks like an attachment (image, audio, video, PDF).
pub fn is_media_target(target: &str) -> bool {
    is_asset_path(target.split('#').next().unwrap_or(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault(files: &[&str]) -> (TempDir, VaultIndex) {
        let dir = TempDir::new().unwrap();
        for rel in files {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "x").unwrap();
        }
        let index = VaultIndex::scan(dir.path()).unwrap();
        (dir, index)
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("a/b", "../c.md"), Some("a/c.md".to_string()));
        assert_eq!(join_relative("", "./x/y"), Some("x/y".to_string()));
        assert_eq!(join_relative("a", "../../x"), None);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("notes/sub", "assets/img.png"), "../../assets/img.png");
        assert_eq!(relative_path("", "assets/img.png"), "assets/img.png");
        assert_eq!(relative_path("a", "a/b"), "b");
        assert_eq!(relative_path("a/b", "a/c"), "../c");
    }

    #[test]
    fn test_find_relative_to_current() {
        let (_d, index) = vault(&["Root.md", "Sub/Child.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        assert_eq!(r.find_note("Root.md", "Sub/Child.md").canonical(), "Sub/Child");
        assert_eq!(r.find_note("Sub/Other.md", "Child").canonical(), "Sub/Child");
        assert_eq!(r.find_note("Sub/Other.md", "../Root").canonical(), "Root");
    }

    #[test]
    fn test_find_by_unique_basename() {
        let (_d, index) = vault(&["Root.md", "deep/down/Target.markdown"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        let res = r.find_note("Root.md", "Target");
        assert!(matches!(res, Resolution::Note(f) if f.relative == "deep/down/Target.markdown"));
        assert_eq!(res.canonical(), "deep/down/Target");
    }

    #[test]
    fn test_ambiguous_basename_is_verbatim() {
        let (_d, index) = vault(&["a/Child.md", "b/Child.md", "Root.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        let res = r.find_note("Root.md", "Child.md");
        assert_eq!(
            res,
            Resolution::Verbatim {
                path: "Child".to_string(),
                reason: Unresolved::Ambiguous(2)
            }
        );
    }

    #[test]
    fn test_missing_is_verbatim() {
        let (_d, index) = vault(&["Root.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        let res = r.find_note("Root.md", "Nowhere/Thing.md");
        assert_eq!(
            res,
            Resolution::Verbatim {
                path: "Nowhere/Thing".to_string(),
                reason: Unresolved::Missing
            }
        );
    }

    #[test]
    fn test_suffix_narrows_ambiguous_name() {
        let (_d, index) = vault(&["x/Sub/Child.md", "z/Child.md", "Root.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        let res = r.find_note("Root.md", "Sub/Child");
        assert_eq!(res.canonical(), "x/Sub/Child");
    }

    #[test]
    fn test_escaping_root_never_resolves_by_path() {
        let (_d, index) = vault(&["a/Note.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        // Falls through to the unique-name lookup instead of leaving the vault
        assert_eq!(r.find_note("a/Note.md", "../../Note").canonical(), "a/Note");
    }

    #[test]
    fn test_shortest_vault_unique_name() {
        let (_d, index) = vault(&["Root.md", "Sub/Child.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        let t = r.resolve_note("Root.md", "Child").unwrap();
        assert_eq!(t.text, "Sub/Child");
        assert_eq!(t.metadata_path.as_deref(), Some("Sub/Child.md"));
    }

    #[test]
    fn test_shortest_vault_disambiguates() {
        let (_d, index) = vault(&["a/x/Note.md", "b/x/Note.md", "c/Note.md", "Root.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        assert_eq!(r.shortest_vault("Root.md", "a/x/Note"), "a/x/Note");
        assert_eq!(r.shortest_vault("Root.md", "c/Note"), "c/Note");
    }

    #[test]
    fn test_shortest_vault_root_level() {
        let (_d, index) = vault(&["Child.md", "Sub/Child.md", "Sub/Other.md", "Else/A.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        assert_eq!(r.shortest_vault("Else/A.md", "Child"), "Child");
        assert_eq!(r.shortest_vault("Sub/Other.md", "Child"), "/Child");
    }

    #[test]
    fn test_shortest_vault_shadowed_full_path() {
        let (_d, index) = vault(&["x/Sub/Child.md", "Sub/Child.md", "x/n.md", "Root.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        assert_eq!(r.shortest_vault("Root.md", "Sub/Child"), "Sub/Child");
        assert_eq!(r.shortest_vault("x/n.md", "Sub/Child"), "/Sub/Child");
        assert_eq!(r.find_note("x/n.md", "/Sub/Child").canonical(), "Sub/Child");
    }

    #[test]
    fn test_shortest_references_round_trip() {
        let files = ["a/x/Note.md", "b/x/Note.md", "c/Note.md", "Note.md", "d/e/f/Note.md"];
        let (_d, index) = vault(&files);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        for from in ["Note.md", "c/Note.md", "d/e/f/Note.md"] {
            for file in index.list_notes() {
                let text = r.shortest_vault(from, file.relative_no_ext());
                let back = r.find_note(from, &text);
                assert_eq!(
                    back,
                    Resolution::Note(file),
                    "{} from {} wrote {}",
                    file.relative,
                    from,
                    text
                );
            }
        }
    }

    #[test]
    fn test_relative_mode() {
        let (_d, index) = vault(&["notes/sub/a.md", "notes/b.md", "other/c.md"]);
        let r = PathResolver::new(&index, ResolveMode::Relative);
        assert_eq!(r.resolve_note("notes/sub/a.md", "c").unwrap().text, "../../other/c");
        assert_eq!(r.resolve_note("notes/sub/a.md", "b#Part").unwrap().text, "../b#Part");
        assert_eq!(r.resolve_note("notes/b.md", "a").unwrap().text, "sub/a");
    }

    #[test]
    fn test_anchor_and_self_anchor() {
        let (_d, index) = vault(&["Root.md", "Sub/Child.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        let t = r.resolve_note("Root.md", "Child#Section|Shown").unwrap();
        assert_eq!(t.text, "Sub/Child#Section");
        assert_eq!(t.anchor.as_deref(), Some("Section"));
        assert!(r.resolve_note("Root.md", "#Intro").is_none());
        assert_eq!(r.find_target_path("Root.md", "#Intro"), "#Intro");
        assert_eq!(r.find_target_path("Root.md", "Sub/Child.md#S"), "/Sub/Child#S");
        assert_eq!(r.find_target_path("Root.md", "Gone.md"), "Gone");
    }

    #[test]
    fn test_target_path_survives_shadowing_folder() {
        let (_d, index) = vault(&["Sub/Child.md", "x/Sub/Child.md", "x/n.md", "Child.md", "Sub/Other.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);

        let text = r.find_target_path("x/n.md", "../Sub/Child.md");
        assert_eq!(text, "/Sub/Child");
        assert_eq!(r.find_note("x/n.md", &text).canonical(), "Sub/Child");

        let text = r.find_target_path("Sub/Other.md", "../Child.md");
        assert_eq!(text, "/Child");
        assert_eq!(r.find_note("Sub/Other.md", &text).canonical(), "Child");
    }

    #[test]
    fn test_verbatim_metadata_path() {
        let (_d, index) = vault(&["a/Child.md", "b/Child.md", "Child.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        let t = r.resolve_note("c/x.md", "Child").unwrap();
        assert!(matches!(t.resolution, Resolution::Verbatim { .. }));
        assert_eq!(t.text, "Child");
        assert_eq!(t.metadata_path.as_deref(), Some("Child.md"));

        let missing = r.resolve_note("c/x.md", "Gone").unwrap();
        assert_eq!(missing.metadata_path, None);
    }

    #[test]
    fn test_resolve_asset() {
        let (_d, index) = vault(&["assets/img.png", "notes/sub/a.md", "notes/sub/local.png", "Root.md"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        assert_eq!(r.resolve_asset("notes/sub/a.md", "img.png"), "../../assets/img.png");
        assert_eq!(r.resolve_asset("Root.md", "whatever/img.png"), "./assets/img.png");
        assert_eq!(r.resolve_asset("notes/sub/a.md", "local"), "local.png");
        assert_eq!(r.resolve_asset("Root.md", "missing/gone.png"), "gone.png");
        assert_eq!(r.resolve_asset("Root.md", "img.png#frag|300"), "./assets/img.png#frag");
    }

    #[test]
    fn test_resolve_asset_prefers_same_dir() {
        let (_d, index) = vault(&["a/pic.jpg", "n/pic.jpg", "n/deep/x/note.md", "n/deep/x/pic.jpg"]);
        let r = PathResolver::new(&index, ResolveMode::Vault);
        assert_eq!(r.resolve_asset("n/deep/x/note.md", "pic.jpg"), "pic.jpg");
        assert_eq!(r.resolve_asset("n/deep/note.md", "pic.jpg"), "./x/pic.jpg");
    }

    #[test]
    fn test_is_media_target() {
        assert!(is_media_target("image.png"));
        assert!(is_media_target("doc.pdf#page=2"));
        assert!(!is_media_target("Note"));
        assert!(!is_media_target("Note.md"));
    }
}
