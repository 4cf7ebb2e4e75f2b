//! Helpers for `/`-separated vault paths.
//!
//! The root directory is `"/"`. Children of the root may be written either
//! bare (`a.md`) or with a leading slash (`/a.md`); both have parent `"/"`.

/// Key of the vault root in the custom order.
pub const ROOT: &str = "/";

/// Returns the parent directory of `path`, or [`ROOT`] for top-level items.
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) if idx > 0 => &path[..idx],
        _ => ROOT,
    }
}

/// Returns the last segment of `path`.
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Joins a directory and an item name into a vault path.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT || dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// True if `path` equals `ancestor` or lies somewhere below it.
///
/// Matching is done on whole segments, so `a` contains `a/b` but not `ab/c`.
pub fn is_same_or_descendant(path: &str, ancestor: &str) -> bool {
    path == ancestor || is_descendant(path, ancestor)
}

/// True if `path` lies strictly below `ancestor`.
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return path != ROOT;
    }
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Rewrites `path` from under `old_prefix` to under `new_prefix`.
///
/// Returns `None` if `path` is neither `old_prefix` nor one of its
/// descendants.
pub fn replace_prefix(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if path == old_prefix {
        Some(new_prefix.to_string())
    } else if is_descendant(path, old_prefix) {
        Some(format!("{}{}", new_prefix, &path[old_prefix.len()..]))
    } else {
        None
    }
}

/// Splits a file name into stem and extension.
///
/// Names starting with a dot and names without a dot have no extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Yields every proper ancestor directory of `path`, nearest root first.
///
/// `"a/b/c.md"` yields `"a"` then `"a/b"`; `"/a/b.md"` yields `"/a"`.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/')
        .map(|(idx, _)| idx)
        .filter(|&idx| idx > 0)
        .map(move |idx| &path[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("a.md"), "/");
        assert_eq!(parent_dir("/a.md"), "/");
        assert_eq!(parent_dir("folder/a.md"), "folder");
        assert_eq!(parent_dir("/folder/sub/a.md"), "/folder/sub");
        assert_eq!(parent_dir("/"), "/");
    }

    #[test]
    fn test_file_name_and_join() {
        assert_eq!(file_name("folder/a.md"), "a.md");
        assert_eq!(file_name("a.md"), "a.md");
        assert_eq!(join("/", "a.md"), "a.md");
        assert_eq!(join("folder", "a.md"), "folder/a.md");
    }

    #[test]
    fn test_descendant_matches_whole_segments() {
        assert!(is_descendant("a/b", "a"));
        assert!(!is_descendant("ab/x", "a"));
        assert!(!is_descendant("a", "a"));
        assert!(is_same_or_descendant("a", "a"));
        assert!(is_descendant("a.md", "/"));
    }

    #[test]
    fn test_replace_prefix() {
        assert_eq!(replace_prefix("a/c.md", "a", "b"), Some("b/c.md".to_string()));
        assert_eq!(replace_prefix("a", "a", "b"), Some("b".to_string()));
        assert_eq!(replace_prefix("ab/x", "a", "b"), None);
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("note.md"), ("note", Some("md")));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", Some("gz")));
        assert_eq!(split_extension("folder"), ("folder", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
    }

    #[test]
    fn test_ancestors() {
        let found: Vec<&str> = ancestors("a/b/c.md").collect();
        assert_eq!(found, vec!["a", "a/b"]);
        let found: Vec<&str> = ancestors("/a/b.md").collect();
        assert_eq!(found, vec!["/a"]);
        assert_eq!(ancestors("c.md").count(), 0);
    }
}
