use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// POSIX-style relative path from `base_dir` to `target`.
///
/// Resolution is lexical: `.` and `..` are folded, symlinks are not
/// followed. Relative inputs that climb above their starting point are
/// anchored at the current working directory first.
pub fn relative_from(base_dir: &Path, target: &Path) -> String {
    let mut base = normalize(base_dir);
    let mut dest = normalize(target);

    let needs_anchor = base.has_root() != dest.has_root()
        || starts_with_parent(&base)
        || starts_with_parent(&dest);
    if needs_anchor {
        let cwd = std::env::current_dir().unwrap_or_default();
        if !base.has_root() {
            base = normalize(&cwd.join(&base));
        }
        if !dest.has_root() {
            dest = normalize(&cwd.join(&dest));
        }
    }

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let dest_parts: Vec<Component<'_>> = dest.components().collect();
    let common = base_parts
        .iter()
        .zip(dest_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<String> = Vec::new();
    for _ in common..base_parts.len() {
        out.push("..".to_string());
    }
    for c in &dest_parts[common..] {
        out.push(c.as_os_str().to_string_lossy().to_string());
    }
    if out.is_empty() {
        return ".".to_string();
    }
    out.join("/")
}

/// Relative link from the directory holding `page` to `run_dir/relpath`.
pub fn link_from_page(run_dir: &Path, page: &Path, relpath: &str) -> String {
    let page_dir = page.parent().unwrap_or(run_dir);
    relative_from(page_dir, &run_dir.join(relpath))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn starts_with_parent(path: &Path) -> bool {
    matches!(path.components().next(), Some(Component::ParentDir))
}

/// Display form of a JSON scalar used for anchors and table cells.
/// `None` for null; strings verbatim; everything else as compact JSON.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `"{prefix}-{value}"` with the value trimmed and inner spaces turned
/// into `-`. No escaping is applied.
pub fn anchor_id(prefix: &str, value: &str) -> String {
    format!("{}-{}", prefix, value.trim().replace(' ', "-"))
}

/// First relpath ending with `suffix`, in declaration order.
pub fn find_by_suffix<'a, I>(relpaths: I, suffix: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    relpaths.into_iter().find(|p| p.ends_with(suffix))
}
