//! Page-context detection: which scripts and stylesheets a markup file loads.

use a11y_lint_core::ElementTree;
use std::path::{Component, Path, PathBuf};

/// Files a page links, in document order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// Linked scripts.
    pub behavior: Vec<PathBuf>,
    /// Linked stylesheets.
    pub style: Vec<PathBuf>,
}

impl PageLinks {
    /// All linked files, scripts first.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.behavior.iter().chain(self.style.iter())
    }
}

/// Collects `<script src>` and stylesheet `<link href>` references.
///
/// External references are ignored. Root-relative references resolve
/// against `root`, others against the markup file's directory; anything
/// that escapes `root` is dropped.
#[must_use]
pub fn extract_links(tree: &ElementTree, markup_path: &Path, root: &Path) -> PageLinks {
    let base = markup_path.parent().unwrap_or(root);
    let mut links = PageLinks::default();
    for element in tree.iter() {
        let (reference, target) = match element.tag.as_str() {
            "script" => (element.attr("src"), &mut links.behavior),
            "link" if is_stylesheet_link(element.attr("rel"), element.attr("as")) => {
                (element.attr("href"), &mut links.style)
            }
            _ => continue,
        };
        let Some(path) = reference.and_then(|r| resolve_reference(r, base, root)) else {
            continue;
        };
        if !target.contains(&path) {
            target.push(path);
        }
    }
    links
}

fn is_stylesheet_link(rel: Option<&str>, as_attr: Option<&str>) -> bool {
    let Some(rel) = rel else {
        return false;
    };
    let has = |token: &str| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case(token));
    has("stylesheet")
        || (has("preload")
            && as_attr.is_some_and(|a| a.trim().eq_ignore_ascii_case("style")))
}

/// Returns true for references that point outside the workspace.
fn is_external(reference: &str) -> bool {
    if reference.starts_with("//") {
        return true;
    }
    let Some((scheme, _)) = reference.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolves a link reference to a workspace path.
#[must_use]
pub fn resolve_reference(reference: &str, base: &Path, root: &Path) -> Option<PathBuf> {
    let reference = reference.trim();
    if reference.is_empty() || is_external(reference) {
        return None;
    }
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    let reference = &reference[..end];
    if reference.is_empty() {
        return None;
    }
    let joined = match reference.strip_prefix('/') {
        Some(rooted) => root.join(rooted),
        None => base.join(reference),
    };
    let normalized = normalize(&joined)?;
    let root = normalize(root)?;
    normalized.starts_with(&root).then_some(normalized)
}

/// Lexically normalizes `.` and `..` components.
///
/// Returns `None` if `..` climbs above the start of the path.
#[must_use]
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }
    Some(out)
}
