//! Path identity utilities for configuration units
//!
//! Every child unit is stored and looked up under a *relative-path key*: the
//! child's file reference expressed relative to the directory of the unit
//! that owns it. The same normalization is applied when storing and when
//! looking up, so `foo.conf`, `/etc/gitolite/conf/foo.conf` and `./foo.conf`
//! all land on the same key when the owner lives in `/etc/gitolite/conf`.
//!
//! Normalization is purely lexical. Nothing here touches the filesystem, and
//! a reference that cannot be shortened (mixed absolute/relative operands,
//! different prefixes) is returned verbatim instead of failing.

use log::warn;
use std::path::{Component, Path, PathBuf};

/// Characters that turn a unit path into a wildcard container.
const WILDCARD_CHARS: [char; 2] = ['*', '?'];

/// Whether `path` names a wildcard container.
///
/// Only the file name counts: a directory such as `team?x/` on the way to a
/// plain file does not make it a pattern.
pub fn is_wildcard(path: &str) -> bool {
    Path::new(path)
        .file_name()
        .is_some_and(|name| name.to_string_lossy().contains(WILDCARD_CHARS))
}

/// Glob pattern for a container path, with its directory escaped so only the
/// file name is matched as a pattern
pub fn glob_pattern(path: &str) -> String {
    let file = Path::new(path);
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = base_dir(file).to_string_lossy();
    if dir.is_empty() {
        return name;
    }
    Path::new(&glob::Pattern::escape(&dir))
        .join(name)
        .to_string_lossy()
        .into_owned()
}

/// Directory portion of a unit's file path.
///
/// A bare file name has an empty directory, which behaves like `.`.
pub fn base_dir(file: &Path) -> &Path {
    file.parent().unwrap_or_else(|| Path::new(""))
}

fn is_current_dir(dir: &Path) -> bool {
    dir.as_os_str().is_empty() || dir == Path::new(".")
}

/// Lexically normalize a path: drop `.` components and fold `name/..` pairs.
///
/// Leading `..` components of a relative path are kept; `..` directly under
/// the root is dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

/// Compute `path` relative to `base`, lexically.
///
/// Returns `None` when the two paths cannot be related: one is absolute and
/// the other is not, they live under different prefixes, or `base` climbs
/// above the common ancestor with `..`.
pub fn relative_path_from(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = normalize(path);
    let base = normalize(base);

    if path.has_root() != base.has_root() || path.is_absolute() != base.is_absolute() {
        return None;
    }

    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();

    if let (Some(Component::Prefix(a)), Some(Component::Prefix(b))) =
        (path_parts.first(), base_parts.first())
    {
        if a != b {
            return None;
        }
    }

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for part in &base_parts[common..] {
        match part {
            Component::Normal(_) => result.push(".."),
            // `base` has an unresolved `..` beyond the common ancestor
            _ => return None,
        }
    }
    for part in &path_parts[common..] {
        result.push(part.as_os_str());
    }

    if result.as_os_str().is_empty() {
        result.push(".");
    }
    Some(result)
}

/// Canonical relative-path key of `reference` as seen from the unit whose
/// file is `owner_file`.
///
/// - A relative reference is assumed to already be relative to the owner's
///   directory and is returned unchanged.
/// - An absolute reference is made relative to the owner's directory.
/// - If that fails the reference is returned verbatim, so lookups degrade to
///   exact string matching.
pub fn relative_key(owner_file: &Path, reference: &str) -> String {
    let path = Path::new(reference);
    if path.is_relative() {
        return reference.to_string();
    }

    let base = base_dir(owner_file);
    match relative_path_from(path, base) {
        Some(relative) => relative.to_string_lossy().into_owned(),
        None => {
            warn!(
                "Cannot express '{}' relative to '{}', using it verbatim",
                reference,
                base.display()
            );
            reference.to_string()
        }
    }
}

/// Reference to use for `reference` when the unit at `owner_file` describes
/// it relative to its own owning directory.
///
/// This is the mirror image of [`relative_key`]: relative references are
/// prefixed with the owner's directory (when that directory is itself a
/// relative, non-trivial path), absolute references are shortened against it.
pub fn file_path(owner_file: &Path, reference: &str) -> String {
    let path = Path::new(reference);
    let base = base_dir(owner_file);

    if path.is_relative() {
        if !is_current_dir(base) && base.is_relative() {
            base.join(reference).to_string_lossy().into_owned()
        } else {
            reference.to_string()
        }
    } else {
        relative_path_from(path, base)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| reference.to_string())
    }
}

/// Resolve `reference` against the owner's directory when that directory is
/// absolute, producing a reference that means the same file from any unit
/// of the tree.
///
/// Relative references under a relative owner are returned unchanged; there
/// is no fixed point to anchor them to.
pub fn resolve(owner_file: &Path, reference: &str) -> String {
    let path = Path::new(reference);
    if path.is_absolute() {
        return normalize(path).to_string_lossy().into_owned();
    }

    let base = base_dir(owner_file);
    if base.is_absolute() {
        normalize(&base.join(path)).to_string_lossy().into_owned()
    } else {
        reference.to_string()
    }
}
