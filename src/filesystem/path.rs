//! POSIX-style path helpers for remote paths.
//!
//! Remote paths are plain strings: the local platform's `Path` semantics do
//! not apply to the far side of an SFTP session.

use crate::error::{AppError, Result};

/// Clean an absolute path: collapse repeated separators, drop `.` segments,
/// resolve `..` against the preceding segment and strip the trailing slash.
/// `..` at the root stays at the root.
pub fn normalize(path: &str) -> Result<String> {
    if !path.starts_with('/') {
        return Err(AppError::MalformedPath(format!("'{path}' is not absolute")));
    }
    if path.contains('\0') {
        return Err(AppError::MalformedPath(format!(
            "'{}' contains a NUL byte",
            path.escape_default()
        )));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    Ok(format!("/{}", segments.join("/")))
}

/// Join `name` onto `dir` and normalize the result.
pub fn join(dir: &str, name: &str) -> Result<String> {
    normalize(&format!("{}/{}", dir.trim_end_matches('/'), name))
}

/// Parent of an already normalized path; the root is its own parent.
pub fn parent(path: &str) -> String {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

/// Last segment of a path, or `/` for the root.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ if trimmed.is_empty() => "/",
        _ => trimmed,
    }
}

/// Expand a leading `~/` using the local home directory.
pub fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.to_string_lossy(), &path[1..]);
        }
    }
    path.to_string()
}

/// Turn a user-typed local destination into a normalized absolute path,
/// resolving relative input against `base`.
pub fn resolve_local(input: &str, base: &str) -> Result<String> {
    if input.is_empty() {
        return Err(AppError::MalformedPath("empty destination".to_string()));
    }
    let expanded = expand_tilde(input);
    let keep_dir_marker = expanded.ends_with('/');
    let absolute = if expanded.starts_with('/') {
        normalize(&expanded)?
    } else {
        join(base, &expanded)?
    };
    if keep_dir_marker && absolute != "/" {
        Ok(format!("{absolute}/"))
    } else {
        Ok(absolute)
    }
}
