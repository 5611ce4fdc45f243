use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;

fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

/// Directory part of `pattern` before its first glob meta-character.
fn static_prefix_dir(pattern: &str) -> PathBuf {
    let idx = pattern
        .bytes()
        .position(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
        .unwrap_or(pattern.len());
    let p = Path::new(&pattern[..idx]);
    if p.is_dir() {
        p.to_path_buf()
    } else {
        p.parent()
            .filter(|pp| !pp.as_os_str().is_empty())
            .map(|pp| pp.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Master files end in `.g.xlf` and are never refreshed as targets.
pub fn is_master_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(".g.xlf"))
        .unwrap_or(false)
}

fn is_xlf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlf"))
}

/// Expand glob patterns among the target arguments into `.xlf` files.
///
/// Literal paths are passed through untouched so a missing file surfaces as
/// an error later. Master files matched by a pattern are left out.
pub fn expand_target_globs(inputs: &[String]) -> Result<Vec<PathBuf>, String> {
    let (patterns, literals): (Vec<&String>, Vec<&String>) =
        inputs.iter().partition(|s| has_glob_meta(s));

    let mut results: Vec<PathBuf> = literals.into_iter().map(PathBuf::from).collect();
    if patterns.is_empty() {
        return Ok(results);
    }

    // Build one GlobSet for all patterns (literal_separator to avoid '/' matching)
    let mut builder = GlobSetBuilder::new();
    for pat in &patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .map_err(|e| format!("Invalid glob pattern '{}': {}", pat, e))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| format!("Failed to build glob set: {}", e))?;

    let mut roots: Vec<PathBuf> = Vec::new();
    for pat in &patterns {
        let root = static_prefix_dir(pat);
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    let mut collected: Vec<PathBuf> = roots
        .par_iter()
        .map(|root| {
            let walker = WalkBuilder::new(root)
                .git_ignore(true)
                .git_exclude(true)
                .hidden(false)
                .ignore(true)
                .parents(true)
                .build();
            walker
                .filter_map(Result::ok)
                .filter(|dent| dent.file_type().is_some_and(|t| t.is_file()))
                .map(|dent| dent.into_path())
                .filter(|path| {
                    let s = path.to_string_lossy();
                    let relative = s.strip_prefix("./").unwrap_or(&s);
                    set.is_match(relative) || set.is_match(s.as_ref())
                })
                .filter(|path| is_xlf(path) && !is_master_file(path))
                .collect::<Vec<_>>()
        })
        .flatten()
        .collect();
    collected.sort();

    if collected.is_empty() {
        return Err(format!(
            "No .xlf files match: {}",
            patterns
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    results.extend(collected);
    let mut seen: HashSet<PathBuf> = HashSet::new();
    results.retain(|p| seen.insert(p.clone()));
    Ok(results)
}

/// Every language file next to `master`, by name.
pub fn language_files_beside(master: &Path) -> Result<Vec<PathBuf>, String> {
    let dir = master
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("Cannot read directory {}: {}", dir.display(), e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_xlf(path) && !is_master_file(path))
        .collect();
    files.sort();
    Ok(files)
}
