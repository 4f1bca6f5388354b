//! Command-line input expansion.

use anyhow::{Context, Result};
use std::path::Path;

fn push_unique(list: &mut Vec<String>, value: &str) {
    let value = value.trim_end_matches('/');
    if !list.iter().any(|seen| seen.eq_ignore_ascii_case(value)) {
        list.push(value.to_string());
    }
}

/// Expand `.txt` arguments into the URLs they list and drop duplicates.
///
/// Text files hold one URL per line; blank lines are ignored. Comparison is
/// case-insensitive and a trailing `/` is removed. First occurrence wins.
pub fn expand_inputs(args: &[String]) -> Result<Vec<String>> {
    let mut urls = Vec::new();
    let mut seen_files: Vec<&str> = Vec::new();

    for arg in args {
        let arg = arg.trim();
        if arg.is_empty() {
            continue;
        }
        if !arg.ends_with(".txt") {
            push_unique(&mut urls, arg);
            continue;
        }
        if seen_files.iter().any(|f| f.eq_ignore_ascii_case(arg)) {
            continue;
        }

        let content = std::fs::read_to_string(Path::new(arg))
            .with_context(|| format!("Failed to read URL list: {}", arg))?;
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            push_unique(&mut urls, line);
        }
        seen_files.push(arg);
    }

    Ok(urls)
}
