//! `wowpulse validate-rules`: lint a rule document without running anything.

use std::path::Path;

use anyhow::{bail, Context, Result};

use wowpulse_rules::{validate_yaml, ValidationResult};

pub fn validate_rules(path: &Path) -> Result<()> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let result = validate_yaml(&yaml);
    print!("{}", render(path, &result));

    if !result.valid {
        bail!("{} error(s) in '{}'", result.errors.len(), path.display());
    }
    Ok(())
}

fn render(path: &Path, result: &ValidationResult) -> String {
    let mut out = String::new();
    for e in &result.errors {
        out.push_str(&format!("error: {}: {}", e.path, e.message));
        if let Some(s) = &e.suggestion {
            out.push_str(&format!(" (did you mean '{s}'?)"));
        }
        out.push('\n');
    }
    for w in &result.warnings {
        out.push_str(&format!("warning: {}: {}\n", w.path, w.message));
    }
    if result.valid {
        out.push_str(&format!(
            "{}: ok ({} warning(s))\n",
            path.display(),
            result.warnings.len()
        ));
    }
    out
}
