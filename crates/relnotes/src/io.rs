use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Writes rendered output to `path`, or prints it to stdout when no path is given
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Reads a saved page from disk
pub fn read_markup(path: &Path) -> Result<String> {
    if !path.exists() {
        anyhow::bail!("HTML file not found: {}", path.display());
    }
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read HTML file: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
