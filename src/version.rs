//! Package version resolution
//!
//! A `version` option without a literal falls back to the package
//! manifest: starting from a resolved path (or the current directory) the
//! walk goes upward until a `Cargo.toml` with a `package.version` entry is
//! found.

use std::path::{Path, PathBuf};

pub(crate) fn resolve(hint: Option<PathBuf>) -> Option<String> {
    let start = match hint {
        Some(path) => path,
        None => std::env::current_dir().ok()?,
    };
    if start.is_file() {
        return read_manifest_version(&start);
    }
    for dir in start.ancestors() {
        let manifest = dir.join("Cargo.toml");
        if manifest.is_file() {
            if let Some(version) = read_manifest_version(&manifest) {
                return Some(version);
            }
        }
    }
    None
}

fn read_manifest_version(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    let table: toml::Table = text.parse().ok()?;
    table
        .get("package")?
        .get("version")?
        .as_str()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_package_version_field() {
        let dir = std::env::temp_dir().join("declargs-version-test");
        std::fs::create_dir_all(&dir).unwrap();
        let manifest = dir.join("Cargo.toml");
        std::fs::write(
            &manifest,
            "[package]\nname = \"probe\"\nversion = \"1.2.3\"\n",
        )
        .unwrap();
        assert_eq!(read_manifest_version(&manifest).as_deref(), Some("1.2.3"));

        let nested = dir.join("deep").join("er");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(resolve(Some(nested)).as_deref(), Some("1.2.3"));
    }

    #[test]
    fn missing_manifest_resolves_to_none() {
        assert_eq!(resolve(Some(PathBuf::from("/definitely/not/here"))), None);
    }
}
