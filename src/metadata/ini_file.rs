//! INI reading with configparser-style lookups.
//!
//! Keys are matched case-insensitively and surrounding whitespace is trimmed.
//! Keys in a `DEFAULT` section are inherited by every other section, and
//! `DEFAULT` itself is never reported as a section.

use crate::bundler::error::{Error, ErrorExt, Result};
use ini::{Ini, ParseOption};
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

const DEFAULT_SECTION: &str = "DEFAULT";

/// One named section with lowercased keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    /// Section name, case preserved.
    pub name: String,
    /// Key → value, with keys lowercased and `DEFAULT` entries merged in.
    pub values: BTreeMap<String, String>,
}

impl IniSection {
    /// Looks up a key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&key.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Loads `path` as a raw [`Ini`] document.
///
/// Quotes and backslashes are kept verbatim, as configparser does. A section
/// name declared twice is a parse error; repeated `DEFAULT` blocks merge.
pub fn load(path: &Path) -> Result<Ini> {
    let content = fs::read_to_string(path).fs_context("reading ini file", path)?;
    let opt = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    };
    let ini = Ini::load_from_str_opt(&content, opt).map_err(|e| Error::IniParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut seen = BTreeSet::new();
    for name in ini.sections().flatten() {
        let name = name.trim();
        if name != DEFAULT_SECTION && !seen.insert(name) {
            return Err(Error::IniParse {
                path: path.to_path_buf(),
                message: format!("section [{name}] is declared more than once"),
            });
        }
    }

    Ok(ini)
}

/// Rewrites the value of `key` in `[section]` of the file at `path`.
///
/// Only the matching line changes; key order, comments and line endings are
/// kept. Returns `false`, leaving the file untouched, when the section has no
/// such key of its own.
pub fn set_value(path: &Path, section: &str, key: &str, value: &str) -> Result<bool> {
    let content = fs::read_to_string(path).fs_context("reading ini file", path)?;
    let key = normalize_key(key);
    let mut out = String::with_capacity(content.len() + value.len());
    let mut in_section = false;
    let mut replaced = false;

    for line in content.split_inclusive('\n') {
        let body = line.trim_end_matches(['\r', '\n']);
        let ending = &line[body.len()..];
        let trimmed = body.trim_start();

        if let Some(header) = trimmed.strip_prefix('[') {
            in_section = header
                .split_once(']')
                .is_some_and(|(name, _)| name.trim() == section);
        } else if in_section
            && !replaced
            && !trimmed.starts_with([';', '#'])
            && let Some((name, _)) = body.split_once(['=', ':'])
            && normalize_key(name) == key
        {
            out.push_str(name.trim_end());
            out.push_str(" = ");
            out.push_str(value);
            out.push_str(ending);
            replaced = true;
            continue;
        }
        out.push_str(line);
    }

    if replaced {
        fs::write(path, out).fs_context("writing ini file", path)?;
    }
    Ok(replaced)
}

/// Reads every named section of `path`, in file order.
pub fn read_sections(path: &Path) -> Result<Vec<IniSection>> {
    Ok(sections(&load(path)?))
}

/// Extracts the named sections of a loaded document.
pub fn sections(ini: &Ini) -> Vec<IniSection> {
    let defaults: BTreeMap<String, String> = ini
        .section(Some(DEFAULT_SECTION))
        .map(|props| {
            props
                .iter()
                .map(|(k, v)| (normalize_key(k), v.trim().to_string()))
                .collect()
        })
        .unwrap_or_default();

    ini.iter()
        .filter_map(|(name, props)| {
            let name = name?;
            if name == DEFAULT_SECTION {
                return None;
            }
            let mut values = defaults.clone();
            values.extend(
                props
                    .iter()
                    .map(|(k, v)| (normalize_key(k), v.trim().to_string())),
            );
            Some(IniSection {
                name: name.trim().to_string(),
                values,
            })
        })
        .collect()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.ini");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let (_dir, path) = write("[hello_world]\nVendor = Acme\nnotes=Say hi\n");
        let sections = read_sections(&path).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, "hello_world");
        assert_eq!(sections[0].get("vendor"), Some("Acme"));
        assert_eq!(sections[0].get("NOTES"), Some("Say hi"));
    }

    #[test]
    fn test_default_section_is_inherited() {
        let (_dir, path) =
            write("[DEFAULT]\nvendor = Acme\n\n[one]\nnotes = a\n\n[two]\nvendor = Other\n");
        let sections = read_sections(&path).unwrap();
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
        assert_eq!(sections[0].get("vendor"), Some("Acme"));
        assert_eq!(sections[1].get("vendor"), Some("Other"));
    }

    #[test]
    fn test_values_keep_quotes_and_backslashes() {
        let (_dir, path) = write("[app]\nnotes = \"C:\\apps\\x\"\n");
        let sections = read_sections(&path).unwrap();
        assert_eq!(sections[0].get("notes"), Some("\"C:\\apps\\x\""));
    }

    #[test]
    fn test_empty_value_is_present() {
        let (_dir, path) = write("[app]\nuuid =\n");
        let sections = read_sections(&path).unwrap();
        assert_eq!(sections[0].get("uuid"), Some(""));
    }

    #[test]
    fn test_duplicate_section_is_rejected() {
        let (_dir, path) = write("[myapp]\nvendor = A\n\n[myapp]\nvendor = B\n");
        let err = read_sections(&path).unwrap_err();
        assert!(matches!(err, Error::IniParse { ref message, .. } if message.contains("[myapp]")));

        let (_dir, path) = write("[DEFAULT]\nvendor = A\n[DEFAULT]\nnotes = x\n[myapp]\n");
        assert_eq!(read_sections(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_set_value_rewrites_in_place() {
        let (_dir, path) = write(
            "; app settings\r\n[other]\r\nuuid =\r\n[myapp]\r\n  UUID :\r\nvendor = A\r\n",
        );
        assert!(set_value(&path, "myapp", "uuid", "abc").unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "; app settings\r\n[other]\r\nuuid =\r\n[myapp]\r\n  UUID = abc\r\nvendor = A\r\n"
        );

        assert!(!set_value(&path, "myapp", "notes", "x").unwrap());
        assert!(!set_value(&path, "missing", "uuid", "x").unwrap());
    }
}
