//! App descriptors from `package.ini`.
//!
//! Every app root carries a `package.ini` whose sections name the app and its
//! metadata. All sections are parsed up front into typed [`AppDescriptor`]s;
//! the packager then runs once per descriptor.

pub mod ini_file;

use crate::bundler::{
    CONFIG_FILE,
    error::{Error, ErrorExt, Result},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use self::ini_file::IniSection;

/// Typed contents of one `package.ini` section.
///
/// The field names double as the manifest's `app` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    /// Section name; must equal the app root directory name.
    pub name: String,

    /// Stable app identity. Empty values in `package.ini` count as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    /// Publisher shown on the device.
    pub vendor: String,

    /// Free-form description.
    pub notes: String,

    /// App version, major component.
    pub version_major: u32,

    /// App version, minor component.
    pub version_minor: u32,

    /// App version, patch component (defaults to 0).
    #[serde(default)]
    pub version_patch: u32,

    /// Minimum NCOS firmware, major component.
    pub firmware_major: u32,

    /// Minimum NCOS firmware, minor component.
    pub firmware_minor: u32,

    /// Restart the app if it exits.
    pub restart: bool,

    /// Reboot the device if the app exits.
    pub reboot: bool,

    /// Start the app on install.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start: Option<bool>,

    /// Device-defined app category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<i64>,
}

impl AppDescriptor {
    /// Builds a descriptor from a parsed section.
    ///
    /// # Errors
    ///
    /// [`Error::MissingField`] for absent required keys and
    /// [`Error::InvalidValue`] for values that do not parse.
    pub fn from_section(section: &IniSection) -> Result<Self> {
        let name = section.name.clone();
        let fields = Fields { section };

        Ok(Self {
            uuid: section
                .get("uuid")
                .filter(|v| !v.is_empty())
                .map(String::from),
            vendor: fields.required("vendor")?.to_string(),
            notes: fields.required("notes")?.to_string(),
            version_major: fields.uint("version_major")?,
            version_minor: fields.uint("version_minor")?,
            version_patch: fields.optional_uint("version_patch")?.unwrap_or(0),
            firmware_major: fields.uint("firmware_major")?,
            firmware_minor: fields.uint("firmware_minor")?,
            restart: fields.boolean("restart")?,
            reboot: fields.boolean("reboot")?,
            auto_start: fields.optional_boolean("auto_start")?,
            app_type: fields.optional_int("app_type")?,
            name,
        })
    }

    /// Checks that the section name matches the app root directory name.
    pub fn validate_root(&self, app_root: &Path) -> Result<()> {
        let directory = app_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if directory != self.name {
            return Err(Error::ConfigMismatch {
                section: self.name.clone(),
                directory,
            });
        }
        Ok(())
    }

    /// Returns the uuid to put in the manifest.
    ///
    /// Reuses the configured uuid; otherwise mints a random one, unless the
    /// package is being signed, in which case a missing uuid is an error.
    pub fn resolve_uuid(&self, signing: bool) -> Result<String> {
        match (&self.uuid, signing) {
            (Some(uuid), _) => Ok(uuid.clone()),
            (None, false) => {
                let uuid = uuid::Uuid::new_v4().to_string();
                log::info!("Generated uuid {} for unsigned package {}", uuid, self.name);
                Ok(uuid)
            }
            (None, true) => Err(Error::MissingUuid {
                section: self.name.clone(),
            }),
        }
    }
}

/// Typed accessors over one section, producing descriptor errors.
struct Fields<'a> {
    section: &'a IniSection,
}

impl<'a> Fields<'a> {
    fn required(&self, field: &'static str) -> Result<&'a str> {
        self.section.get(field).ok_or_else(|| Error::MissingField {
            section: self.section.name.clone(),
            field,
        })
    }

    fn invalid(&self, field: &'static str, value: &str) -> Error {
        Error::InvalidValue {
            section: self.section.name.clone(),
            field,
            value: value.to_string(),
        }
    }

    fn uint(&self, field: &'static str) -> Result<u32> {
        let raw = self.required(field)?;
        raw.parse().map_err(|_| self.invalid(field, raw))
    }

    fn optional_uint(&self, field: &'static str) -> Result<Option<u32>> {
        self.section
            .get(field)
            .map(|raw| raw.parse().map_err(|_| self.invalid(field, raw)))
            .transpose()
    }

    fn optional_int(&self, field: &'static str) -> Result<Option<i64>> {
        self.section
            .get(field)
            .map(|raw| raw.parse().map_err(|_| self.invalid(field, raw)))
            .transpose()
    }

    fn boolean(&self, field: &'static str) -> Result<bool> {
        let raw = self.required(field)?;
        parse_bool(raw).ok_or_else(|| self.invalid(field, raw))
    }

    fn optional_boolean(&self, field: &'static str) -> Result<Option<bool>> {
        self.section
            .get(field)
            .map(|raw| parse_bool(raw).ok_or_else(|| self.invalid(field, raw)))
            .transpose()
    }
}

/// Parses configparser booleans (`1/yes/true/on`, `0/no/false/off`).
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Parses every app section of `<app_root>/package.ini`, in file order.
pub fn load_descriptors(app_root: &Path) -> Result<Vec<AppDescriptor>> {
    let config_file = app_root.join(CONFIG_FILE);
    if !config_file.is_file() {
        return Err(Error::MissingDescriptor { path: config_file });
    }

    let sections = ini_file::read_sections(&config_file)?;
    if sections.is_empty() {
        return Err(Error::NoSections { path: config_file });
    }

    sections.iter().map(AppDescriptor::from_section).collect()
}

/// Lists app directories directly under `workdir`.
///
/// Any subdirectory holding a `package.ini` counts as an app. Names are
/// returned sorted.
pub fn discover_apps(workdir: &Path) -> Result<Vec<String>> {
    log::info!("Scanning {} for app directories.", workdir.display());

    let mut apps = Vec::new();
    for entry in fs::read_dir(workdir).fs_context("listing app directories", workdir)? {
        let entry = entry.fs_context("listing app directories", workdir)?;
        let path = entry.path();
        if path.is_dir() && path.join(CONFIG_FILE).is_file() {
            apps.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    apps.sort();
    Ok(apps)
}

/// Outcome of [`ensure_uuid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UuidStatus {
    /// `package.ini` already held a uuid.
    Existing(String),
    /// A fresh uuid was generated and saved.
    Created(String),
}

impl UuidStatus {
    /// The uuid, whether pre-existing or new.
    pub fn uuid(&self) -> &str {
        match self {
            Self::Existing(u) | Self::Created(u) => u,
        }
    }
}

/// Makes sure the app's section in `package.ini` has a uuid.
///
/// An empty `uuid` value is replaced by a new random uuid and the file is
/// rewritten. A missing `uuid` key is reported as [`Error::MissingField`];
/// the key has to be declared before a value is assigned.
pub fn ensure_uuid(app_root: &Path, app_name: &str) -> Result<UuidStatus> {
    let config_file: PathBuf = app_root.join(CONFIG_FILE);
    if !config_file.is_file() {
        return Err(Error::MissingDescriptor { path: config_file });
    }

    let section = ini_file::read_sections(&config_file)?
        .into_iter()
        .find(|s| s.name == app_name)
        .ok_or_else(|| Error::ConfigMismatch {
            section: app_name.to_string(),
            directory: app_root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        })?;

    let missing_key = || Error::MissingField {
        section: app_name.to_string(),
        field: "uuid",
    };

    match section.get("uuid") {
        None => Err(missing_key()),
        Some(existing) if !existing.is_empty() => Ok(UuidStatus::Existing(existing.to_string())),
        Some(_) => {
            let uuid = uuid::Uuid::new_v4().to_string();
            if !ini_file::set_value(&config_file, app_name, "uuid", &uuid)? {
                return Err(missing_key());
            }
            log::info!("Created and saved uuid {} in {}", uuid, config_file.display());
            Ok(UuidStatus::Created(uuid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HELLO: &str = "[hello_world]\n\
        uuid = 616acd0c-0475-479e-a33b-f7054843c973\n\
        vendor = Acme\n\
        notes = Hello World app\n\
        version_major = 1\n\
        version_minor = 2\n\
        firmware_major = 7\n\
        firmware_minor = 0\n\
        restart = true\n\
        reboot = False\n";

    fn app(name: &str, ini: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(CONFIG_FILE), ini).unwrap();
        (dir, root)
    }

    #[test]
    fn test_load_descriptor_fields() {
        let (_dir, root) = app("hello_world", HELLO);
        let descriptors = load_descriptors(&root).unwrap();
        assert_eq!(descriptors.len(), 1);

        let d = &descriptors[0];
        assert_eq!(d.name, "hello_world");
        assert_eq!(d.uuid.as_deref(), Some("616acd0c-0475-479e-a33b-f7054843c973"));
        assert_eq!((d.version_major, d.version_minor, d.version_patch), (1, 2, 0));
        assert_eq!((d.firmware_major, d.firmware_minor), (7, 0));
        assert!(d.restart);
        assert!(!d.reboot);
        assert_eq!(d.auto_start, None);
        assert_eq!(d.app_type, None);
        d.validate_root(&root).unwrap();
    }

    #[test]
    fn test_optional_fields() {
        let ini = format!("{HELLO}version_patch = 3\nauto_start = yes\napp_type = 2\n");
        let (_dir, root) = app("hello_world", &ini);
        let d = &load_descriptors(&root).unwrap()[0];
        assert_eq!(d.version_patch, 3);
        assert_eq!(d.auto_start, Some(true));
        assert_eq!(d.app_type, Some(2));
    }

    #[test]
    fn test_missing_required_field() {
        let ini = HELLO.replace("vendor = Acme\n", "");
        let (_dir, root) = app("hello_world", &ini);
        let err = load_descriptors(&root).unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "vendor", .. }));
        assert!(err.is_config_validation());
    }

    #[test]
    fn test_invalid_values() {
        let ini = HELLO.replace("version_major = 1", "version_major = -1");
        let (_dir, root) = app("hello_world", &ini);
        assert!(matches!(
            load_descriptors(&root).unwrap_err(),
            Error::InvalidValue { field: "version_major", .. }
        ));

        let ini = HELLO.replace("restart = true", "restart = maybe");
        let (_dir, root) = app("hello_world", &ini);
        assert!(matches!(
            load_descriptors(&root).unwrap_err(),
            Error::InvalidValue { field: "restart", .. }
        ));
    }

    #[test]
    fn test_name_mismatch() {
        let ini = HELLO.replace("[hello_world]", "[foo]");
        let (_dir, root) = app("bar", &ini);
        let d = &load_descriptors(&root).unwrap()[0];
        let err = d.validate_root(&root).unwrap_err();
        assert!(matches!(err, Error::ConfigMismatch { .. }));
        assert!(err.to_string().contains("'bar'"));
    }

    #[test]
    fn test_missing_descriptor_and_empty_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_descriptors(dir.path()).unwrap_err(),
            Error::MissingDescriptor { .. }
        ));

        let (_dir, root) = app("empty", "; nothing here\n");
        assert!(matches!(load_descriptors(&root).unwrap_err(), Error::NoSections { .. }));
    }

    #[test]
    fn test_resolve_uuid_rules() {
        let (_dir, root) = app("hello_world", HELLO);
        let mut d = load_descriptors(&root).unwrap().remove(0);
        assert_eq!(
            d.resolve_uuid(true).unwrap(),
            "616acd0c-0475-479e-a33b-f7054843c973"
        );

        d.uuid = None;
        let minted = d.resolve_uuid(false).unwrap();
        assert!(uuid::Uuid::parse_str(&minted).is_ok());
        assert!(matches!(d.resolve_uuid(true).unwrap_err(), Error::MissingUuid { .. }));
    }

    #[test]
    fn test_empty_uuid_counts_as_absent() {
        let ini = HELLO.replace("uuid = 616acd0c-0475-479e-a33b-f7054843c973", "uuid =");
        let (_dir, root) = app("hello_world", &ini);
        assert_eq!(load_descriptors(&root).unwrap()[0].uuid, None);
    }

    #[test]
    fn test_ensure_uuid_fills_empty_value() {
        let ini = HELLO.replace("uuid = 616acd0c-0475-479e-a33b-f7054843c973", "uuid =");
        let (_dir, root) = app("hello_world", &ini);

        let created = match ensure_uuid(&root, "hello_world").unwrap() {
            UuidStatus::Created(uuid) => uuid,
            other => panic!("expected a new uuid, got {other:?}"),
        };

        let reloaded = &load_descriptors(&root).unwrap()[0];
        assert_eq!(reloaded.uuid.as_deref(), Some(created.as_str()));
        assert_eq!(reloaded.vendor, "Acme");

        assert_eq!(
            ensure_uuid(&root, "hello_world").unwrap(),
            UuidStatus::Existing(created)
        );
    }

    #[test]
    fn test_ensure_uuid_keeps_key_position() {
        let (_dir, root) = app("myapp", "[myapp]\nuuid =\nvendor = A\nnotes = x\n");
        let created = ensure_uuid(&root, "myapp").unwrap();
        assert_eq!(
            fs::read_to_string(root.join(CONFIG_FILE)).unwrap(),
            format!("[myapp]\nuuid = {}\nvendor = A\nnotes = x\n", created.uuid())
        );
    }

    #[test]
    fn test_ensure_uuid_requires_key() {
        let ini = HELLO.replace("uuid = 616acd0c-0475-479e-a33b-f7054843c973\n", "");
        let (_dir, root) = app("hello_world", &ini);
        assert!(matches!(
            ensure_uuid(&root, "hello_world").unwrap_err(),
            Error::MissingField { field: "uuid", .. }
        ));
    }

    #[test]
    fn test_discover_apps() {
        let dir = TempDir::new().unwrap();
        for name in ["zeta", "alpha"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
            fs::write(dir.path().join(name).join(CONFIG_FILE), "[x]\n").unwrap();
        }
        fs::create_dir_all(dir.path().join("not_an_app")).unwrap();
        fs::write(dir.path().join("loose.ini"), "").unwrap();

        assert_eq!(discover_apps(dir.path()).unwrap(), vec!["alpha", "zeta"]);
    }
}
