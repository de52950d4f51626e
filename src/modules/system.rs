//! System-level modules: distro packages, services, desktop settings

use bootstrap::{Error, Module, ModuleResult, Result, ShellRunner, VarStore};
use std::fs;

/// Distro package manager invoked by the package modules
const PACKAGE_MANAGER: &str = "dnf";

/// Installs distro packages.
///
/// Package names come from the `packages` list, a `source_file` with one
/// name per line (path subject to variable expansion), or both.
#[derive(Debug, Clone, Default)]
pub struct PackageInstall {
    /// Packages to install
    pub packages: Vec<String>,
    /// File with additional package names, one per line
    pub source_file: Option<String>,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl PackageInstall {
    fn collect_names(&self, vars: &VarStore) -> Result<Vec<String>> {
        let mut names = self.packages.clone();

        if let Some(source) = &self.source_file {
            let path = vars.expand(source);
            let content = fs::read_to_string(&path).map_err(|e| Error::ModuleConfiguration {
                message: format!("the package source file '{path}' could not be read: {e}"),
            })?;
            names.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string),
            );
        }

        if names.is_empty() {
            return Err(Error::ModuleConfiguration {
                message: "no packages to install".to_string(),
            });
        }
        Ok(names)
    }
}

impl Module for PackageInstall {
    fn describe(&self) -> String {
        format!("{PACKAGE_MANAGER} install {}", self.packages.join(" "))
            .trim_end()
            .to_string()
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        let names = self.collect_names(vars)?;
        ShellRunner::new(PACKAGE_MANAGER, format!("install -y {}", names.join(" ")))
            .elevate(true)
            .run(vars)
    }
}

/// Updates all installed distro packages.
#[derive(Debug, Clone, Default)]
pub struct PackageUpdate {
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for PackageUpdate {
    fn describe(&self) -> String {
        format!("{PACKAGE_MANAGER} upgrade")
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        ShellRunner::new(PACKAGE_MANAGER, "upgrade -y")
            .elevate(true)
            .run(vars)
    }
}

/// Controls a systemd service.
#[derive(Debug, Clone)]
pub struct Service {
    /// Service name
    pub name: String,
    /// systemctl action, e.g. `enable`, `start`, `enable --now`
    pub action: String,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            name: String::new(),
            action: "enable".to_string(),
            allow_error: false,
        }
    }
}

impl Module for Service {
    fn describe(&self) -> String {
        format!("systemctl {} {}", self.action, self.name)
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        if self.name.trim().is_empty() {
            return Err(Error::ModuleConfiguration {
                message: "missing required field 'name'".to_string(),
            });
        }
        ShellRunner::new("systemctl", format!("{} {}", self.action, self.name))
            .elevate(true)
            .run(vars)
    }
}

/// Sets a GNOME desktop setting.
#[derive(Debug, Clone, Default)]
pub struct GSettings {
    /// Settings schema, e.g. `org.gnome.desktop.interface`
    pub schema: String,
    /// Key inside the schema
    pub key: String,
    /// Value to set
    pub value: String,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for GSettings {
    fn describe(&self) -> String {
        format!("gsettings set {} {} {}", self.schema, self.key, self.value)
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        for (field, value) in [
            ("schema", &self.schema),
            ("key", &self.key),
            ("value", &self.value),
        ] {
            if value.trim().is_empty() {
                return Err(Error::ModuleConfiguration {
                    message: format!("missing required field '{field}'"),
                });
            }
        }
        ShellRunner::new(
            "gsettings",
            format!("set {} {} {}", self.schema, self.key, self.value),
        )
        .run(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_install_without_packages_is_configuration_error() {
        let module = PackageInstall::default();
        let err = module.run(&VarStore::new()).unwrap_err();
        assert!(matches!(err, Error::ModuleConfiguration { .. }));
    }

    #[test]
    fn test_install_collects_names_from_source_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "git\n# a comment\n\ncurl").unwrap();

        let module = PackageInstall {
            packages: vec!["vim".to_string()],
            source_file: Some(file.path().to_str().unwrap().to_string()),
            ..Default::default()
        };
        let names = module.collect_names(&VarStore::new()).unwrap();
        assert_eq!(names, vec!["vim", "git", "curl"]);
    }

    #[test]
    fn test_install_missing_source_file() {
        let module = PackageInstall {
            source_file: Some("/nonexistent/packages.txt".to_string()),
            ..Default::default()
        };
        let err = module.run(&VarStore::new()).unwrap_err();
        assert!(matches!(err, Error::ModuleConfiguration { .. }));
    }

    #[test]
    fn test_service_defaults_to_enable() {
        let module = Service {
            name: "sshd".to_string(),
            ..Default::default()
        };
        assert_eq!(module.describe(), "systemctl enable sshd");
    }

    #[test]
    fn test_service_requires_name() {
        let err = Service::default().run(&VarStore::new()).unwrap_err();
        assert!(matches!(err, Error::ModuleConfiguration { .. }));
    }

    #[test]
    fn test_gsettings_requires_all_fields() {
        let module = GSettings {
            schema: "org.gnome.desktop.interface".to_string(),
            key: "clock-show-seconds".to_string(),
            ..Default::default()
        };
        let err = module.run(&VarStore::new()).unwrap_err();
        assert!(matches!(err, Error::ModuleConfiguration { .. }));
    }
}
