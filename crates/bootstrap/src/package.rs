//! Package - a named, ordered list of modules with dependency metadata

use crate::context::ProgressCallback;
use crate::error::CommandError;
use crate::module::BoxedModule;
use crate::vars::VarStore;

/// A named unit of work: ordered modules plus dependency metadata.
///
/// Module order is execution order; later modules may consume variables
/// exported by earlier ones.
#[derive(Debug, Default)]
pub struct Package {
    /// Unique name across the whole configuration (both pools).
    /// Empty until validation assigns a placeholder.
    pub name: String,
    /// Optional description, informational only
    pub description: Option<String>,
    /// Names of packages that must be solved before this one runs
    pub requires: Vec<String>,
    /// A failing critical package halts the entire run loop
    pub critical: bool,
    /// Run this package even when the status log says it already completed
    pub ignore_already_solved: bool,
    /// The work itself, in execution order
    pub modules: Vec<BoxedModule>,
    /// Package-scoped variables; globals are merged in at dispatch time
    pub variables: VarStore,
}

impl Package {
    /// Create an empty package with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Run every module in order.
    ///
    /// Global variables are copied into the package-local store first;
    /// package-local values win on conflict. On module failure without
    /// `allow_error` the remaining modules are skipped and the error carries
    /// the captured output.
    pub fn run(
        &mut self,
        globals: &VarStore,
        progress: &mut dyn ProgressCallback,
    ) -> Result<(), CommandError> {
        self.variables.merge_defaults(globals);

        for module in &self.modules {
            let result = match module.run(&self.variables) {
                Ok(result) => result,
                Err(err) => {
                    // Pre-execution faults count as a failed module run.
                    if module.allow_error() {
                        log::warn!(
                            "module '{}' in '{}' failed but is marked allow_error: {err}",
                            module.describe(),
                            self.name
                        );
                        continue;
                    }
                    return Err(CommandError {
                        command: module.describe(),
                        output: vec![err.to_string()],
                    });
                }
            };

            if result.is_success() {
                for (key, value) in &result.exported_variables {
                    match self.variables.set(key.clone(), value.clone()) {
                        Some(old) => log::info!(
                            "package '{}': replacing value '{old}' of '${key}' with '{value}'",
                            self.name
                        ),
                        None => log::info!("package '{}': adding '{key}' to variable store", self.name),
                    }
                }
            } else if module.allow_error() {
                progress.on_module_error_allowed(&self.name, &result);
            } else {
                return Err(CommandError {
                    command: result.command,
                    output: result.output,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoProgress;
    use crate::error::{Error, Result};
    use crate::module::Module;
    use crate::types::{ModuleResult, ModuleState};

    /// Scripted module for package-level tests
    #[derive(Debug)]
    struct FakeModule {
        succeed: bool,
        allow_error: bool,
        exports: Vec<(String, String)>,
        configuration_error: bool,
    }

    impl FakeModule {
        fn ok() -> Self {
            Self {
                succeed: true,
                allow_error: false,
                exports: Vec::new(),
                configuration_error: false,
            }
        }

        fn failing() -> Self {
            Self {
                succeed: false,
                ..Self::ok()
            }
        }

        fn exporting(key: &str, value: &str) -> Self {
            Self {
                exports: vec![(key.to_string(), value.to_string())],
                ..Self::ok()
            }
        }
    }

    impl Module for FakeModule {
        fn describe(&self) -> String {
            "fake".to_string()
        }

        fn allow_error(&self) -> bool {
            self.allow_error
        }

        fn run(&self, _vars: &VarStore) -> Result<ModuleResult> {
            if self.configuration_error {
                return Err(Error::ModuleConfiguration {
                    message: "missing field".to_string(),
                });
            }
            let state = if self.succeed {
                ModuleState::Success
            } else {
                ModuleState::Error
            };
            Ok(ModuleResult::new(state, "fake command")
                .with_output(vec!["captured".to_string()])
                .with_variables(self.exports.clone()))
        }
    }

    fn globals() -> VarStore {
        [("username".to_string(), "alice".to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_globals_merged_local_wins() {
        let mut package = Package::new("base");
        package.variables.set("username", "custom");
        package.run(&globals(), &mut NoProgress).unwrap();
        assert_eq!(package.variables.get("username"), Some("custom"));
    }

    #[test]
    fn test_all_modules_succeed() {
        let mut package = Package::new("base");
        package.modules.push(Box::new(FakeModule::ok()));
        package.modules.push(Box::new(FakeModule::ok()));
        assert!(package.run(&globals(), &mut NoProgress).is_ok());
    }

    #[test]
    fn test_exported_variables_visible_to_later_modules() {
        let mut package = Package::new("base");
        package
            .modules
            .push(Box::new(FakeModule::exporting("branch", "main")));
        package.run(&globals(), &mut NoProgress).unwrap();
        assert_eq!(package.variables.get("branch"), Some("main"));
    }

    #[test]
    fn test_export_overwrites_existing_variable() {
        let mut package = Package::new("base");
        package.variables.set("branch", "old");
        package
            .modules
            .push(Box::new(FakeModule::exporting("branch", "new")));
        package.run(&globals(), &mut NoProgress).unwrap();
        assert_eq!(package.variables.get("branch"), Some("new"));
    }

    #[test]
    fn test_failure_aborts_remaining_modules() {
        let mut package = Package::new("base");
        package.modules.push(Box::new(FakeModule::failing()));
        package
            .modules
            .push(Box::new(FakeModule::exporting("never", "set")));

        let err = package.run(&globals(), &mut NoProgress).unwrap_err();
        assert_eq!(err.command, "fake command");
        assert_eq!(err.output, vec!["captured"]);
        assert!(!package.variables.contains("never"));
    }

    #[test]
    fn test_allow_error_continues() {
        let mut package = Package::new("base");
        package.modules.push(Box::new(FakeModule {
            allow_error: true,
            ..FakeModule::failing()
        }));
        package
            .modules
            .push(Box::new(FakeModule::exporting("after", "yes")));

        package.run(&globals(), &mut NoProgress).unwrap();
        assert_eq!(package.variables.get("after"), Some("yes"));
    }

    #[test]
    fn test_configuration_error_fails_package() {
        let mut package = Package::new("base");
        package.modules.push(Box::new(FakeModule {
            configuration_error: true,
            ..FakeModule::ok()
        }));

        let err = package.run(&globals(), &mut NoProgress).unwrap_err();
        assert_eq!(err.command, "fake");
        assert!(err.output[0].contains("missing field"));
    }

    #[test]
    fn test_configuration_error_with_allow_error_continues() {
        let mut package = Package::new("base");
        package.modules.push(Box::new(FakeModule {
            configuration_error: true,
            allow_error: true,
            ..FakeModule::ok()
        }));
        package
            .modules
            .push(Box::new(FakeModule::exporting("after", "yes")));

        package.run(&globals(), &mut NoProgress).unwrap();
        assert_eq!(package.variables.get("after"), Some("yes"));
    }
}
