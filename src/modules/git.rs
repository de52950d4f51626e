//! Git modules

use bootstrap::{Error, Module, ModuleResult, Result, ShellRunner, VarStore};

/// Clones a git repository.
#[derive(Debug, Clone, Default)]
pub struct GitClone {
    /// Repository url
    pub url: String,
    /// Folder to clone into; git derives one from the url when empty
    pub target: Option<String>,
    /// Working directory the clone runs in
    pub working_directory: Option<String>,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for GitClone {
    fn describe(&self) -> String {
        format!("git clone {} {}", self.url, self.target.as_deref().unwrap_or(""))
            .trim_end()
            .to_string()
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        if self.url.trim().is_empty() {
            return Err(Error::ModuleConfiguration {
                message: "cannot clone without a repository url".to_string(),
            });
        }

        let arguments = match &self.target {
            Some(target) => format!("clone {} {target}", self.url),
            None => format!("clone {}", self.url),
        };

        ShellRunner::new("git", arguments)
            .working_directory(self.working_directory.clone())
            .run(vars)
    }
}

/// Pulls the current branch of an existing repository.
#[derive(Debug, Clone, Default)]
pub struct GitPull {
    /// Repository checkout to pull in
    pub working_directory: Option<String>,
    /// Keep running the package when this module fails
    pub allow_error: bool,
}

impl Module for GitPull {
    fn describe(&self) -> String {
        "git pull".to_string()
    }

    fn allow_error(&self) -> bool {
        self.allow_error
    }

    fn run(&self, vars: &VarStore) -> Result<ModuleResult> {
        ShellRunner::new("git", "pull")
            .working_directory(self.working_directory.clone())
            .run(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_requires_url() {
        let module = GitClone::default();
        let err = module.run(&VarStore::new()).unwrap_err();
        assert!(matches!(err, Error::ModuleConfiguration { .. }));
    }

    #[test]
    fn test_clone_describe_with_target() {
        let module = GitClone {
            url: "https://example.org/dotfiles.git".to_string(),
            target: Some("~/dotfiles".to_string()),
            ..Default::default()
        };
        assert_eq!(
            module.describe(),
            "git clone https://example.org/dotfiles.git ~/dotfiles"
        );
    }

    #[test]
    fn test_pull_describe() {
        assert_eq!(GitPull::default().describe(), "git pull");
    }
}
