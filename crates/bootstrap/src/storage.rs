//! Package storage - the dependency state machine
//!
//! Holds every package of one pool together with its evaluation state and is
//! the single point of truth for which packages remain to process. One
//! storage instance per pool; main and cleanup pools never share state.

use crate::error::{Error, Result};
use crate::package::Package;
use crate::status_log::{
    FAILED_LABEL, LogEntry, PREVIOUSLY_RUN_LABEL, SOLVED_LABEL,
};
use crate::types::PackageInfo;
use std::collections::BTreeSet;
use std::fmt;

/// Evaluation state of a package, exhaustive and mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalState {
    /// Requirements have not been checked yet
    NotEvaluated,
    /// All requirements are met; the package can be dispatched
    Ready,
    /// Some requirement is not solved yet, but may still become so
    UnmetDependency,
    /// A requirement failed or is itself unresolvable; the package can
    /// never run
    Unresolvable,
    /// A previous run completed this package; it is skipped and counts as
    /// solved for dependency purposes
    PreviouslyRun,
    /// The package ran successfully in this run
    Solved,
    /// The package ran and failed
    Failed,
}

impl EvalState {
    /// Whether the state is re-evaluated by [`PackageStorage::next_ready`]
    fn is_pending(self) -> bool {
        matches!(
            self,
            Self::NotEvaluated | Self::Ready | Self::UnmetDependency
        )
    }

    /// Whether the package counts as solved for dependency resolution
    fn counts_as_solved(self) -> bool {
        matches!(self, Self::Solved | Self::PreviouslyRun)
    }
}

impl fmt::Display for EvalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotEvaluated => "NotEvaluated",
            Self::Ready => "Ready",
            Self::UnmetDependency => "UnmetDependency",
            Self::Unresolvable => "Unresolvable",
            Self::PreviouslyRun => "PreviouslyRun",
            Self::Solved => "Solved",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Opaque handle to a package inside one storage instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageId(usize);

#[derive(Debug)]
struct Slot {
    package: Package,
    state: EvalState,
}

/// All packages of one pool, tagged by evaluation state.
#[derive(Debug)]
pub struct PackageStorage {
    slots: Vec<Slot>,
}

impl PackageStorage {
    /// Build a storage from previously-logged entries and the pool's
    /// packages, in declaration order.
    ///
    /// A package named by a solved/previously-run log entry starts in
    /// `PreviouslyRun` unless it declares `ignore_already_solved`; everything
    /// else starts in `NotEvaluated`.
    pub fn new(log: &[LogEntry], packages: Vec<Package>) -> Self {
        let solved_names: Vec<&str> = log
            .iter()
            .filter(|e| e.is_solved())
            .map(|e| e.name.as_str())
            .collect();

        let slots = packages
            .into_iter()
            .map(|package| {
                let state = if !package.ignore_already_solved
                    && solved_names.contains(&package.name.as_str())
                {
                    EvalState::PreviouslyRun
                } else {
                    EvalState::NotEvaluated
                };
                Slot { package, state }
            })
            .collect();

        Self { slots }
    }

    /// Number of packages in the storage
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the storage holds no packages
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of all packages, in declaration order
    pub fn names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.package.name.clone()).collect()
    }

    /// Assign placeholder names to unnamed packages, in encounter order.
    pub fn assign_placeholder_names(&mut self) {
        let mut unnamed = 0usize;
        for slot in &mut self.slots {
            if slot.package.name.trim().is_empty() {
                slot.package.name = format!("<Unnamed Package #{unnamed}>");
                unnamed += 1;
            }
        }
    }

    /// Assign placeholder names to unnamed packages, then check that every
    /// name is unique and every `requires` entry names an existing package.
    pub fn validate_packages(&mut self) -> Result<()> {
        self.assign_placeholder_names();

        let mut seen: Vec<&str> = Vec::new();
        for slot in &self.slots {
            let name = slot.package.name.as_str();
            if seen.contains(&name) {
                return Err(Error::DuplicateName {
                    name: name.to_string(),
                });
            }
            seen.push(name);
        }

        let missing: BTreeSet<String> = self
            .slots
            .iter()
            .flat_map(|s| s.package.requires.iter())
            .filter(|r| !seen.contains(&r.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation {
                missing: missing.into_iter().collect(),
            })
        }
    }

    /// Simulate full dependency resolution without running anything.
    ///
    /// Starting from the packages with no requirements plus everything
    /// already `PreviouslyRun`, iteratively admit packages whose requirements
    /// are a subset of the solved set. Fails naming the stuck packages when
    /// no further progress is possible. Takes `&self`: repeated calls on an
    /// unmodified storage yield the same result.
    pub fn dry_run_dependencies(&self) -> Result<()> {
        let mut solved: Vec<&str> = Vec::new();
        let mut remaining: Vec<&Slot> = Vec::new();

        for slot in &self.slots {
            if slot.state.counts_as_solved() || slot.package.requires.is_empty() {
                solved.push(slot.package.name.as_str());
            } else {
                remaining.push(slot);
            }
        }

        while !remaining.is_empty() {
            let (solvable, stuck): (Vec<&Slot>, Vec<&Slot>) = remaining
                .into_iter()
                .partition(|s| s.package.requires.iter().all(|r| solved.contains(&r.as_str())));

            if solvable.is_empty() {
                return Err(Error::Unsolvable {
                    stuck: stuck.iter().map(|s| s.package.name.clone()).collect(),
                });
            }

            solved.extend(solvable.iter().map(|s| s.package.name.as_str()));
            remaining = stuck;
        }

        Ok(())
    }

    /// Re-evaluate pending packages and return the first one that is ready,
    /// scanning in declaration order.
    ///
    /// Returns `None` when no package is ready; the caller decides whether
    /// that means "done" or "deadlocked" by inspecting the remaining states.
    pub fn next_ready(&mut self) -> Option<PackageId> {
        self.evaluate();
        self.slots
            .iter()
            .position(|s| s.state == EvalState::Ready)
            .map(PackageId)
    }

    /// Propagate solved/failed knowledge until no state changes.
    ///
    /// Iterating to a fixed point makes transitive poisoning independent of
    /// declaration order: a failed package marks its dependents unresolvable,
    /// which marks their dependents in turn.
    fn evaluate(&mut self) {
        loop {
            let solved: Vec<String> = self
                .slots
                .iter()
                .filter(|s| s.state.counts_as_solved())
                .map(|s| s.package.name.clone())
                .collect();
            let poisoned: Vec<String> = self
                .slots
                .iter()
                .filter(|s| matches!(s.state, EvalState::Unresolvable | EvalState::Failed))
                .map(|s| s.package.name.clone())
                .collect();

            let mut changed = false;
            for slot in self.slots.iter_mut().filter(|s| s.state.is_pending()) {
                let requires = &slot.package.requires;
                let new_state = if requires
                    .iter()
                    .any(|r| poisoned.contains(r))
                {
                    EvalState::Unresolvable
                } else if requires.iter().all(|r| solved.contains(r)) {
                    EvalState::Ready
                } else {
                    EvalState::UnmetDependency
                };

                if slot.state != new_state {
                    slot.state = new_state;
                    changed = true;
                }
            }

            if !changed {
                return;
            }
        }
    }

    /// Access a package by handle
    pub fn package(&self, id: PackageId) -> &Package {
        &self.slots[id.0].package
    }

    /// Mutable access to a package by handle (the run loop needs it to
    /// execute modules)
    pub fn package_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.slots[id.0].package
    }

    /// Current state of a package, if it exists
    pub fn state_of(&self, name: &str) -> Option<EvalState> {
        self.slots
            .iter()
            .find(|s| s.package.name == name)
            .map(|s| s.state)
    }

    /// Transition a ready package to `Solved`
    pub fn mark_solved(&mut self, name: &str) -> Result<()> {
        self.mark(name, EvalState::Solved)
    }

    /// Transition a ready package to `Failed`
    pub fn mark_failed(&mut self, name: &str) -> Result<()> {
        self.mark(name, EvalState::Failed)
    }

    fn mark(&mut self, name: &str, new_state: EvalState) -> Result<()> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.package.name == name)
            .ok_or_else(|| Error::PackageNotFound {
                name: name.to_string(),
            })?;

        if slot.state != EvalState::Ready {
            return Err(Error::InvalidTransition {
                name: name.to_string(),
                state: slot.state.to_string(),
            });
        }

        slot.state = new_state;
        Ok(())
    }

    /// One log entry per package reflecting its terminal outcome.
    ///
    /// `Solved` and `PreviouslyRun` keep their labels; every other state
    /// gets the failure label: it did not reach a confirmed-good state,
    /// whether or not it was ever attempted.
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.slots
            .iter()
            .map(|s| {
                let label = match s.state {
                    EvalState::Solved => SOLVED_LABEL,
                    EvalState::PreviouslyRun => PREVIOUSLY_RUN_LABEL,
                    _ => FAILED_LABEL,
                };
                LogEntry::new(s.package.name.clone(), label)
            })
            .collect()
    }

    /// Summary rows for every package, in declaration order
    pub fn summaries(&self) -> Vec<PackageInfo> {
        self.slots
            .iter()
            .map(|s| PackageInfo {
                name: s.package.name.clone(),
                description: s.package.description.clone(),
                module_count: s.package.modules.len(),
                critical: s.package.critical,
                previously_run: s.state == EvalState::PreviouslyRun,
            })
            .collect()
    }

    /// Number of packages currently in the given state
    pub fn count(&self, state: EvalState) -> usize {
        self.slots.iter().filter(|s| s.state == state).count()
    }

    /// Names of packages that never reached a terminal run state, in
    /// declaration order
    pub fn unresolved_names(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| {
                matches!(
                    s.state,
                    EvalState::NotEvaluated
                        | EvalState::Ready
                        | EvalState::UnmetDependency
                        | EvalState::Unresolvable
                )
            })
            .map(|s| s.package.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(name: &str, requires: &[&str]) -> Package {
        let mut p = Package::new(name);
        p.requires = requires.iter().map(|r| r.to_string()).collect();
        p
    }

    fn storage(packages: Vec<Package>) -> PackageStorage {
        PackageStorage::new(&[], packages)
    }

    #[test]
    fn test_no_requirements_is_ready_immediately() {
        let mut storage = storage(vec![package("base", &[])]);
        let id = storage.next_ready().expect("base should be ready");
        assert_eq!(storage.package(id).name, "base");
    }

    #[test]
    fn test_declaration_order_determinism() {
        let mut storage = storage(vec![
            package("first", &[]),
            package("second", &[]),
        ]);
        let id = storage.next_ready().unwrap();
        assert_eq!(storage.package(id).name, "first");
        storage.mark_solved("first").unwrap();
        let id = storage.next_ready().unwrap();
        assert_eq!(storage.package(id).name, "second");
    }

    #[test]
    fn test_dependency_becomes_ready_after_solve() {
        let mut storage = storage(vec![
            package("base", &[]),
            package("apps", &["base"]),
        ]);

        let id = storage.next_ready().unwrap();
        assert_eq!(storage.package(id).name, "base");
        assert_eq!(storage.state_of("apps"), Some(EvalState::UnmetDependency));

        storage.mark_solved("base").unwrap();
        let id = storage.next_ready().unwrap();
        assert_eq!(storage.package(id).name, "apps");
    }

    #[test]
    fn test_previously_run_counts_as_solved() {
        let log = vec![LogEntry::new("base", SOLVED_LABEL)];
        let mut storage = PackageStorage::new(
            &log,
            vec![package("base", &[]), package("apps", &["base"])],
        );

        assert_eq!(storage.state_of("base"), Some(EvalState::PreviouslyRun));
        let id = storage.next_ready().unwrap();
        assert_eq!(storage.package(id).name, "apps");
    }

    #[test]
    fn test_ignore_already_solved_forces_rerun() {
        let log = vec![
            LogEntry::new("x", SOLVED_LABEL),
            LogEntry::new("y", SOLVED_LABEL),
        ];
        let mut y = package("y", &[]);
        y.ignore_already_solved = true;
        let storage = PackageStorage::new(&log, vec![package("x", &[]), y]);

        assert_eq!(storage.state_of("x"), Some(EvalState::PreviouslyRun));
        assert_eq!(storage.state_of("y"), Some(EvalState::NotEvaluated));
    }

    #[test]
    fn test_previously_run_label_also_seeds_previously_run() {
        let log = vec![LogEntry::new("x", PREVIOUSLY_RUN_LABEL)];
        let storage = PackageStorage::new(&log, vec![package("x", &[])]);
        assert_eq!(storage.state_of("x"), Some(EvalState::PreviouslyRun));
    }

    #[test]
    fn test_failed_dependency_poisons_dependents_transitively() {
        let mut storage = storage(vec![
            package("a", &[]),
            package("b", &["a"]),
            package("c", &["b"]),
        ]);

        let id = storage.next_ready().unwrap();
        assert_eq!(storage.package(id).name, "a");
        storage.mark_failed("a").unwrap();

        assert!(storage.next_ready().is_none());
        assert_eq!(storage.state_of("b"), Some(EvalState::Unresolvable));
        assert_eq!(storage.state_of("c"), Some(EvalState::Unresolvable));
    }

    #[test]
    fn test_poisoning_independent_of_declaration_order() {
        // The dependent chain is declared before the package that fails.
        let mut storage = storage(vec![
            package("c", &["b"]),
            package("b", &["a"]),
            package("a", &[]),
        ]);

        let id = storage.next_ready().unwrap();
        assert_eq!(storage.package(id).name, "a");
        storage.mark_failed("a").unwrap();

        assert!(storage.next_ready().is_none());
        assert_eq!(storage.state_of("b"), Some(EvalState::Unresolvable));
        assert_eq!(storage.state_of("c"), Some(EvalState::Unresolvable));
    }

    #[test]
    fn test_mark_requires_ready_state() {
        let mut storage = storage(vec![package("a", &[]), package("b", &["a"])]);
        storage.next_ready().unwrap();

        // "b" is UnmetDependency, not Ready.
        let err = storage.mark_solved("b").unwrap_err();
        match err {
            Error::InvalidTransition { name, state } => {
                assert_eq!(name, "b");
                assert_eq!(state, "UnmetDependency");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mark_unknown_package_is_distinct_error() {
        let mut storage = storage(vec![package("a", &[])]);
        let err = storage.mark_solved("ghost").unwrap_err();
        assert!(matches!(err, Error::PackageNotFound { name } if name == "ghost"));
    }

    #[test]
    fn test_mark_solved_twice_fails() {
        let mut storage = storage(vec![package("a", &[])]);
        storage.next_ready().unwrap();
        storage.mark_solved("a").unwrap();
        let err = storage.mark_solved("a").unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { state, .. } if state == "Solved"));
    }

    #[test]
    fn test_validate_assigns_placeholder_names() {
        let mut storage = storage(vec![
            package("named", &[]),
            package("", &[]),
            package("  ", &[]),
        ]);
        storage.validate_packages().unwrap();
        assert_eq!(
            storage.names(),
            vec!["named", "<Unnamed Package #0>", "<Unnamed Package #1>"]
        );
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut storage = storage(vec![package("twice", &[]), package("twice", &[])]);
        let err = storage.validate_packages().unwrap_err();
        assert!(matches!(err, Error::DuplicateName { name } if name == "twice"));
    }

    #[test]
    fn test_validate_rejects_dangling_requires() {
        let mut storage = storage(vec![
            package("p", &["ghost"]),
            package("q", &["p", "phantom"]),
        ]);
        let err = storage.validate_packages().unwrap_err();
        match err {
            Error::Validation { missing } => {
                assert_eq!(missing, vec!["ghost", "phantom"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dry_run_solvable_chain() {
        let storage = storage(vec![
            package("a", &[]),
            package("b", &["a"]),
            package("c", &["a", "b"]),
        ]);
        assert!(storage.dry_run_dependencies().is_ok());
    }

    #[test]
    fn test_dry_run_detects_cycle() {
        let storage = storage(vec![
            package("a", &["b"]),
            package("b", &["a"]),
            package("ok", &[]),
        ]);
        let err = storage.dry_run_dependencies().unwrap_err();
        match err {
            Error::Unsolvable { stuck } => assert_eq!(stuck, vec!["a", "b"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dry_run_is_idempotent() {
        let solvable = storage(vec![package("a", &[]), package("b", &["a"])]);
        assert!(solvable.dry_run_dependencies().is_ok());
        assert!(solvable.dry_run_dependencies().is_ok());

        let cyclic = storage(vec![package("a", &["b"]), package("b", &["a"])]);
        assert!(cyclic.dry_run_dependencies().is_err());
        assert!(cyclic.dry_run_dependencies().is_err());
    }

    #[test]
    fn test_dry_run_treats_previously_run_as_solved() {
        let log = vec![LogEntry::new("base", SOLVED_LABEL)];
        let storage = PackageStorage::new(
            &log,
            vec![package("base", &["missing-at-runtime"]), package("apps", &["base"])],
        );
        // "base" needs an unsolvable requirement but was previously run,
        // so the pool still resolves.
        assert!(storage.dry_run_dependencies().is_ok());
    }

    #[test]
    fn test_log_entries_reflect_terminal_states() {
        let log = vec![LogEntry::new("old", SOLVED_LABEL)];
        let mut storage = PackageStorage::new(
            &log,
            vec![
                package("old", &[]),
                package("good", &[]),
                package("bad", &[]),
                package("blocked", &["bad"]),
            ],
        );

        storage.next_ready().unwrap();
        storage.mark_solved("good").unwrap();
        storage.next_ready().unwrap();
        storage.mark_failed("bad").unwrap();
        assert!(storage.next_ready().is_none());

        let entries = storage.log_entries();
        assert_eq!(entries[0], LogEntry::new("old", PREVIOUSLY_RUN_LABEL));
        assert_eq!(entries[1], LogEntry::new("good", SOLVED_LABEL));
        assert_eq!(entries[2], LogEntry::new("bad", FAILED_LABEL));
        assert_eq!(entries[3], LogEntry::new("blocked", FAILED_LABEL));
    }

    #[test]
    fn test_unresolved_names_after_deadlock() {
        let mut storage = storage(vec![
            package("done", &[]),
            package("stuck", &["done", "failing"]),
            package("failing", &[]),
        ]);

        storage.next_ready().unwrap();
        storage.mark_solved("done").unwrap();
        storage.next_ready().unwrap();
        storage.mark_failed("failing").unwrap();
        assert!(storage.next_ready().is_none());

        assert_eq!(storage.unresolved_names(), vec!["stuck"]);
    }

    #[test]
    fn test_summaries_expose_the_whole_pool() {
        let log = vec![LogEntry::new("old", SOLVED_LABEL)];
        let mut critical = package("crit", &[]);
        critical.critical = true;
        critical.description = Some("important".to_string());
        let storage = PackageStorage::new(&log, vec![package("old", &[]), critical]);

        let summaries = storage.summaries();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].previously_run);
        assert!(summaries[1].critical);
        assert_eq!(summaries[1].description.as_deref(), Some("important"));
    }
}
