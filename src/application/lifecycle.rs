//! Lifecycle use case - add, update and delete addons.

use log::{debug, info, warn};
use std::sync::Arc;

use crate::application::lease::LeaseTable;
use crate::application::plan::{CommandSettings, FailurePolicy, Step};
use crate::domain::model::{
    Action, AddonRequest, AddonSnapshot, AddonTarget, CommandResult, OperationError,
};
use crate::domain::service::{AddonState, CommandRunner};
use crate::domain::validate::{is_valid_remote_name, is_valid_version};
use crate::runtime::Runtime;

/// Entry point for every addon lifecycle operation.
///
/// Build one per host and share it; concurrent calls are fine. Operations on
/// the same identifier are serialized by a per-identifier lease, operations on
/// different identifiers run in parallel.
pub struct LifecycleManager<R: Runtime, C: CommandRunner> {
    state: AddonState<R>,
    runner: Arc<C>,
    settings: CommandSettings,
    policy: FailurePolicy,
    leases: LeaseTable,
}

impl<R: Runtime, C: CommandRunner> LifecycleManager<R, C> {
    pub fn new(state: AddonState<R>, runner: Arc<C>, settings: CommandSettings) -> Self {
        Self {
            state,
            runner,
            settings,
            policy: FailurePolicy::default(),
            leases: LeaseTable::new(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> &AddonState<R> {
        &self.state
    }

    pub fn settings(&self) -> &CommandSettings {
        &self.settings
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Validate `request` against the current state and run its commands.
    ///
    /// Never fails: rejections and command failures come back as an
    /// unsuccessful [`CommandResult`].
    #[tracing::instrument(skip(self), fields(action = %request.action, identifier = %request.identifier))]
    pub async fn perform(&self, request: &AddonRequest) -> CommandResult {
        let _lease = self.leases.acquire(&request.identifier).await;

        let result = match self.execute(request).await {
            Ok(result) => result,
            Err(err) => {
                debug!("Rejected before running any command: {}", err);
                err.into()
            }
        };

        info!(
            "Action={} Package={} Version={} Success={} Message={:?}",
            request.action,
            request.identifier,
            request.version,
            result.success,
            result.message()
        );
        result
    }

    async fn execute(&self, request: &AddonRequest) -> Result<CommandResult, OperationError> {
        let snapshot = self.state.snapshot();
        let target = request.target();

        check(request.action, &target, &snapshot)?;
        let steps = self.settings.steps(request.action, &target)?;

        Ok(self.run_steps(&steps).await)
    }

    /// Run steps in order. Under [`FailurePolicy::Abort`] the first failure
    /// ends the run and is returned; otherwise the last step's result is.
    async fn run_steps(&self, steps: &[Step]) -> CommandResult {
        let mut last = CommandResult::failure("Nothing to run");
        for (index, step) in steps.iter().enumerate() {
            debug!("Step {}/{}: {} (in {:?})", index + 1, steps.len(), step, step.cwd);
            last = self.runner.run(&step.program, &step.args, &step.cwd).await;

            let remaining = steps.len() - index - 1;
            if !last.success && remaining > 0 {
                match self.policy {
                    FailurePolicy::Abort => {
                        warn!("'{}' failed; skipping {} remaining step(s)", step, remaining);
                        break;
                    }
                    FailurePolicy::Continue => {
                        warn!("'{}' failed; continuing", step);
                    }
                }
            }
        }
        last
    }
}

/// Decide whether `action` is allowed on `target` given `snapshot`.
///
/// Remote names are validated first, then the version, then the
/// installed/locked rules.
pub fn check(
    action: Action,
    target: &AddonTarget,
    snapshot: &AddonSnapshot,
) -> Result<(), OperationError> {
    match target {
        AddonTarget::Local { .. } => match action {
            Action::Update => Ok(()),
            Action::Add | Action::Delete => Err(OperationError::LocalNotUpdatable),
        },
        AddonTarget::Remote { name, version } => {
            if !is_valid_remote_name(name) {
                return Err(OperationError::InvalidName(name.clone()));
            }
            if let Some(version) = version
                && !is_valid_version(version)
            {
                return Err(OperationError::InvalidVersion(version.clone()));
            }

            let installed = snapshot.is_installed(name);
            match action {
                Action::Add if installed => Err(OperationError::AlreadyInstalled),
                Action::Update | Action::Delete if !installed => Err(OperationError::NotInstalled),
                Action::Delete if snapshot.is_locked(name) => Err(OperationError::Locked),
                Action::Add | Action::Update | Action::Delete => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::service::MockCommandRunner;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{HOST_ROOT, mock_state as state};
    use async_trait::async_trait;
    use mockall::Sequence;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn manager(
        state: AddonState<MockRuntime>,
        runner: MockCommandRunner,
    ) -> LifecycleManager<MockRuntime, MockCommandRunner> {
        LifecycleManager::new(state, Arc::new(runner), CommandSettings::new(HOST_ROOT))
    }

    fn no_commands() -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        runner
    }

    fn expect_step(
        runner: &mut MockCommandRunner,
        seq: &mut Sequence,
        program: &'static str,
        args: &'static [&'static str],
        cwd: &str,
        result: CommandResult,
    ) {
        let cwd = PathBuf::from(cwd);
        runner
            .expect_run()
            .withf(move |p, a, c| {
                p == program && a.iter().map(String::as_str).eq(args.iter().copied()) && c == cwd
            })
            .times(1)
            .in_sequence(seq)
            .return_const(result);
    }

    #[tokio::test]
    async fn test_add_invalid_name_spawns_nothing() {
        let manager = manager(state(&[], &[]), no_commands());
        for name in ["Left-Pad", "", ".hidden", "has space", "foo/bar", "relative/path"] {
            let result = manager.perform(&AddonRequest::new(Action::Add, name, "")).await;
            assert!(!result.success, "{:?} should be rejected", name);
            assert!(result.message().starts_with("Invalid package name"));
        }
    }

    #[tokio::test]
    async fn test_invalid_version_spawns_nothing() {
        let manager = manager(state(&["left-pad"], &[]), no_commands());
        for action in [Action::Add, Action::Update, Action::Delete] {
            let result = manager
                .perform(&AddonRequest::new(action, "left-pad", "latest"))
                .await;
            assert!(!result.success);
            assert_eq!(result.message(), "Invalid version: latest");
        }
    }

    #[tokio::test]
    async fn test_add_already_installed() {
        let manager = manager(state(&["left-pad"], &[]), no_commands());
        let result = manager
            .perform(&AddonRequest::new(Action::Add, "left-pad", ""))
            .await;
        assert_eq!(result, CommandResult::failure("Package is already installed"));
    }

    #[tokio::test]
    async fn test_update_and_delete_require_installed() {
        let manager = manager(state(&["right-pad"], &[]), no_commands());
        for action in [Action::Update, Action::Delete] {
            let result = manager
                .perform(&AddonRequest::new(action, "left-pad", ""))
                .await;
            assert_eq!(result, CommandResult::failure("Package is not installed"));
        }
    }

    #[tokio::test]
    async fn test_delete_locked() {
        let manager = manager(state(&["left-pad"], &["left-pad"]), no_commands());
        let result = manager
            .perform(&AddonRequest::new(Action::Delete, "left-pad", ""))
            .await;
        assert_eq!(
            result,
            CommandResult::failure("This package is locked and cannot be removed")
        );
    }

    #[tokio::test]
    async fn test_update_locked_is_allowed() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_step(
            &mut runner,
            &mut seq,
            "yarn",
            &["global", "upgrade", "left-pad", "--latest"],
            HOST_ROOT,
            CommandResult::success("upgraded"),
        );

        let manager = manager(state(&["left-pad"], &["left-pad"]), runner);
        let result = manager
            .perform(&AddonRequest::new(Action::Update, "left-pad", ""))
            .await;
        assert_eq!(result, CommandResult::success("upgraded"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_add_and_delete_rejected_regardless_of_state() {
        for (installed, locked) in [
            (vec![], vec![]),
            (vec!["/srv/local-addon"], vec![]),
            (vec!["/srv/local-addon"], vec!["/srv/local-addon"]),
        ] {
            let manager = manager(state(&installed, &locked), no_commands());
            for action in [Action::Add, Action::Delete] {
                let result = manager
                    .perform(&AddonRequest::new(action, "/srv/local-addon", ""))
                    .await;
                assert_eq!(
                    result,
                    CommandResult::failure("Local packages can only be updated")
                );
            }
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_add_end_to_end() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_step(
            &mut runner,
            &mut seq,
            "yarn",
            &["global", "add", "left-pad"],
            HOST_ROOT,
            CommandResult::success("success Installed \"left-pad@1.3.0\""),
        );
        expect_step(
            &mut runner,
            &mut seq,
            "hydrooj",
            &["addon", "add", "left-pad"],
            HOST_ROOT,
            CommandResult::success("Addon left-pad registered"),
        );

        let manager = manager(state(&[], &[]), runner);
        let result = manager
            .perform(&AddonRequest::new(Action::Add, "left-pad", ""))
            .await;
        assert_eq!(result, CommandResult::success("Addon left-pad registered"));
    }

    #[tokio::test]
    async fn test_add_pins_version() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_step(
            &mut runner,
            &mut seq,
            "yarn",
            &["global", "add", "@hydrooj/ui-next@2.1.0"],
            HOST_ROOT,
            CommandResult::success("ok"),
        );
        expect_step(
            &mut runner,
            &mut seq,
            "hydrooj",
            &["addon", "add", "@hydrooj/ui-next"],
            HOST_ROOT,
            CommandResult::success("registered"),
        );

        let manager = manager(state(&[], &[]), runner);
        let result = manager
            .perform(&AddonRequest::new(Action::Add, "@hydrooj/ui-next", "2.1.0"))
            .await;
        assert!(result.success);
    }

    #[test_log::test(tokio::test)]
    async fn test_delete_reports_unregister_failure() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_step(
            &mut runner,
            &mut seq,
            "yarn",
            &["global", "remove", "left-pad"],
            HOST_ROOT,
            CommandResult::success("removed"),
        );
        expect_step(
            &mut runner,
            &mut seq,
            "hydrooj",
            &["addon", "remove", "left-pad"],
            HOST_ROOT,
            CommandResult::failure("not found"),
        );

        let manager = manager(state(&["left-pad"], &[]), runner);
        let result = manager
            .perform(&AddonRequest::new(Action::Delete, "left-pad", ""))
            .await;
        assert_eq!(result, CommandResult::failure("not found"));
    }

    #[tokio::test]
    async fn test_abort_policy_skips_second_step() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_step(
            &mut runner,
            &mut seq,
            "yarn",
            &["global", "add", "left-pad"],
            HOST_ROOT,
            CommandResult::failure("error An unexpected error occurred"),
        );

        let manager = manager(state(&[], &[]), runner);
        assert_eq!(manager.policy(), FailurePolicy::Abort);
        let result = manager
            .perform(&AddonRequest::new(Action::Add, "left-pad", ""))
            .await;
        assert_eq!(
            result,
            CommandResult::failure("error An unexpected error occurred")
        );
    }

    #[tokio::test]
    async fn test_continue_policy_runs_second_step() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_step(
            &mut runner,
            &mut seq,
            "yarn",
            &["global", "remove", "left-pad"],
            HOST_ROOT,
            CommandResult::failure("This module isn't specified in a package.json file."),
        );
        expect_step(
            &mut runner,
            &mut seq,
            "hydrooj",
            &["addon", "remove", "left-pad"],
            HOST_ROOT,
            CommandResult::success("unregistered"),
        );

        let manager = manager(state(&["left-pad"], &[]), runner).with_policy(FailurePolicy::Continue);
        let result = manager
            .perform(&AddonRequest::new(Action::Delete, "left-pad", ""))
            .await;
        assert_eq!(result, CommandResult::success("unregistered"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_update_pulls_in_checkout() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_step(
            &mut runner,
            &mut seq,
            "git",
            &["pull", "origin", "main"],
            "/srv/local-addon",
            CommandResult::success("Already up to date."),
        );

        let manager = manager(state(&["/srv/local-addon"], &[]), runner);
        let result = manager
            .perform(&AddonRequest::new(Action::Update, "/srv/local-addon", ""))
            .await;
        assert_eq!(result, CommandResult::success("Already up to date."));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_local_update_ignores_version() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        expect_step(
            &mut runner,
            &mut seq,
            "git",
            &["pull", "origin", "main"],
            "/srv/local-addon",
            CommandResult::failure("fatal: not a git repository"),
        );

        let manager = manager(state(&[], &[]), runner);
        let result = manager
            .perform(&AddonRequest::new(Action::Update, "/srv/local-addon", "not-a-version"))
            .await;
        assert_eq!(result, CommandResult::failure("fatal: not a git repository"));
    }

    #[test]
    fn test_check_order_name_before_state() {
        let snapshot = AddonSnapshot::new(vec!["Bad".into()], vec![]);
        let target = AddonTarget::classify("Bad", "");
        assert_eq!(
            check(Action::Add, &target, &snapshot),
            Err(OperationError::InvalidName("Bad".into()))
        );
    }

    #[test]
    fn test_check_name_before_version() {
        let target = AddonTarget::classify("Bad", "nope");
        assert_eq!(
            check(Action::Add, &target, &AddonSnapshot::default()),
            Err(OperationError::InvalidName("Bad".into()))
        );
    }

    /// Runner that records how many commands overlap.
    #[derive(Default)]
    struct OverlapRunner {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl CommandRunner for OverlapRunner {
        async fn run(&self, _program: &str, _args: &[String], _cwd: &Path) -> CommandResult {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            CommandResult::success("ok")
        }
    }

    #[tokio::test]
    async fn test_same_identifier_is_serialized() {
        let runner = Arc::new(OverlapRunner::default());
        let manager = LifecycleManager::new(
            state(&["left-pad"], &[]),
            Arc::clone(&runner),
            CommandSettings::new(HOST_ROOT),
        );
        let request = AddonRequest::new(Action::Update, "left-pad", "");

        let (a, b) = tokio::join!(manager.perform(&request), manager.perform(&request));
        assert!(a.success && b.success);
        assert_eq!(runner.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_identifiers_run_in_parallel() {
        let runner = Arc::new(OverlapRunner::default());
        let manager = LifecycleManager::new(
            state(&["left-pad", "right-pad"], &[]),
            Arc::clone(&runner),
            CommandSettings::new(HOST_ROOT),
        );
        let left = AddonRequest::new(Action::Update, "left-pad", "");
        let right = AddonRequest::new(Action::Update, "right-pad", "");

        let (a, b) = tokio::join!(manager.perform(&left), manager.perform(&right));
        assert!(a.success && b.success);
        assert_eq!(runner.peak.load(Ordering::SeqCst), 2);
    }
}
