//! Reconciliation between a remote task source and a local reminder store.
//!
//! Each account binding gets two passes, always in this order:
//! 1. completions: completed local reminders mark the matching pending remote
//!    task complete, then every completed reminder in the list is purged;
//! 2. creations: pending remote tasks without a same-titled reminder are
//!    created locally.
//!
//! Titles are the only matching key between the two sides.

use crate::error::SyncError;
use crate::models::{AccountBinding, Reminder, Task, TaskList, TaskStatus};
use log::{debug, error, info, warn};

pub trait RemoteTaskSource {
    fn list_task_lists(&self) -> Result<Vec<TaskList>, SyncError>;
    fn list_tasks(&self, list_id: &str) -> Result<Vec<Task>, SyncError>;
    fn complete_task(&self, task: &Task) -> Result<(), SyncError>;
}

pub trait LocalReminderStore {
    fn has_list(&self, list: &str) -> Result<bool, SyncError>;
    fn create(&self, list: &str, title: &str, body: &str) -> Result<(), SyncError>;
    fn exists(&self, list: &str, title: &str) -> Result<bool, SyncError>;
    fn list_completed(&self, list: &str) -> Result<Vec<Reminder>, SyncError>;
    fn delete_completed(&self, list: &str) -> Result<(), SyncError>;
}

#[derive(Clone, Copy, Debug)]
pub struct SyncOptions {
    /// Purge completed reminders even when a remote call failed mid-pass.
    pub purge_on_remote_failure: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            purge_on_remote_failure: true,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub completed: usize,
    pub not_found: usize,
    pub skipped_empty: usize,
    pub lookup_failures: usize,
    pub purged: usize,
    pub created: usize,
    pub already_present: usize,
}

impl SyncReport {
    pub fn summary(&self) -> String {
        format!(
            "Completed {} (missing {}, empty {}) purged {} | Created {} (present {}) | Remote errors {}",
            self.completed,
            self.not_found,
            self.skipped_empty,
            self.purged,
            self.created,
            self.already_present,
            self.lookup_failures
        )
    }
}

#[derive(Debug)]
pub struct AccountOutcome {
    pub binding: AccountBinding,
    pub result: Result<SyncReport, SyncError>,
}

enum MarkOutcome {
    Completed,
    NotFound,
    Failed,
}

pub fn propagate_completions<R, L>(
    remote: &R,
    local: &L,
    binding: &AccountBinding,
    options: SyncOptions,
    report: &mut SyncReport,
) -> Result<(), SyncError>
where
    R: RemoteTaskSource + ?Sized,
    L: LocalReminderStore + ?Sized,
{
    let reminders = local.list_completed(&binding.list)?;
    if reminders.is_empty() {
        return Ok(());
    }

    let failures_before = report.lookup_failures;
    for reminder in &reminders {
        let title = reminder.title.trim();
        if title.is_empty() {
            info!("Skipping reminder with empty title.");
            report.skipped_empty += 1;
            continue;
        }
        if !reminder.completed {
            continue;
        }
        debug!(
            "Completed reminder '{}' ({})",
            reminder.title,
            reminder.body.as_deref().unwrap_or("no notes")
        );

        match mark_remote_completed(remote, &reminder.title)? {
            MarkOutcome::Completed => {
                info!("Marked Google Task '{}' as completed.", reminder.title);
                report.completed += 1;
            }
            MarkOutcome::NotFound => {
                warn!("Task '{}' not found in Google Tasks.", reminder.title);
                report.not_found += 1;
            }
            MarkOutcome::Failed => report.lookup_failures += 1,
        }
    }

    if report.lookup_failures > failures_before && !options.purge_on_remote_failure {
        warn!(
            "Keeping completed reminders in '{}' until Google Tasks is reachable again.",
            binding.list
        );
        return Ok(());
    }

    local.delete_completed(&binding.list)?;
    report.purged += reminders.len();
    info!(
        "Deleted {} completed reminder(s) from '{}'.",
        reminders.len(),
        binding.list
    );
    Ok(())
}

/// Remote failures are logged and reported as `None`; anything else is fatal.
fn degrade<T>(result: Result<T, SyncError>) -> Result<Option<T>, SyncError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_remote() => {
            error!("An error occurred: {}", err.message());
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Searches list by list; the first pending task with an equal title wins.
fn mark_remote_completed<R>(remote: &R, title: &str) -> Result<MarkOutcome, SyncError>
where
    R: RemoteTaskSource + ?Sized,
{
    let Some(lists) = degrade(remote.list_task_lists())? else {
        return Ok(MarkOutcome::Failed);
    };

    for list in &lists {
        let Some(tasks) = degrade(remote.list_tasks(&list.id))? else {
            return Ok(MarkOutcome::Failed);
        };

        let candidate = tasks
            .iter()
            .find(|task| task.is_pending() && task.title.as_deref() == Some(title));
        if let Some(task) = candidate {
            return Ok(match degrade(remote.complete_task(task))? {
                Some(()) => MarkOutcome::Completed,
                None => MarkOutcome::Failed,
            });
        }
    }

    Ok(MarkOutcome::NotFound)
}

pub fn propagate_creations<R, L>(
    remote: &R,
    local: &L,
    binding: &AccountBinding,
    report: &mut SyncReport,
) -> Result<(), SyncError>
where
    R: RemoteTaskSource + ?Sized,
    L: LocalReminderStore + ?Sized,
{
    let tasks = match degrade(collect_remote_tasks(remote))? {
        Some(tasks) => tasks,
        None => {
            report.lookup_failures += 1;
            Vec::new()
        }
    };

    for task in tasks.iter().filter(|task| task.status != TaskStatus::Completed) {
        let title = task.display_title();
        if local.exists(&binding.list, title)? {
            report.already_present += 1;
            continue;
        }
        local.create(&binding.list, title, task.display_notes())?;
        info!("Created reminder '{}' in '{}'.", title, binding.list);
        report.created += 1;
    }
    Ok(())
}

/// Every task of every list, in list enumeration order then in-list order.
fn collect_remote_tasks<R>(remote: &R) -> Result<Vec<Task>, SyncError>
where
    R: RemoteTaskSource + ?Sized,
{
    let mut tasks = Vec::new();
    for list in remote.list_task_lists()? {
        let list_tasks = remote.list_tasks(&list.id)?;
        debug!("Fetched {} task(s) from '{}'", list_tasks.len(), list.title);
        tasks.extend(list_tasks);
    }
    Ok(tasks)
}

pub fn sync_account<R, L>(
    remote: &R,
    local: &L,
    binding: &AccountBinding,
    options: SyncOptions,
) -> Result<SyncReport, SyncError>
where
    R: RemoteTaskSource + ?Sized,
    L: LocalReminderStore + ?Sized,
{
    if !local.has_list(&binding.list)? {
        return Err(SyncError::LocalStore(format!(
            "list '{}' does not exist",
            binding.list
        )));
    }

    let mut report = SyncReport::default();
    propagate_completions(remote, local, binding, options, &mut report)?;
    propagate_creations(remote, local, binding, &mut report)?;
    Ok(report)
}

/// Runs both passes for every binding in order. `connect` yields the remote
/// source for one account; a failure there, or any non-remote failure inside
/// the passes, is recorded for that account and the loop moves on.
pub fn sync_all<L, R, F>(
    bindings: &[AccountBinding],
    local: &L,
    options: SyncOptions,
    mut connect: F,
) -> Vec<AccountOutcome>
where
    L: LocalReminderStore + ?Sized,
    R: RemoteTaskSource,
    F: FnMut(&AccountBinding) -> Result<R, SyncError>,
{
    let mut outcomes = Vec::with_capacity(bindings.len());
    for binding in bindings {
        info!("Syncing {} <-> '{}'", binding.email, binding.list);
        let result =
            connect(binding).and_then(|remote| sync_account(&remote, local, binding, options));
        match &result {
            Ok(report) => info!("{}: {}", binding.email, report.summary()),
            Err(err) => error!("{}: {}", binding.email, err.message()),
        }
        outcomes.push(AccountOutcome {
            binding: binding.clone(),
            result,
        });
    }
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct FakeRemote {
        lists: Vec<TaskList>,
        tasks: RefCell<Vec<Task>>,
        updates: RefCell<Vec<String>>,
        fail_lists: bool,
        fail_updates: bool,
    }

    impl FakeRemote {
        fn with_tasks(tasks: &[(&str, &str, TaskStatus)]) -> Self {
            let mut remote = FakeRemote {
                lists: vec![TaskList {
                    id: "default".to_string(),
                    title: "My Tasks".to_string(),
                }],
                ..Default::default()
            };
            for (idx, (list, title, status)) in tasks.iter().enumerate() {
                if !remote.lists.iter().any(|l| l.id == *list) {
                    remote.lists.push(TaskList {
                        id: list.to_string(),
                        title: list.to_string(),
                    });
                }
                remote.tasks.borrow_mut().push(remote_task(idx, list, title, *status));
            }
            remote
        }

        fn status_of(&self, title: &str) -> Vec<TaskStatus> {
            self.tasks
                .borrow()
                .iter()
                .filter(|t| t.title.as_deref() == Some(title))
                .map(|t| t.status)
                .collect()
        }
    }

    fn remote_task(idx: usize, list: &str, title: &str, status: TaskStatus) -> Task {
        Task {
            id: format!("task-{idx}"),
            list_id: list.to_string(),
            title: Some(title.to_string()),
            notes: None,
            status,
            completed_at: match status {
                TaskStatus::Completed => Some("2026-01-01T00:00:00.000Z".to_string()),
                TaskStatus::Pending => None,
            },
        }
    }

    impl RemoteTaskSource for FakeRemote {
        fn list_task_lists(&self) -> Result<Vec<TaskList>, SyncError> {
            if self.fail_lists {
                return Err(SyncError::Request("Task lists failed: HTTP 503".to_string()));
            }
            Ok(self.lists.clone())
        }

        fn list_tasks(&self, list_id: &str) -> Result<Vec<Task>, SyncError> {
            Ok(self
                .tasks
                .borrow()
                .iter()
                .filter(|t| t.list_id == list_id)
                .cloned()
                .collect())
        }

        fn complete_task(&self, task: &Task) -> Result<(), SyncError> {
            if self.fail_updates {
                return Err(SyncError::Request("Task update failed: HTTP 500".to_string()));
            }
            let mut tasks = self.tasks.borrow_mut();
            let stored = tasks
                .iter_mut()
                .find(|t| t.id == task.id)
                .ok_or_else(|| SyncError::Request("unknown task".to_string()))?;
            stored.status = TaskStatus::Completed;
            stored.completed_at = Some("2026-01-02T00:00:00.000Z".to_string());
            self.updates.borrow_mut().push(task.id.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeStore {
        lists: Vec<String>,
        reminders: RefCell<Vec<Reminder>>,
        purges: Cell<usize>,
        fail_create: bool,
    }

    impl FakeStore {
        fn with_list(list: &str) -> Self {
            FakeStore {
                lists: vec![list.to_string()],
                ..Default::default()
            }
        }

        fn add(&self, list: &str, title: &str, completed: bool) {
            self.reminders.borrow_mut().push(Reminder {
                title: title.to_string(),
                body: None,
                completed,
                list: list.to_string(),
            });
        }

        fn titles(&self, list: &str) -> Vec<String> {
            self.reminders
                .borrow()
                .iter()
                .filter(|r| r.list == list)
                .map(|r| r.title.clone())
                .collect()
        }
    }

    impl LocalReminderStore for FakeStore {
        fn has_list(&self, list: &str) -> Result<bool, SyncError> {
            Ok(self.lists.iter().any(|l| l == list))
        }

        fn create(&self, list: &str, title: &str, body: &str) -> Result<(), SyncError> {
            if self.fail_create {
                return Err(SyncError::LocalStore("osascript exited with 1".to_string()));
            }
            self.reminders.borrow_mut().push(Reminder {
                title: title.to_string(),
                body: Some(body.to_string()),
                completed: false,
                list: list.to_string(),
            });
            Ok(())
        }

        fn exists(&self, list: &str, title: &str) -> Result<bool, SyncError> {
            Ok(self
                .reminders
                .borrow()
                .iter()
                .any(|r| r.list == list && r.title == title))
        }

        fn list_completed(&self, list: &str) -> Result<Vec<Reminder>, SyncError> {
            Ok(self
                .reminders
                .borrow()
                .iter()
                .filter(|r| r.list == list && r.completed)
                .cloned()
                .collect())
        }

        fn delete_completed(&self, list: &str) -> Result<(), SyncError> {
            self.purges.set(self.purges.get() + 1);
            self.reminders
                .borrow_mut()
                .retain(|r| !(r.list == list && r.completed));
            Ok(())
        }
    }

    fn binding(list: &str) -> AccountBinding {
        AccountBinding {
            email: "me@example.com".to_string(),
            list: list.to_string(),
        }
    }

    #[test]
    fn no_completed_reminders_means_no_updates_or_deletions() {
        let remote = FakeRemote::with_tasks(&[("default", "Buy milk", TaskStatus::Pending)]);
        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", false);
        let mut report = SyncReport::default();

        propagate_completions(&remote, &local, &binding("Home"), SyncOptions::default(), &mut report)
            .expect("pass");

        assert!(remote.updates.borrow().is_empty());
        assert_eq!(local.purges.get(), 0);
        assert_eq!(report, SyncReport::default());
    }

    #[test]
    fn matched_completion_marks_remote_and_removes_reminder() {
        let remote = FakeRemote::with_tasks(&[
            ("default", "Buy milk", TaskStatus::Pending),
            ("default", "Call Bob", TaskStatus::Pending),
        ]);
        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);
        let mut report = SyncReport::default();

        propagate_completions(&remote, &local, &binding("Home"), SyncOptions::default(), &mut report)
            .expect("pass");

        assert_eq!(remote.status_of("Buy milk"), vec![TaskStatus::Completed]);
        assert_eq!(remote.status_of("Call Bob"), vec![TaskStatus::Pending]);
        assert!(local.titles("Home").is_empty());
        assert_eq!(report.completed, 1);
        assert_eq!(report.purged, 1);
    }

    #[test]
    fn unmatched_completion_changes_nothing_remote_but_still_purges() {
        let remote = FakeRemote::with_tasks(&[("default", "Call Bob", TaskStatus::Pending)]);
        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);
        let mut report = SyncReport::default();

        propagate_completions(&remote, &local, &binding("Home"), SyncOptions::default(), &mut report)
            .expect("pass");

        assert!(remote.updates.borrow().is_empty());
        assert!(!local.titles("Home").contains(&"Buy milk".to_string()));
        assert_eq!(report.not_found, 1);
    }

    #[test]
    fn unmatched_completion_is_purged_even_when_purge_is_conservative() {
        let remote = FakeRemote::with_tasks(&[]);
        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);
        let options = SyncOptions {
            purge_on_remote_failure: false,
        };
        let mut report = SyncReport::default();

        propagate_completions(&remote, &local, &binding("Home"), options, &mut report).expect("pass");

        assert!(local.titles("Home").is_empty());
    }

    #[test]
    fn empty_title_is_skipped_without_remote_lookup() {
        let mut remote = FakeRemote::with_tasks(&[("default", "", TaskStatus::Pending)]);
        remote.fail_lists = true;
        let local = FakeStore::with_list("Home");
        local.add("Home", "  ", true);
        let mut report = SyncReport::default();

        propagate_completions(&remote, &local, &binding("Home"), SyncOptions::default(), &mut report)
            .expect("pass");

        assert!(remote.updates.borrow().is_empty());
        assert_eq!(report.skipped_empty, 1);
        assert_eq!(report.lookup_failures, 0);
        assert_eq!(local.purges.get(), 1);
    }

    #[test]
    fn completed_remote_tasks_are_not_matched_again() {
        let remote = FakeRemote::with_tasks(&[
            ("default", "Buy milk", TaskStatus::Completed),
            ("errands", "Buy milk", TaskStatus::Pending),
        ]);
        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);
        let mut report = SyncReport::default();

        propagate_completions(&remote, &local, &binding("Home"), SyncOptions::default(), &mut report)
            .expect("pass");

        assert_eq!(remote.updates.borrow().as_slice(), ["task-1"]);
    }

    #[test]
    fn first_matching_list_wins() {
        let remote = FakeRemote::with_tasks(&[
            ("default", "Buy milk", TaskStatus::Pending),
            ("errands", "Buy milk", TaskStatus::Pending),
        ]);
        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);
        let mut report = SyncReport::default();

        propagate_completions(&remote, &local, &binding("Home"), SyncOptions::default(), &mut report)
            .expect("pass");

        assert_eq!(remote.updates.borrow().as_slice(), ["task-0"]);
        assert_eq!(
            remote.status_of("Buy milk"),
            vec![TaskStatus::Completed, TaskStatus::Pending]
        );
    }

    #[test]
    fn remote_failure_degrades_and_purge_follows_policy() {
        let mut remote = FakeRemote::with_tasks(&[("default", "Buy milk", TaskStatus::Pending)]);
        remote.fail_updates = true;

        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);
        let mut report = SyncReport::default();
        propagate_completions(&remote, &local, &binding("Home"), SyncOptions::default(), &mut report)
            .expect("remote failures are not fatal");
        assert_eq!(report.lookup_failures, 1);
        assert!(local.titles("Home").is_empty());

        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);
        let mut report = SyncReport::default();
        let options = SyncOptions {
            purge_on_remote_failure: false,
        };
        propagate_completions(&remote, &local, &binding("Home"), options, &mut report).expect("pass");
        assert_eq!(local.titles("Home"), vec!["Buy milk".to_string()]);
        assert_eq!(local.purges.get(), 0);
    }

    #[test]
    fn rejected_credential_mid_pass_is_fatal() {
        struct RevokedRemote;
        impl RemoteTaskSource for RevokedRemote {
            fn list_task_lists(&self) -> Result<Vec<TaskList>, SyncError> {
                Err(SyncError::Authorization("HTTP 401".to_string()))
            }
            fn list_tasks(&self, _list_id: &str) -> Result<Vec<Task>, SyncError> {
                Ok(Vec::new())
            }
            fn complete_task(&self, _task: &Task) -> Result<(), SyncError> {
                Ok(())
            }
        }

        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);
        let mut report = SyncReport::default();

        let result = propagate_completions(
            &RevokedRemote,
            &local,
            &binding("Home"),
            SyncOptions::default(),
            &mut report,
        );

        assert!(matches!(result, Err(SyncError::Authorization(_))));
        assert_eq!(local.titles("Home"), vec!["Buy milk".to_string()]);
    }

    #[test]
    fn creation_pass_skips_completed_tasks() {
        let remote = FakeRemote::with_tasks(&[
            ("default", "Buy milk", TaskStatus::Pending),
            ("default", "Call Bob", TaskStatus::Completed),
        ]);
        let local = FakeStore::with_list("Home");
        let mut report = SyncReport::default();

        propagate_creations(&remote, &local, &binding("Home"), &mut report).expect("pass");

        assert_eq!(local.titles("Home"), vec!["Buy milk".to_string()]);
        assert_eq!(report.created, 1);
    }

    #[test]
    fn creation_pass_is_idempotent() {
        let remote = FakeRemote::with_tasks(&[
            ("default", "Buy milk", TaskStatus::Pending),
            ("errands", "Post letter", TaskStatus::Pending),
        ]);
        let local = FakeStore::with_list("Home");

        let mut first = SyncReport::default();
        propagate_creations(&remote, &local, &binding("Home"), &mut first).expect("first");
        let mut second = SyncReport::default();
        propagate_creations(&remote, &local, &binding("Home"), &mut second).expect("second");

        assert_eq!(first.created, 2);
        assert_eq!(second.created, 0);
        assert_eq!(second.already_present, 2);
        assert_eq!(
            local.titles("Home"),
            vec!["Buy milk".to_string(), "Post letter".to_string()]
        );
    }

    #[test]
    fn creation_uses_placeholders_for_missing_fields() {
        let remote = FakeRemote::with_tasks(&[]);
        remote.tasks.borrow_mut().push(Task {
            id: "bare".to_string(),
            list_id: "default".to_string(),
            title: None,
            notes: None,
            status: TaskStatus::Pending,
            completed_at: None,
        });
        let local = FakeStore::with_list("Home");
        let mut report = SyncReport::default();

        propagate_creations(&remote, &local, &binding("Home"), &mut report).expect("pass");

        let reminders = local.reminders.borrow();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].title, "No Title");
        assert_eq!(reminders[0].body.as_deref(), Some("No Notes"));
    }

    #[test]
    fn existing_reminder_is_not_updated() {
        let remote = FakeRemote::with_tasks(&[("default", "Buy milk", TaskStatus::Pending)]);
        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", false);
        let mut report = SyncReport::default();

        propagate_creations(&remote, &local, &binding("Home"), &mut report).expect("pass");

        assert_eq!(local.reminders.borrow()[0].body, None);
        assert_eq!(report.already_present, 1);
    }

    #[test]
    fn remote_listing_failure_creates_nothing() {
        let mut remote = FakeRemote::with_tasks(&[("default", "Buy milk", TaskStatus::Pending)]);
        remote.fail_lists = true;
        let local = FakeStore::with_list("Home");
        let mut report = SyncReport::default();

        propagate_creations(&remote, &local, &binding("Home"), &mut report).expect("pass");

        assert!(local.titles("Home").is_empty());
        assert_eq!(report.lookup_failures, 1);
    }

    #[test]
    fn local_failure_is_fatal_to_the_pass() {
        let remote = FakeRemote::with_tasks(&[("default", "Buy milk", TaskStatus::Pending)]);
        let mut local = FakeStore::with_list("Home");
        local.fail_create = true;
        let mut report = SyncReport::default();

        let result = propagate_creations(&remote, &local, &binding("Home"), &mut report);

        assert!(matches!(result, Err(SyncError::LocalStore(_))));
    }

    #[test]
    fn completion_runs_before_creation() {
        let remote = FakeRemote::with_tasks(&[("default", "Buy milk", TaskStatus::Pending)]);
        let local = FakeStore::with_list("Home");
        local.add("Home", "Buy milk", true);

        let report =
            sync_account(&remote, &local, &binding("Home"), SyncOptions::default()).expect("sync");

        assert_eq!(remote.status_of("Buy milk"), vec![TaskStatus::Completed]);
        assert!(local.titles("Home").is_empty());
        assert_eq!(report.completed, 1);
        assert_eq!(report.created, 0);
    }

    #[test]
    fn missing_local_list_fails_the_account() {
        let remote = FakeRemote::with_tasks(&[("default", "Buy milk", TaskStatus::Pending)]);
        let local = FakeStore::with_list("Home");

        let result = sync_account(&remote, &local, &binding("Work"), SyncOptions::default());

        assert!(matches!(result, Err(SyncError::LocalStore(_))));
        assert!(local.reminders.borrow().is_empty());
    }

    #[test]
    fn one_failing_account_does_not_stop_the_rest() {
        let local = FakeStore {
            lists: vec!["Work".to_string(), "Home".to_string()],
            ..Default::default()
        };
        let bindings = vec![
            AccountBinding {
                email: "work@example.com".to_string(),
                list: "Work".to_string(),
            },
            AccountBinding {
                email: "home@example.com".to_string(),
                list: "Home".to_string(),
            },
        ];

        let outcomes = sync_all(&bindings, &local, SyncOptions::default(), |b| {
            if b.email.starts_with("work") {
                Err(SyncError::Authorization("token revoked".to_string()))
            } else {
                Ok(FakeRemote::with_tasks(&[("default", "Water plants", TaskStatus::Pending)]))
            }
        });

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0].result, Err(SyncError::Authorization(_))));
        assert_eq!(outcomes[1].result.as_ref().map(|r| r.created).ok(), Some(1));
        assert!(local.titles("Work").is_empty());
        assert_eq!(local.titles("Home"), vec!["Water plants".to_string()]);
    }
}
