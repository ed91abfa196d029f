use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellModule {
    SupervisorTable,
    TaskLauncher,
    SemesterFilter,
    ProfileRedirect,
}

/// Which anchor elements the current page carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePresence {
    pub supervisor_table: bool,
    pub task_buttons: usize,
    pub semester_input: bool,
    pub profile_update_button: bool,
}

const DOCUMENT_LOADING: &str = "loading";

/// Whether a document in `ready_state` has a parsed `<body>` to read from.
pub fn boot_can_run(ready_state: &str) -> bool {
    ready_state != DOCUMENT_LOADING
}

/// Modules to install, in install order.
///
/// The task page reuses `#semester-input` as a form field, so the filter
/// only binds where no task button is present.
pub fn plan_modules(presence: &PagePresence) -> Vec<ShellModule> {
    let mut modules = Vec::new();
    if presence.supervisor_table {
        modules.push(ShellModule::SupervisorTable);
    }
    if presence.task_buttons > 0 {
        modules.push(ShellModule::TaskLauncher);
    } else if presence.semester_input {
        modules.push(ShellModule::SemesterFilter);
    }
    if presence.profile_update_button {
        modules.push(ShellModule::ProfileRedirect);
    }
    modules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_waits_while_document_is_parsing() {
        assert!(!boot_can_run("loading"));
        assert!(boot_can_run("interactive"));
        assert!(boot_can_run("complete"));
    }

    #[test]
    fn empty_page_installs_nothing() {
        assert!(plan_modules(&PagePresence::default()).is_empty());
    }

    #[test]
    fn preference_list_page_gets_semester_filter() {
        let modules = plan_modules(&PagePresence {
            semester_input: true,
            ..PagePresence::default()
        });
        assert_eq!(modules, vec![ShellModule::SemesterFilter]);
    }

    #[test]
    fn coordinator_page_semester_input_does_not_redirect() {
        let modules = plan_modules(&PagePresence {
            task_buttons: 2,
            semester_input: true,
            ..PagePresence::default()
        });
        assert_eq!(modules, vec![ShellModule::TaskLauncher]);
    }

    #[test]
    fn independent_modules_combine() {
        let modules = plan_modules(&PagePresence {
            supervisor_table: true,
            task_buttons: 1,
            semester_input: false,
            profile_update_button: true,
        });
        assert_eq!(
            modules,
            vec![
                ShellModule::SupervisorTable,
                ShellModule::TaskLauncher,
                ShellModule::ProfileRedirect
            ]
        );
    }

    #[test]
    fn modules_serialize_as_snake_case() {
        let json = serde_json::to_string(&ShellModule::ProfileRedirect).expect("serialize");
        assert_eq!(json, "\"profile_redirect\"");
    }
}
