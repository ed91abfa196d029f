//! Per-button lifecycle for long-running server tasks.
//!
//! `Idle → Starting → Polling → (Succeeded | Failed)`. A control can be
//! started again from `Idle` or `Failed`; `Succeeded` is final because the
//! page reloads.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{info, warn};

use crate::ControlKey;
use crate::api::{StartFailure, TaskStartAccepted, TerminalStatus};
use crate::poll::{PollOutcome, PollTicket};

pub const STARTING_LABEL: &str = "Starting...";
pub const NETWORK_START_ERROR: &str = "A network error occurred while starting the task.";
pub const STATUS_UNAVAILABLE_ERROR: &str = "Error: Could not retrieve task status.";
pub const POLLING_NOTICE: &str = "Polling for result...";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Task completed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskPhase {
    Idle,
    Starting,
    Polling { task_id: String },
    Succeeded { task_id: String },
    Failed,
}

impl TaskPhase {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Polling { .. } => "polling",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed => "failed",
        }
    }

    fn accepts_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskTransitionError {
    #[error("task control `{key}` cannot {operation} while {phase}")]
    InvalidPhase {
        key: ControlKey,
        operation: &'static str,
        phase: &'static str,
    },
    #[error("no task control registered for `{0}`")]
    UnknownControl(ControlKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonLabel {
    /// Markup captured from the button before the task started.
    Original(String),
    Starting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub disabled: bool,
    pub label: ButtonLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    Info,
    Success,
    Danger,
}

impl BannerTone {
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Info => "mt-3 alert alert-info",
            Self::Success => "mt-3 alert alert-success",
            Self::Danger => "mt-3 alert alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerBody {
    Text(String),
    /// `Task initiated (ID: …)` line, then the polling notice with a spinner.
    Polling { task_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub tone: BannerTone,
    pub body: BannerBody,
}

impl StatusBanner {
    fn text(tone: BannerTone, text: impl Into<String>) -> Self {
        Self {
            tone,
            body: BannerBody::Text(text.into()),
        }
    }
}

#[must_use]
pub fn task_initiated_line(task_id: &str) -> String {
    format!("Task initiated (ID: {task_id}).")
}

#[derive(Debug, Clone)]
pub enum TaskEffect {
    Button(ButtonView),
    Banner(StatusBanner),
    StartPolling(PollTicket),
    ScheduleReload(Duration),
}

#[derive(Debug)]
pub struct TaskControl {
    key: ControlKey,
    phase: TaskPhase,
    original_label: String,
    ticket: Option<PollTicket>,
    reload_delay: Duration,
}

impl TaskControl {
    pub fn new(key: ControlKey, reload_delay: Duration) -> Self {
        Self {
            key,
            phase: TaskPhase::Idle,
            original_label: String::new(),
            ticket: None,
            reload_delay,
        }
    }

    #[must_use]
    pub fn phase(&self) -> &TaskPhase {
        &self.phase
    }

    pub fn begin_start(
        &mut self,
        original_label: &str,
    ) -> Result<Vec<TaskEffect>, TaskTransitionError> {
        if !self.phase.accepts_start() {
            warn!(control = %self.key, phase = self.phase.as_str(), "rejecting task start");
            return Err(self.invalid("start"));
        }
        self.original_label = original_label.to_string();
        self.phase = TaskPhase::Starting;
        Ok(vec![TaskEffect::Button(ButtonView {
            disabled: true,
            label: ButtonLabel::Starting,
        })])
    }

    pub fn on_start_result(
        &mut self,
        result: Result<TaskStartAccepted, StartFailure>,
    ) -> Result<Vec<TaskEffect>, TaskTransitionError> {
        if self.phase != TaskPhase::Starting {
            return Err(self.invalid("accept a start response"));
        }

        match result {
            Ok(accepted) => {
                info!(control = %self.key, task_id = %accepted.task_id, "task started");
                let ticket = PollTicket::new(accepted.task_id.clone());
                self.ticket = Some(ticket.clone());
                self.phase = TaskPhase::Polling {
                    task_id: accepted.task_id.clone(),
                };
                Ok(vec![
                    TaskEffect::Banner(StatusBanner {
                        tone: BannerTone::Info,
                        body: BannerBody::Polling {
                            task_id: accepted.task_id,
                        },
                    }),
                    TaskEffect::StartPolling(ticket),
                ])
            }
            Err(failure) => {
                let text = match failure {
                    StartFailure::Rejected { status, message } => {
                        warn!(control = %self.key, status, %message, "task start rejected");
                        format!("Error: {message}")
                    }
                    StartFailure::Network(reason) => {
                        warn!(control = %self.key, %reason, "task start failed");
                        NETWORK_START_ERROR.to_string()
                    }
                };
                Ok(self.fail(text))
            }
        }
    }

    pub fn on_poll_outcome(
        &mut self,
        outcome: PollOutcome,
    ) -> Result<Vec<TaskEffect>, TaskTransitionError> {
        let TaskPhase::Polling { task_id } = &self.phase else {
            return Err(self.invalid("accept a poll outcome"));
        };
        let task_id = task_id.clone();
        if let Some(ticket) = self.ticket.take() {
            ticket.cancel();
        }

        match outcome {
            PollOutcome::Terminal(TerminalStatus::Succeeded { message }) => {
                info!(control = %self.key, %task_id, "task succeeded; scheduling reload");
                self.phase = TaskPhase::Succeeded { task_id };
                let message = message.unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
                Ok(vec![
                    TaskEffect::Banner(StatusBanner::text(
                        BannerTone::Success,
                        format!("Success: {message} The page will now reload."),
                    )),
                    TaskEffect::ScheduleReload(self.reload_delay),
                ])
            }
            PollOutcome::Terminal(TerminalStatus::Failed { detail }) => {
                info!(control = %self.key, %task_id, %detail, "task failed");
                Ok(self.fail(format!("Task Failed: {detail}")))
            }
            PollOutcome::StatusUnavailable(_) => Ok(self.fail(STATUS_UNAVAILABLE_ERROR)),
            PollOutcome::Cancelled => {
                self.phase = TaskPhase::Idle;
                Ok(vec![TaskEffect::Button(self.restored_button())])
            }
        }
    }

    /// Stops polling without a terminal status.
    pub fn cancel(&mut self) -> bool {
        self.ticket.as_ref().is_some_and(PollTicket::cancel)
    }

    fn fail(&mut self, text: impl Into<String>) -> Vec<TaskEffect> {
        self.phase = TaskPhase::Failed;
        vec![
            TaskEffect::Banner(StatusBanner::text(BannerTone::Danger, text)),
            TaskEffect::Button(self.restored_button()),
        ]
    }

    fn restored_button(&self) -> ButtonView {
        ButtonView {
            disabled: false,
            label: ButtonLabel::Original(self.original_label.clone()),
        }
    }

    fn invalid(&self, operation: &'static str) -> TaskTransitionError {
        TaskTransitionError::InvalidPhase {
            key: self.key.clone(),
            operation,
            phase: self.phase.as_str(),
        }
    }
}

/// Task controls keyed by button.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    controls: BTreeMap<ControlKey, TaskControl>,
}

impl TaskRegistry {
    pub fn register(&mut self, key: ControlKey, reload_delay: Duration) {
        self.controls
            .entry(key.clone())
            .or_insert_with(|| TaskControl::new(key, reload_delay));
    }

    #[must_use]
    pub fn phase(&self, key: &ControlKey) -> Option<&TaskPhase> {
        self.controls.get(key).map(TaskControl::phase)
    }

    pub fn phases(&self) -> impl Iterator<Item = (&ControlKey, &TaskPhase)> {
        self.controls
            .iter()
            .map(|(key, control)| (key, control.phase()))
    }

    /// Stops every running poll, e.g. when the page is being hidden.
    pub fn cancel_all(&mut self) -> usize {
        self.controls
            .values_mut()
            .map(TaskControl::cancel)
            .filter(|cancelled| *cancelled)
            .count()
    }

    pub fn begin_start(
        &mut self,
        key: &ControlKey,
        original_label: &str,
    ) -> Result<Vec<TaskEffect>, TaskTransitionError> {
        self.control(key)?.begin_start(original_label)
    }

    pub fn on_start_result(
        &mut self,
        key: &ControlKey,
        result: Result<TaskStartAccepted, StartFailure>,
    ) -> Result<Vec<TaskEffect>, TaskTransitionError> {
        self.control(key)?.on_start_result(result)
    }

    pub fn on_poll_outcome(
        &mut self,
        key: &ControlKey,
        outcome: PollOutcome,
    ) -> Result<Vec<TaskEffect>, TaskTransitionError> {
        self.control(key)?.on_poll_outcome(outcome)
    }

    fn control(&mut self, key: &ControlKey) -> Result<&mut TaskControl, TaskTransitionError> {
        self.controls
            .get_mut(key)
            .ok_or_else(|| TaskTransitionError::UnknownControl(key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    fn key() -> ControlKey {
        ControlKey::from("match-btn")
    }

    fn accepted(task_id: &str) -> TaskStartAccepted {
        TaskStartAccepted {
            task_id: task_id.to_string(),
            message: None,
        }
    }

    fn started_registry() -> (TaskRegistry, PollTicket) {
        let mut registry = TaskRegistry::default();
        registry.register(key(), Duration::from_secs(2));
        let _ = registry.begin_start(&key(), "Run Matching").expect("start");
        let effects = registry
            .on_start_result(&key(), Ok(accepted("t-9")))
            .expect("accepted");
        let ticket = effects
            .iter()
            .find_map(|effect| match effect {
                TaskEffect::StartPolling(ticket) => Some(ticket.clone()),
                _ => None,
            })
            .expect("poll ticket");
        (registry, ticket)
    }

    fn banner(effects: &[TaskEffect]) -> Option<&StatusBanner> {
        effects.iter().find_map(|effect| match effect {
            TaskEffect::Banner(banner) => Some(banner),
            _ => None,
        })
    }

    fn button(effects: &[TaskEffect]) -> Option<&ButtonView> {
        effects.iter().find_map(|effect| match effect {
            TaskEffect::Button(button) => Some(button),
            _ => None,
        })
    }

    #[test]
    fn start_disables_button_with_loading_label() {
        let mut control = TaskControl::new(key(), Duration::from_secs(2));
        let effects = control.begin_start("Run Matching").expect("start");
        assert_eq!(
            button(&effects),
            Some(&ButtonView {
                disabled: true,
                label: ButtonLabel::Starting
            })
        );
        assert_eq!(control.phase(), &TaskPhase::Starting);
    }

    #[test]
    fn second_start_is_rejected_while_starting_or_polling() {
        let mut control = TaskControl::new(key(), Duration::from_secs(2));
        let _ = control.begin_start("Run").expect("start");
        assert!(matches!(
            control.begin_start("Run"),
            Err(TaskTransitionError::InvalidPhase { phase: "starting", .. })
        ));

        let (mut registry, _ticket) = started_registry();
        assert!(matches!(
            registry.begin_start(&key(), "Run Matching"),
            Err(TaskTransitionError::InvalidPhase { phase: "polling", .. })
        ));
    }

    #[test]
    fn accepted_start_enters_polling_with_info_banner() {
        let (registry, ticket) = started_registry();
        assert_eq!(ticket.task_id, "t-9");
        assert!(!ticket.is_cancelled());
        assert_eq!(
            registry.phase(&key()),
            Some(&TaskPhase::Polling {
                task_id: "t-9".to_string()
            })
        );
        assert_eq!(task_initiated_line("t-9"), "Task initiated (ID: t-9).");
    }

    #[test]
    fn rejected_start_restores_button_and_shows_detail() {
        let mut control = TaskControl::new(key(), Duration::from_secs(2));
        let _ = control.begin_start("<b>Run</b>").expect("start");
        let effects = control
            .on_start_result(Err(StartFailure::Rejected {
                status: 400,
                message: "A 'semester' parameter is required.".to_string(),
            }))
            .expect("failure handled");
        assert_eq!(
            banner(&effects),
            Some(&StatusBanner::text(
                BannerTone::Danger,
                "Error: A 'semester' parameter is required."
            ))
        );
        assert_eq!(
            button(&effects),
            Some(&ButtonView {
                disabled: false,
                label: ButtonLabel::Original("<b>Run</b>".to_string())
            })
        );
        assert_eq!(control.phase(), &TaskPhase::Failed);
        assert!(control.begin_start("<b>Run</b>").is_ok());
    }

    #[test]
    fn network_start_failure_uses_generic_message() {
        let mut control = TaskControl::new(key(), Duration::from_secs(2));
        let _ = control.begin_start("Run").expect("start");
        let effects = control
            .on_start_result(Err(StartFailure::Network("Failed to fetch".to_string())))
            .expect("failure handled");
        assert_eq!(
            banner(&effects),
            Some(&StatusBanner::text(BannerTone::Danger, NETWORK_START_ERROR))
        );
    }

    #[test]
    fn success_schedules_single_reload_and_keeps_button_disabled() {
        let (mut registry, ticket) = started_registry();
        let effects = registry
            .on_poll_outcome(
                &key(),
                PollOutcome::Terminal(TerminalStatus::Succeeded {
                    message: Some("Matched 40 students.".to_string()),
                }),
            )
            .expect("success handled");

        let reloads = effects
            .iter()
            .filter(|effect| matches!(effect, TaskEffect::ScheduleReload(_)))
            .count();
        assert_eq!(reloads, 1);
        assert!(button(&effects).is_none());
        assert!(ticket.is_cancelled());
        assert_eq!(
            banner(&effects),
            Some(&StatusBanner::text(
                BannerTone::Success,
                "Success: Matched 40 students. The page will now reload."
            ))
        );
        assert!(registry.begin_start(&key(), "Run Matching").is_err());
    }

    #[test]
    fn success_without_message_uses_default_text() {
        let (mut registry, _ticket) = started_registry();
        let effects = registry
            .on_poll_outcome(
                &key(),
                PollOutcome::Terminal(TerminalStatus::Succeeded { message: None }),
            )
            .expect("success handled");
        assert_eq!(
            banner(&effects),
            Some(&StatusBanner::text(
                BannerTone::Success,
                "Success: Task completed. The page will now reload."
            ))
        );
    }

    #[test]
    fn failure_reenables_button_with_original_label() {
        let (mut registry, _ticket) = started_registry();
        let effects = registry
            .on_poll_outcome(
                &key(),
                PollOutcome::Terminal(TerminalStatus::Failed {
                    detail: "X".to_string(),
                }),
            )
            .expect("failure handled");
        assert_eq!(
            banner(&effects),
            Some(&StatusBanner::text(BannerTone::Danger, "Task Failed: X"))
        );
        assert_eq!(
            button(&effects),
            Some(&ButtonView {
                disabled: false,
                label: ButtonLabel::Original("Run Matching".to_string())
            })
        );
        assert_eq!(registry.phase(&key()), Some(&TaskPhase::Failed));
    }

    #[test]
    fn poll_transport_error_reenables_button() {
        let (mut registry, _ticket) = started_registry();
        let effects = registry
            .on_poll_outcome(
                &key(),
                PollOutcome::StatusUnavailable(ClientError::transport("Failed to fetch")),
            )
            .expect("error handled");
        assert_eq!(
            banner(&effects),
            Some(&StatusBanner::text(
                BannerTone::Danger,
                STATUS_UNAVAILABLE_ERROR
            ))
        );
        assert!(button(&effects).is_some_and(|button| !button.disabled));
    }

    #[test]
    fn second_terminal_outcome_is_rejected() {
        let (mut registry, _ticket) = started_registry();
        let _ = registry
            .on_poll_outcome(
                &key(),
                PollOutcome::Terminal(TerminalStatus::Failed {
                    detail: "boom".to_string(),
                }),
            )
            .expect("first outcome");
        assert!(
            registry
                .on_poll_outcome(&key(), PollOutcome::Cancelled)
                .is_err()
        );
    }

    #[test]
    fn cancel_all_stops_running_polls_once() {
        let (mut registry, ticket) = started_registry();
        registry.register(ControlKey::from("reset-btn"), Duration::from_secs(2));
        assert_eq!(registry.cancel_all(), 1);
        assert!(ticket.is_cancelled());
        assert_eq!(registry.cancel_all(), 0);

        let phases: Vec<_> = registry
            .phases()
            .map(|(key, phase)| (key.as_str(), phase.as_str()))
            .collect();
        assert_eq!(phases, [("match-btn", "polling"), ("reset-btn", "idle")]);
    }

    #[test]
    fn unknown_control_is_reported() {
        let mut registry = TaskRegistry::default();
        assert_eq!(
            registry.begin_start(&ControlKey::from("nope"), "x").err(),
            Some(TaskTransitionError::UnknownControl(ControlKey::from(
                "nope"
            )))
        );
    }
}
