//! Inline capacity editor: a span that turns into an input on click.

use std::collections::BTreeMap;

use tracing::debug;

use crate::ControlKey;
use crate::api::CapacityResponse;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityPhase {
    Display,
    Editing,
    Saving { submitted: String },
}

/// What the DOM should look like after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityView {
    pub editing: bool,
    pub display_text: String,
    /// Overwrite the input's value when set.
    pub input_value: Option<String>,
    pub focus_input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitDecision {
    /// Not editing (e.g. the blur that follows Escape); leave the DOM alone.
    Ignored,
    Unchanged(CapacityView),
    Submit { capacity: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacitySettled {
    pub view: CapacityView,
    pub alert: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CapacityEditor {
    displayed: String,
    phase: CapacityPhase,
}

impl CapacityEditor {
    pub fn new(displayed: impl Into<String>) -> Self {
        Self {
            displayed: displayed.into(),
            phase: CapacityPhase::Display,
        }
    }

    #[must_use]
    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    #[must_use]
    pub fn phase(&self) -> &CapacityPhase {
        &self.phase
    }

    pub fn open(&mut self) -> Option<CapacityView> {
        if self.phase != CapacityPhase::Display {
            return None;
        }
        self.phase = CapacityPhase::Editing;
        Some(CapacityView {
            editing: true,
            display_text: self.displayed.clone(),
            input_value: None,
            focus_input: true,
        })
    }

    /// Blur or Enter.
    pub fn commit(&mut self, input_value: &str) -> CommitDecision {
        if self.phase != CapacityPhase::Editing {
            return CommitDecision::Ignored;
        }
        if input_value == self.displayed {
            self.phase = CapacityPhase::Display;
            return CommitDecision::Unchanged(self.display_view(None));
        }
        self.phase = CapacityPhase::Saving {
            submitted: input_value.to_string(),
        };
        CommitDecision::Submit {
            capacity: input_value.to_string(),
        }
    }

    pub fn escape(&mut self) -> Option<CapacityView> {
        if self.phase != CapacityPhase::Editing {
            return None;
        }
        self.phase = CapacityPhase::Display;
        Some(self.display_view(Some(self.displayed.clone())))
    }

    pub fn settle(&mut self, result: Result<CapacityResponse, ClientError>) -> CapacitySettled {
        let submitted = match std::mem::replace(&mut self.phase, CapacityPhase::Display) {
            CapacityPhase::Saving { submitted } => Some(submitted),
            CapacityPhase::Display | CapacityPhase::Editing => None,
        };

        match result {
            Ok(response) => {
                if let Some(confirmed) = response.confirmed_capacity() {
                    debug!(?submitted, %confirmed, "capacity saved");
                    self.displayed = confirmed;
                }
                CapacitySettled {
                    view: self.display_view(None),
                    alert: None,
                }
            }
            Err(error) => CapacitySettled {
                alert: Some(format!("Update Failed: {error}")),
                view: self.display_view(Some(self.displayed.clone())),
            },
        }
    }

    fn display_view(&self, input_value: Option<String>) -> CapacityView {
        CapacityView {
            editing: false,
            display_text: self.displayed.clone(),
            input_value,
            focus_input: false,
        }
    }
}

/// Capacity editors keyed by supervisor row.
#[derive(Debug, Default)]
pub struct CapacityEditors {
    editors: BTreeMap<ControlKey, CapacityEditor>,
}

impl CapacityEditors {
    pub fn register(&mut self, key: ControlKey, displayed: impl Into<String>) {
        self.editors
            .entry(key)
            .or_insert_with(|| CapacityEditor::new(displayed));
    }

    pub fn get_mut(&mut self, key: &ControlKey) -> Option<&mut CapacityEditor> {
        self.editors.get_mut(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.editors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(capacity: &str) -> CapacityResponse {
        serde_json::from_value(serde_json::json!({
            "status": "success",
            "new_capacity": capacity,
        }))
        .expect("capacity response")
    }

    #[test]
    fn click_opens_editor_with_focus() {
        let mut editor = CapacityEditor::new("5");
        let view = editor.open().expect("opens");
        assert!(view.editing);
        assert!(view.focus_input);
        assert_eq!(editor.phase(), &CapacityPhase::Editing);
        assert!(editor.open().is_none());
    }

    #[test]
    fn unchanged_blur_issues_no_request() {
        let mut editor = CapacityEditor::new("5");
        let _ = editor.open();
        let decision = editor.commit("5");
        assert!(matches!(decision, CommitDecision::Unchanged(ref view) if !view.editing));
        assert_eq!(editor.phase(), &CapacityPhase::Display);
    }

    #[test]
    fn escape_reverts_and_swallows_following_blur() {
        let mut editor = CapacityEditor::new("5");
        let _ = editor.open();
        let view = editor.escape().expect("escape while editing");
        assert_eq!(view.input_value.as_deref(), Some("5"));
        assert!(!view.editing);

        // Hiding the input fires blur with whatever was typed.
        assert_eq!(editor.commit("12"), CommitDecision::Ignored);
        assert_eq!(editor.displayed(), "5");
    }

    #[test]
    fn changed_value_submits_then_applies_confirmed_capacity() {
        let mut editor = CapacityEditor::new("5");
        let _ = editor.open();
        assert_eq!(
            editor.commit("8"),
            CommitDecision::Submit {
                capacity: "8".to_string()
            }
        );
        // Enter followed by blur must not double submit.
        assert_eq!(editor.commit("8"), CommitDecision::Ignored);

        let settled = editor.settle(Ok(success("8")));
        assert_eq!(settled.alert, None);
        assert_eq!(settled.view.display_text, "8");
        assert!(!settled.view.editing);
        assert_eq!(editor.displayed(), "8");
    }

    #[test]
    fn rejected_update_alerts_and_reverts_input() {
        let mut editor = CapacityEditor::new("5");
        let _ = editor.open();
        let _ = editor.commit("1");
        let settled = editor.settle(Err(ClientError::Server {
            status: 400,
            message: "too low".to_string(),
        }));
        assert_eq!(settled.alert.as_deref(), Some("Update Failed: too low"));
        assert_eq!(settled.view.input_value.as_deref(), Some("5"));
        assert_eq!(settled.view.display_text, "5");
        assert_eq!(editor.phase(), &CapacityPhase::Display);
    }

    #[test]
    fn non_success_status_keeps_displayed_value() {
        let mut editor = CapacityEditor::new("5");
        let _ = editor.open();
        let _ = editor.commit("6");
        let response: CapacityResponse =
            serde_json::from_value(serde_json::json!({ "status": "noop" })).expect("response");
        let settled = editor.settle(Ok(response));
        assert_eq!(settled.view.display_text, "5");
        assert_eq!(settled.alert, None);
    }

    #[test]
    fn registry_keeps_first_registration() {
        let mut editors = CapacityEditors::default();
        editors.register(ControlKey::from("3"), "4");
        editors.register(ControlKey::from("3"), "9");
        assert_eq!(editors.len(), 1);
        let editor = editors.get_mut(&ControlKey::from("3")).expect("editor");
        assert_eq!(editor.displayed(), "4");
    }
}
