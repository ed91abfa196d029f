use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

pub const SEMESTER_REQUIRED_MESSAGE: &str = "Please select a semester.";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A task start POST, ready to send.
///
/// Every start declares a JSON content type, including the ones that send
/// no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub content_type: &'static str,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Standardize,
    Label,
    Match,
    Reset,
}

impl TaskKind {
    pub const ALL: [Self; 4] = [Self::Standardize, Self::Label, Self::Match, Self::Reset];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standardize => "standardize",
            Self::Label => "label",
            Self::Match => "match",
            Self::Reset => "reset",
        }
    }

    #[must_use]
    pub fn button_id(self) -> &'static str {
        match self {
            Self::Standardize => "standardize-btn",
            Self::Label => "label-btn",
            Self::Match => "match-btn",
            Self::Reset => "reset-btn",
        }
    }

    #[must_use]
    pub fn status_id(self) -> &'static str {
        match self {
            Self::Standardize => "standardize-status-message",
            Self::Label => "label-status-message",
            Self::Match | Self::Reset => "status-message",
        }
    }

    #[must_use]
    pub fn requires_semester(self) -> bool {
        !matches!(self, Self::Standardize)
    }

    pub fn start_request(self, form: &TaskForm) -> Result<StartRequest, ClientError> {
        let body = self
            .start_body(form)?
            .map(|body| body.to_string());
        Ok(StartRequest {
            content_type: JSON_CONTENT_TYPE,
            body,
        })
    }

    /// Builds the JSON body for a start request from the page's form fields.
    pub fn start_body(self, form: &TaskForm) -> Result<Option<Value>, ClientError> {
        if !self.requires_semester() {
            return Ok(None);
        }
        let Some(semester) = form.semester.as_deref().filter(|value| !value.is_empty()) else {
            return Err(ClientError::validation(SEMESTER_REQUIRED_MESSAGE));
        };

        let body = match self {
            Self::Match => serde_json::to_value(MatchBody {
                semester,
                weightage: form.weightage.as_deref().unwrap_or_default(),
            }),
            Self::Standardize | Self::Label | Self::Reset => {
                serde_json::to_value(SemesterBody { semester })
            }
        };
        body.map(Some)
            .map_err(|error| ClientError::validation(format!("failed to encode body: {error}")))
    }
}

/// Values read from `#semester-input` and `#weightage-input`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub semester: Option<String>,
    pub weightage: Option<String>,
}

#[derive(Serialize)]
struct SemesterBody<'a> {
    semester: &'a str,
}

#[derive(Serialize)]
struct MatchBody<'a> {
    semester: &'a str,
    weightage: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(semester: Option<&str>, weightage: Option<&str>) -> TaskForm {
        TaskForm {
            semester: semester.map(ToString::to_string),
            weightage: weightage.map(ToString::to_string),
        }
    }

    #[test]
    fn standardize_needs_no_body_or_semester() {
        let body = TaskKind::Standardize
            .start_body(&form(None, None))
            .expect("no validation");
        assert_eq!(body, None);
    }

    #[test]
    fn semester_tasks_reject_missing_selection() {
        for kind in [TaskKind::Label, TaskKind::Match, TaskKind::Reset] {
            let error = kind
                .start_body(&form(Some(""), Some("0.5")))
                .expect_err("semester required");
            assert_eq!(error, ClientError::validation("Please select a semester."));
        }
    }

    #[test]
    fn match_body_carries_weightage() {
        let body = TaskKind::Match
            .start_body(&form(Some("4"), Some("0.7")))
            .expect("body");
        assert_eq!(body, Some(json!({ "semester": "4", "weightage": "0.7" })));

        let body = TaskKind::Reset
            .start_body(&form(Some("4"), Some("0.7")))
            .expect("body");
        assert_eq!(body, Some(json!({ "semester": "4" })));
    }

    #[test]
    fn bodyless_start_still_declares_json() {
        let request = TaskKind::Standardize
            .start_request(&form(None, None))
            .expect("request");
        assert_eq!(
            request,
            StartRequest {
                content_type: "application/json",
                body: None,
            }
        );

        let request = TaskKind::Label
            .start_request(&form(Some("4"), None))
            .expect("request");
        assert_eq!(request.content_type, "application/json");
        let body: Value =
            serde_json::from_str(request.body.as_deref().expect("body")).expect("json body");
        assert_eq!(body, json!({ "semester": "4" }));
    }

    #[test]
    fn match_and_reset_share_the_status_area() {
        assert_eq!(TaskKind::Match.status_id(), TaskKind::Reset.status_id());
        assert_ne!(TaskKind::Label.status_id(), TaskKind::Standardize.status_id());
        let ids: Vec<_> = TaskKind::ALL.iter().map(|kind| kind.button_id()).collect();
        assert_eq!(ids, ["standardize-btn", "label-btn", "match-btn", "reset-btn"]);
    }
}
