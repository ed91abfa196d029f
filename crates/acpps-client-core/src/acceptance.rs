//! Per-row acceptance toggle bookkeeping.

use std::collections::BTreeSet;

use tracing::debug;

use crate::ControlKey;
use crate::api::ToggleResponse;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceIndicator {
    Accepting,
    NotAccepting,
}

impl AcceptanceIndicator {
    #[must_use]
    pub fn from_state(accepting: bool) -> Self {
        if accepting {
            Self::Accepting
        } else {
            Self::NotAccepting
        }
    }

    #[must_use]
    pub fn container_class(self) -> &'static str {
        match self {
            Self::Accepting => "text-success",
            Self::NotAccepting => "text-danger",
        }
    }

    #[must_use]
    pub fn icon_class(self) -> &'static str {
        match self {
            Self::Accepting => "bi bi-check-circle-fill",
            Self::NotAccepting => "bi bi-x-circle-fill",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Indicator(AcceptanceIndicator),
    Alert(String),
}

/// Tracks which rows have a toggle request in flight.
#[derive(Debug, Default)]
pub struct AcceptanceToggles {
    in_flight: BTreeSet<ControlKey>,
}

impl AcceptanceToggles {
    /// Returns `false` when the row already has a request in flight.
    pub fn begin(&mut self, key: &ControlKey) -> bool {
        let started = self.in_flight.insert(key.clone());
        if !started {
            debug!(row = %key, "toggle already in flight; ignoring activation");
        }
        started
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &ControlKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn finish(
        &mut self,
        key: &ControlKey,
        result: Result<ToggleResponse, ClientError>,
    ) -> ToggleOutcome {
        self.in_flight.remove(key);
        match result {
            Ok(ToggleResponse::Success { new_state }) => {
                debug!(row = %key, new_state, "acceptance toggled");
                ToggleOutcome::Indicator(AcceptanceIndicator::from_state(new_state))
            }
            Ok(ToggleResponse::Error { message }) => ToggleOutcome::Alert(format!(
                "Error: {}",
                message.unwrap_or_else(|| "unknown error".to_string())
            )),
            Err(error) => ToggleOutcome::Alert(format!("Error: {error}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> ControlKey {
        ControlKey::from(id)
    }

    #[test]
    fn success_true_shows_accepting_indicator() {
        let mut toggles = AcceptanceToggles::default();
        assert!(toggles.begin(&row("7")));
        let outcome = toggles.finish(&row("7"), Ok(ToggleResponse::Success { new_state: true }));
        assert_eq!(
            outcome,
            ToggleOutcome::Indicator(AcceptanceIndicator::Accepting)
        );
        assert_eq!(AcceptanceIndicator::Accepting.container_class(), "text-success");
    }

    #[test]
    fn success_false_shows_not_accepting_indicator() {
        let mut toggles = AcceptanceToggles::default();
        assert!(toggles.begin(&row("7")));
        let outcome = toggles.finish(&row("7"), Ok(ToggleResponse::Success { new_state: false }));
        assert_eq!(
            outcome,
            ToggleOutcome::Indicator(AcceptanceIndicator::NotAccepting)
        );
        assert_eq!(
            AcceptanceIndicator::NotAccepting.icon_class(),
            "bi bi-x-circle-fill"
        );
    }

    #[test]
    fn repeat_activation_while_in_flight_is_ignored() {
        let mut toggles = AcceptanceToggles::default();
        assert!(toggles.begin(&row("7")));
        assert!(!toggles.begin(&row("7")));
        assert!(toggles.begin(&row("8")));

        let _ = toggles.finish(&row("7"), Err(ClientError::transport("Failed to fetch")));
        assert!(!toggles.is_in_flight(&row("7")));
        assert!(toggles.begin(&row("7")));
    }

    #[test]
    fn server_and_transport_errors_become_alerts() {
        let mut toggles = AcceptanceToggles::default();
        assert!(toggles.begin(&row("1")));
        let outcome = toggles.finish(
            &row("1"),
            Ok(ToggleResponse::Error {
                message: Some("Supervisor not found.".to_string()),
            }),
        );
        assert_eq!(
            outcome,
            ToggleOutcome::Alert("Error: Supervisor not found.".to_string())
        );

        assert!(toggles.begin(&row("1")));
        let outcome = toggles.finish(&row("1"), Err(ClientError::transport("Failed to fetch")));
        assert_eq!(
            outcome,
            ToggleOutcome::Alert("Error: network error: Failed to fetch".to_string())
        );
    }
}
