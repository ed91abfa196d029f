//! Cancellable task-status polling.
//!
//! Each started task owns one [`CancellationToken`]. The loop races every
//! tick against the token and cancels it itself on the first terminal status
//! or transport error, so exactly one [`PollOutcome`] is produced.

use async_trait::async_trait;
use futures_util::{FutureExt, pin_mut, select};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{TaskStatusResponse, TerminalStatus};
use crate::error::ClientError;

#[async_trait(?Send)]
pub trait TaskStatusSource {
    async fn fetch_status(&self, task_id: &str) -> Result<TaskStatusResponse, ClientError>;
}

/// Waits one poll period.
#[async_trait(?Send)]
pub trait PollTicker {
    async fn tick(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Terminal(TerminalStatus),
    StatusUnavailable(ClientError),
    /// Cancelled from outside before any terminal status was seen.
    Cancelled,
}

/// Handle for one task's polling lifetime.
#[derive(Debug, Clone)]
pub struct PollTicket {
    pub task_id: String,
    token: CancellationToken,
}

impl PollTicket {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            token: CancellationToken::new(),
        }
    }

    /// Returns `true` only for the call that actually cancelled.
    pub fn cancel(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.token.cancel();
        true
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

pub async fn run_poll_loop<S, T>(source: &S, ticker: &mut T, ticket: &PollTicket) -> PollOutcome
where
    S: TaskStatusSource + ?Sized,
    T: PollTicker + ?Sized,
{
    let mut polls: u64 = 0;
    loop {
        {
            let cancelled = ticket.token.cancelled().fuse();
            let tick = ticker.tick().fuse();
            pin_mut!(cancelled, tick);
            select! {
                () = cancelled => return PollOutcome::Cancelled,
                () = tick => {}
            }
        }
        if ticket.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        polls = polls.saturating_add(1);
        let response = source.fetch_status(&ticket.task_id).await;
        if ticket.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        match response {
            Ok(response) => {
                if let Some(terminal) = response.terminal() {
                    ticket.cancel();
                    debug!(task_id = %ticket.task_id, polls, ?terminal, "task reached terminal status");
                    return PollOutcome::Terminal(terminal);
                }
                debug!(task_id = %ticket.task_id, polls, status = ?response.status, "task still running");
            }
            Err(error) => {
                ticket.cancel();
                warn!(task_id = %ticket.task_id, polls, %error, "task status poll failed");
                return PollOutcome::StatusUnavailable(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_cancel_is_idempotent() {
        let ticket = PollTicket::new("t-1");
        let clone = ticket.clone();
        assert!(ticket.cancel());
        assert!(!ticket.cancel());
        assert!(!clone.cancel());
        assert!(clone.is_cancelled());
    }
}
