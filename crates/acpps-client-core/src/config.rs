//! Page settings read from `<body>` data attributes.

use std::time::Duration;

use tracing::warn;

use crate::url_template::{TemplateError, UrlTemplate};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_TASK_STATUS_URL: &str = "/api/coordinator/task-status/{task_id}/";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const TASK_ID_PLACEHOLDER: &str = "task_id";
pub const ROW_ID_PLACEHOLDER: &str = "id";

pub const ATTR_LOG_LEVEL: &str = "data-log-level";
pub const ATTR_POLL_INTERVAL_MS: &str = "data-poll-interval-ms";
pub const ATTR_RELOAD_DELAY_MS: &str = "data-reload-delay-ms";

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Browser timers take a signed 32-bit millisecond delay.
const MAX_TIMER_DELAY: Duration = Duration::from_millis(0x7FFF_FFFF);

/// Page-wide settings read from `<body>` data attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub poll_interval: Duration,
    pub reload_delay: Duration,
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            reload_delay: DEFAULT_RELOAD_DELAY,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_attributes(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let poll_interval = duration_attribute(&lookup, ATTR_POLL_INTERVAL_MS)
            .map(|interval| interval.max(MIN_POLL_INTERVAL))
            .unwrap_or(defaults.poll_interval);
        let reload_delay =
            duration_attribute(&lookup, ATTR_RELOAD_DELAY_MS).unwrap_or(defaults.reload_delay);
        let log_level = lookup(ATTR_LOG_LEVEL)
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or(defaults.log_level);

        Self {
            poll_interval,
            reload_delay,
            log_level,
        }
    }
}

/// Status endpoint for a task button, honouring a per-button override.
pub fn task_status_template(override_attr: Option<&str>) -> Result<UrlTemplate, TemplateError> {
    match override_attr.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => UrlTemplate::from_attribute(raw, TASK_ID_PLACEHOLDER),
        None => UrlTemplate::parse(DEFAULT_TASK_STATUS_URL),
    }
}

fn duration_attribute(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<Duration> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(millis) => Some(Duration::from_millis(millis).min(MAX_TIMER_DELAY)),
        Err(error) => {
            warn!(attribute = name, value = %raw, %error, "ignoring invalid duration attribute");
            None
        }
    }
}
