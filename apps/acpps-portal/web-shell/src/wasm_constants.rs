pub(crate) const SUPERVISOR_TABLE_BODY_ID: &str = "supervisor-table-body";
pub(crate) const TOGGLE_ACCEPTANCE_SELECTOR: &str = ".toggle-acceptance";
pub(crate) const CAPACITY_CELL_SELECTOR: &str = ".capacity-cell";
pub(crate) const CAPACITY_DISPLAY_SELECTOR: &str = ".capacity-display";
pub(crate) const CAPACITY_INPUT_SELECTOR: &str = ".capacity-input";
pub(crate) const SEMESTER_INPUT_ID: &str = "semester-input";
pub(crate) const WEIGHTAGE_INPUT_ID: &str = "weightage-input";
pub(crate) const PROFILE_UPDATE_BUTTON_ID: &str = "update-btn";

pub(crate) const ATTR_TOGGLE_URL: &str = "data-toggle-url";
pub(crate) const ATTR_CAPACITY_URL: &str = "data-capacity-url";
pub(crate) const ATTR_SUPERVISOR_ID: &str = "data-supervisor-id";
pub(crate) const ATTR_URL: &str = "data-url";
pub(crate) const ATTR_STATUS_URL: &str = "data-status-url";

pub(crate) const SPINNER_CLASS: &str = "spinner-border spinner-border-sm";
pub(crate) const DISPLAY_INLINE_BLOCK: &str = "inline-block";
pub(crate) const DISPLAY_NONE: &str = "none";
