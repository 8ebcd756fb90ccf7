//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Extraction identifiers
pub const FIELD_DEVICE: &str = "device";
pub const FIELD_KEY: &str = "key";
pub const FIELD_RULE_INDEX: &str = "rule_index";
pub const FIELD_SERVICE: &str = "service";

// Collection sizes
pub const FIELD_DEVICE_COUNT: &str = "device_count";
pub const FIELD_KEY_COUNT: &str = "key_count";
pub const FIELD_RULE_COUNT: &str = "rule_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
