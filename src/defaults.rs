pub const DEFAULT_PORT: u16 = 3001;

pub const DEFAULT_LEADS_RANGE: &str = "Form Responses 1!A:J";
pub const DEFAULT_FOLLOWUPS_RANGE: &str = "Follow Ups!A:J";

pub const DEFAULT_CALENDAR_ID: &str = "primary";
pub const DEFAULT_CALENDAR_MAX_RESULTS: u32 = 10;

pub const DEFAULT_CALL_LIMIT: u32 = 50;
/// Calls scanned when building the patient list
pub const PATIENT_CALL_LIMIT: u32 = 100;
/// Calls scanned for the dashboard cards
pub const DASHBOARD_CALL_LIMIT: u32 = 10;
/// Rows shown in each "recent" dashboard card
pub const DASHBOARD_RECENT_ITEMS: usize = 3;

/// Request timeout for every upstream HTTP call
pub const UPSTREAM_TIMEOUT_SECS: u64 = 20;

pub const DEFAULT_META_API_VERSION: &str = "v19.0";

pub const DEFAULT_INBOX_POLL_SECS: u64 = 4;
/// Messages kept in the in-memory log before the oldest are dropped
pub const MESSAGE_LOG_CAPACITY: usize = 1000;

/// Transcript preview length in the call table
pub const TRANSCRIPT_PREVIEW_CHARS: usize = 200;

/// Day view hour rows, 8 AM through 8 PM
pub const DAY_VIEW_FIRST_HOUR: u32 = 8;
pub const DAY_VIEW_LAST_HOUR: u32 = 20;
