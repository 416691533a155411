//! Constants for the terp admin utilities.

// ═══════════════════════════════════════════════════════════════════════════════
// SEMESTERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-digit season code for spring semesters.
pub const SPRING_CODE: &str = "01";

/// Two-digit season code for summer semesters.
pub const SUMMER_CODE: &str = "05";

/// Two-digit season code for fall semesters.
pub const FALL_CODE: &str = "08";

/// Two-digit season code for winter semesters.
///
/// A winter term is numbered with the year it starts in (December), so the
/// term running through January 2021 is `202012`.
pub const WINTER_CODE: &str = "12";

/// Length of a semester number (`YYYYSS`).
pub const SEMESTER_NUMBER_LEN: usize = 6;

/// Recently offered semesters, as semester numbers.
///
/// Must stay in ascending order; callers rely on the ordering.
pub const RECENT_SEMESTERS: &[&str] = &["202008", "202012", "202101", "202105", "202108"];

// ═══════════════════════════════════════════════════════════════════════════════
// MEMOIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Default bound on entries held by a memoized function.
pub const DEFAULT_MAX_ENTRIES: usize = 128;

// ═══════════════════════════════════════════════════════════════════════════════
// WEBHOOK
// ═══════════════════════════════════════════════════════════════════════════════

/// Default request timeout for webhook posts, in seconds.
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Environment variable holding the moderation-updates webhook URL.
pub const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL_UPDATE";

/// Environment variable holding the absolute URL of the admin page.
pub const ADMIN_URL_ENV: &str = "TERP_ADMIN_URL";
