//! Current time formatting

use chrono::Utc;
use chrono_tz::Tz;

const TIME_FORMAT: &str = "%A, %B %d, %Y at %I:%M:%S %p %Z";

/// Current time in `timezone`, or a descriptive fallback for unknown zones.
pub fn now_formatted(timezone: &str) -> String {
    match timezone.parse::<Tz>() {
        Ok(tz) => Utc::now().with_timezone(&tz).format(TIME_FORMAT).to_string(),
        Err(_) => format!(
            "Unknown timezone: {}. Cannot determine local time.",
            timezone
        ),
    }
}
