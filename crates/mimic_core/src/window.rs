//! Rolling time window.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// A window reaching back a whole number of calendar months from "now".
///
/// Month subtraction is calendar-aware: one month before March 31st is the
/// last day of February.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use mimic_core::TimeWindow;
///
/// let now = Utc.with_ymd_and_hms(2024, 5, 31, 8, 0, 0).unwrap();
/// let cutoff = TimeWindow::months(3).cutoff(now);
/// assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    months: u32,
}

impl TimeWindow {
    /// Window spanning `months` calendar months.
    pub fn months(months: u32) -> Self {
        Self { months }
    }

    /// Number of months spanned.
    pub fn span_months(&self) -> u32 {
        self.months
    }

    /// Earliest instant inside the window when evaluated at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
