//! Roster builders shared by domain unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{DeveloperId, OnCallDeveloper, OnCallRoster, ShiftWindow};
use crate::domain::ports::CacheKey;

pub(crate) fn instant(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0)
        .single()
        .expect("valid time")
}

pub(crate) fn developer(id: &str, name: &str, starts: u32, hours: i64) -> OnCallDeveloper {
    let start = instant(starts);
    OnCallDeveloper::new(
        DeveloperId::new(id).expect("developer id"),
        name,
        format!("{}@example.com", name.to_lowercase()),
        ShiftWindow::new(start, start + Duration::hours(hours)).expect("shift"),
    )
    .expect("developer")
}

pub(crate) fn roster_of(names: &[&str]) -> OnCallRoster {
    let developers = names
        .iter()
        .enumerate()
        .map(|(index, name)| developer(&format!("dev-{index}"), name, 8, 8))
        .collect();
    OnCallRoster::new(developers, instant(7))
}

pub(crate) fn key(raw: &str) -> CacheKey {
    CacheKey::new(raw).expect("cache key")
}
