//! On-call roster model.
//!
//! A roster is the list of developers responsible for incident response for
//! one roster key. Rosters are immutable snapshots: every refresh replaces the
//! whole roster rather than editing records in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation errors for on-call records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnCallValidationError {
    #[error("developer id must not be empty")]
    EmptyDeveloperId,
    #[error("developer name must not be empty")]
    EmptyName,
    #[error("contact channel must not be empty")]
    EmptyContact,
    #[error("shift must start before it ends")]
    InvertedShift,
}

/// Stable identifier assigned by the on-call directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeveloperId(String);

impl DeveloperId {
    /// Trim and validate a directory identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, OnCallValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(OnCallValidationError::EmptyDeveloperId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DeveloperId {
    type Error = OnCallValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeveloperId> for String {
    fn from(value: DeveloperId) -> Self {
        value.0
    }
}

/// Half-open interval `[starts_at, ends_at)` during which a developer is on call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ShiftWindowParts", rename_all = "camelCase")]
pub struct ShiftWindow {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShiftWindowParts {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl TryFrom<ShiftWindowParts> for ShiftWindow {
    type Error = OnCallValidationError;

    fn try_from(value: ShiftWindowParts) -> Result<Self, Self::Error> {
        Self::new(value.starts_at, value.ends_at)
    }
}

impl ShiftWindow {
    /// Build a window, rejecting empty or inverted intervals.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, Utc};
    /// use library_api::domain::ShiftWindow;
    ///
    /// let start = Utc::now();
    /// assert!(ShiftWindow::new(start, start + Duration::hours(8)).is_ok());
    /// assert!(ShiftWindow::new(start, start).is_err());
    /// ```
    pub fn new(
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<Self, OnCallValidationError> {
        if starts_at >= ends_at {
            return Err(OnCallValidationError::InvertedShift);
        }
        Ok(Self { starts_at, ends_at })
    }

    /// Inclusive start.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// Exclusive end.
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    /// Whether `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.starts_at <= instant && instant < self.ends_at
    }
}

/// One developer record in a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnCallDeveloper {
    id: DeveloperId,
    name: String,
    contact: String,
    shift: ShiftWindow,
}

impl OnCallDeveloper {
    /// Validate and build a developer record.
    pub fn new(
        id: DeveloperId,
        name: impl Into<String>,
        contact: impl Into<String>,
        shift: ShiftWindow,
    ) -> Result<Self, OnCallValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OnCallValidationError::EmptyName);
        }
        let contact = contact.into();
        if contact.trim().is_empty() {
            return Err(OnCallValidationError::EmptyContact);
        }
        Ok(Self {
            id,
            name,
            contact,
            shift,
        })
    }

    /// Directory identifier.
    pub fn id(&self) -> &DeveloperId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contact channel, e.g. an email address or pager handle.
    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// Shift window.
    pub fn shift(&self) -> ShiftWindow {
        self.shift
    }
}

/// Snapshot of the developers on call for one roster key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnCallRoster {
    developers: Vec<OnCallDeveloper>,
    fetched_at: DateTime<Utc>,
}

impl OnCallRoster {
    /// Roster of `developers` as produced at `fetched_at`.
    pub fn new(developers: Vec<OnCallDeveloper>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            developers,
            fetched_at,
        }
    }

    /// Developers in directory order.
    pub fn developers(&self) -> &[OnCallDeveloper] {
        &self.developers
    }

    /// When the source of truth produced this snapshot.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// `true` when nobody is listed.
    pub fn is_empty(&self) -> bool {
        self.developers.is_empty()
    }

    /// First developer whose shift covers `instant`.
    pub fn on_shift_at(&self, instant: DateTime<Utc>) -> Option<&OnCallDeveloper> {
        self.developers
            .iter()
            .find(|developer| developer.shift.contains(instant))
    }
}
