//! DTOs for decoding directory roster responses.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{DeveloperId, OnCallDeveloper, OnCallRoster, ShiftWindow};

#[derive(Debug, Deserialize)]
pub(super) struct RosterResponseDto {
    #[serde(default)]
    pub(super) developers: Vec<DeveloperDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeveloperDto {
    pub(super) id: String,
    pub(super) name: String,
    pub(super) contact: String,
    pub(super) shift_start: DateTime<Utc>,
    pub(super) shift_end: DateTime<Utc>,
}

impl RosterResponseDto {
    /// Validate every record; one bad record rejects the whole roster.
    pub(super) fn into_domain_roster(
        self,
        fetched_at: DateTime<Utc>,
    ) -> Result<OnCallRoster, String> {
        let developers = self
            .developers
            .into_iter()
            .enumerate()
            .map(|(index, dto)| {
                dto.into_domain()
                    .map_err(|reason| format!("developer {index}: {reason}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OnCallRoster::new(developers, fetched_at))
    }
}

impl DeveloperDto {
    fn into_domain(self) -> Result<OnCallDeveloper, String> {
        let id = DeveloperId::new(self.id).map_err(|err| err.to_string())?;
        let shift =
            ShiftWindow::new(self.shift_start, self.shift_end).map_err(|err| err.to_string())?;
        OnCallDeveloper::new(id, self.name, self.contact, shift).map_err(|err| err.to_string())
    }
}
