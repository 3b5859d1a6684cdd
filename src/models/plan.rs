use chrono::NaiveDateTime;
use serde::Serialize;

use super::{cell_text, ApiGeneration, FlatRow};

/// One plan reshaped into a flat record.
///
/// The typed fields are the ones both API generations provide in some form;
/// everything else the response carried is kept in `fields` under dotted
/// column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRecord {
    pub generation: ApiGeneration,
    pub id: i64,
    pub title: Option<String>,
    /// `creation_date` on v0, `created` on v1.
    pub created: Option<NaiveDateTime>,
    /// `last_updated` on v0, `modified` on v1.
    pub modified: Option<NaiveDateTime>,
    /// Principal investigator email (v0 only).
    pub email_pi: Option<String>,
    /// `"; "`-joined contact emails: `users` on v0, `contributor` on v1.
    pub contacts: Option<String>,
    pub fields: FlatRow,
}

impl PlanRecord {
    /// Name of the raw column the contacts were read from.
    pub fn contacts_column(&self) -> &'static str {
        match self.generation {
            ApiGeneration::V0 => "users",
            ApiGeneration::V1 => "contributor",
        }
    }

    /// Column/value pairs in display order: typed fields first, then the
    /// remaining flattened fields alphabetically.
    pub fn columns(&self) -> Vec<(String, String)> {
        let (created, modified) = match self.generation {
            ApiGeneration::V0 => ("creation_date", "last_updated"),
            ApiGeneration::V1 => ("created", "modified"),
        };
        let format = |ts: Option<NaiveDateTime>| ts.map(|t| t.to_string()).unwrap_or_default();

        let mut columns = vec![
            ("id".to_string(), self.id.to_string()),
            ("title".to_string(), self.title.clone().unwrap_or_default()),
            (created.to_string(), format(self.created)),
            (modified.to_string(), format(self.modified)),
        ];
        if self.generation == ApiGeneration::V0 {
            columns.push(("email_pi".to_string(), self.email_pi.clone().unwrap_or_default()));
        }
        if let Some(contacts) = &self.contacts {
            columns.push((self.contacts_column().to_string(), contacts.clone()));
        }
        columns.extend(
            self.fields
                .iter()
                .map(|(column, value)| (column.clone(), cell_text(value))),
        );
        columns
    }
}
