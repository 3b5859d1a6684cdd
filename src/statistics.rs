//! Organisation-wide listings: plan statistics and departments.
//!
//! These are straight pass-through calls to v0 with light reshaping; they have
//! no fallback.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::DmpApi;
use crate::models::{flatten, timestamp_field, FlatRow};

/// Default statistics query: test plans are left out.
pub const STATISTICS_PARAMS: &[(&str, &str)] = &[("remove_tests", "true")];

/// One entry of `v0/statistics/plans`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStatistic {
    pub date_created: Option<NaiveDateTime>,
    pub date_last_updated: Option<NaiveDateTime>,
    pub fields: FlatRow,
}

impl PlanStatistic {
    fn from_value(value: &Value) -> Self {
        let mut fields = flatten(value);
        let date_created = timestamp_field(fields.remove("date_created").as_ref(), "date_created");
        let date_last_updated = timestamp_field(
            fields.remove("date_last_updated").as_ref(),
            "date_last_updated",
        );
        Self {
            date_created,
            date_last_updated,
            fields,
        }
    }

    /// Flat row with the parsed dates written back.
    pub fn to_row(&self) -> FlatRow {
        let mut row = self.fields.clone();
        let format = |ts: Option<NaiveDateTime>| {
            ts.map(|t| Value::String(t.to_string())).unwrap_or(Value::Null)
        };
        row.insert("date_created".to_string(), format(self.date_created));
        row.insert("date_last_updated".to_string(), format(self.date_last_updated));
        row
    }
}

/// Metadata about all plans of the organisation.
pub async fn plan_statistics<A: DmpApi>(
    api: &A,
    params: Option<&[(&str, &str)]>,
) -> Option<Vec<PlanStatistic>> {
    let data = api
        .get("v0/statistics/plans", params.unwrap_or(STATISTICS_PARAMS))
        .await?;
    let plans = data.get("plans")?.as_array()?;
    Some(plans.iter().map(PlanStatistic::from_value).collect())
}

/// Number of plans of the organisation.
pub async fn dmp_count<A: DmpApi>(api: &A) -> Option<usize> {
    let count = plan_statistics(api, None).await?.len();
    debug!("Number of plans: {}", count);
    Some(count)
}

/// The organisation's departments.
pub async fn departments<A: DmpApi>(api: &A) -> Option<Vec<FlatRow>> {
    let data = api.get("v0/departments", &[]).await?;
    Some(rows_of(&data))
}

/// Users per department: one row per user, tagged with the department code
/// under `faculty_en`.
pub async fn department_users<A: DmpApi>(api: &A) -> Option<Vec<FlatRow>> {
    let data = api.get("v0/departments/users", &[]).await?;
    Some(expand_department_users(&data))
}

pub fn expand_department_users(data: &Value) -> Vec<FlatRow> {
    let Some(departments) = data.as_array() else {
        return Vec::new();
    };
    departments
        .iter()
        .flat_map(|department| {
            let code = department.get("code").cloned().unwrap_or(Value::Null);
            let users = department
                .get("users")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            users.into_iter().map(move |user| {
                let mut row = flatten(&user);
                row.insert("faculty_en".to_string(), code.clone());
                row
            })
        })
        .collect()
}

fn rows_of(data: &Value) -> Vec<FlatRow> {
    match data {
        Value::Array(items) => items.iter().map(flatten).collect(),
        Value::Object(_) => vec![flatten(data)],
        _ => Vec::new(),
    }
}
