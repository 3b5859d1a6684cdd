//! Plan retrieval with v0 → v1 fallback, and normalization of both response
//! shapes into [`PlanRecord`]s.
//!
//! The v0 plans endpoint fails to respond for a subset of plans for reasons
//! nobody upstream has explained. When it can't be reached the v1 endpoint is
//! tried once. An HTTP error status from v0 is an answer, not an outage, and
//! does not trigger the fallback.
//!
//! The two schemas share little, so each generation is normalized on its own.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{ClientError, DmpApi};
use crate::contacts::extract_contacts;
use crate::models::{flatten, timestamp_field, ApiGeneration, FlatRow, PlanRecord};

/// Query parameters for plan lookups: test plans are included.
pub const PLAN_PARAMS: &[(&str, &str)] = &[("remove_tests", "false")];

pub fn v0_plan_path(plan_id: i64) -> String {
    format!("v0/plans?plan={}", plan_id)
}

pub fn v1_plan_path(plan_id: i64) -> String {
    format!("v1/plans/{}", plan_id)
}

/// Fetch a plan, preferring v0 and falling back to v1 when v0 is unreachable.
pub async fn fetch_plan<A: DmpApi>(api: &A, plan_id: i64) -> Option<PlanRecord> {
    match fetch_plan_v0(api, plan_id).await {
        Ok(record) => record,
        Err(ClientError::Transport { url, .. }) => {
            warn!("{} unreachable, falling back to api v1 for plan {}", url, plan_id);
            fetch_plan_v1(api, plan_id).await
        }
        Err(e) => {
            warn!("plan {} could not be fetched: {}", plan_id, e);
            None
        }
    }
}

/// Raw `v0/plans` response for one plan.
pub async fn fetch_raw_v0<A: DmpApi>(api: &A, plan_id: i64) -> Result<Option<Value>, ClientError> {
    api.fetch(&v0_plan_path(plan_id), PLAN_PARAMS).await
}

/// Fetch and normalize a plan from v0.
///
/// Transport failures are returned so the caller can fall back.
pub async fn fetch_plan_v0<A: DmpApi>(
    api: &A,
    plan_id: i64,
) -> Result<Option<PlanRecord>, ClientError> {
    let data = fetch_raw_v0(api, plan_id).await?;
    Ok(data.and_then(|data| normalize_v0(plan_id, &data)))
}

/// Fetch and normalize a plan from v1.
pub async fn fetch_plan_v1<A: DmpApi>(api: &A, plan_id: i64) -> Option<PlanRecord> {
    let data = api.get(&v1_plan_path(plan_id), PLAN_PARAMS).await?;
    normalize_v1(plan_id, &data)
}

/// Normalize a `v0/plans` response: a list holding the plan object.
pub fn normalize_v0(plan_id: i64, data: &Value) -> Option<PlanRecord> {
    let plan = data.as_array().and_then(|plans| plans.first());
    let Some(plan) = plan else {
        debug!("api v0 returned no plan for id {}", plan_id);
        return None;
    };

    let mut fields = flatten(plan);
    let created = timestamp_field(fields.remove("creation_date").as_ref(), "creation_date");
    let modified = timestamp_field(fields.remove("last_updated").as_ref(), "last_updated");
    let email_pi = fields
        .remove("principal_investigator.email")
        .and_then(|v| v.as_str().map(str::to_string));
    let contacts = fields
        .remove("users")
        .map(|users| extract_contacts(&users, "email"));

    Some(PlanRecord {
        generation: ApiGeneration::V0,
        id: fields
            .remove("id")
            .and_then(|v| v.as_i64())
            .unwrap_or(plan_id),
        title: take_string(&mut fields, "title"),
        created,
        modified,
        email_pi,
        contacts,
        fields,
    })
}

/// Normalize a `v1/plans/{id}` response: `{items: [{dmp: {...}}]}`.
pub fn normalize_v1(plan_id: i64, data: &Value) -> Option<PlanRecord> {
    let Some(dmp) = data.pointer("/items/0/dmp") else {
        debug!("api v1 returned no plan for id {}", plan_id);
        return None;
    };

    let mut fields = flatten(dmp);
    let created = timestamp_field(fields.remove("created").as_ref(), "created");
    let modified = timestamp_field(fields.remove("modified").as_ref(), "modified");
    let contacts = fields.remove("contributor").map(|contributor| {
        debug!("read contributors of plan {}", plan_id);
        extract_contacts(&contributor, "mbox")
    });

    Some(PlanRecord {
        generation: ApiGeneration::V1,
        id: plan_id,
        title: take_string(&mut fields, "title"),
        created,
        modified,
        email_pi: None,
        contacts,
        fields,
    })
}

fn take_string(fields: &mut FlatRow, column: &str) -> Option<String> {
    match fields.remove(column) {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    }
}
