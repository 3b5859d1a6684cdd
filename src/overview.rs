//! Question overview of a plan: one row per question, in template order.

use serde::Serialize;

use crate::client::DmpApi;
use crate::models::{cell_text, RawPlan};
use crate::output::Table;
use crate::plans::fetch_raw_v0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRow {
    pub section: Option<i64>,
    pub question: Option<i64>,
    pub text: String,
    pub format: String,
    pub option_based: Option<bool>,
}

pub fn question_rows(plan: &RawPlan) -> Vec<QuestionRow> {
    let Some(content) = plan.content() else {
        return Vec::new();
    };
    content
        .sections
        .iter()
        .flat_map(|section| {
            section.questions.iter().map(move |q| QuestionRow {
                section: section.number,
                question: q.number,
                text: q.text.clone().unwrap_or_default(),
                format: q.format.as_ref().map(cell_text).unwrap_or_default(),
                option_based: q.option_based,
            })
        })
        .collect()
}

/// Fetch a plan from v0 and list its questions.
pub async fn question_overview<A: DmpApi>(api: &A, plan_id: i64) -> Option<Vec<QuestionRow>> {
    let raw = fetch_raw_v0(api, plan_id).await.ok().flatten()?;
    let first = raw.as_array()?.first()?.clone();
    let plan: RawPlan = serde_json::from_value(first).ok()?;
    Some(question_rows(&plan))
}

pub fn overview_table(rows: &[QuestionRow]) -> Table {
    let mut table = Table::new(["section", "question", "text", "format", "option_based"]);
    for row in rows {
        table.push_row(vec![
            number_cell(row.section),
            number_cell(row.question),
            row.text.clone(),
            row.format.clone(),
            row.option_based.map(|b| b.to_string()).unwrap_or_default(),
        ]);
    }
    table
}

fn number_cell(number: Option<i64>) -> String {
    number.map(|n| n.to_string()).unwrap_or_default()
}
