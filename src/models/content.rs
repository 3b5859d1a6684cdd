use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Read an explicit `null` as the field's default. DMPonline sends `null` for
/// lists and flags it has nothing for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A plan object as returned by `v0/plans`.
///
/// Only the parts needed to walk the answer tree are typed; everything else is
/// left to [`crate::models::flatten()`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlan {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub template: Option<TemplateRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plan_content: Vec<PlanContent>,
}

impl RawPlan {
    /// The answer tree of the plan. Plans carry a single content block.
    pub fn content(&self) -> Option<&PlanContent> {
        self.plan_content.first()
    }
}

/// The template a plan was written against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRef {
    pub id: i64,
    pub title: Option<String>,
}

/// Ordered sections of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanContent {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
}

impl PlanContent {
    /// First section carrying `number`.
    pub fn section(&self, number: i64) -> Option<&Section> {
        self.sections.iter().find(|s| s.number == Some(number))
    }
}

/// A numbered group of questions.
///
/// Section numbers are not guaranteed to be sequential, nor stable across
/// template versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub number: Option<i64>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

impl Section {
    /// First question carrying `number`.
    pub fn question(&self, number: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == Some(number))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub number: Option<i64>,
    pub text: Option<String>,
    /// Question format as reported upstream; its shape varies per instance.
    pub format: Option<Value>,
    pub option_based: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answered: bool,
    pub answer: Option<Answer>,
}

impl Question {
    /// Text of the first selected option, if the question has an answer.
    pub fn first_option_text(&self) -> Option<&str> {
        self.answer
            .as_ref()
            .and_then(|a| a.options.first())
            .map(|o| o.text.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Answer {
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<AnswerOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}
