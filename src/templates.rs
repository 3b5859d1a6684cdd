//! Personal-data classification of plans.
//!
//! Every DMPonline template asks about personal data somewhere, but where
//! differs per template version. The [`TemplateRegistry`] maps template ids to
//! the section/question holding that question; the classifier walks a plan's
//! answer tree to the registered location and reads the selected option.
//!
//! ```text
//! unsupported ──(template registered)──▶ located ──(question answered)──▶ classified
//! ```
//!
//! Any step that doesn't go through ends in "unknown" (`None`), never an error.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::DmpApi;
use crate::models::{RawPlan, TemplateRef};
use crate::plans::fetch_raw_v0;

/// Where the personal-data question lives in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionLocator {
    pub section: i64,
    pub question: i64,
}

/// A template known to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    pub template_id: i64,
    pub name: &'static str,
    pub locator: QuestionLocator,
}

const fn entry(template_id: i64, name: &'static str, section: i64, question: i64) -> TemplateEntry {
    TemplateEntry {
        template_id,
        name,
        locator: QuestionLocator { section, question },
    }
}

/// Templates with a known personal-data question. New template releases need a
/// new entry here.
pub const BUILTIN_TEMPLATES: &[TemplateEntry] = &[
    entry(975303870, "TU Delft Data Management Plan template (2021)", 5, 2),
    entry(1753695087, "Data Management Plan NWO (September 2020)", 5, 1),
    entry(1506827492, "NWO Data Management Plan (January 2020)", 5, 1),
    entry(1461074155, "Data management ZonMw-template 2019", 2, 1),
    // asks about human subjects rather than personal data
    entry(1165855271, "TU Delft Data Management Questions", 1, 10),
];

static BUILTIN: Lazy<TemplateRegistry> =
    Lazy::new(|| TemplateRegistry::from_entries(BUILTIN_TEMPLATES.iter().cloned()));

/// Why a plan could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unclassified {
    #[error("plan_id {plan_id}: response holds no readable plan")]
    NoPlan { plan_id: i64 },

    #[error("plan_id {plan_id}: plan names no template")]
    MissingTemplate { plan_id: i64 },

    #[error("plan_id {plan_id}: plan has no answer content")]
    MissingContent { plan_id: i64 },

    #[error("plan_id {plan_id}, having template_id {template_id}, not supported by personal data classification")]
    UnsupportedTemplate { plan_id: i64, template_id: i64 },

    #[error("plan_id {plan_id}: section {section} not found")]
    SectionMissing { plan_id: i64, section: i64 },

    #[error("plan_id {plan_id}: question {question} not found in section {section}")]
    QuestionMissing {
        plan_id: i64,
        section: i64,
        question: i64,
    },

    #[error("plan_id {plan_id}: personal data question is not answered")]
    Unanswered { plan_id: i64 },

    #[error("plan_id {plan_id}: personal data answer {option:?} is neither Yes nor No")]
    UnrecognizedOption { plan_id: i64, option: String },
}

impl Unclassified {
    /// Outcomes that point at a registry or response problem, as opposed to a
    /// plan that simply hasn't been filled in.
    fn is_anomaly(&self) -> bool {
        !matches!(self, Self::Unanswered { .. })
    }
}

/// Lookup from template id to the location of its personal-data question.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: HashMap<i64, TemplateEntry>,
}

impl TemplateRegistry {
    /// The registry of [`BUILTIN_TEMPLATES`], built once per process.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TemplateEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.template_id, e)).collect(),
        }
    }

    pub fn lookup(&self, template_id: i64) -> Option<&TemplateEntry> {
        self.entries.get(&template_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify a raw `v0/plans` response. `None` means unknown.
    pub fn classify(&self, plan_id: i64, raw: &Value, verbose: bool) -> Option<bool> {
        match self.assess(plan_id, raw, verbose) {
            Ok(personal_data) => Some(personal_data),
            Err(reason) if reason.is_anomaly() => {
                warn!("{}", reason);
                None
            }
            Err(reason) => {
                debug!("{}", reason);
                None
            }
        }
    }

    /// Like [`classify`](Self::classify), but says why a plan is unknown.
    pub fn assess(&self, plan_id: i64, raw: &Value, verbose: bool) -> Result<bool, Unclassified> {
        let plan = first_plan(raw).ok_or(Unclassified::NoPlan { plan_id })?;
        self.assess_plan(plan_id, &plan, verbose)
    }

    pub fn assess_plan(
        &self,
        plan_id: i64,
        plan: &RawPlan,
        verbose: bool,
    ) -> Result<bool, Unclassified> {
        let template = plan
            .template
            .as_ref()
            .ok_or(Unclassified::MissingTemplate { plan_id })?;
        let entry = self
            .lookup(template.id)
            .ok_or(Unclassified::UnsupportedTemplate {
                plan_id,
                template_id: template.id,
            })?;
        let QuestionLocator { section, question } = entry.locator;

        let content = plan
            .content()
            .ok_or(Unclassified::MissingContent { plan_id })?;
        let found = content
            .section(section)
            .ok_or(Unclassified::SectionMissing { plan_id, section })?
            .question(question)
            .ok_or(Unclassified::QuestionMissing {
                plan_id,
                section,
                question,
            })?;

        if !found.answered {
            return Err(Unclassified::Unanswered { plan_id });
        }

        let option = found.first_option_text().unwrap_or_default();
        if verbose {
            info!("Template: {}", template_title(template, entry));
            info!("{}", found.text.as_deref().unwrap_or_default());
            info!("{}", option);
        }

        match option {
            "Yes" => Ok(true),
            "No" => Ok(false),
            other => Err(Unclassified::UnrecognizedOption {
                plan_id,
                option: other.to_string(),
            }),
        }
    }
}

fn first_plan(raw: &Value) -> Option<RawPlan> {
    let first = raw.as_array()?.first()?;
    match serde_json::from_value(first.clone()) {
        Ok(plan) => Some(plan),
        Err(e) => {
            debug!("plan response does not match the expected shape: {}", e);
            None
        }
    }
}

fn template_title<'a>(template: &'a TemplateRef, entry: &'a TemplateEntry) -> &'a str {
    template.title.as_deref().unwrap_or(entry.name)
}

/// Classify a raw `v0/plans` response against the built-in registry.
pub fn classify_personal_data(plan_id: i64, raw: &Value, verbose: bool) -> Option<bool> {
    TemplateRegistry::builtin().classify(plan_id, raw, verbose)
}

/// Fetch a plan from v0 and classify it. Unreachable or empty plans are unknown.
pub async fn has_personal_data<A: DmpApi>(api: &A, plan_id: i64, verbose: bool) -> Option<bool> {
    let raw = fetch_raw_v0(api, plan_id).await.ok().flatten()?;
    classify_personal_data(plan_id, &raw, verbose)
}
