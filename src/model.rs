//! Wire-level data model: the inbound job description and the outbound
//! per-step report.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The closed set of step actions.
///
/// Unrecognized wire values deserialize into [`ActionKind::Unknown`] with
/// their original spelling intact, so the dispatcher can fail that one step
/// with a message naming the action instead of rejecting the whole job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Click,
    Fill,
    Wait,
    Validate,
    AssertUrl,
    Select,
    Scroll,
    Unknown(String),
}

impl ActionKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "click" => Self::Click,
            "fill" => Self::Fill,
            "wait" => Self::Wait,
            "validate" => Self::Validate,
            "assert-url" => Self::AssertUrl,
            "select" => Self::Select,
            "scroll" => Self::Scroll,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::Fill => "fill",
            Self::Wait => "wait",
            Self::Validate => "validate",
            Self::AssertUrl => "assert-url",
            Self::Select => "select",
            Self::Scroll => "scroll",
            Self::Unknown(name) => name,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ActionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// One declarative browser action. Steps are immutable once submitted and
/// their order is significant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub action: ActionKind,
    /// XPath expression identifying the target element. Ignored by
    /// `assert-url`, which only inspects the page URL.
    #[serde(default)]
    pub locator: String,
    /// Action-specific payload: fill text, wait timeout in milliseconds,
    /// expected option label, or expected URL pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Inbound job description, as posted to the HTTP front door.
///
/// `steps: None` means the field was absent from the request, which is
/// invalid; `Some(vec![])` is a legal empty run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub url: String,
    pub steps: Option<Vec<Step>>,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_headless() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed,
}

/// Outcome of one executed step. Exactly one per input step, same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    /// 1-based position in the submitted step list.
    pub index: usize,
    pub action: ActionKind,
    pub locator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// URI of the screenshot captured for this step, success or failure.
    pub artifact_ref: String,
}

/// Aggregate result of one run.
///
/// `status` is `Error` only when the run failed before or outside step
/// execution. Any mix of per-step successes and failures is still a
/// successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub status: RunStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_ref: Option<String>,
    #[serde(default)]
    pub step_outcomes: Vec<StepOutcome>,
}

impl RunResult {
    pub fn success(report_ref: Option<String>, step_outcomes: Vec<StepOutcome>) -> Self {
        Self {
            status: RunStatus::Success,
            message: "Automation completed".to_string(),
            report_ref,
            step_outcomes,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Error,
            message: message.into(),
            report_ref: None,
            step_outcomes: Vec::new(),
        }
    }
}
