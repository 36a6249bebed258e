use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Spec sub-types ────────────────────────────────────────────────────────────

/// JenkinsFile points at the pipeline definition a run executes.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsFile {
    pub repo_url: String,
    pub revision: String,
    pub relative_path: String,
}

/// PipelineRun is a single execution of a Jenkinsfile inside a tenant namespace.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "steward.sap.com",
    version = "v1alpha1",
    kind = "PipelineRun",
    shortname = "pr",
    namespaced,
    status = "PipelineRunStatus",
    printcolumn = r#"{"name": "State", "type": "string", "jsonPath": ".status.state"}"#,
    printcolumn = r#"{"name": "Result", "type": "string", "jsonPath": ".status.result"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jenkins_file: Option<JenkinsFile>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,
}

// ── Status ────────────────────────────────────────────────────────────────────

/// State is the processing stage of a PipelineRun. Only `Finished` is terminal.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    #[serde(rename = "")]
    Undefined,
    New,
    Preparing,
    Waiting,
    Running,
    Cleaning,
    Finished,
}

impl State {
    pub fn is_terminal(self) -> bool {
        self == Self::Finished
    }
}

/// RunResult classifies how a finished PipelineRun ended.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    #[default]
    #[serde(rename = "")]
    Undefined,
    Success,
    ErrorContent,
    ErrorInfra,
    ErrorConfig,
    Aborted,
    Timeout,
    Deleted,
}

impl RunResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undefined => "",
            Self::Success => "success",
            Self::ErrorContent => "error_content",
            Self::ErrorInfra => "error_infra",
            Self::ErrorConfig => "error_config",
            Self::Aborted => "aborted",
            Self::Timeout => "timeout",
            Self::Deleted => "deleted",
        }
    }

    pub fn is_defined(self) -> bool {
        self != Self::Undefined
    }
}

impl std::fmt::Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

/// PipelineRunStatus defines the observed state of a PipelineRun.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunStatus {
    #[serde(default)]
    pub state: State,

    #[serde(default)]
    pub result: RunResult,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PipelineRun {
    pub fn state(&self) -> State {
        self.status.as_ref().map(|s| s.state).unwrap_or_default()
    }

    pub fn result(&self) -> RunResult {
        self.status.as_ref().map(|s| s.result).unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.message.as_deref())
    }
}
