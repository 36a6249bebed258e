//! Builders for the resource specs submitted by test cases.
//!
//! Names are never chosen here: every resource carries a `generateName`
//! prefix so the API server hands out unique names, which keeps concurrent
//! runs against the same cluster apart.

use std::collections::BTreeMap;

use kube::api::ObjectMeta;

use crate::crd::pipeline_run::{JenkinsFile, PipelineRun, PipelineRunSpec};
use crate::crd::tenant::{Tenant, TenantSpec};

/// `generateName` prefix for pipeline runs created by the harness.
pub const PIPELINE_RUN_PREFIX: &str = "e2e-";
/// `generateName` prefix for tenants created by the harness.
pub const TENANT_PREFIX: &str = "e2e-tenant-";

// ── PipelineRunBuilder ──────────────────────────────────────────────────────

/// Builder for `PipelineRun` resources.
///
/// ```ignore
/// let run = PipelineRunBuilder::new(&tenant_ns)
///     .jenkins_file(DEMO_REPO, "master", "sleep/Jenkinsfile")
///     .arg("SLEEP_FOR_SECONDS", "1")
///     .build();
/// ```
pub struct PipelineRunBuilder {
    namespace: String,
    jenkins_file: Option<JenkinsFile>,
    args: BTreeMap<String, String>,
    secrets: Vec<String>,
}

impl PipelineRunBuilder {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            jenkins_file: None,
            args: BTreeMap::new(),
            secrets: vec![],
        }
    }

    pub fn jenkins_file(mut self, repo_url: &str, revision: &str, relative_path: &str) -> Self {
        self.jenkins_file = Some(JenkinsFile {
            repo_url: repo_url.to_string(),
            revision: revision.to_string(),
            relative_path: relative_path.to_string(),
        });
        self
    }

    pub fn arg(mut self, key: &str, value: impl Into<String>) -> Self {
        self.args.insert(key.to_string(), value.into());
        self
    }

    pub fn secret(mut self, name: &str) -> Self {
        self.secrets.push(name.to_string());
        self
    }

    pub fn build(self) -> PipelineRun {
        PipelineRun {
            metadata: ObjectMeta {
                generate_name: Some(PIPELINE_RUN_PREFIX.to_string()),
                namespace: Some(self.namespace),
                ..Default::default()
            },
            spec: PipelineRunSpec {
                jenkins_file: self.jenkins_file,
                args: self.args,
                secrets: self.secrets,
            },
            status: None,
        }
    }
}

// ── Tenants ─────────────────────────────────────────────────────────────────

/// A tenant in the client namespace `namespace`.
pub fn tenant(namespace: &str, name: &str, display_name: &str) -> Tenant {
    Tenant {
        metadata: ObjectMeta {
            generate_name: Some(TENANT_PREFIX.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: TenantSpec {
            name: name.to_string(),
            display_name: display_name.to_string(),
        },
        status: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_run_builder_sets_spec_and_generate_name() {
        let run = PipelineRunBuilder::new("tn-1")
            .jenkins_file("https://example.com/repo", "main", "sleep/Jenkinsfile")
            .arg("SLEEP_FOR_SECONDS", "1")
            .secret("creds")
            .build();

        assert_eq!(run.metadata.namespace.as_deref(), Some("tn-1"));
        assert_eq!(run.metadata.name, None);
        assert_eq!(run.metadata.generate_name.as_deref(), Some(PIPELINE_RUN_PREFIX));
        let jf = run.spec.jenkins_file.as_ref().unwrap();
        assert_eq!(jf.relative_path, "sleep/Jenkinsfile");
        assert_eq!(run.spec.args["SLEEP_FOR_SECONDS"], "1");
        assert_eq!(run.spec.secrets, vec!["creds".to_string()]);
    }

    #[test]
    fn pipeline_run_serialises_with_camel_case_keys() {
        let run = PipelineRunBuilder::new("tn-1")
            .jenkins_file("https://example.com/repo", "main", "ok/Jenkinsfile")
            .build();
        let val = serde_json::to_value(&run).unwrap();
        assert_eq!(
            val.pointer("/spec/jenkinsFile/relativePath").and_then(|v| v.as_str()),
            Some("ok/Jenkinsfile")
        );
        assert_eq!(val["kind"], "PipelineRun");
        assert_eq!(val["apiVersion"], "steward.sap.com/v1alpha1");
        assert!(val["spec"].get("args").is_none());
    }

    #[test]
    fn tenant_lives_in_the_client_namespace() {
        let t = tenant("client-ns", "name", "display");
        assert_eq!(t.metadata.namespace.as_deref(), Some("client-ns"));
        assert_eq!(t.metadata.generate_name.as_deref(), Some(TENANT_PREFIX));
        assert_eq!(t.spec.display_name, "display");
    }
}
