use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Type of the status condition a tenant controller sets once reconciled.
pub const READY_CONDITION: &str = "Ready";

/// Tenant is the top-level resource that owns a dedicated namespace in which
/// pipeline runs execute.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "steward.sap.com",
    version = "v1alpha1",
    kind = "Tenant",
    namespaced,
    status = "TenantStatus",
    printcolumn = r#"{"name": "Namespace", "type": "string", "jsonPath": ".status.tenantNamespaceName"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct TenantSpec {
    pub name: String,

    #[serde(default)]
    pub display_name: String,
}

/// TenantStatus defines the observed state of a Tenant.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tenant_namespace_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl Tenant {
    /// The namespace assigned by the tenant controller, if any yet.
    pub fn namespace_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .map(|s| s.tenant_namespace_name.as_str())
            .filter(|ns| !ns.is_empty())
    }

    pub fn ready_condition(&self) -> Option<&Condition> {
        self.status
            .as_ref()?
            .conditions
            .iter()
            .find(|c| c.type_ == READY_CONDITION)
    }
}
