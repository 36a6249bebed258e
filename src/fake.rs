//! In-memory [`ResourceClient`] with scripted status progression.
//!
//! Stands in for the cluster in tests: it assigns generated names, counts
//! every call, and advances resource status as resources are fetched.
//! Tenants get a namespace after a configurable number of fetches; pipeline
//! runs report `running` for a configurable number of fetches and then finish
//! with the result configured for their Jenkinsfile path.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use kube::ResourceExt;

use crate::client::ResourceClient;
use crate::crd::pipeline_run::{PipelineRun, PipelineRunStatus, RunResult, State};
use crate::crd::tenant::{Tenant, TenantStatus};
use crate::error::{Error, Result};

/// Number of calls made against a [`FakeClient`], per operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub tenant_creates: u32,
    pub tenant_gets: u32,
    pub tenant_deletes: u32,
    pub run_creates: u32,
    pub run_gets: u32,
    pub run_deletes: u32,
}

type Key = (String, String);

#[derive(Default)]
struct FakeState {
    tenants: HashMap<Key, Tenant>,
    runs: HashMap<Key, PipelineRun>,
    fetches: HashMap<Key, u32>,
    created_runs: Vec<PipelineRun>,
    next_id: u32,
    calls: CallCounts,
}

pub struct FakeClient {
    state: Mutex<FakeState>,
    tenant_ready_after: Option<u32>,
    run_pending_polls: u32,
    default_result: RunResult,
    results: HashMap<String, RunResult>,
    fail_tenant_create: bool,
    fail_tenant_delete: bool,
    fail_run_create_after: Option<u32>,
}

impl Default for FakeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeClient {
    /// Tenants are ready on the first fetch; runs finish successfully on the first fetch.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            tenant_ready_after: Some(0),
            run_pending_polls: 0,
            default_result: RunResult::Success,
            results: HashMap::new(),
            fail_tenant_create: false,
            fail_tenant_delete: false,
            fail_run_create_after: None,
        }
    }

    /// Tenant fetches report no namespace this many times before assigning one.
    pub fn tenant_ready_after(mut self, fetches: u32) -> Self {
        self.tenant_ready_after = Some(fetches);
        self
    }

    pub fn tenant_never_ready(mut self) -> Self {
        self.tenant_ready_after = None;
        self
    }

    /// Pipeline run fetches report `running` this many times before finishing.
    pub fn run_pending_polls(mut self, fetches: u32) -> Self {
        self.run_pending_polls = fetches;
        self
    }

    /// Result for runs whose Jenkinsfile has no entry in [`FakeClient::result_for`].
    pub fn default_result(mut self, result: RunResult) -> Self {
        self.default_result = result;
        self
    }

    /// Result for runs executing the Jenkinsfile at `relative_path`.
    pub fn result_for(mut self, relative_path: &str, result: RunResult) -> Self {
        self.results.insert(relative_path.to_string(), result);
        self
    }

    pub fn fail_tenant_create(mut self) -> Self {
        self.fail_tenant_create = true;
        self
    }

    pub fn fail_tenant_delete(mut self) -> Self {
        self.fail_tenant_delete = true;
        self
    }

    /// Accept this many pipeline run creations, then reject the rest.
    pub fn fail_run_create_after(mut self, accepted: u32) -> Self {
        self.fail_run_create_after = Some(accepted);
        self
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Every pipeline run accepted so far, in creation order.
    pub fn created_runs(&self) -> Vec<PipelineRun> {
        self.lock().created_runs.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        // A panicking test thread must not hide the counters from the assertions that follow.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn run_result(&self, run: &PipelineRun) -> RunResult {
        run.spec
            .jenkins_file
            .as_ref()
            .and_then(|jf| self.results.get(&jf.relative_path))
            .copied()
            .unwrap_or(self.default_result)
    }
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

/// Fill in `metadata.name` from `generateName` the way the API server does.
fn assign_name(meta: &mut kube::api::ObjectMeta, next_id: &mut u32, kind: &str) -> Result<Key> {
    let namespace = meta
        .namespace
        .clone()
        .filter(|ns| !ns.is_empty())
        .ok_or_else(|| Error::config(format!("{kind} has no namespace set")))?;
    if meta.name.is_none() {
        let prefix = meta
            .generate_name
            .as_deref()
            .ok_or_else(|| Error::config(format!("{kind} has neither name nor generateName")))?;
        *next_id += 1;
        meta.name = Some(format!("{prefix}{next_id}"));
    }
    meta.uid = Some(format!("uid-{next_id}"));
    let name = meta.name.clone().unwrap_or_default();
    Ok((namespace, name))
}

#[async_trait]
impl ResourceClient for FakeClient {
    async fn create_tenant(&self, tenant: &Tenant) -> Result<Tenant> {
        let mut st = self.lock();
        st.calls.tenant_creates += 1;
        if self.fail_tenant_create {
            return Err(Error::Rejected("tenant creation rejected".into()));
        }
        let mut created = tenant.clone();
        let k = assign_name(&mut created.metadata, &mut st.next_id, "tenant")?;
        if st.tenants.contains_key(&k) {
            return Err(Error::Rejected(format!("tenant {} already exists", k.1)));
        }
        created.status = None;
        st.tenants.insert(k, created.clone());
        Ok(created)
    }

    async fn get_tenant(&self, namespace: &str, name: &str) -> Result<Tenant> {
        let mut st = self.lock();
        st.calls.tenant_gets += 1;
        let k = key(namespace, name);
        if !st.tenants.contains_key(&k) {
            return Err(Error::NotFound(format!("tenant {namespace}/{name}")));
        }
        let fetches = st.fetches.entry(k.clone()).or_default();
        let seen = *fetches;
        *fetches += 1;
        let ready_after = self.tenant_ready_after;
        let tenant = st
            .tenants
            .get_mut(&k)
            .ok_or_else(|| Error::NotFound(format!("tenant {namespace}/{name}")))?;
        if ready_after.is_some_and(|n| seen >= n) && tenant.namespace_name().is_none() {
            tenant.status = Some(TenantStatus {
                tenant_namespace_name: format!("tn-{name}"),
                ..Default::default()
            });
        }
        Ok(tenant.clone())
    }

    async fn delete_tenant(&self, namespace: &str, name: &str) -> Result<()> {
        let mut st = self.lock();
        st.calls.tenant_deletes += 1;
        if self.fail_tenant_delete {
            return Err(Error::Rejected("tenant deletion rejected".into()));
        }
        st.tenants
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("tenant {namespace}/{name}")))
    }

    async fn create_pipeline_run(&self, run: &PipelineRun) -> Result<PipelineRun> {
        let mut st = self.lock();
        st.calls.run_creates += 1;
        if self
            .fail_run_create_after
            .is_some_and(|accepted| st.calls.run_creates > accepted)
        {
            return Err(Error::Rejected("pipeline run creation rejected".into()));
        }
        let mut created = run.clone();
        let k = assign_name(&mut created.metadata, &mut st.next_id, "pipeline run")?;
        created.status = Some(PipelineRunStatus {
            state: State::New,
            ..Default::default()
        });
        st.runs.insert(k, created.clone());
        st.created_runs.push(created.clone());
        Ok(created)
    }

    async fn get_pipeline_run(&self, namespace: &str, name: &str) -> Result<PipelineRun> {
        let mut st = self.lock();
        st.calls.run_gets += 1;
        let k = key(namespace, name);
        let result = match st.runs.get(&k) {
            Some(run) => self.run_result(run),
            None => return Err(Error::NotFound(format!("pipeline run {namespace}/{name}"))),
        };
        let fetches = st.fetches.entry(k.clone()).or_default();
        *fetches += 1;
        let finished = *fetches > self.run_pending_polls;
        let run = st
            .runs
            .get_mut(&k)
            .ok_or_else(|| Error::NotFound(format!("pipeline run {namespace}/{name}")))?;
        run.status = Some(if finished {
            PipelineRunStatus {
                state: State::Finished,
                result,
                message: None,
            }
        } else {
            PipelineRunStatus {
                state: State::Running,
                ..Default::default()
            }
        });
        Ok(run.clone())
    }

    async fn delete_pipeline_run(&self, namespace: &str, name: &str) -> Result<()> {
        let mut st = self.lock();
        st.calls.run_deletes += 1;
        st.runs
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("pipeline run {namespace}/{name}")))
    }
}

impl std::fmt::Debug for FakeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.lock();
        f.debug_struct("FakeClient")
            .field("tenants", &st.tenants.keys().collect::<Vec<_>>())
            .field("runs", &st.runs.values().map(|r| r.name_any()).collect::<Vec<_>>())
            .field("calls", &st.calls)
            .finish()
    }
}
