//! Test cases and their replication plans.
//!
//! A [`TestPlan`] pairs a case builder with a replica count.  [`TestPlans`]
//! is the validated, ordered list the executor expands: replica `i` of a
//! case with base name `n` is named `n_i`, counting from 1.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::condition::{PipelineRunCheck, TenantCheck};
use crate::crd::pipeline_run::PipelineRun;
use crate::crd::tenant::Tenant;
use crate::error::{Error, Result};

/// Namespace passed to builders when probing their base names during validation.
const PROBE_NAMESPACE: &str = "plan-validation";

/// A pipeline run to submit and the result it is expected to end with.
#[derive(Clone, Debug)]
pub struct TestCase {
    pub name: String,
    pub pipeline_run: PipelineRun,
    pub check: PipelineRunCheck,
}

/// The tenant every case of a run executes in, and when it counts as ready.
#[derive(Clone, Debug)]
pub struct TenantCase {
    pub name: String,
    pub tenant: Tenant,
    pub check: TenantCheck,
}

/// Builds a [`TestCase`] for a tenant namespace.  Must be a pure function of
/// the namespace: it is called once per replica and once during validation.
pub type CaseBuilder = Arc<dyn Fn(&str) -> TestCase + Send + Sync>;

/// Builds the [`TenantCase`] for a client namespace.
pub type TenantBuilder = fn(&str) -> TenantCase;

#[derive(Clone)]
pub struct TestPlan {
    builder: CaseBuilder,
    replicas: u32,
}

impl TestPlan {
    pub fn new(builder: impl Fn(&str) -> TestCase + Send + Sync + 'static, replicas: u32) -> Self {
        Self {
            builder: Arc::new(builder),
            replicas,
        }
    }

    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    pub fn build(&self, namespace: &str) -> TestCase {
        (self.builder)(namespace)
    }

    /// The name the builder gives its cases before suffixing.
    pub fn base_name(&self) -> String {
        self.build(PROBE_NAMESPACE).name
    }
}

impl fmt::Debug for TestPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestPlan")
            .field("replicas", &self.replicas)
            .finish_non_exhaustive()
    }
}

/// An ordered list of plans whose builders emit pairwise distinct, non-empty
/// base names, so every expanded case name is unique within a run.
#[derive(Clone, Debug, Default)]
pub struct TestPlans {
    plans: Vec<TestPlan>,
    base_names: Vec<String>,
}

impl TestPlans {
    pub fn new(plans: Vec<TestPlan>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut base_names = Vec::with_capacity(plans.len());
        for plan in &plans {
            let base = plan.base_name();
            if base.is_empty() {
                return Err(Error::InvalidPlan("case builder produced an empty name".into()));
            }
            if !seen.insert(base.clone()) {
                return Err(Error::DuplicateCaseName(base));
            }
            base_names.push(base);
        }
        Ok(Self { plans, base_names })
    }

    /// Base names of the plans, in order, as probed during validation.
    pub fn base_names(&self) -> &[String] {
        &self.base_names
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Total number of cases [`TestPlans::expand`] will produce.
    pub fn case_count(&self) -> usize {
        self.plans.iter().map(|p| p.replicas() as usize).sum()
    }

    /// Build every replica for `namespace`, in plan order, with `_<i>` suffixes.
    pub fn expand(&self, namespace: &str) -> Vec<TestCase> {
        let mut cases = Vec::with_capacity(self.case_count());
        for plan in &self.plans {
            for i in 1..=plan.replicas {
                let mut case = plan.build(namespace);
                case.name = format!("{}_{i}", case.name);
                cases.push(case);
            }
        }
        cases
    }
}
