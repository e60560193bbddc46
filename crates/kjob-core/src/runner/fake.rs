//! Scripted in-memory cluster for runner tests.
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use kjob_model::{JobSpec, Labels};
use time::OffsetDateTime;

use crate::cluster::{
    ClusterClient, ClusterError, ContainerState, ContainerStates, DeletePropagation, JobHandle,
    JobStatus, LogStream, PodInfo,
};

/// Suffix appended to generated job names.
pub(crate) const GENERATED_SUFFIX: &str = "x7k2p";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Create(String),
    Status(String),
    Delete(String, DeletePropagation),
    ListPods(String, String),
    OpenLog(String, String),
    CloseLog(String),
}

#[derive(Debug, Clone)]
pub(crate) enum StatusStep {
    Ok(JobStatus),
    Err(String),
    /// The request never completes.
    Hang,
}

#[derive(Debug, Clone)]
pub(crate) enum LogScript {
    Output(Vec<u8>),
    OpenError(String),
    ReadError(String),
    CloseError(Vec<u8>, String),
    /// Reading never completes.
    Hang,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    create_error: Option<String>,
    statuses: VecDeque<StatusStep>,
    pods: Vec<PodInfo>,
    pods_error: Option<String>,
    logs: BTreeMap<String, LogScript>,
    delete_error: Option<String>,
}

/// Cluster double driven by scripted responses. Every request is recorded as a [`Call`].
#[derive(Clone, Default)]
pub(crate) struct FakeCluster {
    state: Arc<Mutex<State>>,
}

pub(crate) fn active() -> StatusStep {
    StatusStep::Ok(JobStatus {
        active: 1,
        ..JobStatus::default()
    })
}

pub(crate) fn succeeded() -> StatusStep {
    StatusStep::Ok(JobStatus {
        succeeded: 1,
        ..JobStatus::default()
    })
}

pub(crate) fn failed() -> StatusStep {
    StatusStep::Ok(JobStatus {
        failed: 1,
        ..JobStatus::default()
    })
}

/// Pod declaring `containers`, with statuses for the listed subset.
pub(crate) fn pod(
    name: &str,
    created_unix: i64,
    containers: &[&str],
    statuses: &[(&str, ContainerState)],
) -> PodInfo {
    PodInfo {
        name: name.into(),
        namespace: "tools".into(),
        created_at: OffsetDateTime::from_unix_timestamp(created_unix).ok(),
        containers: containers.iter().map(|c| c.to_string()).collect(),
        statuses: statuses
            .iter()
            .map(|(n, s)| (n.to_string(), s.clone()))
            .collect::<ContainerStates>(),
    }
}

impl FakeCluster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub(crate) fn with_statuses(self, steps: impl IntoIterator<Item = StatusStep>) -> Self {
        self.lock().statuses = steps.into_iter().collect();
        self
    }

    pub(crate) fn with_pods(self, pods: Vec<PodInfo>) -> Self {
        self.lock().pods = pods;
        self
    }

    pub(crate) fn with_pods_error(self, reason: &str) -> Self {
        self.lock().pods_error = Some(reason.into());
        self
    }

    pub(crate) fn with_log(self, container: &str, script: LogScript) -> Self {
        self.lock().logs.insert(container.into(), script);
        self
    }

    pub(crate) fn with_create_error(self, reason: &str) -> Self {
        self.lock().create_error = Some(reason.into());
        self
    }

    pub(crate) fn with_delete_error(self, reason: &str) -> Self {
        self.lock().delete_error = Some(reason.into());
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub(crate) fn deletes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Delete(..)))
            .collect()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }

    /// Pop the next status step; the last one repeats forever. No script means "active".
    fn next_status(&self) -> StatusStep {
        let mut state = self.lock();
        if state.statuses.len() > 1 {
            state.statuses.pop_front().unwrap_or_else(active)
        } else {
            state.statuses.front().cloned().unwrap_or_else(active)
        }
    }
}

fn api_error(code: u16, message: &str) -> ClusterError {
    ClusterError::Api {
        code,
        reason: "Scripted".into(),
        message: message.into(),
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn create_job(&self, spec: &JobSpec) -> Result<JobHandle, ClusterError> {
        let name = if spec.generate_name {
            format!("{}{GENERATED_SUFFIX}", spec.name)
        } else {
            spec.name.clone()
        };
        self.record(Call::Create(name.clone()));

        if let Some(reason) = self.lock().create_error.clone() {
            return Err(api_error(409, &reason));
        }
        Ok(JobHandle {
            name,
            namespace: spec.namespace.clone(),
            selector: spec.selector.clone(),
        })
    }

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus, ClusterError> {
        self.record(Call::Status(job.name.clone()));
        match self.next_status() {
            StatusStep::Ok(status) => Ok(status),
            StatusStep::Err(reason) => Err(ClusterError::Transport(reason)),
            StatusStep::Hang => std::future::pending().await,
        }
    }

    async fn delete_job(
        &self,
        job: &JobHandle,
        propagation: DeletePropagation,
    ) -> Result<(), ClusterError> {
        self.record(Call::Delete(job.name.clone(), propagation));
        match self.lock().delete_error.clone() {
            Some(reason) => Err(api_error(403, &reason)),
            None => Ok(()),
        }
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &Labels,
    ) -> Result<Vec<PodInfo>, ClusterError> {
        self.record(Call::ListPods(namespace.into(), selector.to_selector()));
        let state = self.lock();
        match &state.pods_error {
            Some(reason) => Err(ClusterError::Transport(reason.clone())),
            None => Ok(state.pods.clone()),
        }
    }

    async fn open_log_stream(
        &self,
        _namespace: &str,
        pod: &str,
        container: &str,
    ) -> Result<Box<dyn LogStream>, ClusterError> {
        self.record(Call::OpenLog(pod.into(), container.into()));
        let script = self
            .lock()
            .logs
            .get(container)
            .cloned()
            .unwrap_or(LogScript::Output(Vec::new()));

        if let LogScript::OpenError(reason) = script {
            return Err(api_error(400, &reason));
        }
        Ok(Box::new(FakeStream {
            cluster: self.clone(),
            container: container.into(),
            script,
        }))
    }
}

struct FakeStream {
    cluster: FakeCluster,
    container: String,
    script: LogScript,
}

#[async_trait]
impl LogStream for FakeStream {
    async fn read_to_end(&mut self, buf: &mut Vec<u8>) -> Result<usize, ClusterError> {
        match &self.script {
            LogScript::Output(bytes) | LogScript::CloseError(bytes, _) => {
                buf.extend_from_slice(bytes);
                Ok(bytes.len())
            }
            LogScript::ReadError(reason) => Err(ClusterError::Io(std::io::Error::other(
                reason.clone(),
            ))),
            LogScript::OpenError(_) => Ok(0),
            LogScript::Hang => std::future::pending().await,
        }
    }

    async fn close(self: Box<Self>) -> Result<(), ClusterError> {
        self.cluster.record(Call::CloseLog(self.container.clone()));
        match &self.script {
            LogScript::CloseError(_, reason) => Err(ClusterError::Transport(reason.clone())),
            _ => Ok(()),
        }
    }
}
