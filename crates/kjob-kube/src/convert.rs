use k8s_openapi::{
    api::{
        batch::v1::Job,
        core::v1::{ContainerState as K8sContainerState, Pod},
    },
    apimachinery::pkg::apis::meta::v1::Time,
};
use kjob_core::{ContainerState, ContainerStates, JobStatus, PodInfo};
use time::OffsetDateTime;

/// Pod counters of `job`; missing fields count as zero.
pub fn job_status(job: &Job) -> JobStatus {
    let Some(status) = job.status.as_ref() else {
        return JobStatus::default();
    };
    JobStatus {
        active: counter(status.active),
        succeeded: counter(status.succeeded),
        failed: counter(status.failed),
    }
}

fn counter(value: Option<i32>) -> u32 {
    value.and_then(|v| u32::try_from(v).ok()).unwrap_or(0)
}

/// Runner view of `pod`. Returns `None` for a pod without a name.
pub fn pod_info(pod: Pod) -> Option<PodInfo> {
    let name = pod.metadata.name?;
    let namespace = pod.metadata.namespace.unwrap_or_default();
    let created_at = pod.metadata.creation_timestamp.as_ref().and_then(to_datetime);

    let containers = pod
        .spec
        .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
        .unwrap_or_default();

    let statuses = pod
        .status
        .and_then(|status| status.container_statuses)
        .unwrap_or_default()
        .into_iter()
        .map(|status| {
            let state = status
                .state
                .as_ref()
                .map(container_state)
                .unwrap_or(ContainerState::Unknown);
            (status.name, state)
        })
        .collect::<ContainerStates>();

    Some(PodInfo {
        name,
        namespace,
        created_at,
        containers,
        statuses,
    })
}

/// Map a container state; terminated wins over running, running over waiting.
pub fn container_state(state: &K8sContainerState) -> ContainerState {
    if let Some(t) = &state.terminated {
        return ContainerState::Terminated {
            exit_code: t.exit_code,
            signal: t.signal,
            reason: t.reason.clone(),
            message: t.message.clone(),
            started_at: t.started_at.as_ref().and_then(to_datetime),
            finished_at: t.finished_at.as_ref().and_then(to_datetime),
        };
    }
    if let Some(r) = &state.running {
        return ContainerState::Running {
            started_at: r.started_at.as_ref().and_then(to_datetime),
        };
    }
    if let Some(w) = &state.waiting {
        return ContainerState::Waiting {
            reason: w.reason.clone(),
            message: w.message.clone(),
        };
    }
    ContainerState::Unknown
}

fn to_datetime(time: &Time) -> Option<OffsetDateTime> {
    let nanos = i128::from(time.0.timestamp()) * 1_000_000_000
        + i128::from(time.0.timestamp_subsec_nanos());
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}
