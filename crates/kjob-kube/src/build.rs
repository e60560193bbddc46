use k8s_openapi::{
    api::{
        batch::v1::{Job, JobSpec as K8sJobSpec},
        core::v1::{Container, EnvVar as K8sEnvVar, PodSpec, PodTemplateSpec},
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use kjob_model::{ContainerSpec, JobSpec, LABEL_MANAGED_BY, MANAGED_BY_VALUE};

/// Build the `batch/v1 Job` object submitted for `spec`.
///
/// The job never retries (`backoffLimit: 0`) and its pods never restart, so the first pod is the
/// only pod. Pod template labels are exactly the selector.
pub fn build_job(spec: &JobSpec) -> Job {
    let mut labels = spec.labels.clone();
    labels.insert(LABEL_MANAGED_BY, MANAGED_BY_VALUE);

    let (name, generate_name) = if spec.generate_name {
        (None, Some(spec.name.clone()))
    } else {
        (Some(spec.name.clone()), None)
    };

    Job {
        metadata: ObjectMeta {
            name,
            generate_name,
            namespace: Some(spec.namespace.clone()),
            labels: Some(labels.0),
            ..ObjectMeta::default()
        },
        spec: Some(K8sJobSpec {
            backoff_limit: Some(0),
            active_deadline_seconds: spec
                .active_deadline_secs
                .map(|secs| i64::try_from(secs).unwrap_or(i64::MAX)),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(spec.selector.0.clone()),
                    ..ObjectMeta::default()
                }),
                spec: Some(PodSpec {
                    restart_policy: Some("Never".into()),
                    service_account_name: spec.service_account.clone(),
                    containers: spec.containers.iter().map(build_container).collect(),
                    ..PodSpec::default()
                }),
            },
            ..K8sJobSpec::default()
        }),
        ..Job::default()
    }
}

fn build_container(spec: &ContainerSpec) -> Container {
    let env: Vec<K8sEnvVar> = spec
        .env
        .resolved()
        .into_iter()
        .map(|var| K8sEnvVar {
            name: var.name().to_string(),
            value: Some(var.value().to_string()),
            ..K8sEnvVar::default()
        })
        .collect();

    Container {
        name: spec.name.clone(),
        image: Some(spec.image.clone()),
        command: non_empty(&spec.command),
        args: non_empty(&spec.args),
        env: (!env.is_empty()).then_some(env),
        working_dir: spec.working_dir.clone(),
        ..Container::default()
    }
}

fn non_empty(items: &[String]) -> Option<Vec<String>> {
    (!items.is_empty()).then(|| items.to_vec())
}
