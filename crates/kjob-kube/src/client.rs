use async_trait::async_trait;
use k8s_openapi::api::{batch::v1::Job, core::v1::Pod};
use kjob_core::{
    ClusterClient, ClusterError, DeletePropagation, JobHandle, JobStatus, LogStream, PodInfo,
};
use kjob_model::{JobSpec, Labels};
use kube::{
    Client,
    api::{Api, DeleteParams, ListParams, PostParams},
};
use tracing::{debug, trace};

use crate::{
    build::build_job,
    convert::{job_status, pod_info},
    error::{KubeError, to_cluster_error},
    stream::KubeLogStream,
};

/// [`ClusterClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the local kubeconfig, or the in-cluster service account when running in a pod.
    pub async fn try_default() -> Result<Self, KubeError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn jobs(&self, namespace: &str) -> Api<Job> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn delete_params(propagation: DeletePropagation) -> DeleteParams {
    match propagation {
        DeletePropagation::Foreground => DeleteParams::foreground(),
        DeletePropagation::Background => DeleteParams::background(),
        DeletePropagation::Orphan => DeleteParams::orphan(),
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn create_job(&self, spec: &JobSpec) -> Result<JobHandle, ClusterError> {
        let job = build_job(spec);
        let created = self
            .jobs(&spec.namespace)
            .create(&PostParams::default(), &job)
            .await
            .map_err(to_cluster_error)?;

        let name = created
            .metadata
            .name
            .ok_or_else(|| ClusterError::Internal("created job has no name".into()))?;
        trace!(job = %name, namespace = %spec.namespace, "job accepted by api server");

        Ok(JobHandle {
            name,
            namespace: created
                .metadata
                .namespace
                .unwrap_or_else(|| spec.namespace.clone()),
            selector: spec.selector.clone(),
        })
    }

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus, ClusterError> {
        let current = self
            .jobs(&job.namespace)
            .get(&job.name)
            .await
            .map_err(to_cluster_error)?;
        Ok(job_status(&current))
    }

    async fn delete_job(
        &self,
        job: &JobHandle,
        propagation: DeletePropagation,
    ) -> Result<(), ClusterError> {
        match self
            .jobs(&job.namespace)
            .delete(&job.name, &delete_params(propagation))
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                debug!(job = %job, "job already deleted");
                Ok(())
            }
            Err(e) => Err(to_cluster_error(e)),
        }
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &Labels,
    ) -> Result<Vec<PodInfo>, ClusterError> {
        let params = ListParams::default().labels(&selector.to_selector());
        let list = self
            .pods(namespace)
            .list(&params)
            .await
            .map_err(to_cluster_error)?;
        Ok(list.items.into_iter().filter_map(pod_info).collect())
    }

    async fn open_log_stream(
        &self,
        namespace: &str,
        pod: &str,
        container: &str,
    ) -> Result<Box<dyn LogStream>, ClusterError> {
        let stream =
            KubeLogStream::open(self.pods(namespace), pod.to_string(), container.to_string())
                .await?;
        Ok(Box::new(stream))
    }
}
