use kjob_core::ClusterError;
use thiserror::Error;

/// Errors raised while setting up the Kubernetes client.
#[derive(Debug, Error)]
pub enum KubeError {
    /// Neither a kubeconfig nor an in-cluster environment could be loaded.
    #[error("failed to initialise kube client: {0}")]
    Client(#[from] kube::Error),
}

/// Map a kube error onto the cluster-neutral error type.
///
/// API responses keep their status code so callers can tell "not found" or "conflict" apart.
pub(crate) fn to_cluster_error(err: kube::Error) -> ClusterError {
    match err {
        kube::Error::Api(resp) => ClusterError::Api {
            code: resp.code,
            reason: resp.reason,
            message: resp.message,
        },
        other => ClusterError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    #[test]
    fn api_errors_keep_status_code() {
        let err = to_cluster_error(kube::Error::Api(ErrorResponse {
            status: "Failure".into(),
            message: "jobs.batch \"migrate\" not found".into(),
            reason: "NotFound".into(),
            code: 404,
        }));
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "api error 404 (NotFound): jobs.batch \"migrate\" not found"
        );
    }

    #[test]
    fn other_errors_become_transport() {
        let err = to_cluster_error(kube::Error::Service(Box::new(std::io::Error::other(
            "connection reset",
        ))));
        assert!(matches!(err, ClusterError::Transport(_)));
    }
}
