use std::io;

use async_trait::async_trait;
use futures::AsyncReadExt;
use k8s_openapi::api::core::v1::Pod;
use kjob_core::{ClusterError, LogStream};
use kube::api::{Api, LogParams};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::trace;

use crate::error::to_cluster_error;

const CHUNK_SIZE: usize = 16 * 1024;
const CHUNK_BUFFER: usize = 4;

/// Container log stream backed by a pump task.
///
/// The pump owns the request and its response body and forwards chunks over a bounded channel.
/// Dropping the stream drops the receiver, which ends the pump at its next send.
pub(crate) struct KubeLogStream {
    chunks: mpsc::Receiver<io::Result<Vec<u8>>>,
    pump: Option<JoinHandle<()>>,
}

impl KubeLogStream {
    /// Request the logs of `container` in `pod`; resolves once the server accepted the request.
    pub(crate) async fn open(
        pods: Api<Pod>,
        pod: String,
        container: String,
    ) -> Result<Self, ClusterError> {
        let (opened_tx, opened_rx) = oneshot::channel();
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_BUFFER);

        let pump = tokio::spawn(async move {
            let params = LogParams {
                container: Some(container),
                ..LogParams::default()
            };
            let reader = match pods.log_stream(&pod, &params).await {
                Ok(reader) => {
                    let _ = opened_tx.send(Ok(()));
                    reader
                }
                Err(e) => {
                    let _ = opened_tx.send(Err(to_cluster_error(e)));
                    return;
                }
            };
            pump_chunks(Box::pin(reader), chunk_tx).await;
        });

        match opened_rx.await {
            Ok(Ok(())) => Ok(Self {
                chunks: chunk_rx,
                pump: Some(pump),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ClusterError::Internal(
                "log stream task ended before the request completed".into(),
            )),
        }
    }
}

async fn pump_chunks<R>(mut reader: R, tx: mpsc::Sender<io::Result<Vec<u8>>>)
where
    R: futures::AsyncRead + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let msg = match reader.read(&mut buf).await {
            Ok(0) => return,
            Ok(n) => Ok(buf[..n].to_vec()),
            Err(e) => Err(e),
        };
        let failed = msg.is_err();
        if tx.send(msg).await.is_err() || failed {
            return;
        }
    }
}

#[async_trait]
impl LogStream for KubeLogStream {
    async fn read_to_end(&mut self, buf: &mut Vec<u8>) -> Result<usize, ClusterError> {
        let mut total = 0;
        while let Some(chunk) = self.chunks.recv().await {
            let chunk = chunk?;
            total += chunk.len();
            buf.extend_from_slice(&chunk);
        }
        trace!(bytes = total, "log stream drained");
        Ok(total)
    }

    async fn close(mut self: Box<Self>) -> Result<(), ClusterError> {
        self.chunks.close();
        let Some(pump) = self.pump.take() else {
            return Ok(());
        };
        pump.abort();
        match pump.await {
            Err(e) if e.is_panic() => Err(ClusterError::Internal(format!(
                "log stream task panicked: {e}"
            ))),
            _ => Ok(()),
        }
    }
}

impl Drop for KubeLogStream {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}
