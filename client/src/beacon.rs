use std::time::Duration;

use tokio::{
    sync::mpsc::{self, UnboundedSender},
    task::JoinHandle,
};

use crate::{network::GameClient, prelude::*};

/// Background sender for notifications that have to outlive the board,
/// like cancelling an abandoned game.
pub struct Beacon {
    tx: UnboundedSender<GameRequest>,
    task: JoinHandle<usize>,
}

impl Beacon {
    pub fn spawn(client: GameClient) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<GameRequest>();

        let task = tokio::spawn(async move {
            let mut delivered = 0;
            while let Some(request) = rx.recv().await {
                match client.beacon(&request).await {
                    Ok(()) => {
                        debug!("Beacon {request:?} delivered");
                        delivered += 1;
                    }
                    Err(e) => warn!("Beacon {request:?} failed: {e}"),
                }
            }
            delivered
        });

        Self { tx, task }
    }

    pub fn send(&self, request: GameRequest) {
        if self.tx.send(request).is_err() {
            warn!("Beacon task is gone, notification dropped");
        }
    }

    /// Lets queued notifications drain for at most `grace`, then gives up.
    /// Returns how many were delivered, if the queue drained in time.
    pub async fn shutdown(self, grace: Duration) -> Option<usize> {
        let Self { tx, mut task } = self;
        drop(tx);

        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(delivered)) => Some(delivered),
            Ok(Err(e)) => {
                error!("Beacon task failed: {e}");
                None
            }
            Err(_) => {
                warn!("Pending beacons not flushed within {grace:?}, dropping them");
                task.abort();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Url;

    use super::*;

    fn client(url: &str) -> GameClient {
        // Longer than any grace period used here.
        GameClient::new(
            Url::parse(url).unwrap(),
            GameId::parse("7").unwrap(),
            None,
            Duration::from_secs(30),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn idle_beacon_shuts_down_cleanly() {
        let beacon = Beacon::spawn(client("http://127.0.0.1:9/"));
        assert_eq!(beacon.shutdown(Duration::from_secs(1)).await, Some(0));
    }

    #[tokio::test]
    async fn failed_delivery_is_not_counted() {
        let beacon = Beacon::spawn(client("http://127.0.0.1:9/"));
        beacon.send(GameRequest::CancelGame);
        assert_eq!(beacon.shutdown(Duration::from_secs(10)).await, Some(0));
    }

    #[tokio::test]
    async fn stuck_delivery_is_abandoned_after_grace() {
        // Nothing ever answers on a listener that never accepts.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let beacon = Beacon::spawn(client(&url));
        beacon.send(GameRequest::CancelGame);
        assert_eq!(beacon.shutdown(Duration::from_millis(200)).await, None);
        drop(listener);
    }
}
