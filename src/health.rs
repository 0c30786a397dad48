use crate::client::ChatClient;
use crate::model::HealthStatus;

/// Probe the service once. Never fails: anything but a `"healthy"` report is
/// `Unhealthy`.
pub async fn probe(client: &ChatClient) -> HealthStatus {
    match client.health().await {
        Ok(report) if report.is_healthy() => {
            tracing::info!("Service reports healthy");
            HealthStatus::Healthy
        }
        Ok(report) => {
            tracing::warn!(status = ?report.status, "Service reports unhealthy");
            HealthStatus::Unhealthy
        }
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HealthStatus::Unhealthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::time::Duration;

    async fn probe_with(status: usize, body: &str) -> HealthStatus {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;

        let client = ChatClient::with_timeout(&server.url(), Duration::from_secs(5)).unwrap();
        let status = probe(&client).await;
        mock.assert_async().await;
        status
    }

    #[tokio::test]
    async fn healthy_marker_maps_to_healthy() {
        assert_eq!(probe_with(200, r#"{"status":"healthy"}"#).await, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn other_status_maps_to_unhealthy() {
        assert_eq!(probe_with(200, r#"{"status":"down"}"#).await, HealthStatus::Unhealthy);
        assert_eq!(probe_with(200, r#"{"status":"Healthy"}"#).await, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn error_response_maps_to_unhealthy() {
        assert_eq!(probe_with(503, r#"{"status":"healthy"}"#).await, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn network_failure_maps_to_unhealthy() {
        let client =
            ChatClient::with_timeout("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        assert_eq!(probe(&client).await, HealthStatus::Unhealthy);
    }
}
