use crate::client::ChatClient;
use crate::events::{Action, Effect};
use crate::health;

/// Run one effect against the service and report the outcome as an action.
pub async fn perform(client: &ChatClient, effect: Effect) -> Action {
    match effect {
        Effect::Chat {
            conversation_id,
            content,
        } => match client.chat(&content).await {
            Ok(reply) => {
                tracing::info!(
                    conversation = %conversation_id,
                    response_time = reply.response_time,
                    token_count = reply.token_count,
                    "Received reply"
                );
                Action::ChatSucceeded {
                    conversation_id,
                    reply,
                }
            }
            Err(e) => {
                tracing::warn!(conversation = %conversation_id, error = %e, "Chat request failed");
                Action::ChatFailed {
                    error: e.user_message(),
                }
            }
        },
        Effect::CheckHealth => Action::HealthChecked(health::probe(client).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InputEdit;
    use crate::model::{HealthStatus, Role};
    use crate::state::AppState;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    async fn send_through(server: &Server, text: &str) -> AppState {
        let client = ChatClient::with_timeout(&server.url(), Duration::from_secs(5)).unwrap();
        let (state, _) = AppState::new().update(Action::Edit(InputEdit::Replace(text.to_string())));
        let (state, effect) = state.update(Action::Send);
        let effect = effect.expect("send should request a chat");
        let (state, follow_up) = state.update(perform(&client, effect).await);
        assert!(follow_up.is_none());
        state
    }

    #[tokio::test]
    async fn successful_send_appends_user_then_assistant() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_body(Matcher::Json(serde_json::json!({ "content": "hello" })))
            .with_status(200)
            .with_body(r#"{"content":"hi","response_time":120,"token_count":5}"#)
            .create_async()
            .await;

        let state = send_through(&server, "hello").await;
        mock.assert_async().await;

        let messages = &state.store.active().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "hi");
        assert_eq!(messages[1].response_time_ms(), Some(120));
        assert_eq!(messages[1].token_count(), Some(5));
        assert!(!state.in_flight);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn failed_send_keeps_only_user_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body(r#"{"detail":"rate limited"}"#)
            .create_async()
            .await;

        let state = send_through(&server, "hello").await;

        let messages = &state.store.active().messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(state.error.as_deref(), Some("rate limited"));
        assert!(!state.in_flight);
    }

    #[tokio::test]
    async fn failed_send_without_detail_uses_generic_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let state = send_through(&server, "hello").await;
        assert_eq!(state.error.as_deref(), Some("Failed to send message"));
    }

    #[tokio::test]
    async fn health_effect_reports_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(200)
            .with_body(r#"{"status":"healthy"}"#)
            .create_async()
            .await;

        let client = ChatClient::with_timeout(&server.url(), Duration::from_secs(5)).unwrap();
        let action = perform(&client, Effect::CheckHealth).await;
        assert_eq!(action, Action::HealthChecked(HealthStatus::Healthy));
    }
}
