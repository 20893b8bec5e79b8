//! Custom messages sent to the client after each publication.

use lsp_types::notification::Notification;
use lsp_types::request::Request;
use serde_json::Value;
use tower_lsp::Client;
use tracing::debug;

pub const NOTIFICATION_PAYLOAD: &str = "jscan diagnostics published";
pub const REQUEST_PAYLOAD: &str = "jscan diagnostics published, acknowledge?";

pub enum CustomNotification {}

impl Notification for CustomNotification {
    type Params = String;
    const METHOD: &'static str = "custom/notification";
}

pub enum CustomRequest {}

impl Request for CustomRequest {
    type Params = String;
    type Result = Value;
    const METHOD: &'static str = "custom/request";
}

/// Send both custom messages. The request is answered on a detached task so a client that
/// never replies cannot hold up validation.
pub async fn send_custom_messages(client: &Client) {
    client
        .send_notification::<CustomNotification>(NOTIFICATION_PAYLOAD.to_string())
        .await;
    let client = client.clone();
    tokio::spawn(async move {
        match client
            .send_request::<CustomRequest>(REQUEST_PAYLOAD.to_string())
            .await
        {
            Ok(reply) => debug!(%reply, "custom request answered"),
            Err(err) => debug!(error = %err, "custom request failed"),
        }
    });
}
