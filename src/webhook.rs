// Webhook receiver for node-sonos-http-api push events
//
// The Rocket server runs as its own task. Matching payloads are forwarded to
// the event loop over a channel and applied there.

use log::{debug, info, warn};
use rocket::config::Config;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{post, routes, Build, Rocket, State};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::WebhookConfig;

/// Event type carrying playback state changes
pub const TRANSPORT_STATE_EVENT: &str = "transport-state";

/// Managed state of the webhook route
pub struct WebhookState {
    pub room: String,
    pub sender: UnboundedSender<Value>,
}

/// Return the `state` object of a `transport-state` event for `room`
pub fn extract_room_state(event: &Value, room: &str) -> Option<Value> {
    if event.get("type").and_then(Value::as_str) != Some(TRANSPORT_STATE_EVENT) {
        return None;
    }

    let data = event.get("data")?;
    if data.get("roomName").and_then(Value::as_str) != Some(room) {
        return None;
    }

    data.get("state").filter(|s| s.is_object()).cloned()
}

#[post("/", format = "json", data = "<event>")]
pub fn receive_event(event: Json<Value>, state: &State<WebhookState>) -> Status {
    let event = event.into_inner();

    match extract_room_state(&event, &state.room) {
        Some(payload) => {
            debug!("Webhook update for {}", state.room);
            if state.sender.send(payload).is_err() {
                warn!("Event loop is gone, dropping webhook update");
                return Status::ServiceUnavailable;
            }
        }
        None => debug!(
            "Ignoring webhook event {}",
            event.get("type").and_then(Value::as_str).unwrap_or("<untyped>")
        ),
    }

    Status::Ok
}

pub fn build_rocket(config: &WebhookConfig, room: &str, sender: UnboundedSender<Value>) -> Rocket<Build> {
    let figment = Config::figment()
        .merge(("port", config.port))
        .merge(("address", config.host.clone()));

    rocket::custom(figment)
        .mount("/", routes![receive_event])
        .manage(WebhookState {
            room: room.to_string(),
            sender,
        })
}

/// Run the webhook server until Rocket shuts down
pub async fn start_webhook_server(
    config: WebhookConfig,
    room: String,
    sender: UnboundedSender<Value>,
) -> Result<(), rocket::Error> {
    info!("Starting webhook receiver on {}:{}", config.host, config.port);

    let _rocket = build_rocket(&config, &room, sender).launch().await?;

    Ok(())
}
