use bridge_client::{
    BridgeConfig, Forwarder,
    errors::BridgeError,
    types::{BridgeReply, DownloadSubmission},
    utils::{MAX_DETAIL_CHARS, truncate_chars},
};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::frame::InboundMessage;

/// Name the extension addresses this host by, echoed back on `ping`.
pub const HOST_NAME: &str = "com.lc5900.flamingo.bridge";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Ping,
    SubmitDownload,
}

impl Action {
    /// `action` is matched trimmed and case-insensitively; anything but `ping`
    /// (missing included) is a download submission.
    pub fn of(message: &InboundMessage) -> Self {
        match string_field(message, "action") {
            Some(action) if action.trim().eq_ignore_ascii_case("ping") => Action::Ping,
            _ => Action::SubmitDownload,
        }
    }
}

/// Reply sent back to the extension for one message.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundResponse {
    Pong,
    /// JSON object returned by the bridge, forwarded verbatim.
    Passthrough(Map<String, Value>),
    /// Success with an empty or non-object JSON body.
    Accepted,
    /// Success status but the body was not JSON.
    Unparsed { status: u16, raw: String },
    Failed {
        error: String,
        detail: Option<String>,
    },
}

impl OutboundResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        OutboundResponse::Failed {
            error: error.into(),
            detail: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            OutboundResponse::Pong | OutboundResponse::Accepted => true,
            OutboundResponse::Passthrough(body) => {
                body.get("ok").and_then(Value::as_bool).unwrap_or(true)
            }
            OutboundResponse::Unparsed { status, .. } => *status < 400,
            OutboundResponse::Failed { .. } => false,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            OutboundResponse::Pong => json!({"ok": true, "host": HOST_NAME}),
            OutboundResponse::Passthrough(body) => Value::Object(body),
            OutboundResponse::Accepted => json!({"ok": true}),
            OutboundResponse::Unparsed { status, raw } => {
                json!({"ok": status < 400, "status": status, "raw": raw})
            }
            OutboundResponse::Failed { error, detail } => {
                let mut body = Map::new();
                body.insert("ok".into(), Value::Bool(false));
                body.insert("error".into(), Value::String(error));
                if let Some(detail) = detail {
                    body.insert("detail".into(), Value::String(detail));
                }
                Value::Object(body)
            }
        }
    }
}

impl From<BridgeError> for OutboundResponse {
    fn from(err: BridgeError) -> Self {
        OutboundResponse::Failed {
            error: err.to_string(),
            detail: err.detail().map(str::to_string),
        }
    }
}

/// Dispatches one decoded message. Every failure is folded into the reply.
pub async fn handle<F: Forwarder>(
    forwarder: &F,
    config: &BridgeConfig,
    message: &InboundMessage,
) -> OutboundResponse {
    match Action::of(message) {
        Action::Ping => {
            debug!("ping");
            OutboundResponse::Pong
        }
        Action::SubmitDownload => match submit_download(forwarder, config, message).await {
            Ok(response) => response,
            Err(e) => {
                if e.is_validation() {
                    info!("download request rejected: {}", e);
                } else {
                    warn!("download request failed: {}", e);
                }
                e.into()
            }
        },
    }
}

async fn submit_download<F: Forwarder>(
    forwarder: &F,
    config: &BridgeConfig,
    message: &InboundMessage,
) -> Result<OutboundResponse, BridgeError> {
    let submission = DownloadSubmission::new(
        string_field(message, "url").unwrap_or_default(),
        string_field(message, "save_dir"),
    )
    .ok_or(BridgeError::MissingUrl)?;

    if !config.has_token() {
        return Err(BridgeError::MissingToken);
    }

    info!("submitting download {}", submission.url);
    let reply = forwarder.forward(config, &submission).await?;
    shape_reply(reply)
}

/// Turns a raw bridge reply into the response for the extension.
///
/// Diagnostic text is cut to [`MAX_DETAIL_CHARS`] characters of the raw body.
pub fn shape_reply(reply: BridgeReply) -> Result<OutboundResponse, BridgeError> {
    if reply.is_error() {
        return Err(BridgeError::HttpStatus {
            status: reply.status,
            detail: truncate_chars(&reply.body, MAX_DETAIL_CHARS).to_string(),
        });
    }

    if reply.body.is_empty() {
        return Ok(OutboundResponse::Accepted);
    }

    match serde_json::from_str::<Value>(&reply.body) {
        Ok(Value::Object(body)) => Ok(OutboundResponse::Passthrough(body)),
        Ok(_) => Ok(OutboundResponse::Accepted),
        Err(_) => Ok(OutboundResponse::Unparsed {
            status: reply.status,
            raw: truncate_chars(&reply.body, MAX_DETAIL_CHARS).to_string(),
        }),
    }
}

fn string_field<'a>(message: &'a InboundMessage, key: &str) -> Option<&'a str> {
    message.get(key).and_then(Value::as_str)
}
