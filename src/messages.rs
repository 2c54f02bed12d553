/// Messages exchanged between the coordinator and page agents
///
/// Every message is a plain object with a `command` field. Decoding is
/// two-step: the command is read first so an unknown command can be echoed
/// back verbatim, then the body is decoded into the typed message.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PREVIEW: &str = "preview";
pub const NOTIFY: &str = "notify";

/// Sent by a page agent when the user triggers a preview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewRequest {
    pub input_text: String,
    /// Page origin without its scheme, e.g. `://en.example.org`
    pub origin: String,
    /// Article title as it appears in the address (percent-encoded)
    pub title: String,
}

/// Sent by the coordinator to the tab that should render the preview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreviewForward {
    pub input_text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NotifyKind {
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotifyText {
    pub main: String,
    /// HTML fragment
    #[serde(default)]
    pub sub: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotifyKind,
    pub message: NotifyText,
}

/// Messages the coordinator understands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ToCoordinator {
    Preview(PreviewRequest),
}

impl ToCoordinator {
    pub const COMMANDS: &'static [&'static str] = &[PREVIEW];
}

/// Messages a page agent understands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ToAgent {
    Preview(PreviewForward),
    Notify(Notification),
}

impl ToAgent {
    pub const COMMANDS: &'static [&'static str] = &[PREVIEW, NOTIFY];

    pub fn command(&self) -> &'static str {
        match self {
            ToAgent::Preview(_) => PREVIEW,
            ToAgent::Notify(_) => NOTIFY,
        }
    }
}

/// Acknowledgment returned through `sendResponse`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_command: Option<String>,
    #[serde(default, alias = "error_msg", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Reply {
    pub fn ok() -> Reply {
        Reply {
            status_code: 200,
            original_command: None,
            error_message: None,
        }
    }

    pub fn ok_for(command: &str) -> Reply {
        Reply {
            original_command: Some(command.to_string()),
            ..Reply::ok()
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MessageError {
    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),
    #[error("malformed \"{command}\" message: {reason}")]
    Malformed { command: String, reason: String },
}

impl MessageError {
    pub fn command(&self) -> &str {
        match self {
            MessageError::UnknownCommand(command) => command,
            MessageError::Malformed { command, .. } => command,
        }
    }

    /// 400 reply echoing the offending command
    pub fn to_reply(&self, echo_command: bool) -> Reply {
        Reply {
            status_code: 400,
            original_command: echo_command.then(|| self.command().to_string()),
            error_message: Some(self.to_string()),
        }
    }
}

/// Read the `command` field.
///
/// A missing field reads as "", any other non-string value as its JSON text.
pub fn command_of(message: &Value) -> String {
    match message.get("command") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(command)) => command.clone(),
        Some(other) => other.to_string(),
    }
}

/// Decode `message` into `T` if its command is one of `known`
pub fn decode<T: DeserializeOwned>(message: Value, known: &[&str]) -> Result<T, MessageError> {
    let command = command_of(&message);
    if !known.contains(&command.as_str()) {
        return Err(MessageError::UnknownCommand(command));
    }

    serde_json::from_value(message).map_err(|e| MessageError::Malformed {
        command,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = ToCoordinator::Preview(PreviewRequest {
            input_text: "== Heading ==".to_string(),
            origin: "://en.example.org".to_string(),
            title: "Foo".to_string(),
        });

        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "command": "preview",
                "input_text": "== Heading ==",
                "origin": "://en.example.org",
                "title": "Foo",
            })
        );
    }

    #[test]
    fn test_notify_wire_shape() {
        let notify = ToAgent::Notify(Notification {
            kind: NotifyKind::Error,
            message: NotifyText {
                main: "main".to_string(),
                sub: "<b>sub</b>".to_string(),
            },
        });

        let value = serde_json::to_value(&notify).unwrap();

        assert_eq!(value["command"], "notify");
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"]["sub"], "<b>sub</b>");
    }

    #[test]
    fn test_decode_agent_messages() {
        let forward: ToAgent = decode(
            json!({"command": "preview", "input_text": "abc"}),
            ToAgent::COMMANDS,
        )
        .unwrap();
        assert_eq!(
            forward,
            ToAgent::Preview(PreviewForward {
                input_text: "abc".to_string()
            })
        );

        let notify: ToAgent = decode(
            json!({"command": "notify", "type": "error", "message": {"main": "oops"}}),
            ToAgent::COMMANDS,
        )
        .unwrap();
        assert_eq!(notify.command(), NOTIFY);
    }

    #[test]
    fn test_decode_unknown_command() {
        let result: Result<ToCoordinator, _> =
            decode(json!({"command": "notify"}), ToCoordinator::COMMANDS);

        let err = result.unwrap_err();
        assert_eq!(err, MessageError::UnknownCommand("notify".to_string()));

        let reply = err.to_reply(false);
        assert_eq!(reply.status_code, 400);
        assert_eq!(reply.error_message.as_deref(), Some("unknown command \"notify\""));
        assert_eq!(reply.original_command, None);
    }

    #[test]
    fn test_decode_missing_command() {
        let result: Result<ToAgent, _> = decode(json!({"input_text": "x"}), ToAgent::COMMANDS);
        assert_eq!(result.unwrap_err(), MessageError::UnknownCommand(String::new()));
    }

    #[test]
    fn test_decode_non_string_command() {
        let result: Result<ToAgent, _> = decode(json!({"command": 3}), ToAgent::COMMANDS);
        let err = result.unwrap_err();

        assert_eq!(err, MessageError::UnknownCommand("3".to_string()));
        assert_eq!(err.to_reply(true).error_message.as_deref(), Some("unknown command \"3\""));
    }

    #[test]
    fn test_decode_malformed_body() {
        let result: Result<ToCoordinator, _> =
            decode(json!({"command": "preview", "input_text": 3}), ToCoordinator::COMMANDS);

        match result.unwrap_err() {
            MessageError::Malformed { command, .. } => assert_eq!(command, "preview"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_reply_accepts_error_msg_alias() {
        let reply: Reply = serde_json::from_value(json!({
            "status_code": 400,
            "error_msg": "unknown command \"x\"",
            "original_command": "x",
        }))
        .unwrap();

        assert_eq!(reply.status_code, 400);
        assert_eq!(reply.error_message.as_deref(), Some("unknown command \"x\""));
    }

    #[test]
    fn test_ok_reply_omits_empty_fields() {
        assert_eq!(serde_json::to_value(Reply::ok()).unwrap(), json!({"status_code": 200}));
        assert_eq!(
            serde_json::to_value(Reply::ok_for("notify")).unwrap(),
            json!({"status_code": 200, "original_command": "notify"})
        );
    }
}
