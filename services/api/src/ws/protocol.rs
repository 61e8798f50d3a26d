//! Defines the WebSocket message protocol between the browser client and the relay.

use hcv_tutor_core::slide::{SlideEvent, now_millis};
use serde::{Deserialize, Serialize};

/// `type` of a slide pushed by the tutor agent.
pub const AGENT_SLIDE: &str = "agent-slide";
/// `type` of a slide the client asked for itself.
pub const SLIDE_GENERATED: &str = "slide-generated";

pub const WELCOME_MESSAGE: &str = "Welcome to HCV Training! I'm your AI assistant. Let's start learning about Housing Choice Vouchers.";

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Subscribes this connection to a room, leaving any previous room.
    JoinRoom {
        #[serde(rename = "roomName")]
        room_name: String,
    },
    /// Asks for a slide of one lesson topic, sent back to this client only.
    RequestSlide {
        lesson: String,
        #[serde(rename = "slideType")]
        slide_type: String,
        /// Zero-based topic index; defaults to the first topic.
        topic: Option<usize>,
    },
    StartLesson {
        lesson: String,
    },
    NextTopic {
        lesson: String,
    },
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerMessage {
    SlideUpdate {
        #[serde(rename = "type")]
        kind: String,
        #[serde(rename = "slideData")]
        slide_data: SlideEvent,
        timestamp: i64,
    },
    AgentMessage {
        #[serde(rename = "type")]
        kind: String,
        message: String,
        /// Key of the lesson the message is about, when it is about one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lesson: Option<String>,
        timestamp: i64,
    },
    /// Reports a problem with a message the client sent.
    Error { message: String },
}

impl ServerMessage {
    pub fn slide_update(kind: &str, slide_data: SlideEvent) -> Self {
        ServerMessage::SlideUpdate {
            kind: kind.to_string(),
            slide_data,
            timestamp: now_millis(),
        }
    }

    pub fn agent_message(kind: &str, message: impl Into<String>) -> Self {
        ServerMessage::AgentMessage {
            kind: kind.to_string(),
            message: message.into(),
            lesson: None,
            timestamp: now_millis(),
        }
    }

    /// An agent message tagged with the lesson it refers to.
    pub fn lesson_message(kind: &str, lesson: &str, message: impl Into<String>) -> Self {
        ServerMessage::AgentMessage {
            kind: kind.to_string(),
            message: message.into(),
            lesson: Some(lesson.to_string()),
            timestamp: now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_use_kebab_case_tags() {
        let join: ClientMessage =
            serde_json::from_str(r#"{"type": "join-room", "roomName": "hcv-room"}"#).unwrap();
        assert_eq!(
            join,
            ClientMessage::JoinRoom {
                room_name: "hcv-room".into()
            }
        );

        let request: ClientMessage = serde_json::from_str(
            r#"{"type": "request-slide", "lesson": "voucher", "slideType": "process"}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            ClientMessage::RequestSlide {
                lesson: "voucher".into(),
                slide_type: "process".into(),
                topic: None
            }
        );

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "dance"}"#).is_err());
    }

    #[test]
    fn agent_message_wire_shape() {
        let msg = ServerMessage::AgentMessage {
            kind: "welcome".into(),
            message: "hi".into(),
            lesson: None,
            timestamp: 12,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "agent-message");
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["message"], "hi");
        assert_eq!(json["timestamp"], 12);
        assert!(json.get("lesson").is_none());
    }

    #[test]
    fn lesson_messages_carry_the_lesson_key() {
        let json =
            serde_json::to_value(ServerMessage::lesson_message("lesson-started", "voucher", "go"))
                .unwrap();
        assert_eq!(json["type"], "lesson-started");
        assert_eq!(json["lesson"], "voucher");
    }
}
