//! WebSocket message shapes.
//!
//! Every frame is a JSON object tagged by `event`:
//!
//! ```text
//! client → server  {"event":"new_post","nickname":"Al","token":"room801","request_id":7}
//! client → server  {"event":"request_posts"}
//! server → client  {"event":"posts_update","posts":[...]}
//! server → client  {"event":"ack","request_id":7,"ok":false,"error":"token empty"}
//! ```

use crate::SubmitError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokenfeed_core::Post;

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit a post
    NewPost {
        /// Missing or null means blank
        #[serde(default)]
        nickname: Option<String>,
        /// Missing or null means blank
        #[serde(default)]
        token: Option<String>,
        /// Echoed back in the acknowledgement
        #[serde(default)]
        request_id: Option<Value>,
    },
    /// Ask for the current feed
    RequestPosts,
}

/// Frames the server sends.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerMessage<'a> {
    /// The full ordered feed
    PostsUpdate {
        /// Newest first
        posts: &'a [Post],
    },
    /// Outcome of one `new_post`
    Ack(SubmitAck),
}

impl ServerMessage<'_> {
    /// Encode as a text frame payload.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitAck {
    /// The client's correlation id, if it sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Value>,
    /// Whether the post was accepted
    pub ok: bool,
    /// Client-facing reason when not accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitAck {
    /// Build the acknowledgement for a submission outcome.
    pub fn new(request_id: Option<Value>, result: &Result<Post, SubmitError>) -> Self {
        Self {
            request_id,
            ok: result.is_ok(),
            error: result.as_ref().err().map(SubmitError::client_message),
        }
    }
}
