//! Boundary to the conversational agent backend.
//!
//! The backend is an opaque HTTP service with two chat endpoints that share
//! one request and response shape:
//!
//! - `POST /chat` starts a conversation and issues a thread id
//! - `POST /chat/{threadId}` continues the conversation with that id
//!
//! The widget never builds URLs itself. It asks the conversation store for a
//! [`Route`] and hands it to an [`AgentClient`].
//!
//! # Implementations
//!
//! - [`HttpAgentClient`]: reqwest-based client for a real backend

pub mod http;
mod route;

pub use http::HttpAgentClient;
pub use route::{Route, ThreadId};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Request body shared by both chat endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    /// The submitted user text.
    pub message: &'a str,
}

/// Raw reply body as the backend sends it.
///
/// Both fields are optional on the wire: the continue endpoint answers with
/// `threadId: null`, and a misbehaving backend may omit `response`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReplyBody {
    /// Agent reply text.
    #[serde(default)]
    pub response: Option<String>,
    /// Continuation token, possibly newly issued.
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Banner returned by the backend's root endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthBanner {
    /// Human-readable server name.
    pub message: String,
}

/// A validated agent turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    /// Reply text to display.
    pub text: String,
    /// Thread the reply belongs to. Always resolved, see [`AgentReply::resolve`].
    pub thread_id: ThreadId,
}

impl AgentReply {
    /// Validate a decoded reply body against the route it answered.
    ///
    /// A returned `threadId` always wins. When it is missing, a reply on
    /// [`Route::ContinueSession`] belongs to the thread that was continued,
    /// while a reply on [`Route::NewSession`] is malformed because the widget
    /// would have no way to continue the conversation.
    pub fn resolve(route: &Route, body: ChatReplyBody) -> Result<Self> {
        let text = body
            .response
            .ok_or_else(|| AgentError::MalformedResponse("missing `response`".into()))?;

        let thread_id = match (body.thread_id, route) {
            (Some(id), _) if !id.is_empty() => ThreadId::new(id),
            (_, Route::ContinueSession(current)) => current.clone(),
            (_, Route::NewSession) => {
                return Err(AgentError::MalformedResponse(
                    "missing `threadId` on new conversation".into(),
                ));
            }
        };

        Ok(Self { text, thread_id })
    }
}

/// The agent backend as seen by the widget.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait::async_trait]
pub trait AgentClient: Send + Sync {
    /// Send one user message on the given route.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] for transport failures, non-success statuses and
    /// reply bodies that cannot be resolved into an [`AgentReply`].
    async fn send(&self, route: &Route, message: &str) -> Result<AgentReply>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(response: Option<&str>, thread_id: Option<&str>) -> ChatReplyBody {
        ChatReplyBody {
            response: response.map(str::to_string),
            thread_id: thread_id.map(str::to_string),
        }
    }

    #[test]
    fn test_new_session_takes_issued_thread() {
        let reply = AgentReply::resolve(
            &Route::NewSession,
            body(Some("Here are some headphones"), Some("t1")),
        )
        .unwrap();
        assert_eq!(reply.text, "Here are some headphones");
        assert_eq!(reply.thread_id.as_str(), "t1");
    }

    #[test]
    fn test_new_session_without_thread_is_malformed() {
        let err = AgentReply::resolve(&Route::NewSession, body(Some("hi"), None)).unwrap_err();
        assert!(matches!(err, AgentError::MalformedResponse(_)));
    }

    #[test]
    fn test_continue_session_keeps_thread_when_omitted() {
        let route = Route::ContinueSession(ThreadId::new("t1"));
        let reply = AgentReply::resolve(&route, body(Some("cheaper ones"), None)).unwrap();
        assert_eq!(reply.thread_id.as_str(), "t1");
    }

    #[test]
    fn test_returned_thread_overrides_current() {
        let route = Route::ContinueSession(ThreadId::new("t1"));
        let reply = AgentReply::resolve(&route, body(Some("ok"), Some("t2"))).unwrap();
        assert_eq!(reply.thread_id.as_str(), "t2");
    }

    #[test]
    fn test_missing_response_is_malformed() {
        let route = Route::ContinueSession(ThreadId::new("t1"));
        let err = AgentReply::resolve(&route, body(None, Some("t1"))).unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn test_reply_body_decodes_camel_case() {
        let decoded: ChatReplyBody =
            serde_json::from_str(r#"{"response":"hi","threadId":null}"#).unwrap();
        assert_eq!(decoded.response.as_deref(), Some("hi"));
        assert!(decoded.thread_id.is_none());
    }
}
