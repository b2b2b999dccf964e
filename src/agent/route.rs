//! Endpoint selection for a chat exchange.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AgentError, Result};

/// Opaque continuation token issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Wrap a backend-issued token.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which chat endpoint a submission is addressed to.
///
/// The two variants carry the same request body; only the path differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// No thread yet: `POST /chat`.
    NewSession,
    /// Continue an existing thread: `POST /chat/{threadId}`.
    ContinueSession(ThreadId),
}

impl Route {
    /// Pick the route for the current thread state.
    #[must_use]
    pub fn for_thread(thread_id: Option<&ThreadId>) -> Self {
        match thread_id {
            Some(id) => Self::ContinueSession(id.clone()),
            None => Self::NewSession,
        }
    }

    /// Thread being continued, if any.
    #[must_use]
    pub fn thread_id(&self) -> Option<&ThreadId> {
        match self {
            Self::NewSession => None,
            Self::ContinueSession(id) => Some(id),
        }
    }

    /// Path relative to the backend root. The thread id is percent-encoded
    /// as a single segment, exactly as it is sent.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::NewSession => "/chat".to_string(),
            Self::ContinueSession(id) => format!("/chat/{}", urlencoding::encode(id.as_str())),
        }
    }

    /// Absolute endpoint URL under `base`.
    ///
    /// Any path already on `base` is kept as a prefix.
    pub fn url(&self, base: &Url) -> Result<Url> {
        if base.cannot_be_a_base() {
            return Err(AgentError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        let prefix = base.path().trim_end_matches('/');
        let mut url = base.clone();
        url.set_path(&format!("{prefix}{}", self.path()));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_for_thread() {
        assert_eq!(Route::for_thread(None), Route::NewSession);
        let id = ThreadId::new("t1");
        assert_eq!(
            Route::for_thread(Some(&id)),
            Route::ContinueSession(ThreadId::new("t1"))
        );
    }

    #[test]
    fn test_route_urls() {
        let base = Url::parse("http://localhost:8000").unwrap();
        assert_eq!(
            Route::NewSession.url(&base).unwrap().as_str(),
            "http://localhost:8000/chat"
        );
        assert_eq!(
            Route::ContinueSession("t1".into())
                .url(&base)
                .unwrap()
                .as_str(),
            "http://localhost:8000/chat/t1"
        );
    }

    #[test]
    fn test_route_keeps_base_prefix() {
        let base = Url::parse("http://shop.test/assistant/").unwrap();
        assert_eq!(
            Route::NewSession.url(&base).unwrap().as_str(),
            "http://shop.test/assistant/chat"
        );
    }

    #[test]
    fn test_thread_id_is_single_segment() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let url = Route::ContinueSession("a/b".into()).url(&base).unwrap();
        assert_eq!(url.path(), "/chat/a%2Fb");
    }

    #[test]
    fn test_logged_path_matches_request_path() {
        let base = Url::parse("http://localhost:8000").unwrap();
        for id in ["t1", "a/b", "two words", "q?x=1#frag", "100%"] {
            let route = Route::ContinueSession(id.into());
            assert_eq!(route.path(), route.url(&base).unwrap().path(), "id {id:?}");
        }
        assert_eq!(Route::ContinueSession("a/b".into()).path(), "/chat/a%2Fb");
    }

    #[test]
    fn test_cannot_be_a_base_is_rejected() {
        let base = Url::parse("mailto:shop@example.com").unwrap();
        assert!(Route::NewSession.url(&base).is_err());
    }
}
