//! Injectable observability hook for widget state changes.

use tracing::{debug, info, warn};

use super::ExchangeId;
use crate::agent::{Route, ThreadId};
use crate::error::{AgentError, SubmitError};

/// A state change worth reporting.
#[derive(Debug)]
pub enum WidgetEvent<'a> {
    /// Panel expanded.
    Opened,
    /// Panel collapsed.
    Closed,
    /// The greeting was seeded into an empty conversation.
    GreetingShown,
    /// The user's turn was appended ahead of the network call.
    UserMessageAppended { text: &'a str },
    /// A request left for the backend.
    RequestSent { exchange: ExchangeId, route: &'a Route },
    /// An agent turn was appended and the thread id updated.
    ReplyAppended {
        exchange: ExchangeId,
        thread_id: &'a ThreadId,
    },
    /// The exchange ended without a usable reply.
    ExchangeFailed {
        exchange: ExchangeId,
        route: &'a Route,
        error: &'a AgentError,
    },
    /// A completion for an exchange the widget no longer waits on.
    StaleCompletionDiscarded { exchange: ExchangeId },
    /// A submission was refused without side effects.
    SubmissionRejected { reason: SubmitError },
    /// The widget is going away; `abandoned` is the exchange being cancelled.
    Unmounted { abandoned: Option<ExchangeId> },
}

/// Receives every [`WidgetEvent`]. Injected at mount; there is no global
/// observer.
pub trait WidgetObserver: Send {
    fn on_event(&self, event: &WidgetEvent<'_>);
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl WidgetObserver for NoopObserver {
    fn on_event(&self, _event: &WidgetEvent<'_>) {}
}

/// Reports events as structured `tracing` events. Exchange failures are the
/// diagnostic channel and log at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl WidgetObserver for TracingObserver {
    fn on_event(&self, event: &WidgetEvent<'_>) {
        match event {
            WidgetEvent::Opened => debug!(name: "widget.opened", "Chat panel opened"),
            WidgetEvent::Closed => debug!(name: "widget.closed", "Chat panel closed"),
            WidgetEvent::GreetingShown => {
                debug!(name: "widget.greeting", "Greeting seeded");
            }
            WidgetEvent::UserMessageAppended { text } => {
                debug!(name: "widget.message.user", chars = text.chars().count(), "User message appended");
            }
            WidgetEvent::RequestSent { exchange, route } => {
                info!(
                    name: "widget.exchange.sent",
                    exchange = %exchange,
                    path = %route.path(),
                    "Message sent to agent"
                );
            }
            WidgetEvent::ReplyAppended {
                exchange,
                thread_id,
            } => {
                info!(
                    name: "widget.exchange.completed",
                    exchange = %exchange,
                    thread_id = %thread_id,
                    "Agent reply appended"
                );
            }
            WidgetEvent::ExchangeFailed {
                exchange,
                route,
                error,
            } => {
                warn!(
                    name: "widget.exchange.failed",
                    exchange = %exchange,
                    path = %route.path(),
                    kind = error.kind(),
                    error = %error,
                    "Agent exchange failed"
                );
            }
            WidgetEvent::StaleCompletionDiscarded { exchange } => {
                debug!(name: "widget.exchange.stale", exchange = %exchange, "Stale completion discarded");
            }
            WidgetEvent::SubmissionRejected { reason } => {
                debug!(name: "widget.submit.rejected", reason = %reason, "Submission rejected");
            }
            WidgetEvent::Unmounted { abandoned } => {
                debug!(
                    name: "widget.unmounted",
                    abandoned = ?abandoned,
                    "Chat widget unmounted"
                );
            }
        }
    }
}
