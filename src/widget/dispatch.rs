//! Request lifecycle for one submission at a time.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::agent::{AgentClient, AgentReply, Route};
use crate::error::AgentError;

/// Identifies one request/response cycle within a widget mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(pub(crate) u64);

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one exchange, delivered back to the widget's own task.
#[derive(Debug)]
pub struct Completion {
    /// Exchange this completion belongs to.
    pub id: ExchangeId,
    /// Route the request was sent on.
    pub route: Route,
    /// Text that was submitted.
    pub text: String,
    /// Backend outcome.
    pub outcome: Result<AgentReply, AgentError>,
}

/// The exchange currently running in the background.
struct Running {
    id: ExchangeId,
    route: Route,
    text: String,
    task: JoinHandle<Result<AgentReply, AgentError>>,
}

/// Spawns backend requests and hands their results back to the widget.
///
/// Every request runs under a child of the mount token. Dropping the
/// dispatcher cancels the token, which aborts requests still in flight.
/// A request task that panics or is cancelled still produces a completion,
/// so the widget never stays pending.
pub(crate) struct Dispatcher {
    client: Arc<dyn AgentClient>,
    lifetime: CancellationToken,
    _unmount: DropGuard,
    next_id: u64,
    in_flight: Option<ExchangeId>,
    running: Option<Running>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("next_id", &self.next_id)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl Dispatcher {
    pub(crate) fn new(client: Arc<dyn AgentClient>) -> Self {
        let lifetime = CancellationToken::new();
        Self {
            client,
            _unmount: lifetime.clone().drop_guard(),
            lifetime,
            next_id: 1,
            in_flight: None,
            running: None,
        }
    }

    pub(crate) fn in_flight(&self) -> Option<ExchangeId> {
        self.in_flight
    }

    /// Start a request in the background. Must be called inside a tokio
    /// runtime.
    pub(crate) fn dispatch(&mut self, route: Route, text: String) -> ExchangeId {
        let id = ExchangeId(self.next_id);
        self.next_id += 1;

        let token = self.lifetime.child_token();
        let client = Arc::clone(&self.client);
        let (task_route, task_text) = (route.clone(), text.clone());

        let task = tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!(name: "widget.exchange.aborted", exchange = %id, "Exchange aborted on unmount");
                    Err(AgentError::Task("aborted".into()))
                }
                outcome = client.send(&task_route, &task_text) => outcome,
            }
        });

        self.running = Some(Running {
            id,
            route,
            text,
            task,
        });
        self.in_flight = Some(id);
        id
    }

    /// Wait for the running request to finish. Returns `None` when nothing
    /// is running.
    ///
    /// Cancel safe: if the returned future is dropped before it resolves,
    /// the request keeps running and the next call picks it up again.
    pub(crate) async fn recv(&mut self) -> Option<Completion> {
        let joined = (&mut self.running.as_mut()?.task).await;
        let Running { id, route, text, .. } = self.running.take()?;

        let outcome = joined.unwrap_or_else(|e| {
            warn!(name: "widget.exchange.task_failed", exchange = %id, error = %e, "Exchange task did not complete");
            Err(AgentError::Task(e.to_string()))
        });
        Some(Completion {
            id,
            route,
            text,
            outcome,
        })
    }

    /// Mark `id` as finished. Returns `false` for a completion that does not
    /// belong to the current in-flight exchange.
    pub(crate) fn settle(&mut self, id: ExchangeId) -> bool {
        if self.in_flight == Some(id) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }
}
