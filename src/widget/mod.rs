//! The storefront chat widget.
//!
//! A [`ChatWidget`] is one mounted instance of the widget. It owns the
//! conversation for as long as it lives; nothing is persisted.
//!
//! # Architecture
//!
//! - [`VisibilityController`]: collapsed launcher vs expanded panel
//! - [`InputController`]: the unsent draft and the submit gate
//! - [`ConversationStore`]: append-only messages plus the thread id
//! - `Dispatcher`: one background request per submission
//! - [`Autoscroll`] and [`WidgetObserver`]: injected presentation and
//!   diagnostics hooks
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shop_assistant_widget::agent::HttpAgentClient;
//! use shop_assistant_widget::config::WidgetConfig;
//! use shop_assistant_widget::widget::ChatWidget;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpAgentClient::new("http://localhost:8000")?);
//! let mut widget = ChatWidget::mount(client, WidgetConfig::default());
//!
//! widget.toggle();
//! widget.set_draft("show me headphones");
//! widget.submit()?;
//! widget.settle().await;
//!
//! for message in widget.messages() {
//!     println!("{}: {}", if message.is_agent() { "agent" } else { "you" }, message.text());
//! }
//! # Ok(())
//! # }
//! ```

mod dispatch;
mod effects;
mod input;
mod message;
mod observer;
mod store;
mod visibility;

pub use dispatch::{Completion, ExchangeId};
pub use effects::{Autoscroll, NoScroll, ScrollAnchor};
pub use input::InputController;
pub use message::Message;
pub use observer::{NoopObserver, TracingObserver, WidgetEvent, WidgetObserver};
pub use store::ConversationStore;
pub use visibility::VisibilityController;

use std::sync::Arc;

use crate::agent::{AgentClient, ThreadId};
use crate::config::WidgetConfig;
use crate::error::{AgentError, SubmitError};
use dispatch::Dispatcher;

/// What [`ChatWidget::apply`] did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// An agent turn was appended and the thread id replaced.
    Reply,
    /// The exchange failed. A fallback turn was appended only for malformed
    /// replies.
    Failure,
    /// The completion did not match the in-flight exchange and was dropped.
    Stale,
}

/// A submission whose exchange failed, kept so the host can offer a resend.
#[derive(Debug)]
pub struct FailedExchange {
    /// Text the user submitted.
    pub text: String,
    /// Why the exchange failed.
    pub error: AgentError,
}

/// One mounted chat widget.
///
/// All mutation happens on the task that owns the widget: user actions call
/// [`toggle`](Self::toggle), [`set_draft`](Self::set_draft) and
/// [`submit`](Self::submit), and backend results come back through
/// [`next_completion`](Self::next_completion) to be [`apply`](Self::apply)ed.
///
/// Only one exchange may be in flight; a second submission is rejected with
/// [`SubmitError::Busy`] so agent replies can never arrive out of order.
///
/// Dropping the widget unmounts it: the request in flight is aborted and its
/// result is never applied.
pub struct ChatWidget {
    visibility: VisibilityController,
    input: InputController,
    store: ConversationStore,
    dispatcher: Dispatcher,
    autoscroll: Autoscroll,
    observer: Box<dyn WidgetObserver>,
    settings: WidgetConfig,
    last_failure: Option<FailedExchange>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("visibility", &self.visibility)
            .field("input", &self.input)
            .field("store", &self.store)
            .field("dispatcher", &self.dispatcher)
            .field("autoscroll", &self.autoscroll)
            .field("last_failure", &self.last_failure)
            .finish()
    }
}

impl ChatWidget {
    /// Mount a fresh widget: closed, empty, no thread, empty draft.
    ///
    /// Events go to [`TracingObserver`]; replace it with
    /// [`with_observer`](Self::with_observer).
    #[must_use]
    pub fn mount(client: Arc<dyn AgentClient>, settings: WidgetConfig) -> Self {
        Self {
            visibility: VisibilityController::default(),
            input: InputController::default(),
            store: ConversationStore::new(),
            dispatcher: Dispatcher::new(client),
            autoscroll: Autoscroll::new(Box::new(NoScroll)),
            observer: Box::new(TracingObserver),
            settings,
            last_failure: None,
        }
    }

    /// Replace the observability hook.
    #[must_use]
    pub fn with_observer(mut self, observer: impl WidgetObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Attach the view that should follow new messages.
    #[must_use]
    pub fn with_scroll_anchor(mut self, anchor: impl ScrollAnchor + 'static) -> Self {
        self.autoscroll = Autoscroll::new(Box::new(anchor));
        self.autoscroll.after_change(self.store.messages());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Visibility
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.visibility.is_open()
    }

    /// Open or close the panel and return the new state.
    ///
    /// Opening an empty conversation seeds the greeting, once.
    pub fn toggle(&mut self) -> bool {
        let open = self.visibility.toggle();
        if open {
            self.observer.on_event(&WidgetEvent::Opened);
            if self.store.is_empty() {
                self.append(Message::local_agent(self.settings.greeting.clone()));
                self.observer.on_event(&WidgetEvent::GreetingShown);
            }
        } else {
            self.observer.on_event(&WidgetEvent::Closed);
        }
        open
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn draft(&self) -> &str {
        self.input.draft()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.input.set_draft(text);
    }

    /// Whether a submit action would be accepted right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.visibility.is_open() && self.input.can_submit() && !self.is_pending()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Conversation
    // ─────────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    #[must_use]
    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.store.thread_id()
    }

    /// Whether an exchange is waiting on the backend.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.dispatcher.in_flight().is_some()
    }

    /// The most recent failed exchange, cleared by the next submission.
    #[must_use]
    pub fn last_failure(&self) -> Option<&FailedExchange> {
        self.last_failure.as_ref()
    }

    fn append(&mut self, message: Message) {
        self.store.append(message);
        self.autoscroll.after_change(self.store.messages());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit the draft.
    ///
    /// Appends the user turn immediately, clears the draft and starts the
    /// request on the route chosen by the current thread id. Must be called
    /// inside a tokio runtime.
    ///
    /// A rejected submission changes nothing and sends nothing.
    pub fn submit(&mut self) -> Result<ExchangeId, SubmitError> {
        self.check_submittable(self.input.can_submit(), SubmitError::EmptyDraft)?;
        let Some(text) = self.input.take_submission() else {
            return Err(SubmitError::EmptyDraft);
        };
        Ok(self.send(text))
    }

    /// Resend the text of the last failed exchange as a new user turn.
    ///
    /// The draft is left alone.
    pub fn retry(&mut self) -> Result<ExchangeId, SubmitError> {
        self.check_submittable(self.last_failure.is_some(), SubmitError::NothingToRetry)?;
        let Some(failed) = self.last_failure.take() else {
            return Err(SubmitError::NothingToRetry);
        };
        Ok(self.send(failed.text))
    }

    fn check_submittable(&self, has_text: bool, missing: SubmitError) -> Result<(), SubmitError> {
        let rejected = if !self.visibility.is_open() {
            Some(SubmitError::Closed)
        } else if !has_text {
            Some(missing)
        } else if self.is_pending() {
            Some(SubmitError::Busy)
        } else {
            None
        };

        match rejected {
            Some(reason) => {
                self.observer
                    .on_event(&WidgetEvent::SubmissionRejected { reason });
                Err(reason)
            }
            None => Ok(()),
        }
    }

    fn send(&mut self, text: String) -> ExchangeId {
        self.last_failure = None;
        self.append(Message::user(text.clone()));
        self.observer
            .on_event(&WidgetEvent::UserMessageAppended { text: &text });

        let route = self.store.route();
        let exchange = self.dispatcher.dispatch(route.clone(), text);
        self.observer.on_event(&WidgetEvent::RequestSent {
            exchange,
            route: &route,
        });
        exchange
    }

    /// Wait for the in-flight exchange to finish.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.dispatcher.recv().await
    }

    /// Fold a completion into the conversation.
    pub fn apply(&mut self, completion: Completion) -> Applied {
        let Completion {
            id,
            route,
            text,
            outcome,
        } = completion;

        if !self.dispatcher.settle(id) {
            self.observer
                .on_event(&WidgetEvent::StaleCompletionDiscarded { exchange: id });
            return Applied::Stale;
        }

        match outcome {
            Ok(reply) => {
                self.append(Message::agent(reply.text, reply.thread_id.clone()));
                self.observer.on_event(&WidgetEvent::ReplyAppended {
                    exchange: id,
                    thread_id: &reply.thread_id,
                });
                self.store.set_thread_id(reply.thread_id);
                Applied::Reply
            }
            Err(error) => {
                self.observer.on_event(&WidgetEvent::ExchangeFailed {
                    exchange: id,
                    route: &route,
                    error: &error,
                });
                if error.has_fallback_reply() {
                    self.append(Message::local_agent(self.settings.fallback_reply.clone()));
                }
                self.last_failure = Some(FailedExchange { text, error });
                Applied::Failure
            }
        }
    }

    /// Wait for and apply the in-flight exchange, if any.
    pub async fn settle(&mut self) -> Option<Applied> {
        let completion = self.next_completion().await?;
        Some(self.apply(completion))
    }

    /// Tear the widget down, aborting any request in flight.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        self.observer.on_event(&WidgetEvent::Unmounted {
            abandoned: self.dispatcher.in_flight(),
        });
    }
}
