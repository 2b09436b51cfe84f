//! Conversation controller: the Idle/Sending state machine that sits between
//! the view surface and the transport.
//!
//! A send cycle is split in two so a host can keep its event loop running
//! while the request is outstanding:
//!
//! 1. [`ConversationController::begin_submit`] validates the input, echoes the
//!    user message, disables submission and shows the typing indicator.
//! 2. [`ConversationController::complete`] takes the transport result, renders
//!    the reply (or the error bubble) and restores the input.
//!
//! [`ConversationController::submit`] runs both halves around one transport
//! call for hosts that can simply await.

use serde_json::Value;

use crate::error::TransportError;
use crate::render::{render_agent_response, render_bot_message, render_user_message, ChatMessage};
use crate::response::classify;
use crate::transport::Transport;
use crate::view::{MessageId, ViewSurface};

pub const TRANSPORT_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Sending,
}

/// A message accepted for sending, awaiting its transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    message: String,
}

impl PendingRequest {
    /// Trimmed user text to put on the wire.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started(PendingRequest),
    /// Input was empty or whitespace only.
    Ignored,
    /// A request is already in flight.
    Blocked,
}

/// Key presses the controller cares about, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// The commit key, with whether a line-break modifier was held.
    Enter { line_break: bool },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystrokeOutcome {
    Submit(SubmitOutcome),
    /// Host should insert a literal newline into the input.
    InsertNewline,
    PassThrough,
}

pub struct ConversationController<V, T> {
    view: V,
    transport: T,
    state: InteractionState,
    typing_indicator: Option<MessageId>,
}

impl<V: ViewSurface, T: Transport> ConversationController<V, T> {
    pub fn new(view: V, transport: T) -> Self {
        Self {
            view,
            transport,
            state: InteractionState::Idle,
            typing_indicator: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == InteractionState::Sending
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Route a keystroke from the input field.
    pub fn handle_keystroke(&mut self, key: Keystroke) -> KeystrokeOutcome {
        match key {
            Keystroke::Enter { line_break: true } => KeystrokeOutcome::InsertNewline,
            Keystroke::Enter { line_break: false } => KeystrokeOutcome::Submit(self.begin_submit()),
            Keystroke::Other => KeystrokeOutcome::PassThrough,
        }
    }

    /// Called by the host whenever the input text changes.
    pub fn input_changed(&mut self) {
        self.view.auto_grow_input();
    }

    /// Idle -> Sending, if the input holds something to send.
    pub fn begin_submit(&mut self) -> SubmitOutcome {
        if self.state == InteractionState::Sending {
            tracing::debug!("submit blocked: request already in flight");
            return SubmitOutcome::Blocked;
        }

        let text = self.view.read_input_text();
        let message = text.trim();
        if message.is_empty() {
            return SubmitOutcome::Ignored;
        }
        let message = message.to_string();

        self.view.append_message(render_user_message(&message));
        self.view.clear_input();
        self.view.reset_input_height();
        self.view.set_submit_enabled(false);
        self.show_typing_indicator();

        self.state = InteractionState::Sending;
        tracing::info!(chars = message.chars().count(), "sending message");

        SubmitOutcome::Started(PendingRequest { message })
    }

    /// Sending -> Idle with the transport's result.
    pub fn complete(&mut self, result: Result<Value, TransportError>) {
        if self.state != InteractionState::Sending {
            tracing::warn!("completion received while idle, ignoring");
            return;
        }

        self.hide_typing_indicator();

        match result {
            Ok(payload) => {
                let response = classify(&payload);
                tracing::info!(kind = response_kind(&payload), "reply received");
                self.view.append_message(render_agent_response(&response));
            }
            Err(err) => {
                tracing::warn!(error = %err, "sending message failed");
                self.view
                    .append_message(render_bot_message(Some(TRANSPORT_ERROR_MESSAGE)));
            }
        }

        self.view.set_submit_enabled(true);
        self.view.focus_input();
        self.state = InteractionState::Idle;
    }

    /// Full send cycle around a single transport call.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let outcome = self.begin_submit();
        if let SubmitOutcome::Started(pending) = &outcome {
            let result = self.transport.send(pending.message()).await;
            self.complete(result);
        }
        outcome
    }

    fn show_typing_indicator(&mut self) {
        self.hide_typing_indicator();
        self.typing_indicator = Some(self.view.append_message(ChatMessage::typing_indicator()));
    }

    fn hide_typing_indicator(&mut self) {
        if let Some(id) = self.typing_indicator.take() {
            self.view.remove_message(id);
        }
    }
}

fn response_kind(payload: &Value) -> &str {
    payload
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("text")
}

#[cfg(test)]
mod tests;
