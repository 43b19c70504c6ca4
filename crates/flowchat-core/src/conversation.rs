//! The send/receive lifecycle of the chat window.
//!
//! A [`Conversation`] owns the ordered message list, the input value and the
//! single pending slot. A send appends the user's message plus an empty
//! inbound placeholder, the transport runs, and [`Conversation::settle`]
//! fills that placeholder in place. The split into `begin_send` / `settle`
//! lets a UI run the transport on a background task; [`Conversation::send`]
//! does both in one await.

use serde_json::{Map, Value};

use crate::config::WidgetConfig;
use crate::error::{ChatError, Result, TransportError};
use crate::resolver;
use crate::state::{Message, MessageStatus, ResolvedReply};
use crate::suggestions::SuggestionDispatcher;
use crate::transport::{FlowRequest, FlowResponse, Transport};

pub const NETWORK_ERROR_TEXT: &str = "Network error";

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    input: String,
    sending: bool,
    pending: Option<usize>,
    suggestions: SuggestionDispatcher,

    output_key: Option<String>,
    chat_inputs: Map<String, Value>,
    chat_input_field: String,
    tweaks: Option<Map<String, Value>>,
    placeholder: String,
    placeholder_sending: String,
}

impl Conversation {
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            sending: false,
            pending: None,
            suggestions: SuggestionDispatcher::new(config.suggested_questions.clone()),
            output_key: config.output_key.clone(),
            chat_inputs: config.chat_inputs.clone(),
            chat_input_field: config.chat_input_field.clone(),
            tweaks: config.tweaks.clone(),
            placeholder: config.placeholder().to_string(),
            placeholder_sending: config.placeholder_sending().to_string(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn suggestions(&self) -> &SuggestionDispatcher {
        &self.suggestions
    }

    pub fn suggestions_visible(&self) -> bool {
        self.suggestions.visible(self.messages.len())
    }

    /// Placeholder for the input box, depending on whether a send is in flight
    pub fn placeholder(&self) -> &str {
        if self.sending {
            &self.placeholder_sending
        } else {
            &self.placeholder
        }
    }

    /// Start a send with the current input.
    ///
    /// Returns `Ok(None)` for blank input (nothing changes) and
    /// `Err(ExchangeInFlight)` while a previous reply is still pending.
    /// Otherwise the user's message and the pending placeholder are appended
    /// and the request for the transport is returned.
    pub fn begin_send(&mut self) -> Result<Option<FlowRequest>> {
        if self.input.trim().is_empty() {
            return Ok(None);
        }
        if self.pending.is_some() {
            return Err(ChatError::ExchangeInFlight);
        }

        let text = std::mem::take(&mut self.input);
        self.messages.push(Message::outbound(text.clone()));
        self.sending = true;
        self.append_pending();

        Ok(Some(FlowRequest {
            text,
            chat_inputs: self.chat_inputs.clone(),
            chat_input_field: self.chat_input_field.clone(),
            tweaks: self.tweaks.clone(),
        }))
    }

    /// Pick suggestion `id` and send it as if it had been typed
    pub fn choose_suggestion(&mut self, id: u32) -> Result<Option<FlowRequest>> {
        self.ensure_idle()?;
        let text = self.suggestions.choose(id)?;
        self.input = text;
        self.begin_send()
    }

    /// Apply the transport outcome to the pending placeholder and leave the sending state.
    pub fn settle(&mut self, outcome: std::result::Result<FlowResponse, TransportError>) -> Option<&Message> {
        let reply = match outcome {
            Ok(response) => resolver::resolve(Some(&response.data), self.output_key.as_deref()),
            Err(err) => Some(classify_failure(&err)),
        };

        match reply {
            Some(reply) => {
                tracing::info!(is_error = reply.is_error, "reply resolved");
                self.resolve_pending(reply);
            }
            None => {
                tracing::warn!("flow response had no result; leaving reply empty");
                self.abandon_pending();
            }
        }
        self.sending = false;
        self.messages.last()
    }

    /// Send `text` through `transport` and wait for the reply.
    ///
    /// Returns the settled reply, or `None` when `text` was blank.
    pub async fn send<T: Transport>(&mut self, transport: &T, text: &str) -> Result<Option<&Message>> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        self.ensure_idle()?;
        self.set_input(text);
        self.dispatch(transport).await
    }

    pub async fn send_suggestion<T: Transport>(&mut self, transport: &T, id: u32) -> Result<Option<&Message>> {
        self.ensure_idle()?;
        let text = self.suggestions.choose(id)?;
        self.set_input(text);
        self.dispatch(transport).await
    }

    async fn dispatch<T: Transport>(&mut self, transport: &T) -> Result<Option<&Message>> {
        let Some(request) = self.begin_send()? else {
            return Ok(None);
        };
        let outcome = transport.send_message(&request).await;
        Ok(self.settle(outcome))
    }

    // Checked before the input or suggestion list is touched
    fn ensure_idle(&self) -> Result<()> {
        if self.pending.is_some() {
            return Err(ChatError::ExchangeInFlight);
        }
        Ok(())
    }

    fn append_pending(&mut self) {
        self.messages.push(Message::pending());
        self.pending = Some(self.messages.len() - 1);
    }

    fn resolve_pending(&mut self, reply: ResolvedReply) {
        if let Some(message) = self.take_pending() {
            message.text = reply.text;
            message.is_error = reply.is_error;
            message.status = MessageStatus::Settled;
        }
    }

    fn abandon_pending(&mut self) {
        if let Some(message) = self.take_pending() {
            message.status = MessageStatus::Abandoned;
        }
    }

    fn take_pending(&mut self) -> Option<&mut Message> {
        let index = self.pending.take()?;
        self.messages.get_mut(index)
    }
}

/// Turn a transport failure into the text shown in the bot bubble
pub fn classify_failure(err: &TransportError) -> ResolvedReply {
    match err {
        TransportError::Network(reason) => {
            tracing::warn!(%reason, "flow request failed before reaching the server");
            ResolvedReply::error(NETWORK_ERROR_TEXT)
        }
        TransportError::Server {
            status: 500,
            detail: Some(detail),
        } if !detail.is_empty() => {
            tracing::warn!(%detail, "flow failed on the server");
            ResolvedReply::error(detail.clone())
        }
        other => {
            tracing::warn!(error = %other, "unclassified flow failure");
            ResolvedReply::error(format!("Request failed: {other}"))
        }
    }
}
