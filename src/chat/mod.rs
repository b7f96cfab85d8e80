//! Chat relay: follow-up turns against an analyzed repository.

use crate::analysis::ChatSession;
use crate::domain::ChatMessage;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

/// Shown in place of a reply whose stream failed.
pub const CHAT_ERROR_MESSAGE: &str = "Error: I encountered an issue responding.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    /// The reply could not be produced; its content is [`CHAT_ERROR_MESSAGE`].
    Failed,
    /// Cancelled mid-stream; the reply keeps whatever had arrived.
    Cancelled,
}

/// Owns a session and its append-only transcript.
pub struct ChatRelay {
    session: Box<dyn ChatSession>,
    transcript: Vec<ChatMessage>,
}

impl ChatRelay {
    pub fn new(session: Box<dyn ChatSession>) -> Self {
        Self { session, transcript: Vec::new() }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Run one turn.
    ///
    /// `on_update` sees the assistant message once as an empty placeholder,
    /// then again after every fragment (and after an error replaced it).
    pub async fn send<F>(
        &mut self,
        message: &str,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> TurnOutcome
    where
        F: FnMut(&ChatMessage),
    {
        self.transcript.push(ChatMessage::user(message));
        let history_len = self.transcript.len();
        self.transcript.push(ChatMessage::assistant(""));
        on_update(self.reply());

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return TurnOutcome::Cancelled,
            opened = self.session.stream_reply(&self.transcript[..history_len]) => opened,
        };

        let mut fragments = match opened {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("Chat turn failed to start: {:#}", e);
                return self.fail(&mut on_update);
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return TurnOutcome::Cancelled,
                next = fragments.next() => next,
            };

            match next {
                Some(Ok(fragment)) => {
                    self.reply_mut().content.push_str(&fragment);
                    on_update(self.reply());
                }
                Some(Err(e)) => {
                    tracing::warn!("Chat stream failed: {:#}", e);
                    return self.fail(&mut on_update);
                }
                None => return TurnOutcome::Completed,
            }
        }
    }

    fn fail<F>(&mut self, on_update: &mut F) -> TurnOutcome
    where
        F: FnMut(&ChatMessage),
    {
        self.reply_mut().content = CHAT_ERROR_MESSAGE.to_string();
        on_update(self.reply());
        TurnOutcome::Failed
    }

    fn reply(&self) -> &ChatMessage {
        &self.transcript[self.transcript.len() - 1]
    }

    fn reply_mut(&mut self) -> &mut ChatMessage {
        let last = self.transcript.len() - 1;
        &mut self.transcript[last]
    }
}
