use crate::error::{Result, ServiceError};
use crate::services::InferenceService;
use crate::store::models::{seed_messages, ChatDraft, ChatMessage, Sender};
use crate::store::{RecordId, RecordStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

/// Delay before the bot answers a message.
pub const REPLY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingReply { pending: usize },
}

type ReplyOutcome = Result<String, ServiceError>;

/// Chat panel: the message log, the input box and the replies in flight.
///
/// Replies run as tasks owned by the panel and are only written back when
/// the panel collects them, so dropping the panel cancels them.
pub struct ChatPanel {
    messages: RecordStore<ChatMessage>,
    input: String,
    inference: Arc<dyn InferenceService>,
    pending: JoinSet<ReplyOutcome>,
}

impl ChatPanel {
    pub fn new(inference: Arc<dyn InferenceService>) -> Self {
        Self {
            messages: RecordStore::seeded(seed_messages()),
            input: String::new(),
            inference,
            pending: JoinSet::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.messages.list()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn state(&self) -> ChatState {
        match self.pending.len() {
            0 => ChatState::Idle,
            pending => ChatState::AwaitingReply { pending },
        }
    }

    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    /// Sends the input box. It is cleared only if the message was accepted.
    pub fn send_input(&mut self) -> Result<RecordId> {
        let text = std::mem::take(&mut self.input);
        match self.send(&text) {
            Ok(id) => Ok(id),
            Err(err) => {
                self.input = text;
                Err(err)
            }
        }
    }

    /// Appends a user message and schedules the bot's reply.
    ///
    /// Without a tokio runtime the message is refused and the log is left
    /// untouched.
    pub fn send(&mut self, text: &str) -> Result<RecordId> {
        if Handle::try_current().is_err() {
            return Err(ServiceError::Unavailable("scheduler").into());
        }
        let id = self
            .messages
            .add(ChatDraft {
                text: text.to_string(),
                sender: Sender::User,
            })?
            .id;

        let conversation = self.messages.list().to_vec();
        let inference = Arc::clone(&self.inference);
        let deadline = Instant::now() + REPLY_DELAY;
        self.pending.spawn(async move {
            time::sleep_until(deadline).await;
            inference.get_reply(&conversation).await
        });

        debug!(message_id = %id, pending = self.pending.len(), "Reply scheduled");
        Ok(id)
    }

    /// Appends every reply that has already arrived without waiting.
    /// Returns the number of bot messages added.
    pub fn poll_replies(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(joined) = self.pending.try_join_next() {
            if let Some(Ok(_)) = self.deliver(joined) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Waits for the next reply and appends it. `None` once nothing is pending.
    pub async fn next_reply(&mut self) -> Option<Result<RecordId>> {
        loop {
            let joined = self.pending.join_next().await?;
            if let Some(outcome) = self.deliver(joined) {
                return Some(outcome);
            }
        }
    }

    /// Cancels every reply still in flight.
    pub fn shutdown(&mut self) {
        let cancelled = std::mem::take(&mut self.pending);
        if !cancelled.is_empty() {
            info!(cancelled = cancelled.len(), "Cancelling pending chat replies");
        }
        // Dropping the set aborts its tasks.
        drop(cancelled);
    }

    fn deliver(&mut self, joined: Result<ReplyOutcome, JoinError>) -> Option<Result<RecordId>> {
        match joined {
            Ok(Ok(text)) => {
                let outcome = self
                    .messages
                    .add(ChatDraft {
                        text,
                        sender: Sender::Bot,
                    })
                    .map(|m| m.id);
                if let Ok(id) = &outcome {
                    debug!(message_id = %id, "Bot reply delivered");
                }
                Some(outcome)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Inference failed, no reply appended");
                Some(Err(err.into()))
            }
            Err(err) => {
                warn!(error = %err, "Reply task did not finish");
                None
            }
        }
    }
}

impl Drop for ChatPanel {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;
    use crate::services::{CannedReply, CANNED_REPLY};
    use crate::store::models::GREETING;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingReply(Arc<AtomicUsize>);

    #[async_trait]
    impl InferenceService for CountingReply {
        async fn get_reply(&self, conversation: &[ChatMessage]) -> Result<String, ServiceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(format!("seen {}", conversation.len()))
        }
    }

    struct FailingReply;

    #[async_trait]
    impl InferenceService for FailingReply {
        async fn get_reply(&self, _conversation: &[ChatMessage]) -> Result<String, ServiceError> {
            Err(ServiceError::Failed {
                service: "inference",
                message: "model offline".into(),
            })
        }
    }

    fn panel() -> ChatPanel {
        ChatPanel::new(Arc::new(CannedReply))
    }

    #[tokio::test(start_paused = true)]
    async fn test_hello_gets_canned_reply_after_delay() {
        let mut chat = panel();
        let started = Instant::now();

        chat.send("Hello").unwrap();
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[0].text, GREETING);
        assert_eq!(chat.messages()[1].text, "Hello");
        assert_eq!(chat.messages()[1].sender, Sender::User);
        assert_eq!(chat.state(), ChatState::AwaitingReply { pending: 1 });

        chat.next_reply().await.unwrap().unwrap();
        assert!(started.elapsed() >= REPLY_DELAY);
        assert_eq!(chat.messages().len(), 3);
        assert_eq!(chat.messages()[2].sender, Sender::Bot);
        assert_eq!(chat.messages()[2].text, CANNED_REPLY);
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_not_delivered_before_delay() {
        let mut chat = panel();
        chat.send("Hello").unwrap();

        time::advance(REPLY_DELAY - Duration::from_millis(1)).await;
        assert_eq!(chat.poll_replies(), 0);
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.pending_replies(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_stays_open_while_awaiting() {
        let mut chat = panel();
        chat.send("first").unwrap();
        chat.send("second").unwrap();
        assert_eq!(chat.state(), ChatState::AwaitingReply { pending: 2 });

        chat.next_reply().await.unwrap().unwrap();
        chat.next_reply().await.unwrap().unwrap();
        assert!(chat.next_reply().await.is_none());

        let senders: Vec<Sender> = chat.messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Bot, Sender::User, Sender::User, Sender::Bot, Sender::Bot]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_sees_conversation_at_send_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chat = ChatPanel::new(Arc::new(CountingReply(Arc::clone(&calls))));

        chat.send("Hello").unwrap();
        chat.next_reply().await.unwrap().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(chat.messages()[2].text, "seen 2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_reply() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chat = ChatPanel::new(Arc::new(CountingReply(Arc::clone(&calls))));

        chat.send("Hello").unwrap();
        chat.shutdown();
        time::advance(REPLY_DELAY * 3).await;

        assert_eq!(chat.pending_replies(), 0);
        assert!(chat.next_reply().await.is_none());
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_reply() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut chat = ChatPanel::new(Arc::new(CountingReply(Arc::clone(&calls))));
        chat.send("Hello").unwrap();
        drop(chat);

        time::advance(REPLY_DELAY * 3).await;
        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_replies_delivers_after_delay() {
        let mut chat = panel();
        chat.send("Hello").unwrap();

        time::advance(REPLY_DELAY).await;
        tokio::task::yield_now().await;

        assert_eq!(chat.poll_replies(), 1);
        assert_eq!(chat.messages().len(), 3);
        assert_eq!(chat.messages()[2].sender, Sender::Bot);
        assert_eq!(chat.messages()[2].text, CANNED_REPLY);
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_replies_skips_failed_inference() {
        let mut chat = ChatPanel::new(Arc::new(FailingReply));
        chat.send("Hello").unwrap();

        time::advance(REPLY_DELAY).await;
        tokio::task::yield_now().await;

        assert_eq!(chat.poll_replies(), 0);
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.pending_replies(), 0);
    }

    #[test]
    fn test_send_without_runtime_leaves_log_untouched() {
        let mut chat = panel();
        let err = chat.send("Hello").unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Service(ServiceError::Unavailable("scheduler"))
        ));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let mut chat = panel();
        let err = chat.send("   ").unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn test_send_input_clears_only_on_success() {
        let mut chat = panel();

        chat.set_input("  ");
        assert!(chat.send_input().is_err());
        assert_eq!(chat.input(), "  ");

        chat.set_input("Balance?");
        chat.send_input().unwrap();
        assert_eq!(chat.input(), "");
        assert_eq!(chat.messages()[1].text, "Balance?");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_inference_appends_nothing() {
        let mut chat = ChatPanel::new(Arc::new(FailingReply));
        chat.send("Hello").unwrap();

        let outcome = chat.next_reply().await.unwrap();
        assert!(matches!(outcome, Err(ConsoleError::Service(_))));
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.state(), ChatState::Idle);
    }
}
