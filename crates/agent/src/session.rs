//! The chat session: one conversation against injected stores.

use crate::context::{AssemblyInput, ContextAssembler, HistoryOrder};
use crate::formation::{FormationPolicy, form_memory};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use sydia_config::{AppConfig, SettingsSource};
use sydia_core::error::{Error, Result};
use sydia_core::history::HistoryStore;
use sydia_core::memory::{Memory, MemoryStore};
use sydia_core::message::{ChatTurn, Role};
use sydia_core::provider::ProviderConfig;
use sydia_providers::Gateway;
use tracing::{debug, info, warn};

/// Category attached to memories the user adds explicitly.
pub const MANUAL_CATEGORY: &str = "Manual";

/// A user turn that has been persisted and assembled, waiting for a reply.
///
/// Returned by [`ChatSession::prepare`] for callers that render streamed
/// deltas themselves.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    /// Chat provider settings captured when the turn was prepared.
    pub config: ProviderConfig,
    /// `[system] + history`, ready for the gateway.
    pub turns: Vec<ChatTurn>,
    /// Whether the settings ask for a streamed reply.
    pub stream: bool,
    user_text: String,
    turn_number: u64,
    settings: AppConfig,
}

impl PreparedTurn {
    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    /// 1-based count of user turns in this session.
    pub fn turn_number(&self) -> u64 {
        self.turn_number
    }
}

pub struct ChatSession {
    gateway: Gateway,
    history: Arc<dyn HistoryStore>,
    memories: Arc<dyn MemoryStore>,
    settings: Arc<dyn SettingsSource>,
    assembler: ContextAssembler,
    user_turns: AtomicU64,
}

impl ChatSession {
    pub fn new(
        gateway: Gateway,
        history: Arc<dyn HistoryStore>,
        memories: Arc<dyn MemoryStore>,
        settings: Arc<dyn SettingsSource>,
    ) -> Self {
        Self {
            gateway,
            history,
            memories,
            settings,
            assembler: ContextAssembler::new(),
            user_turns: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Run one full turn and return the reply text.
    ///
    /// On failure the error text is persisted as a system turn before the
    /// error is returned.
    pub async fn send_message(&self, text: &str) -> Result<String> {
        let prepared = self.prepare(text).await?;

        let reply = match self.complete(&prepared).await {
            Ok(reply) => reply,
            Err(e) => {
                self.record_error(&e).await?;
                return Err(e);
            }
        };

        self.record_reply(&prepared, &reply).await?;
        Ok(reply)
    }

    async fn complete(&self, prepared: &PreparedTurn) -> Result<String> {
        if prepared.stream {
            let stream = self.gateway.chat_stream(&prepared.config, &prepared.turns).await?;
            Ok(stream.collect_text().await?)
        } else {
            Ok(self.gateway.chat(&prepared.config, &prepared.turns).await?)
        }
    }

    /// Persist the user turn and assemble the context for it.
    pub async fn prepare(&self, text: &str) -> Result<PreparedTurn> {
        self.history.append(Role::User, text).await?;
        let turn_number = self.user_turns.fetch_add(1, Ordering::Relaxed) + 1;

        let settings = self.settings.current();
        let memories = self.memories.all().await?;
        let history = self.history.recent(settings.context_length).await?;

        let context = self.assembler.assemble(&AssemblyInput::from_settings(
            &settings,
            &memories,
            &history,
            HistoryOrder::NewestFirst,
        ));

        debug!(
            turn = turn_number,
            memories = context.metadata.memories_included,
            history = context.metadata.history_included,
            "Context assembled"
        );

        Ok(PreparedTurn {
            config: settings.chat.provider_config(),
            stream: settings.chat.stream_enabled,
            turns: context.into_turns(),
            user_text: text.to_string(),
            turn_number,
            settings,
        })
    }

    /// Persist the assistant reply and run memory formation.
    pub async fn record_reply(&self, prepared: &PreparedTurn, reply: &str) -> Result<()> {
        self.history.append(Role::Assistant, reply).await?;
        info!(turn = prepared.turn_number, chars = reply.len(), "Reply recorded");

        let policy = FormationPolicy::from_settings(&prepared.settings);
        if policy.is_candidate(prepared.turn_number, &prepared.user_text) {
            let embedding = prepared.settings.embedding.provider_config();
            form_memory(&self.gateway, self.memories.as_ref(), &embedding, &prepared.user_text).await;
        }
        Ok(())
    }

    /// Persist `Error: {message}` as a system turn.
    pub async fn record_error(&self, err: &Error) -> Result<()> {
        let message = match err {
            Error::Gateway(e) => e.to_string(),
            other => other.to_string(),
        };
        warn!(error = %message, "Chat turn failed");
        self.history.append(Role::System, &format!("Error: {message}")).await?;
        Ok(())
    }

    /// Store a memory the user asked for explicitly.
    pub async fn add_memory(&self, text: &str) -> Result<String> {
        let id = self
            .memories
            .add(Memory::new(text, 1.0, Some(MANUAL_CATEGORY.into())))
            .await?;
        Ok(id)
    }

    /// Start a fresh context. Earlier turns stay in history but are no
    /// longer sent.
    pub async fn reset_context(&self) -> Result<()> {
        self.history.append_reset_point().await?;
        info!("Context reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sydia_config::HttpConfig;
    use sydia_memory::{InMemoryHistory, InMemoryMemories};

    fn session(history: Arc<InMemoryHistory>, memories: Arc<InMemoryMemories>) -> ChatSession {
        let config = AppConfig {
            chat: sydia_config::ChatSettings {
                provider: "foo".into(),
                ..Default::default()
            },
            ..AppConfig::default()
        };
        ChatSession::new(
            Gateway::from_config(&HttpConfig::default()).unwrap(),
            history,
            memories,
            Arc::new(config),
        )
    }

    #[tokio::test]
    async fn failed_turn_records_error_as_system_turn() {
        let history = Arc::new(InMemoryHistory::new());
        let chat = session(history.clone(), Arc::new(InMemoryMemories::new()));

        let err = chat.send_message("hello").await.unwrap_err();
        assert!(matches!(err, Error::Gateway(_)));

        let recent = history.recent(2).await.unwrap();
        assert_eq!(recent[0].role, Role::System);
        assert_eq!(recent[0].content, "Error: Unsupported provider: foo");
        assert_eq!(recent[1].content, "hello");
    }

    #[tokio::test]
    async fn add_memory_is_manual_with_full_weight() {
        let memories = Arc::new(InMemoryMemories::new());
        let chat = session(Arc::new(InMemoryHistory::new()), memories.clone());

        chat.add_memory("The user is allergic to peanuts").await.unwrap();
        let all = memories.all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].weight, 1.0);
        assert_eq!(all[0].category.as_deref(), Some("Manual"));
        assert!(all[0].embedding.is_none());
    }

    #[tokio::test]
    async fn prepare_counts_user_turns_and_captures_settings() {
        let chat = session(Arc::new(InMemoryHistory::new()), Arc::new(InMemoryMemories::new()));
        let first = chat.prepare("one").await.unwrap();
        let second = chat.prepare("two").await.unwrap();
        assert_eq!(first.turn_number(), 1);
        assert_eq!(second.turn_number(), 2);
        assert_eq!(second.config.provider, "foo");

        // system + "one" + "two"
        assert_eq!(second.turns.len(), 3);
        assert_eq!(second.turns.last().unwrap().content, "two");
    }

    #[tokio::test]
    async fn reset_context_hides_earlier_turns() {
        let history = Arc::new(InMemoryHistory::new());
        let chat = session(history.clone(), Arc::new(InMemoryMemories::new()));
        chat.prepare("before reset").await.unwrap();
        chat.reset_context().await.unwrap();

        let prepared = chat.prepare("after reset").await.unwrap();
        assert_eq!(prepared.turns.len(), 2);
        assert_eq!(prepared.turns[1].content, "after reset");
        assert_eq!(history.len().await, 3);
    }
}
