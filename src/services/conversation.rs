//! In-memory conversation history.
//!
//! The store is injected through `AppState`. Each conversation sits behind its
//! own async mutex, and a chat turn holds that lock from reading the history to
//! appending the reply, so two requests on one conversation cannot interleave.
//!
//! Ownership lives beside the mutex, not inside it, so checking who owns a
//! conversation never waits on someone else's turn. Each owner keeps at most
//! [`MAX_CONVERSATIONS_PER_OWNER`]; opening one more drops their oldest.
//!
//! Ids are `{owner}_conv_{n}` with `n` from a process-lifetime counter: they
//! are predictable and do not survive a restart.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

pub const MAX_TURNS: usize = 20;
pub const MAX_CONVERSATIONS_PER_OWNER: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    turns: VecDeque<ConversationTurn>,
}

impl Conversation {
    /// Appends, then drops from the front until the window fits.
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > MAX_TURNS {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }
}

struct Entry {
    owner: String,
    /// Counter value at open time; lower is older.
    opened: u64,
    conversation: Arc<Mutex<Conversation>>,
}

#[derive(Clone, Default)]
pub struct ConversationStore {
    conversations: Arc<RwLock<HashMap<String, Entry>>>,
    counter: Arc<AtomicU64>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a conversation seeded with the assistant's greeting, evicting
    /// the owner's oldest conversations beyond the per-owner cap.
    pub async fn open(&self, owner: &str, greeting: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("{owner}_conv_{n}");

        let mut conversation = Conversation::default();
        conversation.append(ConversationTurn::assistant(greeting));

        let mut conversations = self.conversations.write().await;
        let mut owned: Vec<(u64, String)> = conversations
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(id, entry)| (entry.opened, id.clone()))
            .collect();
        if owned.len() >= MAX_CONVERSATIONS_PER_OWNER {
            owned.sort_unstable();
            let excess = owned.len() + 1 - MAX_CONVERSATIONS_PER_OWNER;
            for (_, evicted) in owned.into_iter().take(excess) {
                conversations.remove(&evicted);
            }
        }

        conversations.insert(
            id.clone(),
            Entry {
                owner: owner.to_string(),
                opened: n,
                conversation: Arc::new(Mutex::new(conversation)),
            },
        );
        id
    }

    fn handle(entry: &Entry, owner: &str) -> Option<Arc<Mutex<Conversation>>> {
        (entry.owner == owner).then(|| Arc::clone(&entry.conversation))
    }

    /// Exclusive access to one conversation, or `None` when the id is unknown
    /// or belongs to someone else. Only waits on the owner's own turns.
    pub async fn lock(&self, id: &str, owner: &str) -> Option<OwnedMutexGuard<Conversation>> {
        let conversation = {
            let conversations = self.conversations.read().await;
            Self::handle(conversations.get(id)?, owner)?
        };
        Some(conversation.lock_owned().await)
    }

    pub async fn snapshot(&self, id: &str, owner: &str) -> Option<Vec<ConversationTurn>> {
        self.lock(id, owner).await.map(|c| c.turns())
    }

    pub async fn list_for(&self, owner: &str) -> HashMap<String, Vec<ConversationTurn>> {
        let entries: Vec<(String, Arc<Mutex<Conversation>>)> = self
            .conversations
            .read()
            .await
            .iter()
            .filter_map(|(id, entry)| Some((id.clone(), Self::handle(entry, owner)?)))
            .collect();

        let mut owned = HashMap::new();
        for (id, conversation) in entries {
            owned.insert(id, conversation.lock().await.turns());
        }
        owned
    }
}
