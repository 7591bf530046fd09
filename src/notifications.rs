//! Push notification capability
//!
//! Holds the device token, topic subscriptions, and message/token-refresh
//! handlers for the whole process. Nothing here talks to a platform push
//! service: a bridge feeds events in through [`NotificationHub::deliver`]
//! and [`NotificationHub::refresh_token`], and the rest of the app only sees
//! the [`PushCapability`] interface.
//!
//! [`NotificationHub::deliver`], [`NotificationHub::refresh_token`],
//! [`NotificationHub::subscribe_to_topic`] and [`global`] are the entry
//! points for that bridge and have no caller inside the app itself.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheManager};

/// Key under which the device token is persisted
pub const PUSH_TOKEN_KEY: &str = "push_token";

/// Errors raised by the notification hub
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid topic name: '{0}'")]
    InvalidTopic(String),

    #[error("Could not persist push token: {0}")]
    Storage(#[from] CacheError),
}

/// An incoming push message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushMessage {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: HashMap<String, String>,
}

/// Identifies a registered handler so it can be removed
pub type SubscriptionId = u64;

pub type MessageHandler = Arc<dyn Fn(&PushMessage) + Send + Sync>;
pub type TokenHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// What components may use from the notification subsystem
pub trait PushCapability: Send + Sync {
    /// Current device token, if one has been issued
    fn get_token(&self) -> Option<String>;
    /// Registers a handler for incoming messages
    fn on_message(&self, handler: MessageHandler) -> SubscriptionId;
    /// Registers a handler for token rotation
    fn on_token_refresh(&self, handler: TokenHandler) -> SubscriptionId;
    /// Removes a handler; returns whether it was registered
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct HubState {
    token: Option<String>,
    next_id: SubscriptionId,
    message_handlers: Vec<(SubscriptionId, MessageHandler)>,
    token_handlers: Vec<(SubscriptionId, TokenHandler)>,
    topics: BTreeSet<String>,
}

impl HubState {
    fn next_id(&mut self) -> SubscriptionId {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process notification hub
pub struct NotificationHub {
    store: Option<CacheManager>,
    state: Mutex<HubState>,
}

impl NotificationHub {
    /// Creates a hub, restoring a previously persisted token
    pub fn new(store: Option<CacheManager>) -> Self {
        let token = store.as_ref().and_then(|s| match s.get_item(PUSH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Could not read saved push token");
                None
            }
        });

        Self {
            store,
            state: Mutex::new(HubState {
                token,
                ..HubState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Dispatches a message to every registered handler
    ///
    /// Returns the number of handlers invoked.
    pub fn deliver(&self, message: &PushMessage) -> usize {
        let handlers: Vec<MessageHandler> = self
            .lock()
            .message_handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        debug!(title = ?message.title, handlers = handlers.len(), "Delivering push message");
        for handler in &handlers {
            handler(message);
        }
        handlers.len()
    }

    /// Stores a newly issued token and notifies refresh handlers
    pub fn refresh_token(&self, token: impl Into<String>) -> Result<(), NotificationError> {
        let token = token.into();
        if let Some(ref store) = self.store {
            store.set_item(PUSH_TOKEN_KEY, &token)?;
        }

        let handlers: Vec<TokenHandler> = {
            let mut state = self.lock();
            state.token = Some(token.clone());
            state.token_handlers.iter().map(|(_, h)| Arc::clone(h)).collect()
        };

        info!("Push token refreshed");
        for handler in &handlers {
            handler(&token);
        }
        Ok(())
    }

    /// Forgets the device token, locally and on disk
    pub fn delete_token(&self) -> Result<(), NotificationError> {
        if let Some(ref store) = self.store {
            store.remove_item(PUSH_TOKEN_KEY)?;
        }
        self.lock().token = None;
        info!("Push token deleted");
        Ok(())
    }

    /// Subscribes to a broadcast topic
    pub fn subscribe_to_topic(&self, topic: &str) -> Result<(), NotificationError> {
        validate_topic(topic)?;
        self.lock().topics.insert(topic.to_string());
        info!(topic, "Subscribed to topic");
        Ok(())
    }

    /// Unsubscribes from a topic; returns whether it was subscribed
    pub fn unsubscribe_from_topic(&self, topic: &str) -> bool {
        let removed = self.lock().topics.remove(topic);
        if removed {
            info!(topic, "Unsubscribed from topic");
        }
        removed
    }

    /// Topics currently subscribed, in sorted order
    pub fn topics(&self) -> Vec<String> {
        self.lock().topics.iter().cloned().collect()
    }

    /// Drops every handler and topic
    fn reset(&self) {
        let mut state = self.lock();
        state.message_handlers.clear();
        state.token_handlers.clear();
        state.topics.clear();
    }
}

impl PushCapability for NotificationHub {
    fn get_token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    fn on_message(&self, handler: MessageHandler) -> SubscriptionId {
        let mut state = self.lock();
        let id = state.next_id();
        state.message_handlers.push((id, handler));
        id
    }

    fn on_token_refresh(&self, handler: TokenHandler) -> SubscriptionId {
        let mut state = self.lock();
        let id = state.next_id();
        state.token_handlers.push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.lock();
        let before = state.message_handlers.len() + state.token_handlers.len();
        state.message_handlers.retain(|(hid, _)| *hid != id);
        state.token_handlers.retain(|(hid, _)| *hid != id);
        before != state.message_handlers.len() + state.token_handlers.len()
    }
}

/// Topic names follow the `[a-zA-Z0-9-_.~%]+` rule used by push providers
fn validate_topic(topic: &str) -> Result<(), NotificationError> {
    let valid = !topic.is_empty()
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'));
    if valid {
        Ok(())
    } else {
        Err(NotificationError::InvalidTopic(topic.to_string()))
    }
}

static GLOBAL_HUB: Mutex<Option<Arc<NotificationHub>>> = Mutex::new(None);

fn global_slot() -> MutexGuard<'static, Option<Arc<NotificationHub>>> {
    GLOBAL_HUB.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Installs the process-wide hub, returning the existing one if already set
pub fn init(store: Option<CacheManager>) -> Arc<NotificationHub> {
    let mut slot = global_slot();
    if let Some(hub) = slot.as_ref() {
        return Arc::clone(hub);
    }
    let hub = Arc::new(NotificationHub::new(store));
    info!(has_token = hub.get_token().is_some(), "Push notifications initialized");
    *slot = Some(Arc::clone(&hub));
    hub
}

/// The process-wide hub, if [`init`] has run
pub fn global() -> Option<Arc<dyn PushCapability>> {
    global_slot()
        .as_ref()
        .map(|hub| Arc::clone(hub) as Arc<dyn PushCapability>)
}

/// Removes the process-wide hub and all its handlers
pub fn teardown() {
    if let Some(hub) = global_slot().take() {
        hub.reset();
        info!("Push notifications torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn message(title: &str) -> PushMessage {
        PushMessage {
            title: Some(title.to_string()),
            ..PushMessage::default()
        }
    }

    #[test]
    fn test_new_hub_without_store_has_no_token() {
        let hub = NotificationHub::new(None);
        assert!(hub.get_token().is_none());
    }

    #[test]
    fn test_deliver_invokes_every_handler() {
        let hub = NotificationHub::new(None);
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let count = Arc::clone(&count);
            hub.on_message(Arc::new(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert_eq!(hub.deliver(&message("hello")), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_removes_handler() {
        let hub = NotificationHub::new(None);
        let id = hub.on_message(Arc::new(|_| {}));

        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        assert_eq!(hub.deliver(&message("nobody")), 0);
    }

    #[test]
    fn test_handler_may_reenter_hub() {
        let hub = Arc::new(NotificationHub::new(None));
        let inner = Arc::clone(&hub);
        hub.on_message(Arc::new(move |_| {
            let _ = inner.get_token();
        }));

        assert_eq!(hub.deliver(&message("reentrant")), 1);
    }

    #[test]
    fn test_refresh_token_notifies_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheManager::with_dir(temp_dir.path().to_path_buf());
        let hub = NotificationHub::new(Some(store.clone()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        hub.on_token_refresh(Arc::new(move |t| sink.lock().unwrap().push(t.to_string())));

        hub.refresh_token("device-abc").unwrap();

        assert_eq!(hub.get_token().as_deref(), Some("device-abc"));
        assert_eq!(*seen.lock().unwrap(), vec!["device-abc".to_string()]);
        assert_eq!(
            store.get_item(PUSH_TOKEN_KEY).unwrap().as_deref(),
            Some("device-abc")
        );

        let restored = NotificationHub::new(Some(store));
        assert_eq!(restored.get_token().as_deref(), Some("device-abc"));
    }

    #[test]
    fn test_delete_token() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheManager::with_dir(temp_dir.path().to_path_buf());
        let hub = NotificationHub::new(Some(store.clone()));
        hub.refresh_token("device-abc").unwrap();

        hub.delete_token().unwrap();

        assert!(hub.get_token().is_none());
        assert!(store.get_item(PUSH_TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn test_topic_subscriptions() {
        let hub = NotificationHub::new(None);

        hub.subscribe_to_topic("news").unwrap();
        hub.subscribe_to_topic("alerts").unwrap();
        assert_eq!(hub.topics(), vec!["alerts".to_string(), "news".to_string()]);

        assert!(hub.unsubscribe_from_topic("news"));
        assert!(!hub.unsubscribe_from_topic("news"));
        assert_eq!(hub.topics(), vec!["alerts".to_string()]);
    }

    #[test]
    fn test_invalid_topic_is_rejected() {
        let hub = NotificationHub::new(None);
        assert!(matches!(
            hub.subscribe_to_topic("bad topic"),
            Err(NotificationError::InvalidTopic(_))
        ));
        assert!(hub.subscribe_to_topic("").is_err());
        assert!(hub.topics().is_empty());
    }

    #[test]
    fn test_global_init_and_teardown() {
        let hub = init(None);
        let again = init(None);
        assert!(Arc::ptr_eq(&hub, &again));
        assert!(global().is_some());

        hub.on_message(Arc::new(|_| {}));
        teardown();

        assert!(global().is_none());
        assert_eq!(hub.deliver(&message("after teardown")), 0);
    }
}
