//! Local stand-in for the other chat participant

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::core::Message;
use crate::features::store::SharedStore;

/// What the console needs from a chat transport
#[async_trait]
pub trait MessagingBackend: Send + Sync {
    /// Send a message as the logged-in role
    async fn send(&self, text: &str) -> Result<Message>;

    /// The user is looking at the thread. Returns true if incoming messages
    /// will be marked read.
    async fn open_conversation(&self) -> Result<bool>;

    /// The user left the thread
    fn close_conversation(&self);

    fn is_counterpart_typing(&self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct SimulationTimings {
    /// Delay before a sent message shows as read
    pub read_receipt: Duration,
    /// How long the typing indicator stays up after a send
    pub typing_window: Duration,
    /// Delay before viewing the thread marks incoming messages read
    pub mark_read_on_view: Duration,
}

impl Default for SimulationTimings {
    fn default() -> Self {
        SimulationTimings {
            read_receipt: Duration::from_millis(1500),
            typing_window: Duration::from_millis(3500),
            mark_read_on_view: Duration::from_millis(800),
        }
    }
}

pub struct SimulatedCounterpart {
    store: SharedStore,
    timings: SimulationTimings,
    typing: Arc<AtomicBool>,
    typing_task: Mutex<Option<JoinHandle<()>>>,
    view_task: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatedCounterpart {
    pub fn new(store: SharedStore) -> Self {
        Self::with_timings(store, SimulationTimings::default())
    }

    pub fn with_timings(store: SharedStore, timings: SimulationTimings) -> Self {
        SimulatedCounterpart {
            store,
            timings,
            typing: Arc::new(AtomicBool::new(false)),
            typing_task: Mutex::new(None),
            view_task: Mutex::new(None),
        }
    }

    fn replace_task(slot: &Mutex<Option<JoinHandle<()>>>, task: Option<JoinHandle<()>>) {
        let mut slot = slot.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = task;
    }
}

#[async_trait]
impl MessagingBackend for SimulatedCounterpart {
    async fn send(&self, text: &str) -> Result<Message> {
        let message = {
            let mut store = self.store.lock().await;
            let role = store
                .session()
                .map(|s| s.role)
                .ok_or_else(|| anyhow!("Not logged in"))?;
            store.send_message(text, role).await?
        };
        debug!("Sent message {} as {}", message.id, message.sender);

        let store = Arc::clone(&self.store);
        let message_id = message.id.clone();
        let delay = self.timings.read_receipt;
        tokio::spawn(async move {
            sleep(delay).await;
            let mut store = store.lock().await;
            if let Err(e) = store.mark_message_read(&message_id).await {
                warn!("Failed to mark message {message_id} read: {e}");
            }
        });

        self.typing.store(true, Ordering::SeqCst);
        let typing = Arc::clone(&self.typing);
        let window = self.timings.typing_window;
        let task = tokio::spawn(async move {
            sleep(window).await;
            typing.store(false, Ordering::SeqCst);
        });
        Self::replace_task(&self.typing_task, Some(task));

        Ok(message)
    }

    async fn open_conversation(&self) -> Result<bool> {
        let role = {
            let store = self.store.lock().await;
            let role = store
                .session()
                .map(|s| s.role)
                .ok_or_else(|| anyhow!("Not logged in"))?;
            if store.state().unread_count(role) == 0 {
                Self::replace_task(&self.view_task, None);
                return Ok(false);
            }
            role
        };

        let store = Arc::clone(&self.store);
        let delay = self.timings.mark_read_on_view;
        let task = tokio::spawn(async move {
            sleep(delay).await;
            let mut store = store.lock().await;
            match store.mark_incoming_read(role).await {
                Ok(count) => debug!("Marked {count} incoming message(s) read"),
                Err(e) => warn!("Failed to mark incoming messages read: {e}"),
            }
        });
        Self::replace_task(&self.view_task, Some(task));
        Ok(true)
    }

    fn close_conversation(&self) {
        Self::replace_task(&self.view_task, None);
    }

    fn is_counterpart_typing(&self) -> bool {
        self.typing.load(Ordering::SeqCst)
    }
}

impl Drop for SimulatedCounterpart {
    fn drop(&mut self) {
        Self::replace_task(&self.typing_task, None);
        Self::replace_task(&self.view_task, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UserRole;
    use crate::features::store::{MemoryStorage, PatientStore};

    async fn shared_store(role: UserRole) -> SharedStore {
        let mut store = PatientStore::new(Arc::new(MemoryStorage::new()));
        store.login("MEDIMATE-JANE-1234", role).await.unwrap();
        store.into_shared()
    }

    async fn is_read(store: &SharedStore, id: &str) -> bool {
        let store = store.lock().await;
        store
            .state()
            .messages
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.read)
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_sent_message_read_after_delay() {
        let store = shared_store(UserRole::Caretaker).await;
        let chat = SimulatedCounterpart::new(store.clone());

        let sent = chat.send("Lunch done, meds taken").await.unwrap();
        assert_eq!(sent.sender, UserRole::Caretaker);
        assert!(!is_read(&store, &sent.id).await);

        sleep(Duration::from_millis(1499)).await;
        assert!(!is_read(&store, &sent.id).await);

        sleep(Duration::from_millis(2)).await;
        assert!(is_read(&store, &sent.id).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_indicator_window() {
        let store = shared_store(UserRole::Family).await;
        let chat = SimulatedCounterpart::new(store);
        assert!(!chat.is_counterpart_typing());

        chat.send("How was the appointment?").await.unwrap();
        assert!(chat.is_counterpart_typing());

        sleep(Duration::from_millis(3000)).await;
        assert!(chat.is_counterpart_typing());

        sleep(Duration::from_millis(501)).await;
        assert!(!chat.is_counterpart_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_restarts_typing_window() {
        let store = shared_store(UserRole::Family).await;
        let chat = SimulatedCounterpart::new(store);

        chat.send("First").await.unwrap();
        sleep(Duration::from_millis(3000)).await;
        chat.send("Second").await.unwrap();

        // The first window would have closed here
        sleep(Duration::from_millis(1000)).await;
        assert!(chat.is_counterpart_typing());

        sleep(Duration::from_millis(2501)).await;
        assert!(!chat.is_counterpart_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewing_marks_incoming_read() {
        let store = shared_store(UserRole::Caretaker).await;
        let chat = SimulatedCounterpart::new(store.clone());

        assert!(chat.open_conversation().await.unwrap());
        assert_eq!(store.lock().await.state().unread_count(UserRole::Caretaker), 1);

        sleep(Duration::from_millis(801)).await;
        assert_eq!(store.lock().await.state().unread_count(UserRole::Caretaker), 0);

        assert!(!chat.open_conversation().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_before_delay_keeps_unread() {
        let store = shared_store(UserRole::Caretaker).await;
        let chat = SimulatedCounterpart::new(store.clone());

        chat.open_conversation().await.unwrap();
        sleep(Duration::from_millis(400)).await;
        chat.close_conversation();

        sleep(Duration::from_secs(5)).await;
        assert_eq!(store.lock().await.state().unread_count(UserRole::Caretaker), 1);
    }

    #[tokio::test]
    async fn test_send_requires_login() {
        let store = PatientStore::new(Arc::new(MemoryStorage::new())).into_shared();
        let chat = SimulatedCounterpart::new(store);
        assert!(chat.send("hello").await.is_err());
        assert!(chat.open_conversation().await.is_err());
    }
}
