//! Toast notification channel.
//!
//! This module provides the `Notifier`, a clonable handle that publishes
//! short user-facing messages on a watch channel. Consumers subscribe and
//! render however they like; the channel auto-dismisses after a few seconds.
//!
//! Reads are synchronous (`state()`), change notification is asynchronous
//! (`subscribe()` + `changed()`).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How long a toast stays visible before auto-dismissing
const AUTO_DISMISS_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    Error,
    Success,
    #[default]
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToastState {
    pub message: String,
    pub kind: ToastKind,
    pub visible: bool,
}

/// Clonable toast publisher. All clones share one channel and one pending
/// dismiss timer; showing a new toast replaces the previous timer.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: watch::Sender<ToastState>,
    dismiss_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ToastState::default());
        Self {
            tx,
            dismiss_task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Error);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Success);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Info);
    }

    pub fn show(&self, message: impl Into<String>, kind: ToastKind) {
        self.tx.send_replace(ToastState {
            message: message.into(),
            kind,
            visible: true,
        });

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(AUTO_DISMISS_SECS)).await;
            tx.send_replace(ToastState::default());
        });

        let mut slot = self.dismiss_task.lock().unwrap();
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    pub fn dismiss(&self) {
        if let Some(pending) = self.dismiss_task.lock().unwrap().take() {
            pending.abort();
        }
        self.tx.send_replace(ToastState::default());
    }

    /// Current toast, synchronously.
    pub fn state(&self) -> ToastState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ToastState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_show_and_dismiss() {
        let notifier = Notifier::new();
        notifier.error("Falha ao carregar");

        let state = notifier.state();
        assert!(state.visible);
        assert_eq!(state.kind, ToastKind::Error);
        assert_eq!(state.message, "Falha ao carregar");

        notifier.dismiss();
        assert!(!notifier.state().visible);
    }

    #[tokio::test]
    async fn test_new_toast_replaces_previous() {
        let notifier = Notifier::new();
        notifier.info("primeiro");
        notifier.success("segundo");

        let state = notifier.state();
        assert_eq!(state.message, "segundo");
        assert_eq!(state.kind, ToastKind::Success);
    }

    #[tokio::test]
    async fn test_subscribers_observe_changes() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.info("oi");
        rx.changed().await.unwrap();
        assert!(rx.borrow().visible);
    }
}
