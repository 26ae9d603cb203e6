//! # Preview Bridge
//!
//! Keeps the embedded preview surface in step with the draft.
//!
//! ```text
//!  authoring session                         preview surface
//! ┌──────────────────┐  contentUpdate   ┌──────────────────┐
//! │  PreviewBridge   │ ───────────────→ │  PreviewMirror   │
//! │                  │  scrollToSection │                  │
//! └──────────────────┘ ───────────────→ └──────────────────┘
//! ```
//!
//! The channel is one-way and best effort: nothing is acknowledged, send
//! failures are logged and dropped, and only the latest content matters.
//!
//! ## Navigation
//!
//! The bridge remembers the preview's base address (the address without
//! its `#fragment`). Changing the base address means the surface reloads
//! and content pushes are held until it reports [`PreviewBridge::mark_loaded`].
//! Changing only the fragment never reloads; it schedules a
//! `scrollToSection` after a short delay so the surface can finish layout.
//! Inside a tokio runtime the bridge spawns a timer task that sends the
//! scroll by itself. [`PreviewBridge::flush_due`] and
//! [`PreviewBridge::settle`] deliver it early or wait for it; either way
//! a scheduled scroll is sent at most once.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;

pub const DEFAULT_SCROLL_DELAY: Duration = Duration::from_millis(100);

/// Messages understood by the preview surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PreviewMessage {
    ContentUpdate {
        content: Value,
    },
    #[serde(rename_all = "camelCase")]
    ScrollToSection {
        section_id: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Preview surface is not listening")]
    Closed,

    #[error("Preview channel is full")]
    Full,
}

/// Outbound side of the cross-frame channel
pub trait PreviewChannel: Send + Sync {
    fn post(&self, message: &PreviewMessage) -> Result<(), ChannelError>;
}

/// Bounded in-process channel to a preview surface
#[derive(Debug, Clone)]
pub struct MpscPreviewChannel {
    tx: mpsc::Sender<PreviewMessage>,
}

impl PreviewChannel for MpscPreviewChannel {
    fn post(&self, message: &PreviewMessage) -> Result<(), ChannelError> {
        self.tx.try_send(message.clone()).map_err(|e| match e {
            TrySendError::Full(_) => ChannelError::Full,
            TrySendError::Closed(_) => ChannelError::Closed,
        })
    }
}

/// Inbound side, held by the preview surface
#[derive(Debug)]
pub struct PreviewReceiver {
    rx: mpsc::Receiver<PreviewMessage>,
}

impl PreviewReceiver {
    pub async fn recv(&mut self) -> Option<PreviewMessage> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<PreviewMessage> {
        self.rx.try_recv().ok()
    }

    pub fn into_stream(self) -> ReceiverStream<PreviewMessage> {
        ReceiverStream::new(self.rx)
    }
}

pub fn preview_channel(capacity: usize) -> (MpscPreviewChannel, PreviewReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (MpscPreviewChannel { tx }, PreviewReceiver { rx })
}

/// What a navigation request means for the preview surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Base address changed, the surface must load the new page
    Reload,
    /// Only the fragment changed, a scroll is scheduled
    Scroll { section_id: String },
    /// Same page, no fragment
    Unchanged,
}

#[derive(Debug)]
struct PendingScroll {
    section_id: String,
    due: Instant,
    /// Set by whoever sends the scroll first
    sent: Arc<AtomicBool>,
    timer: Option<JoinHandle<bool>>,
}

impl PendingScroll {
    fn deliver(&self, channel: Option<&dyn PreviewChannel>) -> bool {
        if self.sent.swap(true, Ordering::AcqRel) {
            return false;
        }
        send(
            channel,
            PreviewMessage::ScrollToSection {
                section_id: self.section_id.clone(),
            },
        )
    }
}

impl Drop for PendingScroll {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

pub struct PreviewBridge {
    channel: Option<Arc<dyn PreviewChannel>>,
    loaded: bool,
    base_address: Option<String>,
    pending_scroll: Option<PendingScroll>,
    scroll_delay: Duration,
}

impl PreviewBridge {
    pub fn new(scroll_delay: Duration) -> Self {
        Self {
            channel: None,
            loaded: false,
            base_address: None,
            pending_scroll: None,
            scroll_delay,
        }
    }

    /// Connect a preview surface; pushes wait until it reports loaded
    pub fn attach(&mut self, channel: impl PreviewChannel + 'static) {
        self.channel = Some(Arc::new(channel));
        self.loaded = false;
    }

    pub fn detach(&mut self) {
        self.channel = None;
        self.loaded = false;
        self.pending_scroll = None;
    }

    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// A reload was requested and the surface has not reported back yet
    pub fn is_reloading(&self) -> bool {
        self.base_address.is_some() && !self.loaded
    }

    pub fn base_address(&self) -> Option<&str> {
        self.base_address.as_deref()
    }

    /// Section of a scheduled scroll that has not been sent yet
    pub fn pending_scroll(&self) -> Option<&str> {
        self.pending_scroll
            .as_ref()
            .filter(|p| !p.sent.load(Ordering::Acquire))
            .map(|p| p.section_id.as_str())
    }

    /// The surface finished loading: start pushing, beginning with `content`
    pub fn mark_loaded(&mut self, content: &Value) {
        self.loaded = true;
        self.push_content(content);
    }

    /// Send the current draft; returns whether a message went out
    pub fn push_content(&self, content: &Value) -> bool {
        if !self.loaded {
            tracing::debug!("preview not loaded yet, skipping content push");
            return false;
        }
        self.post(PreviewMessage::ContentUpdate {
            content: content.clone(),
        })
    }

    /// Point the preview at `address` (path plus optional `#section`)
    pub fn navigate(&mut self, address: &str) -> Navigation {
        let (base, fragment) = split_address(address);

        if self.base_address.as_deref() != Some(base) {
            tracing::debug!(from = ?self.base_address, to = base, "preview reload");
            self.base_address = Some(base.to_string());
            self.loaded = false;
            self.pending_scroll = None;
            return Navigation::Reload;
        }

        match fragment {
            Some(section_id) if !section_id.is_empty() => {
                self.schedule_scroll(section_id);
                Navigation::Scroll {
                    section_id: section_id.to_string(),
                }
            }
            _ => Navigation::Unchanged,
        }
    }

    /// Replaces any earlier scroll that has not gone out yet
    fn schedule_scroll(&mut self, section_id: &str) {
        let mut pending = PendingScroll {
            section_id: section_id.to_string(),
            due: Instant::now() + self.scroll_delay,
            sent: Arc::new(AtomicBool::new(false)),
            timer: None,
        };

        match (tokio::runtime::Handle::try_current(), &self.channel) {
            (Ok(runtime), Some(channel)) => {
                let channel = Arc::clone(channel);
                let sent = Arc::clone(&pending.sent);
                let section_id = pending.section_id.clone();
                let due = pending.due;

                pending.timer = Some(runtime.spawn(async move {
                    tokio::time::sleep_until(due).await;
                    if sent.swap(true, Ordering::AcqRel) {
                        return false;
                    }
                    send(
                        Some(channel.as_ref()),
                        PreviewMessage::ScrollToSection { section_id },
                    )
                }));
            }
            _ => tracing::debug!(section_id, "no runtime or preview, scroll waits for a flush"),
        }

        self.pending_scroll = Some(pending);
    }

    /// Send the scheduled scroll now if its delay has elapsed by `now`
    pub fn flush_due(&mut self, now: Instant) -> bool {
        match &self.pending_scroll {
            Some(pending) if pending.due <= now => {}
            _ => return false,
        }

        match self.pending_scroll.take() {
            Some(pending) => pending.deliver(self.channel.as_deref()),
            None => false,
        }
    }

    /// Wait until the scheduled scroll has gone out; returns whether it
    /// reached the channel
    pub async fn settle(&mut self) -> bool {
        let Some(mut pending) = self.pending_scroll.take() else {
            return false;
        };

        match pending.timer.take() {
            Some(timer) => timer.await.unwrap_or(false),
            None => {
                tokio::time::sleep_until(pending.due).await;
                pending.deliver(self.channel.as_deref())
            }
        }
    }

    fn post(&self, message: PreviewMessage) -> bool {
        send(self.channel.as_deref(), message)
    }
}

fn send(channel: Option<&dyn PreviewChannel>, message: PreviewMessage) -> bool {
    let Some(channel) = channel else {
        tracing::debug!("no preview attached, dropping message");
        return false;
    };

    match channel.post(&message) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%err, "preview message dropped");
            false
        }
    }
}

impl Default for PreviewBridge {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_DELAY)
    }
}

impl std::fmt::Debug for PreviewBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewBridge")
            .field("attached", &self.channel.is_some())
            .field("loaded", &self.loaded)
            .field("base_address", &self.base_address)
            .field("pending_scroll", &self.pending_scroll())
            .finish()
    }
}

fn split_address(address: &str) -> (&str, Option<&str>) {
    match address.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (address, None),
    }
}

/// Preview-side view of the session, rebuilt from received messages
#[derive(Debug, Default, Clone)]
pub struct PreviewMirror {
    content: Option<Value>,
    scrolled_to: Option<String>,
    updates: u64,
}

impl PreviewMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, message: PreviewMessage) {
        match message {
            PreviewMessage::ContentUpdate { content } => {
                self.content = Some(content);
                self.updates += 1;
            }
            PreviewMessage::ScrollToSection { section_id } => {
                self.scrolled_to = Some(section_id);
            }
        }
    }

    /// Apply everything already waiting in `receiver`
    pub fn drain(&mut self, receiver: &mut PreviewReceiver) -> usize {
        let mut applied = 0;
        while let Some(message) = receiver.try_recv() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    pub fn scrolled_to(&self) -> Option<&str> {
        self.scrolled_to.as_deref()
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingChannel;

    impl PreviewChannel for FailingChannel {
        fn post(&self, _message: &PreviewMessage) -> Result<(), ChannelError> {
            Err(ChannelError::Closed)
        }
    }

    #[test]
    fn test_message_wire_format() {
        let update = PreviewMessage::ContentUpdate { content: json!({"a": 1}) };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"type": "contentUpdate", "content": {"a": 1}})
        );

        let scroll = PreviewMessage::ScrollToSection { section_id: "footer".into() };
        assert_eq!(
            serde_json::to_value(&scroll).unwrap(),
            json!({"type": "scrollToSection", "sectionId": "footer"})
        );
    }

    #[tokio::test]
    async fn test_push_before_load_is_a_noop() {
        let (channel, mut receiver) = preview_channel(8);
        let mut bridge = PreviewBridge::default();
        bridge.attach(channel);

        assert!(!bridge.push_content(&json!({"v": 1})));
        assert!(receiver.try_recv().is_none());

        bridge.mark_loaded(&json!({"v": 2}));
        assert!(bridge.push_content(&json!({"v": 3})));

        let mut mirror = PreviewMirror::new();
        assert_eq!(mirror.drain(&mut receiver), 2);
        assert_eq!(mirror.content(), Some(&json!({"v": 3})));
        assert_eq!(mirror.updates(), 2);
    }

    #[test]
    fn test_push_without_channel_is_a_noop() {
        let mut bridge = PreviewBridge::default();
        bridge.mark_loaded(&json!({}));
        assert!(!bridge.push_content(&json!({})));
    }

    #[test]
    fn test_channel_errors_are_swallowed() {
        let mut bridge = PreviewBridge::default();
        bridge.attach(FailingChannel);
        bridge.mark_loaded(&json!({}));
        assert!(!bridge.push_content(&json!({"v": 1})));
    }

    #[tokio::test]
    async fn test_closed_receiver_is_swallowed() {
        let (channel, receiver) = preview_channel(1);
        drop(receiver);
        let mut bridge = PreviewBridge::default();
        bridge.attach(channel);
        bridge.mark_loaded(&json!({}));
        assert!(!bridge.push_content(&json!({})));
    }

    #[tokio::test]
    async fn test_base_address_change_reloads() {
        let mut bridge = PreviewBridge::default();

        assert_eq!(bridge.navigate("/blog#intro"), Navigation::Reload);
        assert!(bridge.is_reloading());
        assert_eq!(bridge.pending_scroll(), None);

        bridge.mark_loaded(&json!({}));
        assert!(!bridge.is_reloading());

        assert_eq!(bridge.navigate("/about"), Navigation::Reload);
        assert!(bridge.is_reloading());
        assert_eq!(bridge.base_address(), Some("/about"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fragment_only_navigation_scrolls() {
        let (channel, mut receiver) = preview_channel(8);
        let mut bridge = PreviewBridge::new(Duration::from_millis(100));
        bridge.attach(channel);

        bridge.navigate("/blog#intro");
        bridge.mark_loaded(&json!({}));
        let _ = receiver.try_recv();

        let navigation = bridge.navigate("/blog#footer");
        assert_eq!(navigation, Navigation::Scroll { section_id: "footer".into() });
        assert!(!bridge.is_reloading());
        assert_eq!(bridge.pending_scroll(), Some("footer"));

        // Not due yet
        assert!(!bridge.flush_due(Instant::now()));
        assert!(receiver.try_recv().is_none());

        assert!(bridge.settle().await);
        assert_eq!(
            receiver.try_recv(),
            Some(PreviewMessage::ScrollToSection { section_id: "footer".into() })
        );
        assert_eq!(bridge.pending_scroll(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_scroll_sends_itself() {
        let (channel, mut receiver) = preview_channel(8);
        let mut bridge = PreviewBridge::new(Duration::from_millis(100));
        bridge.attach(channel);
        bridge.navigate("/");
        bridge.mark_loaded(&json!({}));
        let _ = receiver.try_recv();

        let start = Instant::now();
        bridge.navigate("/#reviews");

        assert_eq!(
            receiver.recv().await,
            Some(PreviewMessage::ScrollToSection { section_id: "reviews".into() })
        );
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(bridge.pending_scroll(), None);

        // Already delivered by the timer
        assert!(!bridge.flush_due(Instant::now()));
        assert!(receiver.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_scroll_replaces_scheduled_one() {
        let (channel, mut receiver) = preview_channel(8);
        let mut bridge = PreviewBridge::new(Duration::from_millis(100));
        bridge.attach(channel);
        bridge.navigate("/");
        bridge.mark_loaded(&json!({}));
        let _ = receiver.try_recv();

        bridge.navigate("/#hero");
        bridge.navigate("/#contact");
        tokio::time::sleep(Duration::from_millis(250)).await;

        let mut mirror = PreviewMirror::new();
        assert_eq!(mirror.drain(&mut receiver), 1);
        assert_eq!(mirror.scrolled_to(), Some("contact"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_cancels_scheduled_scroll() {
        let (channel, mut receiver) = preview_channel(8);
        let mut bridge = PreviewBridge::new(Duration::from_millis(100));
        bridge.attach(channel);
        bridge.navigate("/");
        bridge.mark_loaded(&json!({}));
        let _ = receiver.try_recv();

        bridge.navigate("/#hero");
        assert_eq!(bridge.navigate("/blog"), Navigation::Reload);
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_scroll_without_runtime_waits_for_flush() {
        let (channel, mut receiver) = preview_channel(8);
        let mut bridge = PreviewBridge::new(Duration::ZERO);
        bridge.attach(channel);
        bridge.navigate("/");
        bridge.mark_loaded(&json!({}));
        let _ = receiver.try_recv();

        bridge.navigate("/#hero");
        assert_eq!(bridge.pending_scroll(), Some("hero"));
        assert!(bridge.flush_due(Instant::now()));
        assert_eq!(
            receiver.try_recv(),
            Some(PreviewMessage::ScrollToSection { section_id: "hero".into() })
        );
    }

    #[tokio::test]
    async fn test_same_page_without_fragment_is_unchanged() {
        let mut bridge = PreviewBridge::default();
        bridge.navigate("/blog");
        bridge.mark_loaded(&json!({}));

        assert_eq!(bridge.navigate("/blog"), Navigation::Unchanged);
        assert_eq!(bridge.navigate("/blog#"), Navigation::Unchanged);
        assert!(!bridge.settle().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mirror_tracks_scroll_target() {
        let (channel, mut receiver) = preview_channel(8);
        let mut bridge = PreviewBridge::new(Duration::from_millis(50));
        bridge.attach(channel);
        bridge.navigate("/");
        bridge.mark_loaded(&json!({"hero": {}}));

        bridge.navigate("/#programs");
        bridge.settle().await;

        let mut mirror = PreviewMirror::new();
        mirror.drain(&mut receiver);
        assert_eq!(mirror.scrolled_to(), Some("programs"));
        assert_eq!(mirror.content(), Some(&json!({"hero": {}})));
    }
}
