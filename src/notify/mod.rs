//! Outbound notification channels

pub mod desktop;
pub mod email;

use compact_str::CompactString;

pub use desktop::DesktopNotifier;
pub use email::EmailNotifier;

use crate::result::Result;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    /// A claim just succeeded
    Claimed,
    /// Reminder about a submission that was already assigned
    Assigned,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: CompactString,
    pub body: CompactString,
    /// Page the user should open to act on the notice
    pub url: Option<String>,
}

/// A channel that can deliver a [`Notice`] to the user.
///
/// Implementations may block; they are driven from the reporter thread.
pub trait Notifier: Send {
    fn channel(&self) -> &'static str;

    fn accepts(&self, _kind: NoticeKind) -> bool {
        true
    }

    fn notify(&self, notice: &Notice) -> Result<()>;
}
