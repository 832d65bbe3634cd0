//! User-facing notifications raised by `PostsService::submit_post`.

use std::fmt;

use tracing::{info, warn};

/// Outcome of a post submission, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    PostCreated,
    PostFailed,
}

impl Notification {
    pub fn message(&self) -> &'static str {
        match self {
            Notification::PostCreated => "Post created successfully!",
            Notification::PostFailed => {
                "Error creating post. Please check the console for details."
            }
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Delivers notifications to whatever surface the host application has.
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Emits notifications as log events. Default for headless callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::PostCreated => info!("{notification}"),
            Notification::PostFailed => warn!("{notification}"),
        }
    }
}
