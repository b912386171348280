use notify_rust::Notification;
use tracing::debug;

use super::{Notice, Notifier};
use crate::result::{BotError, Result};

#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    appname: &'static str,
    sound: &'static str,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self { appname: "reviewbot", sound: "Ping" }
    }
}

impl Notifier for DesktopNotifier {
    fn channel(&self) -> &'static str {
        "desktop"
    }

    fn notify(&self, notice: &Notice) -> Result<()> {
        let body = match &notice.url {
            Some(url) => format!("{}\n{url}", notice.body),
            None => notice.body.to_string(),
        };

        Notification::new()
            .appname(self.appname)
            .summary(&notice.title)
            .body(&body)
            .sound_name(self.sound)
            .show()
            .map_err(|e| BotError::notification_error(self.channel(), e))?;
        debug!(title = %notice.title, "Desktop notification shown");
        Ok(())
    }
}
