use crate::error::AppError;
use crate::notify::{Notice, NoticeLevel, Notifier};
use notify_rust::{Notification, Timeout};

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let summary = match notice.level {
            NoticeLevel::Error => "todoweb: error",
            NoticeLevel::Success => "todoweb",
        };
        let millis = notice.level.display_duration().as_millis() as u32;

        Notification::new()
            .summary(summary)
            .body(&notice.message)
            .timeout(Timeout::Milliseconds(millis))
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
