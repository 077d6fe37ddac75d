use crate::error::AppError;
use crate::notify::{Notice, NoticeLevel, Notifier};
use tauri_winrt_notification::{Duration, Toast};

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let title = match notice.level {
            NoticeLevel::Error => "todoweb: error",
            NoticeLevel::Success => "todoweb",
        };

        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(title)
            .text1(&notice.message)
            .duration(Duration::Short)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
