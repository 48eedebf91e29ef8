// Notifications surfaced to whatever front-end drives the session

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    fn new(level: NotificationLevel, message: String) -> Self {
        Self {
            level,
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn info(message: String) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn error(message: String) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        write!(f, "[{} {}] {}", self.timestamp.format("%H:%M:%S"), tag, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_levels() {
        let info = Notification::info("Recording started".to_string());
        let error = Notification::error("Disk full".to_string());

        assert_eq!(info.level, NotificationLevel::Info);
        assert_eq!(error.level, NotificationLevel::Error);
        assert_eq!(error.message, "Disk full");
    }

    #[test]
    fn test_display_includes_level_and_message() {
        let shown = Notification::error("Disk full".to_string()).to_string();
        assert!(shown.ends_with("error] Disk full"));
    }
}
