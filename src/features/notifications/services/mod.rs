mod notification_service;
mod notifier;

pub use notification_service::NotificationService;
pub use notifier::{notify, NewNotification};
