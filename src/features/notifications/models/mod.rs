mod notification;

pub use notification::{NotificationWithContext, NOTIFICATION_SELECT};
