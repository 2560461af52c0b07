// Messaging module - engine-to-observer notifications

pub mod channels;
pub mod notification;

pub use channels::{create_notification_channel, NotificationConsumer, NotificationProducer};
pub use notification::{Notification, NotificationCategory, NotificationLevel};
