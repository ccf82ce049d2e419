pub mod error_reason;
pub mod notification;

pub use error_reason::ErrorReason;
pub use notification::{DeliveryStatus, Notification, NotificationContent, PushResponse, Target};
