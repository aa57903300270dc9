pub mod backup;
pub mod feed_digest;
pub mod health;
pub mod log_alert;
