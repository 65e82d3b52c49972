pub mod quote;
pub mod notifier;
pub mod keepalive;
pub mod monitor;
