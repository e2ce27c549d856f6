//! HTTP Routes

pub mod events;
pub mod notifications;
pub mod services;
