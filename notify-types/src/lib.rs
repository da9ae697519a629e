//! # notify-types
//!
//! Wire format types for the notify-sync notification engine.
//!
//! This crate provides the foundational types used across all notify-sync
//! crates:
//! - [`NotificationId`], [`SubscriptionId`] - Identity types
//! - [`Notification`] - The pushed/fetched notification record
//! - [`SubscribeFrame`] - The one client-to-server channel frame
//! - [`WireError`] - Codec error type

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod frames;
mod ids;
mod notification;

pub use error::WireError;
pub use frames::SubscribeFrame;
pub use ids::{NotificationId, SubscriptionId};
pub use notification::Notification;
