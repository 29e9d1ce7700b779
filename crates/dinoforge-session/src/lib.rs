//! Session bookkeeping for Dinoforge.
//!
//! Two registries live here, both safe to share across tasks:
//!
//! 1. [`SessionRegistry`]: code → lock-guarded aggregate (a match or a
//!    lobby). One lock per aggregate, no process-wide lock.
//! 2. [`CallbackRegistry`]: code → player → [`Subscriber`], with
//!    broadcast-and-prune delivery.
//!
//! # How it fits in the stack
//!
//! ```text
//! Lobby / Match layers (above)  ← own the aggregates and decide what to push
//!     ↕
//! Session layer (this crate)     ← stores them and delivers events
//!     ↕
//! Protocol (below)               ← PlayerId, Recipient, event payloads
//! ```

mod error;
mod registry;
mod subscriber;

pub use error::{DeliveryError, SessionError};
pub use registry::{SessionRegistry, SharedSession};
pub use subscriber::{CallbackRegistry, Subscriber, SubscriberHandle, channel_subscriber};
