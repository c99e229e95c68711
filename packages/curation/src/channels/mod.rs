//! Delivery channel implementations.
//!
//! Available channels:
//! - `TelegramChannel` - Telegram bot chat (requires `telegram` feature)

#[cfg(feature = "telegram")]
mod telegram;

#[cfg(feature = "telegram")]
pub use self::telegram::TelegramChannel;
