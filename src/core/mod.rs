//! Core logic - framework-agnostic pieces used by the Discord commands.

/// Role membership check gating protected commands
pub mod authorization;
/// Time source abstraction
pub mod clock;
/// PayPal credential session and token lifecycle
pub mod credentials;
/// PayPal endpoints and wire types
pub mod paypal;
/// Discord timestamp formatting
pub mod timestamp;
