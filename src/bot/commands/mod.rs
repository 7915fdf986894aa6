//! Discord command implementations organized by category.

/// PayPal invoice command
pub mod invoice;

/// Time utility commands
pub mod time;

// Export commands
pub use invoice::*;
pub use time::*;
