//! Role gate for protected commands.

use crate::errors::{Error, Result};

/// Grants access iff `required_role` is among `user_roles`.
///
/// A user outside any guild has no roles and is always denied.
///
/// # Errors
/// [`Error::InsufficientPrivilege`] when the role is missing.
pub fn authorize(user_roles: &[u64], required_role: u64) -> Result<()> {
    if user_roles.contains(&required_role) {
        Ok(())
    } else {
        Err(Error::InsufficientPrivilege {
            role_id: required_role,
        })
    }
}
