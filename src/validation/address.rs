use std::fmt;

use crate::core::constants::{error_messages, schemes};

/// Reason an address was rejected before probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAddress {
    /// Nothing to probe
    Empty,
    /// Anything other than `http://` or `https://`
    UnsupportedScheme,
    /// Scheme only, e.g. `http://`
    MissingHost,
}

impl fmt::Display for InvalidAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty address"),
            Self::UnsupportedScheme => write!(f, "{}", error_messages::ONLY_HTTP_ALLOWED),
            Self::MissingHost => write!(f, "nothing follows the scheme"),
        }
    }
}

impl std::error::Error for InvalidAddress {}

/// Check an address and say why it is rejected.
pub fn check_address(address: &str) -> Result<(), InvalidAddress> {
    if address.is_empty() {
        return Err(InvalidAddress::Empty);
    }

    let rest = address
        .strip_prefix(schemes::HTTP)
        .or_else(|| address.strip_prefix(schemes::HTTPS))
        .ok_or(InvalidAddress::UnsupportedScheme)?;

    if rest.is_empty() {
        return Err(InvalidAddress::MissingHost);
    }

    Ok(())
}

/// Returns true for `http://` or `https://` followed by at least one character.
///
/// Pure and total: never panics, whatever the input.
pub fn is_valid_address(address: &str) -> bool {
    check_address(address).is_ok()
}
