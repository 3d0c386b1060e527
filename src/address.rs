//! Shipping address parsing.

use serde::Serialize;
use thiserror::Error;

/// A `street, city, STATE ZIP` address split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("expected 'street, city, STATE ZIP', found {0} comma-separated segment(s)")]
    TooFewSegments(usize),
    #[error("address has an empty city")]
    EmptyCity,
    #[error("address has an empty state")]
    EmptyState,
}

/// Splits a shipping address on commas.
///
/// The city is the second segment and the state is the first whitespace
/// token of the third; whatever follows the state is the zip. Segments past
/// the third are ignored.
pub fn parse_address(raw: &str) -> Result<ShippingAddress, AddressError> {
    let segments: Vec<&str> = raw.split(',').collect();
    if segments.len() < 3 {
        return Err(AddressError::TooFewSegments(segments.len()));
    }

    let city = segments[1].trim();
    if city.is_empty() {
        return Err(AddressError::EmptyCity);
    }

    let mut tail = segments[2].split_whitespace();
    let state = tail.next().ok_or(AddressError::EmptyState)?;
    let zip = tail.collect::<Vec<_>>().join(" ");

    Ok(ShippingAddress {
        street: segments[0].trim().to_string(),
        city: city.to_string(),
        state: state.to_string(),
        zip,
    })
}
