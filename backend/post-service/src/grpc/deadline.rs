//! Inbound call deadline
//!
//! Clients announce their deadline in the `grpc-timeout` header as up to
//! eight digits followed by a unit: `H`ours, `M`inutes, `S`econds,
//! `m`illiseconds, `u` microseconds or `n`anoseconds.

use std::time::Duration;
use tonic::metadata::MetadataMap;

pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

const MAX_DIGITS: usize = 8;

/// Time left for this call, if the client set a deadline
pub fn remaining(metadata: &MetadataMap) -> Option<Duration> {
    metadata
        .get(GRPC_TIMEOUT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_grpc_timeout)
}

/// Parse a `grpc-timeout` value; `None` when it is not well formed
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 || !value.is_ascii() {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if digits.len() > MAX_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    let duration = match unit {
        "H" => Duration::from_secs(amount * 60 * 60),
        "M" => Duration::from_secs(amount * 60),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_grpc_timeout("1H"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_grpc_timeout("2M"), Some(Duration::from_secs(120)));
        assert_eq!(parse_grpc_timeout("30S"), Some(Duration::from_secs(30)));
        assert_eq!(parse_grpc_timeout("250m"), Some(Duration::from_millis(250)));
        assert_eq!(parse_grpc_timeout("1500u"), Some(Duration::from_micros(1500)));
        assert_eq!(parse_grpc_timeout("99999999n"), Some(Duration::from_nanos(99_999_999)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for value in ["", "S", "10", "10s", "10x", "-5S", "123456789S", "1.5S", "５S"] {
            assert_eq!(parse_grpc_timeout(value), None, "{value:?}");
        }
    }

    #[test]
    fn test_remaining_from_metadata() {
        let mut metadata = MetadataMap::new();
        assert_eq!(remaining(&metadata), None);

        metadata.insert(GRPC_TIMEOUT_HEADER, "750m".parse().unwrap());
        assert_eq!(remaining(&metadata), Some(Duration::from_millis(750)));
    }
}
