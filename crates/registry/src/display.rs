//! Presentation helpers for records and form input

use crate::error::{RegistryError, Result};
use crate::types::DocumentRecord;
use chrono::{DateTime, NaiveDate, Utc};

pub const PINATA_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs/";

pub const PINATA_DASHBOARD_URL: &str = "https://app.pinata.cloud/ipfs/files";

/// Parse deadline form input into unix seconds
///
/// Empty input means "no deadline" and yields 0. Accepts a calendar date
/// (`YYYY-MM-DD`, midnight UTC), an RFC 3339 timestamp, or plain unix seconds.
pub fn parse_deadline(input: &str) -> Result<u64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let seconds = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        return u64::try_from(seconds).map_err(|_| RegistryError::InvalidDeadline(input.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return u64::try_from(dt.timestamp()).map_err(|_| RegistryError::InvalidDeadline(input.to_string()));
    }

    input
        .parse::<u64>()
        .map_err(|_| RegistryError::InvalidDeadline(input.to_string()))
}

/// Deadline as a date, or `-` when there is none
pub fn format_deadline(deadline: u64) -> String {
    if deadline == 0 {
        return "-".to_string();
    }
    to_datetime(deadline)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| deadline.to_string())
}

pub fn format_timestamp(timestamp: u64) -> String {
    to_datetime(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// `None` for seconds outside chrono's range, including saturated on-chain values
fn to_datetime(seconds: u64) -> Option<DateTime<Utc>> {
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

/// `0x1234…abcd` form of an owner address
pub fn short_owner(record: &DocumentRecord) -> String {
    let owner = format!("0x{:x}", record.owner);
    format!("{}…{}", &owner[..6], &owner[owner.len() - 4..])
}

pub fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Links to a pinned file: primary gateway, Pinata gateway, Pinata dashboard
pub fn gateway_links(gateway_url: &str, content_hash: &str) -> [String; 3] {
    [
        format!("{}{}", gateway_url, content_hash),
        format!("{}{}", PINATA_GATEWAY_URL, content_hash),
        PINATA_DASHBOARD_URL.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn record(deadline: u64) -> DocumentRecord {
        DocumentRecord {
            id: 1,
            content_hash: "QmHash".to_string(),
            owner: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            category: String::new(),
            authors: String::new(),
            deadline,
            upload_timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_empty_deadline_is_zero_and_dash() {
        let deadline = parse_deadline("").unwrap();
        assert_eq!(deadline, 0);
        assert_eq!(format_deadline(deadline), "-");
        assert_eq!(parse_deadline("   ").unwrap(), 0);
    }

    #[test]
    fn test_date_deadline() {
        let deadline = parse_deadline("2030-01-15").unwrap();
        assert_eq!(deadline, 1_894_665_600);
        assert_eq!(format_deadline(deadline), "2030-01-15");
    }

    #[test]
    fn test_rfc3339_and_seconds_deadline() {
        assert_eq!(parse_deadline("2030-01-15T00:00:00Z").unwrap(), 1_894_665_600);
        assert_eq!(parse_deadline("1894665600").unwrap(), 1_894_665_600);
    }

    #[test]
    fn test_invalid_deadline() {
        assert!(matches!(
            parse_deadline("next tuesday"),
            Err(RegistryError::InvalidDeadline(_))
        ));
        assert!(parse_deadline("1960-01-01").is_err());
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_out_of_range_seconds_render_raw() {
        assert_eq!(format_deadline(u64::MAX), u64::MAX.to_string());
        assert_eq!(format_timestamp(u64::MAX), u64::MAX.to_string());
        assert_eq!(
            format_deadline(i64::MAX as u64 + 1),
            (i64::MAX as u64 + 1).to_string()
        );
    }

    #[test]
    fn test_short_owner() {
        assert_eq!(short_owner(&record(0)), "0xf39f…2266");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("Alice"), "Alice");
    }

    #[test]
    fn test_gateway_links() {
        let links = gateway_links("https://dweb.link/ipfs/", "QmHash");
        assert_eq!(links[0], "https://dweb.link/ipfs/QmHash");
        assert_eq!(links[1], "https://gateway.pinata.cloud/ipfs/QmHash");
        assert_eq!(links[2], PINATA_DASHBOARD_URL);
    }
}
