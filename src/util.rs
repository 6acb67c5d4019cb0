use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    format!("{:x}", h.finalize())
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Footer timestamp, in the shape of `date(1)` output: `Sat Oct 17 09:05:01 UTC 2026`.
pub fn generated_on_stamp(at: time::OffsetDateTime) -> String {
    let fmt = format_description!(
        "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] UTC [year]"
    );
    at.to_offset(time::UtcOffset::UTC)
        .format(&fmt)
        .unwrap_or_else(|_| now_rfc3339())
}

pub fn generated_on_now() -> String {
    generated_on_stamp(time::OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn stamp_matches_date_layout() {
        let s = generated_on_stamp(datetime!(2026-10-17 09:05:01 UTC));
        assert_eq!(s, "Sat Oct 17 09:05:01 UTC 2026");
    }

    #[test]
    fn stamp_pads_single_digit_day() {
        let s = generated_on_stamp(datetime!(2025-03-02 23:00:00 UTC));
        assert_eq!(s, "Sun Mar  2 23:00:00 UTC 2025");
    }
}
