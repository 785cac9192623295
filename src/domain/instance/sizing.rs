//! vCPU token handling for instance size names.
//!
//! Size names carry their vCPU count as the last run of digits
//! (`c5a.24xlarge` → 24, `n2-standard-16` → 16).

use once_cell::sync::Lazy;
use regex::Regex;

/// vCPU count assumed when a size name carries no usable digits.
pub const DEFAULT_VCPU: u32 = 8;

static VCPU_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+)(\D*)$").unwrap_or_else(|e| panic!("invalid vCPU pattern: {e}"))
});

/// Extracts the vCPU count from a size name, falling back to `default`.
pub fn extract_vcpu(size: &str, default: u32) -> u32 {
    VCPU_TOKEN
        .captures(size)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|vcpu| *vcpu > 0)
        .unwrap_or(default)
}

/// Replaces the vCPU token of a size name with `vcpu`.
///
/// A size without digits is returned unchanged.
pub fn replace_vcpu_token(size: &str, vcpu: u32) -> String {
    match VCPU_TOKEN.captures(size).and_then(|caps| caps.get(1)) {
        Some(token) => format!("{}{}{}", &size[..token.start()], vcpu, &size[token.end()..]),
        None => size.to_string(),
    }
}
