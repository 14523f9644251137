use std::sync::OnceLock;

use regex::Regex;

static IPV4_SHAPE: OnceLock<Regex> = OnceLock::new();

fn ipv4_shape() -> &'static Regex {
    IPV4_SHAPE.get_or_init(|| {
        Regex::new(r"\b[0-9]{1,3}(?:\.[0-9]{1,3}){3}\b").unwrap_or_else(|err| {
            unreachable!("ipv4 pattern is a valid regex: {err}");
        })
    })
}

/// First dotted-quad substring of `command`, ASCII digits only. Octet ranges
/// are not checked.
pub fn extract_target(command: &str) -> Option<&str> {
    ipv4_shape().find(command).map(|found| found.as_str())
}
