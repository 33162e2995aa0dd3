//! Per-field validators.
//!
//! Every function here is pure: it either returns the normalized value or a
//! [`ValidationError`] naming `field`. None of them panic, and none of them
//! stop the caller from checking the next field.

use crate::config::FallbackDest;
use crate::error::ValidationError;
use crate::keys;
use crate::model::{SecurityKind, ShadowsocksMethod, TransportKind};
use std::collections::BTreeSet;
use std::net::IpAddr;
use uuid::Uuid;

pub const VISION_FLOW: &str = "xtls-rprx-vision";
const VISION_UDP443_FLOW: &str = "xtls-rprx-vision-udp443";
const MAX_TAG_LEN: usize = 64;
const MAX_CUSTOM_ID_LEN: usize = 30;
const MAX_SHORT_ID_LEN: usize = 16;

const FINGERPRINTS: &[&str] = &[
    "chrome", "firefox", "safari", "ios", "android", "edge", "360", "qq", "random", "randomized",
];
const ALPN_VALUES: &[&str] = &["h2", "http/1.1"];

pub const DEFAULT_FINGERPRINT: &str = "chrome";

fn fail(field: &str, reason: impl Into<String>, value: impl ToString) -> ValidationError {
    ValidationError::new(field, reason).with_value(value)
}

pub fn port(field: &str, value: i64, reserved: &BTreeSet<u16>) -> Result<u16, ValidationError> {
    let port = u16::try_from(value)
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| fail(field, "must be between 1 and 65535", value))?;
    if reserved.contains(&port) {
        return Err(fail(field, "port is reserved on this host", value));
    }
    Ok(port)
}

pub fn tag(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if v.len() > MAX_TAG_LEN {
        return Err(fail(field, format!("must be at most {} characters", MAX_TAG_LEN), value));
    }
    if !v
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(fail(field, "may only contain letters, digits, '.', '_' and '-'", value));
    }
    Ok(v.to_string())
}

pub fn listen_address(field: &str, value: &str) -> Result<String, ValidationError> {
    value
        .trim()
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| fail(field, "must be an IPv4 or IPv6 address", value))
}

/// Canonical UUIDs pass through lowercased. Short custom ids (1-30 bytes)
/// are mapped to UUIDv5 in the nil namespace, the same mapping Xray applies
/// to VLESS/VMess ids, so the emitted config always carries a real UUID.
pub fn client_id(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim();
    match Uuid::parse_str(v) {
        Ok(id) if id.is_nil() => Err(fail(field, "the nil UUID is not a usable client id", value)),
        Ok(id) => Ok(id.to_string()),
        Err(_) if !v.is_empty() && v.len() <= MAX_CUSTOM_ID_LEN && !v.chars().any(char::is_control) => {
            Ok(Uuid::new_v5(&Uuid::nil(), v.as_bytes()).to_string())
        }
        Err(_) => Err(fail(
            field,
            format!("must be a UUID or a custom id of 1-{} bytes", MAX_CUSTOM_ID_LEN),
            value,
        )),
    }
}

pub fn secret(field: &str, value: &str, min_len: usize) -> Result<String, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::new(field, "must not contain control characters"));
    }
    if value.chars().count() < min_len {
        // The offending value is a secret; report its length only.
        return Err(fail(
            field,
            format!("must be at least {} characters", min_len),
            format!("{} characters", value.chars().count()),
        ));
    }
    Ok(value.to_string())
}

pub fn email(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if v.len() > MAX_TAG_LEN || v.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(fail(field, "must be a short label without whitespace", value));
    }
    Ok(v.to_string())
}

/// Hostname rules as used for SNI: LDH labels, no IP literals.
pub fn domain(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim().trim_end_matches('.').to_ascii_lowercase();
    if v.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if v.parse::<IpAddr>().is_ok() {
        return Err(fail(field, "must be a hostname, not an IP address", value));
    }
    if v.len() > 253 {
        return Err(fail(field, "hostname is longer than 253 characters", value));
    }
    for label in v.split('.') {
        let valid = !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(fail(field, "is not a valid hostname", value));
        }
    }
    if v.rsplit('.').next().is_some_and(|tld| tld.chars().all(|c| c.is_ascii_digit())) {
        return Err(fail(field, "is not a valid hostname", value));
    }
    Ok(v)
}

/// REALITY camouflage target: `host` or `host:port`. Returns the normalized
/// dest and the bare host.
pub fn reality_dest(field: &str, value: &str) -> Result<(String, String), ValidationError> {
    let v = value.trim();
    if let Some((host, port)) = v.rsplit_once(':') {
        let port: u16 = port
            .parse()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| fail(field, "port part must be between 1 and 65535", value))?;
        let host = domain(field, host)?;
        return Ok((format!("{}:{}", host, port), host));
    }
    let host = domain(field, v)?;
    Ok((host.clone(), host))
}

/// Even-length hex, at most 16 characters. The empty id is legal and means
/// "clients may omit the short id".
pub fn short_id(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim().to_ascii_lowercase();
    if v.len() > MAX_SHORT_ID_LEN {
        return Err(fail(field, "must be at most 16 hex characters", value));
    }
    if v.len() % 2 != 0 {
        return Err(fail(field, "must have an even number of hex characters", value));
    }
    if !v.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(fail(field, "must be hexadecimal", value));
    }
    Ok(v)
}

pub fn x25519_key(field: &str, value: &str) -> Result<[u8; 32], ValidationError> {
    keys::decode_key(value).ok_or_else(|| {
        ValidationError::new(field, "must be a base64-encoded 32-byte x25519 key")
    })
}

pub fn fingerprint(field: &str, value: Option<&str>) -> Result<String, ValidationError> {
    let v = value.map(str::trim).unwrap_or("").to_ascii_lowercase();
    if v.is_empty() {
        return Ok(DEFAULT_FINGERPRINT.to_string());
    }
    if FINGERPRINTS.contains(&v.as_str()) {
        Ok(v)
    } else {
        Err(fail(field, format!("must be one of {}", FINGERPRINTS.join(", ")), value.unwrap_or("")))
    }
}

/// Vision is only meaningful on raw TCP with TLS or REALITY underneath.
pub fn flow(
    field: &str,
    value: Option<&str>,
    transport: TransportKind,
    security: SecurityKind,
) -> Result<Option<String>, ValidationError> {
    let v = value.map(str::trim).unwrap_or("");
    match v {
        "" => Ok(None),
        VISION_FLOW | VISION_UDP443_FLOW => {
            if transport == TransportKind::Tcp && security != SecurityKind::None {
                Ok(Some(v.to_string()))
            } else {
                Err(fail(field, "vision flow needs raw TCP with TLS or REALITY", v))
            }
        }
        other => Err(fail(field, "unknown flow", other)),
    }
}

pub fn shadowsocks_method(field: &str, value: &str) -> Result<ShadowsocksMethod, ValidationError> {
    ShadowsocksMethod::parse(value).ok_or_else(|| {
        let known: Vec<&str> = ShadowsocksMethod::ALL.iter().map(|m| m.as_str()).collect();
        fail(field, format!("must be one of {}", known.join(", ")), value)
    })
}

/// 2022 methods key the cipher directly with the password, so it has to be
/// base64 of exactly the cipher's key length.
pub fn ss2022_key(field: &str, value: &str, method: ShadowsocksMethod) -> Result<String, ValidationError> {
    let Some(len) = method.psk_len() else {
        return Ok(value.to_string());
    };
    match keys::decode_psk(value) {
        Some(bytes) if bytes.len() == len => Ok(value.trim().to_string()),
        _ => Err(ValidationError::new(
            field,
            format!("{} needs a base64-encoded {}-byte key", method, len),
        )),
    }
}

pub fn path(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim();
    if !v.starts_with('/') {
        return Err(fail(field, "must start with '/'", value));
    }
    if v.len() > 256 || v.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(fail(field, "must be a short path without whitespace", value));
    }
    Ok(v.to_string())
}

pub fn service_name(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim();
    let valid = !v.is_empty()
        && !v.starts_with('/')
        && v
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/'));
    if valid {
        Ok(v.to_string())
    } else {
        Err(fail(field, "must be a gRPC service name like \"grpc\" or \"pkg.Service\"", value))
    }
}

pub fn alpn(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim().to_ascii_lowercase();
    if ALPN_VALUES.contains(&v.as_str()) {
        Ok(v)
    } else {
        Err(fail(field, format!("must be one of {}", ALPN_VALUES.join(", ")), value))
    }
}

pub fn file_path(field: &str, value: &str) -> Result<String, ValidationError> {
    let v = value.trim();
    if v.starts_with('/') && !v.chars().any(char::is_control) {
        Ok(v.to_string())
    } else {
        Err(fail(field, "must be an absolute path", value))
    }
}

fn is_loopback_or_any(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback() || ip.is_unspecified())
}

/// Fallback target. A destination that resolves back to `own_port` on this
/// host would loop the handshake into the same inbound, so it is refused.
pub fn fallback_dest(field: &str, value: &str, own_port: u16) -> Result<FallbackDest, ValidationError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if v.starts_with('/') || v.starts_with('@') {
        return Ok(FallbackDest::Address(v.to_string()));
    }
    if v.chars().all(|c| c.is_ascii_digit()) {
        let port: u16 = v
            .parse()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| fail(field, "must be between 1 and 65535", value))?;
        if port == own_port {
            return Err(fail(field, "fallback points back at this inbound's own port", value));
        }
        return Ok(FallbackDest::Port(port));
    }
    let Some((host, port)) = v.rsplit_once(':') else {
        return Err(fail(field, "must be a port, host:port or an absolute socket path", value));
    };
    let port: u16 = port
        .parse()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| fail(field, "port part must be between 1 and 65535", value))?;
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_err() {
        domain(field, bare)?;
    }
    if port == own_port && is_loopback_or_any(host) {
        return Err(fail(field, "fallback points back at this inbound's own port", value));
    }
    Ok(FallbackDest::Address(v.to_string()))
}
