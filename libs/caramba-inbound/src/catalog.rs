//! The supported protocol/transport/security matrix.
//!
//! This is the only place the compatibility rules live. UIs render
//! [`entries`] instead of keeping their own copy, and validation refuses to
//! look at a spec until [`lookup`] has accepted its triple.

use crate::error::UnsupportedCombination;
use crate::model::{ProtocolKind, SecurityKind, TransportKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Port,
    Tag,
    ListenAddress,
    Uuid,
    Flow,
    AlterId,
    Email,
    Secret,
    Method,
    Path,
    Host,
    ServiceName,
    Domain,
    FilePath,
    Alpn,
    KeyMaterial,
    ShortId,
    Fingerprint,
    Fallbacks,
    Sniffing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind, required: true }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind, required: false }
}

const COMMON_FIELDS: &[FieldSpec] = &[
    required("port", FieldKind::Port),
    required("tag", FieldKind::Tag),
    optional("listen", FieldKind::ListenAddress),
    optional("sniffing", FieldKind::Sniffing),
];

const VLESS_FIELDS: &[FieldSpec] = &[
    optional("clients[].id", FieldKind::Uuid),
    optional("clients[].flow", FieldKind::Flow),
    optional("clients[].email", FieldKind::Email),
];

const VMESS_FIELDS: &[FieldSpec] = &[
    optional("clients[].id", FieldKind::Uuid),
    optional("clients[].alter_id", FieldKind::AlterId),
    optional("clients[].email", FieldKind::Email),
];

const TROJAN_FIELDS: &[FieldSpec] = &[
    optional("clients[].password", FieldKind::Secret),
    optional("clients[].email", FieldKind::Email),
];

const SHADOWSOCKS_FIELDS: &[FieldSpec] = &[
    required("clients[].method", FieldKind::Method),
    optional("clients[].password", FieldKind::Secret),
    optional("clients[].email", FieldKind::Email),
];

const WS_FIELDS: &[FieldSpec] = &[
    optional("transport_opts.path", FieldKind::Path),
    optional("transport_opts.host", FieldKind::Host),
];

const GRPC_FIELDS: &[FieldSpec] = &[optional("transport_opts.service_name", FieldKind::ServiceName)];

const HTTPUPGRADE_FIELDS: &[FieldSpec] = &[
    optional("transport_opts.path", FieldKind::Path),
    optional("transport_opts.host", FieldKind::Host),
];

const TLS_FIELDS: &[FieldSpec] = &[
    required("tls.server_name", FieldKind::Domain),
    optional("tls.certificate_file", FieldKind::FilePath),
    optional("tls.key_file", FieldKind::FilePath),
    optional("tls.alpn", FieldKind::Alpn),
];

const REALITY_FIELDS: &[FieldSpec] = &[
    required("reality.dest", FieldKind::Domain),
    optional("reality.server_names", FieldKind::Domain),
    optional("reality.private_key", FieldKind::KeyMaterial),
    optional("reality.public_key", FieldKind::KeyMaterial),
    optional("reality.short_ids", FieldKind::ShortId),
    optional("reality.fingerprint", FieldKind::Fingerprint),
];

const NO_FIELDS: &[FieldSpec] = &[];

const FALLBACK_FIELDS: &[FieldSpec] = &[optional("fallbacks", FieldKind::Fallbacks)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub protocol: ProtocolKind,
    pub transport: TransportKind,
    pub security: SecurityKind,
}

const fn entry(protocol: ProtocolKind, transport: TransportKind, security: SecurityKind) -> CatalogEntry {
    CatalogEntry {
        protocol,
        transport,
        security,
    }
}

use ProtocolKind::{Shadowsocks, Trojan, Vless, Vmess};
use SecurityKind::{None as Plain, Reality, Tls};
use TransportKind::{Grpc, HttpUpgrade, Tcp, Ws};

static CATALOG: [CatalogEntry; 26] = [
    entry(Vless, Tcp, Plain),
    entry(Vless, Tcp, Tls),
    entry(Vless, Tcp, Reality),
    entry(Vless, Ws, Plain),
    entry(Vless, Ws, Tls),
    entry(Vless, Grpc, Plain),
    entry(Vless, Grpc, Tls),
    entry(Vless, Grpc, Reality),
    entry(Vless, HttpUpgrade, Plain),
    entry(Vless, HttpUpgrade, Tls),
    entry(Vless, HttpUpgrade, Reality),
    entry(Vmess, Tcp, Plain),
    entry(Vmess, Tcp, Tls),
    entry(Vmess, Ws, Plain),
    entry(Vmess, Ws, Tls),
    entry(Vmess, Grpc, Plain),
    entry(Vmess, Grpc, Tls),
    entry(Vmess, HttpUpgrade, Plain),
    entry(Vmess, HttpUpgrade, Tls),
    entry(Trojan, Tcp, Tls),
    entry(Trojan, Tcp, Reality),
    entry(Trojan, Ws, Tls),
    entry(Trojan, Grpc, Tls),
    entry(Trojan, Grpc, Reality),
    entry(Trojan, HttpUpgrade, Tls),
    entry(Shadowsocks, Tcp, Plain),
];

impl CatalogEntry {
    pub fn label(&self) -> String {
        let protocol = match self.protocol {
            Vless => "VLESS",
            Vmess => "VMess",
            Trojan => "Trojan",
            Shadowsocks => "Shadowsocks",
        };
        let transport = match self.transport {
            Tcp => "TCP",
            Ws => "WebSocket",
            Grpc => "gRPC",
            HttpUpgrade => "HTTPUpgrade",
        };
        match self.security {
            Plain => format!("{} over {}", protocol, transport),
            Tls => format!("{} + TLS over {}", protocol, transport),
            Reality => format!("{} + REALITY over {}", protocol, transport),
        }
    }

    /// Xray only honours fallbacks on raw TCP VLESS/Trojan listeners that
    /// terminate TLS or REALITY.
    pub fn accepts_fallbacks(&self) -> bool {
        self.transport == Tcp && self.security != Plain && matches!(self.protocol, Vless | Trojan)
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = COMMON_FIELDS.to_vec();
        fields.extend_from_slice(match self.protocol {
            Vless => VLESS_FIELDS,
            Vmess => VMESS_FIELDS,
            Trojan => TROJAN_FIELDS,
            Shadowsocks => SHADOWSOCKS_FIELDS,
        });
        fields.extend_from_slice(match self.transport {
            Tcp => NO_FIELDS,
            Ws => WS_FIELDS,
            Grpc => GRPC_FIELDS,
            HttpUpgrade => HTTPUPGRADE_FIELDS,
        });
        fields.extend_from_slice(match self.security {
            Plain => NO_FIELDS,
            Tls => TLS_FIELDS,
            Reality => REALITY_FIELDS,
        });
        if self.accepts_fallbacks() {
            fields.extend_from_slice(FALLBACK_FIELDS);
        }
        fields
    }

    pub fn required_fields(&self) -> impl Iterator<Item = FieldSpec> {
        self.fields().into_iter().filter(|f| f.required)
    }

    /// Whether `name` (or any field below it, for block prefixes such as
    /// `tls`) belongs to this combination.
    pub fn permits(&self, name: &str) -> bool {
        self.fields().iter().any(|f| {
            f.name == name
                || f.name
                    .strip_prefix(name)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

pub fn lookup(
    protocol: ProtocolKind,
    transport: TransportKind,
    security: SecurityKind,
) -> Result<&'static CatalogEntry, UnsupportedCombination> {
    CATALOG
        .iter()
        .find(|e| e.protocol == protocol && e.transport == transport && e.security == security)
        .ok_or(UnsupportedCombination {
            protocol,
            transport,
            security,
        })
}

pub fn supports(protocol: ProtocolKind, transport: TransportKind, security: SecurityKind) -> bool {
    lookup(protocol, transport, security).is_ok()
}
