use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    Vless,
    Vmess,
    Trojan,
    Shadowsocks,
}

impl ProtocolKind {
    pub const ALL: [ProtocolKind; 4] = [Self::Vless, Self::Vmess, Self::Trojan, Self::Shadowsocks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vless => "vless",
            Self::Vmess => "vmess",
            Self::Trojan => "trojan",
            Self::Shadowsocks => "shadowsocks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Tcp,
    Ws,
    Grpc,
    /// Legacy `xhttp` / `splithttp` selections land here as well.
    #[serde(alias = "xhttp", alias = "splithttp")]
    HttpUpgrade,
}

impl TransportKind {
    pub const ALL: [TransportKind; 4] = [Self::Tcp, Self::Ws, Self::Grpc, Self::HttpUpgrade];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Ws => "ws",
            Self::Grpc => "grpc",
            Self::HttpUpgrade => "httpupgrade",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityKind {
    None,
    Tls,
    Reality,
}

impl SecurityKind {
    pub const ALL: [SecurityKind; 3] = [Self::None, Self::Tls, Self::Reality];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Tls => "tls",
            Self::Reality => "reality",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ProtocolKind, TransportKind, SecurityKind);

/// A request to build one inbound.
///
/// This is the raw, caller-supplied selection. Nothing in here is trusted
/// until `validate::validate_spec` has accepted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundSpec {
    pub protocol: ProtocolKind,
    pub transport: TransportKind,
    pub security: SecurityKind,
    /// Kept wide so out-of-range values reach the validator instead of
    /// failing deserialization.
    pub port: i64,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<ClientParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_opts: Option<TransportParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality: Option<RealityParams>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<FallbackParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sniffing: Option<SniffingParams>,
}

impl InboundSpec {
    pub fn new(
        protocol: ProtocolKind,
        transport: TransportKind,
        security: SecurityKind,
        port: i64,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            transport,
            security,
            port,
            tag: tag.into(),
            listen: None,
            clients: Vec::new(),
            transport_opts: None,
            tls: None,
            reality: None,
            fallbacks: Vec::new(),
            sniffing: None,
        }
    }

    pub fn with_client(mut self, client: ClientParams) -> Self {
        self.clients.push(client);
        self
    }

    pub fn with_reality(mut self, reality: RealityParams) -> Self {
        self.reality = Some(reality);
        self
    }

    pub fn with_tls(mut self, tls: TlsParams) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_transport_opts(mut self, opts: TransportParams) -> Self {
        self.transport_opts = Some(opts);
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackParams) -> Self {
        self.fallbacks.push(fallback);
        self
    }

    /// Whether a catalog field name has a non-empty value in this spec.
    ///
    /// Field names use the dotted form the catalog publishes; `clients[].x`
    /// is present when every client carries `x`.
    pub fn field_present(&self, name: &str) -> bool {
        fn filled(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.trim().is_empty())
        }
        fn every_client(clients: &[ClientParams], f: impl Fn(&ClientParams) -> bool) -> bool {
            !clients.is_empty() && clients.iter().all(f)
        }

        match name {
            "port" => true,
            "tag" => !self.tag.trim().is_empty(),
            "listen" => filled(&self.listen),
            "clients[].id" => every_client(&self.clients, |c| filled(&c.id)),
            "clients[].flow" => every_client(&self.clients, |c| filled(&c.flow)),
            "clients[].alter_id" => every_client(&self.clients, |c| c.alter_id.is_some()),
            "clients[].email" => every_client(&self.clients, |c| filled(&c.email)),
            "clients[].password" => every_client(&self.clients, |c| filled(&c.password)),
            "clients[].method" => every_client(&self.clients, |c| filled(&c.method)),
            "transport_opts.path" => self.transport_opts.as_ref().is_some_and(|t| filled(&t.path)),
            "transport_opts.host" => self.transport_opts.as_ref().is_some_and(|t| filled(&t.host)),
            "transport_opts.service_name" => self
                .transport_opts
                .as_ref()
                .is_some_and(|t| filled(&t.service_name)),
            "tls.server_name" => self
                .tls
                .as_ref()
                .is_some_and(|t| !t.server_name.trim().is_empty()),
            "tls.certificate_file" => self.tls.as_ref().is_some_and(|t| filled(&t.certificate_file)),
            "tls.key_file" => self.tls.as_ref().is_some_and(|t| filled(&t.key_file)),
            "tls.alpn" => self.tls.as_ref().is_some_and(|t| !t.alpn.is_empty()),
            "reality.dest" => self
                .reality
                .as_ref()
                .is_some_and(|r| !r.dest.trim().is_empty()),
            "reality.server_names" => self.reality.as_ref().is_some_and(|r| !r.server_names.is_empty()),
            "reality.private_key" => self.reality.as_ref().is_some_and(|r| filled(&r.private_key)),
            "reality.public_key" => self.reality.as_ref().is_some_and(|r| filled(&r.public_key)),
            "reality.short_ids" => self.reality.as_ref().is_some_and(|r| !r.short_ids.is_empty()),
            "reality.fingerprint" => self.reality.as_ref().is_some_and(|r| filled(&r.fingerprint)),
            "fallbacks" => !self.fallbacks.is_empty(),
            "sniffing" => self.sniffing.is_some(),
            _ => false,
        }
    }
}

/// Per-client key/value set. Which keys are meaningful depends on the
/// protocol; the validator rejects keys that do not belong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alter_id: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl ClientParams {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn shadowsocks(method: impl Into<String>, password: Option<String>) -> Self {
        Self {
            method: Some(method.into()),
            password,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsParams {
    pub server_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
}

impl TlsParams {
    pub fn for_domain(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealityParams {
    /// Camouflage target, `host` or `host:port`.
    pub dest: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub server_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xver: Option<u8>,
}

impl RealityParams {
    pub fn new(dest: impl Into<String>) -> Self {
        Self {
            dest: dest.into(),
            ..Default::default()
        }
    }

    pub fn with_short_id(mut self, short_id: impl Into<String>) -> Self {
        self.short_ids.push(short_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackParams {
    /// Port number, `host:port` or an absolute unix socket path.
    pub dest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xver: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SniffTarget {
    Http,
    Tls,
    Quic,
    Fakedns,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SniffingParams {
    pub enabled: bool,
    #[serde(default)]
    pub dest_override: Vec<SniffTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowsocksMethod {
    #[serde(rename = "aes-128-gcm")]
    Aes128Gcm,
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "chacha20-ietf-poly1305", alias = "chacha20-poly1305")]
    Chacha20Poly1305,
    #[serde(rename = "xchacha20-ietf-poly1305", alias = "xchacha20-poly1305")]
    XChacha20Poly1305,
    #[serde(rename = "2022-blake3-aes-128-gcm")]
    Blake3Aes128Gcm,
    #[serde(rename = "2022-blake3-aes-256-gcm")]
    Blake3Aes256Gcm,
    #[serde(rename = "2022-blake3-chacha20-poly1305")]
    Blake3Chacha20Poly1305,
}

impl ShadowsocksMethod {
    pub const ALL: [ShadowsocksMethod; 7] = [
        Self::Aes128Gcm,
        Self::Aes256Gcm,
        Self::Chacha20Poly1305,
        Self::XChacha20Poly1305,
        Self::Blake3Aes128Gcm,
        Self::Blake3Aes256Gcm,
        Self::Blake3Chacha20Poly1305,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes128Gcm => "aes-128-gcm",
            Self::Aes256Gcm => "aes-256-gcm",
            Self::Chacha20Poly1305 => "chacha20-ietf-poly1305",
            Self::XChacha20Poly1305 => "xchacha20-ietf-poly1305",
            Self::Blake3Aes128Gcm => "2022-blake3-aes-128-gcm",
            Self::Blake3Aes256Gcm => "2022-blake3-aes-256-gcm",
            Self::Blake3Chacha20Poly1305 => "2022-blake3-chacha20-poly1305",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        match raw.as_str() {
            "chacha20-poly1305" => Some(Self::Chacha20Poly1305),
            "xchacha20-poly1305" => Some(Self::XChacha20Poly1305),
            other => Self::ALL.into_iter().find(|m| m.as_str() == other),
        }
    }

    /// PSK length in bytes for the 2022 family; `None` for classic AEAD
    /// methods, which take free-form passwords.
    pub fn psk_len(&self) -> Option<usize> {
        match self {
            Self::Blake3Aes128Gcm => Some(16),
            Self::Blake3Aes256Gcm | Self::Blake3Chacha20Poly1305 => Some(32),
            _ => None,
        }
    }

    pub fn is_2022(&self) -> bool {
        self.psk_len().is_some()
    }

    /// Xray has no multi-user mode for the 2022 ChaCha20 cipher.
    pub fn supports_multi_user(&self) -> bool {
        *self != Self::Blake3Chacha20Poly1305
    }
}

impl fmt::Display for ShadowsocksMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
