use crate::model::{ProtocolKind, SecurityKind, SniffTarget, TransportKind};
use serde::{Deserialize, Serialize};

/// One synthesized inbound in the Xray / 3x-ui JSON layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InboundConfig {
    pub tag: String,
    pub listen: String,
    pub port: u16,
    /// Serialized as the sibling `protocol` + `settings` keys.
    #[serde(flatten)]
    pub settings: ProtocolSettings,
    #[serde(rename = "streamSettings")]
    pub stream_settings: StreamSettings,
    pub sniffing: Sniffing,
}

impl InboundConfig {
    pub fn protocol(&self) -> ProtocolKind {
        self.settings.kind()
    }

    pub fn network(&self) -> TransportKind {
        self.stream_settings.transport.kind()
    }

    pub fn security(&self) -> SecurityKind {
        self.stream_settings.security.kind()
    }

    pub fn reality(&self) -> Option<&RealitySettings> {
        match &self.stream_settings.security {
            SecuritySettings::Reality { reality_settings } => Some(reality_settings),
            _ => None,
        }
    }

    pub fn tls(&self) -> Option<&TlsSettings> {
        match &self.stream_settings.security {
            SecuritySettings::Tls { tls_settings } => Some(tls_settings),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "protocol", content = "settings", rename_all = "lowercase")]
pub enum ProtocolSettings {
    Vless(VlessSettings),
    Vmess(VmessSettings),
    Trojan(TrojanSettings),
    Shadowsocks(ShadowsocksSettings),
}

impl ProtocolSettings {
    pub fn kind(&self) -> ProtocolKind {
        match self {
            Self::Vless(_) => ProtocolKind::Vless,
            Self::Vmess(_) => ProtocolKind::Vmess,
            Self::Trojan(_) => ProtocolKind::Trojan,
            Self::Shadowsocks(_) => ProtocolKind::Shadowsocks,
        }
    }

    pub fn client_count(&self) -> usize {
        match self {
            Self::Vless(s) => s.clients.len(),
            Self::Vmess(s) => s.clients.len(),
            Self::Trojan(s) => s.clients.len(),
            Self::Shadowsocks(s) => s.clients.len(),
        }
    }

    pub fn fallbacks(&self) -> &[Fallback] {
        match self {
            Self::Vless(s) => &s.fallbacks,
            Self::Trojan(s) => &s.fallbacks,
            Self::Vmess(_) | Self::Shadowsocks(_) => &[],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VlessSettings {
    pub clients: Vec<VlessClient>,
    pub decryption: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<Fallback>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VlessClient {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VmessSettings {
    pub clients: Vec<VmessClient>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmessClient {
    pub id: String,
    pub alter_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrojanSettings {
    pub clients: Vec<TrojanClient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<Fallback>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TrojanClient {
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShadowsocksSettings {
    pub method: String,
    /// Server PSK, only for 2022 methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub network: String,
    /// Empty for single-user inbounds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<ShadowsocksClient>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShadowsocksClient {
    /// Only classic AEAD methods name the cipher per user; 2022 users
    /// inherit the server method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub dest: FallbackDest,
    #[serde(default)]
    pub xver: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FallbackDest {
    Port(u16),
    Address(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamSettings {
    #[serde(flatten)]
    pub transport: TransportSettings,
    #[serde(flatten)]
    pub security: SecuritySettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "network")]
pub enum TransportSettings {
    #[serde(rename = "tcp")]
    Tcp,
    #[serde(rename = "ws")]
    Ws {
        #[serde(rename = "wsSettings")]
        ws_settings: WsSettings,
    },
    #[serde(rename = "grpc")]
    Grpc {
        #[serde(rename = "grpcSettings")]
        grpc_settings: GrpcSettings,
    },
    #[serde(rename = "httpupgrade")]
    HttpUpgrade {
        #[serde(rename = "httpupgradeSettings")]
        httpupgrade_settings: HttpUpgradeSettings,
    },
}

impl TransportSettings {
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Tcp => TransportKind::Tcp,
            Self::Ws { .. } => TransportKind::Ws,
            Self::Grpc { .. } => TransportKind::Grpc,
            Self::HttpUpgrade { .. } => TransportKind::HttpUpgrade,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WsSettings {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrpcSettings {
    pub service_name: String,
    #[serde(default)]
    pub multi_mode: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HttpUpgradeSettings {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "security")]
pub enum SecuritySettings {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "tls")]
    Tls {
        #[serde(rename = "tlsSettings")]
        tls_settings: TlsSettings,
    },
    #[serde(rename = "reality")]
    Reality {
        #[serde(rename = "realitySettings")]
        reality_settings: RealitySettings,
    },
}

impl SecuritySettings {
    pub fn kind(&self) -> SecurityKind {
        match self {
            Self::None => SecurityKind::None,
            Self::Tls { .. } => SecurityKind::Tls,
            Self::Reality { .. } => SecurityKind::Reality,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TlsSettings {
    pub server_name: String,
    pub certificates: Vec<Certificate>,
    pub alpn: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate_file: String,
    pub key_file: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RealitySettings {
    pub show: bool,
    pub dest: String,
    pub xver: u8,
    pub server_names: Vec<String>,
    pub private_key: String,
    /// Not read by the server; kept so the caller can render client links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    pub short_ids: Vec<String>,
    pub fingerprint: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sniffing {
    pub enabled: bool,
    pub dest_override: Vec<SniffTarget>,
}

impl Default for Sniffing {
    fn default() -> Self {
        Self {
            enabled: true,
            dest_override: vec![SniffTarget::Http, SniffTarget::Tls],
        }
    }
}
