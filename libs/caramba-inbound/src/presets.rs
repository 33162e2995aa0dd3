//! The stock inbound lineup offered by the installer.

use crate::model::{
    ClientParams, InboundSpec, ProtocolKind, RealityParams, SecurityKind, ShadowsocksMethod,
    TlsParams, TransportKind, TransportParams,
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Baseline stealth.
    VlessRealityTcp,
    /// Survives DPI boxes that fingerprint long-lived TCP flows.
    VlessRealityGrpc,
    VlessRealityHttpUpgrade,
    /// CDN-friendly.
    VlessWsTls,
    VmessTcp,
    TrojanRealityTcp,
    ShadowsocksTcp,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Self::VlessRealityTcp,
        Self::VlessRealityGrpc,
        Self::VlessRealityHttpUpgrade,
        Self::VlessWsTls,
        Self::VmessTcp,
        Self::TrojanRealityTcp,
        Self::ShadowsocksTcp,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::VlessRealityTcp => "vless-reality-tcp",
            Self::VlessRealityGrpc => "vless-reality-grpc",
            Self::VlessRealityHttpUpgrade => "vless-reality-xhttp",
            Self::VlessWsTls => "vless-ws-tls",
            Self::VmessTcp => "vmess-tcp",
            Self::TrojanRealityTcp => "trojan-reality-tcp",
            Self::ShadowsocksTcp => "shadowsocks-tcp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VlessRealityTcp => "VLESS + REALITY TCP",
            Self::VlessRealityGrpc => "VLESS + REALITY gRPC",
            Self::VlessRealityHttpUpgrade => "VLESS + REALITY XHTTP (httpupgrade)",
            Self::VlessWsTls => "VLESS + WebSocket TLS",
            Self::VmessTcp => "VMess TCP",
            Self::TrojanRealityTcp => "Trojan + REALITY TCP",
            Self::ShadowsocksTcp => "Shadowsocks TCP",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.slug() == slug)
    }

    pub fn kinds(&self) -> (ProtocolKind, TransportKind, SecurityKind) {
        use ProtocolKind::*;
        use SecurityKind::{None as Plain, Reality, Tls};
        use TransportKind::*;
        match self {
            Self::VlessRealityTcp => (Vless, Tcp, Reality),
            Self::VlessRealityGrpc => (Vless, Grpc, Reality),
            Self::VlessRealityHttpUpgrade => (Vless, HttpUpgrade, Reality),
            Self::VlessWsTls => (Vless, Ws, Tls),
            Self::VmessTcp => (Vmess, Tcp, Plain),
            Self::TrojanRealityTcp => (Trojan, Tcp, Reality),
            Self::ShadowsocksTcp => (Shadowsocks, Tcp, Plain),
        }
    }

    /// A spec for this preset. `sni` is the REALITY camouflage host or the
    /// TLS certificate domain, depending on the preset. Credentials and
    /// keys are left empty so synthesis generates them.
    pub fn spec(&self, port: i64, sni: &str) -> InboundSpec {
        let (protocol, transport, security) = self.kinds();
        let mut spec = InboundSpec::new(protocol, transport, security, port, self.slug());

        match security {
            SecurityKind::Reality => spec = spec.with_reality(RealityParams::new(sni)),
            SecurityKind::Tls => spec = spec.with_tls(TlsParams::for_domain(sni)),
            SecurityKind::None => {}
        }

        match self {
            Self::VlessRealityGrpc => {
                spec = spec.with_transport_opts(TransportParams {
                    service_name: Some("grpc".to_string()),
                    ..Default::default()
                })
            }
            Self::VlessRealityHttpUpgrade => {
                spec = spec.with_transport_opts(TransportParams {
                    path: Some("/xhttp".to_string()),
                    ..Default::default()
                })
            }
            Self::VlessWsTls => {
                spec = spec.with_transport_opts(TransportParams {
                    path: Some("/ws".to_string()),
                    host: Some(sni.to_string()),
                    ..Default::default()
                })
            }
            Self::ShadowsocksTcp => {
                spec = spec.with_client(ClientParams::shadowsocks(
                    ShadowsocksMethod::Blake3Aes128Gcm.as_str(),
                    None,
                ))
            }
            _ => {}
        }
        spec
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// All seven presets on consecutive ports starting at `base_port`.
pub fn standard_set(base_port: u16, sni: &str) -> Vec<InboundSpec> {
    Preset::ALL
        .iter()
        .zip(i64::from(base_port)..)
        .map(|(preset, port)| preset.spec(port, sni))
        .collect()
}
