//! Turns a [`ValidatedInbound`] into an [`InboundConfig`].
//!
//! Builders never fail and never draw randomness: everything random was
//! settled during validation, so the same input always yields the same
//! config.

mod shadowsocks;
mod trojan;
mod vless;
mod vmess;

use crate::config::{
    Certificate, GrpcSettings, HttpUpgradeSettings, InboundConfig, ProtocolSettings,
    RealitySettings, SecuritySettings, StreamSettings, TlsSettings, TransportSettings,
    WsSettings,
};
use crate::model::TransportKind;
use crate::validate::{ClientSet, ValidatedInbound, ValidatedReality, ValidatedTls, ValidatedTransport};

pub const DEFAULT_LISTEN: &str = "0.0.0.0";
pub const DEFAULT_PATH: &str = "/";
pub const DEFAULT_SERVICE_NAME: &str = "grpc";
pub const DEFAULT_ALPN: [&str; 2] = ["h2", "http/1.1"];
const LETSENCRYPT_LIVE: &str = "/etc/letsencrypt/live";

pub fn build(v: &ValidatedInbound) -> InboundConfig {
    let settings = match &v.clients {
        ClientSet::Vless(clients) => ProtocolSettings::Vless(vless::settings(v, clients)),
        ClientSet::Vmess(clients) => ProtocolSettings::Vmess(vmess::settings(clients)),
        ClientSet::Trojan(clients) => ProtocolSettings::Trojan(trojan::settings(v, clients)),
        ClientSet::Shadowsocks {
            method,
            server_psk,
            clients,
        } => ProtocolSettings::Shadowsocks(shadowsocks::settings(*method, server_psk, clients)),
    };

    InboundConfig {
        tag: v.tag.clone(),
        listen: v.listen.clone().unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
        port: v.port,
        settings,
        stream_settings: stream_settings(v),
        sniffing: v.sniffing.clone().unwrap_or_default(),
    }
}

pub fn stream_settings(v: &ValidatedInbound) -> StreamSettings {
    let security = match (&v.tls, &v.reality) {
        (Some(tls), _) => SecuritySettings::Tls {
            tls_settings: tls_settings(tls),
        },
        (None, Some(reality)) => SecuritySettings::Reality {
            reality_settings: reality_settings(reality),
        },
        (None, None) => SecuritySettings::None,
    };
    StreamSettings {
        transport: transport_settings(v.entry.transport, &v.transport),
        security,
    }
}

fn transport_settings(kind: TransportKind, opts: &ValidatedTransport) -> TransportSettings {
    let path = || opts.path.clone().unwrap_or_else(|| DEFAULT_PATH.to_string());
    match kind {
        TransportKind::Tcp => TransportSettings::Tcp,
        TransportKind::Ws => TransportSettings::Ws {
            ws_settings: WsSettings {
                path: path(),
                host: opts.host.clone(),
            },
        },
        TransportKind::Grpc => TransportSettings::Grpc {
            grpc_settings: GrpcSettings {
                service_name: opts
                    .service_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
                multi_mode: false,
            },
        },
        TransportKind::HttpUpgrade => TransportSettings::HttpUpgrade {
            httpupgrade_settings: HttpUpgradeSettings {
                path: path(),
                host: opts.host.clone(),
            },
        },
    }
}

fn tls_settings(tls: &ValidatedTls) -> TlsSettings {
    let (certificate_file, key_file) = match &tls.certificate {
        Some((cert, key)) => (cert.clone(), key.clone()),
        None => (
            format!("{}/{}/fullchain.pem", LETSENCRYPT_LIVE, tls.server_name),
            format!("{}/{}/privkey.pem", LETSENCRYPT_LIVE, tls.server_name),
        ),
    };
    let alpn = if tls.alpn.is_empty() {
        DEFAULT_ALPN.iter().map(|s| s.to_string()).collect()
    } else {
        tls.alpn.clone()
    };
    TlsSettings {
        server_name: tls.server_name.clone(),
        certificates: vec![Certificate {
            certificate_file,
            key_file,
        }],
        alpn,
    }
}

fn reality_settings(r: &ValidatedReality) -> RealitySettings {
    // Clients have to present one of these; the camouflage host is the
    // natural default.
    let server_names = if r.server_names.is_empty() {
        vec![r.dest_host.clone()]
    } else {
        r.server_names.clone()
    };
    RealitySettings {
        show: false,
        dest: r.dest.clone(),
        xver: r.xver,
        server_names,
        private_key: r.keypair.private_key.clone(),
        public_key: Some(r.keypair.public_key.clone()),
        short_ids: r.short_ids.clone(),
        fingerprint: r.fingerprint.clone(),
    }
}
