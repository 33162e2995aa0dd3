use crate::config::{ShadowsocksClient, ShadowsocksSettings};
use crate::model::ShadowsocksMethod;

/// Shadowsocks always listens on both TCP and UDP; the stream settings only
/// describe the TCP side.
const NETWORK: &str = "tcp,udp";

/// 2022 methods carry a server PSK next to the per-user keys. Classic AEAD
/// methods authenticate on the client entries alone. Ciphers without a
/// multi-user mode put their only key at server level and list no clients.
pub(super) fn settings(
    method: ShadowsocksMethod,
    server_psk: &Option<String>,
    clients: &[ShadowsocksClient],
) -> ShadowsocksSettings {
    if !method.supports_multi_user() {
        return ShadowsocksSettings {
            method: method.as_str().to_string(),
            password: clients.first().map(|c| c.password.clone()),
            network: NETWORK.to_string(),
            clients: Vec::new(),
        };
    }
    ShadowsocksSettings {
        method: method.as_str().to_string(),
        password: server_psk.clone(),
        network: NETWORK.to_string(),
        clients: clients.to_vec(),
    }
}
