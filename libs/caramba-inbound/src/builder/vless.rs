use crate::config::{VlessClient, VlessSettings};
use crate::model::{SecurityKind, TransportKind};
use crate::validate::ValidatedInbound;
use crate::validate::fields::VISION_FLOW;

/// Vision is applied to every client that did not pick a flow, but only
/// where Xray can actually splice: raw TCP under TLS or REALITY.
pub(super) fn settings(v: &ValidatedInbound, clients: &[VlessClient]) -> VlessSettings {
    let vision = v.entry.transport == TransportKind::Tcp && v.entry.security != SecurityKind::None;
    let clients = clients
        .iter()
        .map(|c| VlessClient {
            id: c.id.clone(),
            flow: c
                .flow
                .clone()
                .or_else(|| vision.then(|| VISION_FLOW.to_string())),
            email: c.email.clone(),
        })
        .collect();

    VlessSettings {
        clients,
        decryption: "none".to_string(),
        fallbacks: v.fallbacks.clone(),
    }
}
