use crate::config::{TrojanClient, TrojanSettings};
use crate::validate::ValidatedInbound;

pub(super) fn settings(v: &ValidatedInbound, clients: &[TrojanClient]) -> TrojanSettings {
    TrojanSettings {
        clients: clients.to_vec(),
        fallbacks: v.fallbacks.clone(),
    }
}
