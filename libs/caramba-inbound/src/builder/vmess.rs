use crate::config::{VmessClient, VmessSettings};

pub(super) fn settings(clients: &[VmessClient]) -> VmessSettings {
    VmessSettings {
        clients: clients.to_vec(),
    }
}
