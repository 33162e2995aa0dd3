use crate::assembler::{self, InboundSet};
use crate::error::ErrorList;
use crate::model::InboundSpec;
use crate::validate::ValidationPolicy;
use rand::Rng;
use tracing::{info, warn};

/// Entry point for turning inbound requests into a ready-to-write config.
///
/// Holds nothing but the policy, so one instance can be shared across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    policy: ValidationPolicy,
}

impl Synthesizer {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Synthesizes with the thread-local RNG for generated credentials.
    pub fn synthesize(&self, specs: &[InboundSpec]) -> Result<InboundSet, ErrorList> {
        self.synthesize_with(specs, &mut rand::rng())
    }

    /// Same as [`Synthesizer::synthesize`], drawing generated ids, keys and
    /// short ids from `rng`. A seeded RNG gives byte-identical output.
    pub fn synthesize_with<R: Rng>(&self, specs: &[InboundSpec], rng: &mut R) -> Result<InboundSet, ErrorList> {
        match assembler::assemble(specs, &self.policy, rng) {
            Ok(set) => {
                info!("Synthesized {} inbound(s) on ports {:?}", set.len(), set.ports());
                Ok(set)
            }
            Err(errors) => {
                warn!("Rejected {} inbound spec(s) with {} error(s)", specs.len(), errors.len());
                for e in &errors {
                    warn!("  {}", e);
                }
                Err(errors)
            }
        }
    }
}

/// [`Synthesizer::synthesize`] with the default policy.
pub fn synthesize(specs: &[InboundSpec]) -> Result<InboundSet, ErrorList> {
    Synthesizer::default().synthesize(specs)
}
