//! Inbound configuration synthesis for Xray-compatible servers.
//!
//! A caller describes the inbounds it wants as [`InboundSpec`]s; the
//! [`Synthesizer`] checks them against the [`catalog`], validates every
//! field, fills in generated credentials and produces an [`InboundSet`]
//! ready to be written as the `inbounds` section of a server config.

pub mod assembler;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod keys;
pub mod model;
pub mod presets;
pub mod synth;
pub mod validate;

pub use assembler::{InboundSet, assemble};
pub use builder::build;
pub use catalog::{CatalogEntry, FieldKind, FieldSpec};
pub use config::InboundConfig;
pub use error::{CollisionError, ErrorList, SynthError, UnsupportedCombination, ValidationError};
pub use model::{
    ClientParams, FallbackParams, InboundSpec, ProtocolKind, RealityParams, SecurityKind,
    ShadowsocksMethod, SniffTarget, SniffingParams, TlsParams, TransportKind, TransportParams,
};
pub use presets::Preset;
pub use synth::{Synthesizer, synthesize};
pub use validate::{ValidatedInbound, ValidationPolicy, validate_spec};

#[cfg(test)]
mod tests;
