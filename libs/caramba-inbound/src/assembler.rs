//! Cross-inbound rules: one listener per port, one inbound per tag.

use crate::builder;
use crate::config::InboundConfig;
use crate::error::{CollisionError, CollisionKind, CollisionMember, ErrorList, SynthError};
use crate::model::InboundSpec;
use crate::validate::{self, ValidationPolicy};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// An ordered, collision-free list of inbounds. Serializes as
/// `{"inbounds": [...]}`, the top-level shape Xray expects.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundSet {
    inbounds: Vec<InboundConfig>,
}

impl InboundSet {
    pub fn inbounds(&self) -> &[InboundConfig] {
        &self.inbounds
    }

    pub fn into_inner(self) -> Vec<InboundConfig> {
        self.inbounds
    }

    pub fn len(&self) -> usize {
        self.inbounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inbounds.is_empty()
    }

    pub fn get(&self, tag: &str) -> Option<&InboundConfig> {
        self.inbounds.iter().find(|i| i.tag == tag)
    }

    pub fn ports(&self) -> Vec<u16> {
        self.inbounds.iter().map(|i| i.port).collect()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Appends `other` if none of its ports or tags are already taken.
    ///
    /// All-or-nothing: on conflict `self` is left untouched. Collision
    /// members are indexed over the combined list, existing inbounds first.
    pub fn merge(&mut self, other: InboundSet) -> Result<(), ErrorList> {
        let combined: Vec<&InboundConfig> = self.inbounds.iter().chain(other.inbounds.iter()).collect();
        let collisions = find_collisions(&combined);
        if !collisions.is_empty() {
            return Err(collisions.into_iter().map(SynthError::from).collect::<Vec<_>>().into());
        }
        self.inbounds.extend(other.inbounds);
        Ok(())
    }
}

impl TryFrom<Vec<InboundConfig>> for InboundSet {
    type Error = ErrorList;

    /// Wraps already-built configs, enforcing the same collision rules.
    fn try_from(inbounds: Vec<InboundConfig>) -> Result<Self, Self::Error> {
        let refs: Vec<&InboundConfig> = inbounds.iter().collect();
        let collisions = find_collisions(&refs);
        if collisions.is_empty() {
            Ok(Self { inbounds })
        } else {
            Err(collisions.into_iter().map(SynthError::from).collect::<Vec<_>>().into())
        }
    }
}

impl<'a> IntoIterator for &'a InboundSet {
    type Item = &'a InboundConfig;
    type IntoIter = std::slice::Iter<'a, InboundConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.inbounds.iter()
    }
}

/// Validates every spec, then builds them and checks collisions.
///
/// Nothing is built unless every spec is valid; the error list then holds
/// the problems of all specs, in input order.
pub fn assemble<R: Rng>(
    specs: &[InboundSpec],
    policy: &ValidationPolicy,
    rng: &mut R,
) -> Result<InboundSet, ErrorList> {
    let mut errors = ErrorList::new();
    let mut validated = Vec::with_capacity(specs.len());

    for (index, spec) in specs.iter().enumerate() {
        match validate::validate_spec(spec, index, policy, rng) {
            Ok(v) => validated.push(v),
            Err(errs) => {
                debug!("inbounds[{}] ({}) failed with {} error(s)", index, spec.tag, errs.len());
                errors.extend(errs);
            }
        }
    }
    errors.into_result()?;

    let inbounds: Vec<InboundConfig> = validated.iter().map(builder::build).collect();
    InboundSet::try_from(inbounds)
}

/// One error per clashing value, each naming every inbound that claims it.
fn find_collisions(inbounds: &[&InboundConfig]) -> Vec<CollisionError> {
    let mut by_port: BTreeMap<u16, Vec<CollisionMember>> = BTreeMap::new();
    let mut by_tag: BTreeMap<&str, Vec<CollisionMember>> = BTreeMap::new();

    for (index, inbound) in inbounds.iter().enumerate() {
        let member = CollisionMember {
            index,
            tag: inbound.tag.clone(),
        };
        by_port.entry(inbound.port).or_default().push(member.clone());
        by_tag.entry(inbound.tag.as_str()).or_default().push(member);
    }

    let ports = by_port
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(port, members)| CollisionError {
            kind: CollisionKind::Port,
            value: port.to_string(),
            members,
        });
    let tags = by_tag
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(tag, members)| CollisionError {
            kind: CollisionKind::Tag,
            value: tag.to_string(),
            members,
        });
    ports.chain(tags).collect()
}
