//! Capabilities advertised by a bound color manager

use std::collections::HashSet;

use crate::color::{Feature, Primaries, RenderIntent, TokenPair, TransferFunction};
use crate::protocol::{Capability, ProtocolVariant};

/// Feature, primaries, transfer function and intent tokens of one manager
///
/// Filled during discovery and never changed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    /// `supported_feature`
    pub features: HashSet<Feature>,
    /// `supported_primaries_named`
    pub primaries: HashSet<Primaries>,
    /// `supported_tf_named`
    pub transfer_functions: HashSet<TransferFunction>,
    /// `supported_intent`
    pub intents: HashSet<RenderIntent>,
}

impl CapabilitySet {
    /// Whether `feature` was advertised
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Whether the feature behind `capability` was advertised for `variant`
    pub fn has(&self, variant: ProtocolVariant, capability: Capability) -> bool {
        variant
            .feature(capability)
            .is_some_and(|feature| self.has_feature(feature))
    }

    /// Whether both named tokens of a description were advertised
    pub fn supports(&self, tokens: TokenPair) -> bool {
        self.primaries.contains(&tokens.primaries)
            && self.transfer_functions.contains(&tokens.transfer_function)
    }
}
