//! Request payloads
//!
//! Plain values handed to a [`ProtocolQueue`](super::ProtocolQueue). Every
//! number is already in the fixed-point unit of the wire argument it feeds.

use crate::color::{Primaries, TransferFunction};

/// Arguments of frog `set_hdr_metadata`
///
/// Chromaticities and minimum luminance are in 0.0001 units, the rest in nits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrogHdrMetadata {
    pub red_x: u32,
    pub red_y: u32,
    pub green_x: u32,
    pub green_y: u32,
    pub blue_x: u32,
    pub blue_y: u32,
    pub white_x: u32,
    pub white_y: u32,
    pub max_luminance: u32,
    pub min_luminance: u32,
    pub max_cll: u32,
    pub max_fall: u32,
}

/// `set_mastering_luminance` plus `set_mastering_display_primaries`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasteringDisplay {
    /// Minimum luminance, 0.0001 cd/m²
    pub min_luminance: u32,
    /// Maximum luminance, cd/m²
    pub max_luminance: u32,
    /// Red, green, blue and white point as x/y pairs, in the variant's unit
    pub primaries: [i32; 8],
}

/// `set_luminances` triple, in argument order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Luminances {
    pub min: u32,
    pub max: u32,
    pub reference: u32,
}

/// Everything sent on a parametric image description creator before `create`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParametricDescription {
    /// `set_primaries_named`
    pub primaries: Primaries,
    /// `set_tf_named`
    pub transfer_function: TransferFunction,
    /// `set_max_fall`, nits
    pub max_fall: u32,
    /// `set_max_cll`, nits
    pub max_cll: u32,
    /// `set_mastering_luminance` and `set_mastering_display_primaries`
    pub mastering: Option<MasteringDisplay>,
    /// `set_luminances`
    pub luminances: Option<Luminances>,
}

impl ParametricDescription {
    /// Description with named primaries/transfer function and light levels only
    pub fn new(
        primaries: Primaries,
        transfer_function: TransferFunction,
        max_cll: u32,
        max_fall: u32,
    ) -> Self {
        Self {
            primaries,
            transfer_function,
            max_fall,
            max_cll,
            mastering: None,
            luminances: None,
        }
    }

    /// Attach mastering display information
    pub fn with_mastering(mut self, mastering: MasteringDisplay) -> Self {
        self.mastering = Some(mastering);
        self
    }

    /// Attach explicit luminances
    pub fn with_luminances(mut self, luminances: Luminances) -> Self {
        self.luminances = Some(luminances);
        self
    }
}
