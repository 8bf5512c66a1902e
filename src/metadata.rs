//! HDR metadata
//!
//! [`HdrMetadata`] is the layer's copy of `VkHdrMetadataEXT`: chromaticities
//! normalized to [0, 1] and luminances in nits. The conversions below produce
//! the fixed-point integers each protocol expects, rounding half away from
//! zero in double precision.

use ash::vk;

use crate::protocol::{FrogHdrMetadata, MasteringDisplay};

/// Scale of chromaticities and minimum luminance in 0.0001 units
const TEN_THOUSANDTHS: f64 = 10_000.0;

/// CIE 1931 xy coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Chromaticity {
    /// x
    pub x: f32,
    /// y
    pub y: f32,
}

impl From<vk::XYColorEXT> for Chromaticity {
    fn from(xy: vk::XYColorEXT) -> Self {
        Self { x: xy.x, y: xy.y }
    }
}

/// Mastering display and content light level metadata of one swapchain
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HdrMetadata {
    /// Mastering display red primary
    pub red: Chromaticity,
    /// Mastering display green primary
    pub green: Chromaticity,
    /// Mastering display blue primary
    pub blue: Chromaticity,
    /// Mastering display white point
    pub white_point: Chromaticity,
    /// Mastering display maximum luminance, nits
    pub max_luminance: f32,
    /// Mastering display minimum luminance, nits
    pub min_luminance: f32,
    /// MaxCLL, nits
    pub max_content_light_level: f32,
    /// MaxFALL, nits
    pub max_frame_average_light_level: f32,
}

impl From<&vk::HdrMetadataEXT<'_>> for HdrMetadata {
    fn from(metadata: &vk::HdrMetadataEXT<'_>) -> Self {
        Self {
            red: metadata.display_primary_red.into(),
            green: metadata.display_primary_green.into(),
            blue: metadata.display_primary_blue.into(),
            white_point: metadata.white_point.into(),
            max_luminance: metadata.max_luminance,
            min_luminance: metadata.min_luminance,
            max_content_light_level: metadata.max_content_light_level,
            max_frame_average_light_level: metadata.max_frame_average_light_level,
        }
    }
}

/// `round(value * scale)` as an unsigned wire argument
///
/// Negative and NaN inputs saturate to zero.
pub fn to_fixed(value: f32, scale: f64) -> u32 {
    (f64::from(value) * scale).round() as u32
}

/// `round(value * scale)` as a signed wire argument
pub fn to_fixed_signed(value: f32, scale: f64) -> i32 {
    (f64::from(value) * scale).round() as i32
}

impl HdrMetadata {
    /// MaxCLL rounded to whole nits
    pub fn max_cll(&self) -> u32 {
        to_fixed(self.max_content_light_level, 1.0)
    }

    /// MaxFALL rounded to whole nits
    pub fn max_fall(&self) -> u32 {
        to_fixed(self.max_frame_average_light_level, 1.0)
    }

    fn primaries(&self) -> [Chromaticity; 4] {
        [self.red, self.green, self.blue, self.white_point]
    }

    /// Mastering display block with chromaticities scaled by `unit`
    pub fn mastering(&self, unit: f64) -> MasteringDisplay {
        let mut primaries = [0i32; 8];
        for (pair, xy) in primaries.chunks_exact_mut(2).zip(self.primaries()) {
            pair[0] = to_fixed_signed(xy.x, unit);
            pair[1] = to_fixed_signed(xy.y, unit);
        }

        MasteringDisplay {
            min_luminance: to_fixed(self.min_luminance, TEN_THOUSANDTHS),
            max_luminance: to_fixed(self.max_luminance, 1.0),
            primaries,
        }
    }

    /// Arguments of frog `set_hdr_metadata`
    pub fn to_frog(&self) -> FrogHdrMetadata {
        let c = |value: f32| to_fixed(value, TEN_THOUSANDTHS);
        FrogHdrMetadata {
            red_x: c(self.red.x),
            red_y: c(self.red.y),
            green_x: c(self.green.x),
            green_y: c(self.green.y),
            blue_x: c(self.blue.x),
            blue_y: c(self.blue.y),
            white_x: c(self.white_point.x),
            white_y: c(self.white_point.y),
            max_luminance: to_fixed(self.max_luminance, 1.0),
            min_luminance: c(self.min_luminance),
            max_cll: self.max_cll(),
            max_fall: self.max_fall(),
        }
    }
}
