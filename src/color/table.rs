//! Known color descriptions
//!
//! The fixed list of (format, color space) pairs this layer can describe to a
//! compositor, each with the equivalent tokens for every protocol variant.

use ash::vk;

use super::tokens::{frog, wp, xx, Primaries, TransferFunction};
use crate::protocol::ProtocolVariant;

/// Primaries and transfer function as understood by one protocol variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenPair {
    /// Named primaries
    pub primaries: Primaries,
    /// Named transfer function
    pub transfer_function: TransferFunction,
}

impl TokenPair {
    const fn new(primaries: Primaries, transfer_function: TransferFunction) -> Self {
        Self {
            primaries,
            transfer_function,
        }
    }
}

/// One presentable (format, color space) pair
#[derive(Debug, Clone, Copy)]
pub struct ColorDescription {
    /// Pixel format
    pub format: vk::Format,
    /// Vulkan color space the application asks for
    pub color_space: vk::ColorSpaceKHR,
    frog: TokenPair,
    wp: TokenPair,
    xx: TokenPair,
    /// Needs `extended_target_volume` on the color manager
    pub extended_volume: bool,
}

impl ColorDescription {
    /// Tokens for the given variant
    pub const fn tokens(&self, variant: ProtocolVariant) -> TokenPair {
        match variant {
            ProtocolVariant::FrogV1 => self.frog,
            ProtocolVariant::WpV1 => self.wp,
            ProtocolVariant::XxV4 => self.xx,
        }
    }

    /// Whether this entry describes the given pair
    pub fn matches(&self, format: vk::Format, color_space: vk::ColorSpaceKHR) -> bool {
        self.format == format && self.color_space == color_space
    }

    /// Whether the bound transfer function is the (extended) linear one
    ///
    /// Linear descriptions carry explicit luminances on the handshake variants.
    pub fn is_linear(&self, variant: ProtocolVariant) -> bool {
        let tf = self.tokens(variant).transfer_function;
        match variant {
            ProtocolVariant::FrogV1 => tf == frog::TRANSFER_FUNCTION_SCRGB_LINEAR,
            ProtocolVariant::WpV1 => tf == wp::TRANSFER_FUNCTION_EXT_LINEAR,
            ProtocolVariant::XxV4 => tf == xx::TRANSFER_FUNCTION_LINEAR,
        }
    }

    /// The format/color-space pair as a Vulkan surface format
    pub const fn surface_format(&self) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format: self.format,
            color_space: self.color_space,
        }
    }
}

const HDR10: (TokenPair, TokenPair, TokenPair) = (
    TokenPair::new(frog::PRIMARIES_REC2020, frog::TRANSFER_FUNCTION_ST2084_PQ),
    TokenPair::new(wp::PRIMARIES_BT2020, wp::TRANSFER_FUNCTION_ST2084_PQ),
    TokenPair::new(xx::PRIMARIES_BT2020, xx::TRANSFER_FUNCTION_ST2084_PQ),
);

const SCRGB: (TokenPair, TokenPair, TokenPair) = (
    TokenPair::new(frog::PRIMARIES_REC709, frog::TRANSFER_FUNCTION_SCRGB_LINEAR),
    TokenPair::new(wp::PRIMARIES_SRGB, wp::TRANSFER_FUNCTION_EXT_LINEAR),
    TokenPair::new(xx::PRIMARIES_SRGB, xx::TRANSFER_FUNCTION_LINEAR),
);

/// Every description the layer knows, in advertisement order
pub static COLOR_DESCRIPTIONS: [ColorDescription; 4] = [
    ColorDescription {
        format: vk::Format::A2B10G10R10_UNORM_PACK32,
        color_space: vk::ColorSpaceKHR::HDR10_ST2084_EXT,
        frog: HDR10.0,
        wp: HDR10.1,
        xx: HDR10.2,
        extended_volume: false,
    },
    ColorDescription {
        format: vk::Format::A2R10G10B10_UNORM_PACK32,
        color_space: vk::ColorSpaceKHR::HDR10_ST2084_EXT,
        frog: HDR10.0,
        wp: HDR10.1,
        xx: HDR10.2,
        extended_volume: false,
    },
    ColorDescription {
        format: vk::Format::R16G16B16A16_SFLOAT,
        color_space: vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
        frog: SCRGB.0,
        wp: SCRGB.1,
        xx: SCRGB.2,
        extended_volume: true,
    },
    ColorDescription {
        format: vk::Format::R16G16B16A16_SFLOAT,
        color_space: vk::ColorSpaceKHR::BT709_LINEAR_EXT,
        frog: SCRGB.0,
        wp: SCRGB.1,
        xx: SCRGB.2,
        extended_volume: true,
    },
];

/// Exact (format, color space) lookup
pub fn lookup(
    format: vk::Format,
    color_space: vk::ColorSpaceKHR,
) -> Option<&'static ColorDescription> {
    COLOR_DESCRIPTIONS
        .iter()
        .find(|desc| desc.matches(format, color_space))
}

/// First entry for a color space, regardless of format
///
/// Swapchain binding only has the color space to go on; every entry sharing a
/// color space carries the same tokens.
pub fn find_by_color_space(color_space: vk::ColorSpaceKHR) -> Option<&'static ColorDescription> {
    COLOR_DESCRIPTIONS
        .iter()
        .find(|desc| desc.color_space == color_space)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pairs_are_unique() {
        let pairs: HashSet<_> = COLOR_DESCRIPTIONS
            .iter()
            .map(|d| (d.format, d.color_space))
            .collect();
        assert_eq!(pairs.len(), COLOR_DESCRIPTIONS.len());
    }

    #[test]
    fn test_lookup_exact_pair() {
        let desc = lookup(
            vk::Format::A2R10G10B10_UNORM_PACK32,
            vk::ColorSpaceKHR::HDR10_ST2084_EXT,
        )
        .unwrap();
        assert!(!desc.extended_volume);
        assert!(lookup(
            vk::Format::B8G8R8A8_UNORM,
            vk::ColorSpaceKHR::HDR10_ST2084_EXT
        )
        .is_none());
    }

    #[test]
    fn test_find_by_color_space_takes_first() {
        let desc = find_by_color_space(vk::ColorSpaceKHR::HDR10_ST2084_EXT).unwrap();
        assert_eq!(desc.format, vk::Format::A2B10G10R10_UNORM_PACK32);
        assert!(find_by_color_space(vk::ColorSpaceKHR::SRGB_NONLINEAR).is_none());
    }

    #[test]
    fn test_tokens_follow_variant() {
        let desc = find_by_color_space(vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT).unwrap();
        assert_eq!(
            desc.tokens(ProtocolVariant::FrogV1).transfer_function,
            frog::TRANSFER_FUNCTION_SCRGB_LINEAR
        );
        assert_eq!(
            desc.tokens(ProtocolVariant::WpV1).transfer_function,
            wp::TRANSFER_FUNCTION_EXT_LINEAR
        );
        assert_eq!(
            desc.tokens(ProtocolVariant::XxV4).transfer_function,
            xx::TRANSFER_FUNCTION_LINEAR
        );
        assert!(desc.is_linear(ProtocolVariant::XxV4));
    }

    #[test]
    fn test_pq_is_not_linear() {
        let desc = &COLOR_DESCRIPTIONS[0];
        for variant in ProtocolVariant::PRIORITY {
            assert!(!desc.is_linear(variant));
        }
    }
}
