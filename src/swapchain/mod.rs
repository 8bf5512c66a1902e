//! Swapchain color binding
//!
//! Every swapchain created on a bound display target gets a
//! [`SwapchainColorState`]: the color description its requested color space
//! maps to, the last HDR metadata the application set, and a dirty flag that
//! makes the next present re-send both to the compositor.

use ash::vk;
use tracing::warn;

use crate::color::{self, ColorDescription, TokenPair};
use crate::color::tokens::frog;
use crate::metadata::HdrMetadata;
use crate::protocol::ProtocolVariant;

pub mod commit;

pub use commit::{commit, CommitOutcome};

/// What the swapchain asserts to the compositor
#[derive(Debug, Clone, Copy)]
pub enum TargetDescription {
    /// A known description from the color table
    Tagged(&'static ColorDescription),
    /// Nothing: the compositor assumes its default color space
    Untagged,
}

impl TargetDescription {
    /// Map a requested color space to a description
    ///
    /// Unknown color spaces fall back to untagged; only a non-default one is
    /// worth a warning since the driver may well handle it natively.
    pub fn resolve(color_space: vk::ColorSpaceKHR) -> Self {
        match color::find_by_color_space(color_space) {
            Some(desc) => Self::Tagged(desc),
            None => {
                if color_space != vk::ColorSpaceKHR::SRGB_NONLINEAR {
                    warn!(?color_space, "Unknown color space, assuming untagged");
                }
                Self::Untagged
            }
        }
    }

    /// Tokens sent on the frog direct path
    ///
    /// frog has no unset request; untagged swapchains send `undefined`.
    pub fn frog_tokens(&self) -> TokenPair {
        match self {
            Self::Tagged(desc) => desc.tokens(ProtocolVariant::FrogV1),
            Self::Untagged => TokenPair {
                primaries: frog::PRIMARIES_UNDEFINED,
                transfer_function: frog::TRANSFER_FUNCTION_UNDEFINED,
            },
        }
    }

    /// Whether no description is asserted
    pub fn is_untagged(&self) -> bool {
        matches!(self, Self::Untagged)
    }
}

/// Per-swapchain color state, keyed by `VkSwapchainKHR`
#[derive(Debug, Clone)]
pub struct SwapchainColorState {
    surface: vk::SurfaceKHR,
    variant: ProtocolVariant,
    target: TargetDescription,
    metadata: HdrMetadata,
    dirty: bool,
}

impl SwapchainColorState {
    /// New state for a swapchain on `surface`; dirty until the first commit
    pub fn new(
        surface: vk::SurfaceKHR,
        variant: ProtocolVariant,
        requested: vk::ColorSpaceKHR,
    ) -> Self {
        Self {
            surface,
            variant,
            target: TargetDescription::resolve(requested),
            metadata: HdrMetadata::default(),
            dirty: true,
        }
    }

    /// Key of the owning surface state
    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    /// Protocol the owning surface is bound to
    pub fn variant(&self) -> ProtocolVariant {
        self.variant
    }

    /// Resolved description
    pub fn target(&self) -> TargetDescription {
        self.target
    }

    /// Most recent metadata
    pub fn metadata(&self) -> &HdrMetadata {
        &self.metadata
    }

    /// Whether the next present has to commit
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Store new metadata for the next present
    pub fn set_metadata(&mut self, metadata: HdrMetadata) {
        self.metadata = metadata;
        self.dirty = true;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn test_known_color_space_is_tagged() {
        let state = SwapchainColorState::new(
            vk::SurfaceKHR::from_raw(1),
            ProtocolVariant::WpV1,
            vk::ColorSpaceKHR::HDR10_ST2084_EXT,
        );
        assert!(state.is_dirty());
        match state.target() {
            TargetDescription::Tagged(desc) => {
                assert_eq!(desc.color_space, vk::ColorSpaceKHR::HDR10_ST2084_EXT)
            }
            TargetDescription::Untagged => panic!("expected tagged"),
        }
    }

    #[test]
    fn test_unknown_color_space_is_untagged() {
        let state = SwapchainColorState::new(
            vk::SurfaceKHR::from_raw(1),
            ProtocolVariant::XxV4,
            vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT,
        );
        assert!(state.target().is_untagged());
        assert_eq!(
            state.target().frog_tokens().primaries,
            frog::PRIMARIES_UNDEFINED
        );
    }

    #[test]
    fn test_set_metadata_marks_dirty() {
        let mut state = SwapchainColorState::new(
            vk::SurfaceKHR::from_raw(1),
            ProtocolVariant::FrogV1,
            vk::ColorSpaceKHR::SRGB_NONLINEAR,
        );
        state.mark_clean();
        assert!(!state.is_dirty());

        let metadata = HdrMetadata {
            max_luminance: 800.0,
            ..HdrMetadata::default()
        };
        state.set_metadata(metadata);
        assert!(state.is_dirty());
        assert_eq!(state.metadata().max_luminance, 800.0);
    }
}
