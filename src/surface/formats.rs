//! Format augmentation
//!
//! Extra (format, color space) pairs a bound target can present, computed
//! from the driver's native list. Extras are appended after the native
//! entries and never duplicate them.

use ash::vk;

use super::ColorBinding;
use crate::color::{ColorDescription, COLOR_DESCRIPTIONS};
use crate::protocol::{Capability, ProtocolVariant};

/// Which format query entry point is being answered
///
/// `vkGetPhysicalDeviceSurfaceFormatsKHR` additionally requires the
/// extended target volume feature for extended-volume entries on
/// `wp_color_manager_v1`; `vkGetPhysicalDeviceSurfaceFormats2KHR` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatQuery {
    /// `vkGetPhysicalDeviceSurfaceFormatsKHR`
    Classic,
    /// `vkGetPhysicalDeviceSurfaceFormats2KHR`
    Extended,
}

/// Whether the native list contains `VK_COLOR_SPACE_PASS_THROUGH_EXT`
pub fn supports_passthrough(native: &[vk::SurfaceFormatKHR]) -> bool {
    native
        .iter()
        .any(|format| format.color_space == vk::ColorSpaceKHR::PASS_THROUGH_EXT)
}

/// Whether `desc` can be offered on top of `native`
pub fn is_presentable(
    desc: &ColorDescription,
    binding: &ColorBinding,
    native: &[vk::SurfaceFormatKHR],
    query: FormatQuery,
) -> bool {
    if native
        .iter()
        .any(|format| desc.matches(format.format, format.color_space))
    {
        return false;
    }

    let has_format = native.iter().any(|format| format.format == desc.format);
    if !has_format {
        return false;
    }

    let variant = binding.variant();
    let Some(caps) = binding.capabilities() else {
        return true;
    };

    if !caps.supports(desc.tokens(variant)) {
        return false;
    }

    let guards_volume = query == FormatQuery::Classic && variant == ProtocolVariant::WpV1;
    !(guards_volume
        && desc.extended_volume
        && !caps.has(variant, Capability::ExtendedTargetVolume))
}

/// Table entries to append to `native`, in table order
pub fn augment(
    binding: &ColorBinding,
    native: &[vk::SurfaceFormatKHR],
    query: FormatQuery,
) -> Vec<&'static ColorDescription> {
    COLOR_DESCRIPTIONS
        .iter()
        .filter(|desc| is_presentable(desc, binding, native, query))
        .collect()
}
