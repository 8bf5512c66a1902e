//! Display target state
//!
//! A [`SurfaceState`] exists for every `VkSurfaceKHR` whose compositor
//! offered a usable color-management protocol. Targets that did not are
//! never tracked, so every later call on them passes straight through.
//!
//! ```text
//! vkCreateWaylandSurfaceKHR
//!   └─> discovery::discover ──Bound──> SurfaceState ──> surface registry
//!                          └─Inert──> (nothing tracked)
//! vkGetPhysicalDeviceSurfaceFormats(2)KHR
//!   └─> formats::augment(binding, native list)
//! vkDestroySurfaceKHR
//!   └─> SurfaceState::teardown (color surface, manager, queue)
//! ```

use ash::vk;
use tracing::debug;

use crate::protocol::{ProtocolQueue, ProtocolVariant};

pub mod capabilities;
pub mod discovery;
pub mod formats;

pub use capabilities::CapabilitySet;
pub use discovery::{discover, Discovery, DiscoveryAccumulator, InertReason};
pub use formats::{augment, supports_passthrough, FormatQuery};

/// The protocol a target is bound to, with what its manager advertised
///
/// frog has no capability advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorBinding {
    FrogV1,
    WpV1(CapabilitySet),
    XxV4(CapabilitySet),
}

impl ColorBinding {
    /// Bound protocol
    pub fn variant(&self) -> ProtocolVariant {
        match self {
            Self::FrogV1 => ProtocolVariant::FrogV1,
            Self::WpV1(_) => ProtocolVariant::WpV1,
            Self::XxV4(_) => ProtocolVariant::XxV4,
        }
    }

    /// Advertised capabilities, for the variants that advertise them
    pub fn capabilities(&self) -> Option<&CapabilitySet> {
        match self {
            Self::FrogV1 => None,
            Self::WpV1(caps) | Self::XxV4(caps) => Some(caps),
        }
    }
}

/// Per-target state, keyed by `VkSurfaceKHR`
pub struct SurfaceState {
    instance: vk::Instance,
    binding: ColorBinding,
    queue: Box<dyn ProtocolQueue>,
    supports_passthrough: bool,
    surface_id: u32,
}

impl SurfaceState {
    pub(crate) fn new(
        instance: vk::Instance,
        binding: ColorBinding,
        queue: Box<dyn ProtocolQueue>,
    ) -> Self {
        let surface_id = queue.surface_id();
        Self {
            instance,
            binding,
            queue,
            supports_passthrough: false,
            surface_id,
        }
    }

    /// Instance the surface was created on
    pub fn instance(&self) -> vk::Instance {
        self.instance
    }

    /// Bound protocol and its capabilities
    pub fn binding(&self) -> &ColorBinding {
        &self.binding
    }

    /// Bound protocol
    pub fn variant(&self) -> ProtocolVariant {
        self.binding.variant()
    }

    /// `wl_surface` protocol id
    pub fn surface_id(&self) -> u32 {
        self.surface_id
    }

    /// Whether the driver listed `VK_COLOR_SPACE_PASS_THROUGH_EXT` on the last format query
    pub fn supports_passthrough(&self) -> bool {
        self.supports_passthrough
    }

    pub(crate) fn set_supports_passthrough(&mut self, supported: bool) {
        self.supports_passthrough = supported;
    }

    /// Color space actually handed to the driver for swapchains on this target
    ///
    /// The application's color intent travels over the protocol, so the
    /// driver gets a value it will not act on.
    pub fn driver_color_space(&self) -> vk::ColorSpaceKHR {
        if self.supports_passthrough {
            vk::ColorSpaceKHR::PASS_THROUGH_EXT
        } else {
            vk::ColorSpaceKHR::SRGB_NONLINEAR
        }
    }

    /// The target's protocol queue
    pub fn queue(&mut self) -> &mut dyn ProtocolQueue {
        self.queue.as_mut()
    }

    /// Release protocol objects in dependency order
    pub fn teardown(&mut self) {
        debug!(surface_id = self.surface_id, variant = %self.variant(), "Releasing color-managed surface");
        self.queue.destroy_color_surface();
        self.queue.destroy_manager();
        self.queue.destroy_queue();
    }
}

impl std::fmt::Debug for SurfaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceState")
            .field("instance", &self.instance)
            .field("binding", &self.binding)
            .field("supports_passthrough", &self.supports_passthrough)
            .field("surface_id", &self.surface_id)
            .finish_non_exhaustive()
    }
}
