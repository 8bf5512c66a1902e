//! Display protocol boundary
//!
//! Everything the layer needs from the compositor goes through one
//! [`ProtocolQueue`] per display target: a dedicated event queue plus the
//! color-management objects bound on it. Listener callbacks are never run
//! behind the layer's back. They are turned into [`ProtocolEvent`] messages
//! and handed to an explicit [`EventSink`] only while the caller pumps the
//! queue with [`ProtocolQueue::dispatch_pending`] or [`ProtocolQueue::roundtrip`].
//!
//! ```text
//!  DisplayConnector ──open_queue──> ProtocolQueue (one per VkSurfaceKHR)
//!                                     │ requests
//!                                     ├─ request_globals / bind / create_color_surface
//!                                     ├─ frog: set_known_* / set_hdr_metadata
//!                                     ├─ wp, xx: create_parametric / set / unset / destroy
//!                                     │ pumping
//!                                     └─ dispatch_pending / roundtrip ──> &mut dyn EventSink
//!                                                                           ├─ DiscoveryAccumulator
//!                                                                           └─ PendingDescription
//! ```
//!
//! Three mutually exclusive color-management protocols are understood. When a
//! compositor advertises more than one, the first in [`ProtocolVariant::PRIORITY`]
//! wins.

use std::ffi::c_void;
use std::fmt;

use ash::vk;

use crate::color::{Feature, Primaries, RenderIntent, TransferFunction};
use crate::color::tokens::{wp, xx};

pub mod error;
pub mod handshake;
pub mod parametric;
#[cfg(feature = "wayland")]
pub mod wayland;

pub use error::{ProtocolError, Result};
pub use handshake::{wait_for_description, DescriptionOutcome, PendingDescription};
pub use parametric::{FrogHdrMetadata, Luminances, MasteringDisplay, ParametricDescription};

/// Color-management protocol a display target is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVariant {
    /// `frog_color_management_factory_v1`: direct token requests, no handshake
    FrogV1,
    /// `wp_color_manager_v1`: parametric builder with a create/ready handshake
    WpV1,
    /// `xx_color_manager_v4`: experimental predecessor of `WpV1`
    XxV4,
}

impl ProtocolVariant {
    /// Binding priority, highest first
    pub const PRIORITY: [ProtocolVariant; 3] = [Self::FrogV1, Self::WpV1, Self::XxV4];

    /// Registry interface name of the variant's factory/manager global
    pub const fn interface(self) -> &'static str {
        match self {
            Self::FrogV1 => crate::color::tokens::frog::INTERFACE,
            Self::WpV1 => wp::INTERFACE,
            Self::XxV4 => xx::INTERFACE,
        }
    }

    /// Variant whose manager is advertised under `interface`
    pub fn from_interface(interface: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|variant| variant.interface() == interface)
    }

    /// Whether descriptions go through a parametric create/ready handshake
    pub const fn uses_handshake(self) -> bool {
        !matches!(self, Self::FrogV1)
    }

    /// Feature token for `capability`, if the protocol defines one
    pub const fn feature(self, capability: Capability) -> Option<Feature> {
        match (self, capability) {
            (Self::FrogV1, _) => None,
            (Self::WpV1, Capability::Parametric) => Some(wp::FEATURE_PARAMETRIC),
            (Self::WpV1, Capability::SetLuminances) => Some(wp::FEATURE_SET_LUMINANCES),
            (Self::WpV1, Capability::MasteringDisplayPrimaries) => {
                Some(wp::FEATURE_SET_MASTERING_DISPLAY_PRIMARIES)
            }
            (Self::WpV1, Capability::ExtendedTargetVolume) => {
                Some(wp::FEATURE_EXTENDED_TARGET_VOLUME)
            }
            (Self::XxV4, Capability::Parametric) => Some(xx::FEATURE_PARAMETRIC),
            (Self::XxV4, Capability::SetLuminances) => Some(xx::FEATURE_SET_LUMINANCES),
            (Self::XxV4, Capability::MasteringDisplayPrimaries) => {
                Some(xx::FEATURE_SET_MASTERING_DISPLAY_PRIMARIES)
            }
            (Self::XxV4, Capability::ExtendedTargetVolume) => {
                Some(xx::FEATURE_EXTENDED_TARGET_VOLUME)
            }
        }
    }

    /// Perceptual rendering intent, for the variants that bind descriptions
    pub const fn perceptual_intent(self) -> Option<RenderIntent> {
        match self {
            Self::FrogV1 => None,
            Self::WpV1 => Some(wp::RENDER_INTENT_PERCEPTUAL),
            Self::XxV4 => Some(xx::RENDER_INTENT_PERCEPTUAL),
        }
    }

    /// Fixed-point unit of mastering display chromaticities
    ///
    /// v1 settled on millionths, the v4 draft and frog use ten-thousandths.
    pub const fn mastering_primaries_unit(self) -> f64 {
        match self {
            Self::WpV1 => 1_000_000.0,
            Self::FrogV1 | Self::XxV4 => 10_000.0,
        }
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interface())
    }
}

/// Optional color-manager features the layer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Parametric image descriptions (required)
    Parametric,
    /// Explicit reference luminances
    SetLuminances,
    /// Mastering display primaries and luminance
    MasteringDisplayPrimaries,
    /// Target color volume larger than the primary color volume
    ExtendedTargetVolume,
}

/// Queue-local id of an image description created by `create_parametric`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptionId(pub u32);

impl fmt::Display for DescriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A global advertised by the compositor registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    /// Registry name
    pub name: u32,
    /// Interface name
    pub interface: String,
    /// Highest version offered
    pub version: u32,
}

/// Listener callback, delivered while the queue is being pumped
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    /// `wl_registry.global`
    Global(Global),
    /// `wl_registry.global_remove`
    GlobalRemove {
        /// Registry name of the removed global
        name: u32,
    },
    /// `supported_feature`
    SupportedFeature(Feature),
    /// `supported_primaries_named`
    SupportedPrimaries(Primaries),
    /// `supported_tf_named`
    SupportedTransferFunction(TransferFunction),
    /// `supported_intent`
    SupportedIntent(RenderIntent),
    /// `done` on the color manager
    CapabilitiesDone,
    /// frog `preferred_metadata`
    PreferredMetadata,
    /// Image description is usable
    DescriptionReady {
        /// Description the event belongs to
        id: DescriptionId,
        /// Compositor-side identity
        identity: u32,
    },
    /// Image description could not be created
    DescriptionFailed {
        /// Description the event belongs to
        id: DescriptionId,
        /// Protocol failure cause
        cause: u32,
        /// Human readable reason from the compositor
        reason: String,
    },
}

/// Receiver of [`ProtocolEvent`]s during a pump
pub trait EventSink {
    /// Handle one event; events the sink does not care about are dropped
    fn handle(&mut self, event: ProtocolEvent);
}

/// Opaque Wayland handles taken from `VkWaylandSurfaceCreateInfoKHR`
#[derive(Debug, Clone, Copy)]
pub struct WaylandTarget {
    /// `wl_display*`
    pub display: *mut c_void,
    /// `wl_surface*`
    pub surface: *mut c_void,
}

impl WaylandTarget {
    /// Capture the target from a surface create info
    pub fn from_create_info(info: &vk::WaylandSurfaceCreateInfoKHR<'_>) -> Self {
        Self {
            display: info.display,
            surface: info.surface,
        }
    }
}

/// Opens dedicated protocol queues on the application's Wayland connection
pub trait DisplayConnector: Send + Sync {
    /// Open an isolated event queue for one display target
    fn open_queue(&self, target: &WaylandTarget) -> Result<Box<dyn ProtocolQueue>>;
}

/// One display target's event queue and the color-management objects on it
///
/// Requests are fire-and-forget unless they return a value; replies only
/// arrive through the sink passed to a pump call.
pub trait ProtocolQueue: Send {
    /// Protocol id of the target `wl_surface`, for diagnostics
    fn surface_id(&self) -> u32;

    /// Whether this backend has bindings for `variant`
    fn can_bind(&self, _variant: ProtocolVariant) -> bool {
        true
    }

    /// Create a `wl_registry` on this queue
    fn request_globals(&mut self) -> Result<()>;

    /// Destroy the registry once discovery is over
    fn release_registry(&mut self);

    /// Bind the factory/manager global of `variant`
    ///
    /// Attaches the capability listener for variants that advertise features.
    fn bind(&mut self, global: &Global, variant: ProtocolVariant) -> Result<()>;

    /// Create the per-surface color-management object on the bound manager
    fn create_color_surface(&mut self) -> Result<()>;

    /// Deliver already queued events without blocking
    fn dispatch_pending(&mut self, sink: &mut dyn EventSink) -> Result<usize>;

    /// Block until the compositor has processed every request sent so far
    fn roundtrip(&mut self, sink: &mut dyn EventSink) -> Result<usize>;

    /// frog: `set_known_container_color_volume`
    fn set_known_container_color_volume(&mut self, primaries: Primaries) -> Result<()>;

    /// frog: `set_known_transfer_function`
    fn set_known_transfer_function(&mut self, transfer_function: TransferFunction) -> Result<()>;

    /// frog: `set_hdr_metadata`
    fn set_hdr_metadata(&mut self, metadata: &FrogHdrMetadata) -> Result<()>;

    /// wp, xx: `unset_image_description`
    fn unset_image_description(&mut self) -> Result<()>;

    /// wp, xx: replay `description` on a new parametric creator and `create` it
    fn create_parametric(&mut self, description: &ParametricDescription) -> Result<DescriptionId>;

    /// wp, xx: `set_image_description`
    fn set_image_description(&mut self, id: DescriptionId, intent: RenderIntent) -> Result<()>;

    /// Release an image description object
    fn destroy_image_description(&mut self, id: DescriptionId);

    /// Destroy the per-surface color-management object
    fn destroy_color_surface(&mut self);

    /// Destroy the bound factory/manager
    fn destroy_manager(&mut self);

    /// Destroy the dedicated event queue
    fn destroy_queue(&mut self);
}
