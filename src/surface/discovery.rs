//! Capability discovery
//!
//! Runs once per display target, right after the driver created its
//! `VkSurfaceKHR`:
//!
//! 1. request the registry on the target's own queue and pump pending events
//! 2. roundtrip: the registry lists its globals
//! 3. bind the highest priority color manager the compositor offers
//! 4. roundtrip: the manager advertises features, primaries and transfer functions
//! 5. check the parametric feature and create the per-surface object
//!
//! Any failure leaves the target inert. The application still gets its
//! surface; it just never sees the extra HDR formats.

use ash::vk;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{CapabilitySet, ColorBinding, SurfaceState};
use crate::protocol::{
    Capability, EventSink, Global, ProtocolError, ProtocolEvent, ProtocolQueue, ProtocolVariant,
};

/// Why a display target is left alone
#[derive(Error, Debug)]
pub enum InertReason {
    /// None of the color-management globals is advertised
    #[error("compositor is lacking support for color management protocols")]
    NoColorManager,

    /// A handshake protocol is bound but cannot build parametric descriptions
    #[error("compositor is lacking support for parametric image descriptions ({0})")]
    MissingParametric(ProtocolVariant),

    /// The queue failed during discovery
    #[error("protocol error during discovery: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Result of discovering one display target
#[derive(Debug)]
pub enum Discovery {
    /// A color manager is bound and usable
    Bound(SurfaceState),
    /// The target is passed through untouched
    Inert(InertReason),
}

/// Collects registry globals and manager capabilities during discovery
#[derive(Debug, Default)]
pub struct DiscoveryAccumulator {
    globals: Vec<Global>,
    capabilities: CapabilitySet,
}

impl DiscoveryAccumulator {
    /// Globals seen so far
    pub fn globals(&self) -> &[Global] {
        &self.globals
    }

    /// Capabilities seen so far
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Highest priority advertised variant that `can_bind` accepts
    pub fn select(
        &self,
        can_bind: impl Fn(ProtocolVariant) -> bool,
    ) -> Option<(Global, ProtocolVariant)> {
        let mut selected = None;
        for variant in ProtocolVariant::PRIORITY {
            let Some(global) = self.globals.iter().find(|g| g.interface == variant.interface())
            else {
                continue;
            };
            if selected.is_some() {
                debug!(%variant, "Ignoring lower priority color manager");
            } else if can_bind(variant) {
                selected = Some((global.clone(), variant));
            } else {
                debug!(%variant, "Backend has no bindings for color manager");
            }
        }
        selected
    }

    /// Turn the collected capabilities into a binding for `variant`
    pub fn into_binding(self, variant: ProtocolVariant) -> ColorBinding {
        match variant {
            ProtocolVariant::FrogV1 => ColorBinding::FrogV1,
            ProtocolVariant::WpV1 => ColorBinding::WpV1(self.capabilities),
            ProtocolVariant::XxV4 => ColorBinding::XxV4(self.capabilities),
        }
    }
}

impl EventSink for DiscoveryAccumulator {
    fn handle(&mut self, event: ProtocolEvent) {
        match event {
            ProtocolEvent::Global(global) => self.globals.push(global),
            ProtocolEvent::GlobalRemove { name } => self.globals.retain(|g| g.name != name),
            ProtocolEvent::SupportedFeature(feature) => {
                self.capabilities.features.insert(feature);
            }
            ProtocolEvent::SupportedPrimaries(primaries) => {
                self.capabilities.primaries.insert(primaries);
            }
            ProtocolEvent::SupportedTransferFunction(tf) => {
                self.capabilities.transfer_functions.insert(tf);
            }
            ProtocolEvent::SupportedIntent(intent) => {
                self.capabilities.intents.insert(intent);
            }
            ProtocolEvent::CapabilitiesDone | ProtocolEvent::PreferredMetadata => {}
            ProtocolEvent::DescriptionReady { .. } | ProtocolEvent::DescriptionFailed { .. } => {}
        }
    }
}

/// Discover the color-management support of one display target
///
/// Takes ownership of the target's queue. On success it lives on in the
/// returned [`SurfaceState`]; otherwise it is released here.
pub fn discover(instance: vk::Instance, mut queue: Box<dyn ProtocolQueue>) -> Discovery {
    let surface_id = queue.surface_id();

    match negotiate(queue.as_mut()) {
        Ok(binding) => {
            info!(
                surface_id,
                variant = %binding.variant(),
                "Created HDR surface"
            );
            if let Some(caps) = binding.capabilities() {
                debug!(
                    features = caps.features.len(),
                    primaries = caps.primaries.len(),
                    transfer_functions = caps.transfer_functions.len(),
                    "Color manager capabilities"
                );
            }
            Discovery::Bound(SurfaceState::new(instance, binding, queue))
        }
        Err(reason) => {
            warn!(surface_id, %reason, "HDR disabled for surface");
            queue.destroy_color_surface();
            queue.destroy_manager();
            queue.destroy_queue();
            Discovery::Inert(reason)
        }
    }
}

fn negotiate(queue: &mut dyn ProtocolQueue) -> Result<ColorBinding, InertReason> {
    let mut accumulator = DiscoveryAccumulator::default();

    queue.request_globals()?;
    queue.dispatch_pending(&mut accumulator)?;
    queue.roundtrip(&mut accumulator)?;

    let selected = accumulator.select(|variant| queue.can_bind(variant));
    if let Some((global, variant)) = &selected {
        debug!(name = global.name, version = global.version, %variant, "Binding color manager");
        queue.bind(global, *variant)?;
    }

    queue.roundtrip(&mut accumulator)?;
    queue.release_registry();

    let Some((_, variant)) = selected else {
        return Err(InertReason::NoColorManager);
    };

    let binding = accumulator.into_binding(variant);
    if let Some(caps) = binding.capabilities() {
        if !caps.has(variant, Capability::Parametric) {
            return Err(InertReason::MissingParametric(variant));
        }
    }

    queue.create_color_surface()?;
    Ok(binding)
}
