//! `wayland-client` backend
//!
//! A [`ProtocolQueue`] on a real compositor connection, speaking
//! `wp_color_manager_v1` through the staging bindings of `wayland-protocols`.
//! frog and xx v4 have no published Rust bindings, so this backend reports
//! them as unbindable and discovery falls through to v1.
//!
//! Dispatch handlers only translate events into [`ProtocolEvent`]s; they are
//! buffered in [`QueueState`] and handed to the caller's sink after each pump.

use std::collections::HashMap;

use tracing::{debug, trace};
use wayland_client::protocol::{wl_registry, wl_surface::WlSurface};
use wayland_client::{Connection, Dispatch, EventQueue, Proxy, QueueHandle, WEnum};
use wayland_protocols::wp::color_management::v1::client::{
    wp_color_management_surface_v1::{self, WpColorManagementSurfaceV1},
    wp_color_manager_v1::{self, WpColorManagerV1},
    wp_image_description_creator_params_v1::{self, WpImageDescriptionCreatorParamsV1},
    wp_image_description_v1::{self, WpImageDescriptionV1},
};

use super::{
    DescriptionId, EventSink, FrogHdrMetadata, Global, ParametricDescription, ProtocolError,
    ProtocolEvent, ProtocolQueue, ProtocolVariant, Result,
};
use crate::color::{Feature, Primaries, RenderIntent, TransferFunction};

/// Highest `wp_color_manager_v1` version this backend speaks
const MANAGER_VERSION: u32 = 1;

/// Events collected by the dispatch handlers during one pump
#[derive(Debug, Default)]
pub struct QueueState {
    events: Vec<ProtocolEvent>,
}

/// Dedicated event queue for one `wl_surface`
pub struct WaylandColorQueue {
    connection: Connection,
    queue: EventQueue<QueueState>,
    handle: QueueHandle<QueueState>,
    state: QueueState,
    surface: WlSurface,
    registry: Option<wl_registry::WlRegistry>,
    manager: Option<WpColorManagerV1>,
    color_surface: Option<WpColorManagementSurfaceV1>,
    descriptions: HashMap<DescriptionId, WpImageDescriptionV1>,
    next_description: u32,
}

impl WaylandColorQueue {
    /// New queue on `connection` for `surface`
    pub fn new(connection: &Connection, surface: WlSurface) -> Self {
        let queue = connection.new_event_queue();
        let handle = queue.handle();
        Self {
            connection: connection.clone(),
            queue,
            handle,
            state: QueueState::default(),
            surface,
            registry: None,
            manager: None,
            color_surface: None,
            descriptions: HashMap::new(),
            next_description: 0,
        }
    }

    fn deliver(&mut self, sink: &mut dyn EventSink) {
        for event in self.state.events.drain(..) {
            sink.handle(event);
        }
    }

    fn manager(&self) -> Result<&WpColorManagerV1> {
        self.manager
            .as_ref()
            .ok_or(ProtocolError::MissingObject("wp_color_manager_v1"))
    }

    fn color_surface(&self) -> Result<&WpColorManagementSurfaceV1> {
        self.color_surface
            .as_ref()
            .ok_or(ProtocolError::MissingObject("wp_color_management_surface_v1"))
    }
}

fn raw<T: Into<u32>>(value: WEnum<T>) -> u32 {
    match value {
        WEnum::Value(value) => value.into(),
        WEnum::Unknown(value) => value,
    }
}

fn wire<T: TryFrom<u32>>(kind: &'static str, value: u32) -> Result<T> {
    T::try_from(value).map_err(|_| ProtocolError::UnknownToken {
        variant: ProtocolVariant::WpV1,
        kind,
        value,
    })
}

fn frog_unsupported() -> ProtocolError {
    ProtocolError::MissingObject("frog_color_managed_surface")
}

impl ProtocolQueue for WaylandColorQueue {
    fn surface_id(&self) -> u32 {
        self.surface.id().protocol_id()
    }

    fn can_bind(&self, variant: ProtocolVariant) -> bool {
        variant == ProtocolVariant::WpV1
    }

    fn request_globals(&mut self) -> Result<()> {
        let display = self.connection.display();
        self.registry = Some(display.get_registry(&self.handle, ()));
        Ok(())
    }

    fn release_registry(&mut self) {
        // wl_registry has no destructor request
        self.registry = None;
    }

    fn bind(&mut self, global: &Global, variant: ProtocolVariant) -> Result<()> {
        if variant != ProtocolVariant::WpV1 {
            return Err(ProtocolError::Bind {
                variant,
                reason: "no client bindings for this protocol".to_string(),
            });
        }
        let registry = self
            .registry
            .as_ref()
            .ok_or(ProtocolError::MissingObject("wl_registry"))?;

        let manager = registry.bind::<WpColorManagerV1, _, _>(
            global.name,
            global.version.min(MANAGER_VERSION),
            &self.handle,
            (),
        );
        debug!(name = global.name, "Bound wp_color_manager_v1");
        self.manager = Some(manager);
        Ok(())
    }

    fn create_color_surface(&mut self) -> Result<()> {
        let color_surface = self.manager()?.get_surface(&self.surface, &self.handle, ());
        self.color_surface = Some(color_surface);
        self.connection
            .flush()
            .map_err(|e| ProtocolError::Dispatch(e.to_string()))
    }

    fn dispatch_pending(&mut self, sink: &mut dyn EventSink) -> Result<usize> {
        let dispatched = self
            .queue
            .dispatch_pending(&mut self.state)
            .map_err(|e| ProtocolError::Dispatch(e.to_string()))?;
        self.deliver(sink);
        Ok(dispatched)
    }

    fn roundtrip(&mut self, sink: &mut dyn EventSink) -> Result<usize> {
        let dispatched = self
            .queue
            .roundtrip(&mut self.state)
            .map_err(|e| ProtocolError::Dispatch(e.to_string()))?;
        self.deliver(sink);
        Ok(dispatched)
    }

    fn set_known_container_color_volume(&mut self, _primaries: Primaries) -> Result<()> {
        Err(frog_unsupported())
    }

    fn set_known_transfer_function(&mut self, _transfer_function: TransferFunction) -> Result<()> {
        Err(frog_unsupported())
    }

    fn set_hdr_metadata(&mut self, _metadata: &FrogHdrMetadata) -> Result<()> {
        Err(frog_unsupported())
    }

    fn unset_image_description(&mut self) -> Result<()> {
        self.color_surface()?.unset_image_description();
        Ok(())
    }

    fn create_parametric(&mut self, description: &ParametricDescription) -> Result<DescriptionId> {
        let primaries: wp_color_manager_v1::Primaries =
            wire("primaries", description.primaries.raw())?;
        let transfer_function: wp_color_manager_v1::TransferFunction =
            wire("transfer function", description.transfer_function.raw())?;

        let creator = self.manager()?.create_parametric_creator(&self.handle, ());
        creator.set_primaries_named(primaries);
        creator.set_tf_named(transfer_function);
        creator.set_max_fall(description.max_fall);
        creator.set_max_cll(description.max_cll);

        if let Some(mastering) = &description.mastering {
            let [rx, ry, gx, gy, bx, by, wx, wy] = mastering.primaries;
            creator.set_mastering_luminance(mastering.min_luminance, mastering.max_luminance);
            creator.set_mastering_display_primaries(rx, ry, gx, gy, bx, by, wx, wy);
        }
        if let Some(luminances) = &description.luminances {
            creator.set_luminances(luminances.min, luminances.max, luminances.reference);
        }

        let id = DescriptionId(self.next_description);
        self.next_description = self.next_description.wrapping_add(1);

        // `create` destroys the creator
        let image_description = creator.create(&self.handle, id);
        self.descriptions.insert(id, image_description);
        Ok(id)
    }

    fn set_image_description(&mut self, id: DescriptionId, intent: RenderIntent) -> Result<()> {
        let intent: wp_color_manager_v1::RenderIntent = wire("render intent", intent.raw())?;
        let image_description = self
            .descriptions
            .get(&id)
            .ok_or(ProtocolError::UnknownDescription(id))?;
        self.color_surface()?
            .set_image_description(image_description, intent);
        Ok(())
    }

    fn destroy_image_description(&mut self, id: DescriptionId) {
        if let Some(image_description) = self.descriptions.remove(&id) {
            image_description.destroy();
        }
    }

    fn destroy_color_surface(&mut self) {
        if let Some(color_surface) = self.color_surface.take() {
            color_surface.destroy();
        }
    }

    fn destroy_manager(&mut self) {
        if let Some(manager) = self.manager.take() {
            manager.destroy();
        }
    }

    fn destroy_queue(&mut self) {
        for (_, image_description) in self.descriptions.drain() {
            image_description.destroy();
        }
        self.registry = None;
        if let Err(e) = self.connection.flush() {
            debug!(error = %e, "Flushing on queue teardown failed");
        }
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for QueueState {
    fn event(
        state: &mut Self,
        _proxy: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => state.events.push(ProtocolEvent::Global(Global {
                name,
                interface,
                version,
            })),
            wl_registry::Event::GlobalRemove { name } => {
                state.events.push(ProtocolEvent::GlobalRemove { name })
            }
            _ => {}
        }
    }
}

impl Dispatch<WpColorManagerV1, ()> for QueueState {
    fn event(
        state: &mut Self,
        _proxy: &WpColorManagerV1,
        event: wp_color_manager_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        let event = match event {
            wp_color_manager_v1::Event::SupportedIntent { render_intent } => {
                ProtocolEvent::SupportedIntent(RenderIntent(raw(render_intent)))
            }
            wp_color_manager_v1::Event::SupportedFeature { feature } => {
                ProtocolEvent::SupportedFeature(Feature(raw(feature)))
            }
            wp_color_manager_v1::Event::SupportedTfNamed { tf } => {
                ProtocolEvent::SupportedTransferFunction(TransferFunction(raw(tf)))
            }
            wp_color_manager_v1::Event::SupportedPrimariesNamed { primaries } => {
                ProtocolEvent::SupportedPrimaries(Primaries(raw(primaries)))
            }
            wp_color_manager_v1::Event::Done => ProtocolEvent::CapabilitiesDone,
            other => {
                trace!(?other, "Unhandled color manager event");
                return;
            }
        };
        state.events.push(event);
    }
}

impl Dispatch<WpColorManagementSurfaceV1, ()> for QueueState {
    fn event(
        _state: &mut Self,
        _proxy: &WpColorManagementSurfaceV1,
        _event: wp_color_management_surface_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        // No events
    }
}

impl Dispatch<WpImageDescriptionCreatorParamsV1, ()> for QueueState {
    fn event(
        _state: &mut Self,
        _proxy: &WpImageDescriptionCreatorParamsV1,
        _event: wp_image_description_creator_params_v1::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        // No events
    }
}

impl Dispatch<WpImageDescriptionV1, DescriptionId> for QueueState {
    fn event(
        state: &mut Self,
        _proxy: &WpImageDescriptionV1,
        event: wp_image_description_v1::Event,
        id: &DescriptionId,
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        match event {
            wp_image_description_v1::Event::Ready { identity } => {
                state.events.push(ProtocolEvent::DescriptionReady {
                    id: *id,
                    identity,
                });
            }
            wp_image_description_v1::Event::Failed { cause, msg } => {
                state.events.push(ProtocolEvent::DescriptionFailed {
                    id: *id,
                    cause: raw(cause),
                    reason: msg,
                });
            }
            other => trace!(?other, "Unhandled image description event"),
        }
    }
}
