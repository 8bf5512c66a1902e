//! Metadata commit
//!
//! Runs inside `vkQueuePresentKHR` for every dirty swapchain, before the
//! driver presents. What goes on the wire depends on the bound protocol:
//!
//! | binding          | requests                                                        |
//! |------------------|-----------------------------------------------------------------|
//! | frog             | `set_known_container_color_volume`, `set_known_transfer_function`, `set_hdr_metadata` |
//! | wp / xx untagged | `unset_image_description`                                       |
//! | wp / xx tagged   | parametric creator, `create`, wait, `set_image_description`, `destroy` |
//!
//! A failed handshake leaves the swapchain dirty so the next present retries.

use tracing::{debug, warn};

use super::{SwapchainColorState, TargetDescription};
use crate::color::ColorDescription;
use crate::metadata::HdrMetadata;
use crate::protocol::{
    wait_for_description, Capability, DescriptionOutcome, Luminances, ParametricDescription,
    ProtocolError, ProtocolVariant,
};
use crate::surface::{CapabilitySet, SurfaceState};

/// What a commit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing changed since the last successful commit
    Clean,
    /// Description and metadata were applied
    Applied,
    /// The surface's description was unset
    Unset,
    /// Nothing was applied; the swapchain stays dirty
    Failed(String),
}

/// Build the parametric description for a tagged swapchain
pub fn parametric_description(
    desc: &ColorDescription,
    variant: ProtocolVariant,
    caps: Option<&CapabilitySet>,
    metadata: &HdrMetadata,
    luminances: Luminances,
) -> ParametricDescription {
    let tokens = desc.tokens(variant);
    let mut description = ParametricDescription::new(
        tokens.primaries,
        tokens.transfer_function,
        metadata.max_cll(),
        metadata.max_fall(),
    );

    let has = |capability: Capability| caps.is_some_and(|caps| caps.has(variant, capability));

    if has(Capability::MasteringDisplayPrimaries) {
        description =
            description.with_mastering(metadata.mastering(variant.mastering_primaries_unit()));
    }
    // Linear content is taken to be Windows-style scRGB
    if has(Capability::SetLuminances) && desc.is_linear(variant) {
        description = description.with_luminances(luminances);
    }

    description
}

/// Send the swapchain's color intent if it changed
pub fn commit(
    swapchain: &mut SwapchainColorState,
    surface: &mut SurfaceState,
    luminances: Luminances,
) -> CommitOutcome {
    if !swapchain.is_dirty() {
        return CommitOutcome::Clean;
    }

    let outcome = match apply(swapchain, surface, luminances) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(surface_id = surface.surface_id(), error = %e, "Committing HDR metadata failed");
            CommitOutcome::Failed(e.to_string())
        }
    };

    if matches!(outcome, CommitOutcome::Applied | CommitOutcome::Unset) {
        swapchain.mark_clean();
    }
    outcome
}

fn apply(
    swapchain: &SwapchainColorState,
    surface: &mut SurfaceState,
    luminances: Luminances,
) -> Result<CommitOutcome, ProtocolError> {
    let variant = surface.variant();
    let metadata = *swapchain.metadata();

    if variant == ProtocolVariant::FrogV1 {
        let tokens = swapchain.target().frog_tokens();
        let queue = surface.queue();
        queue.set_known_container_color_volume(tokens.primaries)?;
        queue.set_known_transfer_function(tokens.transfer_function)?;
        queue.set_hdr_metadata(&metadata.to_frog())?;
        return Ok(CommitOutcome::Applied);
    }

    let desc = match swapchain.target() {
        TargetDescription::Untagged => {
            surface.queue().unset_image_description()?;
            return Ok(CommitOutcome::Unset);
        }
        TargetDescription::Tagged(desc) => desc,
    };

    let description = parametric_description(
        desc,
        variant,
        surface.binding().capabilities(),
        &metadata,
        luminances,
    );
    let surface_id = surface.surface_id();
    let queue = surface.queue();
    let id = queue.create_parametric(&description)?;
    debug!(surface_id, %id, ?description, "Waiting for image description");

    let outcome = match wait_for_description(queue, id) {
        Ok(DescriptionOutcome::Ready { identity }) => {
            let applied = variant
                .perceptual_intent()
                .ok_or(ProtocolError::MissingObject("render intent"))
                .and_then(|intent| queue.set_image_description(id, intent));
            match applied {
                Ok(()) => {
                    debug!(surface_id, identity, "Image description set");
                    CommitOutcome::Applied
                }
                Err(e) => CommitOutcome::Failed(e.to_string()),
            }
        }
        Ok(DescriptionOutcome::Failed { cause, reason }) => {
            warn!(surface_id, cause, %reason, "Creating image description failed");
            CommitOutcome::Failed(reason)
        }
        Err(e) => {
            warn!(surface_id, error = %e, "Image description handshake aborted");
            CommitOutcome::Failed(e.to_string())
        }
    };

    queue.destroy_image_description(id);
    Ok(outcome)
}
