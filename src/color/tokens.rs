//! Protocol tokens
//!
//! Wire values of the enums shared by the three color-management protocols.
//! Each protocol numbers its enums independently, so a token is only
//! meaningful together with the [`ProtocolVariant`](crate::protocol::ProtocolVariant)
//! it was taken from.

use std::fmt;

macro_rules! token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Raw wire value
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

token!(
    /// Named primaries token
    Primaries
);
token!(
    /// Named transfer function token
    TransferFunction
);
token!(
    /// Optional protocol feature advertised by the color manager
    Feature
);
token!(
    /// Rendering intent used when binding an image description
    RenderIntent
);

/// `frog_color_management_factory_v1` / `frog_color_managed_surface`
pub mod frog {
    use super::{Primaries, TransferFunction};

    /// Registry interface name
    pub const INTERFACE: &str = "frog_color_management_factory_v1";

    pub const PRIMARIES_UNDEFINED: Primaries = Primaries(0);
    pub const PRIMARIES_REC709: Primaries = Primaries(1);
    pub const PRIMARIES_REC2020: Primaries = Primaries(2);

    pub const TRANSFER_FUNCTION_UNDEFINED: TransferFunction = TransferFunction(0);
    pub const TRANSFER_FUNCTION_SRGB: TransferFunction = TransferFunction(1);
    pub const TRANSFER_FUNCTION_GAMMA_22: TransferFunction = TransferFunction(2);
    pub const TRANSFER_FUNCTION_ST2084_PQ: TransferFunction = TransferFunction(3);
    pub const TRANSFER_FUNCTION_SCRGB_LINEAR: TransferFunction = TransferFunction(4);
}

/// `wp_color_manager_v1` (staging color-management-v1)
pub mod wp {
    use super::{Feature, Primaries, RenderIntent, TransferFunction};

    /// Registry interface name
    pub const INTERFACE: &str = "wp_color_manager_v1";

    pub const RENDER_INTENT_PERCEPTUAL: RenderIntent = RenderIntent(0);
    pub const RENDER_INTENT_RELATIVE: RenderIntent = RenderIntent(1);

    pub const FEATURE_ICC_V2_V4: Feature = Feature(0);
    pub const FEATURE_PARAMETRIC: Feature = Feature(1);
    pub const FEATURE_SET_PRIMARIES: Feature = Feature(2);
    pub const FEATURE_SET_TF_POWER: Feature = Feature(3);
    pub const FEATURE_SET_LUMINANCES: Feature = Feature(4);
    pub const FEATURE_SET_MASTERING_DISPLAY_PRIMARIES: Feature = Feature(5);
    pub const FEATURE_EXTENDED_TARGET_VOLUME: Feature = Feature(6);
    pub const FEATURE_WINDOWS_SCRGB: Feature = Feature(7);

    pub const PRIMARIES_SRGB: Primaries = Primaries(1);
    pub const PRIMARIES_PAL_M: Primaries = Primaries(2);
    pub const PRIMARIES_PAL: Primaries = Primaries(3);
    pub const PRIMARIES_NTSC: Primaries = Primaries(4);
    pub const PRIMARIES_GENERIC_FILM: Primaries = Primaries(5);
    pub const PRIMARIES_BT2020: Primaries = Primaries(6);
    pub const PRIMARIES_CIE1931_XYZ: Primaries = Primaries(7);
    pub const PRIMARIES_DCI_P3: Primaries = Primaries(8);
    pub const PRIMARIES_DISPLAY_P3: Primaries = Primaries(9);
    pub const PRIMARIES_ADOBE_RGB: Primaries = Primaries(10);

    pub const TRANSFER_FUNCTION_BT1886: TransferFunction = TransferFunction(1);
    pub const TRANSFER_FUNCTION_GAMMA22: TransferFunction = TransferFunction(2);
    pub const TRANSFER_FUNCTION_GAMMA28: TransferFunction = TransferFunction(3);
    pub const TRANSFER_FUNCTION_ST240: TransferFunction = TransferFunction(4);
    pub const TRANSFER_FUNCTION_EXT_LINEAR: TransferFunction = TransferFunction(5);
    pub const TRANSFER_FUNCTION_LOG_100: TransferFunction = TransferFunction(6);
    pub const TRANSFER_FUNCTION_LOG_316: TransferFunction = TransferFunction(7);
    pub const TRANSFER_FUNCTION_XVYCC: TransferFunction = TransferFunction(8);
    pub const TRANSFER_FUNCTION_SRGB: TransferFunction = TransferFunction(9);
    pub const TRANSFER_FUNCTION_EXT_SRGB: TransferFunction = TransferFunction(10);
    pub const TRANSFER_FUNCTION_ST2084_PQ: TransferFunction = TransferFunction(11);
    pub const TRANSFER_FUNCTION_ST428: TransferFunction = TransferFunction(12);
    pub const TRANSFER_FUNCTION_HLG: TransferFunction = TransferFunction(13);
}

/// `xx_color_manager_v4` (experimental color-management v4)
///
/// Predates v1: numbering starts at 1 and still carries `bt1361`, so every
/// transfer function after `xvycc` is offset by one from its v1 value.
pub mod xx {
    use super::{Feature, Primaries, RenderIntent, TransferFunction};

    /// Registry interface name
    pub const INTERFACE: &str = "xx_color_manager_v4";

    pub const RENDER_INTENT_PERCEPTUAL: RenderIntent = RenderIntent(0);

    pub const FEATURE_ICC_V2_V4: Feature = Feature(0);
    pub const FEATURE_PARAMETRIC: Feature = Feature(1);
    pub const FEATURE_SET_PRIMARIES: Feature = Feature(2);
    pub const FEATURE_SET_TF_POWER: Feature = Feature(3);
    pub const FEATURE_SET_LUMINANCES: Feature = Feature(4);
    pub const FEATURE_SET_MASTERING_DISPLAY_PRIMARIES: Feature = Feature(5);
    pub const FEATURE_EXTENDED_TARGET_VOLUME: Feature = Feature(6);

    pub const PRIMARIES_SRGB: Primaries = Primaries(1);
    pub const PRIMARIES_PAL_M: Primaries = Primaries(2);
    pub const PRIMARIES_PAL: Primaries = Primaries(3);
    pub const PRIMARIES_NTSC: Primaries = Primaries(4);
    pub const PRIMARIES_GENERIC_FILM: Primaries = Primaries(5);
    pub const PRIMARIES_BT2020: Primaries = Primaries(6);
    pub const PRIMARIES_CIE1931_XYZ: Primaries = Primaries(7);
    pub const PRIMARIES_DCI_P3: Primaries = Primaries(8);
    pub const PRIMARIES_DISPLAY_P3: Primaries = Primaries(9);
    pub const PRIMARIES_ADOBE_RGB: Primaries = Primaries(10);

    pub const TRANSFER_FUNCTION_BT709: TransferFunction = TransferFunction(1);
    pub const TRANSFER_FUNCTION_GAMMA22: TransferFunction = TransferFunction(2);
    pub const TRANSFER_FUNCTION_GAMMA28: TransferFunction = TransferFunction(3);
    pub const TRANSFER_FUNCTION_ST240: TransferFunction = TransferFunction(4);
    pub const TRANSFER_FUNCTION_LINEAR: TransferFunction = TransferFunction(5);
    pub const TRANSFER_FUNCTION_LOG_100: TransferFunction = TransferFunction(6);
    pub const TRANSFER_FUNCTION_LOG_316: TransferFunction = TransferFunction(7);
    pub const TRANSFER_FUNCTION_XVYCC: TransferFunction = TransferFunction(8);
    pub const TRANSFER_FUNCTION_BT1361: TransferFunction = TransferFunction(9);
    pub const TRANSFER_FUNCTION_SRGB: TransferFunction = TransferFunction(10);
    pub const TRANSFER_FUNCTION_EXT_SRGB: TransferFunction = TransferFunction(11);
    pub const TRANSFER_FUNCTION_ST2084_PQ: TransferFunction = TransferFunction(12);
    pub const TRANSFER_FUNCTION_ST428: TransferFunction = TransferFunction(13);
    pub const TRANSFER_FUNCTION_HLG: TransferFunction = TransferFunction(14);
}
