//! Functions for loading settings.

use crate::errors::*;
use crate::imm::ImmParams;
use crate::video::backends::{BackendKind, VideoParams};
use crate::window::WindowParams;

/// A structure containing configuration data for the renderer, which are used to
/// specify hardware setup stuff to create the window and other context
/// information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendKind,
    pub window: WindowParams,
    pub video: VideoParams,
    pub imm: ImmParams,
}

impl Settings {
    /// Parses settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings = serde_json::from_str(json)?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// Settings of a headless renderer, with a window of `w` by `h` pixels.
    pub fn headless(w: u32, h: u32) -> Self {
        let mut settings = Settings::default();
        settings.backend = BackendKind::Headless;
        settings.window.size.x = w;
        settings.window.size.y = h;
        settings
    }
}
