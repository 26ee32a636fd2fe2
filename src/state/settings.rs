//! User settings persisted between runs

use serde::{Deserialize, Serialize};

/// Process-wide preferences, stored as `{ "soundEnabled", "isDarkMode" }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Play the completion sound
    #[serde(rename = "soundEnabled", default = "default_sound_enabled")]
    pub sound_enabled: bool,
    /// Dark theme selected
    #[serde(rename = "isDarkMode", default)]
    pub dark_mode: bool,
}

fn default_sound_enabled() -> bool {
    true
}

impl Settings {
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    pub fn toggle_theme(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: default_sound_enabled(),
            dark_mode: false,
        }
    }
}
