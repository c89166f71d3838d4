use serde::{Deserialize, Serialize};

/// Discrete speaker volume exposed on the kiosk keypad panel.
///
/// The level-to-gain curve is deliberately non-linear: the jump from muted to
/// the first audible level is the one users notice, so it lands at half gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeLevel {
    Muted,
    Low,
    Medium,
    Full,
}

impl VolumeLevel {
    pub fn gain(self) -> f32 {
        match self {
            VolumeLevel::Muted => 0.0,
            VolumeLevel::Low => 0.5,
            VolumeLevel::Medium => 0.75,
            VolumeLevel::Full => 1.0,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            VolumeLevel::Muted => 0,
            VolumeLevel::Low => 1,
            VolumeLevel::Medium => 2,
            VolumeLevel::Full => 3,
        }
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => VolumeLevel::Muted,
            1 => VolumeLevel::Low,
            2 => VolumeLevel::Medium,
            _ => VolumeLevel::Full,
        }
    }

    /// Next level, wrapping Full back to Muted (single cycle button on the keypad).
    pub fn cycled(self) -> Self {
        Self::from_index((self.index() + 1) % 4)
    }

    pub fn label(self) -> &'static str {
        match self {
            VolumeLevel::Muted => "muted",
            VolumeLevel::Low => "low",
            VolumeLevel::Medium => "medium",
            VolumeLevel::Full => "full",
        }
    }
}

/// Cross-cutting accessibility switches shared by every screen.
///
/// These are reset targets: the idle reset sequence restores all of them to
/// defaults so the next visitor never inherits the previous session's setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilitySettings {
    pub high_contrast: bool,
    pub volume: VolumeLevel,
    pub large_text: bool,
    pub low_screen: bool,
}

impl AccessibilitySettings {
    pub fn new(default_volume: VolumeLevel) -> Self {
        Self {
            high_contrast: false,
            volume: default_volume,
            large_text: false,
            low_screen: false,
        }
    }

    /// Contrast off, default volume, large text off, lowered screen off.
    /// Safe to call any number of times.
    pub fn restore_defaults(&mut self, default_volume: VolumeLevel) {
        self.high_contrast = false;
        self.volume = default_volume;
        self.large_text = false;
        self.low_screen = false;
    }
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self::new(VolumeLevel::Medium)
    }
}
