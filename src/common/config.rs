use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sys::event::Modifiers;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse layout settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{field} must be a finite number >= 0 (got {value})")]
    NegativeGap { field: &'static str, value: f64 },
    #[error("{field} must be in (0, 1] (got {value})")]
    RatioOutOfRange { field: &'static str, value: f64 },
    #[error(
        "column width ratios must satisfy min <= default <= max (got {min} <= {default} <= {max})"
    )]
    RatioOrder { min: f64, default: f64, max: f64 },
    #[error("gesture finger count must be at least 1")]
    NoFingers,
    #[error("gesture sensitivity must be a finite number > 0 (got {0})")]
    Sensitivity(f64),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSettings {
    pub gaps: GapSettings,
    pub scrolling: ScrollingLayoutSettings,
    pub gestures: ScrollGestureSettings,
    pub interactive: InteractiveSettings,
    pub animations: AnimationSettings,
}

impl LayoutSettings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let settings: LayoutSettings = toml::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gaps.validate()?;
        self.scrolling.validate()?;
        self.gestures.validate()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OuterGaps {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Default for OuterGaps {
    fn default() -> Self { Self { top: 8.0, left: 8.0, bottom: 8.0, right: 8.0 } }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InnerGaps {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for InnerGaps {
    fn default() -> Self { Self { horizontal: 8.0, vertical: 8.0 } }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GapSettings {
    pub outer: OuterGaps,
    pub inner: InnerGaps,
}

impl GapSettings {
    pub fn uniform(gap: f64) -> Self {
        Self {
            outer: OuterGaps { top: gap, left: gap, bottom: gap, right: gap },
            inner: InnerGaps { horizontal: gap, vertical: gap },
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("gaps.outer.top", self.outer.top),
            ("gaps.outer.left", self.outer.left),
            ("gaps.outer.bottom", self.outer.bottom),
            ("gaps.outer.right", self.outer.right),
            ("gaps.inner.horizontal", self.inner.horizontal),
            ("gaps.inner.vertical", self.inner.vertical),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeGap { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollingLayoutSettings {
    /// Width of a new column as a fraction of the tiling area.
    pub column_width_ratio: f64,
    pub min_column_width_ratio: f64,
    pub max_column_width_ratio: f64,
    /// Keep the focused column centered instead of snapping to column edges.
    pub center_focused_column: bool,
}

impl Default for ScrollingLayoutSettings {
    fn default() -> Self {
        Self {
            column_width_ratio: 0.5,
            min_column_width_ratio: 0.1,
            max_column_width_ratio: 1.0,
            center_focused_column: false,
        }
    }
}

impl ScrollingLayoutSettings {
    /// Never panics: an inverted range collapses to its lower bound and NaN
    /// bounds or inputs fall back to the nearest usable value.
    pub fn clamp_ratio(&self, ratio: f64) -> f64 {
        let min = self.min_column_width_ratio.max(0.05);
        let max = self.max_column_width_ratio.max(min);
        ratio.max(min).min(max)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("scrolling.column_width_ratio", self.column_width_ratio),
            ("scrolling.min_column_width_ratio", self.min_column_width_ratio),
            ("scrolling.max_column_width_ratio", self.max_column_width_ratio),
        ];
        for (field, value) in fields {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::RatioOutOfRange { field, value });
            }
        }
        if self.min_column_width_ratio > self.column_width_ratio
            || self.column_width_ratio > self.max_column_width_ratio
        {
            return Err(ConfigError::RatioOrder {
                min: self.min_column_width_ratio,
                default: self.column_width_ratio,
                max: self.max_column_width_ratio,
            });
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollGestureSettings {
    pub enabled: bool,
    pub fingers: usize,
    pub sensitivity: f64,
    pub invert_horizontal: bool,
}

impl Default for ScrollGestureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fingers: 3,
            sensitivity: 1.0,
            invert_horizontal: false,
        }
    }
}

impl ScrollGestureSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.fingers == 0 {
            return Err(ConfigError::NoFingers);
        }
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(ConfigError::Sensitivity(self.sensitivity));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InteractiveSettings {
    /// Held while pressing on a tiled window to start dragging it.
    pub move_modifier: Modifiers,
    /// Held in addition to `move_modifier` to drop the window as a new column.
    pub insert_modifier: Modifiers,
}

impl Default for InteractiveSettings {
    fn default() -> Self {
        Self {
            move_modifier: Modifiers::ALT,
            insert_modifier: Modifiers::SHIFT,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnimationCurve {
    Linear,
    EaseOutQuad,
    #[default]
    EaseOutCubic,
    EaseOutExpo,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub off: bool,
    pub duration_ms: u32,
    pub curve: AnimationCurve,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            off: false,
            duration_ms: 250,
            curve: AnimationCurve::EaseOutCubic,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationSettings {
    pub view_offset: AnimationConfig,
    pub window_movement: AnimationConfig,
    pub window_alpha: AnimationConfig,
}
