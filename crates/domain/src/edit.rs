use serde::{Deserialize, Serialize};

use crate::DomainError;

/// The four adjustment channels a slider (or an AI suggestion) can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Brightness,
    Contrast,
    Saturation,
    Temperature,
}

impl AdjustmentKind {
    /// Fixed compilation order: brightness, contrast, saturation, temperature.
    pub const ALL: [AdjustmentKind; 4] = [
        AdjustmentKind::Brightness,
        AdjustmentKind::Contrast,
        AdjustmentKind::Saturation,
        AdjustmentKind::Temperature,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::Temperature => "temperature",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "brightness" => Some(Self::Brightness),
            "contrast" => Some(Self::Contrast),
            "saturation" => Some(Self::Saturation),
            "temperature" => Some(Self::Temperature),
            _ => None,
        }
    }
}

/// One named adjustment with a signed magnitude.
///
/// The value is the absolute slider setting in roughly [-100, 100]; replaying
/// a list of instructions is last-write-wins per kind. Out-of-range values are
/// accepted here and clamped when the filter compiler normalizes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditInstruction {
    pub kind: AdjustmentKind,
    pub value: f32,
}

impl EditInstruction {
    pub fn new(kind: AdjustmentKind, value: f32) -> Result<Self, DomainError> {
        let instruction = Self { kind, value };
        instruction.validate()?;
        Ok(instruction)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.value.is_finite() {
            return Err(DomainError::NonFiniteEditValue(self.kind));
        }
        Ok(())
    }
}

/// UI-facing cumulative setting per adjustment kind.
///
/// Derived state: always recomputed from the current edit list, never mutated
/// independently of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SliderValues {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub temperature: f32,
}

impl SliderValues {
    /// Replay an edit list over a zeroed record, in order, last write wins.
    pub fn replay(edits: &[EditInstruction]) -> Self {
        let mut values = Self::default();
        for edit in edits {
            values.set(edit.kind, edit.value);
        }
        values
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set(&mut self, kind: AdjustmentKind, value: f32) {
        match kind {
            AdjustmentKind::Brightness => self.brightness = value,
            AdjustmentKind::Contrast => self.contrast = value,
            AdjustmentKind::Saturation => self.saturation = value,
            AdjustmentKind::Temperature => self.temperature = value,
        }
    }

    pub fn get(&self, kind: AdjustmentKind) -> f32 {
        match kind {
            AdjustmentKind::Brightness => self.brightness,
            AdjustmentKind::Contrast => self.contrast,
            AdjustmentKind::Saturation => self.saturation,
            AdjustmentKind::Temperature => self.temperature,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of an AI image analysis: a diagnosis plus suggested edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub description: String,
    pub recommended_edits: Vec<EditInstruction>,
}
