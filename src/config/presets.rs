use crate::config::{NONE_ID, WatermarkConfig};
use crate::foundation::error::{OverstampError, OverstampResult};

/// The preset selected for new generations, or none.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActiveWatermark {
    #[default]
    None,
    Preset(String),
}

impl ActiveWatermark {
    pub fn id(&self) -> &str {
        match self {
            Self::None => NONE_ID,
            Self::Preset(id) => id,
        }
    }
}

impl From<String> for ActiveWatermark {
    fn from(id: String) -> Self {
        if id == NONE_ID {
            Self::None
        } else {
            Self::Preset(id)
        }
    }
}

impl From<ActiveWatermark> for String {
    fn from(a: ActiveWatermark) -> Self {
        a.id().to_owned()
    }
}

/// In-memory collection of saved presets plus the active selection.
///
/// Persistence belongs to an external keyed store; this type only defines the JSON document the
/// store keeps and the editing rules applied before it is written back.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetLibrary {
    #[serde(rename = "savedWatermarks")]
    presets: Vec<WatermarkConfig>,
    #[serde(rename = "activeWatermarkId")]
    active: ActiveWatermark,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(s: &str) -> OverstampResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| OverstampError::validation(format!("invalid preset library json: {e}")))
    }

    pub fn to_json(&self) -> OverstampResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| anyhow::Error::new(e).into())
    }

    pub fn presets(&self) -> &[WatermarkConfig] {
        &self.presets
    }

    pub fn active(&self) -> &ActiveWatermark {
        &self.active
    }

    pub fn get(&self, id: &str) -> Option<&WatermarkConfig> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Insert or replace the preset with `cfg.id`; the saved preset becomes active.
    pub fn upsert(&mut self, cfg: WatermarkConfig) -> OverstampResult<()> {
        if cfg.is_none_sentinel() {
            return Err(OverstampError::validation(format!(
                "preset id '{NONE_ID}' is reserved"
            )));
        }
        if cfg.id.is_empty() {
            return Err(OverstampError::validation("preset id must be non-empty"));
        }

        let id = cfg.id.clone();
        match self.presets.iter_mut().find(|p| p.id == cfg.id) {
            Some(slot) => *slot = cfg,
            None => self.presets.push(cfg),
        }
        tracing::debug!(preset = %id, "saved watermark preset");
        self.active = ActiveWatermark::Preset(id);
        Ok(())
    }

    /// Remove a preset. Removing the active preset resets the selection to none.
    pub fn remove(&mut self, id: &str) -> Option<WatermarkConfig> {
        let pos = self.presets.iter().position(|p| p.id == id)?;
        let removed = self.presets.remove(pos);
        if self.active.id() == id {
            self.active = ActiveWatermark::None;
        }
        Some(removed)
    }

    /// Select a preset by id (or [`NONE_ID`]).
    pub fn set_active(&mut self, id: &str) -> OverstampResult<()> {
        if id != NONE_ID && self.get(id).is_none() {
            return Err(OverstampError::validation(format!(
                "no watermark preset with id '{id}'"
            )));
        }
        self.active = ActiveWatermark::from(id.to_owned());
        Ok(())
    }

    /// The preset to apply, or `None` when the selection is the sentinel or dangling.
    pub fn resolve_active(&self) -> Option<&WatermarkConfig> {
        match &self.active {
            ActiveWatermark::None => None,
            ActiveWatermark::Preset(id) => self.get(id),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/presets.rs"]
mod tests;
