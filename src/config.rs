//! Agent and handler configuration.
//!
//! Configuration is plain `serde` data, loadable from TOML or JSON:
//!
//! ```toml
//! [[agents]]
//! name = "mouse"
//! sensitivities = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
//!
//! [agents.ids]
//! left = 1
//! right = 2
//!
//! [[profiles]]
//! name = "editor"
//!
//! [[profiles.bindings]]
//! action = "drag"
//! shortcut = { kind = "basic", id = 1 }
//! ```
//!
//! Gesture ids that used to be hard-wired constants (mouse buttons, wheel,
//! click) live in each agent's `ids` table, so different devices can map them
//! differently.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binding::BindingProfile;
use crate::error::{BiasError, Result};
use crate::event::{EventId, NO_ID};

/// Settings for one agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Label used in diagnostics and for lookup.
    pub name: String,
    /// Whether the agent starts with tracking enabled.
    pub tracking: bool,
    /// Per-axis delta multipliers for absolute motion events
    /// (`x, y, z, rx, ry, rz`; lower-DOF events use the leading entries).
    pub sensitivities: [f32; 6],
    /// Named gesture ids.
    pub ids: BTreeMap<String, EventId>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "agent".to_string(),
            tracking: true,
            sensitivities: [1.0; 6],
            ids: BTreeMap::new(),
        }
    }
}

impl AgentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Config with the standard pointer ids: `none`, `left`, `right`,
    /// `middle`, `wheel` and `click`.
    pub fn pointer(name: impl Into<String>) -> Self {
        Self::new(name)
            .with_id("none", NO_ID)
            .with_id("left", 1)
            .with_id("right", 2)
            .with_id("middle", 4)
            .with_id("wheel", 10)
            .with_id("click", 11)
    }

    pub fn with_id(mut self, name: impl Into<String>, id: EventId) -> Self {
        self.ids.insert(name.into(), id);
        self
    }

    pub fn with_sensitivities(mut self, sensitivities: [f32; 6]) -> Self {
        self.sensitivities = sensitivities;
        self
    }

    pub fn with_tracking(mut self, tracking: bool) -> Self {
        self.tracking = tracking;
        self
    }

    /// Rejects non-finite sensitivities.
    pub fn validate(&self) -> Result<()> {
        match self.sensitivities.iter().position(|s| !s.is_finite()) {
            Some(axis) => Err(BiasError::InvalidSensitivities {
                agent: self.name.clone(),
                axis,
            }),
            None => Ok(()),
        }
    }
}

/// Full configuration: agents to create and binding profiles to offer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasConfig {
    pub agents: Vec<AgentConfig>,
    pub profiles: Vec<BindingProfile>,
}

impl BiasConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Loads a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            Some("json") => Self::from_json_str(&text),
            _ => Err(BiasError::UnsupportedConfigFormat(path.display().to_string())),
        }
    }

    pub fn profile(&self, name: &str) -> Option<&BindingProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;
    use crate::shortcut::Shortcut;

    const SAMPLE: &str = r#"
        [[agents]]
        name = "mouse"
        sensitivities = [2.0, 2.0, 1.0, 1.0, 1.0, 1.0]

        [agents.ids]
        left = 1
        wheel = 10

        [[agents]]
        name = "keyboard"
        tracking = false

        [[profiles]]
        name = "editor"

        [[profiles.bindings]]
        action = "drag"
        shortcut = { kind = "basic", id = 1 }

        [[profiles.bindings]]
        action = "zoom"
        shortcut = { kind = "basic", modifiers = "CTRL", id = 10 }
    "#;

    #[test]
    fn parses_agents_and_profiles() {
        let config = BiasConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.agents.len(), 2);

        let mouse = &config.agents[0];
        assert_eq!(mouse.name, "mouse");
        assert!(mouse.tracking);
        assert_eq!(mouse.sensitivities[0], 2.0);
        assert_eq!(mouse.ids.get("wheel"), Some(&10));

        let keyboard = &config.agents[1];
        assert!(!keyboard.tracking);
        assert_eq!(keyboard.sensitivities, [1.0; 6]);

        let editor = config.profile("editor").unwrap();
        assert_eq!(editor.bindings.len(), 2);
        assert_eq!(editor.bindings[1].shortcut, Shortcut::new(Modifiers::CTRL, 10));
    }

    #[test]
    fn json_and_toml_agree() {
        let json = r#"{ "agents": [ { "name": "mouse", "ids": { "left": 1 } } ] }"#;
        let from_json = BiasConfig::from_json_str(json).unwrap();
        let from_toml = BiasConfig::from_toml_str("[[agents]]\nname = \"mouse\"\nids = { left = 1 }\n").unwrap();
        assert_eq!(from_json, from_toml);
    }

    #[test]
    fn pointer_ids() {
        let config = AgentConfig::pointer("mouse");
        assert_eq!(config.ids["none"], NO_ID);
        assert_eq!(config.ids["middle"], 4);
        assert_eq!(config.ids["click"], 11);
    }

    #[test]
    fn rejects_non_finite_sensitivity() {
        let config = AgentConfig::new("pad").with_sensitivities([1.0, f32::NAN, 1.0, 1.0, 1.0, 1.0]);
        assert!(matches!(
            config.validate(),
            Err(BiasError::InvalidSensitivities { axis: 1, .. })
        ));
    }

    #[test]
    fn load_reads_toml_and_json_files() {
        let dir = std::env::temp_dir();
        let toml_path = dir.join(format!("bias-config-{}.toml", std::process::id()));
        let json_path = dir.join(format!("bias-config-{}.json", std::process::id()));

        std::fs::write(&toml_path, SAMPLE).unwrap();
        let from_toml = BiasConfig::load(&toml_path).unwrap();
        assert_eq!(from_toml, BiasConfig::from_toml_str(SAMPLE).unwrap());

        std::fs::write(&json_path, serde_json::to_string(&from_toml).unwrap()).unwrap();
        let from_json = BiasConfig::load(&json_path).unwrap();
        assert_eq!(from_json, from_toml);
        assert_eq!(from_json.agents[0].ids.get("left"), Some(&1));

        let _ = std::fs::remove_file(toml_path);
        let _ = std::fs::remove_file(json_path);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let path = std::env::temp_dir().join("bias-config-test.yaml");
        std::fs::write(&path, "agents = []").unwrap();
        assert!(matches!(
            BiasConfig::load(&path),
            Err(BiasError::UnsupportedConfigFormat(_))
        ));
        let _ = std::fs::remove_file(path);
    }
}
