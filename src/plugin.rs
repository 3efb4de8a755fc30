//! Host-facing surface.
//!
//! [`Shared`] is the state every voice of one plugin instance reads: the
//! engine configuration, the wave tables built for it and the parameter
//! array. [`PluginInfo`] describes the shipped fidelity variants.

use log::{debug, warn};

use crate::fm::config::{ConfigError, EngineConfig, Fidelity};
use crate::fm::params::{param_info, ParamInfo, Params, PARAM_COUNT};
use crate::fm::NUM_MOD_INPUTS;
use crate::resources::WaveLibrary;

#[derive(Debug, Clone)]
pub struct Shared {
    config: EngineConfig,
    waves: WaveLibrary,
    params: Params,
}

impl Shared {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            warn!("Rejected engine configuration: {}", err);
            return Err(err);
        }

        debug!(
            "Shared state: {} point tables, {}x oversampling, {:?} envelopes, {:?} levels",
            config.wave_table_size,
            config.oversampling,
            config.envelope_resolution,
            config.level_mode
        );

        Ok(Self {
            config,
            waves: WaveLibrary::new(config.wave_table_size),
            params: Params::new(),
        })
    }

    pub fn with_fidelity(fidelity: Fidelity) -> Result<Self, ConfigError> {
        Self::new(fidelity.config())
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn waves(&self) -> &WaveLibrary {
        &self.waves
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Writes a parameter, clamped to its range. Unknown indices are ignored.
    pub fn set_param(&mut self, index: usize, value: f32) -> bool {
        let stored = self.params.set(index, value);
        if !stored {
            warn!("Ignoring write to unknown parameter {}", index);
        }
        stored
    }

    pub fn param(&self, index: usize) -> f32 {
        self.params.raw(index)
    }
}

/// Descriptor of one plugin variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PluginInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub fidelity: Fidelity,
    pub num_params: usize,
    pub num_mod_inputs: usize,
}

impl PluginInfo {
    pub const fn new(fidelity: Fidelity) -> Self {
        let (id, name) = match fidelity {
            Fidelity::Lofi => ("fm_stack_lofi", "FM Stack Lo-Fi"),
            Fidelity::Standard => ("fm_stack", "FM Stack"),
            Fidelity::High => ("fm_stack_hq", "FM Stack HQ"),
            Fidelity::Ultra => ("fm_stack_uhq", "FM Stack Ultra"),
            Fidelity::Extreme => ("fm_stack_xhq", "FM Stack Extreme"),
        };

        Self {
            id,
            name,
            fidelity,
            num_params: PARAM_COUNT,
            num_mod_inputs: NUM_MOD_INPUTS,
        }
    }

    #[inline]
    pub const fn config(&self) -> EngineConfig {
        self.fidelity.config()
    }

    pub fn new_shared(&self) -> Result<Shared, ConfigError> {
        Shared::new(self.config())
    }

    /// Reflection data for a parameter of this plugin.
    pub fn param(&self, index: usize) -> Option<ParamInfo> {
        param_info(index)
    }
}

pub const NUM_PLUGINS: usize = Fidelity::ALL.len();

static PLUGINS: [PluginInfo; NUM_PLUGINS] = [
    PluginInfo::new(Fidelity::Lofi),
    PluginInfo::new(Fidelity::Standard),
    PluginInfo::new(Fidelity::High),
    PluginInfo::new(Fidelity::Ultra),
    PluginInfo::new(Fidelity::Extreme),
];

/// Enumerates the plugin variants. `None` past the last one.
pub fn plugin_info(index: usize) -> Option<&'static PluginInfo> {
    let info = PLUGINS.get(index);
    if let Some(info) = info {
        debug!("Plugin info {}: {}", index, info.id);
    }
    info
}
