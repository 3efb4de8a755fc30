#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[cfg(feature = "ffi")]
pub mod ffi;
pub mod fm;
pub mod plugin;
pub mod resources;
pub mod utils;

pub use fm::config::{ConfigError, EngineConfig, EnvelopeResolution, Fidelity, LevelMode};
pub use fm::params::{param_info, ParamInfo, Params};
pub use fm::voice::{Glide, Voice};
pub use plugin::{plugin_info, PluginInfo, Shared};
