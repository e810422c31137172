// ==========================================
// Roofline Engine - Configuration Layer
// ==========================================
// Typed defaults with config_kv overrides, global scope then tenant
// scope.
// ==========================================

pub mod engine_config;

pub use engine_config::{config_keys, ConfigManager, EngineConfig};
