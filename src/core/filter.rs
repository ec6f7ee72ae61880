//! Severity and module filter

use super::{config::LoggerConfig, module::Module, severity::Severity};

/// Whether a message tagged `severity`/`module` passes `config`.
///
/// The severity must reach the configured level and the module tag must
/// share at least one bit with the configured mask.
#[inline]
pub fn should_deliver(severity: Severity, module: Module, config: &LoggerConfig) -> bool {
    severity >= config.log_level && module.intersects(config.mask)
}
