//! Logging handlers and logger categories under the logging subsystem.

use crate::config::{LoggerConfig, LoggingHandlerConfig};
use crate::model::{Address, AttributeMap, CliValue};

use super::ModelResource;

/// Builds the driver for a logging handler.
///
/// The handler type is part of the address
/// (`/subsystem=logging/<type>=<name>`), not an attribute. The target file
/// of file-based handlers is a flat record, inlined into the add command.
#[must_use]
pub fn logging_handler(config: &LoggingHandlerConfig) -> ModelResource {
    let address =
        Address::new("subsystem", "logging").child(config.handler_type.as_str(), &config.name);

    let mut desired = AttributeMap::new();
    if let Some(level) = &config.level {
        desired.insert("level", level.as_str());
    }
    if let Some(formatter) = &config.formatter {
        desired.insert("formatter", formatter.as_str());
    }
    if let Some(file) = &config.file {
        let mut record = Vec::new();
        if let Some(relative_to) = &file.relative_to {
            record.push(("relative-to", CliValue::from(relative_to.as_str())));
        }
        record.push(("path", CliValue::from(file.path.as_str())));
        desired.insert("file", CliValue::record(record));
    }
    if let Some(append) = config.append {
        desired.insert("append", append);
    }

    ModelResource::new("logging-handler", &config.name, address, desired)
}

/// Builds the driver for a logger category.
#[must_use]
pub fn logger(config: &LoggerConfig) -> ModelResource {
    let address = Address::new("subsystem", "logging").child("logger", &config.category);

    let mut desired = AttributeMap::new();
    desired.insert("level", config.level.as_str());
    if !config.handlers.is_empty() {
        desired.insert("handlers", config.handlers.clone());
    }
    if let Some(use_parent) = config.use_parent_handlers {
        desired.insert("use-parent-handlers", use_parent);
    }

    ModelResource::new("logger", &config.category, address, desired)
}
