//! `log::Log` decorator that attaches call-site identity to every record.
//!
//! [`EnrichLogger`] wraps any inner [`log::Log`] implementation and appends
//! four structured key-values to each record before forwarding it:
//! `class_name`, `method_name`, `file_name`, `line_number`.
//!
//! Two sources feed those values. With a configured [`StackCapture`] the
//! decorator captures a trace per record and resolves the genuine call-site
//! frame through the logger-wrapper type. Without one it falls back to the
//! record's own macro-captured metadata (module path, target, file, line),
//! which plays the role of an explicit caller override and costs no trace
//! capture.

use std::sync::Arc;

use log::{Log, Metadata, Record, kv};
use serde::{Deserialize, Serialize};

use crate::frame::{ModuleKind, ModuleRef, StackCapture, TypeRef};
use crate::registry::HiddenSetRegistry;
use crate::resolver::{CallSiteInfo, CallerInfo, StackResolver};

/// Key names of the enrichment attributes.
pub const CLASS_NAME_KEY: &str = "class_name";
pub const METHOD_NAME_KEY: &str = "method_name";
pub const FILE_NAME_KEY: &str = "file_name";
pub const LINE_NUMBER_KEY: &str = "line_number";

/// Name-cleaning options applied when rendering the resolved call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Render class names with their namespace.
    pub include_namespace: bool,
    /// Render the full method signature when no cleaning applied.
    pub include_signature: bool,
    /// Undo async state-machine containers.
    pub clean_async: bool,
    /// Undo anonymous-closure shapes.
    pub clean_closures: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            include_namespace: true,
            include_signature: false,
            clean_async: true,
            clean_closures: true,
        }
    }
}

/// Failure to install the decorated logger as the global logger.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("global logger already installed: {0}")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

/// Module identity of this crate, used to keep its own frames out of the
/// resolved call site.
pub fn logger_module() -> ModuleRef {
    ModuleRef::new(env!("CARGO_PKG_NAME"), ModuleKind::Logging)
}

/// Call-site enrichment decorator over an inner logger.
pub struct EnrichLogger {
    inner: Box<dyn Log>,
    registry: Arc<HiddenSetRegistry>,
    capture: Option<Box<dyn StackCapture>>,
    logger_type: Option<TypeRef>,
    config: EnrichConfig,
}

impl EnrichLogger {
    pub fn new(inner: Box<dyn Log>) -> Self {
        Self {
            inner,
            registry: Arc::new(HiddenSetRegistry::new()),
            capture: None,
            logger_type: None,
            config: EnrichConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EnrichConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing registry instead of the decorator's own (lets the
    /// application register hidden modules/types before or after install).
    pub fn with_registry(mut self, registry: Arc<HiddenSetRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Enable trace-based resolution: capture a trace per record and
    /// resolve it against `logger_type` (the wrapper type whose frames, and
    /// whose subclasses' frames, must be skipped).
    pub fn with_capture(mut self, capture: Box<dyn StackCapture>, logger_type: TypeRef) -> Self {
        self.capture = Some(capture);
        self.logger_type = Some(logger_type);
        self
    }

    /// The registry consulted during resolution. Collaborating layers
    /// register their own infrastructure here so it never resolves as the
    /// call site.
    pub fn registry(&self) -> Arc<HiddenSetRegistry> {
        Arc::clone(&self.registry)
    }

    /// Install as the global logger. Registers this crate's own module as
    /// hidden first, so wrapper frames never win resolution.
    pub fn install(self, max_level: log::LevelFilter) -> Result<(), InstallError> {
        self.registry.add_hidden_module(&logger_module());
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    /// Resolve call-site identity for one record.
    fn call_site(&self, record: &Record) -> CallSiteInfo {
        let mut info = CallSiteInfo::new();
        match &self.capture {
            Some(capture) => {
                let resolver = StackResolver::new(&self.registry);
                info.set_stack_trace(
                    &resolver,
                    capture.capture(),
                    None,
                    self.logger_type.as_ref(),
                );
            }
            None => {
                info.set_caller_info(CallerInfo {
                    class_name: record.module_path().unwrap_or_default().to_string(),
                    method_name: record.target().to_string(),
                    file_path: record.file().unwrap_or_default().to_string(),
                    line: record.line().unwrap_or(0),
                });
            }
        }
        info
    }
}

impl Log for EnrichLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.inner.enabled(record.metadata()) {
            return;
        }

        let info = self.call_site(record);
        let cfg = &self.config;
        let class_name =
            info.caller_class_name(cfg.include_namespace, cfg.clean_async, cfg.clean_closures);
        let method_name =
            info.caller_method_name(cfg.include_signature, cfg.clean_async, cfg.clean_closures);
        let file_name = info.caller_file_path(0);
        let line_number = info.caller_line_number(0);

        let call_site = CallSiteKv {
            parent: record.key_values(),
            class_name: &class_name,
            method_name: &method_name,
            file_name: &file_name,
            line_number,
        };
        let enriched = record.to_builder().key_values(&call_site).build();
        self.inner.log(&enriched);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Key-value source chaining the record's own pairs with the four
/// enrichment attributes.
struct CallSiteKv<'a> {
    parent: &'a dyn kv::Source,
    class_name: &'a str,
    method_name: &'a str,
    file_name: &'a str,
    line_number: u32,
}

impl kv::Source for CallSiteKv<'_> {
    fn visit<'kv>(&'kv self, visitor: &mut dyn kv::VisitSource<'kv>) -> Result<(), kv::Error> {
        self.parent.visit(visitor)?;
        visitor.visit_pair(
            kv::Key::from_str(CLASS_NAME_KEY),
            kv::Value::from(self.class_name),
        )?;
        visitor.visit_pair(
            kv::Key::from_str(METHOD_NAME_KEY),
            kv::Value::from(self.method_name),
        )?;
        visitor.visit_pair(
            kv::Key::from_str(FILE_NAME_KEY),
            kv::Value::from(self.file_name),
        )?;
        visitor.visit_pair(
            kv::Key::from_str(LINE_NUMBER_KEY),
            kv::Value::from(self.line_number),
        )
    }
}
