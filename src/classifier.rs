//! Frame classification.
//!
//! Two questions get asked about every frame during resolution: is it
//! hidden (logging scaffolding, unresolvable, or explicitly excluded), and
//! is it a frame of the logger-wrapper type itself. Unresolvable metadata
//! is a classification input here, never an error.

use crate::frame::{ModuleKind, StackFrame, TypeRef};
use crate::registry::HiddenSetRegistry;

/// Classifies frames against an injected [`HiddenSetRegistry`].
pub struct FrameClassifier<'a> {
    registry: &'a HiddenSetRegistry,
}

impl<'a> FrameClassifier<'a> {
    pub fn new(registry: &'a HiddenSetRegistry) -> Self {
        Self { registry }
    }

    /// True when the frame must be skipped entirely: method, declaring type
    /// or module unresolvable, module is runtime or logging infrastructure,
    /// or module/type registered hidden.
    pub fn is_hidden(&self, frame: &StackFrame) -> bool {
        let Some(method) = frame.method() else {
            return true;
        };
        let Some(ty) = method.declaring_type() else {
            return true;
        };
        let Some(module) = ty.module() else {
            return true;
        };
        if module.kind() != ModuleKind::Application {
            return true;
        }
        self.registry.is_hidden_module(module) || self.registry.is_hidden_type(ty)
    }

    /// True when the frame belongs to the logger wrapper currently
    /// resolving: declaring type equals `logger_type`, derives from it, or
    /// is assignable to it (covers logger subclasses and wrapper chains).
    ///
    /// `logger_type == None` is the defined degraded mode: no frame is a
    /// logger frame, so resolution falls back to the first non-hidden frame.
    pub fn is_logger_frame(frame: &StackFrame, logger_type: Option<&TypeRef>) -> bool {
        let Some(logger_type) = logger_type else {
            return false;
        };
        let Some(ty) = frame.declaring_type() else {
            return false;
        };
        ty.is_assignable_to(logger_type)
    }
}
