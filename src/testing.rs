//! Shared test helpers for resolver and enrichment tests.
//!
//! Canonical factories for fabricated traces, used by module unit tests and
//! the integration tests under `tests/`. Public (rather than `#[cfg(test)]`)
//! so the integration tests can reach it; not part of the supported API.

#![doc(hidden)]

use crate::frame::{MethodRef, ModuleKind, ModuleRef, StackCapture, StackFrame, TypeRef};

/// Module used for fabricated application frames.
pub fn app_module() -> ModuleRef {
    ModuleRef::new("TestApp, Version=1.0.0.0", ModuleKind::Application)
}

/// An application type in [`app_module`].
pub fn app_type(namespace: &str, name: &str) -> TypeRef {
    TypeRef::new(name)
        .with_namespace(namespace)
        .in_module(app_module())
}

/// A resolvable application frame with source location.
pub fn app_frame(ty: &TypeRef, method: &str, file: &str, line: u32) -> StackFrame {
    StackFrame::new(MethodRef::new(method).declared_in(ty.clone())).at(file, line)
}

/// A frame of the given logger type (declared in an application module, as
/// a wrapper library's frames are).
pub fn logger_frame(logger_type: &TypeRef, method: &str) -> StackFrame {
    let ty = logger_type.clone().in_module(app_module());
    StackFrame::new(MethodRef::new(method).declared_in(ty))
}

/// A frame from core-runtime code; always classified hidden.
pub fn runtime_frame(type_name: &str, method: &str) -> StackFrame {
    let ty = TypeRef::new(type_name)
        .with_namespace("System.Private")
        .in_module(ModuleRef::new("corelib", ModuleKind::CoreRuntime));
    StackFrame::new(MethodRef::new(method).declared_in(ty))
}

/// Fluent builder for fabricated innermost-first traces.
#[derive(Default)]
pub struct TraceBuilder {
    frames: Vec<StackFrame>,
}

impl TraceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn user(self, ty: &TypeRef, method: &str, file: &str, line: u32) -> Self {
        let frame = app_frame(ty, method, file, line);
        self.frame(frame)
    }

    pub fn logger(self, logger_type: &TypeRef, method: &str) -> Self {
        let frame = logger_frame(logger_type, method);
        self.frame(frame)
    }

    pub fn runtime(self, type_name: &str, method: &str) -> Self {
        let frame = runtime_frame(type_name, method);
        self.frame(frame)
    }

    pub fn unresolved(self) -> Self {
        self.frame(StackFrame::unresolved())
    }

    pub fn build(self) -> Vec<StackFrame> {
        self.frames
    }
}

/// [`StackCapture`] returning a fixed fabricated trace.
pub struct FixedCapture {
    frames: Vec<StackFrame>,
}

impl FixedCapture {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }
}

impl StackCapture for FixedCapture {
    fn capture(&self) -> Vec<StackFrame> {
        self.frames.clone()
    }
}
