//! Frame descriptor data model.
//!
//! Call-site resolution never inspects live program state. A capture
//! collaborator hands the resolver an innermost-first snapshot of
//! already-symbolicated frames, and these types carry exactly the metadata
//! the resolver needs: method identity, declaring type, declaring module,
//! and source location. Everything is plain data with value equality, so
//! any introspection or debug-info backend can satisfy the model.

use std::sync::Arc;

/// Origin of the module a frame's declaring type lives in.
///
/// Frames from `CoreRuntime` and `Logging` modules never produce a call
/// site; the classifier hides them without consulting the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Ordinary application or library code.
    Application,
    /// The runtime / standard library.
    CoreRuntime,
    /// Logging infrastructure (this crate and any wrapper layers).
    Logging,
}

/// Identity of a module (assembly, shared object, image) as reported by the
/// capture backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    name: Arc<str>,
    kind: ModuleKind,
}

impl ModuleRef {
    pub fn new(name: impl Into<Arc<str>>, kind: ModuleKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Display name of the module, e.g. `MyApp, Version=1.0.0.0` or `myapp`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }
}

/// Identity of a declaring type.
///
/// Carries the (possibly compiler-synthesized) simple name, optional
/// namespace, optional enclosing type for nested types, the declaring
/// module, and a lineage list of supertype identities so the resolver can
/// answer "is this the logger type or something derived from it".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    name: Arc<str>,
    namespace: Option<Arc<str>>,
    module: Option<ModuleRef>,
    enclosing: Option<Arc<TypeRef>>,
    lineage: Vec<Arc<str>>,
}

impl TypeRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            module: None,
            enclosing: None,
            lineage: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<Arc<str>>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn in_module(mut self, module: ModuleRef) -> Self {
        self.module = Some(module);
        self
    }

    /// Mark this type as nested inside `enclosing` (state-machine and
    /// closure container types are always nested in the method's type).
    pub fn nested_in(mut self, enclosing: TypeRef) -> Self {
        self.enclosing = Some(Arc::new(enclosing));
        self
    }

    /// Record `ancestor` as a supertype (base class or implemented
    /// interface) of this type. Order is irrelevant.
    pub fn with_supertype(mut self, ancestor: &TypeRef) -> Self {
        self.lineage.push(ancestor.full_name().into());
        self
    }

    /// Simple (possibly synthetic) name, e.g. `Service` or `<Fetch>d__3`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn module(&self) -> Option<&ModuleRef> {
        self.module.as_ref()
    }

    pub fn enclosing(&self) -> Option<&TypeRef> {
        self.enclosing.as_deref()
    }

    pub fn is_nested(&self) -> bool {
        self.enclosing.is_some()
    }

    /// Full display name. Nested types render as `Namespace.Outer+Inner`,
    /// matching how capture backends report container types.
    pub fn full_name(&self) -> String {
        match &self.enclosing {
            Some(outer) => format!("{}+{}", outer.full_name(), self.name),
            None => match &self.namespace {
                Some(ns) => format!("{}.{}", ns, self.name),
                None => self.name.to_string(),
            },
        }
    }

    /// Identity comparison by full display name.
    pub fn is(&self, other: &TypeRef) -> bool {
        self.full_name() == other.full_name()
    }

    /// True when this type is `other` or carries it in its lineage
    /// (subclass or assignable-to).
    pub fn is_assignable_to(&self, other: &TypeRef) -> bool {
        if self.is(other) {
            return true;
        }
        let target = other.full_name();
        self.lineage.iter().any(|ancestor| **ancestor == *target)
    }
}

/// Resolved method identity of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    name: Arc<str>,
    signature: Option<Arc<str>>,
    declaring_type: Option<Arc<TypeRef>>,
}

impl MethodRef {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            signature: None,
            declaring_type: None,
        }
    }

    /// Full signature rendering (name plus parameter types), used when the
    /// caller asks for it and no name cleaning applied.
    pub fn with_signature(mut self, signature: impl Into<Arc<str>>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn declared_in(mut self, declaring_type: TypeRef) -> Self {
        self.declaring_type = Some(Arc::new(declaring_type));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn declaring_type(&self) -> Option<&TypeRef> {
        self.declaring_type.as_deref()
    }
}

/// One immutable element of a captured trace.
///
/// Any of the parts may be absent: an unresolvable frame is a valid input
/// and simply classifies as hidden.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackFrame {
    method: Option<MethodRef>,
    file: Option<Arc<str>>,
    line: Option<u32>,
}

impl StackFrame {
    /// A frame whose symbols could not be resolved.
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn new(method: MethodRef) -> Self {
        Self {
            method: Some(method),
            file: None,
            line: None,
        }
    }

    pub fn at(mut self, file: impl Into<Arc<str>>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    pub fn method(&self) -> Option<&MethodRef> {
        self.method.as_ref()
    }

    pub fn declaring_type(&self) -> Option<&TypeRef> {
        self.method.as_ref().and_then(MethodRef::declaring_type)
    }

    pub fn module(&self) -> Option<&ModuleRef> {
        self.declaring_type().and_then(TypeRef::module)
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

/// Capture boundary: produces an innermost-first snapshot of the current
/// call stack. Index 0 is the frame nearest the capture point.
pub trait StackCapture: Send + Sync {
    fn capture(&self) -> Vec<StackFrame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_plain() {
        let ty = TypeRef::new("Service").with_namespace("Acme.Billing");
        assert_eq!(ty.full_name(), "Acme.Billing.Service");
    }

    #[test]
    fn test_full_name_nested() {
        let outer = TypeRef::new("Service").with_namespace("Acme.Billing");
        let inner = TypeRef::new("<Fetch>d__3").nested_in(outer);
        assert_eq!(inner.full_name(), "Acme.Billing.Service+<Fetch>d__3");
    }

    #[test]
    fn test_assignable_via_lineage() {
        let base = TypeRef::new("Logger").with_namespace("Logging");
        let derived = TypeRef::new("JsonLogger")
            .with_namespace("Logging")
            .with_supertype(&base);
        assert!(derived.is_assignable_to(&base));
        assert!(!base.is_assignable_to(&derived));
    }

    #[test]
    fn test_identity_is_full_name() {
        let a = TypeRef::new("Service").with_namespace("A");
        let b = TypeRef::new("Service").with_namespace("B");
        assert!(!a.is(&b));
        assert!(a.is(&TypeRef::new("Service").with_namespace("A")));
    }

    #[test]
    fn test_unresolved_frame_has_no_metadata() {
        let frame = StackFrame::unresolved();
        assert!(frame.method().is_none());
        assert!(frame.declaring_type().is_none());
        assert!(frame.module().is_none());
        assert!(frame.file().is_none());
        assert_eq!(frame.line(), None);
    }
}
