//! Synthetic-name cleanup.
//!
//! Compilers that lower async methods and closures into generated types
//! leave their mark on resolved frames: the resume method of an async
//! state machine reports as `Namespace.Service+<Fetch>d__3.MoveNext`, an
//! anonymous closure as `<Caller>b__0` inside a `+<>c__DisplayClass`
//! container. This module undoes both patterns so the enriched log entry
//! names `Service.Fetch` instead of the generated scaffolding.
//!
//! The marker shapes below follow the CLR code-generation convention; they
//! are grouped here so a backend with a different convention is a contained
//! change.

use std::sync::OnceLock;

use regex::Regex;

use crate::frame::{MethodRef, ModuleKind, TypeRef};

/// Method name the compiler gives the resume method of an async or
/// generator state machine.
pub const CONTINUATION_ENTRY_POINT: &str = "MoveNext";

/// Leading marker of a compiler-synthesized name (`<Fetch>d__3`, `<Main>b__2`).
const SYNTHETIC_OPEN: char = '<';
const SYNTHETIC_CLOSE: char = '>';

/// Marker sequence of an anonymous-closure container type in a full type
/// name, e.g. `App.Service+<>c__DisplayClass0_0`.
const CLOSURE_CONTAINER_MARKER: &str = "+<>";

/// Namespace prefixes reserved by the platform/vendor; never synthesized
/// from a module display name.
const RESERVED_NAMESPACE_PREFIXES: &[&str] = &["System.", "Microsoft."];

/// Anonymous-closure method shape: `<Name>` followed by a `__` separator
/// somewhere after the closing marker, e.g. `<Main>b__2` or `<.ctor>b__0`.
fn re_closure_method() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^<([^>]+)>.*__").unwrap())
}

/// True when `ty` is a compiler-generated state-machine container: a nested
/// type whose name starts with the synthetic marker and closes it after at
/// least one character.
fn is_state_machine_container(ty: &TypeRef) -> bool {
    if !ty.is_nested() || !ty.name().starts_with(SYNTHETIC_OPEN) {
        return false;
    }
    match ty.name()[1..].find(SYNTHETIC_CLOSE) {
        Some(rel) => rel >= 1,
        None => false,
    }
}

/// Produce a readable method name for a resolved frame method.
///
/// - `clean_async`: undo the continuation container, recovering the
///   original method name from the declaring type (`<Fetch>d__3.MoveNext`
///   becomes `Fetch`). Local functions and anonymous tasks carry one more
///   leading marker, which is stripped as well.
/// - `clean_closures`: undo the anonymous-closure shape (`<Main>b__2`
///   becomes `Main`).
/// - `include_signature`: when no cleaning applied, return the full method
///   signature instead of the bare name.
pub fn clean_method_name(
    method: &MethodRef,
    include_signature: bool,
    clean_async: bool,
    clean_closures: bool,
) -> String {
    let mut name = method.name().to_string();

    if clean_async
        && name == CONTINUATION_ENTRY_POINT
        && let Some(ty) = method.declaring_type()
        && is_state_machine_container(ty)
        && let Some(rel) = ty.name()[1..].find(SYNTHETIC_CLOSE)
    {
        let inner = &ty.name()[1..1 + rel];
        // Local functions and anonymous tasks nest one more marker level.
        name = inner.strip_prefix(SYNTHETIC_OPEN).unwrap_or(inner).to_string();
    }

    if clean_closures
        && let Some(caps) = re_closure_method().captures(&name)
    {
        name = caps[1].to_string();
    }

    if include_signature
        && name == method.name()
        && let Some(signature) = method.signature()
    {
        return signature.to_string();
    }

    name
}

/// Produce a readable class name for a resolved frame method.
///
/// State-machine containers are replaced by their enclosing type; anonymous
/// closure containers are truncated at the container marker (or replaced by
/// the enclosing type's simple name when the namespace is excluded). When a
/// namespace is requested but the name has none, one is synthesized from
/// the declaring module's display name.
pub fn clean_class_name(
    method: &MethodRef,
    include_namespace: bool,
    clean_async: bool,
    clean_closures: bool,
) -> String {
    let Some(mut ty) = method.declaring_type() else {
        return String::new();
    };

    if clean_async
        && method.name() == CONTINUATION_ENTRY_POINT
        && is_state_machine_container(ty)
        && let Some(enclosing) = ty.enclosing()
    {
        ty = enclosing;
    }

    let mut class_name = if include_namespace {
        ty.full_name()
    } else {
        ty.name().to_string()
    };

    if clean_closures && class_name.contains("<>") {
        if !include_namespace && ty.is_nested() {
            if let Some(enclosing) = ty.enclosing() {
                class_name = enclosing.name().to_string();
            }
        } else if let Some(index) = class_name.find(CLOSURE_CONTAINER_MARKER) {
            class_name.truncate(index);
        }
    }

    if include_namespace
        && !class_name.contains('.')
        && let Some(namespace) = namespace_from_module(ty)
    {
        class_name = format!("{namespace}.{class_name}");
    }

    class_name
}

/// Derive a namespace from the declaring module's display name: the text
/// before the first comma, excluding core-runtime modules and reserved
/// platform prefixes.
fn namespace_from_module(ty: &TypeRef) -> Option<&str> {
    let module = ty.module()?;
    if module.kind() != ModuleKind::Application {
        return None;
    }
    let display = module.name();
    let comma = display.find(',')?;
    let prefix = &display[..comma];
    if RESERVED_NAMESPACE_PREFIXES
        .iter()
        .any(|reserved| display.starts_with(reserved))
    {
        return None;
    }
    Some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ModuleRef;

    fn app_module() -> ModuleRef {
        ModuleRef::new("Acme.Billing, Version=1.0.0.0", ModuleKind::Application)
    }

    fn async_method(container: &str) -> MethodRef {
        let outer = TypeRef::new("Service")
            .with_namespace("Acme.Billing")
            .in_module(app_module());
        let state_machine = TypeRef::new(container)
            .nested_in(outer)
            .in_module(app_module());
        MethodRef::new(CONTINUATION_ENTRY_POINT).declared_in(state_machine)
    }

    #[test]
    fn test_async_continuation_method_name() {
        let method = async_method("<FetchData>d__3");
        assert_eq!(clean_method_name(&method, false, true, true), "FetchData");
    }

    #[test]
    fn test_local_function_strips_extra_marker() {
        let method = async_method("<<Run>g__Inner|0_0>d");
        assert_eq!(clean_method_name(&method, false, true, true), "Run");
    }

    #[test]
    fn test_async_cleaning_disabled_keeps_entry_point() {
        let method = async_method("<FetchData>d__3");
        assert_eq!(
            clean_method_name(&method, false, false, false),
            CONTINUATION_ENTRY_POINT
        );
    }

    #[test]
    fn test_anonymous_closure_method_name() {
        let method = MethodRef::new("<Main>b__2");
        assert_eq!(clean_method_name(&method, false, false, true), "Main");
    }

    #[test]
    fn test_constructor_closure_method_name() {
        let method = MethodRef::new("<.ctor>b__0");
        assert_eq!(clean_method_name(&method, false, false, true), ".ctor");
    }

    #[test]
    fn test_plain_name_untouched() {
        let method = MethodRef::new("Process");
        assert_eq!(clean_method_name(&method, false, true, true), "Process");
    }

    #[test]
    fn test_signature_only_when_no_cleaning_applied() {
        let plain = MethodRef::new("Process").with_signature("Void Process(Int32, String)");
        assert_eq!(
            clean_method_name(&plain, true, true, true),
            "Void Process(Int32, String)"
        );

        let cleaned = async_method("<FetchData>d__3");
        // Cleaning applied, so the signature is not substituted.
        assert_eq!(clean_method_name(&cleaned, true, true, true), "FetchData");
    }

    #[test]
    fn test_class_name_replaces_state_machine_container() {
        let method = async_method("<FetchData>d__3");
        assert_eq!(
            clean_class_name(&method, true, true, true),
            "Acme.Billing.Service"
        );
        assert_eq!(clean_class_name(&method, false, true, true), "Service");
    }

    #[test]
    fn test_class_name_truncates_closure_container() {
        let outer = TypeRef::new("Service")
            .with_namespace("Acme.Billing")
            .in_module(app_module());
        let container = TypeRef::new("<>c__DisplayClass0_0")
            .nested_in(outer)
            .in_module(app_module());
        let method = MethodRef::new("<Main>b__2").declared_in(container);

        assert_eq!(
            clean_class_name(&method, true, false, true),
            "Acme.Billing.Service"
        );
        // Without namespace the enclosing type's simple name substitutes.
        assert_eq!(clean_class_name(&method, false, false, true), "Service");
    }

    #[test]
    fn test_namespace_synthesized_from_module() {
        let ty = TypeRef::new("Widget").in_module(app_module());
        let method = MethodRef::new("draw").declared_in(ty);
        assert_eq!(
            clean_class_name(&method, true, false, false),
            "Acme.Billing.Widget"
        );
    }

    #[test]
    fn test_reserved_module_names_not_synthesized() {
        let module = ModuleRef::new("System.Private.CoreLib, Version=8.0", ModuleKind::Application);
        let ty = TypeRef::new("Widget").in_module(module);
        let method = MethodRef::new("draw").declared_in(ty);
        assert_eq!(clean_class_name(&method, true, false, false), "Widget");
    }

    #[test]
    fn test_module_without_display_suffix_not_synthesized() {
        // No comma in the display name means no namespace can be derived.
        let module = ModuleRef::new("acme", ModuleKind::Application);
        let ty = TypeRef::new("Widget").in_module(module);
        let method = MethodRef::new("draw").declared_in(ty);
        assert_eq!(clean_class_name(&method, true, false, false), "Widget");
    }

    #[test]
    fn test_missing_declaring_type_yields_empty() {
        let method = MethodRef::new("orphan");
        assert_eq!(clean_class_name(&method, true, true, true), "");
    }
}
