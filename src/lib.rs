//! Call-site enrichment for log records.
//!
//! Attaches the identity of the code that actually issued a log call
//! (class, method, file, line) to each record, even when the frames above
//! the logging call belong to logging scaffolding, decorator chains, or
//! async continuation machinery.
//!
//! The core is [`resolver::StackResolver`]: a single forward pass over a
//! captured trace that skips hidden frames (logging internals, registered
//! exclusions, unresolvable frames), locates the true originating frame
//! relative to nested logger-wrapper frames, and undoes compiler-generated
//! names via [`cleaner`] so async continuations and closures report their
//! original method. [`enrich::EnrichLogger`] is the thin glue that
//! puts the resolved identity on records as structured key-values.
//!
//! Frames are plain data ([`frame`]): a capture collaborator supplies
//! already-symbolicated descriptors through the [`frame::StackCapture`]
//! boundary, so any introspection or debug-info backend fits.

pub mod classifier;
pub mod cleaner;
pub mod enrich;
pub mod frame;
pub mod registry;
pub mod resolver;
pub mod testing;

pub use classifier::FrameClassifier;
pub use enrich::{EnrichConfig, EnrichLogger, InstallError};
pub use frame::{MethodRef, ModuleKind, ModuleRef, StackCapture, StackFrame, TypeRef};
pub use registry::HiddenSetRegistry;
pub use resolver::{CallSiteInfo, CallerInfo, StackResolver};
