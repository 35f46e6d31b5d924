//! Call-site resolution.
//!
//! [`StackResolver`] walks a captured trace once, forward, and computes the
//! index of the genuine call-site frame relative to one or more nested
//! logger-wrapper frames. [`CallSiteInfo`] is the per-log-call value that
//! holds the trace, the resolved indices, and the optional explicit caller
//! override, and exposes the accessors the enrichment layer reads.

use crate::classifier::FrameClassifier;
use crate::cleaner::{self, CONTINUATION_ENTRY_POINT};
use crate::frame::{StackFrame, TypeRef};
use crate::registry::HiddenSetRegistry;

/// Namespace of compiler-generated concurrency infrastructure; frames whose
/// successor declares a type here are continuation scaffolding.
const CONCURRENCY_INFRA_NAMESPACE: &str = "System.Runtime.CompilerServices";

/// Execution-context type that dispatches resumed continuations.
const EXECUTION_CONTEXT_TYPE: &str = "System.Threading.ExecutionContext";

/// Resolves the user-frame index of a captured trace.
pub struct StackResolver<'a> {
    classifier: FrameClassifier<'a>,
}

impl<'a> StackResolver<'a> {
    pub fn new(registry: &'a HiddenSetRegistry) -> Self {
        Self {
            classifier: FrameClassifier::new(registry),
        }
    }

    pub fn classifier(&self) -> &FrameClassifier<'a> {
        &self.classifier
    }

    /// Compute the primary user-frame index and, when it differs, the
    /// legacy continuation-skipping index.
    ///
    /// The primary index always identifies a non-hidden frame, or frame 0
    /// when every frame is hidden; never an out-of-range index.
    pub fn resolve(
        &self,
        frames: &[StackFrame],
        logger_type: Option<&TypeRef>,
    ) -> (usize, Option<usize>) {
        let primary = self.find_calling_frame(frames, logger_type).unwrap_or(0);
        let legacy = self.skip_continuation_frames(frames, primary);
        (primary, (legacy != primary).then_some(legacy))
    }

    /// Single forward pass over the trace.
    ///
    /// Hidden frames touch neither running index. A logger frame resets the
    /// post-logger candidate: decorator chains may re-enter logger code
    /// several times, and only the frame following the last occurrence is
    /// the true call site, so the reset achieves "first non-hidden frame
    /// after the last logger frame" without a backward rescan.
    fn find_calling_frame(
        &self,
        frames: &[StackFrame],
        logger_type: Option<&TypeRef>,
    ) -> Option<usize> {
        let mut after_logger = None;
        let mut first_user = None;

        for (i, frame) in frames.iter().enumerate() {
            if self.classifier.is_hidden(frame) {
                continue;
            }
            if first_user.is_none() {
                first_user = Some(i);
            }
            if FrameClassifier::is_logger_frame(frame, logger_type) {
                after_logger = None;
                continue;
            }
            if after_logger.is_none() {
                after_logger = Some(i);
            }
        }

        after_logger.or(first_user)
    }

    /// Legacy approximation of the pre-state-machine caller: starting at
    /// the primary result, skip continuation entry points whose next frame
    /// belongs to the concurrency infrastructure. Loses file/line accuracy
    /// and is kept only as an alternate index.
    fn skip_continuation_frames(&self, frames: &[StackFrame], start: usize) -> usize {
        let mut i = start;
        while i < frames.len() {
            let frame = &frames[i];
            if self.classifier.is_hidden(frame) {
                i += 1;
                continue;
            }
            if frame.method().map(|m| m.name()) == Some(CONTINUATION_ENTRY_POINT)
                && let Some(next_type) = frames.get(i + 1).and_then(StackFrame::declaring_type)
                && (next_type
                    .namespace()
                    .is_some_and(|ns| ns == CONCURRENCY_INFRA_NAMESPACE)
                    || next_type.full_name() == EXECUTION_CONTEXT_TYPE)
            {
                // Resumed continuation; the caller is further out.
                i += 1;
                continue;
            }
            return i;
        }
        start
    }
}

/// Explicit caller identity supplied out-of-band by a call site, bypassing
/// trace inspection entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerInfo {
    pub class_name: String,
    pub method_name: String,
    pub file_path: String,
    pub line: u32,
}

/// Per-log-call resolution state.
///
/// Created fresh for each log invocation and discarded after the entry is
/// emitted; never pooled or shared across calls.
#[derive(Debug, Default)]
pub struct CallSiteInfo {
    trace: Option<Vec<StackFrame>>,
    user_frame_index: usize,
    legacy_frame_index: Option<usize>,
    caller: Option<CallerInfo>,
}

impl CallSiteInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a captured trace and resolve the user-frame indices.
    ///
    /// When `user_frame` is given it is taken verbatim and no resolution
    /// runs (the caller already knows the frame of interest).
    pub fn set_stack_trace(
        &mut self,
        resolver: &StackResolver<'_>,
        trace: Vec<StackFrame>,
        user_frame: Option<usize>,
        logger_type: Option<&TypeRef>,
    ) {
        match user_frame {
            Some(index) => {
                self.user_frame_index = index;
                self.legacy_frame_index = None;
            }
            None => {
                let (primary, legacy) = resolver.resolve(&trace, logger_type);
                self.user_frame_index = primary;
                self.legacy_frame_index = legacy;
            }
        }
        self.trace = Some(trace);
    }

    /// Set the explicit caller override. Once set, all accessors return the
    /// override values verbatim, regardless of trace content.
    pub fn set_caller_info(&mut self, caller: CallerInfo) {
        self.caller = Some(caller);
    }

    pub fn user_frame_index(&self) -> usize {
        self.user_frame_index
    }

    /// Legacy low-precision index; `None` when it matches the primary one.
    pub fn legacy_frame_index(&self) -> Option<usize> {
        self.legacy_frame_index
    }

    pub fn stack_trace(&self) -> Option<&[StackFrame]> {
        self.trace.as_deref()
    }

    fn frame_at(&self, skip: usize) -> Option<&StackFrame> {
        self.trace.as_deref()?.get(self.user_frame_index + skip)
    }

    /// Class name of the resolved call site.
    pub fn caller_class_name(
        &self,
        include_namespace: bool,
        clean_async: bool,
        clean_closures: bool,
    ) -> String {
        if let Some(caller) = &self.caller {
            return caller.class_name.clone();
        }
        let Some(method) = self.frame_at(0).and_then(StackFrame::method) else {
            return String::new();
        };
        // A legacy index means the trace crossed continuation scaffolding,
        // so synthetic-name cleanup is forced on.
        let force = self.legacy_frame_index.is_some();
        cleaner::clean_class_name(
            method,
            include_namespace,
            clean_async || force,
            clean_closures || force,
        )
    }

    /// Method name of the resolved call site.
    pub fn caller_method_name(
        &self,
        include_signature: bool,
        clean_async: bool,
        clean_closures: bool,
    ) -> String {
        if let Some(caller) = &self.caller {
            return caller.method_name.clone();
        }
        let Some(method) = self.frame_at(0).and_then(StackFrame::method) else {
            return String::new();
        };
        let force = self.legacy_frame_index.is_some();
        cleaner::clean_method_name(
            method,
            include_signature,
            clean_async || force,
            clean_closures || force,
        )
    }

    /// Source file of the call site, `skip` frames above the resolved one.
    pub fn caller_file_path(&self, skip: usize) -> String {
        if let Some(caller) = &self.caller {
            return caller.file_path.clone();
        }
        self.frame_at(skip)
            .and_then(StackFrame::file)
            .unwrap_or_default()
            .to_string()
    }

    /// Source line of the call site, `skip` frames above the resolved one.
    /// Zero when unknown.
    pub fn caller_line_number(&self, skip: usize) -> u32 {
        if let Some(caller) = &self.caller {
            return caller.line;
        }
        self.frame_at(skip).and_then(StackFrame::line).unwrap_or(0)
    }
}
