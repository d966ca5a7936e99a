//! Optional tracing instrumentation.
//!
//! The pipeline and fusion paths report through these macros so operators can
//! watch stage progress (including skipped stages) without the library taking
//! a hard dependency: with the `tracing` feature off, every call site
//! compiles away.

/// Opens an info-level span around a pipeline or fusion stage.
///
/// Expands to `tracing::info_span!` with the feature on; otherwise yields a
/// dummy guard so `let _span = trace_span!(...).entered();` works unchanged.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emits an info-level event, e.g. for a stage that ran as a no-op.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:literal $(, $($key:ident = $value:expr),+)? $(,)?) => {
        tracing::event!(name: $name, tracing::Level::INFO, { $($($key = $value),+)? })
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:literal $(, $($key:ident = $value:expr),+)? $(,)?) => {{
        // Evaluate the fields to keep call sites warning-free, discard them.
        $(let _ = ($($value,)+);)?
    }};
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Stand-in span guard for builds without the `tracing` feature.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Mirrors `tracing::Span::entered`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
