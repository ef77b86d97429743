//! The closed set of flux source kinds.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rxflux_core::{ConcentrationReader, FluxError, NodeId};

/// A zero-argument callback producing a flux rate.
///
/// Invoked once per step on the evaluation phase, possibly from a worker
/// thread. An `Err` aborts the step with
/// [`FluxError::InvocationFailed`].
pub type FluxCallback = Arc<dyn Fn() -> Result<f64, String> + Send + Sync>;

/// One source of externally injected flux into a node.
///
/// The value of a source is a rate in concentration per unit time, added
/// to the node's reaction-diffusion rate for the step.
///
/// # Examples
///
/// ```
/// use rxflux_core::{NodeId, Snapshot, StepIndex};
/// use rxflux_flux::FluxSource;
///
/// let snap = Snapshot::capture(StepIndex(1), 0.0, [(NodeId(0), 42.0)]);
///
/// assert_eq!(FluxSource::constant(1000.0).evaluate(&snap), Ok(1000.0));
/// assert_eq!(FluxSource::callback(|| 7.0).evaluate(&snap), Ok(7.0));
/// assert_eq!(FluxSource::reference(NodeId(0)).evaluate(&snap), Ok(42.0));
/// ```
#[derive(Clone)]
pub enum FluxSource {
    /// A fixed rate, the same every step.
    Constant(f64),
    /// A rate recomputed by calling back into user code every step.
    Callback(FluxCallback),
    /// The step-start concentration of another node.
    Reference(NodeId),
}

/// Discriminant of a [`FluxSource`], for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FluxKind {
    /// [`FluxSource::Constant`].
    Constant,
    /// [`FluxSource::Callback`].
    Callback,
    /// [`FluxSource::Reference`].
    Reference,
}

impl fmt::Display for FluxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant => f.write_str("constant"),
            Self::Callback => f.write_str("callback"),
            Self::Reference => f.write_str("reference"),
        }
    }
}

impl FluxSource {
    /// A fixed rate.
    pub fn constant(rate: f64) -> Self {
        Self::Constant(rate)
    }

    /// A callback that always produces a value.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn() -> f64 + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(move || Ok(f())))
    }

    /// A callback that may fail.
    pub fn try_callback<F, E>(f: F) -> Self
    where
        F: Fn() -> Result<f64, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self::Callback(Arc::new(move || f().map_err(|e| e.to_string())))
    }

    /// The step-start concentration of `target`.
    pub fn reference(target: NodeId) -> Self {
        Self::Reference(target)
    }

    /// Which kind of source this is.
    pub fn kind(&self) -> FluxKind {
        match self {
            Self::Constant(_) => FluxKind::Constant,
            Self::Callback(_) => FluxKind::Callback,
            Self::Reference(_) => FluxKind::Reference,
        }
    }

    /// Produce this source's rate for the current step.
    ///
    /// References read `snapshot`, never live state. A callback that
    /// returns `Err`, panics, or returns NaN fails with
    /// [`FluxError::InvocationFailed`]. Infinite values are returned as-is.
    pub fn evaluate(&self, snapshot: &dyn ConcentrationReader) -> Result<f64, FluxError> {
        match self {
            Self::Constant(rate) => Ok(*rate),
            Self::Callback(f) => {
                let value = catch_unwind(AssertUnwindSafe(|| f()))
                    .map_err(|payload| FluxError::InvocationFailed {
                        reason: format!("callback panicked: {}", panic_message(&*payload)),
                    })?
                    .map_err(|reason| FluxError::InvocationFailed { reason })?;
                if value.is_nan() {
                    return Err(FluxError::InvocationFailed {
                        reason: "callback returned a non-numeric value (NaN)".to_string(),
                    });
                }
                Ok(value)
            }
            Self::Reference(target) => snapshot
                .concentration(*target)
                .ok_or(FluxError::DanglingReference { target: *target }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

impl fmt::Debug for FluxSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(rate) => f.debug_tuple("Constant").field(rate).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Reference(target) => f.debug_tuple("Reference").field(target).finish(),
        }
    }
}

impl From<f64> for FluxSource {
    fn from(rate: f64) -> Self {
        Self::Constant(rate)
    }
}

impl From<NodeId> for FluxSource {
    fn from(target: NodeId) -> Self {
        Self::Reference(target)
    }
}

/// Units of a source's value when attached through the integrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FluxUnits {
    /// Concentration per unit time, added to the node as-is.
    #[default]
    Concentration,
    /// Amount per unit time, divided by the node's volume.
    Amount,
}
