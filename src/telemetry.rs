//! Opt-in tracing setup for hosts embedding `scanmap-rs`.
//!
//! The crate only emits `tracing` events: chart and layer lifecycle at
//! `debug`, per-event overlay dispatch at `trace`, rejected supervisor
//! decisions and failing managers at `warn`. Hosts that already install a
//! subscriber can ignore this module.

/// Directive used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "scanmap_rs=info";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back
/// to [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_fallback(DEFAULT_FILTER)
}

/// Same as [`init_default_tracing`] with a caller-chosen fallback directive,
/// e.g. `"scanmap_rs::interaction=trace"` while debugging pointer dispatch.
#[must_use]
pub fn init_tracing_with_fallback(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
