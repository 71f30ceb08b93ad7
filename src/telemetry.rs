//! Telemetry helpers for applications embedding `obs-charts`.
//!
//! The pipeline only emits `tracing` events. Hosts either call
//! `init_default_tracing` or wire their own subscriber and filters.

/// Initializes a default `tracing` subscriber when the `telemetry` feature is enabled.
///
/// Returns `true` when initialization succeeds.
/// Returns `false` when no initialization is performed (feature disabled) or if a
/// global subscriber was already set by the host application.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("obs_charts=info")),
            )
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::init_default_tracing;

    #[cfg(not(feature = "telemetry"))]
    #[test]
    fn tracing_init_is_a_no_op_without_feature() {
        assert!(!init_default_tracing());
    }

    #[cfg(feature = "telemetry")]
    #[test]
    fn second_tracing_init_reports_existing_subscriber() {
        let _ = init_default_tracing();
        assert!(!init_default_tracing());
    }
}
