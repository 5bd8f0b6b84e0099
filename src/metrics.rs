//! Prometheus metrics (§10.6), mirroring the teacher's `LazyLock`-registry
//! pattern in `synctv_core::metrics`: one module-local `Registry`, metrics
//! registered against it lazily, a single `gather_metrics()` text exporter
//! for an (out-of-scope) `/metrics` handler to serve verbatim.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_vec_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

pub static REGISTRY: std::sync::LazyLock<Registry> = std::sync::LazyLock::new(Registry::new);

/// `xg2g_probe_total{outcome}` — outcome in
/// `scheduled|succeeded|failed|throttled` (§10.6).
pub static PROBE_TOTAL: std::sync::LazyLock<IntCounterVec> = std::sync::LazyLock::new(|| {
    register_int_counter_vec_with_registry!(
        Opts::new("xg2g_probe_total", "Total media probes by outcome"),
        &["outcome"],
        REGISTRY.clone()
    )
    .expect("failed to register xg2g_probe_total")
});

pub static PROBE_DURATION_SECONDS: std::sync::LazyLock<Histogram> = std::sync::LazyLock::new(|| {
    register_histogram_with_registry!(
        HistogramOpts::new(
            "xg2g_probe_duration_seconds",
            "Wall-clock duration of a media probe"
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        REGISTRY.clone()
    )
    .expect("failed to register xg2g_probe_duration_seconds")
});

pub static SINGLEFLIGHT_DEDUP_TOTAL: std::sync::LazyLock<IntCounter> =
    std::sync::LazyLock::new(|| {
        register_int_counter_with_registry!(
            "xg2g_singleflight_dedup_total",
            "Probe calls that were deduplicated by singleflight",
            REGISTRY.clone()
        )
        .expect("failed to register xg2g_singleflight_dedup_total")
    });

pub static METADATA_CACHE_SIZE: std::sync::LazyLock<prometheus::IntGauge> =
    std::sync::LazyLock::new(|| {
        prometheus::register_int_gauge_with_registry!(
            "xg2g_metadata_cache_size",
            "Rows currently held in the metadata cache",
            REGISTRY.clone()
        )
        .expect("failed to register xg2g_metadata_cache_size")
    });

/// `xg2g_verification_drift{kind}` — per-kind gauge, 0/1 (§4.10).
pub static VERIFICATION_DRIFT: std::sync::LazyLock<IntGaugeVec> = std::sync::LazyLock::new(|| {
    register_int_gauge_vec_with_registry!(
        Opts::new("xg2g_verification_drift", "Whether a drift checker's kind currently reports a mismatch (0/1)"),
        &["kind"],
        REGISTRY.clone()
    )
    .expect("failed to register xg2g_verification_drift")
});

pub static VERIFICATION_HEARTBEAT_TOTAL: std::sync::LazyLock<IntCounter> =
    std::sync::LazyLock::new(|| {
        register_int_counter_with_registry!(
            "xg2g_verification_heartbeat_total",
            "Verification runs persisted purely as a heartbeat (no drift change)",
            REGISTRY.clone()
        )
        .expect("failed to register xg2g_verification_heartbeat_total")
    });

/// Renders the registry in Prometheus text exposition format.
#[must_use]
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("failed to encode metrics: {e}");
        return String::from("# failed to encode metrics\n");
    }
    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("metrics buffer contains invalid UTF-8: {e}");
        String::from("# invalid UTF-8 in metrics\n")
    })
}
