//! Sync adapter metrics

use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter_vec, register_int_gauge,
    CounterVec, HistogramVec, IntCounterVec, IntGauge,
};

lazy_static::lazy_static! {
    pub static ref SYNC_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "intercom_sync_requests_total",
        "Total record operations",
        &["operation", "status"]
    )
    .unwrap();

    pub static ref SYNC_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "intercom_sync_request_duration_seconds",
        "Record operation duration",
        &["operation"]
    )
    .unwrap();

    pub static ref BULK_RETRIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "intercom_sync_bulk_retries_total",
        "Rate-limited operations re-admitted for another attempt",
        &["operation"]
    )
    .unwrap();

    pub static ref BULK_IN_FLIGHT: IntGauge = register_int_gauge!(
        "intercom_sync_bulk_in_flight",
        "Operations currently running inside a bulk batch"
    )
    .unwrap();
}
