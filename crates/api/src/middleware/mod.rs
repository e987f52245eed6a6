//! HTTP middleware components.

pub mod logging;
pub mod metrics;
pub mod trace_id;

#[allow(unused_imports)] // Re-exports for downstream use
pub use metrics::{
    init_metrics, metrics_handler, metrics_middleware, record_results_released,
    record_visibility_changed,
};
#[allow(unused_imports)] // Re-exports for downstream use
pub use trace_id::{trace_id, REQUEST_ID_HEADER};
