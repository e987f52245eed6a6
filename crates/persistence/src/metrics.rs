//! Database metrics collection.

use metrics::histogram;
use std::time::Instant;

/// Times a database operation and records a per-query histogram.
///
/// Usage:
/// ```ignore
/// let timer = QueryTimer::new("get_class_override");
/// let result = sqlx::query_as::<_, ClassVisibilityEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    /// Create a new timer for the given query name.
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration to metrics.
    pub fn record(self) {
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query_name
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_holds_query_name() {
        let timer = QueryTimer::new("resolve_visibility");
        assert_eq!(timer.query_name, "resolve_visibility");
    }
}
