/// Execution settings of an [`Engine`](crate::Engine).
///
/// ```toml
/// scheduling = "concurrent"
/// max_batch_generations = 16
/// incremental_delivery = true
/// ```
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionConfig {
    pub scheduling: SchedulingPolicy,
    /// How many consecutive flushes a batch key may stay unfulfilled before execution fails.
    pub max_batch_generations: usize,
    /// When disabled, `@defer` and `@stream` are ignored and everything is part of the initial response.
    pub incremental_delivery: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            scheduling: SchedulingPolicy::default(),
            max_batch_generations: 32,
            incremental_delivery: true,
        }
    }
}

/// How the loader calls of one batch generation are awaited.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPolicy {
    /// One loader call after the other, in registration order.
    #[default]
    Sequential,
    /// All loader calls of a generation are polled together.
    Concurrent,
}
