use crate::{errors::PoolInitError, model::ShutdownPolicy};

/// Число воркеров по умолчанию
pub const THREAD_POOL_SIZE: usize = 20;
/// Ёмкость буфера задач по умолчанию
pub const MAX_TASKS: usize = 2000;
/// Доля заполнения, с которой submit пишет предупреждение
pub const WARN_RATIO: f64 = 0.9;

/// Конфигурация пула потоков, фиксируется при создании
#[derive(Debug, Clone)]
pub struct Config {
    pub worker_count: usize,
    pub capacity: usize,
    pub warn_ratio: f64,
    pub shutdown_policy: ShutdownPolicy,
    pub thread_name: String,
    pub stack_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: THREAD_POOL_SIZE,
            capacity: MAX_TASKS,
            warn_ratio: WARN_RATIO,
            shutdown_policy: ShutdownPolicy::Abandon,
            thread_name: "pool-worker".into(),
            stack_size: None,
        }
    }
}

impl Config {
    pub fn new(capacity: usize, worker_count: usize) -> Self {
        Self {
            worker_count,
            capacity,
            ..Default::default()
        }
    }

    pub fn cpu_bound() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            worker_count: num_cpus,
            capacity: num_cpus * 100,
            ..Default::default()
        }
    }

    pub fn io_bound() -> Self {
        let num_cpus = num_cpus::get();
        Self {
            worker_count: num_cpus * 2,
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_warn_ratio(mut self, warn_ratio: f64) -> Self {
        self.warn_ratio = warn_ratio;
        self
    }

    pub fn with_shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = policy;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Длина буфера, начиная с которой submit предупреждает о заполнении
    pub fn warn_threshold(&self) -> usize {
        (self.capacity as f64 * self.warn_ratio).ceil() as usize
    }

    pub fn validate(&self) -> Result<(), PoolInitError> {
        if self.capacity == 0 {
            return Err(PoolInitError::InvalidConfig(
                "capacity must be greater than zero".into(),
            ));
        }
        if !(self.warn_ratio > 0.0 && self.warn_ratio <= 1.0) {
            return Err(PoolInitError::InvalidConfig(format!(
                "warn_ratio must be in (0, 1], got {}",
                self.warn_ratio
            )));
        }
        Ok(())
    }
}
