use std::fmt;

/// Непрозрачный id задачи, другой нагрузки пул не хранит
pub type TaskId = u64;

/// Что воркеры делают с очередью после запроса shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownPolicy {
    /// Выйти сразу, как только виден флаг; задачи в очереди не выполняются
    #[default]
    Abandon,
    /// Дорабатывать очередь до пустого буфера, затем выйти
    Drain,
}

/// Снимок счётчиков пула, снятый под замком
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub completed: u64,
    pub failed: u64,
    pub dropped: u64,
    pub warnings: u64,
    pub peak_usage: usize,
    pub queued: usize,
    pub capacity: usize,
    pub workers: usize,
    pub shutdown: bool,
}

impl PoolStats {
    /// Задачи, завершившие выполнение, успешно или нет
    pub fn processed(&self) -> u64 {
        self.completed + self.failed
    }

    pub fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.queued as f64 / self.capacity as f64
    }

    pub fn peak_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.peak_usage as f64 / self.capacity as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.processed();
        if total == 0 {
            return 1.0;
        }
        self.completed as f64 / total as f64
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Thread Pool Stats ===")?;
        writeln!(f, "Tasks processed: {}", self.completed)?;
        if self.failed > 0 {
            writeln!(f, "Tasks failed: {}", self.failed)?;
        }
        if self.dropped > 0 {
            writeln!(f, "Tasks dropped: {}", self.dropped)?;
        }
        write!(f, "Peak queue usage: {}/{}", self.peak_usage, self.capacity)
    }
}
