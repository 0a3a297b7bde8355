use crate::model::TaskId;
use thiserror::Error;

/// Ошибка, которую может вернуть внедрённая функция работы
pub type TaskError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum PoolInitError {
    #[error("failed to spawn worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum SubmitError {
    #[error("task queue full, dropped task {0}")]
    QueueFull(TaskId),

    #[error("pool is shut down, rejected task {0}")]
    ShutDown(TaskId),
}

impl SubmitError {
    /// Id задачи, которую пул не принял
    pub fn task(&self) -> TaskId {
        match *self {
            SubmitError::QueueFull(id) | SubmitError::ShutDown(id) => id,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ShutdownError {
    #[error("pool already shut down")]
    AlreadyShutdown,

    #[error("shutdown task was cancelled before it finished")]
    Interrupted,
}
