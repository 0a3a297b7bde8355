//! Пул потоков фиксированного размера поверх ограниченного стека задач
//!
//! # Features
//! - Статический набор OS-потоков, один mutex и один condvar
//! - Ограниченный буфер: drop-newest при переполнении и предупреждение на 90%
//! - LIFO-диспетчеризация: следующей выполняется последняя добавленная задача
//! - Быстрый shutdown (очередь бросается) или shutdown с дренажом
//! - Счётчики без гонок: completed, failed, dropped, пиковая загрузка очереди
//! - Async-мониторинг для приложений на tokio

pub mod config;
pub mod errors;
pub mod model;
pub mod monitor;
pub mod pool;
pub mod spawn;
pub mod task;

pub use config::{Config, MAX_TASKS, THREAD_POOL_SIZE};
pub use errors::{PoolInitError, ShutdownError, SubmitError, TaskError};
pub use model::{PoolStats, ShutdownPolicy, TaskId};
pub use pool::{SharedPool, WorkerPool};
