use super::{
    config::Config,
    errors::{PoolInitError, ShutdownError, SubmitError, TaskError},
    model::{PoolStats, ShutdownPolicy, TaskId},
    spawn::{Spawner, ThreadSpawner, WorkerBody},
    task::{self, Outcome, Work},
};
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};
use crossbeam::utils::CachePadded;
use tracing::{debug, error, info, trace, warn};

/// Пул, разделяемый между async-кодом и продюсерами
pub type SharedPool = Arc<WorkerPool>;

/// Состояние под замком пула. `tasks` работает как стек.
struct State {
    tasks: Vec<TaskId>,
    shutdown: bool,
    peak_usage: usize,
    in_flight: usize,
}

/// Всё, что воркеры делят с хендлом пула
struct Shared {
    state: Mutex<State>,
    /// Один сигнал на каждую задачу, broadcast при shutdown
    available: Condvar,
    /// Broadcast при переходе в idle, только для `wait_idle`
    idle: Condvar,
    completed: CachePadded<AtomicU64>,
    failed: CachePadded<AtomicU64>,
    dropped: CachePadded<AtomicU64>,
    warnings: CachePadded<AtomicU64>,
    capacity: usize,
    warn_threshold: usize,
    policy: ShutdownPolicy,
    worker_count: usize,
    work: Work,
}

impl Shared {
    // Задачи выполняются вне замка и под catch_unwind,
    // поэтому состояние за отравленным замком консистентно.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ставит флаг shutdown и будит всех. `false`, если флаг уже стоял.
    fn request_shutdown(&self) -> bool {
        let mut state = self.lock();
        if state.shutdown {
            return false;
        }
        state.shutdown = true;
        self.available.notify_all();
        self.idle.notify_all();
        true
    }

    /// Пул простаивает: ничего не выполняется и в буфере не осталось задач,
    /// которые кто-то ещё возьмёт.
    fn is_idle(&self, state: &State) -> bool {
        if state.in_flight > 0 {
            return false;
        }
        if state.tasks.is_empty() {
            return true;
        }
        // После shutdown брошенные задачи уже никто не выполнит.
        state.shutdown && (self.policy == ShutdownPolicy::Abandon || self.worker_count == 0)
    }

    fn worker_loop(&self, index: usize) {
        debug!(worker = index, "worker started");
        let mut state = self.lock();

        loop {
            while state.tasks.is_empty() && !state.shutdown {
                state = self
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }

            if state.shutdown
                && (self.policy == ShutdownPolicy::Abandon || state.tasks.is_empty())
            {
                break;
            }

            let Some(id) = state.tasks.pop() else {
                break;
            };
            state.in_flight += 1;
            drop(state);

            trace!(worker = index, task = id, "executing task");
            match task::run(&self.work, id) {
                Outcome::Completed => {
                    self.completed.fetch_add(1, Ordering::Relaxed);
                }
                Outcome::Failed(reason) => {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(worker = index, task = id, %reason, "task failed");
                }
            }

            state = self.lock();
            state.in_flight -= 1;
            if self.is_idle(&state) {
                self.idle.notify_all();
            }
        }

        drop(state);
        debug!(worker = index, "worker exiting");
    }
}

/// Пул фиксированного размера поверх ограниченного буфера задач
///
/// # Порядок
///
/// Буфер работает как **стек** (LIFO): следующей воркер берёт последнюю
/// добавленную задачу. Порядок отправки не совпадает с порядком выполнения.
///
/// # Backpressure
///
/// `submit` никогда не блокирует. Если в буфере уже `capacity` задач,
/// новая задача отбрасывается и возвращается в [`SubmitError::QueueFull`].
///
/// # Shutdown
///
/// [`shutdown`](Self::shutdown) будит всех воркеров и дожидается их. При
/// [`ShutdownPolicy::Abandon`] (по умолчанию) задачи в очереди не выполняются;
/// уже запущенная задача всегда доходит до конца. Повторный вызов возвращает
/// [`ShutdownError::AlreadyShutdown`]. Drop пула тоже делает shutdown.
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    config: Config,
}

impl WorkerPool {
    pub fn new<F>(config: Config, work: F) -> Result<Self, PoolInitError>
    where
        F: Fn(TaskId) -> Result<(), TaskError> + Send + Sync + 'static,
    {
        Self::with_spawner(config, task::work_fn(work), &ThreadSpawner)
    }

    /// Создаёт пул, запуская воркеров через `spawner`.
    ///
    /// Если какой-то воркер не стартовал, уже запущенные останавливаются и
    /// join-ятся до возврата ошибки.
    pub fn with_spawner(
        config: Config,
        work: Work,
        spawner: &dyn Spawner,
    ) -> Result<Self, PoolInitError> {
        config.validate()?;

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                tasks: Vec::with_capacity(config.capacity),
                shutdown: false,
                peak_usage: 0,
                in_flight: 0,
            }),
            available: Condvar::new(),
            idle: Condvar::new(),
            completed: CachePadded::new(AtomicU64::new(0)),
            failed: CachePadded::new(AtomicU64::new(0)),
            dropped: CachePadded::new(AtomicU64::new(0)),
            warnings: CachePadded::new(AtomicU64::new(0)),
            capacity: config.capacity,
            warn_threshold: config.warn_threshold(),
            policy: config.shutdown_policy,
            worker_count: config.worker_count,
            work,
        });

        let mut workers = Vec::with_capacity(config.worker_count);
        for index in 0..config.worker_count {
            let worker_shared = Arc::clone(&shared);
            let body: WorkerBody = Box::new(move || worker_shared.worker_loop(index));
            let name = format!("{}-{}", config.thread_name, index);

            match spawner.spawn(index, name, config.stack_size, body) {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    error!(
                        worker = index,
                        error = %source,
                        "failed to spawn worker, tearing pool down"
                    );
                    shared.request_shutdown();
                    join_workers(workers);
                    return Err(PoolInitError::Spawn { index, source });
                }
            }
        }

        info!(
            workers = config.worker_count,
            capacity = config.capacity,
            policy = ?config.shutdown_policy,
            "worker pool started"
        );

        Ok(Self {
            shared,
            workers: Mutex::new(workers),
            config,
        })
    }

    /// Кладёт задачу на стек и будит одного воркера.
    ///
    /// При заполнении выше порога пишет предупреждение. При полном буфере
    /// задача отбрасывается (drop-newest), буфер не меняется.
    pub fn submit(&self, id: TaskId) -> Result<(), SubmitError> {
        let shared = &*self.shared;
        let mut state = shared.lock();

        if state.shutdown {
            return Err(SubmitError::ShutDown(id));
        }

        let len = state.tasks.len();
        if len >= shared.warn_threshold {
            shared.warnings.fetch_add(1, Ordering::Relaxed);
            warn!(queued = len, capacity = shared.capacity, "task queue nearing capacity");
        }

        if len >= shared.capacity {
            shared.dropped.fetch_add(1, Ordering::Relaxed);
            drop(state);
            warn!(task = id, "task queue full, dropping task");
            return Err(SubmitError::QueueFull(id));
        }

        state.tasks.push(id);
        if state.tasks.len() > state.peak_usage {
            state.peak_usage = state.tasks.len();
        }
        shared.available.notify_one();
        Ok(())
    }

    /// Останавливает воркеров и ждёт завершения каждого.
    ///
    /// Join выполняет первый вызвавший; остальные получают `AlreadyShutdown`.
    pub fn shutdown(&self) -> Result<(), ShutdownError> {
        if !self.shared.request_shutdown() {
            return Err(ShutdownError::AlreadyShutdown);
        }

        let workers = std::mem::take(
            &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        join_workers(workers);

        let stats = self.stats();
        if stats.queued > 0 {
            warn!(abandoned = stats.queued, "pool shut down with unexecuted tasks");
        }
        info!(
            completed = stats.completed,
            failed = stats.failed,
            dropped = stats.dropped,
            peak_usage = stats.peak_usage,
            "worker pool shut down"
        );
        Ok(())
    }

    /// Консистентный снимок счётчиков, читается под замком пула
    pub fn stats(&self) -> PoolStats {
        let shared = &*self.shared;
        let state = shared.lock();
        PoolStats {
            completed: shared.completed.load(Ordering::Relaxed),
            failed: shared.failed.load(Ordering::Relaxed),
            dropped: shared.dropped.load(Ordering::Relaxed),
            warnings: shared.warnings.load(Ordering::Relaxed),
            peak_usage: state.peak_usage,
            queued: state.tasks.len(),
            capacity: shared.capacity,
            workers: self.config.worker_count,
            shutdown: state.shutdown,
        }
    }

    /// Блокирует, пока буфер не опустеет и ни одна задача не выполняется.
    ///
    /// После shutdown с политикой `Abandon` (или без воркеров) возвращается,
    /// как только ничего не выполняется, даже если задачи брошены. При `Drain`
    /// ждёт, пока воркеры доработают очередь.
    pub fn wait_idle(&self) {
        let state = self.shared.lock();
        let _state = self
            .shared
            .idle
            .wait_while(state, |s| !self.shared.is_idle(s))
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Как [`wait_idle`](Self::wait_idle), но не дольше `timeout`.
    /// `true`, если пул успел перейти в idle.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        let (_state, result) = self
            .shared
            .idle
            .wait_timeout_while(state, timeout, |s| !self.shared.is_idle(s))
            .unwrap_or_else(PoisonError::into_inner);
        !result.timed_out()
    }

    #[inline]
    pub fn queued(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queued() == 0
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shared.lock().shutdown
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn join_workers(workers: Vec<JoinHandle<()>>) {
    let current = thread::current().id();
    for handle in workers {
        // Задача, владеющая последним хендлом пула, дропает его изнутри воркера
        if handle.thread().id() == current {
            continue;
        }
        let name = handle.thread().name().unwrap_or("<unnamed>").to_string();
        if handle.join().is_err() {
            error!(worker = %name, "worker thread panicked");
        }
    }
}
