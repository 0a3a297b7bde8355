//! Async-обвязка для наблюдения за пулом из tokio runtime

use super::{
    errors::ShutdownError,
    model::PoolStats,
    pool::{SharedPool, WorkerPool},
};
use std::{panic, sync::Arc};
use futures::stream::{self, Stream};
use tokio::{task::JoinError, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::error;

impl WorkerPool {
    /// Мониторинг метрик с callback каждые `interval`
    /// ВАЖНО: вызовите token.cancel() для остановки мониторинга и освобождения пула
    pub fn start_monitoring<F>(
        self: &SharedPool,
        interval: Duration,
        callback: F,
    ) -> CancellationToken
    where
        F: Fn(PoolStats) + Send + 'static,
    {
        let pool = Arc::clone(self);
        let token = CancellationToken::new();
        let token_clone = token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        callback(pool.stats());
                    }
                    _ = token_clone.cancelled() => {
                        drop(pool);
                        break;
                    }
                }
            }
        });

        token
    }

    /// Остановить мониторинг и отпустить ссылку на пул
    pub fn stop_monitoring(token: CancellationToken) {
        token.cancel();
    }

    /// Поток снимков каждые `interval`. Первый снимок с `shutdown == true`
    /// становится последним.
    pub fn stats_stream(
        self: &SharedPool,
        interval: Duration,
    ) -> impl Stream<Item = PoolStats> + Send + 'static {
        stream::unfold(Some(Arc::clone(self)), move |pool: Option<SharedPool>| async move {
            let pool = pool?;
            tokio::time::sleep(interval).await;
            let stats = pool.stats();
            let next = if stats.shutdown { None } else { Some(pool) };
            Some((stats, next))
        })
    }

    /// [`wait_idle`](WorkerPool::wait_idle) в blocking-пуле tokio
    pub async fn wait_idle_async(self: &SharedPool) {
        let pool = Arc::clone(self);
        let res = tokio::task::spawn_blocking(move || pool.wait_idle()).await;
        unwrap_blocking(res, "wait_idle");
    }

    /// [`shutdown`](WorkerPool::shutdown) в blocking-пуле tokio, чтобы join
    /// воркеров не блокировал runtime.
    pub async fn shutdown_async(self: &SharedPool) -> Result<(), ShutdownError> {
        let pool = Arc::clone(self);
        let res = tokio::task::spawn_blocking(move || pool.shutdown()).await;
        shutdown_outcome(res)
    }
}

fn shutdown_outcome(
    res: Result<Result<(), ShutdownError>, JoinError>,
) -> Result<(), ShutdownError> {
    unwrap_blocking(res, "shutdown").unwrap_or(Err(ShutdownError::Interrupted))
}

fn unwrap_blocking<T>(res: Result<T, JoinError>, op: &str) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(join_err) if join_err.is_panic() => panic::resume_unwind(join_err.into_panic()),
        Err(join_err) => {
            error!(op = op, error = %join_err, "blocking pool operation did not finish");
            None
        }
    }
}
