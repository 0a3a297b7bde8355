use bounded_pool::{Config, WorkerPool};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    thread,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_TASKS: u64 = 50;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x9E37_79B9_7F4A_7C15)
        | 1;
    let fast_random_state = AtomicU64::new(seed);

    let pool = match WorkerPool::new(Config::default(), move |task| {
        // xorshift, имитация работы 50..150ms
        let mut x = fast_random_state.load(Ordering::Relaxed);
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        fast_random_state.store(x, Ordering::Relaxed);

        let delay = Duration::from_millis(50 + x % 100);
        info!(task = task, ?delay, "executing task");
        thread::sleep(delay);
        Ok(())
    }) {
        Ok(pool) => pool,
        Err(err) => {
            eprintln!("failed to start pool: {err}");
            std::process::exit(1);
        }
    };

    let now = Instant::now();
    for i in 0..DEMO_TASKS {
        if pool.submit(i).is_ok() {
            info!(task = i, "added task to the pool");
        }
        thread::sleep(Duration::from_millis(100));
    }

    pool.wait_idle();
    println!("{}", pool.stats());

    let _ = pool.shutdown();
    println!("elapsed: {:?}", now.elapsed());
}
