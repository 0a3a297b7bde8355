use std::{io, thread};

/// Тело воркера, работает до флага shutdown
pub type WorkerBody = Box<dyn FnOnce() + Send + 'static>;

/// Запускает потоки воркеров для пула.
///
/// Пул создаёт потоки только через этот trait, поэтому создание пула можно
/// проверить со спавнерами, которые падают или придерживают старт.
pub trait Spawner: Send + Sync {
    fn spawn(
        &self,
        index: usize,
        name: String,
        stack_size: Option<usize>,
        body: WorkerBody,
    ) -> io::Result<thread::JoinHandle<()>>;
}

/// Обычные OS-потоки через `std::thread::Builder`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl Spawner for ThreadSpawner {
    fn spawn(
        &self,
        _index: usize,
        name: String,
        stack_size: Option<usize>,
        body: WorkerBody,
    ) -> io::Result<thread::JoinHandle<()>> {
        let mut builder = thread::Builder::new().name(name);
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }
        builder.spawn(body)
    }
}
