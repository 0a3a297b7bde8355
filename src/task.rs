use super::{errors::TaskError, model::TaskId};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// Функция работы, внедряемая в пул; вызывается один раз на задачу
pub type Work = Arc<dyn Fn(TaskId) -> Result<(), TaskError> + Send + Sync + 'static>;

#[derive(Debug)]
pub enum Outcome {
    Completed,
    Failed(String),
}

/// Оборачивает замыкание в [`Work`]
pub fn work_fn<F>(f: F) -> Work
where
    F: Fn(TaskId) -> Result<(), TaskError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Выполняет задачу; и ошибка, и паника превращаются в `Outcome::Failed`
pub(crate) fn run(work: &Work, id: TaskId) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| work(id))) {
        Ok(Ok(())) => Outcome::Completed,
        Ok(Err(err)) => Outcome::Failed(err.to_string()),
        Err(payload) => Outcome::Failed(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        format!("{:?}", payload)
    }
}
