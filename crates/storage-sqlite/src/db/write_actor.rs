//! Single-writer actor for serialized database writes.
//!
//! SQLite allows one writer at a time; funneling every standalone write
//! through one dedicated connection avoids busy-retry churn under concurrent
//! callers. Multi-step transactional flows go through the transaction
//! executor instead and rely on the busy timeout.

use std::any::Any;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use kakebo_core::db::DbPool;
use kakebo_core::errors::{DatabaseError, Error, Result};

// A job takes the writer's connection and returns a type-erased result.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    #[allow(clippy::type_complexity)]
    tx: mpsc::Sender<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |conn| job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "writer actor channel closed".to_string(),
                ))
            })?;

        ret_rx
            .await
            .map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "writer actor dropped the reply".to_string(),
                ))
            })?
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("writer actor result had the wrong type"))
            })
    }
}

/// Spawns a background task that owns one pooled connection and processes
/// write jobs serially. Returns the handle used to submit jobs.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                log::error!("Writer actor could not acquire a connection: {e}");
                return;
            }
        };
        while let Some((job, reply)) = rx.recv().await {
            let result = job(&mut conn);
            // The caller may have given up; a dropped receiver is fine.
            let _ = reply.send(result);
        }
    });

    WriteHandle { tx }
}
