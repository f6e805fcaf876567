use std::time::Duration;

use crate::device::BufferId;

/// Failures surfaced by the pipeline. All of them are fatal: a simulation
/// that returns one is unusable and must be torn down, never retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("particle capacity must be nonzero")]
    InvalidCapacity,

    #[error("noise field dimension must be nonzero and match the value count")]
    InvalidNoiseDimension,

    #[error("could not start the device worker")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("the execution device is gone")]
    DeviceLost,

    #[error("no buffer with handle {0:?}")]
    UnknownBuffer(BufferId),

    #[error("dispatch would read and write {0:?} in the same pass")]
    AliasedBuffers(BufferId),

    #[error("buffer {buffer:?} holds {actual} bytes, operation needs {expected}")]
    BufferSizeMismatch {
        buffer: BufferId,
        expected: usize,
        actual: usize,
    },

    #[error("fence not signaled within {waited:?}")]
    FenceTimeout { waited: Duration },
}

pub type Result<T> = std::result::Result<T, Error>;
