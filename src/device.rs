use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{info, warn};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::fence::Fence;

/// How long a fence wait may last before the device is declared hung.
pub const FENCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opaque handle to device-owned storage. The host never touches buffer
/// contents directly; it enqueues commands that reference handles, and reads
/// contents back explicitly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

/// A per-slot program the device maps over a buffer pair. Evaluations are
/// mutually independent, with no cross-slot reads, so the device is free to
/// run them in any order and in parallel.
pub trait SlotKernel: Send + Sync + 'static {
    /// Bytes consumed per slot from the source buffer.
    fn input_stride(&self) -> usize;
    /// Bytes produced per slot into the destination buffer.
    fn output_stride(&self) -> usize;
    fn eval(&self, slot: usize, input: &[u8], output: &mut [u8]);
}

enum Command {
    CreateBuffer {
        id: u64,
        len: usize,
        ready: Sender<()>,
    },
    WriteBuffer {
        id: u64,
        contents: Vec<u8>,
    },
    Transform {
        kernel: Arc<dyn SlotKernel>,
        src: u64,
        dst: u64,
    },
    Signal {
        fence: Sender<()>,
    },
    Read {
        id: u64,
        reply: Sender<Vec<u8>>,
    },
    Destroy {
        id: u64,
    },
    Shutdown,
}

/// Reference execution backend. A worker thread owns all buffer storage and
/// drains a FIFO command queue, so submitted work runs asynchronously
/// relative to host issue order; per-slot evaluations fan out over rayon.
/// Dispatches are validated synchronously on the host against the handle
/// registry before they are enqueued, so a rejected dispatch surfaces from
/// the submitting call.
pub struct Device {
    commands: Sender<Command>,
    worker: Option<thread::JoinHandle<()>>,
    // Host-side view of live handles and their sizes.
    buffer_sizes: HashMap<u64, usize>,
    next_id: u64,
}

impl Device {
    pub fn new() -> Result<Self> {
        let (commands, queue) = unbounded();
        let worker = thread::Builder::new()
            .name("plume-device".into())
            .spawn(move || worker_loop(queue))
            .map_err(Error::WorkerSpawn)?;
        Ok(Device {
            commands,
            worker: Some(worker),
            buffer_sizes: HashMap::new(),
            next_id: 0,
        })
    }

    /// Allocates a zero-initialized buffer of `len` bytes and waits for the
    /// worker to back it. Allocation failure is fatal, not retried.
    pub fn create_buffer(&mut self, label: &str, len: usize) -> Result<BufferId> {
        if len == 0 {
            return Err(Error::InvalidCapacity);
        }
        let id = self.next_id;
        self.next_id += 1;
        let (ready_tx, ready_rx) = bounded(1);
        self.commands
            .send(Command::CreateBuffer {
                id,
                len,
                ready: ready_tx,
            })
            .map_err(|_| Error::DeviceLost)?;
        ready_rx.recv().map_err(|_| Error::DeviceLost)?;
        self.buffer_sizes.insert(id, len);
        info!("Allocated {} ({} bytes)", label, len);
        Ok(BufferId(id))
    }

    /// Uploads `contents` into an existing buffer, replacing it whole.
    pub fn write_buffer(&self, buffer: BufferId, contents: &[u8]) -> Result<()> {
        let len = self.buffer_len(buffer)?;
        if contents.len() != len {
            return Err(Error::BufferSizeMismatch {
                buffer,
                expected: len,
                actual: contents.len(),
            });
        }
        self.commands
            .send(Command::WriteBuffer {
                id: buffer.0,
                contents: contents.to_vec(),
            })
            .map_err(|_| Error::DeviceLost)
    }

    /// Enqueues `kernel` over every slot of `src` into `dst`. Validation is
    /// synchronous; execution is not. Install a fence and wait on it before
    /// reading `dst`.
    pub fn submit_transform(
        &self,
        kernel: Arc<dyn SlotKernel>,
        src: BufferId,
        dst: BufferId,
    ) -> Result<()> {
        if src == dst {
            return Err(Error::AliasedBuffers(src));
        }
        let src_len = self.buffer_len(src)?;
        let dst_len = self.buffer_len(dst)?;
        let slots = src_len / kernel.input_stride();
        if slots * kernel.input_stride() != src_len {
            return Err(Error::BufferSizeMismatch {
                buffer: src,
                expected: slots * kernel.input_stride(),
                actual: src_len,
            });
        }
        if dst_len != slots * kernel.output_stride() {
            return Err(Error::BufferSizeMismatch {
                buffer: dst,
                expected: slots * kernel.output_stride(),
                actual: dst_len,
            });
        }
        self.commands
            .send(Command::Transform {
                kernel,
                src: src.0,
                dst: dst.0,
            })
            .map_err(|_| Error::DeviceLost)
    }

    /// Installs a completion fence behind everything submitted so far. If
    /// the worker is gone the signaling end drops here and the fence reports
    /// `DeviceLost` at wait time.
    pub fn install_fence(&self) -> Fence {
        let (tx, rx) = bounded(1);
        let _ = self.commands.send(Command::Signal { fence: tx });
        Fence::new(rx)
    }

    /// Blocking readback of a buffer snapshot, ordered behind every prior
    /// command on the queue.
    pub fn read_buffer(&self, buffer: BufferId) -> Result<Vec<u8>> {
        self.buffer_len(buffer)?;
        let (tx, rx) = bounded(1);
        self.commands
            .send(Command::Read {
                id: buffer.0,
                reply: tx,
            })
            .map_err(|_| Error::DeviceLost)?;
        rx.recv().map_err(|_| Error::DeviceLost)
    }

    pub fn destroy_buffer(&mut self, buffer: BufferId) -> Result<()> {
        self.buffer_sizes
            .remove(&buffer.0)
            .ok_or(Error::UnknownBuffer(buffer))?;
        self.commands
            .send(Command::Destroy { id: buffer.0 })
            .map_err(|_| Error::DeviceLost)
    }

    fn buffer_len(&self, buffer: BufferId) -> Result<usize> {
        self.buffer_sizes
            .get(&buffer.0)
            .copied()
            .ok_or(Error::UnknownBuffer(buffer))
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(queue: Receiver<Command>) {
    let mut buffers: HashMap<u64, Vec<u8>> = HashMap::new();
    while let Ok(command) = queue.recv() {
        match command {
            Command::CreateBuffer { id, len, ready } => {
                buffers.insert(id, vec![0u8; len]);
                let _ = ready.send(());
            }
            Command::WriteBuffer { id, contents } => {
                buffers.insert(id, contents);
            }
            Command::Transform { kernel, src, dst } => {
                run_transform(&mut buffers, kernel.as_ref(), src, dst);
            }
            Command::Signal { fence } => {
                let _ = fence.send(());
            }
            Command::Read { id, reply } => {
                // A missing handle drops the reply sender, which the host
                // reads as a lost device.
                if let Some(contents) = buffers.get(&id) {
                    let _ = reply.send(contents.clone());
                }
            }
            Command::Destroy { id } => {
                buffers.remove(&id);
            }
            Command::Shutdown => break,
        }
    }
}

fn run_transform(
    buffers: &mut HashMap<u64, Vec<u8>>,
    kernel: &dyn SlotKernel,
    src: u64,
    dst: u64,
) {
    // The pair was validated at submission; a handle can only be missing
    // here if it was destroyed afterward, in which case the dispatch is
    // dropped.
    let Some(mut output) = buffers.remove(&dst) else {
        warn!("Dropping dispatch: destination buffer {} is gone", dst);
        return;
    };
    let Some(input) = buffers.get(&src) else {
        warn!("Dropping dispatch: source buffer {} is gone", src);
        buffers.insert(dst, output);
        return;
    };
    let in_stride = kernel.input_stride();
    output
        .par_chunks_exact_mut(kernel.output_stride())
        .enumerate()
        .for_each(|(slot, out)| {
            let offset = slot * in_stride;
            kernel.eval(slot, &input[offset..offset + in_stride], out);
        });
    buffers.insert(dst, output);
}
