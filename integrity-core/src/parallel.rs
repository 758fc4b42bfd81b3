//! Parallel bulk orchestrator
//!
//! Stream reads stay sequential: the calling thread reads segments, numbers
//! them and pushes them onto a bounded job queue. A fixed pool of worker
//! threads hashes them in any order and files each result under its
//! SegmentID. After the pool is joined, results are read back in SegmentID
//! order, so the output is identical to the serial orchestrator.
//!
//! Failure policy: a worker that fails reports on a single-slot error channel
//! (first error wins) and exits. Other workers are not cancelled and keep
//! draining the queue; their results are discarded.

use crate::assembly::{HashAccumulator, IntegrityResult};
use crate::erasure::SegmentCodec;
use crate::error::{IntegrityError, Result};
use crate::segment::{hash_segment, validate_segment_size, Segment, SegmentHashes, SegmentReader};
use crossbeam::channel::{self, Receiver, SendError, Sender};
use parking_lot::Mutex;
use std::io::Read;
use std::num::NonZeroUsize;
use std::thread;
use tracing::{debug, error, warn};

/// Capacity of the job queue between the reader and the workers
pub const JOB_QUEUE_CAPACITY: usize = 100;

/// Upper bound on hash workers per computation
pub const MAX_WORKERS: usize = 5;

/// Number of hash workers: half the available cores, capped, never zero
pub fn worker_count() -> usize {
    let cores = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    (cores / 2).clamp(1, MAX_WORKERS)
}

/// Hash results indexed by SegmentID. Each slot is written at most once.
struct SegmentStore {
    slots: Mutex<Vec<Option<(SegmentHashes, usize)>>>,
}

impl SegmentStore {
    fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    fn insert(&self, segment_id: u64, hashes: SegmentHashes, segment_len: usize) -> Result<()> {
        let index = segment_id as usize;
        let mut slots = self.slots.lock();
        if slots.len() <= index {
            slots.resize_with(index + 1, || None);
        }
        if slots[index].is_some() {
            return Err(IntegrityError::DuplicateSegment { segment_id });
        }
        slots[index] = Some((hashes, segment_len));
        Ok(())
    }

    /// Results for SegmentIDs `0..total`, in order. Any gap is an error.
    fn into_ordered(self, total: u64) -> Result<Vec<(SegmentHashes, usize)>> {
        let mut slots = self.slots.into_inner();
        if slots.len() as u64 > total {
            return Err(IntegrityError::UnexpectedSegment {
                segment_id: slots.len() as u64 - 1,
                total,
            });
        }
        slots.resize_with(total as usize, || None);

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or(IntegrityError::MissingSegment {
                    segment_id: index as u64,
                })
            })
            .collect()
    }
}

/// Hash a stream with the default worker pool size
pub fn hash_stream<R, C>(reader: R, codec: &C, segment_size: usize) -> Result<IntegrityResult>
where
    R: Read,
    C: SegmentCodec + ?Sized,
{
    hash_stream_with_workers(reader, codec, segment_size, worker_count())
}

/// Hash a stream using `workers` hash threads (at least one)
pub fn hash_stream_with_workers<R, C>(
    reader: R,
    codec: &C,
    segment_size: usize,
    workers: usize,
) -> Result<IntegrityResult>
where
    R: Read,
    C: SegmentCodec + ?Sized,
{
    validate_segment_size(segment_size)?;
    let workers = workers.max(1);
    let store = SegmentStore::new();
    let mut segments = SegmentReader::new(reader, segment_size);

    let (job_tx, job_rx) = channel::bounded::<Segment>(JOB_QUEUE_CAPACITY);
    let (err_tx, err_rx) = channel::bounded::<IntegrityError>(1);

    let read_result = thread::scope(|scope| {
        for worker_id in 0..workers {
            let jobs = job_rx.clone();
            let errors = err_tx.clone();
            let store = &store;
            scope.spawn(move || hash_worker(worker_id, jobs, errors, codec, store));
        }
        // Only workers hold receivers: if they all exit, sends fail instead of blocking
        drop(job_rx);

        let result = dispatch(&mut segments, &job_tx);
        // Closing the queue lets the workers drain and exit
        drop(job_tx);
        result
    });

    if let Ok(err) = err_rx.try_recv() {
        error!(error = %err, "Hash worker reported an error");
        return Err(err);
    }
    read_result?;

    let total = segments.segments_read();
    let ordered = store.into_ordered(total).inspect_err(|err| {
        error!(error = %err, segments = total, "Hash results inconsistent after join");
    })?;

    let mut accumulator = HashAccumulator::with_capacity(codec.total_shards(), ordered.len());
    for (hashes, segment_len) in ordered {
        accumulator.push(hashes, segment_len);
    }

    debug_assert_eq!(accumulator.content_length(), segments.bytes_read());
    debug!(
        segments = total,
        content_length = accumulator.content_length(),
        workers,
        "Computed integrity hash in parallel"
    );

    Ok(accumulator.assemble())
}

/// Read segments in order and queue them for the workers
fn dispatch<R: Read>(segments: &mut SegmentReader<R>, jobs: &Sender<Segment>) -> Result<()> {
    for segment in segments {
        let segment = segment?;
        if let Err(SendError(segment)) = jobs.send(segment) {
            warn!(
                segment_id = segment.id,
                "All hash workers stopped, no longer reading"
            );
            break;
        }
    }
    Ok(())
}

/// Hash queued segments until the queue closes or a segment fails
fn hash_worker<C>(
    worker_id: usize,
    jobs: Receiver<Segment>,
    errors: Sender<IntegrityError>,
    codec: &C,
    store: &SegmentStore,
) where
    C: SegmentCodec + ?Sized,
{
    for segment in jobs.iter() {
        let result = hash_segment(codec, &segment.data)
            .and_then(|hashes| store.insert(segment.id, hashes, segment.data.len()));

        if let Err(err) = result {
            warn!(
                worker_id,
                segment_id = segment.id,
                error = %err,
                "Hash worker failed, stopping"
            );
            // Single slot: later errors are dropped
            let _ = errors.try_send(err);
            return;
        }
    }
}
