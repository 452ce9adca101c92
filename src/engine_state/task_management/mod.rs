//! # Worker Pool
//!
//! Background threads that run chunk generation and meshing off the frame
//! thread.
//!
//! Each worker owns a pair of channels: jobs go down one, boxed results come
//! back up the other. The pool hands a job to the next idle worker in
//! round-robin order and keeps a local backlog when every worker is busy.
//! Results are drained on the frame thread, which is the only place they touch
//! engine state.
//!
//! A job that panics does not take its worker down: the panic is caught and
//! comes back as a [`TaskPanicked`](task::TaskPanicked) result.
//!
//! ```rust,ignore
//! let mut pool = TaskManager::new(workers);
//! pool.publish_task(Box::new(job));
//!
//! // once per frame
//! pool.process_completed_tasks(&mut diagnostics);
//! pool.process_backlog();
//! ```

pub mod task;

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::info;
use task::{Task, TaskPanicked, TaskResult};

use super::diagnostics::Diagnostics;

/// The frame thread's end of one worker.
#[derive(Debug)]
pub struct WorkerChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    worker: JoinHandle<()>,
}

/// Fixed-size pool of worker threads with a local backlog.
pub struct TaskManager {
    channels: Vec<WorkerChannel>,
    backlog: VecDeque<Box<dyn Task + Send>>,
    next_channel: usize,
}

/// Jobs a single worker may hold at once.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn run_worker(
    task_rx: Receiver<Box<dyn Task + Send>>,
    result_tx: Sender<Box<dyn TaskResult + Send>>,
) {
    while let Ok(task) = task_rx.recv() {
        let result = match panic::catch_unwind(AssertUnwindSafe(|| task.process())) {
            Ok(result) => result,
            Err(payload) => Box::new(TaskPanicked {
                message: panic_message(payload.as_ref()),
            }),
        };
        if result_tx.send(result).is_err() {
            break;
        }
    }
}

impl TaskManager {
    /// Spawns `num_workers` threads.
    ///
    /// With zero workers every published task stays queued; callers that need
    /// work done without workers run it inline instead.
    ///
    /// # Panics
    /// If the OS refuses to spawn a thread.
    pub fn new(num_workers: usize) -> Self {
        info!(
            "Starting {num_workers} task workers (available parallelism: {:?})",
            thread::available_parallelism()
        );

        let channels = (0..num_workers)
            .map(|_| {
                let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
                let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();
                let worker = thread::spawn(move || run_worker(task_rx, result_tx));
                WorkerChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    worker,
                }
            })
            .collect();

        TaskManager {
            channels,
            backlog: VecDeque::new(),
            next_channel: 0,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks queued or running.
    pub fn pending_task_count(&self) -> usize {
        self.backlog.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        worker_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[worker_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[worker_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel, round-robin from the last one used.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.next_channel + offset) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Sends `task` to an idle worker, or appends it to the backlog.
    ///
    /// Returns whether a worker took it right away.
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(worker_idx) => match self.try_send_task(task, worker_idx) {
                Ok(_) => {
                    self.next_channel = (worker_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.backlog.push_back(task);
                    false
                }
            },
            None => {
                self.backlog.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers until the queue is empty or every worker is busy.
    pub fn process_backlog(&mut self) {
        while let Some(worker_idx) = self.find_available_channel() {
            let Some(task) = self.backlog.pop_front() else {
                break;
            };
            match self.try_send_task(task, worker_idx) {
                Ok(_) => self.next_channel = (worker_idx + 1) % self.channels.len(),
                Err(task) => {
                    // worker gone; keep the job for later
                    self.backlog.push_front(task);
                    break;
                }
            }
        }
    }

    /// Handles every result the workers have sent back. Main thread only.
    ///
    /// # Returns
    /// The number of results handled.
    pub fn process_completed_tasks(&mut self, diagnostics: &mut Diagnostics) -> usize {
        let mut handled = 0;
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                result.handle_result(diagnostics);
                handled += 1;
            }
        }
        handled
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.backlog.clear();
        for channel in self.channels.drain(..) {
            let WorkerChannel {
                task_sender,
                worker,
                ..
            } = channel;
            drop(task_sender);
            if worker.join().is_err() {
                log::error!("Task worker exited with a panic");
            }
        }
    }
}
