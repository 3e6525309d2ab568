//! Delayed and periodic tasks off the loop thread
//!
//! Tasks only touch small shared cells (messages, pending commands); the
//! loop thread picks those up on its next iteration. A task stops itself by
//! returning [`TaskControl::Stop`], or can be cancelled through its handle.
//!
//! [`ThreadScheduler`] runs each task on its own thread against the wall
//! clock. [`ManualScheduler`] runs them against a virtual clock that only
//! moves when told to, for deterministic stepping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

/// What a periodic task wants after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Stop,
}

pub type Task = Box<dyn FnMut() -> TaskControl + Send + 'static>;

/// Cancellation handle for a scheduled task
#[derive(Debug, Clone, Default)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once cancelled or once the task stopped itself
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub trait Scheduler: Send + Sync {
    /// Run `task` after `delay`, then every `period` until it returns
    /// [`TaskControl::Stop`] or the handle is cancelled. A zero period runs
    /// the task once.
    fn schedule_at_fixed_rate(
        &self,
        delay: Duration,
        period: Duration,
        task: Task,
    ) -> TimerHandle;

    /// Run `task` once after `delay`
    fn schedule_once(
        &self,
        delay: Duration,
        task: Box<dyn FnOnce() + Send + 'static>,
    ) -> TimerHandle {
        let mut task = Some(task);
        self.schedule_at_fixed_rate(
            delay,
            Duration::ZERO,
            Box::new(move || {
                if let Some(task) = task.take() {
                    task();
                }
                TaskControl::Stop
            }),
        )
    }
}

/// Wall-clock scheduler, one thread per task
#[derive(Debug, Default)]
pub struct ThreadScheduler;

impl ThreadScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_at_fixed_rate(
        &self,
        delay: Duration,
        period: Duration,
        mut task: Task,
    ) -> TimerHandle {
        let handle = TimerHandle::default();
        let cancelled = handle.cancelled.clone();

        let spawned = thread::Builder::new()
            .name("game-timer".into())
            .spawn(move || {
                let mut deadline = Instant::now() + delay;
                loop {
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    }
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    if task() == TaskControl::Stop || period.is_zero() {
                        cancelled.store(true, Ordering::SeqCst);
                        break;
                    }
                    // Fixed rate: the next run is measured from the last deadline
                    deadline += period;
                }
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn timer thread: {e}");
            handle.cancel();
        }
        handle
    }
}

struct PendingTask {
    due: Duration,
    period: Duration,
    /// Tie-breaker so tasks due together run in scheduling order
    seq: u64,
    task: Task,
    handle: TimerHandle,
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    pending: Vec<PendingTask>,
}

/// Virtual-time scheduler. Nothing runs until [`ManualScheduler::advance`].
#[derive(Default)]
pub struct ManualScheduler {
    clock: Mutex<ManualClock>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualClock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Tasks still waiting to run
    pub fn pending(&self) -> usize {
        let clock = self.lock();
        clock
            .pending
            .iter()
            .filter(|p| !p.handle.is_cancelled())
            .count()
    }

    /// Move virtual time forward, running every task that falls due in
    /// order. Returns how many task runs happened.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut runs = 0;

        loop {
            // Pop the earliest due task with the lock held, run it without
            let next = {
                let mut clock = self.lock();
                clock.pending.retain(|p| !p.handle.is_cancelled());
                let earliest = clock
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);
                match earliest {
                    Some(i) => {
                        let pending = clock.pending.swap_remove(i);
                        clock.now = clock.now.max(pending.due);
                        Some(pending)
                    }
                    None => None,
                }
            };

            let Some(mut pending) = next else {
                break;
            };

            runs += 1;
            if (pending.task)() == TaskControl::Stop || pending.period.is_zero() {
                pending.handle.cancel();
                continue;
            }
            if pending.handle.is_cancelled() {
                continue;
            }

            let mut clock = self.lock();
            pending.due += pending.period;
            pending.seq = clock.next_seq;
            clock.next_seq += 1;
            clock.pending.push(pending);
        }

        let mut clock = self.lock();
        clock.now = target;
        runs
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_at_fixed_rate(&self, delay: Duration, period: Duration, task: Task) -> TimerHandle {
        let handle = TimerHandle::default();
        let mut clock = self.lock();
        let seq = clock.next_seq;
        clock.next_seq += 1;
        let due = clock.now + delay;
        clock.pending.push(PendingTask {
            due,
            period,
            seq,
            task,
            handle: handle.clone(),
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (count.clone(), count)
    }

    #[test]
    fn test_manual_once_fires_after_delay() {
        let scheduler = ManualScheduler::new();
        let (count, seen) = counter();
        let handle = scheduler.schedule_once(
            Duration::from_millis(100),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        scheduler.advance(Duration::from_millis(99));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(handle.is_cancelled());

        scheduler.advance(Duration::from_secs(10));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_manual_fixed_rate_stops_itself() {
        let scheduler = ManualScheduler::new();
        let runs = Arc::new(Mutex::new(Vec::new()));
        let log = runs.clone();
        let mut remaining = 3;
        scheduler.schedule_at_fixed_rate(
            Duration::ZERO,
            Duration::from_millis(10),
            Box::new(move || {
                log.lock().unwrap().push(remaining);
                remaining -= 1;
                if remaining == 0 {
                    TaskControl::Stop
                } else {
                    TaskControl::Continue
                }
            }),
        );

        assert_eq!(scheduler.advance(Duration::ZERO), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(25)), 2);
        assert_eq!(*runs.lock().unwrap(), vec![3, 2, 1]);
        assert_eq!(scheduler.advance(Duration::from_millis(100)), 0);
    }

    #[test]
    fn test_manual_cancel() {
        let scheduler = ManualScheduler::new();
        let (count, seen) = counter();
        let handle = scheduler.schedule_at_fixed_rate(
            Duration::from_millis(5),
            Duration::from_millis(5),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
                TaskControl::Continue
            }),
        );
        scheduler.advance(Duration::from_millis(12));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        handle.cancel();
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_thread_scheduler_runs_and_stops() {
        let scheduler = ThreadScheduler::new();
        let (count, seen) = counter();
        let handle = scheduler.schedule_at_fixed_rate(
            Duration::ZERO,
            Duration::from_millis(1),
            Box::new(move || {
                if count.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                    TaskControl::Stop
                } else {
                    TaskControl::Continue
                }
            }),
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while !handle.is_cancelled() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(handle.is_cancelled());
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
