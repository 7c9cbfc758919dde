// SPDX-License-Identifier: GPL-3.0-only

//! Cancelable timers and background jobs
//!
//! Every timer or job the session runtime starts is held as a
//! [`ScheduledTask`]. Dropping the handle aborts the task, so clearing a slot
//! in [`SessionTasks`] is enough to cancel whatever it held.

use super::Message;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

/// Owned handle to a spawned tokio task, aborted on drop
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Spawn an arbitrary future
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        trace!(task = name, "Scheduling task");
        Self {
            name,
            handle: tokio::spawn(future),
        }
    }

    /// Send `make()` every `period`, first after one full period
    pub fn interval<F>(
        name: &'static str,
        period: Duration,
        sender: UnboundedSender<Message>,
        make: F,
    ) -> Self
    where
        F: Fn() -> Message + Send + 'static,
    {
        Self::spawn(name, async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if sender.send(make()).is_err() {
                    break;
                }
            }
        })
    }

    /// Send `message` once after `delay`
    pub fn delay(
        name: &'static str,
        delay: Duration,
        sender: UnboundedSender<Message>,
        message: Message,
    ) -> Self {
        Self::spawn(name, async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(message);
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the task now
    pub fn cancel(self) {
        trace!(task = self.name, "Cancelling task");
        // Drop aborts
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Every task slot the runtime can fill
#[derive(Debug, Default)]
pub struct SessionTasks {
    pub inference_loop: Option<ScheduledTask>,
    pub inference_job: Option<ScheduledTask>,
    pub countdown: Option<ScheduledTask>,
    pub shutter: Option<ScheduledTask>,
    pub capture_job: Option<ScheduledTask>,
}

impl SessionTasks {
    fn slots(&self) -> [&Option<ScheduledTask>; 5] {
        [
            &self.inference_loop,
            &self.inference_job,
            &self.countdown,
            &self.shutter,
            &self.capture_job,
        ]
    }

    /// Tasks still held and not yet finished
    pub fn alive(&self) -> usize {
        self.slots()
            .into_iter()
            .flatten()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Abort and drop every held task
    pub fn cancel_all(&mut self) {
        for task in [
            self.inference_loop.take(),
            self.inference_job.take(),
            self.countdown.take(),
            self.shutter.take(),
            self.capture_job.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.cancel();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots().into_iter().all(Option::is_none)
    }
}
