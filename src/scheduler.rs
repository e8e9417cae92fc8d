//! Scheduler - the single-threaded task queue deferred work is posted to.
//!
//! A store `update` returns immediately and posts its flush here. The host
//! drives the queue: call [`Scheduler::run_turn`] once per event-loop turn, or
//! [`Scheduler::run_until_idle`] to settle everything.
//!
//! There is no cancellation: a posted task always runs when the queue is driven.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;

type Task = Box<dyn FnOnce() -> Result<()>>;

/// Cloneable handle to a FIFO task queue.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Rc<RefCell<VecDeque<Task>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for a later turn.
    pub fn post(&self, task: impl FnOnce() -> Result<()> + 'static) {
        self.queue.borrow_mut().push_back(Box::new(task));
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Run the tasks that were queued when the turn started.
    ///
    /// Tasks posted while the turn runs wait for the next turn. If a task
    /// fails, the error is returned and the rest of the turn stays queued.
    pub fn run_turn(&self) -> Result<usize> {
        let budget = self.pending();
        let mut ran = 0;
        while ran < budget {
            let Some(task) = self.next_task() else { break };
            ran += 1;
            task()?;
        }
        Ok(ran)
    }

    /// Run turns until the queue is empty. Returns the number of tasks run.
    pub fn run_until_idle(&self) -> Result<usize> {
        let mut ran = 0;
        while !self.is_idle() {
            ran += self.run_turn()?;
        }
        Ok(ran)
    }

    fn next_task(&self) -> Option<Task> {
        // Borrow ends before the task runs so it can post more work.
        self.queue.borrow_mut().pop_front()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
