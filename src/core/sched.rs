/// Cancelable scheduled tasks over a deterministic millisecond clock.
///
/// The library never touches a real clock; hosts call `advance` from
/// their own frame loop. Every scheduled task hands back a `Disposer`,
/// and a disposed task never fires. Screen teardown disposes its pending
/// transitions so stale callbacks cannot act after navigation away.

use std::cell::Cell;
use std::rc::Rc;

/// Cancellation handle for a pending task. Dropping it does NOT cancel;
/// cancellation is always an explicit `dispose`.
#[derive(Debug, Clone)]
pub struct Disposer {
    cancelled: Rc<Cell<bool>>,
}

impl Disposer {
    /// Cancels the task. Idempotent, and safe after the task has fired.
    pub fn dispose(&self) {
        self.cancelled.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.cancelled.get()
    }
}

struct Task {
    due: u64,
    interval: Option<u64>,
    cancelled: Rc<Cell<bool>>,
    callback: Box<dyn FnMut()>,
}

/// Single-threaded task queue driven by `advance`. Times are plain
/// milliseconds; `now` starts at zero.
#[derive(Default)]
pub struct Scheduler {
    now: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Runs `callback` once, `delay_ms` from now.
    pub fn after(&mut self, delay_ms: u64, callback: impl FnMut() + 'static) -> Disposer {
        let due = self.now + delay_ms;
        self.push(due, None, callback)
    }

    /// Runs `callback` every `interval_ms` until disposed.
    pub fn every(&mut self, interval_ms: u64, callback: impl FnMut() + 'static) -> Disposer {
        let interval = interval_ms.max(1);
        self.push(self.now + interval, Some(interval), callback)
    }

    fn push(&mut self, due: u64, interval: Option<u64>, callback: impl FnMut() + 'static) -> Disposer {
        let cancelled = Rc::new(Cell::new(false));
        self.tasks.push(Task {
            due,
            interval,
            cancelled: Rc::clone(&cancelled),
            callback: Box::new(callback),
        });
        Disposer { cancelled }
    }

    /// Number of live pending tasks.
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|t| !t.cancelled.get()).count()
    }

    /// Moves the clock forward by `ms`, firing due tasks in due-time
    /// order. Repeating tasks fire once per elapsed interval; tasks
    /// scheduled by a firing callback run in the same advance if they
    /// come due before the deadline.
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.now + ms;
        loop {
            self.tasks.retain(|t| !t.cancelled.get());
            let next = self
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= deadline)
                .min_by_key(|(_, t)| t.due)
                .map(|(i, t)| (i, t.due));
            let Some((idx, due)) = next else {
                break;
            };
            self.now = due;
            let mut task = self.tasks.swap_remove(idx);
            (task.callback)();
            if !task.cancelled.get() {
                if let Some(interval) = task.interval {
                    task.due = due + interval;
                    self.tasks.push(task);
                }
            }
        }
        self.now = deadline;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn counter() -> (Rc<RefCell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(RefCell::new(0u32));
        let inner = Rc::clone(&count);
        (count, move || *inner.borrow_mut() += 1)
    }

    #[test]
    fn after_fires_exactly_at_due_time() {
        let mut sched = Scheduler::new();
        let (count, cb) = counter();
        sched.after(100, cb);
        sched.advance(99);
        assert_eq!(*count.borrow(), 0);
        sched.advance(1);
        assert_eq!(*count.borrow(), 1);
        // one-shot: never again
        sched.advance(1000);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn disposed_task_never_fires() {
        let mut sched = Scheduler::new();
        let (count, cb) = counter();
        let disposer = sched.after(50, cb);
        disposer.dispose();
        assert!(disposer.is_disposed());
        sched.advance(200);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn dispose_after_due_but_before_advance_still_cancels() {
        // The host tore the screen down while the timer was already due.
        let mut sched = Scheduler::new();
        let (count, cb) = counter();
        let disposer = sched.after(10, cb);
        disposer.dispose();
        sched.advance(10);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn every_fires_once_per_interval() {
        let mut sched = Scheduler::new();
        let (count, cb) = counter();
        sched.every(250, cb);
        sched.advance(1000);
        assert_eq!(*count.borrow(), 4);
        sched.advance(249);
        assert_eq!(*count.borrow(), 4);
        sched.advance(1);
        assert_eq!(*count.borrow(), 5);
    }

    #[test]
    fn disposing_interval_stops_it() {
        let mut sched = Scheduler::new();
        let (count, cb) = counter();
        let disposer = sched.every(100, cb);
        sched.advance(250);
        assert_eq!(*count.borrow(), 2);
        disposer.dispose();
        sched.advance(1000);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn tasks_fire_in_due_time_order() {
        let mut sched = Scheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        sched.after(200, move || o1.borrow_mut().push("late"));
        sched.after(100, move || o2.borrow_mut().push("early"));
        sched.advance(300);
        assert_eq!(*order.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn clock_advances_even_with_nothing_pending() {
        let mut sched = Scheduler::new();
        sched.advance(500);
        assert_eq!(sched.now(), 500);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut sched = Scheduler::new();
        let (_, cb) = counter();
        let disposer = sched.after(10, cb);
        disposer.dispose();
        disposer.dispose();
        assert!(disposer.is_disposed());
    }
}
