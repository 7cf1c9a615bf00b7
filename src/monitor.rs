//! Monitor: a mutex and the condition variable that guards it.
//!
//! Every piece of shared simulation state lives behind one [`Monitor`]. The
//! pairing is fixed at construction so a wait can never be issued against a
//! different lock than the one that protected the preceding check.
//!
//! Built on `parking_lot`, so there is no poisoning: a panicking worker does
//! not make the state unusable for the others.
//!
//! # Examples
//!
//! ```
//! use lfg_parking_lot::Monitor;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let monitor = Arc::new(Monitor::new(0_u32));
//! let producer = Arc::clone(&monitor);
//!
//! thread::spawn(move || {
//!     *producer.lock() = 10;
//!     producer.notify_all();
//! });
//!
//! let mut count = monitor.lock();
//! monitor.wait_until(&mut count, |c| *c >= 10);
//! assert_eq!(*count, 10);
//! ```

use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

/// A value guarded by a mutex, with a condition variable bound to that mutex.
#[derive(Debug, Default)]
pub struct Monitor<T> {
    state: Mutex<T>,
    condvar: Condvar,
}

impl<T> Monitor<T> {
    /// Creates a monitor around `value`.
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(value),
            condvar: Condvar::new(),
        }
    }

    /// Acquires the lock, blocking until it is available.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock()
    }

    /// Blocks until `ready` holds for the guarded value.
    ///
    /// The predicate is evaluated under the lock before the first wait and
    /// again after every wakeup, so a notification that lands between the
    /// caller's check and this call is never lost, and spurious wakeups are
    /// absorbed.
    #[inline]
    pub fn wait_until<F>(&self, guard: &mut MutexGuard<'_, T>, mut ready: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.condvar.wait_while(guard, |state| !ready(&*state));
    }

    /// Like [`wait_until`](Self::wait_until) but gives up after `timeout`.
    ///
    /// Returns `true` if the predicate holds on return, `false` if the wait
    /// timed out with the predicate still false.
    #[inline]
    pub fn wait_until_for<F>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        mut ready: F,
        timeout: Duration,
    ) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let result = self
            .condvar
            .wait_while_for(guard, |state| !ready(&*state), timeout);
        !result.timed_out() || ready(&**guard)
    }

    /// Wakes every thread blocked on this monitor.
    ///
    /// Waiters re-check their own predicate, so broadcasting is always safe.
    #[inline]
    pub fn notify_all(&self) {
        self.condvar.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_until_already_true_does_not_block() {
        let monitor = Monitor::new(true);
        let mut ready = monitor.lock();
        monitor.wait_until(&mut ready, |r| *r);
        assert!(*ready);
    }

    #[test]
    fn test_wait_until_wakes_on_broadcast() {
        let monitor = Arc::new(Monitor::new(0_u32));
        let mut handles = vec![];

        for _ in 0..5 {
            let monitor = Arc::clone(&monitor);
            handles.push(thread::spawn(move || {
                let mut value = monitor.lock();
                monitor.wait_until(&mut value, |v| *v == 7);
                *value
            }));
        }

        thread::sleep(Duration::from_millis(10));
        *monitor.lock() = 7;
        monitor.notify_all();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
    }

    #[test]
    fn test_wait_until_ignores_unrelated_notifications() {
        let monitor = Arc::new(Monitor::new(0_u32));
        let producer = Arc::clone(&monitor);

        let handle = thread::spawn(move || {
            for i in 1..=5 {
                thread::sleep(Duration::from_millis(2));
                *producer.lock() = i;
                producer.notify_all();
            }
        });

        let mut value = monitor.lock();
        monitor.wait_until(&mut value, |v| *v == 5);
        assert_eq!(*value, 5);
        drop(value);
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_until_for_times_out() {
        let monitor = Monitor::new(false);
        let mut ready = monitor.lock();
        let start = Instant::now();
        let satisfied = monitor.wait_until_for(&mut ready, |r| *r, Duration::from_millis(20));
        assert!(!satisfied);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_until_for_returns_early_when_satisfied() {
        let monitor = Arc::new(Monitor::new(false));
        let producer = Arc::clone(&monitor);

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            *producer.lock() = true;
            producer.notify_all();
        });

        let mut ready = monitor.lock();
        let start = Instant::now();
        let satisfied = monitor.wait_until_for(&mut ready, |r| *r, Duration::from_secs(5));
        assert!(satisfied);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
