//! crates/alttrack_core/src/observable.rs
//!
//! A mutable value that pushes every change to its subscribers.

use tokio::sync::watch;

/// Shared state with a subscribe/notify contract.
///
/// Every `set` or `update` is a single atomic replacement of the whole value,
/// and wakes every receiver handed out by `subscribe`.
#[derive(Debug)]
pub struct Observable<T> {
    sender: watch::Sender<T>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        let (sender, _) = watch::channel(value);
        Self { sender }
    }

    /// Runs `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow())
    }

    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.sender.send_modify(f);
    }

    /// Receivers see the latest value and are woken on every change.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
