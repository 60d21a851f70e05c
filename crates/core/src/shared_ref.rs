//! One element reference shared between an internal owner and any number
//! of observers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Observer<T> = Rc<dyn Fn(Option<&T>)>;

/// Handle returned by [`SharedRef::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct Inner<T> {
    value: Option<T>,
    observers: Vec<(ObserverId, Observer<T>)>,
    next_id: u64,
}

/// Cloning yields another handle to the same slot.
pub struct SharedRef<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for SharedRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedRef<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SharedRef")
            .field("value", &inner.value)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl<T> SharedRef<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: None,
                observers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// The observer is told about every later attach and detach.
    pub fn observe(&self, observer: impl Fn(Option<&T>) + 'static) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, Rc::new(observer)));
        id
    }

    pub fn unobserve(&self, id: ObserverId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.observers.len();
        inner.observers.retain(|(observer, _)| *observer != id);
        inner.observers.len() != before
    }

    /// Stores `value` and notifies observers in registration order.
    /// Observers may read the slot but must not write it.
    pub fn set(&self, value: Option<T>) {
        let observers: Vec<Observer<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
            inner.observers.iter().map(|(_, o)| Rc::clone(o)).collect()
        };
        let inner = self.inner.borrow();
        for observer in observers {
            observer(inner.value.as_ref());
        }
    }

    pub fn clear(&self) {
        self.set(None);
    }

    pub fn is_set(&self) -> bool {
        self.inner.borrow().value.is_some()
    }
}

impl<T: Clone> SharedRef<T> {
    pub fn get(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }
}
