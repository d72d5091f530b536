//! The application-facing delivery sink for finished [`DisplaySet`]s.

use crate::display_set::DisplaySet;

/// A synchronous sink invoked once per completed display set (end-of-
/// display-set segment, clause 7.2.1). Delivery is immediate: no
/// buffering, coalescing, or background thread sits between a
/// [`crate::Decoder::feed`] call and this callback.
pub(crate) struct CallbackSink {
    callback: Option<Box<dyn FnMut(&DisplaySet) + Send>>,
}

impl Default for CallbackSink {
    fn default() -> Self {
        Self { callback: None }
    }
}

impl CallbackSink {
    pub(crate) fn set(&mut self, callback: Box<dyn FnMut(&DisplaySet) + Send>) {
        self.callback = Some(callback);
    }

    pub(crate) fn clear(&mut self) {
        self.callback = None;
    }

    pub(crate) fn emit(&mut self, set: &DisplaySet) {
        if let Some(callback) = self.callback.as_mut() {
            callback(set);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DisplayDefinition;

    fn empty_set() -> DisplaySet {
        DisplaySet {
            pts: 0,
            page_time_out_seconds: 0,
            display_def: DisplayDefinition::default(),
            rects: Vec::new(),
        }
    }

    #[test]
    fn no_callback_set_is_a_no_op() {
        let mut sink = CallbackSink::default();
        sink.emit(&empty_set());
    }

    #[test]
    fn callback_receives_the_display_set() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(0_u64));
        let seen_clone = seen.clone();
        let mut sink = CallbackSink::default();
        sink.set(Box::new(move |set| {
            *seen_clone.lock().unwrap() = set.pts;
        }));

        let mut set = empty_set();
        set.pts = 99;
        sink.emit(&set);
        assert_eq!(*seen.lock().unwrap(), 99);
    }

    #[test]
    fn clearing_stops_delivery() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let mut sink = CallbackSink::default();
        sink.set(Box::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));
        sink.clear();
        sink.emit(&empty_set());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
