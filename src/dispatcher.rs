use std::sync::mpsc;

use crate::event::ReviewEvent;

pub trait Dispatcher {
    fn dispatch(&self, event: ReviewEvent);
}

impl Dispatcher for mpsc::Sender<ReviewEvent> {
    fn dispatch(&self, event: ReviewEvent) {
        let _ = self.send(event);
    }
}
