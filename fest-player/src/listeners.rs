//! Play/pause listener list

use crate::state::PlaybackState;
use std::sync::{Arc, Mutex, Weak};

type Listener = Arc<dyn Fn(PlaybackState) + Send + Sync>;

#[derive(Default)]
struct ListenerList {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    list: Arc<Mutex<ListenerList>>,
}

impl ListenerRegistry {
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let mut list = self.list.lock().unwrap();
        let id = list.next_id;
        list.next_id += 1;
        list.entries.push((id, listener));
        Subscription {
            id,
            list: Arc::downgrade(&self.list),
        }
    }

    /// Call every listener in registration order
    ///
    /// The list is copied first so listeners may subscribe or unsubscribe
    /// from inside the callback.
    pub fn notify(&self, state: PlaybackState) {
        let listeners: Vec<Listener> = self
            .list
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(state);
        }
    }

    pub fn len(&self) -> usize {
        self.list.lock().unwrap().entries.len()
    }
}

/// Returned by `subscribe`; call `unsubscribe` to stop receiving updates
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe() to remove it"]
pub struct Subscription {
    id: u64,
    list: Weak<Mutex<ListenerList>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(list) = self.list.upgrade() {
            list.lock().unwrap().entries.retain(|(id, _)| *id != self.id);
        }
    }
}
