//! Shared UI State
//!
//! Requests in flight and the notices stacked in the corner of the screen.
//! Pages report through [`GlobalState::notify`] and [`GlobalState::report`];
//! each notice dismisses itself after a while or when clicked.

use std::future::Future;

use gloo_timers::callback::Timeout;
use leptos::*;

/// Notices kept on screen at once; the oldest goes first
pub const MAX_NOTICES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

impl NoticeKind {
    /// How long a notice stays up
    fn lifetime_ms(self) -> u32 {
        match self {
            NoticeKind::Info => 3_000,
            NoticeKind::Error => 6_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
}

/// Notices in arrival order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticeQueue {
    items: Vec<Notice>,
    next_id: u64,
}

impl NoticeQueue {
    /// Add a notice and return its id. An identical notice already on
    /// screen is replaced rather than stacked twice.
    pub fn push(&mut self, kind: NoticeKind, text: &str) -> u64 {
        self.next_id += 1;
        let id = self.next_id;

        self.items.retain(|n| !(n.kind == kind && n.text == text));
        self.items.push(Notice {
            id,
            kind,
            text: text.to_string(),
        });

        if self.items.len() > MAX_NOTICES {
            let excess = self.items.len() - MAX_NOTICES;
            self.items.drain(..excess);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }
}

/// State shared by every page
#[derive(Clone, Copy)]
pub struct GlobalState {
    in_flight: RwSignal<u32>,
    notices: RwSignal<NoticeQueue>,
}

pub fn provide_global_state() {
    provide_context(GlobalState {
        in_flight: create_rw_signal(0),
        notices: create_rw_signal(NoticeQueue::default()),
    });
}

impl GlobalState {
    /// Whether a tracked request is still running
    pub fn busy(&self) -> bool {
        self.in_flight.get() > 0
    }

    /// Await `request`, counting it as in flight meanwhile
    pub async fn track<F: Future>(self, request: F) -> F::Output {
        self.in_flight.update(|n| *n += 1);
        let output = request.await;
        self.in_flight.try_update(|n| *n = n.saturating_sub(1));
        output
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.with(|queue| queue.items().to_vec())
    }

    pub fn notify(&self, text: &str) {
        self.push(NoticeKind::Info, text);
    }

    pub fn report(&self, text: &str) {
        self.push(NoticeKind::Error, text);
    }

    pub fn dismiss(&self, id: u64) {
        self.notices.try_update(|queue| queue.dismiss(id));
    }

    fn push(&self, kind: NoticeKind, text: &str) {
        let mut id = 0;
        self.notices.update(|queue| id = queue.push(kind, text));

        let notices = self.notices;
        Timeout::new(kind.lifetime_ms(), move || {
            notices.try_update(|queue| queue.dismiss(id));
        })
        .forget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_queue_keeps_newest() {
        let mut queue = NoticeQueue::default();
        for text in ["one", "two", "three", "four"] {
            queue.push(NoticeKind::Info, text);
        }

        let texts: Vec<_> = queue.items().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three", "four"]);
    }

    #[wasm_bindgen_test]
    fn test_repeated_notice_is_not_stacked() {
        let mut queue = NoticeQueue::default();
        let first = queue.push(NoticeKind::Error, "Backend unreachable");
        queue.push(NoticeKind::Info, "Project created");
        let second = queue.push(NoticeKind::Error, "Backend unreachable");

        assert_ne!(first, second);
        assert_eq!(queue.items().len(), 2);
        assert_eq!(queue.items()[1].id, second);

        // The timer of the replaced notice must not remove its successor
        assert!(!queue.dismiss(first));
        assert_eq!(queue.items().len(), 2);
    }

    #[wasm_bindgen_test]
    fn test_dismiss() {
        let mut queue = NoticeQueue::default();
        let id = queue.push(NoticeKind::Info, "Uploaded brief.txt");

        assert!(queue.dismiss(id));
        assert!(queue.items().is_empty());
        assert!(!queue.dismiss(id));
    }
}
