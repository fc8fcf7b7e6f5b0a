use std::time::Duration;

use crate::interaction::editor::Editor;
use crate::scene::snapshot::NodeSnapshot;

/// Rate-limited readout of the selected nodes for property panels.
///
/// [`SelectionPoller::poll`] yields at most once per interval, and only when the snapshots
/// differ from the last ones it yielded.
#[derive(Clone, Debug)]
pub struct SelectionPoller {
    interval: Duration,
    since_last: Duration,
    last: Option<Vec<NodeSnapshot>>,
}

impl SelectionPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            // First poll may fire immediately.
            since_last: interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn poll(&mut self, dt: Duration, editor: &Editor) -> Option<Vec<NodeSnapshot>> {
        self.since_last = self.since_last.saturating_add(dt);
        if self.since_last < self.interval {
            return None;
        }
        let current = editor.selected_snapshots();
        if self.last.as_ref() == Some(&current) {
            return None;
        }
        self.since_last = Duration::ZERO;
        self.last = Some(current.clone());
        Some(current)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/selection.rs"]
mod tests;
