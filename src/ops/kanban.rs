use serde::Serialize;
use tracing::debug;

use crate::model::item::{ItemDraft, WorkItem};
use crate::model::vocab::{Tone, Vocabulary};

use super::group::group_by_status;

/// One status column and the items whose status matches it exactly.
#[derive(Debug, Clone, Serialize)]
pub struct KanbanColumn<'a> {
    pub status: String,
    pub tone: Tone,
    pub items: Vec<&'a WorkItem>,
}

/// Columns in vocabulary order. Items with an unknown status appear in no column.
pub fn columns<'a>(items: &[&'a WorkItem], vocab: &Vocabulary) -> Vec<KanbanColumn<'a>> {
    group_by_status(items, vocab)
        .into_iter()
        .map(|(status, items)| KanbanColumn {
            tone: vocab.status_tone(&status),
            status,
            items,
        })
        .collect()
}

/// The column `step` positions away from `current`, for keyboard moves.
pub fn adjacent_status<'a>(vocab: &'a Vocabulary, current: &str, step: isize) -> Option<&'a str> {
    let index = vocab.statuses.iter().position(|s| s.name == current)?;
    let target = index.checked_add_signed(step)?;
    vocab.statuses.get(target).map(|s| s.name.as_str())
}

/// Draft for a column's "+" control: the base draft with the column status.
pub fn column_draft(mut base: ItemDraft, status: &str) -> ItemDraft {
    base.status = Some(status.to_string());
    base
}

// ---------------------------------------------------------------------------
// Drag and drop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    /// Pointer is down on a card but has not travelled past the threshold
    Pressed { item_id: String, origin: Point },
    Dragging { item_id: String, origin: Point, position: Point },
}

/// Pointer input, already hit-tested by the host: `Down` names the card
/// under the pointer, `Up` names the column (by status) it was released over.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down { item_id: String, at: Point },
    Move { at: Point },
    Up { at: Point, column: Option<String> },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KanbanAction {
    None,
    OpenItem(String),
    UpdateStatus { id: String, status: String },
    Cancelled,
}

/// Click-vs-drag state machine for one board. Only one drag is tracked at a
/// time; a press while another gesture is in progress is ignored.
#[derive(Debug, Clone)]
pub struct DragTracker {
    state: DragState,
    threshold: f64,
}

impl DragTracker {
    pub fn new(threshold: f64) -> Self {
        DragTracker {
            state: DragState::Idle,
            threshold,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Id of the card being pressed or dragged.
    pub fn active_item(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::Pressed { item_id, .. } | DragState::Dragging { item_id, .. } => {
                Some(item_id)
            }
        }
    }

    /// Feed one pointer event. `items` resolves the dragged card's current status.
    pub fn handle(&mut self, event: PointerEvent, items: &[WorkItem]) -> KanbanAction {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        match (state, event) {
            (DragState::Idle, PointerEvent::Down { item_id, at }) => {
                self.state = DragState::Pressed {
                    item_id,
                    origin: at,
                };
                KanbanAction::None
            }
            (busy @ (DragState::Pressed { .. } | DragState::Dragging { .. }), PointerEvent::Down { .. }) => {
                self.state = busy;
                KanbanAction::None
            }
            (DragState::Pressed { item_id, origin }, PointerEvent::Move { at }) => {
                if origin.distance(at) >= self.threshold {
                    debug!(item = %item_id, "drag started");
                    self.state = DragState::Dragging {
                        item_id,
                        origin,
                        position: at,
                    };
                } else {
                    self.state = DragState::Pressed { item_id, origin };
                }
                KanbanAction::None
            }
            (DragState::Dragging { item_id, origin, .. }, PointerEvent::Move { at }) => {
                self.state = DragState::Dragging {
                    item_id,
                    origin,
                    position: at,
                };
                KanbanAction::None
            }
            (DragState::Pressed { item_id, origin }, PointerEvent::Up { at, column }) => {
                if origin.distance(at) < self.threshold {
                    KanbanAction::OpenItem(item_id)
                } else {
                    drop_on(item_id, column, items)
                }
            }
            (DragState::Dragging { item_id, .. }, PointerEvent::Up { column, .. }) => {
                drop_on(item_id, column, items)
            }
            (DragState::Pressed { .. } | DragState::Dragging { .. }, PointerEvent::Cancel) => {
                debug!("drag cancelled");
                KanbanAction::Cancelled
            }
            (DragState::Idle, _) => KanbanAction::None,
        }
    }
}

fn drop_on(item_id: String, column: Option<String>, items: &[WorkItem]) -> KanbanAction {
    let Some(status) = column else {
        debug!(item = %item_id, "dropped outside any column");
        return KanbanAction::Cancelled;
    };
    let Some(item) = items.iter().find(|i| i.id == item_id) else {
        return KanbanAction::Cancelled;
    };
    if item.status.as_deref() == Some(status.as_str()) {
        return KanbanAction::None;
    }
    debug!(item = %item_id, status = %status, "dropped on column");
    KanbanAction::UpdateStatus {
        id: item_id,
        status,
    }
}
