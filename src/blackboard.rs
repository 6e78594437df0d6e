use parking_lot::RwLock;
use std::sync::Arc;

use sonarmap_mapping::{CellCounts, MappingContext, Pose};

/// What the status reporter needs, read under one lock.
#[derive(Debug, Clone, Copy)]
pub struct Status {
    pub pose: Pose,
    pub counts: CellCounts,
    pub last_scan_len: usize,
}

pub type Blackboard = Arc<RwLock<MappingContext>>;

pub fn new(context: MappingContext) -> Blackboard {
    Arc::new(RwLock::new(context))
}

pub fn snapshot(bb: &Blackboard) -> MappingContext {
    (*bb.read()).clone()
}

pub fn status(bb: &Blackboard) -> Status {
    let g = bb.read();
    Status {
        pose: g.pose(),
        counts: g.grid().counts(),
        last_scan_len: g.last_scan().len(),
    }
}
