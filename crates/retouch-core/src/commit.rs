//! Single-writer commit queue for computed patches.
//!
//! Region operations compute patches synchronously; inserting them into the
//! surface and document happens here, strictly in submission order.

use crate::compose::RasterPatch;
use crate::document::{Document, ObjectId, RasterObject};
use crate::raster::RasterSurface;
use std::collections::VecDeque;
use uuid::Uuid;

/// Position of a patch in the commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitTicket(u64);

impl CommitTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// A patch that has been written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub ticket: CommitTicket,
    pub object: ObjectId,
}

/// FIFO of patches waiting to be committed.
#[derive(Debug, Default)]
pub struct CommitQueue {
    pending: VecDeque<(CommitTicket, RasterPatch)>,
    next: u64,
}

impl CommitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a patch behind everything already pending.
    pub fn submit(&mut self, patch: RasterPatch) -> CommitTicket {
        let ticket = CommitTicket(self.next);
        self.next += 1;
        log::debug!("Queued {} patch as #{}", patch.kind.label(), ticket.0);
        self.pending.push_back((ticket, patch));
        ticket
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply every pending patch in order, adding one raster object per patch.
    pub fn flush(&mut self, surface: &mut dyn RasterSurface, document: &mut Document) -> Vec<Committed> {
        let mut done = Vec::with_capacity(self.pending.len());
        while let Some((ticket, patch)) = self.pending.pop_front() {
            patch.apply_to(surface);
            let object = document.push(RasterObject {
                id: Uuid::new_v4(),
                kind: patch.kind,
                pixels: patch.pixels,
                scene_origin: patch.scene_origin,
                scene_scale: patch.scene_scale,
            });
            log::info!("Committed #{} as object {}", ticket.0, object);
            done.push(Committed { ticket, object });
        }
        done
    }
}
