//! Dense cell-to-actor index used for constant-time collision queries.

use gridfire_core::{ActorId, CellCoord, CellSpan, Edge, OccupancyView};
use thiserror::Error;

/// Raised when a claim would overwrite or escape the grid.
///
/// The movement resolver checks cells before claiming them, so observing this
/// error indicates a bookkeeping bug rather than a gameplay event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum OccupancyConflict {
    /// The cell lies outside `[0, columns) x [0, rows)`.
    #[error("cell {0:?} lies outside the grid")]
    OutOfBounds(CellCoord),
    /// The cell already belongs to another actor.
    #[error("cell {cell:?} is already claimed by {occupant:?}")]
    Occupied {
        /// Contested cell.
        cell: CellCoord,
        /// Actor holding the cell.
        occupant: ActorId,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<Option<ActorId>>,
}

impl OccupancyGrid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Occupant at signed coordinates; anything off-grid reads as empty.
    pub(crate) fn occupant_at(&self, x: i64, y: i64) -> Option<ActorId> {
        self.index(x, y)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports which edge a sprite of `width` anchored at `(x, y)` would cross.
    pub(crate) fn edge_crossed(&self, x: i64, y: i64, width: u32) -> Option<Edge> {
        if x < 0 {
            Some(Edge::Left)
        } else if x + i64::from(width) > i64::from(self.columns) {
            Some(Edge::Right)
        } else if y < 0 {
            Some(Edge::Top)
        } else if y >= i64::from(self.rows) {
            Some(Edge::Bottom)
        } else {
            None
        }
    }

    /// Nearest anchor at which a sprite of `width` fits, if the grid can hold it at all.
    pub(crate) fn clamp_anchor(&self, x: i64, y: i64, width: u32) -> Option<CellCoord> {
        let max_x = i64::from(self.columns) - i64::from(width);
        let max_y = i64::from(self.rows) - 1;
        if max_x < 0 || max_y < 0 {
            return None;
        }
        let column = u32::try_from(x.clamp(0, max_x)).ok()?;
        let row = u32::try_from(y.clamp(0, max_y)).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// First cell of `span` that is held by someone other than `actor`.
    pub(crate) fn first_conflict(&self, actor: ActorId, span: CellSpan) -> Option<OccupancyConflict> {
        span.cells().find_map(|cell| {
            match self.index(i64::from(cell.column()), i64::from(cell.row())) {
                None => Some(OccupancyConflict::OutOfBounds(cell)),
                Some(index) => match self.cells.get(index).copied().flatten() {
                    Some(occupant) if occupant != actor => {
                        Some(OccupancyConflict::Occupied { cell, occupant })
                    }
                    _ => None,
                },
            }
        })
    }

    /// Marks every cell of `span` as owned by `actor`; nothing is written on failure.
    pub(crate) fn claim(&mut self, actor: ActorId, span: CellSpan) -> Result<(), OccupancyConflict> {
        if let Some(conflict) = self.first_conflict(actor, span) {
            return Err(conflict);
        }
        for cell in span.cells() {
            if let Some(slot) = self
                .index(i64::from(cell.column()), i64::from(cell.row()))
                .and_then(|index| self.cells.get_mut(index))
            {
                *slot = Some(actor);
            }
        }
        Ok(())
    }

    /// Clears the cells of `span` still held by `actor`.
    pub(crate) fn release(&mut self, actor: ActorId, span: CellSpan) {
        for cell in span.cells() {
            if let Some(slot) = self
                .index(i64::from(cell.column()), i64::from(cell.row()))
                .and_then(|index| self.cells.get_mut(index))
            {
                if *slot == Some(actor) {
                    *slot = None;
                }
            }
        }
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.cells, self.columns, self.rows)
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.columns) || y >= i64::from(self.rows) {
            return None;
        }
        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}
