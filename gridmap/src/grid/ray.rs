use std::collections::BTreeSet;

use super::map::CellCoord;

/// Walks the cells of the discrete line from `start` to `end` (both inclusive) using integer
/// Bresenham rasterization. The walk steps one cell along the dominant axis per iteration and
/// moves along the minor axis whenever the decision variable says the line has crossed over.
///
/// Cells outside of any grid are produced as-is, clipping is up to the caller.
pub struct BresenhamIterator {
    current: CellCoord,
    row_step: isize,
    col_step: isize,
    /// The column axis is the dominant one.
    steep: bool,
    d: isize,
    inc1: isize,
    inc2: isize,
    remaining_cells: usize,
}

impl BresenhamIterator {
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        let d_row = end.row - start.row;
        let d_col = end.col - start.col;

        let steep = d_col.abs() > d_row.abs();
        let (major, minor) = if steep {
            (d_col.abs(), d_row.abs())
        } else {
            (d_row.abs(), d_col.abs())
        };

        let inc1 = 2 * minor;
        let d = inc1 - major;
        let inc2 = d - major;

        Self {
            current: start,
            row_step: d_row.signum(),
            col_step: d_col.signum(),
            steep,
            d,
            inc1,
            inc2,
            remaining_cells: major as usize + 1,
        }
    }

    fn advance(&mut self) {
        if self.steep {
            self.current.col += self.col_step;
        } else {
            self.current.row += self.row_step;
        }

        if self.d < 0 {
            self.d += self.inc1;
        } else {
            self.d += self.inc2;
            if self.steep {
                self.current.row += self.row_step;
            } else {
                self.current.col += self.col_step;
            }
        }
    }
}

impl Iterator for BresenhamIterator {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining_cells == 0 {
            return None;
        }

        let cell = self.current;
        self.remaining_cells -= 1;
        if self.remaining_cells > 0 {
            self.advance();
        }
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining_cells, Some(self.remaining_cells))
    }
}

impl ExactSizeIterator for BresenhamIterator {}

/// Walks the segment between `start` and `end` beginning at the smaller of the two endpoints,
/// so both directions visit the same cells.
pub fn walk(start: CellCoord, end: CellCoord) -> BresenhamIterator {
    if end < start {
        BresenhamIterator::new(end, start)
    } else {
        BresenhamIterator::new(start, end)
    }
}

/// Returns every cell the segment between `start` and `end` crosses, endpoints included.
/// `trace(a, b) == trace(b, a)` holds for all cells.
pub fn trace(start: CellCoord, end: CellCoord) -> BTreeSet<CellCoord> {
    let mut cells = BTreeSet::new();
    trace_into(start, end, &mut cells);
    cells
}

/// Like [`trace`] but adds the cells to an existing set, which lets overlapping rays of one scan
/// collapse into a single entry per cell.
pub fn trace_into(start: CellCoord, end: CellCoord, cells: &mut BTreeSet<CellCoord>) {
    cells.extend(walk(start, end));
}

#[cfg(test)]
mod test {
    use super::*;

    fn c(row: isize, col: isize) -> CellCoord {
        CellCoord::new(row, col)
    }

    #[test]
    fn single_cell() {
        let cells = trace(c(3, 4), c(3, 4));
        assert_eq!(cells.into_iter().collect::<Vec<_>>(), vec![c(3, 4)]);
    }

    #[test]
    fn axis_aligned() {
        let cells: Vec<_> = BresenhamIterator::new(c(0, 0), c(4, 0)).collect();
        assert_eq!(cells, vec![c(0, 0), c(1, 0), c(2, 0), c(3, 0), c(4, 0)]);

        let cells: Vec<_> = BresenhamIterator::new(c(2, 3), c(2, -1)).collect();
        assert_eq!(cells, vec![c(2, 3), c(2, 2), c(2, 1), c(2, 0), c(2, -1)]);
    }

    #[test]
    fn diagonal() {
        let cells: Vec<_> = BresenhamIterator::new(c(0, 0), c(-3, 3)).collect();
        assert_eq!(cells, vec![c(0, 0), c(-1, 1), c(-2, 2), c(-3, 3)]);
    }

    #[test]
    fn shallow_line_walk() {
        let cells: Vec<_> = BresenhamIterator::new(c(0, 0), c(2, 1)).collect();
        assert_eq!(cells, vec![c(0, 0), c(1, 1), c(2, 1)]);
    }

    #[test]
    fn steep_line_has_one_cell_per_column() {
        let cells: Vec<_> = BresenhamIterator::new(c(0, 0), c(3, 10)).collect();
        assert_eq!(cells.len(), 11);
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.col, i as isize);
        }
        assert_eq!(cells.last(), Some(&c(3, 10)));
    }

    #[test]
    fn walk_ends_at_endpoint_in_all_octants() {
        for row in -7..=7 {
            for col in -7..=7 {
                let start = c(1, -2);
                let end = c(row, col);
                let cells: Vec<_> = BresenhamIterator::new(start, end).collect();

                assert_eq!(cells.first(), Some(&start));
                assert_eq!(cells.last(), Some(&end));

                // consecutive cells are 8-connected
                for pair in cells.windows(2) {
                    assert!((pair[0].row - pair[1].row).abs() <= 1);
                    assert!((pair[0].col - pair[1].col).abs() <= 1);
                    assert_ne!(pair[0], pair[1]);
                }
            }
        }
    }

    #[test]
    fn trace_is_symmetric() {
        for row in -6..=6 {
            for col in -6..=6 {
                let a = c(0, 0);
                let b = c(row, col);
                assert_eq!(trace(a, b), trace(b, a), "{a:?} <-> {b:?}");
            }
        }
    }

    #[test]
    fn trace_into_deduplicates() {
        let mut cells = BTreeSet::new();
        trace_into(c(0, 0), c(0, 5), &mut cells);
        trace_into(c(0, 0), c(0, 3), &mut cells);
        assert_eq!(cells.len(), 6);
    }
}
