use super::cell::{Cell, Direction};
use super::grid::Board;

impl Board {
    /// Advances every cell one tick.
    ///
    /// The next grid is built from scratch and only read from `self`, so no cell
    /// ever sees a neighbour's already-updated state. Tokens landing on the same
    /// cell merge; afterwards every merge with `n` members has each member turned
    /// clockwise `n - 1` times, which decides how the collision splits next tick.
    pub fn next_state(&mut self) {
        let mut next = Board::new(self.rows(), self.cols());

        for (col, row, cell) in self.iter() {
            match cell {
                Cell::Dead => {}
                Cell::Wall | Cell::SoundWall | Cell::RotateClockwise | Cell::RotateCounterClockwise => {
                    next[(col, row)] = cell.clone();
                }
                Cell::Token(dir) => self.advance(&mut next, col, row, *dir),
                Cell::Merged(dirs) => {
                    for dir in dirs {
                        self.advance(&mut next, col, row, *dir);
                    }
                }
            }
        }

        for cell in next.cells_mut() {
            if let Cell::Merged(dirs) = cell {
                let turns = dirs.len().saturating_sub(1);
                for d in dirs.iter_mut() {
                    *d = d.clockwise_by(turns);
                }
            }
        }

        *self = next;
    }

    // Resolves where a token heading `dir` at (col, row) lands in `next`.
    fn advance(&self, next: &mut Board, col: usize, row: usize, dir: Direction) {
        let bounce = || {
            let back = dir.reversed();
            (self.free_step(col, row, back), back)
        };

        let (dest, heading) = match self.neighbor(col, row, dir) {
            // edge or wall ahead: bounce back the way we came
            None => bounce(),
            Some(ahead) => match &self[ahead] {
                Cell::Wall | Cell::SoundWall => bounce(),
                Cell::RotateClockwise => {
                    let turned = dir.clockwise();
                    (self.free_step(col, row, turned), turned)
                }
                Cell::RotateCounterClockwise => {
                    let turned = dir.counter_clockwise();
                    (self.free_step(col, row, turned), turned)
                }
                _ => (ahead, dir),
            },
        };

        next[dest].absorb(heading);
    }

    // One step in `dir` if that cell exists and isn't a fixture, else stay put.
    fn free_step(&self, col: usize, row: usize, dir: Direction) -> (usize, usize) {
        self.neighbor(col, row, dir)
            .filter(|&p| !self[p].is_blocked())
            .unwrap_or((col, row))
    }
}
