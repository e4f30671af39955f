use super::*;

/// Scatters mines with a per-cell probability of `mines / total_cells`, walking
/// the board in row-major order and repeating over the remaining safe cells
/// until the requested count is reached.
///
/// When a start cell is given and ends up holding a mine, that mine is moved
/// to a random safe cell, so the first reveal never loses.
#[derive(Clone, Debug, PartialEq)]
pub struct ScatterGenerator {
    seed: u64,
    safe_start: Option<Coord2>,
}

impl ScatterGenerator {
    pub fn new(seed: u64, safe_start: Option<Coord2>) -> Self {
        Self { seed, safe_start }
    }
}

impl MinefieldGenerator for ScatterGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;

        let total_cells = config.total_cells();
        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mines_placed: CellCount = 0;
        let mut pass = 0u32;

        while mines_placed < config.mines {
            pass += 1;
            for is_mine in mines.iter_mut().filter(|is_mine| !**is_mine) {
                if rng.random_range(0..total_cells) < config.mines {
                    *is_mine = true;
                    mines_placed += 1;
                    if mines_placed == config.mines {
                        break;
                    }
                }
            }
        }
        if pass > 2 {
            log::debug!("Scatter needed {} passes to place {} mines", pass, config.mines);
        }

        if let Some(start) = self.safe_start {
            if config.validate_coords(start).is_err() {
                log::warn!("Start cell {:?} is outside the board, ignored", start);
            } else if mines[start.to_nd_index()] {
                let width = config.width();
                let start_index = linear_index(start, width);
                loop {
                    let candidate = usize::from(rng.random_range(0..total_cells));
                    if candidate == start_index {
                        continue;
                    }
                    let candidate = coords_of(candidate, width);
                    if !mines[candidate.to_nd_index()] {
                        mines[candidate.to_nd_index()] = true;
                        break;
                    }
                }
                mines[start.to_nd_index()] = false;
                log::trace!("Moved mine away from start cell {:?}", start);
            }
        }

        let layout = MineLayout::from_mine_mask(mines);
        if layout.mine_count() != config.mines {
            log::warn!(
                "Generated minefield count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines
            );
        }
        layout
    }
}
