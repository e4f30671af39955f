/// Single coordinate axis used for board height, width, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Row-major linear index of `coords` on a board `width` columns wide.
pub(crate) const fn linear_index((row, col): Coord2, width: Coord) -> usize {
    row as usize * width as usize + col as usize
}

/// Inverse of [`linear_index`].
pub(crate) const fn coords_of(index: usize, width: Coord) -> Coord2 {
    let width = width as usize;
    ((index / width) as Coord, (index % width) as Coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_index_round_trips() {
        assert_eq!(linear_index((2, 3), 5), 13);
        assert_eq!(coords_of(13, 5), (2, 3));
    }
}
