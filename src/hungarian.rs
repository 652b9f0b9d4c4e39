use nalgebra::{DMatrix, RawStorageMut};

/// Solved pairing between cost-matrix rows and columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocations {
    row_to_col: Vec<Option<usize>>,
}

impl Allocations {
    /// `(row, col)` pairs of the assignment, ordered by row.
    pub fn assignment(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col
            .iter()
            .enumerate()
            .filter_map(|(row, col)| col.map(|col| (row, col)))
    }

    pub fn col_for(&self, row: usize) -> Option<usize> {
        self.row_to_col.get(row).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.row_to_col.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn reset(&mut self, rows: usize) {
        self.row_to_col.clear();
        self.row_to_col.resize(rows, None);
    }
}

/// Minimum-cost perfect assignment over a square cost matrix (Munkres).
///
/// `costs` is reduced in place and left in an unspecified state; clone it
/// first if the original values are still needed.
pub fn hungarian<T, D, S>(costs: &mut nalgebra::SquareMatrix<T, D, S>, assignments: &mut Allocations)
where
    T: std::ops::Sub<T, Output = T>
        + std::ops::Add<T, Output = T>
        + Copy
        + nalgebra::SimdValue<Element = T>
        + nalgebra::SimdPartialOrd
        + num_traits::bounds::Bounded
        + num_traits::Zero
        + std::ops::SubAssign
        + std::ops::AddAssign
        + std::fmt::Debug
        + std::ops::Neg<Output = T>
        + PartialEq
        + PartialOrd
        + 'static,
    D: nalgebra::Dim,
    S: nalgebra::RawStorage<T, D, D> + RawStorageMut<T, D, D>,
{
    let (n, _) = costs.shape();
    assignments.reset(n);
    if n == 0 {
        return;
    }

    let mut star_in_row: Vec<Option<usize>> = vec![None; n];
    let mut star_in_col: Vec<Option<usize>> = vec![None; n];
    let mut prime_in_row: Vec<Option<usize>> = vec![None; n];
    let mut covered_rows = vec![false; n];
    let mut covered_cols = vec![false; n];

    // subtract minimum value from each respective row
    costs.row_iter_mut().for_each(|mut r| {
        let min = r.min();
        r.add_scalar_mut(-min)
    });

    // subtract minimum value from each respective col
    costs.column_iter_mut().for_each(|mut c| {
        let min = c.min();
        c.add_scalar_mut(-min);
    });

    // star arbitrary zeroes on distinct rows and columns
    for col in 0..n {
        for row in 0..n {
            if star_in_row[row].is_none() && costs[(row, col)].is_zero() {
                star_in_row[row] = Some(col);
                star_in_col[col] = Some(row);
                covered_cols[col] = true;
                break;
            }
        }
    }

    loop {
        if covered_cols.iter().all(|&c| c) {
            break;
        }

        let mut uncovered_zero = None;
        'zero_finder: for col in 0..n {
            if covered_cols[col] {
                continue;
            }
            for row in 0..n {
                if !covered_rows[row] && costs[(row, col)].is_zero() {
                    uncovered_zero = Some((row, col));
                    break 'zero_finder;
                }
            }
        }

        let Some((row, col)) = uncovered_zero else {
            let mut min = <T as num_traits::Bounded>::max_value();
            for col in (0..n).filter(|&c| !covered_cols[c]) {
                for row in (0..n).filter(|&r| !covered_rows[r]) {
                    let curr = costs[(row, col)];
                    if curr < min {
                        min = curr;
                    }
                }
            }

            // subtract min from all uncovered rows
            costs.row_iter_mut().enumerate().for_each(|(i, mut r)| {
                if !covered_rows[i] {
                    r.add_scalar_mut(-min)
                }
            });

            // add min to all covered columns
            costs.column_iter_mut().enumerate().for_each(|(i, mut c)| {
                if covered_cols[i] {
                    c.add_scalar_mut(min);
                }
            });
            continue;
        };

        prime_in_row[row] = Some(col);
        if let Some(star_col) = star_in_row[row] {
            covered_rows[row] = true;
            covered_cols[star_col] = false;
            continue;
        }

        // alternating path: prime, star in its column, prime in that star's row, ...
        let mut path = vec![(row, col)];
        while let Some(star_row) = star_in_col[path[path.len() - 1].1] {
            let star_col = path[path.len() - 1].1;
            let prime_col = prime_in_row[star_row].expect("starred row on path is primed");
            path.push((star_row, star_col));
            path.push((star_row, prime_col));
        }

        for &(r, c) in path.iter().skip(1).step_by(2) {
            star_in_row[r] = None;
            star_in_col[c] = None;
        }
        for &(r, c) in path.iter().step_by(2) {
            star_in_row[r] = Some(c);
            star_in_col[c] = Some(r);
        }

        prime_in_row.fill(None);
        covered_rows.fill(false);
        covered_cols.fill(false);
        for (c, star) in star_in_col.iter().enumerate() {
            covered_cols[c] = star.is_some();
        }
    }

    assignments.row_to_col.copy_from_slice(&star_in_row);
}

/// Minimum-cost assignment over a rectangular matrix.
///
/// The matrix is padded to square with `pad_cost`; rows or columns matched
/// into padding come back unassigned.
pub fn solve_rectangular(costs: &DMatrix<f64>, pad_cost: f64) -> Allocations {
    let (rows, cols) = costs.shape();
    let size = rows.max(cols);
    let mut square = DMatrix::from_element(size, size, pad_cost);
    square.view_mut((0, 0), (rows, cols)).copy_from(costs);

    let mut padded = Allocations::default();
    hungarian(&mut square, &mut padded);

    let mut assignments = Allocations::default();
    assignments.reset(rows);
    for (row, col) in padded.assignment() {
        if row < rows && col < cols {
            assignments.row_to_col[row] = Some(col);
        }
    }
    assignments
}
