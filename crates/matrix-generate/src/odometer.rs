/// Mixed-radix counter over dimension positions.
///
/// Digit 0 changes fastest; a digit that runs past its radix resets to zero
/// and carries into the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Odometer {
    radices: Vec<usize>,
    positions: Vec<usize>,
}

impl Odometer {
    pub fn new(radices: Vec<usize>) -> Self {
        let positions = vec![0; radices.len()];
        Self { radices, positions }
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn radices(&self) -> &[usize] {
        &self.radices
    }

    /// Number of distinct position vectors, or `None` on overflow.
    pub fn total(&self) -> Option<usize> {
        total_combinations(&self.radices)
    }

    /// Step to the next combination.
    ///
    /// Returns `false` when every digit wrapped back to zero.
    pub fn advance(&mut self) -> bool {
        for (position, radix) in self.positions.iter_mut().zip(&self.radices) {
            if *position + 1 < *radix {
                *position += 1;
                return true;
            }
            *position = 0;
        }
        false
    }

    /// Jump to the combination at `ordinal` in enumeration order.
    pub fn seek(&mut self, ordinal: usize) {
        let mut rest = ordinal;
        for (position, radix) in self.positions.iter_mut().zip(&self.radices) {
            if *radix == 0 {
                *position = 0;
                continue;
            }
            *position = rest % radix;
            rest /= radix;
        }
    }
}

/// Product of the radices; zero when any radix is zero.
pub fn total_combinations(radices: &[usize]) -> Option<usize> {
    if radices.contains(&0) {
        return Some(0);
    }
    radices
        .iter()
        .try_fold(1_usize, |total, radix| total.checked_mul(*radix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(radices: Vec<usize>) -> Vec<Vec<usize>> {
        let mut odometer = Odometer::new(radices);
        let total = odometer.total().unwrap_or(0);
        let mut seen = Vec::with_capacity(total);
        for _ in 0..total {
            seen.push(odometer.positions().to_vec());
            odometer.advance();
        }
        seen
    }

    #[test]
    fn first_digit_changes_fastest() {
        assert_eq!(
            walk(vec![2, 3]),
            vec![
                vec![0, 0],
                vec![1, 0],
                vec![0, 1],
                vec![1, 1],
                vec![0, 2],
                vec![1, 2],
            ]
        );
    }

    #[test]
    fn carry_ripples_through_several_digits() {
        let seen = walk(vec![2, 2, 2]);
        assert_eq!(seen[3], vec![1, 1, 0]);
        assert_eq!(seen[4], vec![0, 0, 1]);
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn advance_reports_full_wrap() {
        let mut odometer = Odometer::new(vec![1, 2]);
        assert!(odometer.advance());
        assert_eq!(odometer.positions(), &[0, 1]);
        assert!(!odometer.advance());
        assert_eq!(odometer.positions(), &[0, 0]);
    }

    #[test]
    fn seek_matches_sequential_walk() {
        let radices = vec![3, 1, 4, 2];
        let seen = walk(radices.clone());
        let mut odometer = Odometer::new(radices);
        for (ordinal, expected) in seen.iter().enumerate() {
            odometer.seek(ordinal);
            assert_eq!(odometer.positions(), expected.as_slice(), "ordinal {ordinal}");
        }
    }

    #[test]
    fn zero_radix_means_no_combinations() {
        assert_eq!(total_combinations(&[3, 0, 5]), Some(0));
        assert_eq!(total_combinations(&[usize::MAX, 2, 0]), Some(0));
    }

    #[test]
    fn overflowing_product_is_reported() {
        assert_eq!(total_combinations(&[usize::MAX, 2]), None);
        assert_eq!(total_combinations(&[4, 5]), Some(20));
    }
}
