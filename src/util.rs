/// Height of the minimum-height tree `rebalance` builds over `len` values, i.e.
/// `⌈log2(len + 1)⌉`.
pub(crate) fn balanced_height(len: usize) -> usize {
    (usize::BITS - len.leading_zeros()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_height_matches_full_levels() {
        assert_eq!(balanced_height(0), 0);
        assert_eq!(balanced_height(1), 1);
        assert_eq!(balanced_height(2), 2);
        assert_eq!(balanced_height(3), 2);
        assert_eq!(balanced_height(4), 3);
        assert_eq!(balanced_height(7), 3);
        assert_eq!(balanced_height(8), 4);
    }
}
