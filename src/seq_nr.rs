use std::{cmp::Ordering, ops::Deref};

use crate::{constants::SEQ_NR_MODULUS, utils::seq_nr_offset};

/// A sequence number in UDT's 31-bit modular space. Values are reduced
/// modulo [`SEQ_NR_MODULUS`] on construction and arithmetic, and compare
/// by signed circular distance.
#[derive(PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct SeqNr(u32);

impl SeqNr {
    pub fn new(value: u32) -> Self {
        Self(value & (SEQ_NR_MODULUS - 1))
    }
}

impl Deref for SeqNr {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u32> for SeqNr {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for SeqNr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Debug for SeqNr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::ops::Add<u32> for SeqNr {
    type Output = SeqNr;

    fn add(self, rhs: u32) -> Self::Output {
        Self::new(self.0.wrapping_add(rhs))
    }
}

impl std::ops::Sub<u32> for SeqNr {
    type Output = SeqNr;

    fn sub(self, rhs: u32) -> Self::Output {
        Self::new(self.0.wrapping_sub(rhs))
    }
}

impl std::ops::Sub<SeqNr> for SeqNr {
    type Output = i32;

    fn sub(self, rhs: SeqNr) -> Self::Output {
        seq_nr_offset(self.0, rhs.0)
    }
}

impl std::ops::AddAssign<u32> for SeqNr {
    fn add_assign(&mut self, rhs: u32) {
        *self = *self + rhs;
    }
}

impl std::ops::SubAssign<u32> for SeqNr {
    fn sub_assign(&mut self, rhs: u32) {
        *self = *self - rhs;
    }
}

impl std::cmp::PartialOrd for SeqNr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for SeqNr {
    fn cmp(&self, other: &Self) -> Ordering {
        let offset = *self - *other;
        offset.cmp(&0)
    }
}

#[cfg(test)]
mod tests {
    use super::SeqNr;
    use crate::constants::SEQ_NR_MODULUS;

    const MAX: u32 = SEQ_NR_MODULUS - 1;

    #[test]
    fn test_construction_reduces_modulo() {
        assert_eq!(*SeqNr::new(SEQ_NR_MODULUS), 0);
        assert_eq!(*SeqNr::from(u32::MAX), MAX);
        assert_eq!(SeqNr::new(5), SeqNr::new(SEQ_NR_MODULUS + 5));
    }

    #[test]
    fn test_arithmetic_wraps() {
        assert_eq!(SeqNr::new(MAX) + 1, SeqNr::new(0));
        assert_eq!(SeqNr::new(MAX) + 2, SeqNr::new(1));
        assert_eq!(SeqNr::new(0) - 1, SeqNr::new(MAX));

        let mut s = SeqNr::new(MAX);
        s += 3;
        assert_eq!(*s, 2);
        s -= 3;
        assert_eq!(*s, MAX);
    }

    #[test]
    fn test_difference_is_circular() {
        assert_eq!(SeqNr::new(10) - SeqNr::new(4), 6);
        assert_eq!(SeqNr::new(4) - SeqNr::new(10), -6);
        assert_eq!(SeqNr::new(0) - SeqNr::new(MAX), 1);
        assert_eq!(SeqNr::new(MAX) - SeqNr::new(0), -1);
    }

    #[test]
    fn test_ordering_across_wrap() {
        assert!(SeqNr::new(MAX) < SeqNr::new(0));
        assert!(SeqNr::new(0) > SeqNr::new(MAX));
        assert!(SeqNr::new(1) > SeqNr::new(0));
        assert!(SeqNr::new(MAX - 1) < SeqNr::new(MAX));
    }
}
