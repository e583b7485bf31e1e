use crate::constants::SEQ_NR_MODULUS;

/// Signed circular distance from "old" forward to "new" in the modular
/// sequence space, normalized into (-2^30, 2^30].
pub fn seq_nr_offset(new: u32, old: u32) -> i32 {
    const HALF: i64 = (SEQ_NR_MODULUS / 2) as i64;

    let diff = (new.wrapping_sub(old) & (SEQ_NR_MODULUS - 1)) as i64;
    if diff <= HALF {
        diff as i32
    } else {
        (diff - SEQ_NR_MODULUS as i64) as i32
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::SEQ_NR_MODULUS;

    const MAX: u32 = SEQ_NR_MODULUS - 1;
    const HALF: u32 = SEQ_NR_MODULUS / 2;

    #[test]
    fn test_seq_nr_offset() {
        use super::seq_nr_offset;

        // no wraps
        assert_eq!(seq_nr_offset(2, 1), 1);
        assert_eq!(seq_nr_offset(1, 1), 0);
        assert_eq!(seq_nr_offset(0, 1), -1);

        // new wrapped
        assert_eq!(seq_nr_offset(0, MAX), 1);
        assert_eq!(seq_nr_offset(1023, MAX), 1024);

        // old wrapped
        assert_eq!(seq_nr_offset(MAX, 0), -1);
        assert_eq!(seq_nr_offset(MAX, 1023), -1024);

        // the half-space point belongs to the positive side
        assert_eq!(seq_nr_offset(HALF, 0), HALF as i32);
        assert_eq!(seq_nr_offset(HALF + 1, 0), -((HALF - 1) as i32));
        assert_eq!(seq_nr_offset(0, HALF), HALF as i32);

        // inputs above the modulus are reduced into it
        assert_eq!(seq_nr_offset(SEQ_NR_MODULUS + 5, 5), 0);
        assert_eq!(seq_nr_offset(u32::MAX, MAX), 0);
    }
}
