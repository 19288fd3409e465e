//! Hashing primitives for marker values. Every marker hash is a wrapping
//! 32-bit value so that equal markers hash identically on every platform.

pub(crate) fn string_hash(value: &str) -> i32 {
    value.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

pub(crate) fn array_hash(items: impl IntoIterator<Item = i32>) -> i32 {
    items
        .into_iter()
        .fold(1i32, |hash, item| hash.wrapping_mul(31).wrapping_add(item))
}

pub(crate) fn bool_hash(value: bool) -> i32 {
    if value {
        1231
    } else {
        1237
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn long_hash(value: i64) -> i32 {
    (value ^ ((value as u64) >> 32) as i64) as i32
}

/// Bit pattern of a float, with every NaN collapsed to the canonical one.
pub(crate) fn float_bits(value: f32) -> u32 {
    if value.is_nan() {
        0x7fc0_0000
    } else {
        value.to_bits()
    }
}

/// Bit pattern of a double, with every NaN collapsed to the canonical one.
pub(crate) fn double_bits(value: f64) -> u64 {
    if value.is_nan() {
        0x7ff8_0000_0000_0000
    } else {
        value.to_bits()
    }
}

#[allow(clippy::cast_possible_wrap)]
pub(crate) fn float_hash(value: f32) -> i32 {
    float_bits(value) as i32
}

#[allow(clippy::cast_possible_wrap)]
pub(crate) fn double_hash(value: f64) -> i32 {
    long_hash(double_bits(value) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_hash_matches_reference_values() {
        assert_eq!(0, string_hash(""));
        assert_eq!(99_162_322, string_hash("hello"));
        assert_eq!(111_972_721, string_hash("value"));
    }

    #[test]
    fn long_hash_folds_high_bits() {
        assert_eq!(0, long_hash(0));
        assert_eq!(1, long_hash(1));
        assert_eq!(0, long_hash(-1));
        assert_eq!(1, long_hash(1 << 32));
    }

    #[test]
    fn nan_hashes_canonically() {
        let quiet = f32::NAN;
        let other = f32::from_bits(0x7fc0_0001);
        assert_eq!(float_hash(quiet), float_hash(other));
        assert_eq!(double_hash(f64::NAN), double_hash(-f64::NAN));
    }

    #[test]
    fn empty_array_hashes_to_one() {
        assert_eq!(1, array_hash(std::iter::empty()));
        assert_eq!(31 + 5, array_hash([5]));
    }
}
