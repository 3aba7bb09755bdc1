use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// Maximum number of 64-bit words a `Bignum` can hold (256 bits).
pub const MAX_WORDS: usize = 4;

/// Bits per word.
pub const WORD_BITS: usize = 64;

/// A fixed-capacity unsigned bit vector.
///
/// The width is `word_count() * 64` bits and is chosen at construction. Storage is
/// always `MAX_WORDS` words on the stack; words past `word_count()` stay zero so that
/// derived equality and hashing only see the live words.
///
/// Bit `k` lives in word `k / 64` at position `k % 64`; word 0 is least significant.
/// Binary operations require both operands to have the same word count and panic
/// otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bignum {
    words: [u64; MAX_WORDS],
    len: usize,
}

impl Bignum {
    /// All bits zero. A word count of 0 falls back to `MAX_WORDS`.
    #[inline]
    pub fn zero(word_count: usize) -> Self {
        let len = if word_count == 0 { MAX_WORDS } else { word_count };
        assert!(
            len <= MAX_WORDS,
            "Bignum supports at most {} words, got {}",
            MAX_WORDS,
            len
        );
        Bignum {
            words: [0; MAX_WORDS],
            len,
        }
    }

    /// The value 1 (bit 0 set).
    #[inline]
    pub fn one(word_count: usize) -> Self {
        let mut bn = Self::zero(word_count);
        bn.words[0] = 1;
        bn
    }

    /// Single bit set at `index`.
    #[inline]
    pub fn single(word_count: usize, index: usize) -> Self {
        let mut bn = Self::zero(word_count);
        bn.set(index);
        bn
    }

    /// Construct from raw words, least significant first.
    pub fn from_words(words: &[u64]) -> Self {
        let mut bn = Self::zero(words.len());
        bn.words[..words.len()].copy_from_slice(words);
        bn
    }

    #[inline]
    pub fn word_count(&self) -> usize {
        self.len
    }

    /// Width in bits.
    #[inline]
    pub fn bit_width(&self) -> usize {
        self.len * WORD_BITS
    }

    /// The live words, least significant first.
    #[inline]
    pub fn words(&self) -> &[u64] {
        &self.words[..self.len]
    }

    #[inline]
    fn check_width(&self, other: &Bignum) {
        assert_eq!(
            self.len, other.len,
            "Bignum width mismatch: {} words vs {} words",
            self.len, other.len
        );
    }

    /// Test whether bit `index` is set.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.bit_width(), "bit index {} out of range", index);
        (self.words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 != 0
    }

    /// Set bit `index` to 1.
    #[inline]
    pub fn set(&mut self, index: usize) {
        assert!(index < self.bit_width(), "bit index {} out of range", index);
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Clear bit `index` to 0.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        assert!(index < self.bit_width(), "bit index {} out of range", index);
        self.words[index / WORD_BITS] &= !(1u64 << (index % WORD_BITS));
    }

    /// True if no bits are set.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.words().iter().all(|&w| w == 0)
    }

    /// Population count.
    #[inline]
    pub fn count(&self) -> u32 {
        self.words().iter().map(|w| w.count_ones()).sum()
    }

    /// Index of the lowest set bit, or `None` if zero.
    #[inline]
    pub fn lowest_bit_index(&self) -> Option<usize> {
        self.words()
            .iter()
            .enumerate()
            .find(|&(_, &w)| w != 0)
            .map(|(i, &w)| i * WORD_BITS + w.trailing_zeros() as usize)
    }

    /// `self &= rhs`
    #[inline]
    pub fn and(&mut self, rhs: &Bignum) -> &mut Self {
        self.check_width(rhs);
        for (a, b) in self.words.iter_mut().zip(rhs.words.iter()) {
            *a &= *b;
        }
        self
    }

    /// `self |= rhs`
    #[inline]
    pub fn or(&mut self, rhs: &Bignum) -> &mut Self {
        self.check_width(rhs);
        for (a, b) in self.words.iter_mut().zip(rhs.words.iter()) {
            *a |= *b;
        }
        self
    }

    /// `self ^= rhs`
    #[inline]
    pub fn xor(&mut self, rhs: &Bignum) -> &mut Self {
        self.check_width(rhs);
        for (a, b) in self.words.iter_mut().zip(rhs.words.iter()) {
            *a ^= *b;
        }
        self
    }

    /// Flip every bit within the width.
    #[inline]
    pub fn invert(&mut self) -> &mut Self {
        let len = self.len;
        for w in &mut self.words[..len] {
            *w = !*w;
        }
        self
    }

    /// Subtract one with a borrow chain across words. Zero wraps to all ones.
    #[inline]
    pub fn decrement(&mut self) -> &mut Self {
        let len = self.len;
        for w in &mut self.words[..len] {
            let (value, borrow) = w.overflowing_sub(1);
            *w = value;
            if !borrow {
                break;
            }
        }
        self
    }

    /// Shift in place. Positive `delta` shifts left (toward higher indices), negative
    /// shifts right. Bits pushed past either end are dropped.
    #[inline]
    pub fn shift(&mut self, delta: isize) -> &mut Self {
        *self = self.shifted(delta);
        self
    }

    /// Shifted copy; see [`Bignum::shift`].
    #[inline]
    pub fn shifted(&self, delta: isize) -> Self {
        match delta.cmp(&0) {
            Ordering::Greater => self.shift_left(delta.unsigned_abs()),
            Ordering::Less => self.shift_right(delta.unsigned_abs()),
            Ordering::Equal => *self,
        }
    }

    /// Shift all bits left by `n` positions.
    pub fn shift_left(&self, n: usize) -> Self {
        if n == 0 {
            return *self;
        }
        let len = self.len;
        if n >= len * WORD_BITS {
            return Self::zero(len);
        }
        let word_shift = n / WORD_BITS;
        let bit_shift = n % WORD_BITS;
        let mut out = Self::zero(len);

        for i in word_shift..len {
            out.words[i] = self.words[i - word_shift] << bit_shift;
            if bit_shift != 0 && i > word_shift {
                out.words[i] |= self.words[i - word_shift - 1] >> (WORD_BITS - bit_shift);
            }
        }
        out
    }

    /// Shift all bits right by `n` positions.
    pub fn shift_right(&self, n: usize) -> Self {
        if n == 0 {
            return *self;
        }
        let len = self.len;
        if n >= len * WORD_BITS {
            return Self::zero(len);
        }
        let word_shift = n / WORD_BITS;
        let bit_shift = n % WORD_BITS;
        let mut out = Self::zero(len);

        for i in 0..len - word_shift {
            out.words[i] = self.words[i + word_shift] >> bit_shift;
            if bit_shift != 0 && i + word_shift + 1 < len {
                out.words[i] |= self.words[i + word_shift + 1] << (WORD_BITS - bit_shift);
            }
        }
        out
    }

    /// The lowest set bit alone, computed as `v ^ (v & (v - 1))`.
    #[inline]
    pub fn lowest_bit(&self) -> Self {
        let mut below = *self;
        below.decrement();
        below.and(self);
        let mut bit = *self;
        bit.xor(&below);
        bit
    }

    /// Iterate over the single-bit values composing this vector, lowest first.
    #[inline]
    pub fn set_bits(&self) -> SetBits {
        SetBits { rest: *self }
    }

    /// The single-bit values composing this vector, lowest first.
    pub fn extract_set_bits(&self) -> Vec<Bignum> {
        self.set_bits().collect()
    }

    /// Iterate over indices of set bits.
    #[inline]
    pub fn iter_ones(&self) -> BitIterator {
        BitIterator {
            words: self.words,
            len: self.len,
            word_index: 0,
        }
    }

    /// `Some(self)` unless zero.
    #[inline]
    pub fn non_zero(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self)
        }
    }
}

impl BitAnd for Bignum {
    type Output = Bignum;
    #[inline]
    fn bitand(mut self, rhs: Bignum) -> Bignum {
        self.and(&rhs);
        self
    }
}

impl BitAndAssign for Bignum {
    #[inline]
    fn bitand_assign(&mut self, rhs: Bignum) {
        self.and(&rhs);
    }
}

impl BitOr for Bignum {
    type Output = Bignum;
    #[inline]
    fn bitor(mut self, rhs: Bignum) -> Bignum {
        self.or(&rhs);
        self
    }
}

impl BitOrAssign for Bignum {
    #[inline]
    fn bitor_assign(&mut self, rhs: Bignum) {
        self.or(&rhs);
    }
}

impl BitXor for Bignum {
    type Output = Bignum;
    #[inline]
    fn bitxor(mut self, rhs: Bignum) -> Bignum {
        self.xor(&rhs);
        self
    }
}

impl BitXorAssign for Bignum {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Bignum) {
        self.xor(&rhs);
    }
}

impl Not for Bignum {
    type Output = Bignum;
    #[inline]
    fn not(mut self) -> Bignum {
        self.invert();
        self
    }
}

impl PartialOrd for Bignum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Unsigned numeric order, most significant word first.
impl Ord for Bignum {
    fn cmp(&self, other: &Self) -> Ordering {
        self.check_width(other);
        self.words()
            .iter()
            .rev()
            .cmp(other.words().iter().rev())
    }
}

impl fmt::Binary for Bignum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for w in self.words().iter().rev() {
            write!(f, "{:064b}", w)?;
        }
        Ok(())
    }
}

/// Iterator over the single-bit components of a `Bignum`.
#[derive(Clone, Debug)]
pub struct SetBits {
    rest: Bignum,
}

impl Iterator for SetBits {
    type Item = Bignum;
    #[inline]
    fn next(&mut self) -> Option<Bignum> {
        if self.rest.is_zero() {
            return None;
        }
        let bit = self.rest.lowest_bit();
        self.rest.xor(&bit);
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.count() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for SetBits {}

/// Iterator over set-bit indices in a `Bignum`.
pub struct BitIterator {
    words: [u64; MAX_WORDS],
    len: usize,
    word_index: usize,
}

impl Iterator for BitIterator {
    type Item = usize;
    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.word_index < self.len {
            let w = self.words[self.word_index];
            if w != 0 {
                let bit = w.trailing_zeros() as usize;
                // Clear lowest set bit
                self.words[self.word_index] = w & (w - 1);
                return Some(self.word_index * WORD_BITS + bit);
            }
            self.word_index += 1;
        }
        None
    }
}
