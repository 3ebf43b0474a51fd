use core::ops::{Deref, DerefMut};

use zeroize::Zeroize;

/// The number of words in the permutation state.
pub const STATE_SIZE_U64: usize = 25;
/// The number of bytes in the permutation state.
pub const STATE_SIZE_U8: usize = STATE_SIZE_U64 * 8;

/// A buffer of bytes which is aligned, so that we can apply Keccak-f[1600] to it.
///
/// The duplex layer wants to operate on individual bytes, whereas the keccak
/// permutation wants to operate on 64 bit words. To reconcile the two, we keep
/// a buffer of bytes which is correctly aligned, so that it can be easily
/// transmuted into a buffer of words around each permutation call.
#[derive(Clone, Zeroize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
#[repr(align(8))]
pub struct AlignedKeccakState(pub [u8; STATE_SIZE_U8]);

impl AlignedKeccakState {
    /// Apply Keccak-f[1600] to this state.
    pub fn permute(&mut self) {
        // SAFETY: because we've declared this struct to have an alignment of 8,
        // this transmutation will work
        let lanes = unsafe { &mut *(self as *mut Self as *mut [u64; STATE_SIZE_U64]) };
        // In placing bytes into the state, we've always assumed that the u64s
        // are in little endian order. To correct for this on big endian
        // architectures, we need to do the following:
        for lane in lanes.iter_mut() {
            *lane = u64::from_le(*lane);
        }
        keccak::f1600(lanes);
        // We also need to place the words back in little endian order.
        for lane in lanes.iter_mut() {
            *lane = u64::to_le(*lane);
        }
    }
}

impl Deref for AlignedKeccakState {
    type Target = [u8; STATE_SIZE_U8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for AlignedKeccakState {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
