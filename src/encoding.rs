//! Serde snapshots of an engine.
//!
//! A snapshot carries exactly the fields needed to rebuild an engine
//! byte-identical to the original: the 200-byte duplex state, the block
//! positions, the rate, the continuation flags, the bootstrap marker and the
//! role. The lane view is derived from the state and is never part of the
//! format.

use alloc::vec::Vec;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::keccak::{AlignedKeccakState, STATE_SIZE_U8};
use crate::strobe::{Role, Strobe};

/// Wire form of an engine. The role is encoded as 0 (undecided),
/// 1 (initiator) or 2 (responder).
#[derive(Serialize, Deserialize)]
struct Snapshot {
    cur_flags: u8,
    initialized: bool,
    i0: u8,
    pos: usize,
    pos_begin: usize,
    r: usize,
    st: Vec<u8>,
}

impl Serialize for Strobe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Snapshot {
            cur_flags: self.cur_flags,
            initialized: self.initialized,
            i0: self.i0 as u8,
            pos: self.pos,
            pos_begin: self.pos_begin,
            r: self.r,
            st: self.state.to_vec(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Strobe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let snap = Snapshot::deserialize(deserializer)?;

        if snap.st.len() != STATE_SIZE_U8 {
            return Err(D::Error::custom("state must be exactly 200 bytes"));
        }
        let i0 = Role::from_wire(snap.i0).ok_or_else(|| D::Error::custom("unknown role"))?;
        if snap.r + 2 > STATE_SIZE_U8 || snap.pos >= snap.r || snap.pos_begin > snap.r {
            return Err(D::Error::custom("positions out of range for the rate"));
        }

        let mut state = AlignedKeccakState([0u8; STATE_SIZE_U8]);
        state.copy_from_slice(&snap.st);

        Ok(Strobe {
            state,
            pos: snap.pos,
            pos_begin: snap.pos_begin,
            r: snap.r,
            cur_flags: snap.cur_flags,
            initialized: snap.initialized,
            i0,
        })
    }
}
