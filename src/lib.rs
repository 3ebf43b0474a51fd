#![cfg_attr(not(test), no_std)]

//! An implementation of the [STROBE protocol framework][spec], version 1.0.2.
//!
//! STROBE is a single duplex object over Keccak-f[1600] that subsumes
//! hashing, authenticated encryption, key derivation and transcript binding:
//! every output depends on every operation performed before it. This crate
//! provides the engine itself, at the 128 and 256 bit security levels.
//!
//! [spec]: https://strobe.sourceforge.io/specs

extern crate alloc;

#[cfg(feature = "serde")]
mod encoding;
mod keccak;
mod strobe;

pub use crate::strobe::{Error, Options, SecurityLevel, Strobe, MACLEN};
