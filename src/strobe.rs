// See: https://strobe.sourceforge.io/specs for the specification for STROBE.
use alloc::vec;
use alloc::vec::Vec;

use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::keccak::{AlignedKeccakState, STATE_SIZE_U8};

// 5.1: the version string mixed into every engine during the bootstrap.
const MAGIC_ASCII: &[u8] = b"STROBEv1.0.2";

/// The number of bytes in the tag appended by [`Strobe::send_aead`].
pub const MACLEN: usize = 16;

// 6.2: Operations and flags.
type Flags = u8;

// Inbound flag. This is set when receiving data.
const FLAG_I: Flags = 0b00000001;
// Application flag. If set, data is moving to or from the application.
const FLAG_A: Flags = 0b00000010;
// Cipher flag. If set, the output depends on the cipher state. Without I and
// T it marks a rekey or ratchet instead.
const FLAG_C: Flags = 0b00000100;
// Transport flag. If set, the operation sends or receives data on the transport.
const FLAG_T: Flags = 0b00001000;
// Meta flag. If set, indicates that the operation is handling metadata.
const FLAG_M: Flags = 0b00010000;
// Keytree flag. Reserved for a side-channel countermeasure we don't implement.
const FLAG_K: Flags = 0b00100000;
// Bits 6 and 7 are reserved for future versions of the framework.
const FLAG_RESERVED: Flags = 0b11000000;

/// The security level of an engine, in bits.
///
/// The level fixes the sponge rate: an engine absorbs and squeezes 166 bytes
/// per permutation at 128 bits, 134 bytes at 256 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityLevel {
    B128,
    B256,
}

impl SecurityLevel {
    /// This level, as a number of bits.
    pub fn bits(self) -> usize {
        match self {
            SecurityLevel::B128 => 128,
            SecurityLevel::B256 => 256,
        }
    }
}

impl TryFrom<usize> for SecurityLevel {
    type Error = Error;

    fn try_from(bits: usize) -> Result<Self, Error> {
        match bits {
            128 => Ok(SecurityLevel::B128),
            256 => Ok(SecurityLevel::B256),
            _ => Err(Error::InvalidSecurityLevel),
        }
    }
}

/// The role a party plays in the protocol.
///
/// Both parties start out undecided and commit on their first transport
/// operation: whoever sends first is the initiator, whoever receives first is
/// the responder. The role decides how transport operations are framed, so
/// that both sides hash a transcript written from the initiator's viewpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
#[repr(u8)]
pub(crate) enum Role {
    Undecided = 0,
    Initiator = 1,
    Responder = 2,
}

impl Role {
    /// The role taken on by a party whose first transport operation carries
    /// the given flags.
    fn of_first_op(flags: Flags) -> Role {
        if flags & FLAG_I == 0 {
            Role::Initiator
        } else {
            Role::Responder
        }
    }

    #[cfg(feature = "serde")]
    pub(crate) fn from_wire(x: u8) -> Option<Role> {
        match x {
            0 => Some(Role::Undecided),
            1 => Some(Role::Initiator),
            2 => Some(Role::Responder),
            _ => None,
        }
    }
}

/// The errors an engine can hand back to its caller.
///
/// API misuse, like continuing an operation with different flags, is a bug in
/// the calling code and panics instead of returning one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A security level other than 128 or 256 bits was requested.
    InvalidSecurityLevel,
    /// The tag handed to [`Strobe::recv_mac`] did not match the transcript.
    AuthenticationFailed,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidSecurityLevel => write!(f, "only 128 or 256 bit security is supported"),
            Error::AuthenticationFailed => write!(f, "authentication failed"),
        }
    }
}

/// Per-call options shared by most operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Treat the data as protocol metadata: framing, message types, lengths,
    /// transcript comments. Metadata is hashed like anything else, it is just
    /// labelled differently in the transcript.
    pub meta: bool,
    /// Continue the previous operation instead of beginning a new one. The
    /// operation being continued must have carried the same flags, including
    /// the meta bit.
    pub streaming: bool,
}

impl Options {
    /// Metadata, no continuation.
    pub const META: Options = Options {
        meta: true,
        streaming: false,
    };
    /// A continuation of the previous operation.
    pub const STREAMING: Options = Options {
        meta: false,
        streaming: true,
    };

    fn flags(self, base: Flags) -> Flags {
        if self.meta {
            base | FLAG_M
        } else {
            base
        }
    }
}

/// A STROBE v1.0.2 engine.
///
/// One engine subsumes hashing, authenticated encryption, key derivation and
/// transcript binding: every output depends cryptographically on all the
/// operations that came before it, and on the framing metadata describing
/// them. An engine is not safe for concurrent use; [`Clone`] produces a fully
/// independent copy for diverging histories.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Strobe {
    /// The duplex state.
    pub(crate) state: AlignedKeccakState,
    /// Offset in the current block where the next byte is processed.
    pub(crate) pos: usize,
    /// One past the offset where the current operation began, or 0 if no
    /// operation began in this block.
    pub(crate) pos_begin: usize,
    /// Rate of the sponge in bytes; two larger while bootstrapping.
    pub(crate) r: usize,
    /// Flags of the operation in progress, held to validate continuations.
    pub(crate) cur_flags: Flags,
    /// Block-end padding stays off until the bootstrap is done.
    pub(crate) initialized: bool,
    /// This party's role, fixed by the first transport operation.
    pub(crate) i0: Role,
}

impl core::fmt::Debug for Strobe {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Ensure that the sponge state can't end up in logs.
        write!(f, "Strobe: STATE OMITTED")
    }
}

impl Strobe {
    /// Makes a new engine, customized with a protocol string.
    ///
    /// The protocol string serves for domain separation: engines created with
    /// different protocol strings produce unrelated outputs no matter what
    /// data they go on to process.
    pub fn new(protocol: &[u8], level: SecurityLevel) -> Strobe {
        let mut out = Strobe {
            state: AlignedKeccakState([0u8; STATE_SIZE_U8]),
            pos: 0,
            pos_begin: 0,
            r: STATE_SIZE_U8 - level.bits() / 4,
            cur_flags: 0,
            initialized: false,
            i0: Role::Undecided,
        };

        // 5.1:
        // st = F([0x01, R+2, 0x01, 0x00, 0x01, 0x60] + ascii("STROBEvX.Y.Z"))
        // running at the cSHAKE rate, with block-end padding suppressed.
        let mut domain = [0u8; 6 + MAGIC_ASCII.len()];
        domain[0] = 0x01;
        domain[1] = out.r as u8;
        domain[2..6].copy_from_slice(&[0x01, 0x00, 0x01, 0x60]);
        domain[6..].copy_from_slice(MAGIC_ASCII);
        out.duplex(&mut domain, false, false, true);

        // cSHAKE separation is done: drop to the STROBE rate, turn on padding.
        out.r -= 2;
        out.initialized = true;

        out.ad(protocol, Options::META);

        out
    }

    /// Absorbs data both parties already know, without transmitting it.
    ///
    /// All future outputs depend on the absorbed data. Every protocol should
    /// begin with an `ad` of a domain separation string; [`Strobe::new`] does
    /// one with the protocol string.
    pub fn ad(&mut self, data: &[u8], opts: Options) {
        self.operate(opts.flags(FLAG_A), data, opts.streaming);
    }

    /// Sets a symmetric key.
    ///
    /// If a key was already set, the two are cryptographically combined.
    /// Unlike `ad`, the key overwrites state bytes instead of xoring into
    /// them, which ratchets the engine forward.
    pub fn key(&mut self, key: &[u8], more: bool) {
        self.operate(FLAG_A | FLAG_C, key, more);
    }

    /// Fills `dst` with pseudorandom output bound to the whole transcript.
    ///
    /// A continuation (`more = true`) picks up where the previous `prf`
    /// stopped: extracting n and then m bytes yields the same output as a
    /// single extraction of n + m.
    pub fn prf(&mut self, dst: &mut [u8], more: bool) {
        self.output(FLAG_I | FLAG_A | FLAG_C, more, dst);
    }

    /// Sends a message in clear text.
    ///
    /// The engine does not transmit anything itself; it absorbs the message
    /// so that later outputs are bound to it, and the caller puts the bytes
    /// on the wire.
    pub fn send_clr(&mut self, data: &[u8], opts: Options) {
        self.operate(opts.flags(FLAG_A | FLAG_T), data, opts.streaming);
    }

    /// Receives a message in clear text.
    ///
    /// This does not verify integrity on its own; pair it with
    /// [`Strobe::recv_mac`] when the peer follows with a tag.
    pub fn recv_clr(&mut self, data: &[u8], opts: Options) {
        self.operate(opts.flags(FLAG_I | FLAG_A | FLAG_T), data, opts.streaming);
    }

    /// Encrypts `data` in place.
    pub fn send_enc(&mut self, data: &mut [u8], opts: Options) {
        self.operate_mut(opts.flags(FLAG_A | FLAG_C | FLAG_T), data, opts.streaming);
    }

    /// Decrypts `data` in place.
    pub fn recv_enc(&mut self, data: &mut [u8], opts: Options) {
        self.operate_mut(opts.flags(FLAG_I | FLAG_A | FLAG_C | FLAG_T), data, opts.streaming);
    }

    /// Fills `dst` with an authentication tag over the whole transcript.
    /// The initial contents of `dst` are ignored.
    pub fn send_mac(&mut self, dst: &mut [u8], opts: Options) {
        self.output(opts.flags(FLAG_C | FLAG_T), opts.streaming, dst);
    }

    /// Checks an authentication tag, consuming `mac` in place.
    ///
    /// On failure the protocol is compromised: the engine must be discarded,
    /// and there is no sanctioned way to continue with it.
    pub fn recv_mac(&mut self, mac: &mut [u8], meta: bool) -> Result<(), Error> {
        let mut flags = FLAG_I | FLAG_C | FLAG_T;
        if meta {
            flags |= FLAG_M;
        }
        self.operate_mut(flags, mac, false);

        // A valid tag leaves only zeros behind after the unmask step. The
        // check accumulates in constant time.
        let mut all_zero = Choice::from(1u8);
        for b in mac.iter() {
            all_zero &= b.ct_eq(&0);
        }

        if bool::from(all_zero) {
            Ok(())
        } else {
            Err(Error::AuthenticationFailed)
        }
    }

    /// Irreversibly ratchets the engine forward by zeroing `len` bytes of
    /// state, so that earlier outputs cannot be recovered from a later
    /// compromise. Nothing is emitted.
    pub fn ratchet(&mut self, len: usize, meta: bool) {
        let mut flags = FLAG_C;
        if meta {
            flags |= FLAG_M;
        }
        let mut zeros = vec![0u8; len];
        self.output(flags, false, &mut zeros);
    }

    /// Encrypts `plaintext` and binds `ad`, returning the ciphertext with a
    /// [`MACLEN`]-byte tag appended.
    pub fn send_aead(&mut self, plaintext: &[u8], ad: &[u8]) -> Vec<u8> {
        let mut ciphertext = plaintext.to_vec();
        self.send_enc(&mut ciphertext, Options::default());
        self.ad(ad, Options::default());
        let mut mac = [0u8; MACLEN];
        self.send_mac(&mut mac, Options::default());
        ciphertext.extend_from_slice(&mac);
        ciphertext
    }

    /// Decrypts the output of [`Strobe::send_aead`], verifying the trailing
    /// tag against `ad` and everything that came before.
    pub fn recv_aead(&mut self, ciphertext: &[u8], ad: &[u8]) -> Result<Vec<u8>, Error> {
        if ciphertext.len() < MACLEN {
            return Err(Error::AuthenticationFailed);
        }
        let mut plaintext = ciphertext.to_vec();
        let mut mac = plaintext.split_off(plaintext.len() - MACLEN);
        self.recv_enc(&mut plaintext, Options::default());
        self.ad(ad, Options::default());
        self.recv_mac(&mut mac, false)?;
        Ok(plaintext)
    }
}

impl Strobe {
    /// 7.1: running F. Pads the block once the bootstrap is over, permutes,
    /// and rewinds to the start of a fresh block.
    fn run_f(&mut self) {
        if self.initialized {
            self.state[self.pos] ^= self.pos_begin as u8;
            self.state[self.pos + 1] ^= 0x04;
            self.state[self.r + 1] ^= 0x80;
        }
        self.state.permute();
        self.pos = 0;
        self.pos_begin = 0;
    }

    #[inline(always)]
    fn advance_pos(&mut self) {
        self.pos += 1;
        if self.pos == self.r {
            self.run_f();
        }
    }

    /// The duplex primitive every operation goes through.
    ///
    /// With `cbefore`, each byte is unmasked with the state before being
    /// absorbed (decryption); with `cafter`, the state is read back out after
    /// absorbing (encryption). The two are exclusive. `force_f` permutes once
    /// the data is in, even mid-block.
    fn duplex(&mut self, data: &mut [u8], cbefore: bool, cafter: bool, force_f: bool) {
        assert!(!(cbefore && cafter), "cbefore and cafter are exclusive");

        for b in data.iter_mut() {
            if cbefore {
                *b ^= self.state[self.pos];
            }
            self.state[self.pos] ^= *b;
            if cafter {
                *b = self.state[self.pos];
            }
            self.advance_pos();
        }

        if force_f && self.pos != 0 {
            self.run_f();
        }
    }

    /// Absorb some data into the sponge: duplexing with both cipher phases
    /// off, for input the caller keeps.
    fn absorb(&mut self, data: &[u8]) {
        for &b in data {
            self.state[self.pos] ^= b;
            self.advance_pos();
        }
    }

    /// Overwrites the state with the given data. This leaves the state
    /// exactly as duplexing with `cbefore` would, without mutating the input.
    fn overwrite(&mut self, data: &[u8]) {
        for &b in data {
            self.state[self.pos] = b;
            self.advance_pos();
        }
    }

    /// 7.3: Beginning an operation.
    fn begin_op(&mut self, mut flags: Flags, more: bool) {
        assert_eq!(
            flags & (FLAG_K | FLAG_RESERVED),
            0,
            "flag K and the reserved bits must stay clear"
        );

        if more {
            assert_eq!(
                self.cur_flags, flags,
                "cannot continue {:#b} with {:#b}",
                self.cur_flags, flags
            );
            return;
        }
        self.cur_flags = flags;

        if flags & FLAG_T != 0 {
            // The first transport operation fixes this party's role for good.
            if self.i0 == Role::Undecided {
                self.i0 = Role::of_first_op(flags);
            }
            // Paired send/recv operations must hash the same framing byte on
            // both sides, so a responder records the initiator's view of it.
            if self.i0 == Role::Responder {
                flags &= !FLAG_I;
            }
        }

        let old_begin = self.pos_begin as u8;
        self.pos_begin = self.pos + 1;
        self.absorb(&[old_begin, flags]);

        // Operations with cipher semantics start on a fresh block.
        let force_f = flags & (FLAG_C | FLAG_K) != 0;
        if force_f && self.pos != 0 {
            self.run_f();
        }
    }

    /// Runs an operation whose buffer is transformed in place.
    fn operate_mut(&mut self, flags: Flags, data: &mut [u8], more: bool) {
        self.begin_op(flags, more);

        // Send-with-cipher emits the state bytes as its output; every other
        // cipher operation unmasks before absorbing.
        let cafter = flags & (FLAG_C | FLAG_I | FLAG_T) == (FLAG_C | FLAG_T);
        let cbefore = flags & FLAG_C != 0 && !cafter;
        self.duplex(data, cbefore, cafter, false);
    }

    /// Runs an operation that leaves the caller's buffer untouched.
    fn operate(&mut self, flags: Flags, data: &[u8], more: bool) {
        self.begin_op(flags, more);

        if flags & (FLAG_C | FLAG_T | FLAG_I) == (FLAG_C | FLAG_T) {
            panic!("outbound cipher data requires the mutating path");
        } else if flags & FLAG_C != 0 {
            self.overwrite(data);
        } else {
            self.absorb(data);
        }
    }

    /// Produces bytes the application did not supply: zero-fills `dst` and
    /// lets the operation transform it.
    fn output(&mut self, flags: Flags, more: bool, dst: &mut [u8]) {
        assert!(
            flags & (FLAG_I | FLAG_T) != (FLAG_I | FLAG_T),
            "inbound transport data cannot be self-generated"
        );
        assert!(
            flags & (FLAG_I | FLAG_A) != FLAG_A,
            "application input cannot be self-generated"
        );

        dst.fill(0);
        self.operate_mut(flags, dst, more);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_initial_state() {
        let s = Strobe::new(b"hello", SecurityLevel::B128);
        let expect = "9c7f7eea94913ada2aa73c2355653563dc0c475c551526f6733bea22f16cb57c\
                      d31f682e660ee912824a772201ee1394226f4afcb62d331293cc92e8a624acf6\
                      e1b60095e322bbfbc845e5b26995fe7d7c841374d1ff5898c92ee0636b067273\
                      21c92a603907035349ccbb1b92b7b0057e8fa87fcebc7e88656fcb45ae04bc34\
                      cabeaebe79d91750c0e8bf13b966504d1343597265dd8865adf91409cc9b20d5\
                      f47444041f97b699ddfbdee91ea87bd09bf8b02da75a96e947f07f5b65bb4e6e\
                      fefaa16abfd9fbf6";
        assert_eq!(hex::encode(&s.state[..]), expect);
    }

    #[test]
    fn test_rates() {
        assert_eq!(Strobe::new(b"rates", SecurityLevel::B128).r, 166);
        assert_eq!(Strobe::new(b"rates", SecurityLevel::B256).r, 134);
    }

    #[test]
    fn test_security_level_from_bits() {
        assert_eq!(SecurityLevel::try_from(128), Ok(SecurityLevel::B128));
        assert_eq!(SecurityLevel::try_from(256), Ok(SecurityLevel::B256));
        assert_eq!(
            SecurityLevel::try_from(192),
            Err(Error::InvalidSecurityLevel)
        );
    }

    #[test]
    fn test_prf_known_answer() {
        let mut s = Strobe::new(b"PRF streaming demo", SecurityLevel::B128);
        s.key(b"hello-world", false);

        let mut split = s.clone();

        let mut prf1 = [0u8; 32];
        s.prf(&mut prf1, false);
        assert_eq!(
            hex::encode(prf1),
            "0b8bc840017bf7f3cd4493eae67ac4504fc7f60a15e2d9f576f1a3e947193f7e"
        );

        // The same 32 bytes, extracted across a streaming continuation.
        let mut head = [0u8; 20];
        let mut tail = [0u8; 12];
        split.prf(&mut head, false);
        split.prf(&mut tail, true);
        assert_eq!(head, prf1[..20]);
        assert_eq!(tail, prf1[20..]);
    }

    #[test]
    fn test_ad_streaming_equivalence() {
        let mut whole = Strobe::new(b"good morning", SecurityLevel::B128);
        whole.ad(b"helloworld", Options::default());

        let mut split = Strobe::new(b"good morning", SecurityLevel::B128);
        split.ad(b"hello", Options::default());
        split.ad(b"world", Options::STREAMING);

        let mut out_whole = [0u8; 32];
        let mut out_split = [0u8; 32];
        whole.prf(&mut out_whole, false);
        split.prf(&mut out_split, false);
        assert_eq!(out_whole, out_split);
    }

    fn aead_demo_sender() -> (Vec<u8>, [u8; 32]) {
        let mut s = Strobe::new(b"AEAD demo", SecurityLevel::B128);
        s.key(b"secret", false);
        let mut ciphertext = b"hello world".to_vec();
        s.send_enc(&mut ciphertext, Options::default());
        s.ad(b"this is a nonce", Options::default());
        let mut mac = [0u8; 32];
        s.send_mac(&mut mac, Options::default());
        (ciphertext, mac)
    }

    #[test]
    fn test_aead_round_trip() {
        let (ciphertext, mut mac) = aead_demo_sender();

        let mut r = Strobe::new(b"AEAD demo", SecurityLevel::B128);
        r.key(b"secret", false);
        let mut plaintext = ciphertext.clone();
        r.recv_enc(&mut plaintext, Options::default());
        r.ad(b"this is a nonce", Options::default());
        assert!(r.recv_mac(&mut mac, false).is_ok());
        assert_eq!(plaintext, b"hello world");
    }

    #[test]
    fn test_aead_rejects_tampering() {
        let (ciphertext, mac) = aead_demo_sender();

        // Flipping any single bit of the ciphertext or the tag must trip the
        // tag check.
        for i in 0..ciphertext.len() + mac.len() {
            let mut ct = ciphertext.clone();
            let mut tag = mac;
            if i < ct.len() {
                ct[i] ^= 0x01;
            } else {
                tag[i - ct.len()] ^= 0x01;
            }

            let mut r = Strobe::new(b"AEAD demo", SecurityLevel::B128);
            r.key(b"secret", false);
            r.recv_enc(&mut ct, Options::default());
            r.ad(b"this is a nonce", Options::default());
            assert_eq!(
                r.recv_mac(&mut tag, false),
                Err(Error::AuthenticationFailed)
            );
        }
    }

    #[test]
    fn test_role_binding() {
        let mut a = Strobe::new(b"role demo", SecurityLevel::B128);
        let mut b = Strobe::new(b"role demo", SecurityLevel::B128);
        a.key(b"shared", false);
        b.key(b"shared", false);

        a.send_clr(b"message", Options::default());
        b.recv_clr(b"message", Options::default());

        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.prf(&mut out_a, false);
        b.prf(&mut out_b, false);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn test_role_is_sticky() {
        let mut a = Strobe::new(b"role demo", SecurityLevel::B128);
        a.send_clr(b"first", Options::default());
        assert_eq!(a.i0, Role::Initiator);
        a.recv_clr(b"second", Options::default());
        assert_eq!(a.i0, Role::Initiator);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut s = Strobe::new(b"clone demo", SecurityLevel::B128);
        s.key(b"key", false);
        let mut c = s.clone();
        assert_eq!(s.state, c.state);

        // Running the same operation keeps them in lockstep...
        s.ad(b"data", Options::default());
        c.ad(b"data", Options::default());
        assert_eq!(s.state, c.state);

        // ...and diverging one leaves the other alone.
        let before = c.state.clone();
        s.ad(b"more", Options::default());
        assert_eq!(c.state, before);
        assert_ne!(s.state, before);
    }

    #[test]
    fn test_ratchet_agreement() {
        let mut s = Strobe::new(b"ratchet demo", SecurityLevel::B128);
        s.key(b"key", false);
        let mut c = s.clone();

        s.ratchet(32, false);
        c.ratchet(32, false);

        let mut out_s = [0u8; 32];
        let mut out_c = [0u8; 32];
        s.prf(&mut out_s, false);
        c.prf(&mut out_c, false);
        assert_eq!(out_s, out_c);
    }

    #[test]
    fn test_ratchet_changes_output() {
        let mut plain = Strobe::new(b"ratchet demo", SecurityLevel::B128);
        plain.key(b"key", false);
        let mut ratcheted = plain.clone();
        ratcheted.ratchet(32, false);

        let mut out_plain = [0u8; 32];
        let mut out_ratcheted = [0u8; 32];
        plain.prf(&mut out_plain, false);
        ratcheted.prf(&mut out_ratcheted, false);
        assert_ne!(out_plain, out_ratcheted);
    }

    #[test]
    #[should_panic(expected = "cannot continue")]
    fn test_streaming_must_keep_flags() {
        let mut s = Strobe::new(b"streaming demo", SecurityLevel::B128);
        s.ad(b"hello", Options::default());
        s.key(b"world", true);
    }

    #[test]
    #[should_panic(expected = "cannot continue")]
    fn test_streaming_must_keep_meta() {
        let mut s = Strobe::new(b"streaming demo", SecurityLevel::B128);
        s.ad(b"hello", Options::default());
        s.ad(
            b"world",
            Options {
                meta: true,
                streaming: true,
            },
        );
    }

    #[test]
    fn test_mac_meta_mismatch_fails() {
        let mut s = Strobe::new(b"meta demo", SecurityLevel::B128);
        s.key(b"key", false);
        let mut mac = [0u8; 32];
        s.send_mac(&mut mac, Options::META);

        let mut r = Strobe::new(b"meta demo", SecurityLevel::B128);
        r.key(b"key", false);
        assert_eq!(r.recv_mac(&mut mac, false), Err(Error::AuthenticationFailed));
    }

    #[test]
    fn test_enc_streaming_equivalence() {
        let mut whole = Strobe::new(b"enc streaming", SecurityLevel::B128);
        whole.key(b"key", false);
        let mut full = *b"hello world";
        whole.send_enc(&mut full, Options::default());

        let mut split = Strobe::new(b"enc streaming", SecurityLevel::B128);
        split.key(b"key", false);
        let mut head = *b"hello ";
        let mut tail = *b"world";
        split.send_enc(&mut head, Options::default());
        split.send_enc(&mut tail, Options::STREAMING);

        assert_eq!(full[..6], head);
        assert_eq!(full[6..], tail);
    }

    #[test]
    fn test_multi_block_round_trip() {
        // Messages longer than the rate, so every code path crosses a block
        // boundary, at both security levels.
        for level in [SecurityLevel::B128, SecurityLevel::B256] {
            let message = [0x5au8; 400];
            let mut ct = message;
            let mut s = Strobe::new(b"big message", level);
            s.key(b"key", false);
            s.send_enc(&mut ct, Options::default());
            assert_ne!(ct, message);

            let mut r = Strobe::new(b"big message", level);
            r.key(b"key", false);
            r.recv_enc(&mut ct, Options::default());
            assert_eq!(ct, message);
        }
    }

    #[test]
    fn test_aead_wrappers() {
        let mut s = Strobe::new(b"wrapper demo", SecurityLevel::B256);
        s.key(b"another secret", false);
        let sealed = s.send_aead(b"attack at dawn", b"header");

        let mut r = Strobe::new(b"wrapper demo", SecurityLevel::B256);
        r.key(b"another secret", false);
        let opened = r.recv_aead(&sealed, b"header").unwrap();
        assert_eq!(opened, b"attack at dawn");
    }

    #[test]
    fn test_aead_wrapper_rejects_short_input() {
        let mut r = Strobe::new(b"wrapper demo", SecurityLevel::B128);
        assert_eq!(
            r.recv_aead(&[0u8; MACLEN - 1], b""),
            Err(Error::AuthenticationFailed)
        );
    }

    #[test]
    fn test_empty_inputs() {
        let mut s = Strobe::new(b"", SecurityLevel::B128);
        s.ad(b"", Options::default());
        s.key(b"", false);
        s.ratchet(0, false);
        let mut out = [0u8; 32];
        s.prf(&mut out, false);
        assert_ne!(out, [0u8; 32]);
    }
}
