//! The script opcodes this protocol uses.
//!
//! Only the opcodes that appear in inscription envelopes and the two
//! locking templates are named; everything else renders by byte value.

/// Push an empty value (also the envelope field tag for the payload).
pub const OP_0: u8 = 0x00;
/// Alias for `OP_0` in boolean position.
pub const OP_FALSE: u8 = 0x00;
/// Largest direct-push opcode: the byte itself is the data length.
pub const OP_DATA_75: u8 = 0x4b;
/// Push with a 1-byte length prefix.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Push with a 2-byte little-endian length prefix.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Push with a 4-byte little-endian length prefix.
pub const OP_PUSHDATA4: u8 = 0x4e;
/// Push the number 1 (also the envelope field tag for the content type).
pub const OP_1: u8 = 0x51;
/// Push the number 16; upper bound of the small-integer opcodes.
pub const OP_16: u8 = 0x60;
/// Begin a conditional block.
pub const OP_IF: u8 = 0x63;
/// End a conditional block.
pub const OP_ENDIF: u8 = 0x68;
/// Mark the remainder of the script as unspendable data.
pub const OP_RETURN: u8 = 0x6a;
/// Duplicate the top stack item.
pub const OP_DUP: u8 = 0x76;
/// Pop two items and fail unless they are equal.
pub const OP_EQUALVERIFY: u8 = 0x88;
/// Hash the top item with RIPEMD-160(SHA-256(x)).
pub const OP_HASH160: u8 = 0xa9;
/// Check an ECDSA signature, leaving the result on the stack.
pub const OP_CHECKSIG: u8 = 0xac;
/// Check an ECDSA signature and fail the script if invalid.
pub const OP_CHECKSIGVERIFY: u8 = 0xad;

/// The canonical name of an opcode, if this crate names it.
pub fn opcode_name(op: u8) -> Option<&'static str> {
    match op {
        OP_0 => Some("OP_0"),
        OP_PUSHDATA1 => Some("OP_PUSHDATA1"),
        OP_PUSHDATA2 => Some("OP_PUSHDATA2"),
        OP_PUSHDATA4 => Some("OP_PUSHDATA4"),
        OP_1 => Some("OP_1"),
        OP_IF => Some("OP_IF"),
        OP_ENDIF => Some("OP_ENDIF"),
        OP_RETURN => Some("OP_RETURN"),
        OP_DUP => Some("OP_DUP"),
        OP_EQUALVERIFY => Some("OP_EQUALVERIFY"),
        OP_HASH160 => Some("OP_HASH160"),
        OP_CHECKSIG => Some("OP_CHECKSIG"),
        OP_CHECKSIGVERIFY => Some("OP_CHECKSIGVERIFY"),
        _ => None,
    }
}
