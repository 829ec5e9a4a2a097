//! Key encodings for typed collections.
//!
//! A collection key is `prefix ++ encode_key(k)`. Encodings are chosen so
//! that byte order matches the natural order of the key type, which makes
//! prefix scans return entries sorted by key. Variable-length pair
//! components use the null-escape scheme of sort-preserving index keys.

/// A type usable as a collection key.
pub trait KeyCodec: Sized {
    /// Encode the key into its ordered byte form.
    fn encode_key(&self) -> Vec<u8>;

    /// Decode a key from the bytes following the collection prefix.
    fn decode_key(bytes: &[u8]) -> Result<Self, String>;

    /// Human-readable rendering for errors and logs.
    fn stringify(&self) -> String;
}

impl KeyCodec for u64 {
    fn encode_key(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }

    fn decode_key(bytes: &[u8]) -> Result<Self, String> {
        let arr: [u8; 8] = bytes
            .try_into()
            .map_err(|_| format!("u64 key must be 8 bytes, got {}", bytes.len()))?;
        Ok(u64::from_be_bytes(arr))
    }

    fn stringify(&self) -> String {
        self.to_string()
    }
}

impl KeyCodec for String {
    fn encode_key(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn decode_key(bytes: &[u8]) -> Result<Self, String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| format!("string key is not UTF-8: {e}"))
    }

    fn stringify(&self) -> String {
        self.clone()
    }
}

impl KeyCodec for Vec<u8> {
    fn encode_key(&self) -> Vec<u8> {
        self.clone()
    }

    fn decode_key(bytes: &[u8]) -> Result<Self, String> {
        Ok(bytes.to_vec())
    }

    fn stringify(&self) -> String {
        format!("{self:02x?}")
    }
}

/// Escape marker: a `0x00` inside an escaped component is written `0x00 0x01`.
const ESCAPE_BYTE: u8 = 0x01;
/// A component ends with `0x00 0x00`.
const TERMINATOR: u8 = 0x00;

fn encode_escaped(data: &[u8], buf: &mut Vec<u8>) {
    for &byte in data {
        if byte == 0x00 {
            buf.push(0x00);
            buf.push(ESCAPE_BYTE);
        } else {
            buf.push(byte);
        }
    }
    buf.push(0x00);
    buf.push(TERMINATOR);
}

/// Returns the unescaped component and the number of input bytes consumed.
fn decode_escaped(data: &[u8]) -> Result<(Vec<u8>, usize), String> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        if data[i] != 0x00 {
            out.push(data[i]);
            i += 1;
            continue;
        }
        match data.get(i + 1) {
            Some(&TERMINATOR) => return Ok((out, i + 2)),
            Some(&ESCAPE_BYTE) => {
                out.push(0x00);
                i += 2;
            }
            Some(other) => return Err(format!("invalid escape sequence: 0x00 0x{other:02x}")),
            None => return Err("unexpected end of escaped key component".to_string()),
        }
    }
    Err("pair key first component is missing its terminator".to_string())
}

/// Pair keys: the first component is null-escaped and terminated, the second
/// takes the remaining bytes. Pairs sort by first component, then second,
/// the same as tuple order.
impl<A: KeyCodec, B: KeyCodec> KeyCodec for (A, B) {
    fn encode_key(&self) -> Vec<u8> {
        let mut out = pair_prefix(&self.0);
        out.extend_from_slice(&self.1.encode_key());
        out
    }

    fn decode_key(bytes: &[u8]) -> Result<Self, String> {
        let (first, used) = decode_escaped(bytes)?;
        Ok((A::decode_key(&first)?, B::decode_key(&bytes[used..])?))
    }

    fn stringify(&self) -> String {
        format!("({}, {})", self.0.stringify(), self.1.stringify())
    }
}

/// Encoded prefix selecting every pair whose first component is `first`.
pub fn pair_prefix<A: KeyCodec>(first: &A) -> Vec<u8> {
    let encoded = first.encode_key();
    let mut out = Vec::with_capacity(encoded.len() + 2);
    encode_escaped(&encoded, &mut out);
    out
}
