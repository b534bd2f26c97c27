//! Byte <-> code point conversion for a connection's charset.
//!
//! Terminal reads split multi-byte sequences at arbitrary points, so the
//! `Decoder` holds an incomplete trailing sequence until the next read
//! completes it.

use std::str::FromStr;

const REPLACEMENT: char = '\u{FFFD}';

/// Character encoding of the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value.
    Latin1,
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(Self::Latin1),
            other => Err(format!("unsupported charset `{other}`")),
        }
    }
}

#[derive(Debug, Default)]
pub struct Decoder {
    charset: Charset,
    pending: Vec<u8>,
}

impl Decoder {
    pub fn new(charset: Charset) -> Self {
        Self {
            charset,
            pending: Vec::new(),
        }
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Bytes held back waiting for the rest of a sequence.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Decode one read. Invalid sequences become U+FFFD; an incomplete
    /// sequence at the end is kept for the next call.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<char> {
        match self.charset {
            Charset::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Charset::Utf8 => self.decode_utf8(bytes),
        }
    }

    fn decode_utf8(&mut self, bytes: &[u8]) -> Vec<char> {
        self.pending.extend_from_slice(bytes);
        let mut out = Vec::with_capacity(self.pending.len());
        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(valid) => {
                    out.extend(valid.chars());
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    // valid_up_to guarantees this prefix is UTF-8
                    if let Ok(valid) = std::str::from_utf8(&self.pending[start..valid_end]) {
                        out.extend(valid.chars());
                    }
                    match e.error_len() {
                        Some(bad) => {
                            out.push(REPLACEMENT);
                            start = valid_end + bad;
                        }
                        None => {
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..start);
        out
    }
}

/// Reverse of `Decoder`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    charset: Charset,
}

impl Encoder {
    pub fn new(charset: Charset) -> Self {
        Self { charset }
    }

    /// Encode code points. Characters outside Latin-1 become `?` in that charset.
    pub fn encode(&self, chars: &[char]) -> Vec<u8> {
        match self.charset {
            Charset::Utf8 => {
                let mut out = Vec::with_capacity(chars.len());
                let mut buf = [0u8; 4];
                for c in chars {
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                out
            }
            Charset::Latin1 => chars
                .iter()
                .map(|&c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_sequence_decodes_once_complete() {
        let bytes = "añ€😀".as_bytes();
        for split in 0..=bytes.len() {
            let mut d = Decoder::new(Charset::Utf8);
            let mut out = d.decode(&bytes[..split]);
            out.extend(d.decode(&bytes[split..]));
            assert_eq!(out.iter().collect::<String>(), "añ€😀", "split at {split}");
            assert_eq!(d.pending(), 0);
        }
    }

    #[test]
    fn incomplete_tail_is_held() {
        let mut d = Decoder::new(Charset::Utf8);
        assert_eq!(d.decode(&[b'a', 0xE2, 0x82]), vec!['a']);
        assert_eq!(d.pending(), 2);
        assert_eq!(d.decode(&[0xAC]), vec!['€']);
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let mut d = Decoder::new(Charset::Utf8);
        assert_eq!(d.decode(&[b'a', 0xFF, b'b']), vec!['a', REPLACEMENT, 'b']);
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn latin1_maps_bytes_directly() {
        let mut d = Decoder::new(Charset::Latin1);
        assert_eq!(d.decode(&[0x41, 0xE9]), vec!['A', 'é']);
        let e = Encoder::new(Charset::Latin1);
        assert_eq!(e.encode(&['A', 'é', '€']), vec![0x41, 0xE9, b'?']);
    }

    #[test]
    fn utf8_encoder_matches_str_bytes() {
        let e = Encoder::new(Charset::Utf8);
        let chars: Vec<char> = "x€😀".chars().collect();
        assert_eq!(e.encode(&chars), "x€😀".as_bytes());
    }

    #[test]
    fn charset_names() {
        assert_eq!("UTF-8".parse::<Charset>(), Ok(Charset::Utf8));
        assert_eq!("latin1".parse::<Charset>(), Ok(Charset::Latin1));
        assert!("ebcdic".parse::<Charset>().is_err());
    }
}
