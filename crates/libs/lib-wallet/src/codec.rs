//! # Transaction Codec
//!
//! Binary layout of a packed EOSIO transaction and the base-32 account name
//! encoding.
//!
//! ```text
//! expiration              u32 LE (seconds since epoch)
//! ref_block_num           u16 LE
//! ref_block_prefix        u32 LE
//! max_net_usage_words     varuint32
//! max_cpu_usage_ms        u8
//! delay_sec               varuint32
//! context_free_actions    varuint32 count, action*
//! actions                 varuint32 count, action*
//! transaction_extensions  varuint32 count, (u16 type, bytes)*
//!
//! action                  account u64, name u64,
//!                         varuint32 count, (actor u64, permission u64)*,
//!                         bytes
//! bytes                   varuint32 length, u8*
//! ```

use serde::{Serialize, Serializer};
use shared::dto::session::PermissionLevel;
use thiserror::Error;

const NAME_CHARS: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("varuint32 does not fit in 32 bits")]
    VarintOverflow,

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    #[error("invalid account name '{0}'")]
    InvalidName(String),
}

// region: --- Names

/// Encode an account name into its 64-bit form.
pub fn name_to_u64(name: &str) -> Result<u64, CodecError> {
    let bytes = name.as_bytes();
    if bytes.len() > 13 {
        return Err(CodecError::InvalidName(name.to_string()));
    }

    let mut value = 0u64;
    for (i, &c) in bytes.iter().enumerate() {
        let symbol = char_to_symbol(c).ok_or_else(|| CodecError::InvalidName(name.to_string()))?;
        if i < 12 {
            value |= symbol << (64 - 5 * (i + 1));
        } else {
            // The 13th character only has 4 bits.
            if symbol > 0x0f {
                return Err(CodecError::InvalidName(name.to_string()));
            }
            value |= symbol;
        }
    }

    Ok(value)
}

/// Decode a 64-bit account name. Trailing dots are dropped.
pub fn name_from_u64(value: u64) -> String {
    let mut chars = [b'.'; 13];
    let mut rest = value;

    for i in 0..13 {
        let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
        chars[12 - i] = NAME_CHARS[(rest & mask) as usize];
        rest >>= shift;
    }

    let len = chars.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
    chars[..len].iter().map(|&c| c as char).collect()
}

fn char_to_symbol(c: u8) -> Option<u64> {
    match c {
        b'a'..=b'z' => Some(u64::from(c - b'a') + 6),
        b'1'..=b'5' => Some(u64::from(c - b'1') + 1),
        b'.' => Some(0),
        _ => None,
    }
}

// endregion: --- Names

// region: --- Types

/// An action as it appears on the wire, with packed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackedAction {
    pub account: String,
    pub name: String,
    pub authorization: Vec<PermissionLevel>,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    #[serde(rename = "type")]
    pub kind: u16,
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

/// A decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde(serialize_with = "serialize_time_point_sec")]
    pub expiration: u32,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
    pub context_free_actions: Vec<PackedAction>,
    pub actions: Vec<PackedAction>,
    pub transaction_extensions: Vec<Extension>,
}

fn serialize_time_point_sec<S: Serializer>(secs: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&lib_utils::format_time_point_sec(*secs))
}

impl Transaction {
    /// Decode a packed transaction; the whole input must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);

        let transaction = Transaction {
            expiration: reader.u32()?,
            ref_block_num: reader.u16()?,
            ref_block_prefix: reader.u32()?,
            max_net_usage_words: reader.varuint32()?,
            max_cpu_usage_ms: reader.u8()?,
            delay_sec: reader.varuint32()?,
            context_free_actions: reader.actions()?,
            actions: reader.actions()?,
            transaction_extensions: reader.extensions()?,
        };

        match reader.remaining() {
            0 => Ok(transaction),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }

    /// Pack into the wire layout.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = Writer::default();

        writer.u32(self.expiration);
        writer.u16(self.ref_block_num);
        writer.u32(self.ref_block_prefix);
        writer.varuint32(self.max_net_usage_words);
        writer.u8(self.max_cpu_usage_ms);
        writer.varuint32(self.delay_sec);
        writer.actions(&self.context_free_actions)?;
        writer.actions(&self.actions)?;
        writer.len(self.transaction_extensions.len());
        for extension in &self.transaction_extensions {
            writer.u16(extension.kind);
            writer.bytes(&extension.data);
        }

        Ok(writer.buf)
    }
}

// endregion: --- Types

// region: --- Reader/Writer

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        if needed > self.remaining() {
            return Err(CodecError::UnexpectedEnd {
                needed,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn varuint32(&mut self) -> Result<u32, CodecError> {
        let mut value: u64 = 0;
        let mut shift = 0;
        loop {
            let byte = self.u8()?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift >= 35 {
                return Err(CodecError::VarintOverflow);
            }
        }
        u32::try_from(value).map_err(|_| CodecError::VarintOverflow)
    }

    fn len(&mut self) -> Result<usize, CodecError> {
        let len = self.varuint32()? as usize;
        // Every element is at least one byte.
        if len > self.remaining() {
            return Err(CodecError::UnexpectedEnd {
                needed: len,
                remaining: self.remaining(),
            });
        }
        Ok(len)
    }

    fn bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.len()?;
        Ok(self.take(len)?.to_vec())
    }

    fn name(&mut self) -> Result<String, CodecError> {
        Ok(name_from_u64(self.u64()?))
    }

    fn actions(&mut self) -> Result<Vec<PackedAction>, CodecError> {
        let count = self.len()?;
        let mut actions = Vec::with_capacity(count);

        for _ in 0..count {
            let account = self.name()?;
            let name = self.name()?;

            let auth_count = self.len()?;
            let mut authorization = Vec::with_capacity(auth_count);
            for _ in 0..auth_count {
                let actor = self.name()?;
                let permission = self.name()?;
                authorization.push(PermissionLevel { actor, permission });
            }

            actions.push(PackedAction {
                account,
                name,
                authorization,
                data: self.bytes()?,
            });
        }

        Ok(actions)
    }

    fn extensions(&mut self) -> Result<Vec<Extension>, CodecError> {
        let count = self.len()?;
        let mut extensions = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = self.u16()?;
            extensions.push(Extension {
                kind,
                data: self.bytes()?,
            });
        }
        Ok(extensions)
    }
}

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn varuint32(&mut self, mut value: u32) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                break;
            }
            self.buf.push(byte | 0x80);
        }
    }

    fn len(&mut self, len: usize) {
        self.varuint32(len as u32);
    }

    fn bytes(&mut self, data: &[u8]) {
        self.len(data.len());
        self.buf.extend_from_slice(data);
    }

    fn name(&mut self, name: &str) -> Result<(), CodecError> {
        self.u64(name_to_u64(name)?);
        Ok(())
    }

    fn actions(&mut self, actions: &[PackedAction]) -> Result<(), CodecError> {
        self.len(actions.len());
        for action in actions {
            self.name(&action.account)?;
            self.name(&action.name)?;
            self.len(action.authorization.len());
            for level in &action.authorization {
                self.name(&level.actor)?;
                self.name(&level.permission)?;
            }
            self.bytes(&action.data);
        }
        Ok(())
    }
}

// endregion: --- Reader/Writer
