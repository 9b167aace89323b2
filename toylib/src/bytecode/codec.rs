use thiserror::Error;

use super::{Bytecode, Instructions, Value};

const MAGIC: &[u8; 4] = b"TOYB";
const VERSION: u32 = 1;

const TAG_INT: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_STR: u8 = 2;
const TAG_NULL: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid bytecode magic header")]
    BadMagic,
    #[error("Unsupported bytecode version {0}")]
    UnsupportedVersion(u32),
    #[error("Unexpected EOF while decoding bytecode")]
    UnexpectedEof,
    #[error("Unknown constant tag {0}")]
    UnknownTag(u8),
    #[error("Invalid bool constant byte {0}")]
    InvalidBool(u8),
    #[error("Invalid UTF-8 in string constant")]
    InvalidUtf8,
    #[error("{0} trailing bytes after bytecode")]
    TrailingBytes(usize),
}

impl Bytecode {
    /// Length-prefixed instruction bytes followed by tag-prefixed constants.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        write_u32(&mut out, VERSION);
        write_u32(&mut out, self.instructions.len() as u32);
        out.extend_from_slice(self.instructions.as_bytes());
        write_u32(&mut out, self.constants.len() as u32);
        for c in &self.constants {
            encode_value(c, &mut out);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut rd = Reader { bytes, idx: 0 };
        if rd.read_exact(4)? != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        let version = rd.read_u32()?;
        if version != VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let code_len = rd.read_u32()? as usize;
        let instructions = Instructions(rd.read_exact(code_len)?.to_vec());
        let count = rd.read_u32()? as usize;
        let mut constants = Vec::with_capacity(count.min(bytes.len()));
        for _ in 0..count {
            constants.push(decode_value(&mut rd)?);
        }
        if rd.idx != bytes.len() {
            return Err(DecodeError::TrailingBytes(bytes.len() - rd.idx));
        }
        Ok(Self {
            instructions,
            constants,
        })
    }
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn encode_value(v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Int(n) => {
            out.push(TAG_INT);
            out.extend_from_slice(&n.to_le_bytes());
        }
        Value::Bool(b) => {
            out.push(TAG_BOOL);
            out.push(u8::from(*b));
        }
        Value::Str(s) => {
            out.push(TAG_STR);
            write_u32(out, s.len() as u32);
            out.extend_from_slice(s.as_bytes());
        }
        Value::Null => out.push(TAG_NULL),
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    idx: usize,
}

impl<'a> Reader<'a> {
    fn read_exact(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.idx.checked_add(n).ok_or(DecodeError::UnexpectedEof)?;
        let s = self
            .bytes
            .get(self.idx..end)
            .ok_or(DecodeError::UnexpectedEof)?;
        self.idx = end;
        Ok(s)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_exact(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.read_exact(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i64(&mut self) -> Result<i64, DecodeError> {
        let b = self.read_exact(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(i64::from_le_bytes(buf))
    }
}

fn decode_value(rd: &mut Reader<'_>) -> Result<Value, DecodeError> {
    match rd.read_u8()? {
        TAG_INT => Ok(Value::Int(rd.read_i64()?)),
        TAG_BOOL => match rd.read_u8()? {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            b => Err(DecodeError::InvalidBool(b)),
        },
        TAG_STR => {
            let n = rd.read_u32()? as usize;
            let b = rd.read_exact(n)?;
            String::from_utf8(b.to_vec())
                .map(Value::Str)
                .map_err(|_| DecodeError::InvalidUtf8)
        }
        TAG_NULL => Ok(Value::Null),
        t => Err(DecodeError::UnknownTag(t)),
    }
}
