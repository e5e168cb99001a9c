use std::borrow::Cow;
use std::fmt;

use crate::error::{Error, Result};

/// Maximum length of a file or directory name inside a save container.
pub const NAME_LEN: usize = 16;

/// Fixed-capacity entry name, stored the way the container stores it:
/// 16 bytes, zero filled after the end of the name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntryName {
    bytes: [u8; NAME_LEN],
    len: u8,
}

impl EntryName {
    pub fn new(name: &str) -> Result<Self> {
        Self::from_bytes(name.as_bytes())
    }

    pub fn from_bytes(name: &[u8]) -> Result<Self> {
        if name.len() > NAME_LEN {
            return Err(Error::InvalidName(format!(
                "{:?} is {} bytes, limit is {}",
                String::from_utf8_lossy(name),
                name.len(),
                NAME_LEN
            )));
        }
        if name.contains(&0) {
            return Err(Error::InvalidName(format!(
                "{:?} contains a NUL byte",
                String::from_utf8_lossy(name)
            )));
        }
        let mut bytes = [0u8; NAME_LEN];
        bytes[..name.len()].copy_from_slice(name);
        Ok(Self {
            bytes,
            len: name.len() as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl fmt::Debug for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryName({:?})", self.to_str_lossy())
    }
}
