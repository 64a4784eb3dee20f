//! Packs an ordered list of values into one byte buffer and back.
//!
//! Values are MessagePack encoded back to back; decoding must ask for the
//! same types in the same order they were packed in. MessagePack carries the
//! type of every value, so asking for the wrong one is an error rather than
//! a misread.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("failed to pack value #{index}: {source}")]
    Encode {
        index: usize,
        source: rmp_serde::encode::Error,
    },
    #[error("failed to unpack value #{index}: {source}")]
    Decode {
        index: usize,
        source: rmp_serde::decode::Error,
    },
}

#[derive(Debug, Default)]
pub struct Packer {
    buf: Vec<u8>,
    count: usize,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pack<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, PackError> {
        rmp_serde::encode::write(&mut self.buf, value).map_err(|source| PackError::Encode {
            index: self.count,
            source,
        })?;
        self.count += 1;
        Ok(self)
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug)]
pub struct Unpacker<'a> {
    rest: &'a [u8],
    count: usize,
}

impl<'a> Unpacker<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            rest: buf,
            count: 0,
        }
    }

    /// Decodes the next value. Bytes after it are left for the next call.
    pub fn unpack<T: DeserializeOwned>(&mut self) -> Result<T, PackError> {
        let mut de = rmp_serde::Deserializer::new(&mut self.rest);
        let value: T = Deserialize::deserialize(&mut de).map_err(|source| PackError::Decode {
            index: self.count,
            source,
        })?;
        self.count += 1;
        Ok(value)
    }
}

/// Packs every argument, in order, into a `Vec<u8>`.
macro_rules! pack_data {
    ($($value:expr),+ $(,)?) => {
        (|| -> ::std::result::Result<Vec<u8>, $crate::core::pack::PackError> {
            let packer = $crate::core::pack::Packer::new();
            $(let packer = packer.pack(&$value)?;)+
            Ok(packer.finish())
        })()
    };
}

/// Unpacks `buf` into each `&mut` destination, in order. Anything left after
/// the last destination is ignored.
macro_rules! unpack_data {
    ($buf:expr, $($dest:expr),+ $(,)?) => {
        (|| -> ::std::result::Result<(), $crate::core::pack::PackError> {
            let mut unpacker = $crate::core::pack::Unpacker::new(&$buf);
            $(*$dest = unpacker.unpack()?;)+
            Ok(())
        })()
    };
}

pub(crate) use pack_data;
pub(crate) use unpack_data;
