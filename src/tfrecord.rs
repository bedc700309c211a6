//! TFRecord framing
//!
//! Each record on disk is laid out as
//!
//! ```text
//! u64  length          (little endian)
//! u32  masked_crc32c(length bytes)
//! [u8] data            (length bytes)
//! u32  masked_crc32c(data)
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

const MASK_DELTA: u32 = 0xa282_ead8;

/// CRC32C as stored in TFRecord files.
pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

/// Writes framed records to any byte sink.
pub struct RecordWriter<W: Write> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_record(&mut self, data: &[u8]) -> std::io::Result<()> {
        let length = (data.len() as u64).to_le_bytes();
        self.inner.write_all(&length)?;
        self.inner.write_all(&masked_crc32c(&length).to_le_bytes())?;
        self.inner.write_all(data)?;
        self.inner.write_all(&masked_crc32c(data).to_le_bytes())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Write a file holding exactly one record, replacing any existing file.
pub fn write_single_record(path: &Path, data: &[u8]) -> Result<()> {
    let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
    let mut writer = RecordWriter::new(BufWriter::new(file));
    writer
        .write_record(data)
        .and_then(|_| writer.flush())
        .map_err(|e| ConvertError::io(path, e))
}

/// Reads framed records back, verifying both checksums.
pub struct RecordReader<R: Read> {
    inner: R,
    path: PathBuf,
}

impl<R: Read> RecordReader<R> {
    /// `path` is only used to label errors.
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    fn corrupt(&self, message: impl Into<String>) -> ConvertError {
        ConvertError::CorruptRecord {
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn read_exact_or_corrupt(&mut self, buf: &mut [u8], what: &str) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(self.corrupt(format!("truncated {}", what)))
            }
            Err(e) => Err(ConvertError::io(self.path.clone(), e)),
        }
    }

    /// Next record payload, or `None` at a clean end of input.
    pub fn read_record(&mut self) -> Result<Option<Vec<u8>>> {
        let mut length = [0u8; 8];
        let mut filled = 0;
        while filled < length.len() {
            let n = self
                .inner
                .read(&mut length[filled..])
                .map_err(|e| ConvertError::io(self.path.clone(), e))?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(self.corrupt("truncated length header"));
            }
            filled += n;
        }

        let mut crc = [0u8; 4];
        self.read_exact_or_corrupt(&mut crc, "length checksum")?;
        if u32::from_le_bytes(crc) != masked_crc32c(&length) {
            return Err(self.corrupt("length checksum mismatch"));
        }

        // Grow with the bytes actually present instead of trusting the header.
        let len = u64::from_le_bytes(length);
        let mut data = Vec::new();
        (&mut self.inner)
            .take(len)
            .read_to_end(&mut data)
            .map_err(|e| ConvertError::io(self.path.clone(), e))?;
        if (data.len() as u64) < len {
            return Err(self.corrupt("truncated record data"));
        }

        self.read_exact_or_corrupt(&mut crc, "data checksum")?;
        if u32::from_le_bytes(crc) != masked_crc32c(&data) {
            return Err(self.corrupt("data checksum mismatch"));
        }

        Ok(Some(data))
    }
}

/// Read every record in a TFRecord file.
pub fn read_records(path: &Path) -> Result<Vec<Vec<u8>>> {
    let file = File::open(path).map_err(|e| ConvertError::io(path, e))?;
    let mut reader = RecordReader::new(BufReader::new(file), path);
    let mut records = Vec::new();
    while let Some(record) = reader.read_record()? {
        records.push(record);
    }
    Ok(records)
}
