//! Request body buffer that spills to a temporary file.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};

use reqwest::Body;
use tokio_util::io::ReaderStream;

/// Bytes kept in memory before the buffer moves to disk.
pub const DEFAULT_SPILL_THRESHOLD: usize = 64 * 1024;

/// Accumulates a request body, in memory up to a threshold and in an
/// anonymous temporary file beyond it. The file is removed when the buffer
/// is dropped.
#[derive(Debug)]
pub struct SpillBuffer {
    threshold: usize,
    memory: Vec<u8>,
    file: Option<File>,
    len: u64,
}

impl SpillBuffer {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_SPILL_THRESHOLD)
    }

    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            threshold,
            memory: Vec::new(),
            file: None,
            len: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_spilled(&self) -> bool {
        self.file.is_some()
    }

    /// Converts the buffered bytes into a request body and its length.
    pub fn into_body(self) -> io::Result<(Body, u64)> {
        let len = self.len;
        match self.file {
            None => Ok((Body::from(self.memory), len)),
            Some(mut file) => {
                file.flush()?;
                file.seek(SeekFrom::Start(0))?;
                let stream = ReaderStream::new(tokio::fs::File::from_std(file));
                Ok((Body::wrap_stream(stream), len))
            },
        }
    }

    fn spill(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            let mut file = tempfile::tempfile()?;
            file.write_all(&self.memory)?;
            self.memory = Vec::new();
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("spill file unavailable"))
    }
}

impl Default for SpillBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for SpillBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.file.is_none() && self.memory.len() + buf.len() <= self.threshold {
            self.memory.extend_from_slice(buf);
        } else {
            self.spill()?.write_all(buf)?;
        }
        self.len += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}
