//! zlib-stream frame codec
//!
//! With `compress=zlib-stream` the gateway deflates every message through one
//! zlib context that lives as long as the socket. A message may span several
//! binary frames; the last one ends with the sync-flush marker `00 00 FF FF`.

use flate2::{Decompress, FlushDecompress, Status};

use crate::error::CodecError;

/// Trailer of a sync flush, marking the end of one logical message
const ZLIB_SUFFIX: [u8; 4] = [0x00, 0x00, 0xFF, 0xFF];

const CHUNK: usize = 32 * 1024;

/// Per-connection streaming inflater
pub struct Inflater {
    decompress: Decompress,
    buffer: Vec<u8>,
    output: Vec<u8>,
}

impl Inflater {
    /// Fresh inflate context for a new socket
    #[must_use]
    pub fn new() -> Self {
        Self {
            decompress: Decompress::new(true),
            buffer: Vec::new(),
            output: Vec::with_capacity(CHUNK),
        }
    }

    /// Feed one binary frame
    ///
    /// Returns the decompressed message once its final frame has arrived, or
    /// `None` while more frames are expected.
    pub fn push(&mut self, frame: &[u8]) -> Result<Option<String>, CodecError> {
        self.buffer.extend_from_slice(frame);
        if !self.buffer.ends_with(&ZLIB_SUFFIX) {
            return Ok(None);
        }

        self.output.clear();
        let mut offset = 0;
        loop {
            let before_in = self.decompress.total_in();
            let before_out = self.decompress.total_out();

            self.output.reserve(CHUNK);
            let status = self.decompress.decompress_vec(
                &self.buffer[offset..],
                &mut self.output,
                FlushDecompress::Sync,
            );

            let consumed = (self.decompress.total_in() - before_in) as usize;
            let produced = self.decompress.total_out() - before_out;
            offset += consumed;

            match status {
                Ok(Status::StreamEnd) => break,
                Ok(_) => {
                    let drained = offset >= self.buffer.len() && self.output.len() < self.output.capacity();
                    if drained || (consumed == 0 && produced == 0) {
                        break;
                    }
                }
                Err(e) => {
                    self.buffer.clear();
                    return Err(e.into());
                }
            }
        }
        self.buffer.clear();

        let text = String::from_utf8(std::mem::take(&mut self.output))?;
        Ok(Some(text))
    }

    /// Bytes of the current partial message
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for Inflater {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Inflater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inflater")
            .field("total_in", &self.decompress.total_in())
            .field("total_out", &self.decompress.total_out())
            .field("pending", &self.buffer.len())
            .finish()
    }
}
