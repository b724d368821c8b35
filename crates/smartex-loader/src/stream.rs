//! Chunked reading with progress reporting

use std::io::{Read, Result as IoResult};

use crate::fetch::FetchProgress;

/// Default chunk size (64KB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Reader that pulls a source in fixed-size chunks
pub struct ChunkedReader<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read> ChunkedReader<R> {
    /// Create a new chunked reader
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Read next chunk
    /// Returns None if end of stream reached
    pub fn read_chunk(&mut self) -> IoResult<Option<Vec<u8>>> {
        let mut chunk = vec![0; self.chunk_size];
        let mut total_read = 0;

        loop {
            match self.reader.read(&mut chunk[total_read..]) {
                Ok(0) => {
                    if total_read == 0 {
                        return Ok(None);
                    }
                    chunk.truncate(total_read);
                    return Ok(Some(chunk));
                }
                Ok(n) => {
                    total_read += n;
                    if total_read >= self.chunk_size {
                        return Ok(Some(chunk));
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Read the whole source, reporting progress after every chunk
    pub fn read_to_end_with_progress(
        mut self,
        total: Option<u64>,
        on_progress: &mut dyn FnMut(FetchProgress),
    ) -> IoResult<Vec<u8>> {
        let capacity = total.map_or(0, |t| usize::try_from(t).unwrap_or(0));
        let mut data = Vec::with_capacity(capacity);

        while let Some(chunk) = self.read_chunk()? {
            data.extend_from_slice(&chunk);
            on_progress(FetchProgress {
                loaded: data.len() as u64,
                total,
            });
        }

        Ok(data)
    }
}
