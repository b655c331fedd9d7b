use std::io::{self, Read, Seek, SeekFrom, Write};

/// Read-only playback of a request body that stays owned by the caller.
///
/// `RandomAccess` reads through a cursor and leaves the bytes in place. `Sequential` models a
/// non-seekable stream: every read removes the returned prefix from the borrowed buffer, so each
/// byte is delivered at most once.
#[derive(Debug)]
pub enum BodyBuffer<'a> {
    RandomAccess { buf: &'a [u8], pos: usize },
    Sequential { buf: &'a mut Vec<u8> },
}

impl<'a> BodyBuffer<'a> {
    pub fn random_access(buf: &'a [u8]) -> Self {
        BodyBuffer::RandomAccess { buf, pos: 0 }
    }

    pub fn sequential(buf: &'a mut Vec<u8>) -> Self {
        BodyBuffer::Sequential { buf }
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, BodyBuffer::Sequential { .. })
    }

    /// Unread bytes left.
    pub fn bytes_available(&self) -> usize {
        match self {
            BodyBuffer::RandomAccess { buf, pos } => buf.len().saturating_sub(*pos),
            BodyBuffer::Sequential { buf } => buf.len(),
        }
    }

    /// Total length for random access, remaining length for sequential playback.
    pub fn size(&self) -> usize {
        match self {
            BodyBuffer::RandomAccess { buf, .. } => buf.len(),
            BodyBuffer::Sequential { buf } => buf.len(),
        }
    }
}

impl Read for BodyBuffer<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let count = match self {
            BodyBuffer::RandomAccess { buf, pos } => {
                let start = (*pos).min(buf.len());
                let count = out.len().min(buf.len() - start);
                out[..count].copy_from_slice(&buf[start..start + count]);
                *pos = start + count;
                count
            }
            BodyBuffer::Sequential { buf } => {
                let count = out.len().min(buf.len());
                out[..count].copy_from_slice(&buf[..count]);
                buf.drain(..count);
                count
            }
        };
        log::trace!("Read {} bytes from request body.", count);
        Ok(count)
    }
}

impl Write for BodyBuffer<'_> {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "request body is read-only",
        ))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for BodyBuffer<'_> {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        match self {
            BodyBuffer::RandomAccess { buf, pos } => {
                let next = match target {
                    SeekFrom::Start(offset) => Some(offset as i64),
                    SeekFrom::End(offset) => (buf.len() as i64).checked_add(offset),
                    SeekFrom::Current(offset) => (*pos as i64).checked_add(offset),
                };
                match next {
                    Some(next) if next >= 0 => {
                        *pos = next as usize;
                        Ok(next as u64)
                    }
                    _ => Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "seek before the start of the body",
                    )),
                }
            }
            BodyBuffer::Sequential { .. } => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "sequential body cannot seek",
            )),
        }
    }
}
