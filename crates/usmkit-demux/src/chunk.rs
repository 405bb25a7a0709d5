//! USM chunk framing
//!
//! Every USM block starts with a 4-byte signature and a big-endian size
//! counting the bytes that follow it. The first bytes after the size form a
//! small header carrying the payload offset, the trailing padding, the
//! stream channel and the payload type:
//!
//! ```text
//! 0x00  signature        [u8; 4]
//! 0x04  chunk size       u32 BE (bytes after this field)
//! 0x08  reserved         u8
//! 0x09  payload offset   u8     (relative to 0x08)
//! 0x0A  padding size     u16 BE
//! 0x0C  channel          u8
//! 0x0D  reserved         [u8; 2]
//! 0x0F  payload type     u8     (low two bits)
//! 0x10  frame time       u32 BE
//! 0x14  frame rate       u32 BE
//! ```

use std::io::{ErrorKind, Read};

use crate::error::DemuxError;

/// Bytes of the fixed header that must be present in every chunk body.
pub const MIN_HEADER_LEN: usize = 0x10;

/// Chunk kind, derived from the 4-byte signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// `CRID` - container information, always first
    Crid,
    /// `@SFV` - video stream
    Video,
    /// `@SFA` - audio stream
    Audio,
    /// `@ALP` - alpha plane stream
    Alpha,
    /// `@SBT` - subtitle stream
    Subtitle,
    /// `@CUE` - cue points
    Cue,
    /// Anything else; skipped by the demuxer
    Unknown([u8; 4]),
}

impl ChunkKind {
    pub fn from_signature(sig: [u8; 4]) -> Self {
        match &sig {
            b"CRID" => ChunkKind::Crid,
            b"@SFV" => ChunkKind::Video,
            b"@SFA" => ChunkKind::Audio,
            b"@ALP" => ChunkKind::Alpha,
            b"@SBT" => ChunkKind::Subtitle,
            b"@CUE" => ChunkKind::Cue,
            _ => ChunkKind::Unknown(sig),
        }
    }

    pub fn signature(&self) -> [u8; 4] {
        match self {
            ChunkKind::Crid => *b"CRID",
            ChunkKind::Video => *b"@SFV",
            ChunkKind::Audio => *b"@SFA",
            ChunkKind::Alpha => *b"@ALP",
            ChunkKind::Subtitle => *b"@SBT",
            ChunkKind::Cue => *b"@CUE",
            ChunkKind::Unknown(sig) => *sig,
        }
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.signature()))
    }
}

/// What a chunk payload carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    /// Elementary stream data
    Stream,
    /// `@UTF` table describing the stream
    Header,
    /// `#HEADER END` / `#CONTENTS END` markers
    SectionEnd,
    /// Seek information and other metadata
    Metadata,
}

impl PayloadType {
    fn from_byte(b: u8) -> Self {
        match b & 0x03 {
            0 => PayloadType::Stream,
            1 => PayloadType::Header,
            2 => PayloadType::SectionEnd,
            _ => PayloadType::Metadata,
        }
    }
}

/// Decoded chunk header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub kind: ChunkKind,
    /// Offset of the chunk signature in the input
    pub offset: u64,
    /// Size of the chunk body (everything after the size field)
    pub size: u32,
    pub payload_offset: u8,
    pub padding: u16,
    pub channel: u8,
    pub payload_type: PayloadType,
    pub frame_time: u32,
    pub frame_rate: u32,
}

impl ChunkHeader {
    /// Total bytes the chunk occupies in the input, including signature and size.
    pub fn total_len(&self) -> u64 {
        self.size as u64 + 8
    }
}

/// A chunk header together with its payload bytes
#[derive(Debug, Clone)]
pub struct Chunk {
    pub header: ChunkHeader,
    pub payload: Vec<u8>,
}

impl Chunk {
    pub fn is_stream_data(&self) -> bool {
        self.header.payload_type == PayloadType::Stream
    }
}

/// Sequential reader over the chunks of a USM byte stream
pub struct ChunkReader<R> {
    reader: R,
    position: u64,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            position: 0,
        }
    }

    /// Current offset in the underlying stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read the next chunk, or `None` at a clean end of input.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, DemuxError> {
        let offset = self.position;

        let mut prefix = [0u8; 8];
        let filled = read_full(&mut self.reader, &mut prefix)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < prefix.len() {
            return Err(DemuxError::Truncated { offset });
        }

        let sig = [prefix[0], prefix[1], prefix[2], prefix[3]];
        let size = u32::from_be_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);

        if (size as usize) < MIN_HEADER_LEN {
            return Err(DemuxError::invalid_chunk(
                offset,
                format!("chunk size {size} is smaller than its header"),
            ));
        }

        // Grows with the data actually present, not with the declared size.
        let mut body = Vec::new();
        self.reader.by_ref().take(u64::from(size)).read_to_end(&mut body)?;
        if body.len() < size as usize {
            return Err(DemuxError::Truncated { offset });
        }
        self.position += 8 + size as u64;

        let header = ChunkHeader {
            kind: ChunkKind::from_signature(sig),
            offset,
            size,
            payload_offset: body[1],
            padding: u16::from_be_bytes([body[2], body[3]]),
            channel: body[4],
            payload_type: PayloadType::from_byte(body[7]),
            frame_time: u32::from_be_bytes([body[8], body[9], body[10], body[11]]),
            frame_rate: u32::from_be_bytes([body[12], body[13], body[14], body[15]]),
        };

        let start = header.payload_offset as usize;
        let end = (size as usize)
            .checked_sub(header.padding as usize)
            .ok_or_else(|| {
                DemuxError::invalid_chunk(
                    offset,
                    format!("padding {} exceeds chunk size {size}", header.padding),
                )
            })?;
        if start < MIN_HEADER_LEN || start > end {
            return Err(DemuxError::invalid_chunk(
                offset,
                format!("payload range {start}..{end} is out of bounds"),
            ));
        }

        body.truncate(end);
        let payload = body.split_off(start);

        Ok(Some(Chunk { header, payload }))
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, DemuxError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}

/// Fill `buf` as far as the reader allows, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, DemuxError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DemuxError::Io(e)),
        }
    }
    Ok(filled)
}

/// Encode a chunk with the standard 0x18-byte header and the given padding.
///
/// The demuxer never writes USM data; this is used to build fixtures.
pub fn encode_chunk(
    kind: ChunkKind,
    channel: u8,
    payload_type: PayloadType,
    payload: &[u8],
    padding: u16,
) -> Vec<u8> {
    const HEADER_LEN: u8 = 0x18;
    let size = HEADER_LEN as u32 + payload.len() as u32 + padding as u32;

    let mut out = Vec::with_capacity(8 + size as usize);
    out.extend_from_slice(&kind.signature());
    out.extend_from_slice(&size.to_be_bytes());
    out.push(0);
    out.push(HEADER_LEN);
    out.extend_from_slice(&padding.to_be_bytes());
    out.push(channel);
    out.extend_from_slice(&[0, 0]);
    out.push(match payload_type {
        PayloadType::Stream => 0,
        PayloadType::Header => 1,
        PayloadType::SectionEnd => 2,
        PayloadType::Metadata => 3,
    });
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&30u32.to_be_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(payload);
    out.resize(out.len() + padding as usize, 0);
    out
}
