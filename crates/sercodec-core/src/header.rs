use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SerError};

/// Total size of the fixed SER header in bytes.
pub const SER_HEADER_SIZE: usize = 178;

/// File id every SER file starts with.
pub const SER_FILE_ID: &str = "LUCAM-RECORDER";

/// On-disk width of the file id field.
pub const FILE_ID_WIDTH: usize = 14;

/// On-disk width of the observer/instrument/telescope fields.
pub const TEXT_FIELD_WIDTH: usize = 40;

/// SER file header (178 bytes on disk, little-endian throughout).
///
/// Text fields are null/space padded on disk and trimmed in memory.
/// `date_time` and `date_time_utc` count 100-nanosecond ticks since
/// midnight Jan 1, year 1; the codec treats them as opaque integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerMetadata {
    pub file_id: String,
    pub lu_id: u32,
    pub color_id: u32,
    /// Informational byte-order flag. Header and timestamp fields are
    /// always little-endian on the wire regardless of this value.
    pub little_endian: bool,
    pub image_width: u32,
    pub image_height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerMetadata {
    /// Header with the given geometry, mono color layout, and empty text
    /// fields.
    pub fn new(image_width: u32, image_height: u32, pixel_depth: u32, frame_count: u32) -> Self {
        Self {
            file_id: SER_FILE_ID.to_string(),
            lu_id: 0,
            color_id: 0,
            little_endian: true,
            image_width,
            image_height,
            pixel_depth,
            frame_count,
            observer: String::new(),
            instrument: String::new(),
            telescope: String::new(),
            date_time: 0,
            date_time_utc: 0,
        }
    }

    /// Sample width selected once from `pixel_depth`.
    pub fn sample_format(&self) -> SampleFormat {
        SampleFormat::from_pixel_depth(self.pixel_depth)
    }

    /// Total bytes per frame. Saturates on absurd dimensions so hostile
    /// headers surface as truncation rather than overflow.
    pub fn frame_byte_size(&self) -> usize {
        (self.image_width as usize)
            .saturating_mul(self.image_height as usize)
            .saturating_mul(self.sample_format().bytes_per_sample())
    }

    pub fn color_mode(&self) -> ColorMode {
        match self.color_id {
            0 => ColorMode::Mono,
            8 => ColorMode::BayerRGGB,
            9 => ColorMode::BayerGRBG,
            10 => ColorMode::BayerGBRG,
            11 => ColorMode::BayerBGGR,
            other => ColorMode::Unknown(other),
        }
    }

    /// Check the invariants a header must satisfy before encoding.
    pub fn validate(&self) -> Result<()> {
        if self.file_id != SER_FILE_ID {
            return Err(SerError::Validation(format!(
                "file_id must be {SER_FILE_ID:?}, got {:?}",
                self.file_id
            )));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(SerError::Validation(format!(
                "image dimensions must be nonzero, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        for (name, value) in [
            ("observer", &self.observer),
            ("instrument", &self.instrument),
            ("telescope", &self.telescope),
        ] {
            if value.len() > TEXT_FIELD_WIDTH {
                return Err(SerError::Validation(format!(
                    "{name} is {} bytes, must fit in {TEXT_FIELD_WIDTH}",
                    value.len()
                )));
            }
        }
        Ok(())
    }
}

/// Color/Bayer layout identified by `color_id`.
///
/// Purely informational: debayering is an external collaborator and the
/// codec never acts on this value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    Mono,
    BayerRGGB,
    BayerGRBG,
    BayerGBRG,
    BayerBGGR,
    Unknown(u32),
}

/// Width of one pixel sample on disk (1 byte for 8-bit, 2 for 9-16 bit).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
}

impl SampleFormat {
    pub fn from_pixel_depth(pixel_depth: u32) -> Self {
        if pixel_depth <= 8 {
            SampleFormat::U8
        } else {
            SampleFormat::U16
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::U16 => 2,
        }
    }
}

/// Parse the fixed-size header at the start of a SER byte stream.
pub fn parse_header(buf: &[u8]) -> Result<SerMetadata> {
    if buf.len() < SER_HEADER_SIZE {
        return Err(SerError::Truncated {
            context: "header",
            expected: SER_HEADER_SIZE,
            actual: buf.len(),
        });
    }

    let file_id = trim_padding(&buf[..FILE_ID_WIDTH]);
    if file_id != SER_FILE_ID {
        return Err(SerError::Format(format!(
            "bad file id {file_id:?}, expected {SER_FILE_ID:?}"
        )));
    }

    let mut cursor = Cursor::new(&buf[FILE_ID_WIDTH..42]);
    let lu_id = cursor.read_u32::<LittleEndian>()?;
    let color_id = cursor.read_u32::<LittleEndian>()?;
    let little_endian = cursor.read_u32::<LittleEndian>()? != 0;
    let image_width = cursor.read_u32::<LittleEndian>()?;
    let image_height = cursor.read_u32::<LittleEndian>()?;
    let pixel_depth = cursor.read_u32::<LittleEndian>()?;
    let frame_count = cursor.read_u32::<LittleEndian>()?;

    let observer = trim_padding(&buf[42..82]);
    let instrument = trim_padding(&buf[82..122]);
    let telescope = trim_padding(&buf[122..162]);

    let mut cursor = Cursor::new(&buf[162..SER_HEADER_SIZE]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if image_width == 0 || image_height == 0 {
        return Err(SerError::Format(format!(
            "invalid image dimensions {image_width}x{image_height}"
        )));
    }

    Ok(SerMetadata {
        file_id,
        lu_id,
        color_id,
        little_endian,
        image_width,
        image_height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

/// Encode a header into its fixed 178-byte form.
pub fn encode_header(metadata: &SerMetadata) -> Result<Vec<u8>> {
    metadata.validate()?;

    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);
    buf.extend_from_slice(&pad_to_width(&metadata.file_id, FILE_ID_WIDTH, "file_id")?);
    buf.write_u32::<LittleEndian>(metadata.lu_id)?;
    buf.write_u32::<LittleEndian>(metadata.color_id)?;
    buf.write_u32::<LittleEndian>(u32::from(metadata.little_endian))?;
    buf.write_u32::<LittleEndian>(metadata.image_width)?;
    buf.write_u32::<LittleEndian>(metadata.image_height)?;
    buf.write_u32::<LittleEndian>(metadata.pixel_depth)?;
    buf.write_u32::<LittleEndian>(metadata.frame_count)?;
    buf.extend_from_slice(&pad_to_width(&metadata.observer, TEXT_FIELD_WIDTH, "observer")?);
    buf.extend_from_slice(&pad_to_width(
        &metadata.instrument,
        TEXT_FIELD_WIDTH,
        "instrument",
    )?);
    buf.extend_from_slice(&pad_to_width(
        &metadata.telescope,
        TEXT_FIELD_WIDTH,
        "telescope",
    )?);
    buf.write_u64::<LittleEndian>(metadata.date_time)?;
    buf.write_u64::<LittleEndian>(metadata.date_time_utc)?;

    debug_assert_eq!(buf.len(), SER_HEADER_SIZE);
    Ok(buf)
}

/// Decode a fixed-width text field, stripping trailing null bytes and
/// surrounding whitespace.
pub fn trim_padding(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

/// Right-pad a text field with null bytes to its on-disk width, or fail
/// if its UTF-8 form does not fit.
pub fn pad_to_width(s: &str, width: usize, field: &'static str) -> Result<Vec<u8>> {
    let bytes = s.as_bytes();
    if bytes.len() > width {
        return Err(SerError::Validation(format!(
            "{field} is {} bytes, must fit in {width}",
            bytes.len()
        )));
    }
    let mut out = vec![0u8; width];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}
