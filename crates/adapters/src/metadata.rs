//! Best-effort EXIF extraction from JPEG files.
//!
//! Walks the JPEG marker stream to the APP1 `Exif\0\0` segment, then walks
//! the embedded TIFF structure (both byte orders) over IFD0, the Exif
//! sub-IFD and the GPS IFD. Absent or corrupt metadata yields the empty
//! record; only failing to read the file at all is an error.

use std::path::Path;

use fotolab_application::{ApplicationError, CaptureMetadata, MetadataReader};

#[derive(Debug, Default)]
pub struct ExifMetadataReader;

impl MetadataReader for ExifMetadataReader {
    fn read_metadata(&self, path: &Path) -> Result<CaptureMetadata, ApplicationError> {
        let bytes =
            std::fs::read(path).map_err(|error| ApplicationError::Io(error.to_string()))?;
        Ok(parse_capture_metadata(&bytes))
    }
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";

// IFD0 tags
const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_ORIENTATION: u16 = 0x0112;
const TAG_MODIFY_DATE: u16 = 0x0132;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_GPS_IFD: u16 = 0x8825;

// Exif sub-IFD tags
const TAG_EXPOSURE_TIME: u16 = 0x829A;
const TAG_F_NUMBER: u16 = 0x829D;
const TAG_ISO: u16 = 0x8827;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_FOCAL_LENGTH: u16 = 0x920A;
const TAG_PIXEL_X: u16 = 0xA002;
const TAG_PIXEL_Y: u16 = 0xA003;
const TAG_LENS_MODEL: u16 = 0xA434;

// GPS IFD tags
const TAG_GPS_LAT_REF: u16 = 0x0001;
const TAG_GPS_LAT: u16 = 0x0002;
const TAG_GPS_LON_REF: u16 = 0x0003;
const TAG_GPS_LON: u16 = 0x0004;

/// Parse the capture record out of raw JPEG bytes. Never fails: anything
/// unparseable degrades to the empty record.
pub fn parse_capture_metadata(bytes: &[u8]) -> CaptureMetadata {
    let Some(tiff) = find_jpeg_app1_exif(bytes) else {
        return CaptureMetadata::default();
    };
    parse_tiff_fields(tiff).unwrap_or_default()
}

/// Walk JPEG markers up to the scan data and return the TIFF payload of the
/// first APP1 segment carrying an `Exif\0\0` header.
fn find_jpeg_app1_exif(data: &[u8]) -> Option<&[u8]> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        match marker {
            // Markers without a length field
            0xD8 | 0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // SOS or EOI: metadata segments only appear before image data
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if length < 2 || pos + 2 + length > data.len() {
            return None;
        }
        let segment = &data[pos + 4..pos + 2 + length];
        if marker == 0xE1 && segment.starts_with(EXIF_HEADER) {
            return Some(&segment[EXIF_HEADER.len()..]);
        }
        pos += 2 + length;
    }
    None
}

fn parse_tiff_fields(tiff_bytes: &[u8]) -> Option<CaptureMetadata> {
    let tiff = Tiff::new(tiff_bytes)?;
    let ifd0_offset = tiff.u32_at(4)? as usize;

    let mut meta = CaptureMetadata::default();
    let mut exif_ifd = None;
    let mut gps_ifd = None;

    for entry in tiff.entries(ifd0_offset) {
        match entry.tag {
            TAG_MAKE => meta.make = tiff.ascii(&entry),
            TAG_MODEL => meta.model = tiff.ascii(&entry),
            TAG_ORIENTATION => meta.orientation = tiff.short(&entry),
            TAG_MODIFY_DATE => meta.modify_date = tiff.ascii(&entry),
            TAG_EXIF_IFD => exif_ifd = tiff.long(&entry).map(|value| value as usize),
            TAG_GPS_IFD => gps_ifd = tiff.long(&entry).map(|value| value as usize),
            _ => {}
        }
    }

    if let Some(offset) = exif_ifd {
        for entry in tiff.entries(offset) {
            match entry.tag {
                TAG_EXPOSURE_TIME => {
                    meta.exposure_time = tiff.rational(&entry).and_then(format_exposure)
                }
                TAG_F_NUMBER => {
                    meta.f_number = tiff
                        .rational(&entry)
                        .and_then(ratio_value)
                        .map(|f| (f * 10.0).round() / 10.0)
                }
                TAG_ISO => meta.iso = tiff.short_or_long(&entry),
                TAG_DATE_TIME_ORIGINAL => meta.date_time_original = tiff.ascii(&entry),
                TAG_FOCAL_LENGTH => {
                    meta.focal_length_mm = tiff
                        .rational(&entry)
                        .and_then(ratio_value)
                        .map(|f| f.round() as u32)
                }
                TAG_PIXEL_X => meta.width = tiff.short_or_long(&entry),
                TAG_PIXEL_Y => meta.height = tiff.short_or_long(&entry),
                TAG_LENS_MODEL => meta.lens_model = tiff.ascii(&entry),
                _ => {}
            }
        }
    }

    if let Some(offset) = gps_ifd {
        let mut lat_ref = None;
        let mut lat = None;
        let mut lon_ref = None;
        let mut lon = None;
        for entry in tiff.entries(offset) {
            match entry.tag {
                TAG_GPS_LAT_REF => lat_ref = tiff.ascii(&entry),
                TAG_GPS_LAT => lat = tiff.degrees(&entry),
                TAG_GPS_LON_REF => lon_ref = tiff.ascii(&entry),
                TAG_GPS_LON => lon = tiff.degrees(&entry),
                _ => {}
            }
        }
        meta.gps_latitude = signed_coordinate(lat, lat_ref.as_deref(), "S");
        meta.gps_longitude = signed_coordinate(lon, lon_ref.as_deref(), "W");
    }

    Some(meta)
}

fn signed_coordinate(
    value: Option<f64>,
    reference: Option<&str>,
    negative_ref: &str,
) -> Option<f64> {
    let value = value?;
    if reference == Some(negative_ref) {
        Some(-value)
    } else {
        Some(value)
    }
}

fn ratio_value((numerator, denominator): (u32, u32)) -> Option<f32> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f32 / denominator as f32)
}

fn format_exposure((numerator, denominator): (u32, u32)) -> Option<String> {
    if numerator == 0 || denominator == 0 {
        return None;
    }
    let seconds = numerator as f64 / denominator as f64;
    if seconds < 1.0 {
        Some(format!("1/{}", (1.0 / seconds).round() as u32))
    } else if seconds.fract() == 0.0 {
        Some(format!("{}s", seconds as u64))
    } else {
        Some(format!("{seconds:.1}s"))
    }
}

// TIFF field types
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

/// A sanity bound on IFD entry counts; real files carry dozens of entries.
const MAX_IFD_ENTRIES: usize = 512;

struct IfdEntry {
    tag: u16,
    field_type: u16,
    count: u32,
    /// Byte position of the entry's 4-byte value/offset field.
    value_pos: usize,
}

struct Tiff<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl<'a> Tiff<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        if data.len() < 8 {
            return None;
        }
        let big_endian = match &data[0..2] {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let tiff = Self { data, big_endian };
        if tiff.u16_at(2)? != 42 {
            return None;
        }
        Some(tiff)
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let bytes = self.data.get(offset..offset + 2)?;
        Some(if self.big_endian {
            u16::from_be_bytes([bytes[0], bytes[1]])
        } else {
            u16::from_le_bytes([bytes[0], bytes[1]])
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let bytes = self.data.get(offset..offset + 4)?;
        Some(if self.big_endian {
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        } else {
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
        })
    }

    fn entries(&self, ifd_offset: usize) -> Vec<IfdEntry> {
        let Some(count) = self.u16_at(ifd_offset) else {
            return Vec::new();
        };
        let count = (count as usize).min(MAX_IFD_ENTRIES);

        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            let entry_pos = ifd_offset + 2 + index * 12;
            let Some(tag) = self.u16_at(entry_pos) else {
                break;
            };
            let Some(field_type) = self.u16_at(entry_pos + 2) else {
                break;
            };
            let Some(value_count) = self.u32_at(entry_pos + 4) else {
                break;
            };
            entries.push(IfdEntry {
                tag,
                field_type,
                count: value_count,
                value_pos: entry_pos + 8,
            });
        }
        entries
    }

    /// Position of the entry's payload: inline when it fits in four bytes,
    /// behind an offset otherwise.
    fn payload_pos(&self, entry: &IfdEntry, byte_len: usize) -> Option<usize> {
        if byte_len <= 4 {
            Some(entry.value_pos)
        } else {
            self.u32_at(entry.value_pos).map(|offset| offset as usize)
        }
    }

    fn ascii(&self, entry: &IfdEntry) -> Option<String> {
        if entry.field_type != TYPE_ASCII || entry.count == 0 {
            return None;
        }
        let len = entry.count as usize;
        let pos = self.payload_pos(entry, len)?;
        let bytes = self.data.get(pos..pos + len)?;
        let text = String::from_utf8_lossy(bytes)
            .trim_end_matches('\0')
            .trim()
            .to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn short(&self, entry: &IfdEntry) -> Option<u16> {
        if entry.field_type != TYPE_SHORT || entry.count == 0 {
            return None;
        }
        self.u16_at(entry.value_pos)
    }

    fn long(&self, entry: &IfdEntry) -> Option<u32> {
        if entry.field_type != TYPE_LONG || entry.count == 0 {
            return None;
        }
        self.u32_at(entry.value_pos)
    }

    fn short_or_long(&self, entry: &IfdEntry) -> Option<u32> {
        match entry.field_type {
            TYPE_SHORT => self.short(entry).map(u32::from),
            TYPE_LONG => self.long(entry),
            _ => None,
        }
    }

    fn rational(&self, entry: &IfdEntry) -> Option<(u32, u32)> {
        if entry.field_type != TYPE_RATIONAL || entry.count == 0 {
            return None;
        }
        let pos = self.u32_at(entry.value_pos)? as usize;
        Some((self.u32_at(pos)?, self.u32_at(pos + 4)?))
    }

    /// Degrees/minutes/seconds triple folded into decimal degrees.
    fn degrees(&self, entry: &IfdEntry) -> Option<f64> {
        if entry.field_type != TYPE_RATIONAL || entry.count < 3 {
            return None;
        }
        let base = self.u32_at(entry.value_pos)? as usize;
        let mut parts = [0.0_f64; 3];
        for (index, part) in parts.iter_mut().enumerate() {
            let numerator = self.u32_at(base + index * 8)?;
            let denominator = self.u32_at(base + index * 8 + 4)?;
            if denominator == 0 {
                return None;
            }
            *part = numerator as f64 / denominator as f64;
        }
        Some(parts[0] + parts[1] / 60.0 + parts[2] / 3600.0)
    }
}
