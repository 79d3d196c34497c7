//! Serialization for VoxelGrid
//!
//! Mixed text header + binary data format.
//!
//! ```text
//! \nVoxelGrid Version 1\n
//! x = X, y = Y, z = Z\n
//! format = uint8, nbytes = N\n
//! <raw voxel data, little-endian, N bytes>
//! \n
//! ```

use super::{GridData, VoxelData, VoxelFormat, VoxelGrid, check_dims, voxel_count};
use crate::error::{Error, Result};
use glam::UVec3;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Grid format version
const GRID_VERSION: i32 = 1;

/// Maximum voxel count accepted when reading (2^30)
const MAX_GRID_VOXELS: u64 = 1 << 30;

/// Maximum input size in bytes.
const MAX_INPUT_SIZE: u64 = 2_000_000_000;

impl VoxelGrid {
    /// Read a grid from a reader.
    pub fn read_from_reader(reader: &mut impl Read) -> Result<Self> {
        let mut buf = Vec::new();
        reader.take(MAX_INPUT_SIZE + 1).read_to_end(&mut buf)?;
        if buf.len() as u64 > MAX_INPUT_SIZE {
            return Err(Error::DecodeError(format!(
                "input too large: exceeds maximum allowed size of {MAX_INPUT_SIZE} bytes"
            )));
        }
        Self::read_from_bytes(&buf)
    }

    /// Read a grid from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_from_reader(&mut BufReader::new(file))
    }

    /// Read a grid from a byte slice.
    pub fn read_from_bytes(data: &[u8]) -> Result<Self> {
        let header = parse_grid_header(data)?;

        let nvoxels = voxel_count(header.dims) as u64;
        if nvoxels > MAX_GRID_VOXELS {
            return Err(Error::DecodeError(format!(
                "grid too large: {nvoxels} voxels exceeds maximum {MAX_GRID_VOXELS}"
            )));
        }
        let expected_nbytes = nvoxels * header.format.bytes_per_voxel() as u64;
        if header.nbytes != expected_nbytes {
            return Err(Error::DecodeError(format!(
                "grid nbytes mismatch: header says {} but voxels * bpv = {expected_nbytes}",
                header.nbytes
            )));
        }

        let binary_end = header.end + header.nbytes as usize;
        if data.len() < binary_end {
            return Err(Error::DecodeError(format!(
                "grid data truncated: need {binary_end} bytes but only have {}",
                data.len()
            )));
        }
        let binary = &data[header.end..binary_end];

        let voxels = match header.format {
            VoxelFormat::UInt8 => VoxelData::UInt8(binary.to_vec()),
            VoxelFormat::UInt16 => VoxelData::UInt16(
                binary
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect(),
            ),
            VoxelFormat::Float32 => VoxelData::Float32(
                binary
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
        };

        GridData::new(header.dims, voxels).map(VoxelGrid::from_inner)
    }

    /// Write a grid to a writer.
    pub fn write_to_writer(&self, writer: &mut impl Write) -> Result<()> {
        let dims = self.dimensions();
        let nbytes = self.num_voxels() as u64 * self.bytes_per_voxel() as u64;
        writeln!(writer, "\nVoxelGrid Version {GRID_VERSION}")?;
        writeln!(writer, "x = {}, y = {}, z = {}", dims.x, dims.y, dims.z)?;
        writeln!(
            writer,
            "format = {}, nbytes = {nbytes}",
            self.format().name()
        )?;

        match &self.inner.data {
            VoxelData::UInt8(v) => writer.write_all(v)?,
            VoxelData::UInt16(v) => {
                for &val in v {
                    writer.write_all(&val.to_le_bytes())?;
                }
            }
            VoxelData::Float32(v) => {
                for &val in v {
                    writer.write_all(&val.to_le_bytes())?;
                }
            }
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Write a grid to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a grid to a byte vector.
    pub fn write_to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to_writer(&mut buf)?;
        Ok(buf)
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

struct GridHeader {
    dims: UVec3,
    format: VoxelFormat,
    nbytes: u64,
    end: usize,
}

/// Parse the text header in front of the binary voxel payload.
fn parse_grid_header(data: &[u8]) -> Result<GridHeader> {
    let end = find_header_end_by_lines(data, 3)?;
    let text = std::str::from_utf8(&data[..end])
        .map_err(|e| Error::DecodeError(format!("grid header is not valid UTF-8: {e}")))?;
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let version_prefix = "VoxelGrid Version ";
    let version: i32 = lines
        .first()
        .and_then(|l| l.strip_prefix(version_prefix))
        .ok_or_else(|| Error::DecodeError("grid version line not found".into()))?
        .trim()
        .parse()
        .map_err(|e| Error::DecodeError(format!("failed to parse grid version: {e}")))?;
    if version != GRID_VERSION {
        return Err(Error::DecodeError(format!(
            "invalid grid version: {version}"
        )));
    }

    let dim_line = lines
        .get(1)
        .ok_or_else(|| Error::DecodeError("grid dimension line not found".into()))?;
    let parts: Vec<&str> = dim_line.split(',').collect();
    if parts.len() != 3 {
        return Err(Error::DecodeError(format!(
            "invalid dimension line: '{dim_line}'"
        )));
    }
    let dims = UVec3::new(
        parse_key_value(parts[0], "x")?,
        parse_key_value(parts[1], "y")?,
        parse_key_value(parts[2], "z")?,
    );
    check_dims(dims).map_err(|e| Error::DecodeError(e.to_string()))?;

    let format_line = lines
        .get(2)
        .ok_or_else(|| Error::DecodeError("grid format line not found".into()))?;
    let parts: Vec<&str> = format_line.split(',').collect();
    if parts.len() != 2 {
        return Err(Error::DecodeError(format!(
            "invalid format line: '{format_line}'"
        )));
    }
    let format_name = key_value(parts[0], "format")?;
    let format = VoxelFormat::from_name(format_name)
        .map_err(|e| Error::DecodeError(e.to_string()))?;
    let nbytes = parse_key_value(parts[1], "nbytes")?;

    Ok(GridHeader {
        dims,
        format,
        nbytes,
        end,
    })
}

/// Find the byte offset right after the `count`-th non-empty text line.
fn find_header_end_by_lines(data: &[u8], count: usize) -> Result<usize> {
    let scan_limit = data.len().min(512);
    let mut found = 0;
    let mut pos = 0;

    while pos < scan_limit {
        let Some(offset) = data[pos..scan_limit].iter().position(|&b| b == b'\n') else {
            break;
        };
        let line_end = pos + offset;
        if data[pos..line_end].iter().any(|&b| b != b' ' && b != b'\r') {
            found += 1;
            if found == count {
                return Ok(line_end + 1);
            }
        }
        pos = line_end + 1;
    }
    Err(Error::DecodeError(format!(
        "could not find end of text header (expected {count} header lines)"
    )))
}

/// Split `"key = value"` and return the value.
fn key_value<'a>(part: &'a str, key: &str) -> Result<&'a str> {
    let (k, v) = part
        .split_once('=')
        .ok_or_else(|| Error::DecodeError(format!("expected '{key} = ...', got '{part}'")))?;
    if k.trim() != key {
        return Err(Error::DecodeError(format!(
            "expected key '{key}', got '{}'",
            k.trim()
        )));
    }
    Ok(v.trim())
}

fn parse_key_value<T: std::str::FromStr>(part: &str, key: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    key_value(part, key)?
        .parse()
        .map_err(|e| Error::DecodeError(format!("failed to parse {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_uint16_roundtrip() {
        let grid = VoxelGrid::from_u16(UVec3::new(3, 2, 2), (0..12).map(|v| v * 1000).collect())
            .unwrap();
        let bytes = grid.write_to_bytes().unwrap();
        let back = VoxelGrid::read_from_bytes(&bytes).unwrap();
        assert_eq!(back, grid);
        assert_eq!(back.voxel(IVec3::new(2, 1, 1)), Some(11000.0));
    }

    #[test]
    fn test_header_text() {
        let grid = VoxelGrid::new(UVec3::new(2, 3, 4), VoxelFormat::Float32).unwrap();
        let bytes = grid.write_to_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("\nVoxelGrid Version 1\nx = 2, y = 3, z = 4\n"));
        assert!(text.contains("format = float, nbytes = 96"));
    }

    #[test]
    fn test_truncated_data_rejected() {
        let grid = VoxelGrid::new(UVec3::splat(4), VoxelFormat::UInt8).unwrap();
        let bytes = grid.write_to_bytes().unwrap();
        assert!(VoxelGrid::read_from_bytes(&bytes[..bytes.len() - 10]).is_err());
    }

    #[test]
    fn test_bad_version_rejected() {
        let data = b"\nVoxelGrid Version 7\nx = 1, y = 1, z = 1\nformat = uint8, nbytes = 1\n\0\n";
        assert!(VoxelGrid::read_from_bytes(data).is_err());
    }
}
