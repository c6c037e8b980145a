//! Minimal ISO-BMFF (MP4) reading.
//!
//! Walks just enough of the box structure to locate the GoPro GPMF metadata
//! track (sample description format `gpmd`) and resolve its sample tables
//! into timed payload locations. This is not a general MP4 demuxer.

use crate::error::{Result, TelemetryError};

/// Sample-table data for one track
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    pub sample_sizes: Vec<u32>,
    pub chunk_offsets: Vec<u64>,
    /// first_chunk, samples_per_chunk, sample_description_index
    pub sample_to_chunk: Vec<(u32, u32, u32)>,
    /// sample_count, sample_delta
    pub time_to_sample: Vec<(u32, u32)>,
    /// Media timescale in ticks per second
    pub timescale: u32,
}

/// File location and media time of one GPMF payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadLocation {
    pub offset: u64,
    pub size: u32,
    pub start_s: f64,
    pub duration_s: f64,
}

impl SampleTable {
    /// Resolve the raw tables into one location per sample.
    ///
    /// Samples are laid out consecutively within each chunk; chunk offsets
    /// are absolute file offsets. Start time and duration come from the
    /// time-to-sample deltas divided by the media timescale.
    pub fn payload_locations(&self) -> Result<Vec<PayloadLocation>> {
        let count = self.sample_sizes.len();
        if count == 0 {
            return Ok(Vec::new());
        }
        if self.timescale == 0 {
            return Err(TelemetryError::InvalidContainer(
                "media timescale is zero".to_string(),
            ));
        }
        if self.sample_to_chunk.is_empty() {
            return Err(TelemetryError::InvalidContainer(
                "empty sample-to-chunk table".to_string(),
            ));
        }

        let (times, durations) = self.sample_times(count)?;

        let mut locations = Vec::with_capacity(count);
        let mut sample_index = 0usize;
        for (chunk_index, &chunk_offset) in self.chunk_offsets.iter().enumerate() {
            let chunk_number = chunk_index as u32 + 1;
            let per_chunk = self.samples_per_chunk(chunk_number);
            let mut offset = chunk_offset;
            for _ in 0..per_chunk {
                if sample_index >= count {
                    break;
                }
                let size = self.sample_sizes[sample_index];
                locations.push(PayloadLocation {
                    offset,
                    size,
                    start_s: times[sample_index],
                    duration_s: durations[sample_index],
                });
                offset += size as u64;
                sample_index += 1;
            }
        }

        if sample_index < count {
            return Err(TelemetryError::InvalidContainer(format!(
                "chunk tables cover {} of {} samples",
                sample_index, count
            )));
        }
        Ok(locations)
    }

    /// Per-sample start time and duration in seconds
    fn sample_times(&self, count: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let scale = self.timescale as f64;
        let mut times = Vec::with_capacity(count);
        let mut durations = Vec::with_capacity(count);
        let mut ticks = 0u64;
        'outer: for &(sample_count, delta) in &self.time_to_sample {
            for _ in 0..sample_count {
                if times.len() == count {
                    break 'outer;
                }
                times.push(ticks as f64 / scale);
                durations.push(delta as f64 / scale);
                ticks += delta as u64;
            }
        }
        if times.len() < count {
            return Err(TelemetryError::InvalidContainer(format!(
                "time-to-sample table covers {} of {} samples",
                times.len(),
                count
            )));
        }
        Ok((times, durations))
    }

    /// Samples in the given 1-based chunk, per the sample-to-chunk runs
    fn samples_per_chunk(&self, chunk_number: u32) -> u32 {
        let mut per_chunk = 0;
        for &(first_chunk, samples, _) in &self.sample_to_chunk {
            if first_chunk > chunk_number {
                break;
            }
            per_chunk = samples;
        }
        per_chunk
    }
}

/// A box located within the file: four-character type plus content range
#[derive(Debug, Clone, Copy)]
struct BoxRange {
    fourcc: [u8; 4],
    start: usize,
    end: usize,
}

/// Locate the GPMF metadata track and return its timed payload locations
pub fn find_gpmf_payloads(data: &[u8]) -> Result<Vec<PayloadLocation>> {
    let top = parse_boxes(data, 0, data.len())?;
    let moov = find_box(&top, b"moov")
        .ok_or_else(|| TelemetryError::InvalidContainer("no moov box found".to_string()))?;

    let moov_children = parse_boxes(data, moov.start, moov.end)?;
    for trak in moov_children.iter().filter(|b| b.fourcc == *b"trak") {
        let trak_children = parse_boxes(data, trak.start, trak.end)?;
        let Some(mdia) = find_box(&trak_children, b"mdia") else {
            continue;
        };
        let mdia_children = parse_boxes(data, mdia.start, mdia.end)?;
        let Some(minf) = find_box(&mdia_children, b"minf") else {
            continue;
        };
        let minf_children = parse_boxes(data, minf.start, minf.end)?;
        let Some(stbl) = find_box(&minf_children, b"stbl") else {
            continue;
        };
        let stbl_children = parse_boxes(data, stbl.start, stbl.end)?;

        let Some(stsd) = find_box(&stbl_children, b"stsd") else {
            continue;
        };
        if sample_entry_format(data, stsd)? != *b"gpmd" {
            continue;
        }

        let mdhd = find_box(&mdia_children, b"mdhd").ok_or_else(|| {
            TelemetryError::InvalidContainer("metadata track has no mdhd box".to_string())
        })?;

        let table = SampleTable {
            sample_sizes: parse_stsz(data, require_box(&stbl_children, b"stsz")?)?,
            chunk_offsets: parse_chunk_offsets(data, &stbl_children)?,
            sample_to_chunk: parse_stsc(data, require_box(&stbl_children, b"stsc")?)?,
            time_to_sample: parse_stts(data, require_box(&stbl_children, b"stts")?)?,
            timescale: parse_mdhd_timescale(data, mdhd)?,
        };
        return table.payload_locations();
    }

    Err(TelemetryError::InvalidContainer(
        "no GPMF metadata track (gpmd) found".to_string(),
    ))
}

/// Walk sibling boxes in `data[start..end]`
fn parse_boxes(data: &[u8], start: usize, end: usize) -> Result<Vec<BoxRange>> {
    let mut boxes = Vec::new();
    let mut pos = start;
    while pos + 8 <= end {
        let size32 = be_u32(data, pos)? as usize;
        let fourcc = [data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]];
        let (content_start, box_end) = match size32 {
            0 => (pos + 8, end),
            1 => {
                let large = be_u64(data, pos + 8)?;
                if large < 16 {
                    return Err(TelemetryError::InvalidContainer(format!(
                        "box {} has invalid largesize {}",
                        fourcc_str(&fourcc),
                        large
                    )));
                }
                (pos + 16, pos + large as usize)
            }
            s if s < 8 => {
                return Err(TelemetryError::InvalidContainer(format!(
                    "box {} has invalid size {}",
                    fourcc_str(&fourcc),
                    s
                )))
            }
            s => (pos + 8, pos + s),
        };
        if box_end > end {
            return Err(TelemetryError::InvalidContainer(format!(
                "box {} extends past its parent",
                fourcc_str(&fourcc)
            )));
        }
        boxes.push(BoxRange {
            fourcc,
            start: content_start,
            end: box_end,
        });
        pos = box_end;
    }
    Ok(boxes)
}

fn find_box<'a>(boxes: &'a [BoxRange], fourcc: &[u8; 4]) -> Option<&'a BoxRange> {
    boxes.iter().find(|b| b.fourcc == *fourcc)
}

fn require_box<'a>(boxes: &'a [BoxRange], fourcc: &[u8; 4]) -> Result<&'a BoxRange> {
    find_box(boxes, fourcc).ok_or_else(|| {
        TelemetryError::InvalidContainer(format!(
            "metadata track has no {} box",
            fourcc_str(fourcc)
        ))
    })
}

/// Format of the first sample description entry
fn sample_entry_format(data: &[u8], stsd: &BoxRange) -> Result<[u8; 4]> {
    // Full box header (4) + entry count (4) + first entry size (4), then format
    let entry_count = be_u32(data, stsd.start + 4)?;
    if entry_count == 0 {
        return Err(TelemetryError::InvalidContainer(
            "stsd box has no sample entries".to_string(),
        ));
    }
    let format_pos = stsd.start + 12;
    if format_pos + 4 > stsd.end {
        return Err(TelemetryError::InvalidContainer(
            "stsd box is truncated".to_string(),
        ));
    }
    Ok([
        data[format_pos],
        data[format_pos + 1],
        data[format_pos + 2],
        data[format_pos + 3],
    ])
}

fn parse_mdhd_timescale(data: &[u8], mdhd: &BoxRange) -> Result<u32> {
    let version = *data
        .get(mdhd.start)
        .ok_or(TelemetryError::UnexpectedEof)?;
    // v0: creation/modification are 32-bit; v1: 64-bit
    let offset = match version {
        0 => mdhd.start + 12,
        1 => mdhd.start + 20,
        v => {
            return Err(TelemetryError::InvalidContainer(format!(
                "unsupported mdhd version {}",
                v
            )))
        }
    };
    be_u32(data, offset)
}

fn parse_stsz(data: &[u8], stsz: &BoxRange) -> Result<Vec<u32>> {
    let uniform_size = be_u32(data, stsz.start + 4)?;
    let count = be_u32(data, stsz.start + 8)? as usize;
    if uniform_size != 0 {
        return Ok(vec![uniform_size; count]);
    }
    let mut sizes = Vec::with_capacity(count);
    for i in 0..count {
        sizes.push(be_u32(data, stsz.start + 12 + i * 4)?);
    }
    Ok(sizes)
}

fn parse_chunk_offsets(data: &[u8], stbl_children: &[BoxRange]) -> Result<Vec<u64>> {
    if let Some(stco) = find_box(stbl_children, b"stco") {
        let count = be_u32(data, stco.start + 4)? as usize;
        let mut offsets = Vec::with_capacity(count);
        for i in 0..count {
            offsets.push(be_u32(data, stco.start + 8 + i * 4)? as u64);
        }
        return Ok(offsets);
    }
    if let Some(co64) = find_box(stbl_children, b"co64") {
        let count = be_u32(data, co64.start + 4)? as usize;
        let mut offsets = Vec::with_capacity(count);
        for i in 0..count {
            offsets.push(be_u64(data, co64.start + 8 + i * 8)?);
        }
        return Ok(offsets);
    }
    Err(TelemetryError::InvalidContainer(
        "metadata track has no stco or co64 box".to_string(),
    ))
}

fn parse_stsc(data: &[u8], stsc: &BoxRange) -> Result<Vec<(u32, u32, u32)>> {
    let count = be_u32(data, stsc.start + 4)? as usize;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let base = stsc.start + 8 + i * 12;
        entries.push((
            be_u32(data, base)?,
            be_u32(data, base + 4)?,
            be_u32(data, base + 8)?,
        ));
    }
    Ok(entries)
}

fn parse_stts(data: &[u8], stts: &BoxRange) -> Result<Vec<(u32, u32)>> {
    let count = be_u32(data, stts.start + 4)? as usize;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let base = stts.start + 8 + i * 8;
        entries.push((be_u32(data, base)?, be_u32(data, base + 4)?));
    }
    Ok(entries)
}

fn be_u32(data: &[u8], pos: usize) -> Result<u32> {
    if pos + 4 > data.len() {
        return Err(TelemetryError::UnexpectedEof);
    }
    Ok(u32::from_be_bytes([
        data[pos],
        data[pos + 1],
        data[pos + 2],
        data[pos + 3],
    ]))
}

fn be_u64(data: &[u8], pos: usize) -> Result<u64> {
    if pos + 8 > data.len() {
        return Err(TelemetryError::UnexpectedEof);
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[pos..pos + 8]);
    Ok(u64::from_be_bytes(bytes))
}

fn fourcc_str(fourcc: &[u8; 4]) -> String {
    String::from_utf8_lossy(fourcc).into_owned()
}
