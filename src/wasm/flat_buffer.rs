//! Flat line table for the WASM bridge
//!
//! The line table is copied into a single `i32` buffer that JavaScript
//! reads as an `Int32Array`, avoiding per-line object allocation.
//!
//! ## Layout
//! ```text
//! Header:
//! [0]     MAGIC (0x524C4159 = "RLAY")
//! [1]     SCHEMA_VERSION (currently 1)
//! [2]     line_count
//! [3]     layout height
//! [4]     layout width
//! [5]     flags (bit0 = right-to-left)
//! [6]     document version, low 31 bits
//! [7]     reserved (0)
//!
//! Per line (I32_PER_LINE values):
//!   [y, x, height, descent, paragraph_index, first_char, char_count, run_count]
//! ```

use crate::document::Document;
use crate::layout::Layout;

/// Magic number for format validation: "RLAY"
pub const MAGIC: i32 = 0x524C_4159;

/// Bumped whenever the per-line record changes
pub const SCHEMA_VERSION: i32 = 1;

/// Header size in i32 elements
pub const HEADER_SIZE: usize = 8;

/// Number of i32 values per line
pub const I32_PER_LINE: usize = 8;

pub const FLAG_RIGHT_TO_LEFT: i32 = 0b0001;

/// One decoded line record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRecord {
    pub y: i32,
    pub x: i32,
    pub height: i32,
    pub descent: i32,
    pub paragraph_index: i32,
    pub first_char: i32,
    pub char_count: i32,
    pub run_count: i32,
}

/// Decoded header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferHeader {
    pub line_count: usize,
    pub height: i32,
    pub width: i32,
    pub right_to_left: bool,
    pub version: i32,
}

/// Reusable buffer holding the header and line records
#[derive(Debug, Default)]
pub struct LineBuffer {
    data: Vec<i32>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the current line table of `layout`
    pub fn fill(&mut self, document: &Document, layout: &mut Layout) {
        self.prepare(layout.line_count());
        let flags = if layout.current_right_to_left() {
            FLAG_RIGHT_TO_LEFT
        } else {
            0
        };
        self.write_header(
            layout.current_layout_height(),
            layout.current_layout_width(),
            flags,
            document.version(),
        );

        let mut records = Vec::with_capacity(layout.line_count());
        layout.visit_lines(document, i32::MIN, i32::MAX, |paragraph, line, runs| {
            let first_char = runs
                .iter()
                .map(|visual| visual.slice.char_start)
                .min()
                .unwrap_or(0);
            let end_char = runs
                .iter()
                .map(|visual| visual.slice.char_end())
                .max()
                .unwrap_or(0);
            records.push(LineRecord {
                y: line.y,
                x: line.x,
                height: line.height,
                descent: line.descent,
                paragraph_index: line.paragraph_index as i32,
                first_char: (paragraph.char_index + first_char) as i32,
                char_count: end_char.saturating_sub(first_char) as i32,
                run_count: line.script_run_count as i32,
            });
        });
        for record in &records {
            self.push_line(record);
        }
        self.finalize();
    }

    /// Clear, reserving room for `line_count` records. JS may hold a view
    /// into the previous allocation, so it is reused when large enough.
    pub fn prepare(&mut self, line_count: usize) {
        let needed = HEADER_SIZE + line_count * I32_PER_LINE;
        self.data.clear();
        self.data.reserve(needed);
    }

    fn write_header(&mut self, height: i32, width: i32, flags: i32, version: u64) {
        self.data.extend_from_slice(&[
            MAGIC,
            SCHEMA_VERSION,
            0, // line count, set in finalize
            height,
            width,
            flags,
            (version & 0x7FFF_FFFF) as i32,
            0,
        ]);
    }

    fn push_line(&mut self, record: &LineRecord) {
        self.data.extend_from_slice(&[
            record.y,
            record.x,
            record.height,
            record.descent,
            record.paragraph_index,
            record.first_char,
            record.char_count,
            record.run_count,
        ]);
    }

    /// Sync the line count with the records written
    fn finalize(&mut self) {
        if self.data.len() < HEADER_SIZE {
            return;
        }
        let lines = (self.data.len() - HEADER_SIZE) / I32_PER_LINE;
        self.data[2] = lines as i32;
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    pub fn ptr(&self) -> u32 {
        self.data.as_ptr() as u32
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn header(&self) -> Option<BufferHeader> {
        decode_header(&self.data)
    }

    pub fn line(&self, index: usize) -> Option<LineRecord> {
        decode_line(&self.data, index)
    }
}

/// Validate and read the header of a buffer
pub fn decode_header(data: &[i32]) -> Option<BufferHeader> {
    if data.len() < HEADER_SIZE || data[0] != MAGIC || data[1] != SCHEMA_VERSION {
        return None;
    }
    Some(BufferHeader {
        line_count: data[2].max(0) as usize,
        height: data[3],
        width: data[4],
        right_to_left: data[5] & FLAG_RIGHT_TO_LEFT != 0,
        version: data[6],
    })
}

pub fn decode_line(data: &[i32], index: usize) -> Option<LineRecord> {
    let header = decode_header(data)?;
    if index >= header.line_count {
        return None;
    }
    let start = HEADER_SIZE + index * I32_PER_LINE;
    let fields = data.get(start..start + I32_PER_LINE)?;
    Some(LineRecord {
        y: fields[0],
        x: fields[1],
        height: fields[2],
        descent: fields[3],
        paragraph_index: fields[4],
        first_char: fields[5],
        char_count: fields[6],
        run_count: fields[7],
    })
}
