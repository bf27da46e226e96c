//! Byte offset to line/column mapping.

/// Offsets of the first byte of every line.
pub struct LineIndex {
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                starts.push(to_u32(offset + 1));
            }
        }
        LineIndex { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: u32) -> u32 {
        to_u32(self.starts.partition_point(|&start| start <= offset))
    }

    /// Offset of the first byte of the line containing `offset`.
    pub fn line_start(&self, offset: u32) -> u32 {
        let line = self.line(offset) as usize;
        self.starts[line.saturating_sub(1)]
    }

    /// 1-based line and 0-based character column of `offset`.
    pub fn line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let start = self.line_start(offset) as usize;
        let end = (offset as usize).min(source.len());
        let col = source.get(start..end).map_or(0, |text| text.chars().count());
        (self.line(offset), to_u32(col))
    }
}

/// Offsets are bounded by the source length; sources larger than 4GB are
/// clamped.
pub(crate) fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests;
