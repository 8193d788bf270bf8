//! Visual ordering of the runs on a line

use crate::layout::script::{RunSlice, ScriptLine, ScriptParagraph};
use crate::layout::shaper::TextShaper;
use smallvec::SmallVec;

/// A run slice placed on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualRun {
    /// Index into the paragraph's script runs
    pub run_index: usize,
    /// Offset from the layout's start edge: the left edge for left-to-right
    /// layouts, the right edge for right-to-left ones
    pub x: i32,
    pub slice: RunSlice,
}

impl VisualRun {
    pub fn width(&self) -> i32 {
        self.slice.width
    }

    /// Left edge in layout coordinates
    pub fn left(&self, layout_width: i32, right_to_left: bool) -> i32 {
        if right_to_left {
            layout_width - self.x - self.slice.width
        } else {
            self.x
        }
    }
}

/// Computes the left-to-right display order of a line's runs
#[derive(Debug, Default)]
pub struct VisualMapper {
    levels: SmallVec<[u8; 16]>,
    visual_to_logical: Vec<usize>,
}

impl VisualMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `out` with the runs of `line` in the order they are met walking
    /// from the layout's start edge, each with its offset from that edge.
    pub fn map_line(
        &mut self,
        paragraph: &ScriptParagraph,
        line: &ScriptLine,
        right_to_left: bool,
        shaper: &mut dyn TextShaper,
        out: &mut Vec<VisualRun>,
    ) {
        out.clear();
        let count = line.script_run_count;
        if count == 0 {
            return;
        }

        self.levels.clear();
        self.levels.extend(
            paragraph.runs[line.script_runs()]
                .iter()
                .map(|run| run.analysis.bidi_level),
        );
        shaper.visual_order(&self.levels, &mut self.visual_to_logical);
        debug_assert_eq!(self.visual_to_logical.len(), count);

        let mut x = line.x;
        for position in 0..count {
            // Right-to-left layouts are walked from the right edge
            let visual = if right_to_left { count - 1 - position } else { position };
            let logical = self.visual_to_logical.get(visual).copied().unwrap_or(visual);
            let run_index = line.script_run_index + logical;
            let (leading, trailing) = line.truncation_for(run_index);
            let slice = paragraph.measure_run(run_index, leading, trailing);
            out.push(VisualRun { run_index, x, slice });
            x += slice.width;
        }
    }
}
