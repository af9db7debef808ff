use crate::types::Category;
use crate::utils::{is_release_boundary, is_unreleased_heading};

pub fn find_unreleased_position<S: AsRef<str>>(lines: &[S]) -> Option<usize> {
    lines
        .iter()
        .position(|line| is_unreleased_heading(line.as_ref()))
}

/// End (exclusive) of the section that starts at `start_idx`
pub fn find_next_section_position<S: AsRef<str>>(lines: &[S], start_idx: usize) -> usize {
    lines
        .iter()
        .skip(start_idx + 1)
        .position(|line| is_release_boundary(line.as_ref()))
        .map_or(lines.len(), |pos| pos + start_idx + 1)
}

pub fn find_category_position<S: AsRef<str>>(
    lines: &[S],
    unreleased_idx: usize,
    category: Category,
) -> Option<usize> {
    let end = find_next_section_position(lines, unreleased_idx);
    let heading = category.heading();
    (unreleased_idx + 1..end).find(|&idx| lines[idx].as_ref().trim() == heading)
}

/// First non-blank line at or after `start_idx`, or the end of the document
pub fn skip_blank_lines<S: AsRef<str>>(lines: &[S], start_idx: usize) -> usize {
    lines
        .iter()
        .skip(start_idx)
        .position(|line| !line.as_ref().trim().is_empty())
        .map_or(lines.len(), |pos| pos + start_idx)
}
