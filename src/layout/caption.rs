//! Multi-line caption layout with ellipsis truncation.
//!
//! Captions are split into paragraphs on blank lines, each paragraph is
//! wrapped into visual lines by a [`TextMeasure`], and lines are stacked
//! top-down until the cell's maximum caption height is reached.

/// Marker appended when a caption does not fit.
pub const ELLIPSIS: &str = "…";

/// Text metrics supplied by whatever draws the captions.
pub trait TextMeasure {
    /// Height of one visual line.
    fn line_height(&self) -> f32;

    /// Breaks one paragraph into visual lines no wider than `width`.
    fn wrap(&self, paragraph: &str, width: f32) -> Vec<String>;
}

/// Metrics for a fixed glyph advance, good enough for monospace fonts and
/// for sizing estimates when the real font is not at hand.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMetrics {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for FixedAdvanceMetrics {
    fn default() -> Self {
        Self {
            advance: 7.0,
            line_height: 14.0,
        }
    }
}

impl FixedAdvanceMetrics {
    fn max_chars(&self, width: f32) -> usize {
        if self.advance <= 0.0 {
            return usize::MAX;
        }
        ((width / self.advance).floor() as usize).max(1)
    }
}

impl TextMeasure for FixedAdvanceMetrics {
    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn wrap(&self, paragraph: &str, width: f32) -> Vec<String> {
        let max_chars = self.max_chars(width);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed <= max_chars {
                if current_len > 0 {
                    current.push(' ');
                }
                current.push_str(word);
                current_len = needed;
                continue;
            }

            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }

            // Words wider than the cell are broken hard.
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(max_chars).peekable();
            while let Some(chunk) = chunks.next() {
                if chunks.peek().is_some() {
                    lines.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
        }

        if current_len > 0 {
            lines.push(current);
        }
        lines
    }
}

/// One positioned line of a caption layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFragment {
    pub text: String,
    pub y: f32,
    pub height: f32,
    /// True for the ellipsis marker.
    pub elided: bool,
}

/// Result of laying out one caption; immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaptionLayout {
    pub height: f32,
    pub fragments: Vec<LayoutFragment>,
}

impl CaptionLayout {
    pub fn is_truncated(&self) -> bool {
        self.fragments.last().is_some_and(|f| f.elided)
    }

    pub fn line_count(&self) -> usize {
        self.fragments.len()
    }
}

/// Splits on blank lines. Lines inside a paragraph are joined with a space.
fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}

/// Lays out `text` into lines no taller than `max_height` in total.
///
/// When a line would cross `max_height` the layout stops and ends with an
/// [`ELLIPSIS`] line, replacing the last placed line if the marker would not
/// fit below it. A caption whose last line ends exactly at `max_height` is
/// not truncated.
pub fn layout_caption(
    text: &str,
    width: f32,
    max_height: f32,
    measure: &dyn TextMeasure,
) -> CaptionLayout {
    let line_height = measure.line_height();
    if line_height <= 0.0 {
        return CaptionLayout::default();
    }

    let mut fragments: Vec<LayoutFragment> = Vec::new();
    let mut y = 0.0f32;

    for paragraph in paragraphs(text) {
        for line in measure.wrap(&paragraph, width) {
            if y + line_height > max_height {
                while y + line_height > max_height {
                    match fragments.pop() {
                        Some(last) => y = last.y,
                        None => break,
                    }
                }
                if y + line_height <= max_height {
                    fragments.push(LayoutFragment {
                        text: ELLIPSIS.to_string(),
                        y,
                        height: line_height,
                        elided: true,
                    });
                    y += line_height;
                }
                return CaptionLayout {
                    height: y,
                    fragments,
                };
            }

            fragments.push(LayoutFragment {
                text: line,
                y,
                height: line_height,
                elided: false,
            });
            y += line_height;
        }
    }

    CaptionLayout {
        height: y,
        fragments,
    }
}
