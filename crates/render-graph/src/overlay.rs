//! Typed overlay operations that make up a render graph.

use serde::{Deserialize, Serialize};

/// Palette slot an overlay is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayColor {
    /// Lyric lines.
    Primary,
    /// Intro card.
    Accent,
}

/// What an overlay is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayRole {
    IntroTitle,
    IntroArtist,
    IntroLabel,
    Lyric { source_index: usize },
}

impl OverlayRole {
    pub fn is_intro(self) -> bool {
        !matches!(self, OverlayRole::Lyric { .. })
    }
}

/// Horizontal layout expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalPlacement {
    Centered,
}

/// Vertical layout expression: text centered on the frame midline, then
/// shifted by `midline_offset` pixels (positive is downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerticalPlacement {
    pub midline_offset: i32,
}

impl VerticalPlacement {
    pub const fn offset(midline_offset: i32) -> Self {
        Self { midline_offset }
    }
}

/// Half-open display window `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    /// Create a window. `end` is raised to `start` when it would precede it,
    /// which happens when tagged lines are out of order.
    pub fn new(start: f64, end: f64) -> Self {
        let start = start.max(0.0);
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    /// Same window moved later by `secs`.
    pub fn shifted(&self, secs: f64) -> Self {
        Self::new(self.start + secs, self.end + secs)
    }
}

/// One timed, positioned text draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayOperation {
    /// Raw display text. Escaping happens only at serialization.
    pub text: String,
    pub font_size_pt: u32,
    pub color: OverlayColor,
    pub x: HorizontalPlacement,
    pub y: VerticalPlacement,
    pub window: TimeWindow,
    pub role: OverlayRole,
}

/// What the overlays are painted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSource {
    /// A still image supplied with the request.
    Image,
    /// Synthetic solid-color canvas.
    Canvas,
}

/// Ordered overlay operations. Later entries paint over earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderGraph {
    pub background: BackgroundSource,
    operations: Vec<OverlayOperation>,
}

impl RenderGraph {
    pub fn new(background: BackgroundSource, operations: Vec<OverlayOperation>) -> Self {
        Self {
            background,
            operations,
        }
    }

    pub fn operations(&self) -> &[OverlayOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn intro_count(&self) -> usize {
        self.operations.iter().filter(|op| op.role.is_intro()).count()
    }

    pub fn lyric_operations(&self) -> impl Iterator<Item = &OverlayOperation> {
        self.operations.iter().filter(|op| !op.role.is_intro())
    }

    /// Latest window end across all operations, or zero for an empty graph.
    pub fn end_secs(&self) -> f64 {
        self.operations
            .iter()
            .map(|op| op.window.end())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_end_never_precedes_start() {
        let window = TimeWindow::new(5.0, 2.0);
        assert_eq!(window.start(), 5.0);
        assert_eq!(window.end(), 5.0);
        assert_eq!(window.duration(), 0.0);
    }

    #[test]
    fn test_window_is_half_open() {
        let window = TimeWindow::new(0.0, 3.0);
        assert!(window.contains(0.0));
        assert!(window.contains(2.999));
        assert!(!window.contains(3.0));
    }

    #[test]
    fn test_shifted_window() {
        let window = TimeWindow::new(1.5, 4.0).shifted(3.0);
        assert_eq!((window.start(), window.end()), (4.5, 7.0));
    }

    #[test]
    fn test_end_secs_of_empty_graph() {
        let graph = RenderGraph::new(BackgroundSource::Canvas, Vec::new());
        assert_eq!(graph.end_secs(), 0.0);
        assert!(graph.is_empty());
    }
}
