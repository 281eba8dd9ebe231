//! Render graph builder.
//!
//! Layout rules:
//! - The optional intro card occupies `[0, 3)` with three fixed overlays:
//!   title, artist, and a "Karaoke Version" label, in that order
//! - With an intro, every lyric window is pushed back by the intro length
//! - A lyric line shows until the next line starts; the last line gets a
//!   fixed tail window
//! - Line `i` sits `i * line_spacing` pixels below the midline so lines that
//!   are visible together never share a row

use karaoke_lyrics::LyricSchedule;

use crate::overlay::{
    BackgroundSource, HorizontalPlacement, OverlayColor, OverlayOperation, OverlayRole,
    RenderGraph, TimeWindow, VerticalPlacement,
};

/// Length of the intro card.
pub const INTRO_SECS: f64 = 3.0;

/// Display time of the final lyric line.
pub const LAST_LINE_SECS: f64 = 3.0;

/// Fixed third line of the intro card.
pub const KARAOKE_LABEL: &str = "Karaoke Version";

pub const TITLE_FONT_PT: u32 = 72;
pub const ARTIST_FONT_PT: u32 = 48;
pub const LABEL_FONT_PT: u32 = 36;
pub const LYRIC_FONT_PT: u32 = 48;

const TITLE_OFFSET: i32 = -100;
const ARTIST_OFFSET: i32 = 0;
const LABEL_OFFSET: i32 = 100;

/// Vertical spacing of lyric lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLayout {
    /// Pixels between consecutive lines.
    pub line_spacing: i32,

    /// Restart the offset sequence every `n` lines. `None` keeps
    /// `index * line_spacing` for all lines.
    pub max_stacked_lines: Option<usize>,
}

impl Default for LineLayout {
    fn default() -> Self {
        Self {
            line_spacing: 60,
            max_stacked_lines: None,
        }
    }
}

impl LineLayout {
    /// Midline offset of the line at `index`.
    pub fn offset_for(&self, index: usize) -> i32 {
        let slot = match self.max_stacked_lines {
            Some(cap) if cap > 0 => index % cap,
            _ => index,
        };
        (slot as i64 * i64::from(self.line_spacing)).clamp(i64::from(i32::MIN), i64::from(i32::MAX))
            as i32
    }
}

/// Per-request graph options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    pub include_intro: bool,
    pub has_background: bool,
}

/// Compiles schedules into render graphs.
#[derive(Debug, Clone, Default)]
pub struct RenderGraphBuilder {
    layout: LineLayout,
}

impl RenderGraphBuilder {
    pub fn new(layout: LineLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> LineLayout {
        self.layout
    }

    /// Build the overlay list for one request. Never fails; an empty
    /// schedule yields only the intro (if requested) or an empty graph.
    pub fn build(
        &self,
        schedule: &LyricSchedule,
        title: &str,
        artist: &str,
        options: GraphOptions,
    ) -> RenderGraph {
        let intro_ops = if options.include_intro { 3 } else { 0 };
        let mut operations = Vec::with_capacity(schedule.len() + intro_ops);

        if options.include_intro {
            operations.extend(intro_card(title, artist));
        }

        let shift = if options.include_intro { INTRO_SECS } else { 0.0 };
        let events = schedule.events();
        for (i, event) in events.iter().enumerate() {
            let start = event.start_time_secs + shift;
            let end = match events.get(i + 1) {
                Some(next) => next.start_time_secs + shift,
                None => start + LAST_LINE_SECS,
            };

            if end < start {
                tracing::debug!(
                    line = i,
                    start,
                    next_start = end,
                    "Lyric line starts after its successor; window collapsed"
                );
            }

            operations.push(OverlayOperation {
                text: event.text.clone(),
                font_size_pt: LYRIC_FONT_PT,
                color: OverlayColor::Primary,
                x: HorizontalPlacement::Centered,
                y: VerticalPlacement::offset(self.layout.offset_for(i)),
                window: TimeWindow::new(start, end),
                role: OverlayRole::Lyric {
                    source_index: event.source_index,
                },
            });
        }

        let background = if options.has_background {
            BackgroundSource::Image
        } else {
            BackgroundSource::Canvas
        };

        tracing::debug!(
            operations = operations.len(),
            intro = options.include_intro,
            background = ?background,
            "Render graph built"
        );

        RenderGraph::new(background, operations)
    }
}

/// Build a graph with the default line layout.
pub fn build(
    schedule: &LyricSchedule,
    title: &str,
    artist: &str,
    include_intro: bool,
    has_background: bool,
) -> RenderGraph {
    RenderGraphBuilder::default().build(
        schedule,
        title,
        artist,
        GraphOptions {
            include_intro,
            has_background,
        },
    )
}

fn intro_card(title: &str, artist: &str) -> [OverlayOperation; 3] {
    let window = TimeWindow::new(0.0, INTRO_SECS);
    let card = |text: &str, font_size_pt, offset, role| OverlayOperation {
        text: text.trim().to_string(),
        font_size_pt,
        color: OverlayColor::Accent,
        x: HorizontalPlacement::Centered,
        y: VerticalPlacement::offset(offset),
        window,
        role,
    };

    [
        card(title, TITLE_FONT_PT, TITLE_OFFSET, OverlayRole::IntroTitle),
        card(artist, ARTIST_FONT_PT, ARTIST_OFFSET, OverlayRole::IntroArtist),
        card(KARAOKE_LABEL, LABEL_FONT_PT, LABEL_OFFSET, OverlayRole::IntroLabel),
    ]
}
