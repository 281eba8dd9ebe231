//! Serialization of a [`RenderGraph`] into an ffmpeg `-filter_complex`
//! description.
//!
//! User text crosses three parsers before it is drawn, so it is escaped
//! three times, innermost first:
//! 1. drawtext text expansion (`\` and `%`)
//! 2. filter option values (`\`, `'` and `:`)
//! 3. the filtergraph itself (`\`, `'`, `[`, `]`, `,` and `;`)
//!
//! Input 1 is the video source (background image or canvas); the graph
//! always ends in the `[vout]` pad.

use std::path::PathBuf;

use crate::overlay::{
    BackgroundSource, HorizontalPlacement, OverlayColor, OverlayOperation, RenderGraph,
    VerticalPlacement,
};

/// Output pad label of the serialized graph.
pub const OUTPUT_PAD: &str = "vout";

/// Presentation settings applied while serializing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStyle {
    pub width: u32,
    pub height: u32,
    pub primary_color: String,
    pub accent_color: String,
    pub font_file: Option<PathBuf>,
    /// ffmpeg input index of the video source.
    pub video_input: usize,
}

impl Default for FilterStyle {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            primary_color: "white".to_string(),
            accent_color: "orange".to_string(),
            font_file: None,
            video_input: 1,
        }
    }
}

impl FilterStyle {
    fn color_of(&self, color: OverlayColor) -> &str {
        match color {
            OverlayColor::Primary => &self.primary_color,
            OverlayColor::Accent => &self.accent_color,
        }
    }
}

/// Serialize the graph into a filtergraph string ending in `[vout]`.
///
/// Operations with empty text draw nothing and are left out.
pub fn to_filtergraph(graph: &RenderGraph, style: &FilterStyle) -> String {
    let mut out = base_chain(graph.background, style);

    let draws: Vec<String> = graph
        .operations()
        .iter()
        .filter(|op| !op.text.is_empty())
        .map(|op| drawtext(op, style))
        .collect();

    if draws.is_empty() {
        out.push_str(&format!(";[base]null[{OUTPUT_PAD}]"));
    } else {
        out.push_str(&format!(";[base]{}[{OUTPUT_PAD}]", draws.join(",")));
    }

    out
}

fn base_chain(background: BackgroundSource, style: &FilterStyle) -> String {
    let input = style.video_input;
    let (w, h) = (style.width, style.height);
    match background {
        BackgroundSource::Image => format!(
            "[{input}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,format=yuv420p[base]"
        ),
        BackgroundSource::Canvas => format!("[{input}:v]format=yuv420p[base]"),
    }
}

fn drawtext(op: &OverlayOperation, style: &FilterStyle) -> String {
    let mut filter = String::from("drawtext=");
    if let Some(font) = &style.font_file {
        filter.push_str("fontfile=");
        filter.push_str(&escape_option_value(&font.display().to_string()));
        filter.push(':');
    }

    filter.push_str(&format!(
        "text={text}:fontsize={size}:fontcolor={color}:x={x}:y={y}:enable='gte(t,{start:.3})*lt(t,{end:.3})'",
        text = escape_drawtext_text(&op.text),
        size = op.font_size_pt,
        color = escape_option_value(style.color_of(op.color)),
        x = x_expr(op.x),
        y = y_expr(op.y),
        start = op.window.start(),
        end = op.window.end(),
    ));
    filter
}

/// Layout expression for the horizontal placement.
pub fn x_expr(placement: HorizontalPlacement) -> &'static str {
    match placement {
        HorizontalPlacement::Centered => "(w-text_w)/2",
    }
}

/// Layout expression for the vertical placement.
pub fn y_expr(placement: VerticalPlacement) -> String {
    match placement.midline_offset {
        0 => "(h-text_h)/2".to_string(),
        off if off > 0 => format!("(h-text_h)/2+{off}"),
        off => format!("(h-text_h)/2-{}", i64::from(off).abs()),
    }
}

/// Escape user text for a drawtext `text=` value inside a filtergraph.
pub fn escape_drawtext_text(text: &str) -> String {
    escape_graph(&escape_option(&escape_expansion(text)))
}

/// Escape a plain option value (paths, colors) inside a filtergraph.
pub fn escape_option_value(value: &str) -> String {
    escape_graph(&escape_option(value))
}

fn escape_expansion(text: &str) -> String {
    escape_chars(text, &['\\', '%'])
}

fn escape_option(text: &str) -> String {
    escape_chars(text, &['\\', '\'', ':'])
}

fn escape_graph(text: &str) -> String {
    escape_chars(text, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(text: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use karaoke_lyrics::parse;

    #[test]
    fn test_escaping_matches_ffmpeg_documentation() {
        // Example from the ffmpeg filtergraph escaping notes.
        let raw = "this is a 'string': may contain one, or more, special characters";
        assert_eq!(
            escape_drawtext_text(raw),
            r"this is a \\\'string\\\'\\: may contain one\, or more\, special characters"
        );
    }

    #[test]
    fn test_escaping_neutralizes_graph_control_characters() {
        assert_eq!(escape_drawtext_text("[x];[y]"), r"\[x\]\;\[y\]");
        assert_eq!(escape_drawtext_text("100%"), r"100\\\\%");
        assert_eq!(escape_drawtext_text(r"a\b"), r"a\\\\\\\\b");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(escape_drawtext_text("Hello World"), "Hello World");
    }

    #[test]
    fn test_y_expressions() {
        assert_eq!(y_expr(VerticalPlacement::offset(0)), "(h-text_h)/2");
        assert_eq!(y_expr(VerticalPlacement::offset(120)), "(h-text_h)/2+120");
        assert_eq!(y_expr(VerticalPlacement::offset(-100)), "(h-text_h)/2-100");
    }

    #[test]
    fn test_canvas_graph_without_intro() {
        let graph = build(&parse("Hello\nWorld").unwrap(), "T", "A", false, false);
        let filter = to_filtergraph(&graph, &FilterStyle::default());
        assert_eq!(
            filter,
            "[1:v]format=yuv420p[base];[base]\
drawtext=text=Hello:fontsize=48:fontcolor=white:x=(w-text_w)/2:y=(h-text_h)/2:enable='gte(t,0.000)*lt(t,3.000)',\
drawtext=text=World:fontsize=48:fontcolor=white:x=(w-text_w)/2:y=(h-text_h)/2+60:enable='gte(t,3.000)*lt(t,6.000)'[vout]"
        );
    }

    #[test]
    fn test_intro_is_drawn_first_in_accent() {
        let graph = build(&parse("line").unwrap(), "Song", "Band", true, false);
        let filter = to_filtergraph(&graph, &FilterStyle::default());
        let title = filter.find("text=Song:fontsize=72:fontcolor=orange").unwrap();
        let artist = filter.find("text=Band:fontsize=48:fontcolor=orange").unwrap();
        let label = filter
            .find("text=Karaoke Version:fontsize=36:fontcolor=orange")
            .unwrap();
        let lyric = filter.find("text=line:fontsize=48:fontcolor=white").unwrap();
        assert!(title < artist && artist < label && label < lyric);
        assert!(filter.contains("enable='gte(t,3.000)*lt(t,6.000)'[vout]"));
    }

    #[test]
    fn test_image_background_is_scaled_to_frame() {
        let graph = build(&parse("x").unwrap(), "T", "A", false, true);
        let style = FilterStyle {
            width: 1280,
            height: 720,
            ..FilterStyle::default()
        };
        let filter = to_filtergraph(&graph, &style);
        assert!(filter.starts_with(
            "[1:v]scale=1280:720:force_original_aspect_ratio=decrease,pad=1280:720:"
        ));
    }

    #[test]
    fn test_empty_graph_passes_through() {
        let graph = RenderGraph::new(BackgroundSource::Canvas, Vec::new());
        assert_eq!(
            to_filtergraph(&graph, &FilterStyle::default()),
            "[1:v]format=yuv420p[base];[base]null[vout]"
        );
    }

    #[test]
    fn test_font_file_is_escaped() {
        let graph = build(&parse("x").unwrap(), "T", "A", false, false);
        let style = FilterStyle {
            font_file: Some(PathBuf::from("C:/Fonts/a,b.ttf")),
            ..FilterStyle::default()
        };
        let filter = to_filtergraph(&graph, &style);
        assert!(filter.contains(r"drawtext=fontfile=C\\:/Fonts/a\,b.ttf:text=x:"));
    }

    #[test]
    fn test_user_text_cannot_inject_filters() {
        let graph = build(
            &parse("evil',drawbox=c=red[out];[out]null").unwrap(),
            "T",
            "A",
            false,
            false,
        );
        let filter = to_filtergraph(&graph, &FilterStyle::default());
        assert_eq!(filter.matches("[vout]").count(), 1);
        assert_eq!(filter.matches("drawtext=").count(), 1);
        assert!(filter.contains(r"evil\\\'\,drawbox=c=red\[out\]\;\[out\]null"));
    }
}
