use std::path::PathBuf;

use karaoke_lyrics::{parse, LyricsError, TimingSource, ESTIMATED_SECS_PER_LINE};
use proptest::prelude::*;

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("lyrics")
        .join(name);
    std::fs::read_to_string(path).expect("fixture lyrics should be readable")
}

fn lyric_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ,'!?]{0,24}",
        (0u32..100, 0u32..100, 0u32..100, "[a-zA-Z ]{1,16}")
            .prop_map(|(m, s, cs, text)| format!("[{m:02}:{s:02}.{cs:02}]{text}")),
        Just(String::new()),
        Just("   ".to_string()),
    ]
}

/// Lines whose times stay inside the two-digit-minute tag range.
fn lrc_safe_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ,'!?]{0,24}",
        (0u32..99, 0u32..100, 0u32..100, "[a-zA-Z ]{1,16}")
            .prop_map(|(m, s, cs, text)| format!("[{m:02}:{s:02}.{cs:02}]{text}")),
    ]
}

proptest! {
    #[test]
    fn lrc_output_parses_back_to_same_lines(
        lines in prop::collection::vec(lrc_safe_line(), 1..40)
    ) {
        let raw = lines.join("\n");
        prop_assume!(lines.iter().any(|l| !l.trim().is_empty()));
        let schedule = parse(&raw).unwrap();
        let reparsed = parse(&schedule.to_lrc()).unwrap();

        prop_assert_eq!(reparsed.len(), schedule.len());
        prop_assert_eq!(reparsed.tagged_count(), reparsed.len());
        for (a, b) in schedule.iter().zip(reparsed.iter()) {
            prop_assert_eq!(&a.text, &b.text);
            prop_assert!((a.start_time_secs - b.start_time_secs).abs() < 1e-9);
        }
    }

    #[test]
    fn schedule_length_matches_non_blank_lines(lines in prop::collection::vec(lyric_line(), 0..40)) {
        let raw = lines.join("\n");
        let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
        match parse(&raw) {
            Ok(schedule) => {
                prop_assert_eq!(schedule.len(), non_blank);
                for (i, event) in schedule.iter().enumerate() {
                    prop_assert_eq!(event.source_index, i);
                    prop_assert!(event.start_time_secs >= 0.0);
                }
            }
            Err(err) => {
                prop_assert_eq!(err, LyricsError::EmptyInput);
                prop_assert_eq!(non_blank, 0);
            }
        }
    }

    #[test]
    fn untagged_lines_are_spaced_evenly(lines in prop::collection::vec("[a-z]{1,12}", 1..30)) {
        let schedule = parse(&lines.join("\n")).unwrap();
        for (i, event) in schedule.iter().enumerate() {
            prop_assert_eq!(event.timing, TimingSource::Estimated);
            prop_assert!((event.start_time_secs - i as f64 * ESTIMATED_SECS_PER_LINE).abs() < 1e-9);
        }
    }
}

#[test]
fn fixture_song_is_fully_tagged() {
    let schedule = parse(&fixture("tagged.lrc")).unwrap();
    assert_eq!(schedule.len(), 6);
    assert_eq!(schedule.tagged_count(), 6);
    assert!((schedule.events()[0].start_time_secs - 12.5).abs() < 1e-9);
    assert_eq!(schedule.events()[5].text, "Karaoke night, one more time");
}

#[test]
fn fixture_mixed_song_keeps_source_order() {
    let schedule = parse(&fixture("mixed.txt")).unwrap();
    assert_eq!(schedule.len(), 5);
    assert_eq!(schedule.tagged_count(), 2);
    assert_eq!(schedule.estimated_count(), 3);
    assert_eq!(schedule.events()[2].text, "No tag on this one");
    assert!((schedule.events()[2].start_time_secs - 6.0).abs() < 1e-9);
}
