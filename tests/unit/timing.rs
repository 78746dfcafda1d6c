use super::*;

fn scenes(narrations: &[&str]) -> Vec<Scene> {
    narrations
        .iter()
        .enumerate()
        .map(|(i, n)| Scene::new(i as u32 + 1, *n, ""))
        .collect()
}

#[test]
fn equal_share_reconstructs_total() {
    for n in 1..=12usize {
        for &total in &[0.5, 7.3, 30.0, 47.123_456, 600.0] {
            let d = duration_per_scene(total, n);
            assert_eq!(d, total / n as f64);
            assert!((d * n as f64 - total).abs() < 1e-9);
        }
    }
}

#[test]
fn zero_scenes_use_fallback() {
    assert_eq!(duration_per_scene(30.0, 0), FALLBACK_SCENE_SECS);
    assert_eq!(duration_per_scene(0.0, 0), 5.0);
    assert!(allocate(30.0, &[], AllocationPolicy::Equal).is_empty());
}

#[test]
fn equal_policy_ignores_narration_and_advisory_duration() {
    let mut list = scenes(&["one two three four", "five"]);
    list[0].duration = 25.0;
    let out = allocate(12.0, &list, AllocationPolicy::Equal);
    assert_eq!(out, vec![6.0, 6.0]);
}

#[test]
fn word_policy_is_proportional_and_sums_to_total() {
    let list = scenes(&["one two three", "four", ""]);
    let out = allocate(8.0, &list, AllocationPolicy::Words);
    assert!((out[0] - 6.0).abs() < 1e-9);
    assert!((out[1] - 2.0).abs() < 1e-9);
    assert_eq!(out[2], 0.0);
    assert!((out.iter().sum::<f64>() - 8.0).abs() < 1e-9);
}

#[test]
fn word_policy_without_words_is_equal() {
    let list = scenes(&["", " "]);
    assert_eq!(allocate(10.0, &list, AllocationPolicy::Words), vec![5.0, 5.0]);
}

#[test]
fn spans_are_contiguous_and_cover_total() {
    let fps = Fps::OUTPUT;
    let d = duration_per_scene(31.7, 3);
    let spans = scene_frame_spans(&[d, d, d], fps).unwrap();
    assert_eq!(spans[0].start, FrameIndex(0));
    for pair in spans.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert_eq!(spans[2].end.0, fps.secs_to_frames_round(31.7));
}

#[test]
fn thirty_seconds_over_three_scenes_is_ten_seconds_each() {
    let d = duration_per_scene(30.0, 3);
    let spans = scene_frame_spans(&[d, d, d], Fps::OUTPUT).unwrap();
    for span in spans {
        assert_eq!(span.len_frames(), 240);
    }
}

#[test]
fn negative_duration_is_rejected() {
    assert!(scene_frame_spans(&[1.0, -1.0], Fps::OUTPUT).is_err());
}
