use super::*;
use crate::caption::composite_scene;
use crate::clip::VisualClip;
use crate::encode::InMemorySink;
use crate::foundation::core::Rgb8;
use crate::render::frame::PremulLayer;
use crate::timing::scene_frame_spans;

const SMALL: Canvas = Canvas {
    width: 8,
    height: 6,
};

const FORMAT: SequenceFormat = SequenceFormat {
    canvas: SMALL,
    fps: Fps::OUTPUT,
};

const COLORS: [Rgb8; 4] = [
    Rgb8(200, 0, 0),
    Rgb8(0, 200, 0),
    Rgb8(0, 0, 200),
    Rgb8(200, 200, 0),
];

fn colored(durations: &[f64]) -> Vec<Composite> {
    durations
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            Composite::bare(VisualClip::solid(
                i as u32 + 1,
                d,
                SMALL,
                Fps::OUTPUT,
                COLORS[i % COLORS.len()],
            ))
        })
        .collect()
}

/// Sink that fails after accepting `limit` frames.
struct FailAfter {
    limit: usize,
    pushed: usize,
    aborted: bool,
    ended: bool,
}

impl FrameSink for FailAfter {
    fn begin(&mut self, _cfg: SinkConfig) -> NewsreelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> NewsreelResult<()> {
        if self.pushed == self.limit {
            return Err(NewsreelError::encode("disk full"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> NewsreelResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn four_scenes_come_out_in_script_order() {
    let durations = [0.5, 0.25, 0.5, 0.25];
    let composites = colored(&durations);
    let spans = scene_frame_spans(&durations, Fps::OUTPUT).unwrap();
    let mut sink = InMemorySink::new();
    let report = assemble_sequence(&composites, &spans, FORMAT, None, &mut sink).unwrap();

    assert!(sink.is_finished());
    assert_eq!(report.total_frames, 36);
    assert_eq!(sink.frames().len(), 36);
    assert!((report.duration_secs - 1.5).abs() < 1e-9);

    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        let scene = spans.iter().position(|s| s.contains(*idx)).unwrap();
        assert_eq!(frame.pixel(3, 3), COLORS[scene].to_rgba());
    }

    let numbers: Vec<u32> = report.segments.iter().map(|s| s.scene_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(report.segments[1].frames.len_frames(), 6);
    assert!(report.segments.iter().all(|s| s.origin == ClipOrigin::Placeholder));
    assert!(report.segments.iter().all(|s| !s.captioned));
}

#[test]
fn caption_overlay_is_applied_to_every_frame_of_its_scene() {
    struct HalfWhite;
    impl crate::caption::CaptionRenderer for HalfWhite {
        fn render(&self, _text: &str, canvas: Canvas) -> NewsreelResult<PremulLayer> {
            let mut layer = PremulLayer::transparent(canvas);
            layer.data[..4].copy_from_slice(&[128, 128, 128, 128]);
            Ok(layer)
        }
    }

    let clips = [
        VisualClip::solid(1, 0.25, SMALL, Fps::OUTPUT, Rgb8::BLACK),
        VisualClip::solid(2, 0.25, SMALL, Fps::OUTPUT, Rgb8::BLACK),
    ];
    let composites = vec![
        composite_scene(clips[0].clone(), "caption", Some(&HalfWhite)),
        composite_scene(clips[1].clone(), "", Some(&HalfWhite)),
    ];
    let spans = scene_frame_spans(&[0.25, 0.25], Fps::OUTPUT).unwrap();
    let mut sink = InMemorySink::new();
    let report = assemble_sequence(&composites, &spans, FORMAT, None, &mut sink).unwrap();

    assert!(report.segments[0].captioned);
    assert!(!report.segments[1].captioned);
    for (idx, frame) in sink.frames() {
        let expected = if idx.0 < 6 { [128, 128, 128, 255] } else { [0, 0, 0, 255] };
        // Overlays must not accumulate across frames of a held clip.
        assert_eq!(frame.pixel(0, 0), expected);
    }
}

#[test]
fn sink_failure_aborts_and_reports_encode_error() {
    let composites = colored(&[0.5, 0.5]);
    let spans = scene_frame_spans(&[0.5, 0.5], Fps::OUTPUT).unwrap();
    let mut sink = FailAfter {
        limit: 5,
        pushed: 0,
        aborted: false,
        ended: false,
    };
    let err = assemble_sequence(&composites, &spans, FORMAT, None, &mut sink).unwrap_err();
    assert!(matches!(err, NewsreelError::Encode(_)));
    assert!(err.to_string().contains("disk full"));
    assert!(sink.aborted);
    assert!(!sink.ended);
}

#[test]
fn layout_mismatches_are_rejected_before_encoding() {
    let composites = colored(&[0.5, 0.5]);
    let spans = scene_frame_spans(&[0.5], Fps::OUTPUT).unwrap();
    let mut sink = InMemorySink::new();
    assert!(assemble_sequence(&composites, &spans, FORMAT, None, &mut sink).is_err());
    assert!(sink.config().is_none());

    let gap = vec![
        FrameRange::new(FrameIndex(0), FrameIndex(12)).unwrap(),
        FrameRange::new(FrameIndex(13), FrameIndex(24)).unwrap(),
    ];
    assert!(assemble_sequence(&composites, &gap, FORMAT, None, &mut sink).is_err());

    assert!(assemble_sequence(&[], &[], FORMAT, None, &mut sink).is_err());
}

#[test]
fn wrong_canvas_is_rejected() {
    let composites = colored(&[0.5]);
    let spans = scene_frame_spans(&[0.5], Fps::OUTPUT).unwrap();
    let format = SequenceFormat {
        canvas: Canvas {
            width: 16,
            height: 6,
        },
        fps: Fps::OUTPUT,
    };
    let mut sink = InMemorySink::new();
    let err = assemble_sequence(&composites, &spans, format, None, &mut sink).unwrap_err();
    assert!(matches!(err, NewsreelError::Encode(_)));
}
