use super::*;

const SMALL: Canvas = Canvas {
    width: 128,
    height: 72,
};

struct Unreachable;

impl MediaProvider for Unreachable {
    fn fetch(&self, _scenes: &[Scene], _out_dir: &Path) -> NewsreelResult<Vec<MediaFile>> {
        Err(NewsreelError::provider("401 unauthorized"))
    }
}

struct OnlyFirst(std::path::PathBuf);

impl MediaProvider for OnlyFirst {
    fn fetch(&self, scenes: &[Scene], _out_dir: &Path) -> NewsreelResult<Vec<MediaFile>> {
        Ok(vec![MediaFile {
            scene_number: scenes[0].scene_number,
            path: self.0.clone(),
            kind: MediaKind::Video,
        }])
    }
}

fn provider() -> FallbackMediaProvider {
    FallbackMediaProvider::new(SMALL, FontChoice::Bitmap, TextEngine::without_fonts())
}

fn temp_dir(name: &str) -> std::path::PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!(
        "newsreel_fallback_{}_{nanos}_{name}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn scenes() -> Vec<Scene> {
    vec![
        Scene::new(10, "a", "Central bank building"),
        Scene::new(20, "b", ""),
        Scene::new(30, "c", "Harbor cranes"),
    ]
}

#[test]
fn gradient_runs_top_to_bottom_and_cycles() {
    let p = provider();
    let first = p.render(0, "");
    assert_eq!(first.pixel(0, 0), [41, 128, 185, 255]);
    let bottom = first.pixel(0, SMALL.height - 1);
    assert!(bottom[0] > 130 && bottom[2] < 185);

    let fifth = p.render(4, "");
    assert_eq!(fifth.pixel(0, 0), first.pixel(0, 0));
    assert_ne!(p.render(1, "").pixel(0, 0), first.pixel(0, 0));
}

#[test]
fn title_is_drawn_near_the_top() {
    let frame = provider().render(0, "");
    let white_rows: Vec<u32> = (0..SMALL.height)
        .filter(|&y| (0..SMALL.width).any(|x| frame.pixel(x, y) == [255, 255, 255, 255]))
        .collect();
    assert!(!white_rows.is_empty());
    // Title top sits at 100/720 of the height.
    assert_eq!(white_rows[0], 10);
}

#[test]
fn fetch_writes_one_jpeg_per_scene() {
    let dir = temp_dir("all");
    let media = provider().fetch(&scenes(), &dir).unwrap();
    assert_eq!(media.len(), 3);
    for (idx, m) in media.iter().enumerate() {
        assert_eq!(m.kind, MediaKind::Image);
        assert_eq!(m.path, dir.join(format!("fallback_scene_{idx}.jpg")));
        let img = image::open(&m.path).unwrap();
        assert_eq!((img.width(), img.height()), (128, 72));
    }
    assert_eq!(media[1].scene_number, 20);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failing_primary_falls_back_for_every_scene() {
    let dir = temp_dir("primary_err");
    let wrapped = MediaWithFallback::new(Box::new(Unreachable), provider());
    let media = wrapped.fetch(&scenes(), &dir).unwrap();
    let numbers: Vec<u32> = media.iter().map(|m| m.scene_number).collect();
    assert_eq!(numbers, vec![10, 20, 30]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn partial_primary_is_filled_per_scene() {
    let dir = temp_dir("partial");
    let clip = dir.join("clip.mp4");
    let wrapped = MediaWithFallback::new(Box::new(OnlyFirst(clip.clone())), provider());
    let media = wrapped.fetch(&scenes(), &dir).unwrap();
    assert_eq!(media.len(), 3);
    assert_eq!(media[0].path, clip);
    assert_eq!(media[0].kind, MediaKind::Video);
    assert_eq!(media[1].path, dir.join("fallback_scene_1.jpg"));
    assert_eq!(media[2].path, dir.join("fallback_scene_2.jpg"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unwritable_fallback_keeps_primary_media() {
    let dir = temp_dir("unwritable");
    let clip = dir.join("clip.mp4");
    let missing = dir.join("gone").join("deeper");
    let wrapped = MediaWithFallback::new(Box::new(OnlyFirst(clip.clone())), provider());
    let media = wrapped.fetch(&scenes(), &missing).unwrap();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].scene_number, 10);
    assert_eq!(media[0].path, clip);
    assert!(!missing.exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failing_primary_and_unwritable_dir_yield_no_media() {
    let dir = temp_dir("nothing");
    let missing = dir.join("gone");
    let wrapped = MediaWithFallback::new(Box::new(Unreachable), provider());
    let media = wrapped.fetch(&scenes(), &missing).unwrap();
    assert!(media.is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}
