use super::*;

fn scene_with_keywords(keywords: &[&str], desc: &str) -> Scene {
    let mut scene = Scene::new(1, "Markets rallied today.", desc);
    scene.search_keywords = keywords.iter().map(|k| k.to_string()).collect();
    scene
}

#[test]
fn search_query_uses_first_three_short_keywords() {
    let scene = scene_with_keywords(&["stock market", "traders", "wall street", "bull"], "");
    assert_eq!(scene.search_query(), "stock market traders wall street");
}

#[test]
fn search_query_skips_truncated_keywords() {
    let scene = scene_with_keywords(
        &[
            "a trader looking at several screens in a d",
            "charts",
        ],
        "",
    );
    assert_eq!(scene.search_query(), "charts");
}

#[test]
fn search_query_falls_back_to_description_words() {
    let scene = scene_with_keywords(
        &["a trader looking at several screens in a d"],
        "Crowded trading floor with screens",
    );
    assert_eq!(scene.search_query(), "Crowded trading floor");

    let bare = scene_with_keywords(&[], "  ");
    assert_eq!(bare.search_query(), "business news");
}

#[test]
fn media_type_parses_leniently() {
    let t: SceneMediaType = serde_json::from_str("\"Video\"").unwrap();
    assert_eq!(t, SceneMediaType::Video);
    let t: SceneMediaType = serde_json::from_str("\"graphic\"").unwrap();
    assert_eq!(t, SceneMediaType::Photo);
    assert_eq!(serde_json::to_string(&SceneMediaType::Video).unwrap(), "\"video\"");
}

#[test]
fn scene_defaults_fill_enrichment_fields() {
    let scene: Scene =
        serde_json::from_str(r#"{"scene_number": 2, "narration": "Hello"}"#).unwrap();
    assert_eq!(scene.media_type, SceneMediaType::Photo);
    assert_eq!(scene.mood, "neutral");
    assert!(scene.search_keywords.is_empty());
}

#[test]
fn media_lookup_takes_first_match() {
    let media = vec![
        MediaFile {
            scene_number: 2,
            path: "a.jpg".into(),
            kind: MediaKind::Image,
        },
        MediaFile {
            scene_number: 2,
            path: "b.mp4".into(),
            kind: MediaKind::Video,
        },
        MediaFile {
            scene_number: 3,
            path: "c.jpg".into(),
            kind: MediaKind::Image,
        },
    ];
    let found = media_for_scene(&media, 2).unwrap();
    assert_eq!(found.path, std::path::PathBuf::from("a.jpg"));
    assert!(media_for_scene(&media, 1).is_none());
    assert_eq!(duplicate_media_scenes(&media), vec![2]);
}

#[test]
fn media_file_uses_type_key() {
    let m: MediaFile =
        serde_json::from_str(r#"{"scene_number": 1, "path": "x.mp4", "type": "video"}"#).unwrap();
    assert_eq!(m.kind, MediaKind::Video);
}

#[test]
fn display_text_names_empty_scenes() {
    let scene = Scene::new(4, " ", "");
    assert_eq!(scene.display_text(), "Scene 4");
}
