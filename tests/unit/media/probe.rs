use super::*;

fn src() -> VideoSource {
    VideoSource::Path(PathBuf::from("in.mp4"))
}

#[test]
fn parses_video_and_audio_streams() {
    let json = br#"{
        "streams": [
            {"codec_type": "video", "width": 1280, "height": 720, "r_frame_rate": "30000/1001"},
            {"codec_type": "audio"}
        ],
        "format": {"duration": "5.005000"}
    }"#;
    let info = parse_probe_json(json, src()).unwrap();
    assert_eq!(info.canvas(), Canvas::new(1280, 720));
    assert_eq!(info.fps, Fps::new(30000, 1001).unwrap());
    assert_eq!(info.duration_secs, Some(5.005));
    assert!(info.has_audio);
}

#[test]
fn zero_rate_falls_back_to_average_and_missing_duration_is_none() {
    let json = br#"{
        "streams": [
            {"codec_type": "video", "width": 640, "height": 480,
             "r_frame_rate": "0/0", "avg_frame_rate": "25/1"}
        ],
        "format": {"duration": "N/A"}
    }"#;
    let info = parse_probe_json(json, src()).unwrap();
    assert_eq!(info.fps, Fps::new(25, 1).unwrap());
    assert_eq!(info.duration_secs, None);
    assert!(!info.has_audio);
}

#[test]
fn average_rate_wins_over_a_timebase_like_real_rate() {
    let json = br#"{
        "streams": [
            {"codec_type": "video", "width": 1280, "height": 720,
             "r_frame_rate": "1000/1", "avg_frame_rate": "30/1"}
        ],
        "format": {"duration": "5.000000"}
    }"#;
    let info = parse_probe_json(json, src()).unwrap();
    assert_eq!(info.fps, Fps::new(30, 1).unwrap());
}

#[test]
fn display_matrix_rotation_swaps_the_canvas() {
    let json = br#"{
        "streams": [
            {"codec_type": "video", "width": 1920, "height": 1080, "r_frame_rate": "30/1",
             "side_data_list": [
                {"side_data_type": "Display Matrix", "rotation": -90}
             ]}
        ]
    }"#;
    let info = parse_probe_json(json, src()).unwrap();
    assert_eq!(info.canvas(), Canvas::new(1080, 1920));
}

#[test]
fn legacy_rotate_tag_swaps_and_half_turn_does_not() {
    let json = br#"{
        "streams": [
            {"codec_type": "video", "width": 1920, "height": 1080, "r_frame_rate": "30/1",
             "tags": {"rotate": "270"}}
        ]
    }"#;
    assert_eq!(parse_probe_json(json, src()).unwrap().canvas(), Canvas::new(1080, 1920));

    let json = br#"{
        "streams": [
            {"codec_type": "video", "width": 1920, "height": 1080, "r_frame_rate": "30/1",
             "side_data_list": [{"side_data_type": "Display Matrix", "rotation": 180}]}
        ]
    }"#;
    assert_eq!(parse_probe_json(json, src()).unwrap().canvas(), Canvas::new(1920, 1080));
}

#[test]
fn audio_only_input_is_a_decode_error() {
    let json = br#"{"streams": [{"codec_type": "audio"}]}"#;
    let err = parse_probe_json(json, src()).unwrap_err();
    assert!(err.is_decode());
}

#[test]
fn garbage_json_is_a_decode_error() {
    assert!(parse_probe_json(b"not json", src()).unwrap_err().is_decode());
}

#[test]
fn video_source_parse_distinguishes_urls() {
    assert_eq!(
        VideoSource::parse("https://cdn.example.com/a.mp4"),
        VideoSource::Url("https://cdn.example.com/a.mp4".to_owned())
    );
    assert_eq!(
        VideoSource::parse("clips/a.mp4"),
        VideoSource::Path(PathBuf::from("clips/a.mp4"))
    );
    assert_eq!(VideoSource::parse("clips/a.mp4").to_string(), "clips/a.mp4");
}
