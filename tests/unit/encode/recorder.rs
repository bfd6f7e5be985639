use super::*;
use crate::foundation::core::Fps;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::new(30, 1).unwrap(),
    }
}

#[test]
fn flatten_premul_alpha_0_returns_black() {
    let mut dst = vec![9u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &[0, 0, 0, 0], true).unwrap();
    assert_eq!(dst, vec![0, 0, 0, 255]);
}

#[test]
fn flatten_straight_half_alpha_over_black() {
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &[255, 0, 0, 128], false).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn args_stream_raw_rgba_in_and_container_out() {
    let args = recorder_args(&cfg(1280, 720), OutputFormat::H264Mp4);
    let joined = args.join(" ");
    assert!(joined.contains("-f rawvideo -pix_fmt rgba -s 1280x720 -r 30/1 -i pipe:0"));
    assert!(joined.contains("-c:v libx264"));
    assert!(joined.contains("frag_keyframe+empty_moov"));
    assert!(joined.ends_with("-pix_fmt yuv420p -f mp4 pipe:1"));

    let webm = recorder_args(&cfg(10, 10), OutputFormat::Vp9WebM).join(" ");
    assert!(webm.contains("-c:v libvpx-vp9"));
    assert!(webm.ends_with("-f webm pipe:1"));
    assert!(!webm.contains("movflags"));
}

#[test]
fn begin_rejects_odd_dims_for_h264_before_spawning() {
    let mut rec = StreamingRecorder::new(OutputFormat::H264Mp4);
    let err = rec.begin(cfg(641, 480)).unwrap_err();
    assert!(matches!(err, OverstampError::Validation(_)));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut rec = StreamingRecorder::new(OutputFormat::Vp8WebM);
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(rec.push_frame(FrameIndex(0), &frame).is_err());
    assert!(rec.end().is_err());
    assert!(rec.take_output().is_none());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = std::env::temp_dir().join(format!("overstamp-recorder-{}", std::process::id()));
    let path = dir.join("a").join("b").join("out.webm");
    ensure_parent_dir(&path).unwrap();
    assert!(path.parent().unwrap().is_dir());
    let _ = std::fs::remove_dir_all(&dir);
}
