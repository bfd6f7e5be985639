use super::*;

#[test]
fn base64_data_uri_decodes() {
    let p = RasterPayload::DataUri("data:image/png;base64,aGVsbG8=".to_owned());
    assert_eq!(p.mime().as_deref(), Some("image/png"));
    assert_eq!(p.bytes().unwrap().as_ref(), b"hello");
}

#[test]
fn percent_encoded_svg_data_uri_decodes() {
    let p = RasterPayload::DataUri("data:image/svg+xml,%3Csvg%3E%3C/svg%3E".to_owned());
    assert_eq!(p.mime().as_deref(), Some(SVG_MIME));
    assert_eq!(p.bytes().unwrap().as_ref(), b"<svg></svg>");
}

#[test]
fn plain_data_uri_keeps_plus_and_unfinished_escapes_literal() {
    let p = RasterPayload::DataUri("data:image/svg+xml,%3Ctext%3Ea+b%E2%9C%93%3C/text%3E%3".to_owned());
    assert_eq!(p.bytes().unwrap().as_ref(), "<text>a+b\u{2713}</text>%3".as_bytes());
}

#[test]
fn malformed_payloads_are_decode_errors() {
    for bad in [
        "not a uri",
        "data:image/png;base64",
        "data:image/png;base64,!!!!",
        "data:image/png;base64,",
        "data:image/svg+xml,",
    ] {
        let err = RasterPayload::DataUri(bad.to_owned()).bytes().unwrap_err();
        assert!(err.is_decode(), "{bad}: {err}");
    }
}

#[test]
fn bytes_payload_sniffs_svg_and_round_trips_through_serde() {
    let p = RasterPayload::from_bytes(None, b"<svg xmlns='http://www.w3.org/2000/svg'/>".to_vec());
    assert_eq!(p.mime().as_deref(), Some(SVG_MIME));

    let json = serde_json::to_string(&p).unwrap();
    assert!(json.starts_with("\"data:image/svg+xml;base64,"));
    let back: RasterPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(back.bytes().unwrap(), p.bytes().unwrap());
}

#[test]
fn encoded_raster_data_uri_has_png_prefix() {
    let r = EncodedRaster {
        mime: PNG_MIME.to_owned(),
        bytes: vec![1, 2, 3],
    };
    assert_eq!(r.to_data_uri(), "data:image/png;base64,AQID");
    assert_eq!(r.into_payload().bytes().unwrap().as_ref(), &[1, 2, 3]);
}
