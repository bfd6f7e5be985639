use super::*;

#[test]
fn clones_share_the_flag() {
    let a = CancelToken::new();
    let b = a.clone();
    assert!(a.check("render").is_ok());
    b.cancel();
    assert!(a.is_cancelled());
    let err = a.check("render").unwrap_err();
    assert!(matches!(err, OverstampError::Cancelled(_)));
    assert!(err.to_string().contains("render was cancelled"));
}
