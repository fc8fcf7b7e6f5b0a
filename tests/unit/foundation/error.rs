use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EaselError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(EaselError::surface("x").to_string().contains("surface error:"));
    assert!(EaselError::decode("x").to_string().contains("decode error:"));
    assert!(
        EaselError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EaselError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
