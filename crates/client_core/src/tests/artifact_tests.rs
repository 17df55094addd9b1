use super::*;

#[test]
fn put_revokes_the_previous_handle() {
    let mut store = ArtifactStore::default();

    let first_handle = store.put(vec![1, 2, 3], OutputFormat::Png).handle();
    assert!(first_handle.is_live());
    assert_eq!(first_handle.bytes().expect("live").as_slice(), &[1, 2, 3]);

    let second_handle = store.put(vec![4, 5], OutputFormat::Webp).handle();
    assert!(!first_handle.is_live());
    assert!(first_handle.bytes().is_none());
    assert!(second_handle.is_live());
    assert_eq!(store.current().expect("current").bytes(), &[4, 5]);
}

#[test]
fn clear_revokes_and_drops_the_artifact() {
    let mut store = ArtifactStore::default();
    let handle = store.put(vec![9], OutputFormat::Jpeg).handle();

    store.clear();

    assert!(store.current().is_none());
    assert!(!handle.is_live());
}

#[test]
fn release_is_idempotent() {
    let mut store = ArtifactStore::default();
    store.put(vec![7], OutputFormat::Png);

    store.release();
    store.release();
    store.release();

    assert!(store.current().is_none());
}

#[test]
fn mime_type_follows_the_format() {
    let mut store = ArtifactStore::default();
    let artifact = store.put(vec![0], OutputFormat::Jpeg);
    assert_eq!(artifact.mime_type(), "image/jpeg");
    assert_eq!(artifact.handle().mime_type(), "image/jpeg");
}

#[test]
fn suggested_filename_maps_jpeg_to_jpg() {
    let mut store = ArtifactStore::default();
    let artifact = store.put(vec![0], OutputFormat::Jpeg).clone();
    assert_eq!(
        ArtifactStore::suggested_filename("report", &artifact),
        "report.jpg"
    );
}

#[test]
fn suggested_filename_defaults_a_blank_basename() {
    let mut store = ArtifactStore::default();
    let artifact = store.put(vec![0], OutputFormat::Png).clone();
    assert_eq!(
        ArtifactStore::suggested_filename("", &artifact),
        "generated-image.png"
    );
    assert_eq!(
        ArtifactStore::suggested_filename("   ", &artifact),
        "generated-image.png"
    );
}

#[test]
fn suggested_filename_trims_the_basename() {
    let mut store = ArtifactStore::default();
    let artifact = store.put(vec![0], OutputFormat::Webp).clone();
    assert_eq!(
        ArtifactStore::suggested_filename("  holiday card ", &artifact),
        "holiday card.webp"
    );
}
