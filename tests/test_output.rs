mod common;
use common::*;

use std::collections::HashSet;

use surface_inspect::output::{encode_annotated, save_annotated, OutputFormat};
use surface_inspect::detection::loader::load;

fn failing_result() -> VerdictResult {
    Inspector::new(InspectionConfig::default())
        .unwrap()
        .inspect(&square_on_gray())
        .unwrap()
}

#[test]
fn annotated_image_is_persisted_as_jpeg() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let out_dir = dir.path().join("processed");
    let result = failing_result();

    let path = save_annotated(&result, &out_dir, "../uploads/part 7.png", OutputFormat::Jpeg)?;

    assert_eq!(path.parent(), Some(out_dir.as_path()));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("processed_"));
    assert!(name.ends_with("_part_7.jpg"));

    let reloaded = load(&path)?;
    assert_eq!((reloaded.width(), reloaded.height()), (200, 200));
    Ok(())
}

#[tokio::test]
async fn concurrent_writers_never_collide() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let result = std::sync::Arc::new(failing_result());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let result = result.clone();
        let out_dir = dir.path().to_path_buf();
        handles.push(tokio::task::spawn_blocking(move || {
            save_annotated(&result, &out_dir, "same.png", OutputFormat::Png)
        }));
    }

    let mut paths = HashSet::new();
    for handle in handles {
        paths.insert(handle.await??);
    }

    assert_eq!(paths.len(), 16);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 16);
    Ok(())
}

#[test]
fn unwritable_destination_is_a_persist_error() {
    let blocker = temp_file_with(b"not a directory", ".txt");
    let err = save_annotated(&failing_result(), blocker.path(), "part.png", OutputFormat::Jpeg).unwrap_err();
    assert!(matches!(err, InspectError::Persist { .. }));
    assert!(!err.is_input_error());
}

#[test]
fn encoded_bytes_decode_to_the_annotated_image() {
    let result = failing_result();
    let png = encode_annotated(&result, OutputFormat::Png).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
    assert_eq!(decoded, result.annotated_image);

    let jpeg = encode_annotated(&result, OutputFormat::Jpeg).unwrap();
    assert_eq!(image::guess_format(&jpeg).unwrap(), image::ImageFormat::Jpeg);
}

#[test]
fn report_serialises_without_pixels() {
    let result = failing_result();
    let report = result.report("part.png", None);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["status"], "Fail");
    assert_eq!(json["defect_count"], 1);
    assert_eq!(json["width"], 200);
    assert_eq!(json["defects"].as_array().unwrap().len(), 1);
    assert!(json.get("output_path").is_none());
}
