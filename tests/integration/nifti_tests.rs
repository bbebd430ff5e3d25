//! NIfTI loader integration tests.
//!
//! Tests verify:
//! - Compressed and uncompressed images are found and decoded
//! - 3D images get a channel axis
//! - Segmentations are read as class indices
//! - Stored label values outside 0..=255 are rejected, not wrapped
//! - Case discovery over a data root

use std::fs;

use ndarray::Array3;

use mri_prep::case::{read_labels, read_volume};
use mri_prep::{discover_cases, CaseLoader, IoError, NiftiCaseLoader, VolumeError};

use super::test_utils::{corner_labels, ramp_volume, DataRoot};

#[test]
fn test_read_volume_adds_channel_axis() {
    let root = DataRoot::new();
    let volume = ramp_volume((4, 5, 6));
    let path = root.write_imaging("case_00000", &volume);

    let loaded = read_volume(&path).unwrap();
    assert_eq!(loaded.dim(), (4, 5, 6, 1));
    assert_eq!(loaded[[3, 4, 5, 0]], volume[[3, 4, 5]]);
    assert_eq!(loaded[[1, 2, 3, 0]], volume[[1, 2, 3]]);
}

#[test]
fn test_read_labels_as_classes() {
    let root = DataRoot::new();
    let path = root.write_segmentation("case_00000", &corner_labels((4, 4, 4), 2));

    let labels = read_labels(&path).unwrap();
    assert_eq!(labels.dim(), (4, 4, 4, 1));
    assert_eq!(labels[[0, 0, 0, 0]], 1);
    assert_eq!(labels[[3, 3, 3, 0]], 0);
    assert_eq!(labels.iter().filter(|&&c| c == 1).count(), 8);
}

#[test]
fn test_read_labels_from_wide_integers() {
    let root = DataRoot::new();
    let labels = Array3::from_shape_fn((2, 2, 2), |(x, _, _)| x as i16 * 2);
    let path = root.write_segmentation_i16("case_00000", &labels);

    let classes = read_labels(&path).unwrap();
    assert_eq!(classes[[0, 1, 1, 0]], 0);
    assert_eq!(classes[[1, 0, 0, 0]], 2);
}

#[test]
fn test_read_labels_rejects_value_above_u8() {
    let root = DataRoot::new();
    let mut labels = Array3::<i16>::ones((2, 2, 2));
    labels[[1, 1, 1]] = 258;
    let path = root.write_segmentation_i16("case_00000", &labels);

    match read_labels(&path) {
        Err(IoError::InvalidLabels { source, .. }) => {
            assert_eq!(source, VolumeError::InvalidLabel { value: 258.0 });
        }
        other => panic!("Expected InvalidLabels, got {:?}", other),
    }
}

#[test]
fn test_read_labels_rejects_negative_value() {
    let root = DataRoot::new();
    let mut labels = Array3::<i16>::ones((2, 2, 2));
    labels[[0, 0, 0]] = -1;
    let path = root.write_segmentation_i16("case_00000", &labels);

    match read_labels(&path) {
        Err(IoError::InvalidLabels { source, .. }) => {
            assert_eq!(source, VolumeError::InvalidLabel { value: -1.0 });
        }
        other => panic!("Expected InvalidLabels, got {:?}", other),
    }
}

#[test]
fn test_loader_training_case() {
    let root = DataRoot::new();
    root.write_case(
        "case_00000",
        &ramp_volume((4, 4, 4)),
        &corner_labels((4, 4, 4), 2),
    );
    let loader = NiftiCaseLoader::new(root.cases_path());

    let case = loader.load("case_00000", true).unwrap();
    assert_eq!(case.volume.dim(), (4, 4, 4, 1));
    assert_eq!(case.labels.map(|l| l.dim()), Some((4, 4, 4, 1)));
}

#[test]
fn test_loader_prediction_skips_segmentation() {
    let root = DataRoot::new();
    root.write_imaging("case_00000", &ramp_volume((4, 4, 4)));
    let loader = NiftiCaseLoader::new(root.cases_path());

    let case = loader.load("case_00000", false).unwrap();
    assert!(case.labels.is_none());
}

#[test]
fn test_loader_uncompressed_fallback() {
    let root = DataRoot::new();
    root.write_imaging_uncompressed("case_00000", &ramp_volume((3, 3, 3)));
    let loader = NiftiCaseLoader::new(root.cases_path());

    let case = loader.load("case_00000", false).unwrap();
    assert_eq!(case.volume.dim(), (3, 3, 3, 1));
}

#[test]
fn test_loader_missing_segmentation() {
    let root = DataRoot::new();
    root.write_imaging("case_00000", &ramp_volume((4, 4, 4)));
    let loader = NiftiCaseLoader::new(root.cases_path());

    let result = loader.load("case_00000", true);
    assert!(matches!(result, Err(IoError::NotFound(_))));
}

#[test]
fn test_corrupt_file_is_nifti_error() {
    let root = DataRoot::new();
    let path = root.write_imaging_uncompressed("case_00000", &ramp_volume((3, 3, 3)));
    fs::write(&path, b"definitely not a nifti header").unwrap();
    let loader = NiftiCaseLoader::new(root.cases_path());

    let result = loader.load("case_00000", false);
    assert!(matches!(result, Err(IoError::Nifti { .. })));
}

#[test]
fn test_discover_cases() {
    let root = DataRoot::new();
    for id in ["case_00002", "case_00000", "case_00001"] {
        root.write_imaging(id, &ramp_volume((2, 2, 2)));
    }

    let cases = discover_cases(&root.cases_path()).unwrap();
    assert_eq!(cases, vec!["case_00000", "case_00001", "case_00002"]);
}
