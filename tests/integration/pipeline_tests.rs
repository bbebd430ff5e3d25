//! End-to-end preprocessing tests.
//!
//! Tests verify:
//! - A full pass over NIfTI cases writes aligned volume and label batches
//! - The saved case index resolves global batches to the right files
//! - Blank filtering and rotation change batch counts as expected
//! - A failing case aborts the pass without an index

use ndarray::{s, Axis};

use mri_prep::{
    ConfigError, Mode, NiftiCaseLoader, NpyCaseStore, PipelineConfig, PrepError, Preprocessor, VolumeError,
};

use super::test_utils::{corner_labels, ramp_volume, DataRoot};

fn preprocessor(
    root: &DataRoot,
    config: PipelineConfig,
) -> Preprocessor<NiftiCaseLoader, NpyCaseStore> {
    let loader = NiftiCaseLoader::new(root.cases_path());
    let store = NpyCaseStore::new(root.output());
    Preprocessor::new(config, loader, store).unwrap()
}

fn config(root: &DataRoot) -> PipelineConfig {
    PipelineConfig::new(root.cases_path())
        .with_patch_size([4, 4, 4])
        .with_batch_size(4)
        .with_classes(2)
}

// =============================================================================
// Full Pass
// =============================================================================

#[test]
fn test_training_pass_writes_batches_and_index() {
    let root = DataRoot::new();
    root.write_case("case_a", &ramp_volume((8, 8, 8)), &corner_labels((8, 8, 8), 4));
    root.write_case("case_b", &ramp_volume((12, 8, 8)), &corner_labels((12, 8, 8), 4));
    let preprocessor = preprocessor(&root, config(&root));

    // case_a: 2x2x2 = 8 patches -> 2 batches, case_b: 3x2x2 = 12 -> 3 batches
    let index = preprocessor
        .preprocess_cases(["case_a", "case_b"], Mode::Training)
        .unwrap();
    assert_eq!(
        index.entries(),
        ["case_a", "case_a", "case_b", "case_b", "case_b"]
    );

    let store = preprocessor.store();
    store.save_index(&index).unwrap();
    assert_eq!(store.load_index().unwrap(), index);

    let location = index.locate(3).unwrap();
    assert_eq!(location.case_id, "case_b");
    assert_eq!(location.local, 1);

    let volume = store
        .read_volume_batch(location.case_id, location.local)
        .unwrap();
    let labels = store
        .read_label_batch(location.case_id, location.local)
        .unwrap();
    assert_eq!(volume.dim(), (4, 4, 4, 4, 1));
    assert_eq!(labels.dim(), (4, 4, 4, 4, 1, 2));

    // Every voxel carries exactly one class
    for sums in labels.sum_axis(Axis(5)).iter() {
        assert_eq!(*sums, 1.0);
    }
}

#[test]
fn test_first_patch_matches_volume_corner() {
    let root = DataRoot::new();
    let volume = ramp_volume((8, 8, 8));
    root.write_imaging("case_a", &volume);
    let preprocessor = preprocessor(&root, config(&root));

    preprocessor
        .preprocess_cases(["case_a"], Mode::Prediction)
        .unwrap();

    let batch = preprocessor.store().read_volume_batch("case_a", 0).unwrap();
    let first = batch.slice(s![0, .., .., .., 0]);
    assert_eq!(first, volume.slice(s![..4, ..4, ..4]));

    // Second patch in row-major order moves along z
    let second = batch.slice(s![1, .., .., .., 0]);
    assert_eq!(second, volume.slice(s![..4, ..4, 4..]));
}

#[test]
fn test_prediction_writes_no_labels() {
    let root = DataRoot::new();
    root.write_case("case_a", &ramp_volume((8, 8, 8)), &corner_labels((8, 8, 8), 4));
    let preprocessor = preprocessor(&root, config(&root));

    let index = preprocessor
        .preprocess_cases(["case_a"], Mode::Prediction)
        .unwrap();
    assert_eq!(index.len(), 2);

    let store = preprocessor.store();
    assert!(store.volume_batch_path("case_a", 1).is_file());
    assert!(!store.label_batch_path("case_a", 0).exists());
}

// =============================================================================
// Filtering and Augmentation
// =============================================================================

#[test]
fn test_skip_blanks_and_rotation() {
    let root = DataRoot::new();
    root.write_case("case_a", &ramp_volume((8, 8, 8)), &corner_labels((8, 8, 8), 4));
    let config = config(&root)
        .with_batch_size(2)
        .with_skip_blanks(true)
        .with_rotation(true);
    let preprocessor = preprocessor(&root, config);

    // One foreground patch survives; rotation adds three copies
    let index = preprocessor
        .preprocess_cases(["case_a"], Mode::Training)
        .unwrap();
    assert_eq!(index.entries(), ["case_a", "case_a"]);

    let store = preprocessor.store();
    let first = store.read_volume_batch("case_a", 0).unwrap();
    let second = store.read_volume_batch("case_a", 1).unwrap();
    assert_eq!(first.dim().0, 2);
    assert_eq!(second.dim().0, 2);

    // Rotation keeps the voxel multiset of each patch
    let original: f32 = first.index_axis(Axis(0), 0).sum();
    let rotated: f32 = first.index_axis(Axis(0), 1).sum();
    assert_eq!(original, rotated);
}

#[test]
fn test_overlap_increases_patch_count() {
    let root = DataRoot::new();
    root.write_imaging("case_a", &ramp_volume((8, 8, 8)));
    let config = config(&root).with_overlap([2, 2, 2]).with_batch_size(27);
    let preprocessor = preprocessor(&root, config);

    let case = preprocessor
        .prepare_case("case_a", Mode::Prediction)
        .unwrap();
    assert_eq!(case.grid_counts, [3, 3, 3]);
    assert_eq!(case.steps(), 1);
    assert_eq!(case.volume_batches[0].dim().0, 27);
}

#[test]
fn test_scaled_batches_in_unit_range() {
    let root = DataRoot::new();
    root.write_imaging("case_a", &ramp_volume((8, 8, 8)));
    let config = config(&root).with_scaling(true);
    let preprocessor = preprocessor(&root, config);

    preprocessor
        .preprocess_cases(["case_a"], Mode::Prediction)
        .unwrap();

    for batch in 0..2 {
        let volume = preprocessor
            .store()
            .read_volume_batch("case_a", batch)
            .unwrap();
        assert!(volume.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_shape_mismatch_aborts_pass() {
    let root = DataRoot::new();
    root.write_case("case_a", &ramp_volume((8, 8, 8)), &corner_labels((8, 8, 8), 4));
    root.write_case("case_b", &ramp_volume((8, 8, 8)), &corner_labels((8, 8, 4), 4));
    let preprocessor = preprocessor(&root, config(&root));

    let result = preprocessor.preprocess_cases(["case_a", "case_b"], Mode::Training);
    assert!(matches!(
        result,
        Err(PrepError::Volume(VolumeError::ShapeMismatch { .. }))
    ));

    // The case processed before the failure keeps its batches
    let store = preprocessor.store();
    assert!(store.volume_batch_path("case_a", 0).is_file());
    assert!(!store.case_dir("case_b").exists());
}

#[test]
fn test_class_outside_configured_range() {
    let root = DataRoot::new();
    let mut labels = corner_labels((8, 8, 8), 4);
    labels[[7, 7, 7]] = 2;
    root.write_case("case_a", &ramp_volume((8, 8, 8)), &labels);
    let preprocessor = preprocessor(&root, config(&root));

    let result = preprocessor.preprocess_cases(["case_a"], Mode::Training);
    assert!(matches!(
        result,
        Err(PrepError::Volume(VolumeError::ClassOutOfRange { class: 2, classes: 2 }))
    ));
}

#[test]
fn test_repeated_case_id_writes_nothing() {
    let root = DataRoot::new();
    root.write_imaging("case_a", &ramp_volume((8, 8, 8)));
    let preprocessor = preprocessor(&root, config(&root));

    let result = preprocessor.preprocess_cases(["case_a", "case_a"], Mode::Prediction);
    assert!(matches!(
        result,
        Err(PrepError::Config(ConfigError::DuplicateCase(_)))
    ));
    assert!(!preprocessor.store().case_dir("case_a").exists());
}
