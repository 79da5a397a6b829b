//! Integration tests for the single-load model cache

use carprice_core::{Error, Feature, FeatureVector, RawInputs};
use carprice_model::{Frame, ModelLoader, ARTIFACT_FILE_NAME, PREDICT_COLUMN};
use std::path::PathBuf;
use std::sync::Arc;

fn bundled_artifact() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../GBM_grid_1_AutoML_1_20250807_144050_model_2")
}

fn copy_artifact_to(dir: &std::path::Path) {
    std::fs::copy(
        bundled_artifact().join(ARTIFACT_FILE_NAME),
        dir.join(ARTIFACT_FILE_NAME),
    )
    .unwrap();
}

#[tokio::test]
async fn test_repeated_calls_return_same_handle() {
    let loader = ModelLoader::new(bundled_artifact());
    assert!(!loader.is_loaded());
    assert_eq!(loader.load_count(), 0);

    let first = loader.get().await.unwrap();
    let second = loader.get().await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(loader.is_loaded());
    assert_eq!(loader.load_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_calls_load_once() {
    let loader = Arc::new(ModelLoader::new(bundled_artifact()));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let loader = loader.clone();
            tokio::spawn(async move { loader.get().await })
        })
        .collect();

    let models: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(loader.load_count(), 1);
    assert!(models.iter().all(|m| Arc::ptr_eq(m, &models[0])));
}

#[tokio::test]
async fn test_failed_load_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let loader = ModelLoader::new(dir.path());

    let err = loader.get().await.unwrap_err();
    assert!(matches!(err, Error::InvalidArtifact(_)));
    assert!(!loader.is_loaded());
    assert_eq!(loader.load_count(), 0);

    copy_artifact_to(dir.path());
    let model = loader.get().await.unwrap();
    assert_eq!(model.info.trees, 5);
    assert_eq!(loader.load_count(), 1);
}

#[tokio::test]
async fn test_missing_path_is_io_error() {
    let loader = ModelLoader::new("/nonexistent/carprice/model");
    assert!(matches!(loader.get().await, Err(Error::Io(_))));
}

#[tokio::test]
async fn test_malformed_artifact_is_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(ARTIFACT_FILE_NAME), "{ not json").unwrap();
    let loader = ModelLoader::new(dir.path());
    assert!(matches!(loader.get().await, Err(Error::Serialization(_))));
}

#[tokio::test]
async fn test_model_info() {
    let loader = ModelLoader::new(bundled_artifact());
    let model = loader.get().await.unwrap();
    let info = &model.info;

    assert_eq!(info.name, "GBM_grid_1_AutoML_1_20250807_144050_model_2");
    assert_eq!(info.algorithm, "gbm");
    assert_eq!(info.columns.len(), 10);
    assert_eq!(info.max_depth, 2);
    assert_eq!(info.sha256.len(), 64);
    assert!(info.path.ends_with(ARTIFACT_FILE_NAME));

    let engines = info.columns.iter().find(|c| c.name == "Engines").unwrap();
    assert_eq!(engines.cardinality, Some(19));
}

#[tokio::test]
async fn test_bundled_model_scores_example() {
    let loader = ModelLoader::new(bundled_artifact());
    let model = loader.get().await.unwrap();

    let inputs =
        RawInputs::from_values([3.0, 120.0, 2.0, 2000.0, 150.0, 210.0, 7.5, 1.0, 5.0, 300.0]);
    let vector = FeatureVector::coerce(&inputs).unwrap();
    let mut frame = Frame::from_features(&vector);
    frame.as_factor(Feature::EngineCode.column()).unwrap();
    frame.as_factor(Feature::FuelTypeCode.column()).unwrap();

    let prediction = model.model.predict(&frame).unwrap();
    assert_eq!(prediction.names(), &[PREDICT_COLUMN.to_string()]);
    assert_eq!(prediction.numeric_at(0, 0), Some(32_600.0));
}
