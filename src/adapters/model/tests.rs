use super::*;
use std::path::Path;
use tempfile::tempdir;

fn exported() -> ExportedLogisticModel {
    ExportedLogisticModel {
        format_version: 1,
        feature_names: FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
        coefficients: vec![0.1232, 0.0352, -0.0133, 0.0006, -0.0012, 0.0897, 0.9452, 0.0149],
        intercept: -8.4047,
        scaler_mean: None,
        scaler_scale: None,
        threshold: 0.5,
    }
}

fn write_model(dir: &Path, model: &ExportedLogisticModel) -> Vec<u8> {
    let bytes = serde_json::to_vec_pretty(model).expect("serialize model");
    std::fs::write(dir.join(MODEL_FILE_NAME), &bytes).expect("write model");
    bytes
}

fn write_manifest(dir: &Path, files: &[(&str, String)]) {
    let manifest = ModelManifest {
        version: 1,
        created_at: Some(chrono::Utc::now()),
        files: files
            .iter()
            .map(|(name, digest)| ((*name).to_string(), digest.clone()))
            .collect(),
    };
    let bytes = serde_json::to_vec(&manifest).expect("serialize manifest");
    std::fs::write(dir.join(MANIFEST_FILE_NAME), bytes).expect("write manifest");
}

#[test]
fn test_load_from_directory_without_manifest() {
    let temp = tempdir().expect("tempdir");
    write_model(temp.path(), &exported());

    let model = LogisticModel::load(temp.path(), LoadOptions::default()).expect("load model");
    assert!((model.threshold() - 0.5).abs() < f64::EPSILON);
    assert!(model.describe().contains(MODEL_FILE_NAME));
}

#[test]
fn test_load_from_file_path() {
    let temp = tempdir().expect("tempdir");
    write_model(temp.path(), &exported());

    let path = temp.path().join(MODEL_FILE_NAME);
    LogisticModel::load(&path, LoadOptions::default()).expect("load model file");
}

#[test]
fn test_missing_manifest_rejected_when_required() {
    let temp = tempdir().expect("tempdir");
    write_model(temp.path(), &exported());

    let err = LogisticModel::load(
        temp.path(),
        LoadOptions {
            require_manifest: true,
        },
    )
    .expect_err("must fail without manifest");
    assert!(matches!(err, ModelError::ManifestMissing(_)));
}

#[test]
fn test_manifest_digest_match() {
    let temp = tempdir().expect("tempdir");
    let bytes = write_model(temp.path(), &exported());
    write_manifest(temp.path(), &[(MODEL_FILE_NAME, sha256_hex(&bytes).to_uppercase())]);

    LogisticModel::load(
        temp.path(),
        LoadOptions {
            require_manifest: true,
        },
    )
    .expect("digest should match regardless of hex case");
}

#[test]
fn test_manifest_digest_mismatch() {
    let temp = tempdir().expect("tempdir");
    write_model(temp.path(), &exported());
    write_manifest(temp.path(), &[(MODEL_FILE_NAME, sha256_hex(b"something else"))]);

    let err = LogisticModel::load(temp.path(), LoadOptions::default()).expect_err("must fail");
    assert!(matches!(err, ModelError::Integrity(_)));
}

#[test]
fn test_manifest_without_model_entry() {
    let temp = tempdir().expect("tempdir");
    write_model(temp.path(), &exported());
    write_manifest(temp.path(), &[("other.json", sha256_hex(b"x"))]);

    let err = LogisticModel::load(temp.path(), LoadOptions::default()).expect_err("must fail");
    assert!(err.to_string().contains("not listed"));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = tempdir().expect("tempdir");
    let err = LogisticModel::load(temp.path(), LoadOptions::default()).expect_err("must fail");
    assert!(matches!(err, ModelError::Io { .. }));
}

#[test]
fn test_malformed_json() {
    let temp = tempdir().expect("tempdir");
    std::fs::write(temp.path().join(MODEL_FILE_NAME), b"{ not json").expect("write");

    let err = LogisticModel::load(temp.path(), LoadOptions::default()).expect_err("must fail");
    assert!(matches!(err, ModelError::Format(_)));
}

#[test]
fn test_rejects_wrong_feature_count() {
    let mut model = exported();
    model.feature_names.pop();
    model.coefficients.pop();

    let err = LogisticModel::from_exported(model).expect_err("must fail");
    assert!(matches!(
        err,
        ModelError::FeatureCount {
            expected: 8,
            got: 7
        }
    ));
}

#[test]
fn test_rejects_reordered_features() {
    let mut model = exported();
    model.feature_names.swap(5, 7);

    let err = LogisticModel::from_exported(model).expect_err("must fail");
    match err {
        ModelError::FeatureOrder {
            position,
            expected,
            got,
        } => {
            assert_eq!(position, 5);
            assert_eq!(expected, "bmi");
            assert_eq!(got, "age");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_rejects_parameter_length_mismatch() {
    let mut model = exported();
    model.scaler_mean = Some(vec![0.0; 3]);

    let err = LogisticModel::from_exported(model).expect_err("must fail");
    assert!(matches!(
        err,
        ModelError::ParameterLength {
            name: "scaler_mean",
            ..
        }
    ));
}

#[test]
fn test_rejects_invalid_parameters() {
    let mut model = exported();
    model.coefficients[2] = f64::NAN;
    assert!(matches!(
        LogisticModel::from_exported(model),
        Err(ModelError::InvalidParameter(_))
    ));

    let mut model = exported();
    model.scaler_scale = Some(vec![1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    assert!(matches!(
        LogisticModel::from_exported(model),
        Err(ModelError::InvalidParameter(_))
    ));

    let mut model = exported();
    model.threshold = 1.0;
    assert!(matches!(
        LogisticModel::from_exported(model),
        Err(ModelError::InvalidParameter(_))
    ));

    let mut model = exported();
    model.format_version = 2;
    assert!(matches!(
        LogisticModel::from_exported(model),
        Err(ModelError::UnsupportedVersion { got: 2, .. })
    ));
}

#[test]
fn test_prediction_thresholds() {
    let model = LogisticModel::from_exported(exported()).expect("valid model");

    let high = FeatureVector([5.0, 200.0, 80.0, 20.0, 80.0, 45.0, 0.5, 70.0]);
    let low = FeatureVector([0.0, 80.0, 70.0, 20.0, 80.0, 20.0, 0.5, 25.0]);

    assert!(model.probability(&high) > 0.9);
    assert!(model.probability(&low) < 0.1);
    assert_eq!(model.predict(&high), RiskLabel::Elevated);
    assert_eq!(model.predict(&low), RiskLabel::Low);
}

#[test]
fn test_scaler_is_applied() {
    let mut params = exported();
    params.coefficients = vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    params.intercept = 0.0;
    params.scaler_mean = Some(vec![0.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    params.scaler_scale = Some(vec![1.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    let model = LogisticModel::from_exported(params).expect("valid model");

    // glucose at the mean gives z = 0
    let at_mean = FeatureVector([0.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert!((model.probability(&at_mean) - 0.5).abs() < 1e-12);
    assert_eq!(model.predict(&at_mean), RiskLabel::Elevated);

    let below = FeatureVector([0.0, 90.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    assert_eq!(model.predict(&below), RiskLabel::Low);
}

#[test]
fn test_bundled_model_loads_with_manifest() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
    let model = LogisticModel::load(
        &dir,
        LoadOptions {
            require_manifest: true,
        },
    )
    .expect("bundled model must load");

    let alex = FeatureVector([2.0, 150.0, 90.0, 20.0, 80.0, 85.0 / (1.7 * 1.7), 0.5, 45.0]);
    let p = model.probability(&alex);
    assert!(p > 0.0 && p < 1.0);
}

#[test]
fn test_constant_time_eq() {
    assert!(constant_time_eq_str("abc", "abc"));
    assert!(!constant_time_eq_str("abc", "abd"));
    assert!(!constant_time_eq_str("abc", "abcd"));
}

#[test]
fn test_generated_manifest_verifies() {
    let dir = tempdir().expect("tempdir");
    write_model(dir.path(), &exported());
    std::fs::write(dir.path().join("notes.txt"), "not hashed").expect("write notes");

    let manifest = ModelManifest::for_directory(dir.path()).expect("manifest");
    assert_eq!(manifest.files.len(), 1);
    assert!(manifest.files.contains_key(MODEL_FILE_NAME));

    manifest.write_to(dir.path()).expect("write manifest");

    // Regenerating skips the manifest file itself
    let again = ModelManifest::for_directory(dir.path()).expect("manifest");
    assert_eq!(again.files, manifest.files);

    let options = LoadOptions {
        require_manifest: true,
    };
    assert!(LogisticModel::load(dir.path(), options).is_ok());
}

#[test]
fn test_generated_manifest_requires_artifacts() {
    let dir = tempdir().expect("tempdir");
    let err = ModelManifest::for_directory(dir.path()).expect_err("must fail");
    assert!(matches!(err, ModelError::Integrity(_)));
}
