//! Integration tests: full transformation run over CSV files on disk

use churn_prep::config::TransformationConfig;
use churn_prep::error::PrepError;
use churn_prep::preprocessing::ColumnPreprocessor;
use churn_prep::transformation::DataTransformation;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{content}").unwrap();
    path
}

fn small_config(dir: &TempDir) -> TransformationConfig {
    TransformationConfig::default()
        .with_numeric_columns(vec!["age".to_string()])
        .with_categorical_columns(vec!["city".to_string()])
        .with_artifact_path(dir.path().join("artifacts").join("preprocessor.json"))
}

#[test]
fn test_two_row_scenario() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,city,customer_status\n30,NYC,Stayed\n40,LA,Churned\n",
    );
    let test = write_csv(
        &dir,
        "test.csv",
        "age,city,customer_status\n35,SF,Stayed\n,NYC,Churned\n",
    );

    let runner = DataTransformation::new(small_config(&dir));
    let (train_matrix, test_matrix, artifact) = runner.run(&train, &test).unwrap();

    // [scaled_age, city_NYC, target]; age mean 35, population std 5;
    // city vocabulary sorts to [LA, NYC] with LA dropped; target
    // vocabulary sorts to [Churned, Stayed].
    assert_eq!(train_matrix.shape(), &[2, 3]);
    assert!((train_matrix[[0, 0]] + 1.0).abs() < 1e-12);
    assert_eq!(train_matrix[[0, 1]], 1.0);
    assert_eq!(train_matrix[[0, 2]], 1.0);
    assert!((train_matrix[[1, 0]] - 1.0).abs() < 1e-12);
    assert_eq!(train_matrix[[1, 1]], 0.0);
    assert_eq!(train_matrix[[1, 2]], 0.0);

    // Test row 0: age 35 scales to 0, unknown city SF encodes as zeros.
    // Test row 1: missing age imputes to the train median 35.
    assert_eq!(test_matrix.shape(), &[2, 3]);
    assert!(test_matrix[[0, 0]].abs() < 1e-12);
    assert_eq!(test_matrix[[0, 1]], 0.0);
    assert_eq!(test_matrix[[0, 2]], 1.0);
    assert!(test_matrix[[1, 0]].abs() < 1e-12);
    assert_eq!(test_matrix[[1, 1]], 1.0);
    assert_eq!(test_matrix[[1, 2]], 0.0);

    assert!(artifact.exists());
    assert!(std::fs::metadata(&artifact).unwrap().len() > 0);
}

#[test]
fn test_matrix_dimensions() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,tenure,city,contract,customer_status\n\
         30,1,NYC,Monthly,Stayed\n\
         40,2,LA,Yearly,Churned\n\
         50,3,SF,Monthly,Stayed\n\
         60,4,NYC,Yearly,Churned\n",
    );
    let test = write_csv(
        &dir,
        "test.csv",
        "age,tenure,city,contract,customer_status\n35,2,LA,Monthly,Stayed\n",
    );

    let config = TransformationConfig::default()
        .with_numeric_columns(vec!["age".to_string(), "tenure".to_string()])
        .with_categorical_columns(vec!["city".to_string(), "contract".to_string()])
        .with_artifact_path(dir.path().join("preprocessor.json"));

    let runner = DataTransformation::new(config);
    let (train_matrix, test_matrix, _) = runner.run(&train, &test).unwrap();

    // 2 numeric + (3 cities - 1) + (2 contracts - 1) + 1 target = 6
    assert_eq!(train_matrix.shape(), &[4, 6]);
    assert_eq!(test_matrix.shape(), &[1, 6]);
}

#[test]
fn test_missing_categorical_imputed_with_most_frequent() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,city,customer_status\n30,NYC,Stayed\n40,NYC,Churned\n50,LA,Stayed\n",
    );
    let test = write_csv(
        &dir,
        "test.csv",
        "age,city,customer_status\n40,,Stayed\n",
    );

    let runner = DataTransformation::new(small_config(&dir));
    let (_, test_matrix, _) = runner.run(&train, &test).unwrap();

    // NYC is most frequent in train, so the missing city encodes as NYC
    assert_eq!(test_matrix[[0, 1]], 1.0);
}

#[test]
fn test_missing_target_column_fails_with_schema_error() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,city,customer_status\n30,NYC,Stayed\n40,LA,Churned\n",
    );
    let test = write_csv(&dir, "test.csv", "age,city\n35,NYC\n");

    let runner = DataTransformation::new(small_config(&dir));
    let err = runner.run(&train, &test).unwrap_err();
    assert!(matches!(err, PrepError::SchemaError(_)));

    // The run aborted before persisting anything
    assert!(!runner.config().artifact_path.exists());
}

#[test]
fn test_missing_feature_column_in_test_fails_with_schema_error() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,city,customer_status\n30,NYC,Stayed\n40,LA,Churned\n",
    );
    let test = write_csv(&dir, "test.csv", "age,customer_status\n35,Stayed\n");

    let runner = DataTransformation::new(small_config(&dir));
    assert!(matches!(
        runner.run(&train, &test),
        Err(PrepError::SchemaError(_))
    ));
}

#[test]
fn test_missing_input_file_fails_with_data_load_error() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,city,customer_status\n30,NYC,Stayed\n",
    );

    let runner = DataTransformation::new(small_config(&dir));
    assert!(matches!(
        runner.run(&train, &dir.path().join("absent.csv")),
        Err(PrepError::DataLoadError(_))
    ));
}

#[test]
fn test_artifact_replays_without_refitting() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,city,customer_status\n30,NYC,Stayed\n40,LA,Churned\n50,SF,Stayed\n",
    );
    let test = write_csv(
        &dir,
        "test.csv",
        "age,city,customer_status\n45,LA,Churned\n",
    );

    let runner = DataTransformation::new(small_config(&dir));
    let (_, test_matrix, artifact) = runner.run(&train, &test).unwrap();

    // Reload the artifact and transform the test features again
    let preprocessor = ColumnPreprocessor::load(&artifact).unwrap();
    let test_df = churn_prep::utils::DataLoader::new()
        .load_csv(&test)
        .unwrap()
        .drop("customer_status")
        .unwrap();
    let replayed = preprocessor.transform(&test_df).unwrap();

    // Feature block matches the run's output exactly
    assert_eq!(replayed.nrows(), test_matrix.nrows());
    assert_eq!(replayed.ncols(), test_matrix.ncols() - 1);
    for i in 0..replayed.nrows() {
        for j in 0..replayed.ncols() {
            assert_eq!(replayed[[i, j]], test_matrix[[i, j]]);
        }
    }
}

#[test]
fn test_identical_inputs_give_identical_output() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,city,customer_status\n30,NYC,Stayed\n40,LA,Churned\n50,NYC,Stayed\n",
    );
    let test = write_csv(
        &dir,
        "test.csv",
        "age,city,customer_status\n45,LA,Churned\n",
    );

    let runner = DataTransformation::new(small_config(&dir));
    let (train_a, test_a, _) = runner.run(&train, &test).unwrap();
    let (train_b, test_b, _) = runner.run(&train, &test).unwrap();

    assert_eq!(train_a, train_b);
    assert_eq!(test_a, test_b);
}

#[test]
fn test_row_order_preserved() {
    let dir = TempDir::new().unwrap();
    let train = write_csv(
        &dir,
        "train.csv",
        "age,city,customer_status\n10,NYC,Stayed\n20,LA,Churned\n30,NYC,Stayed\n40,LA,Churned\n",
    );
    let test = write_csv(
        &dir,
        "test.csv",
        "age,city,customer_status\n10,NYC,Stayed\n40,LA,Churned\n",
    );

    let runner = DataTransformation::new(small_config(&dir));
    let (train_matrix, _, _) = runner.run(&train, &test).unwrap();

    // Ages are strictly increasing in the input, so the scaled column must be too
    for i in 1..train_matrix.nrows() {
        assert!(train_matrix[[i, 0]] > train_matrix[[i - 1, 0]]);
    }
}
