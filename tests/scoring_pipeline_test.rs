use std::fs;
use tempfile::TempDir;
use veristat::{Catalog, RiskEngine, RiskError};

const HEADER: &str = "ResourceGroupId,Feature,CategoryName,VerificationResult,ControlStringId";

/// Dataset with four resource groups across the Storage category profile
/// plus an isolated KeyVault group.
fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
    let mut rows = vec![HEADER.to_string()];

    // rg-alpha {KeyVault}: 10 checks, 3 failures -> 30.00%.
    for i in 0..7 {
        rows.push(format!("rg-alpha,KeyVault,Security Infra,Passed,ctl-kv-{i}"));
    }
    for i in 7..10 {
        rows.push(format!("rg-alpha,KeyVault,Security Infra,Failed,ctl-kv-{i}"));
    }

    // rg-beta {Storage}: 4 checks, 0 failures -> 0.00%.
    for i in 0..4 {
        rows.push(format!("rg-beta,Storage,Storage,Passed,ctl-st-{i}"));
    }

    // rg-gamma {SQLDatabase}: 4 checks, 2 failures -> 50.00%.
    rows.push("rg-gamma,SQLDatabase,Storage,Failed,ctl-sql-0".to_string());
    rows.push("rg-gamma,SQLDatabase,Storage,Failed,ctl-sql-1".to_string());
    rows.push("rg-gamma,SQLDatabase,Storage,Passed,ctl-sql-2".to_string());
    rows.push("rg-gamma,SQLDatabase,Storage,Passed,ctl-sql-3".to_string());

    // rg-delta {CosmosDB}: 4 checks, 1 failure -> 25.00%.
    rows.push("rg-delta,CosmosDB,Storage,Failed,ctl-cos-0".to_string());
    for i in 1..4 {
        rows.push(format!("rg-delta,CosmosDB,Storage,Passed,ctl-cos-{i}"));
    }

    let path = dir.path().join("data.csv");
    fs::write(&path, rows.join("\n") + "\n").unwrap();
    path
}

#[test]
fn test_score_from_csv_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);

    let engine = RiskEngine::from_csv(Catalog::builtin(), &path).unwrap();
    let score = engine.score(&["KeyVault".to_string()]).unwrap();
    assert_eq!(format!("{score:.2}"), "30.00");
}

#[test]
fn test_recommendation_ranks_storage_profile() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);

    let engine = RiskEngine::from_csv(Catalog::builtin(), &path).unwrap();
    // SQLDatabase's primary parent is Storage; Storage, SQLDatabase, and
    // CosmosDB groups all reach the single-category {Storage} combination.
    let recommendation = engine
        .recommend(&["SQLDatabase".to_string()], None)
        .unwrap();

    assert_eq!(recommendation.current_category_group, ["Storage"]);
    assert_eq!(recommendation.total_fail_count, 2);
    assert_eq!(recommendation.security_rating, 50.0);

    let order: Vec<&str> = recommendation
        .recommended_feature_groups
        .iter()
        .map(|group| group.features[0].as_str())
        .collect();
    assert_eq!(order, ["Storage", "CosmosDB", "SQLDatabase"]);

    // Rates are non-decreasing.
    let rates: Vec<f64> = recommendation
        .recommended_feature_groups
        .iter()
        .map(|group| group.failure_percent)
        .collect();
    assert!(rates.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn test_snapshot_is_queried_not_rebuilt() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);

    let engine = RiskEngine::from_csv(Catalog::builtin(), &path).unwrap();

    // Deleting the dataset after the build proves queries hit the in-memory
    // snapshot only.
    fs::remove_file(&path).unwrap();
    assert!(engine.score(&["KeyVault".to_string()]).is_ok());
    assert!(engine
        .recommend(&["SQLDatabase".to_string()], None)
        .is_ok());
}

#[test]
fn test_empty_dataset_builds_empty_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, format!("{HEADER}\n")).unwrap();

    let engine = RiskEngine::from_csv(Catalog::builtin(), &path).unwrap();
    assert_eq!(engine.stats().feature_groups, 0);

    let err = engine.score(&["KeyVault".to_string()]).unwrap_err();
    assert!(matches!(err, RiskError::UnknownFeatureSet { .. }));
}

#[test]
fn test_malformed_dataset_aborts_build() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.csv");
    fs::write(
        &path,
        format!("{HEADER}\nrg-1,KeyVault,Security Infra,Passed,ctl-1\nrg-2,Storage\n"),
    )
    .unwrap();

    let err = RiskEngine::from_csv(Catalog::builtin(), &path).unwrap_err();
    assert!(matches!(err, RiskError::MalformedInput { record: 2, .. }));
}

#[test]
fn test_multi_feature_group_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("multi.csv");
    fs::write(
        &path,
        format!(
            "{HEADER}\n\
             rg-1,AppService,Web Front End,Passed,ctl-1\n\
             rg-1,VirtualNetwork,Network Isolation,Failed,ctl-2\n"
        ),
    )
    .unwrap();

    let engine = RiskEngine::from_csv(Catalog::builtin(), &path).unwrap();

    // 2 parents x 2 parents = 4 category combinations for the one group.
    assert_eq!(engine.stats().category_combinations, 4);

    let score = engine
        .score(&["VirtualNetwork".to_string(), "AppService".to_string()])
        .unwrap();
    assert_eq!(score, 50.0);
}
