//! End-to-end exercise of the pipeline stages against small fixture
//! artifacts.

use drift_semantic::application::{
    callgraph_stage, cluster_stage, depcontext_stage, fingerprint_stage, score_stage,
    typesig_stage,
};
use drift_semantic::config::PipelineConfig;
use drift_semantic::domain::cluster::Cluster;
use drift_semantic::domain::scored_pair::ScoredPair;
use drift_semantic::infrastructure::artifact_store::ArtifactStore;
use pretty_assertions::assert_eq;

fn write_code_units(dir: &std::path::Path, units: serde_json::Value) {
    std::fs::write(
        dir.join("code-units.json"),
        serde_json::to_string_pretty(&units).unwrap(),
    )
    .unwrap();
}

fn identical_unary_function_units() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "src/a.ts::foo",
            "kind": "function",
            "filePath": "src/a.ts",
            "name": "foo",
            "parameters": [{"name": "x", "type": "string"}],
            "returnType": "number"
        },
        {
            "id": "src/b.ts::bar",
            "kind": "function",
            "filePath": "src/b.ts",
            "name": "bar",
            "parameters": [{"name": "y", "type": "string"}],
            "returnType": "number"
        }
    ])
}

fn run_fct_and_score(dir: &std::path::Path, threshold: f64) -> Vec<ScoredPair> {
    let store = ArtifactStore::new(dir);
    fingerprint_stage::run(&store).unwrap();
    typesig_stage::run(&store).unwrap();
    callgraph_stage::run(&store).unwrap();
    depcontext_stage::run(&store).unwrap();
    let config = PipelineConfig {
        output_dir: dir.to_path_buf(),
        threshold,
        parallel: false,
    };
    score_stage::run(&store, &config).unwrap();
    store.read_required("similarity-matrix", "score").unwrap()
}

#[test]
fn identical_unary_functions_score_above_threshold_from_type_signature_alone() {
    let dir = tempfile::tempdir().unwrap();
    write_code_units(dir.path(), identical_unary_function_units());

    let pairs = run_fct_and_score(dir.path(), 0.05);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].dominant_signal, "typeSignature");
    assert!(pairs[0].score > 0.0 && pairs[0].score <= 1.0);
}

#[test]
fn same_file_pair_never_appears_regardless_of_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let mut units = identical_unary_function_units();
    units[1]["filePath"] = serde_json::json!("src/a.ts");
    write_code_units(dir.path(), units);

    let pairs = run_fct_and_score(dir.path(), 0.0);
    assert!(pairs.is_empty());
}

#[test]
fn threshold_above_one_yields_empty_matrix_and_no_clusters() {
    let dir = tempfile::tempdir().unwrap();
    write_code_units(dir.path(), identical_unary_function_units());

    let pairs = run_fct_and_score(dir.path(), 1.01);
    assert!(pairs.is_empty());

    let store = ArtifactStore::new(dir.path());
    let config = PipelineConfig {
        output_dir: dir.path().to_path_buf(),
        threshold: 1.01,
        parallel: false,
    };
    cluster_stage::run(&store, &config).unwrap();
    let clusters: Vec<Cluster> = store.read_required("clusters", "cluster").unwrap();
    assert!(clusters.is_empty());
}

#[test]
fn skipped_kinds_never_appear_in_scored_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let mut units = identical_unary_function_units();
    units[1]["kind"] = serde_json::json!("type");
    write_code_units(dir.path(), units);

    let pairs = run_fct_and_score(dir.path(), 0.0);
    assert!(pairs.iter().all(|p| p.unit_a != "src/b.ts::bar" && p.unit_b != "src/b.ts::bar"));
}

#[test]
fn incomparable_kinds_are_not_paired() {
    let dir = tempfile::tempdir().unwrap();
    let mut units = identical_unary_function_units();
    units[0]["kind"] = serde_json::json!("function");
    units[1]["kind"] = serde_json::json!("component");
    write_code_units(dir.path(), units);
    let pairs = run_fct_and_score(dir.path(), 0.0);
    assert!(pairs.is_empty());
}

#[test]
fn clustering_never_emits_singleton_clusters() {
    let dir = tempfile::tempdir().unwrap();
    write_code_units(dir.path(), identical_unary_function_units());
    let pairs = run_fct_and_score(dir.path(), 0.0);
    assert!(!pairs.is_empty());

    let store = ArtifactStore::new(dir.path());
    let config = PipelineConfig {
        output_dir: dir.path().to_path_buf(),
        threshold: 0.0,
        parallel: false,
    };
    cluster_stage::run(&store, &config).unwrap();
    let clusters: Vec<Cluster> = store.read_required("clusters", "cluster").unwrap();
    assert!(clusters.iter().all(|c| c.member_count >= 2));
}
