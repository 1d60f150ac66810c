//! End-to-end export scenarios against a synthetic Ollama store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use ollex::export::ExportDriver;
use ollex::store::catalog::list_available_models;
use ollex::store::layout::{digest_to_filename, filename_to_digest};
use ollex::store::StoreLayout;
use ollex::ExportError;

const NAMESPACE: &str = "manifests/registry.ollama.ai/library";

/// Write a manifest whose config digest is `config` and whose layers are
/// `layers`, in the shape Ollama writes them.
fn write_manifest(root: &Path, name: &str, tag: &str, config: &str, layers: &[&str]) {
    let dir = root.join(NAMESPACE).join(name);
    fs::create_dir_all(&dir).unwrap();

    let layer_entries: Vec<String> = layers
        .iter()
        .map(|digest| {
            format!(
                r#"{{"mediaType":"application/vnd.ollama.image.model","digest":"{digest}","size":0}}"#
            )
        })
        .collect();
    let doc = format!(
        r#"{{"schemaVersion":2,"config":{{"mediaType":"application/vnd.docker.container.image.v1+json","digest":"{config}","size":0}},"layers":[{}]}}"#,
        layer_entries.join(",")
    );
    fs::write(dir.join(tag), doc).unwrap();
}

fn write_blob(root: &Path, digest: &str) {
    let dir = root.join("blobs");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(digest_to_filename(digest)), format!("content of {digest}")).unwrap();
}

/// A complete model: manifest plus every blob it references.
fn seed_model(root: &Path, name: &str, tag: &str, config: &str, layers: &[&str]) {
    write_manifest(root, name, tag, config, layers);
    write_blob(root, config);
    for digest in layers {
        write_blob(root, digest);
    }
}

fn driver(source: &Path, dest: &Path) -> ExportDriver {
    fs::create_dir_all(dest.join("blobs")).unwrap();
    ExportDriver::new(StoreLayout::new(source), StoreLayout::new(dest))
}

fn selection(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| (*t).to_string()).collect()
}

/// Every regular file under `root`, as (relative path, contents).
fn tree_contents(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

#[test]
fn test_export_single_model_exact_contents() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    seed_model(src.path(), "llama2", "latest", "sha256:aaa", &["sha256:bbb"]);
    // An unrelated blob that must NOT be exported
    write_blob(src.path(), "sha256:unrelated");

    let summary = driver(src.path(), dst.path())
        .run(&selection(&["llama2"]))
        .unwrap();

    assert_eq!(summary.models_processed, 1);
    assert_eq!(summary.blobs_copied, 2);
    assert!(summary.failed.is_empty());

    let files: Vec<PathBuf> = tree_contents(dst.path()).into_keys().collect();
    assert_eq!(
        files,
        vec![
            PathBuf::from("blobs/sha256-aaa"),
            PathBuf::from("blobs/sha256-bbb"),
            PathBuf::from("manifests/registry.ollama.ai/library/llama2/latest"),
        ]
    );
}

#[test]
fn test_round_trip_integrity() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    seed_model(src.path(), "llama2", "latest", "sha256:cfg1", &["sha256:aaa", "sha256:bbb"]);
    seed_model(src.path(), "mistral", "7b", "sha256:cfg2", &["sha256:aaa", "sha256:ccc"]);

    driver(src.path(), dst.path()).run(&[]).unwrap();

    // Every digest reachable from an exported manifest has a blob, and every
    // exported blob is justified by some exported manifest.
    let mut referenced = std::collections::BTreeSet::new();
    for (rel, bytes) in tree_contents(dst.path()) {
        if !rel.starts_with("manifests") {
            continue;
        }
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        referenced.insert(doc["config"]["digest"].as_str().unwrap().to_string());
        for layer in doc["layers"].as_array().unwrap() {
            referenced.insert(layer["digest"].as_str().unwrap().to_string());
        }
    }

    let exported: std::collections::BTreeSet<String> = fs::read_dir(dst.path().join("blobs"))
        .unwrap()
        .flatten()
        .map(|e| filename_to_digest(e.file_name().to_str().unwrap()))
        .collect();

    assert_eq!(referenced, exported);
    for digest in &referenced {
        assert!(dst.path().join("blobs").join(digest_to_filename(digest)).is_file());
    }
}

#[test]
fn test_export_twice_is_idempotent() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    seed_model(src.path(), "llama2", "latest", "sha256:aaa", &["sha256:bbb"]);

    let d = driver(src.path(), dst.path());
    d.run(&selection(&["llama2"])).unwrap();
    let first = tree_contents(dst.path());

    let summary = d.run(&selection(&["llama2"])).unwrap();
    let second = tree_contents(dst.path());

    assert_eq!(first, second);
    assert_eq!(summary.models_processed, 1);
    assert_eq!(summary.blobs_copied, 0);
}

#[test]
fn test_empty_selection_exports_catalog_union() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    seed_model(src.path(), "llama2", "latest", "sha256:c1", &["sha256:l1"]);
    seed_model(src.path(), "mistral", "7b", "sha256:c2", &["sha256:l2"]);
    seed_model(src.path(), "mistral", "latest", "sha256:c3", &["sha256:l3"]);

    let available = list_available_models(&StoreLayout::new(src.path())).unwrap();
    assert_eq!(available.len(), 3);

    let summary = driver(src.path(), dst.path()).run(&[]).unwrap();
    assert_eq!(summary.models_processed, available.len());
    assert!(summary.failed.is_empty());

    for model in &available {
        let (name, tag) = model.split_once(':').unwrap();
        assert!(dst.path().join(NAMESPACE).join(name).join(tag).is_file());
    }
}

#[test]
fn test_duplicate_selection_copies_once() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    seed_model(src.path(), "llama2", "latest", "sha256:aaa", &["sha256:bbb"]);

    let summary = driver(src.path(), dst.path())
        .run(&selection(&["llama2:latest", "llama2", "llama2:latest"]))
        .unwrap();

    assert_eq!(summary.models_processed, 1);
    assert_eq!(summary.blobs_copied, 2);
    assert!(summary.failed.is_empty());
}

#[test]
fn test_missing_blob_fails_model_but_run_continues() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    // manifest references sha256:deadbeef but no such blob exists
    write_manifest(src.path(), "broken", "latest", "sha256:cfg", &["sha256:deadbeef"]);
    write_blob(src.path(), "sha256:cfg");
    seed_model(src.path(), "healthy", "latest", "sha256:aaa", &["sha256:bbb"]);

    let summary = driver(src.path(), dst.path())
        .run(&selection(&["broken", "healthy"]))
        .unwrap();

    assert_eq!(summary.models_processed, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "broken:latest");
    assert!(summary.failed[0].1.contains("sha256:deadbeef"));

    // The healthy sibling was still exported in full
    assert!(dst.path().join(NAMESPACE).join("healthy/latest").is_file());
    assert!(dst.path().join("blobs/sha256-aaa").is_file());
    assert!(dst.path().join("blobs/sha256-bbb").is_file());
    // The missing blob never appeared
    assert!(!dst.path().join("blobs/sha256-deadbeef").exists());
}

#[test]
fn test_unknown_model_fails_alone() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    seed_model(src.path(), "llama2", "latest", "sha256:aaa", &["sha256:bbb"]);

    let summary = driver(src.path(), dst.path())
        .run(&selection(&["ghost:v1", "llama2"]))
        .unwrap();

    assert_eq!(summary.models_processed, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "ghost:v1");
    assert!(summary.failed[0].1.contains("not found"));
}

#[test]
fn test_empty_selection_on_empty_store_aborts_run() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::create_dir_all(src.path().join("blobs")).unwrap();

    let err = driver(src.path(), dst.path()).run(&[]).unwrap_err();
    assert!(matches!(err, ExportError::CatalogNotFound(_)));
}

#[test]
fn test_malformed_manifest_fails_model_but_run_continues() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let dir = src.path().join(NAMESPACE).join("garbled");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("latest"), "{{{ not json").unwrap();
    seed_model(src.path(), "llama2", "latest", "sha256:aaa", &["sha256:bbb"]);

    let summary = driver(src.path(), dst.path())
        .run(&selection(&["garbled", "llama2"]))
        .unwrap();

    assert_eq!(summary.models_processed, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, "garbled:latest");
}

#[test]
fn test_shared_blob_across_models_copied_once() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    seed_model(src.path(), "llama2", "latest", "sha256:cfg1", &["sha256:shared"]);
    seed_model(src.path(), "mistral", "latest", "sha256:cfg2", &["sha256:shared"]);

    let summary = driver(src.path(), dst.path())
        .run(&selection(&["llama2", "mistral"]))
        .unwrap();

    assert_eq!(summary.models_processed, 2);
    // cfg1 + cfg2 + shared (counted once, the second copy is a skip)
    assert_eq!(summary.blobs_copied, 3);
}
