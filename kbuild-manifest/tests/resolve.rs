use std::path::PathBuf;

use kbuild_manifest::{ConfigFile, Normalizer, TargetResolver};
use kbuild_schema::Schema;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(path: PathBuf, content: &str) -> PathBuf {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn config_file_to_targets() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root.join("ksy/gif.ksy"), "meta:\n  id: gif\n");
    write(root.join("ksy/image/png.ksy"), "meta:\n  id: png\n");
    let config_path = write(
        root.join("kbuild.toml"),
        r#"
        inputDir = "ksy"
        outputDir = "parsers"
        search = true

        [formats."custom_gif.py"]
        path = "gif.ksy"
        postprocess = ["trimTrailingWhitespace"]
        "#,
    );

    let tree = ConfigFile::open(&config_path).unwrap().into_tree();
    let config = Normalizer::new(Schema::builtin())
        .unwrap()
        .with_postprocessors(["trimTrailingWhitespace"])
        .normalize(tree)
        .unwrap();

    assert_eq!(config.output_dir, root.join("parsers"));
    assert!(!config.repo.update);

    let targets = TargetResolver::new(&config, "py").resolve().unwrap();
    let keys: Vec<_> = targets.iter().map(|t| t.output_key.clone()).collect();
    assert_eq!(
        keys,
        vec![
            root.join("parsers/custom_gif.py"),
            root.join("parsers/image/png.py"),
        ]
    );
    assert_eq!(
        targets[0].postprocess.as_deref(),
        Some(&["trimTrailingWhitespace".to_string()][..])
    );
}

#[test]
fn pyproject_input_dir_follows_local_checkout() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let config_path = write(
        root.join("pyproject.toml"),
        r#"
        [project]
        name = "demo"

        [tool.kaitai]
        inputDir = "formats"
        outputDir = "demo/parsers"

        [tool.kaitai.repo]
        update = true
        localPath = "vendor/ksf"
        "#,
    );

    let tree = ConfigFile::open(&config_path).unwrap().into_tree();
    let config = Normalizer::new(Schema::builtin())
        .unwrap()
        .normalize(tree)
        .unwrap();

    assert_eq!(config.repo.local_path, Some(root.join("vendor/ksf")));
    assert_eq!(config.input_dir, root.join("vendor/ksf/formats"));
    assert_eq!(config.output_dir, root.join("demo/parsers"));
}

#[test]
fn output_dir_defaults_to_input_dir() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root.join("ksy/a.ksy"), "");
    let config_path = write(root.join("kbuild.toml"), "inputDir = \"ksy\"\nsearch = true\n");

    let tree = ConfigFile::open(&config_path).unwrap().into_tree();
    let config = Normalizer::new(Schema::builtin())
        .unwrap()
        .normalize(tree)
        .unwrap();
    let targets = TargetResolver::new(&config, "py").resolve().unwrap();

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].output_key, root.join("ksy/a.py"));
}
