use includer::{BoxError, Includer, IncluderError, Order, Scope};
use std::fs;
use std::path::{MAIN_SEPARATOR, PathBuf};
use tempfile::tempdir;
fn real(path: impl Into<PathBuf>) -> PathBuf {
    fs::canonicalize(path.into()).unwrap()
}
#[test]
fn test_dir_order_groups_by_directory() {
    let dir = tempdir().unwrap();
    for d in ["d1", "d2"] {
        fs::create_dir(dir.path().join(d)).unwrap();
        for f in ["f1", "f2"] {
            fs::write(dir.path().join(d).join(f), f).unwrap();
        }
    }
    let root = real(dir.path());
    let mut includer = Includer::new();
    includer.set_dirs([root.join("d1"), root.join("d2")].iter().map(|p| p.to_string_lossy()));
    includer.set_files(["f1", "f2"]);
    assert_eq!(
        includer.paths(Order::DirOrder),
        vec![
            root.join("d1/f1"),
            root.join("d1/f2"),
            root.join("d2/f1"),
            root.join("d2/f2"),
        ]
    );
    assert_eq!(
        includer.paths(Order::FileOrder),
        vec![
            root.join("d1/f1"),
            root.join("d2/f1"),
            root.join("d1/f2"),
            root.join("d2/f2"),
        ]
    );
}
#[test]
fn test_missing_file_only_drops_its_pair() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("a")).unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("a/x.conf"), "a").unwrap();
    fs::write(dir.path().join("b/x.conf"), "b").unwrap();
    fs::write(dir.path().join("b/y.conf"), "b").unwrap();
    let root = real(dir.path());
    let mut includer = Includer::new();
    includer.add_dir(root.join("a").to_string_lossy());
    includer.add_dir(root.join("b").to_string_lossy());
    includer.set_files(["x.conf", "y.conf"]);
    assert_eq!(
        includer.paths(Order::DirOrder),
        vec![root.join("a/x.conf"), root.join("b/x.conf"), root.join("b/y.conf")]
    );
}
#[test]
fn test_parent_escape_is_omitted() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("inner")).unwrap();
    fs::write(dir.path().join("outside.txt"), "secret").unwrap();
    fs::write(dir.path().join("inner/inside.txt"), "ok").unwrap();
    let root = real(dir.path());
    let mut includer = Includer::new();
    includer.add_dir(root.join("inner").to_string_lossy());
    includer.set_files(["../outside.txt", "inside.txt"]);
    assert!(root.join("inner/../outside.txt").is_file());
    assert_eq!(includer.paths(Order::DirOrder), vec![root.join("inner/inside.txt")]);
}
#[test]
fn test_nested_relative_name_inside_dir_is_kept() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("conf/env")).unwrap();
    fs::write(dir.path().join("conf/env/prod.ini"), "x").unwrap();
    let root = real(dir.path());
    let mut includer = Includer::new();
    includer.add_dir(format!("{}/conf/", root.display()));
    includer.add_file("env/../env/prod.ini");
    assert_eq!(includer.paths(Order::FileOrder), vec![root.join("conf/env/prod.ini")]);
}
#[test]
fn test_directory_name_is_not_a_file() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("conf/sub")).unwrap();
    let root = real(dir.path());
    let mut includer = Includer::new();
    includer.add_dir(root.join("conf").to_string_lossy());
    includer.add_file("sub");
    assert!(includer.paths(Order::DirOrder).is_empty());
}
#[test]
fn test_duplicates_are_kept() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("same.txt"), "same").unwrap();
    let root = real(dir.path());
    let mut includer = Includer::new();
    includer.add_dir(root.to_string_lossy());
    includer.add_dir(format!("{}{}", root.display(), MAIN_SEPARATOR));
    includer.add_file("same.txt");
    assert_eq!(
        includer.paths(Order::DirOrder),
        vec![root.join("same.txt"), root.join("same.txt")]
    );
}
#[test]
fn test_only_full_order_names_are_accepted() {
    let mut includer = Includer::new();
    for name in ["dir", "file", "nonsense"] {
        assert!(
            matches!(includer.paths_by_name(name), Err(IncluderError::InvalidOrder(_))),
            "{name:?} must not be accepted as an order"
        );
    }
    assert!(matches!(
        includer.paths_by_name("nonsense"),
        Err(IncluderError::InvalidOrder(_))
    ));
    assert!(matches!(
        includer.read_by_name("nonsense"),
        Err(IncluderError::InvalidOrder(_))
    ));
    let mut never = |_: &mut Scope<'_>| -> Result<(), BoxError> {
        panic!("evaluator must not run for an invalid order")
    };
    assert!(matches!(
        includer.load_by_name("nonsense", &mut never),
        Err(IncluderError::InvalidOrder(_))
    ));
}
#[cfg(unix)]
#[test]
fn test_symlink_out_of_directory_is_omitted() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("conf")).unwrap();
    fs::write(dir.path().join("target.txt"), "elsewhere").unwrap();
    std::os::unix::fs::symlink(dir.path().join("target.txt"), dir.path().join("conf/link.txt"))
        .unwrap();
    let root = real(dir.path());
    let mut includer = Includer::new();
    includer.add_dir(root.join("conf").to_string_lossy());
    includer.add_file("link.txt");
    assert!(includer.paths(Order::DirOrder).is_empty());
}
