//! Unit tests for the local host operation adapters.

use teleshell::ops::{HostOps, LocalHost};
use teleshell::AppError;

#[tokio::test]
async fn list_files_reports_dotted_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.log"), b"log").unwrap();
    std::fs::write(dir.path().join("a.txt"), b"text").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let ops = LocalHost::new();
    let files = ops
        .list_files(&dir.path().to_string_lossy())
        .await
        .unwrap();

    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("a.txt"));
    assert!(files[1].ends_with("b.log"));
}

#[tokio::test]
async fn list_files_skips_extensionless_entries() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("README"), b"plain").unwrap();
    std::fs::write(dir.path().join("notes.md"), b"notes").unwrap();

    let ops = LocalHost::new();
    let files = ops
        .list_files(&dir.path().to_string_lossy())
        .await
        .unwrap();

    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("notes.md"));
}

#[tokio::test]
async fn list_files_on_missing_directory_is_empty() {
    let ops = LocalHost::new();
    let files = ops.list_files("/nonexistent/teleshell-dir").await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn delete_file_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("victim.txt");
    std::fs::write(&target, b"bytes").unwrap();

    let ops = LocalHost::new();
    ops.delete_file(&target.to_string_lossy()).await.unwrap();

    assert!(!target.exists());
}

#[tokio::test]
async fn delete_missing_file_is_a_collaborator_error() {
    let ops = LocalHost::new();
    let err = ops
        .delete_file("/nonexistent/teleshell-file.txt")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Collaborator(_)), "got {err:?}");
}

#[tokio::test]
async fn copy_file_duplicates_the_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src.txt");
    let dest = dir.path().join("dest.txt");
    std::fs::write(&src, b"payload bytes").unwrap();

    let ops = LocalHost::new();
    ops.copy_file(&src.to_string_lossy(), &dest.to_string_lossy())
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"payload bytes");
    assert!(src.exists());
}

#[tokio::test]
async fn copy_missing_source_is_a_collaborator_error() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("dest.txt");

    let ops = LocalHost::new();
    let err = ops
        .copy_file("/nonexistent/src.txt", &dest.to_string_lossy())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Collaborator(_)), "got {err:?}");
}

#[cfg(unix)]
#[tokio::test]
async fn execute_program_runs_to_completion() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("ok.sh");
    std::fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let ops = LocalHost::new();
    ops.execute_program(&script.to_string_lossy()).await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn execute_program_with_failing_exit_is_a_collaborator_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("fail.sh");
    std::fs::write(&script, "#!/bin/sh\nexit 3\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let ops = LocalHost::new();
    let err = ops
        .execute_program(&script.to_string_lossy())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Collaborator(_)), "got {err:?}");
}

#[tokio::test]
async fn execute_missing_program_is_a_collaborator_error() {
    let ops = LocalHost::new();
    let err = ops
        .execute_program("/nonexistent/teleshell-program")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Collaborator(_)), "got {err:?}");
}
