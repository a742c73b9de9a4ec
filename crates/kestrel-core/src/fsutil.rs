use std::fs;
use std::io;
use std::path::Path;

/// Recursively copies `src` into `dst`, dereferencing symlinks so the copy
/// is self-contained. Running browsers leave dangling singleton symlinks
/// and sockets inside live profiles; those entries are skipped.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let source = entry.path();
        let target = dst.join(entry.file_name());
        let meta = match fs::metadata(&source) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if meta.is_dir() {
            copy_dir_recursive(&source, &target)?;
        } else if meta.is_file() {
            fs::copy(&source, &target)?;
        }
    }
    Ok(())
}

/// Total size in bytes of all regular files under `path`.
pub fn dir_size(path: &Path) -> io::Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if meta.is_dir() {
            total += dir_size(&entry.path())?;
        } else if meta.is_file() {
            total += meta.len();
        }
    }
    Ok(total)
}

/// Removes `path` if present and recreates it empty.
pub fn clear_dir(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(path)
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copies_nested_directories_and_contents() {
        let src = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("nested/deeper")).unwrap();
        fs::write(src.path().join("top.txt"), b"top").unwrap();
        fs::write(src.path().join("nested/deeper/leaf.txt"), b"leaf").unwrap();

        let dst = TempDir::new().unwrap();
        let target = dst.path().join("copy");
        copy_dir_recursive(src.path(), &target).unwrap();

        assert_eq!(fs::read(target.join("top.txt")).unwrap(), b"top");
        assert_eq!(
            fs::read(target.join("nested/deeper/leaf.txt")).unwrap(),
            b"leaf"
        );
    }

    #[cfg(unix)]
    #[test]
    fn copy_dereferences_symlinks_and_skips_dangling_ones() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("real.txt"), b"real").unwrap();
        std::os::unix::fs::symlink(src.path().join("real.txt"), src.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(src.path().join("missing"), src.path().join("dangling"))
            .unwrap();

        let dst = TempDir::new().unwrap();
        let target = dst.path().join("copy");
        copy_dir_recursive(src.path(), &target).unwrap();

        assert_eq!(fs::read(target.join("link.txt")).unwrap(), b"real");
        assert!(!target.join("link.txt").is_symlink());
        assert!(!target.join("dangling").exists());
    }

    #[test]
    fn dir_size_sums_regular_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.bin"), vec![0u8; 100]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.bin"), vec![0u8; 50]).unwrap();
        assert_eq!(dir_size(dir.path()).unwrap(), 150);
    }

    #[test]
    fn clear_dir_recreates_an_empty_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stage");
        fs::create_dir_all(target.join("junk")).unwrap();
        fs::write(target.join("junk/file"), b"x").unwrap();

        clear_dir(&target).unwrap();
        assert!(target.is_dir());
        assert_eq!(fs::read_dir(&target).unwrap().count(), 0);

        // also works when the directory did not exist
        let fresh = dir.path().join("fresh");
        clear_dir(&fresh).unwrap();
        assert!(fresh.is_dir());
    }

    #[test]
    fn format_size_picks_sensible_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
