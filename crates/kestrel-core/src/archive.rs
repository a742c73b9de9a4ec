use async_trait::async_trait;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};

pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Packs a directory into a single archive file and restores it later.
///
/// Implementations must root the archive at the directory's basename, so
/// unpacking into the original parent recreates the directory in place.
#[async_trait]
pub trait ArchiveCodec: Send + Sync {
    async fn pack(&self, source_dir: &Path, archive: &Path) -> Result<()>;
    async fn unpack(&self, archive: &Path, dest_parent: &Path) -> Result<()>;
}

/// Gzip-compressed tarball codec.
pub struct TarGzCodec;

#[async_trait]
impl ArchiveCodec for TarGzCodec {
    async fn pack(&self, source_dir: &Path, archive: &Path) -> Result<()> {
        let source = source_dir.to_path_buf();
        let target = archive.to_path_buf();
        let context = format!("pack {} into {}", source.display(), target.display());
        run_blocking(context, move || pack_sync(&source, &target)).await
    }

    async fn unpack(&self, archive: &Path, dest_parent: &Path) -> Result<()> {
        let source = archive.to_path_buf();
        let target = dest_parent.to_path_buf();
        let context = format!("unpack {} into {}", source.display(), target.display());
        run_blocking(context, move || unpack_sync(&source, &target)).await
    }
}

async fn run_blocking<F>(context: String, job: F) -> Result<()>
where
    F: FnOnce() -> std::io::Result<()> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Error::Archive(format!("failed to {context}: {e}"))),
        Err(e) => Err(Error::Archive(format!("failed to {context}: {e}"))),
    }
}

fn pack_sync(source: &Path, archive: &Path) -> std::io::Result<()> {
    let root = source.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "source directory has no basename",
        )
    })?;
    if let Some(parent) = archive.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(archive)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    // store symlinks as symlinks; live profiles may contain dangling ones
    builder.follow_symlinks(false);
    builder.append_dir_all(root, source)?;
    let mut out = builder.into_inner()?.finish()?;
    out.flush()?;
    Ok(())
}

fn unpack_sync(archive: &Path, dest_parent: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dest_parent)?;
    let file = File::open(archive)?;
    let mut reader = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    reader.unpack(dest_parent)?;
    Ok(())
}
