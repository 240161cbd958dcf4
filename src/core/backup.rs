use crate::core::snapshot::{ImportSummary, Snapshot, SnapshotLogic};
use crate::db::journal::record_quietly;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

/// Name of the snapshot entry inside a compressed backup.
const ZIP_ENTRY: &str = "snapshot.json";

pub struct BackupLogic;

impl BackupLogic {
    /// Write the ledger snapshot to `dest_file`, optionally zipped.
    ///
    /// Returns the path actually written (`.zip` when compressed).
    pub fn backup(
        pool: &mut DbPool,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<PathBuf> {
        let dest = Path::new(dest_file);

        // 1️⃣ Ensure destination folder exists
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let final_path = if compress {
            dest.with_extension("zip")
        } else {
            dest.to_path_buf()
        };

        // 2️⃣ Never clobber silently
        if final_path.exists() && !force {
            return Err(AppError::Export(format!(
                "'{}' already exists (use --force to overwrite)",
                final_path.display()
            )));
        }

        // 3️⃣ Serialize
        let text = SnapshotLogic::export(&pool.conn)?.to_text()?;

        // 4️⃣ Write (optionally compressed)
        if compress {
            write_zip(&final_path, &text)?;
        } else {
            fs::write(&final_path, &text)?;
        }

        // 5️⃣ Journal
        record_quietly(
            &pool.conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        );

        Ok(final_path)
    }

    /// Restore from a plain JSON snapshot or a zip made by [`Self::backup`].
    pub fn restore(pool: &mut DbPool, src_file: &str) -> AppResult<ImportSummary> {
        let text = read_backup(Path::new(src_file))?;
        let snapshot = Snapshot::parse(&text)?;
        SnapshotLogic::import(pool, &snapshot)
    }
}

fn write_zip(path: &Path, text: &str) -> AppResult<()> {
    let file = fs::File::create(path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(ZIP_ENTRY, options)
        .map_err(std::io::Error::other)?;
    zip.write_all(text.as_bytes())?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(())
}

/// Read snapshot text, unzipping when the file starts with the zip magic.
pub fn read_backup(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path)?;

    if !bytes.starts_with(b"PK\x03\x04") {
        return String::from_utf8(bytes)
            .map_err(|_| AppError::MalformedSnapshot("backup is not UTF-8 text".into()));
    }

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| AppError::MalformedSnapshot(format!("unreadable zip: {e}")))?;
    let mut entry = archive
        .by_index(0)
        .map_err(|e| AppError::MalformedSnapshot(format!("empty zip: {e}")))?;

    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|_| AppError::MalformedSnapshot("backup is not UTF-8 text".into()))?;
    Ok(text)
}
