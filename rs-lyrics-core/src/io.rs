use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{LyricsError, Result};

/// Reads a lyrics file as text.
///
/// - Reads the entire file into memory
/// - Invalid UTF-8 sequences are replaced rather than rejected
pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<String> {
	let path = filename.as_ref();
	let bytes = fs::read(path).map_err(|source| io_error(path, source))?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Collects the lyrics files designated by a list of paths.
///
/// - A file path is taken as is.
/// - A directory contributes the files directly inside it, or every file
///   below it when `recursive` is set.
///
/// Files of each directory are returned in name order.
///
/// # Errors
/// Returns an error if a path is neither a file nor a directory, or if a
/// directory cannot be listed.
pub fn collect_files<P: AsRef<Path>>(paths: &[P], recursive: bool) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for path in paths {
		let path = path.as_ref();
		if path.is_file() {
			files.push(path.to_path_buf());
		} else if path.is_dir() {
			list_files(path, recursive, &mut files)?;
		} else {
			return Err(io_error(
				path,
				std::io::Error::new(std::io::ErrorKind::NotFound, "not a file or a directory"),
			));
		}
	}

	debug!("Collected {} lyrics files", files.len());
	Ok(files)
}

/// Appends the files of `dir` (and of its subdirectories if `recursive`) to `files`.
fn list_files(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<()> {
	let mut entries = Vec::new();
	for entry in fs::read_dir(dir).map_err(|source| io_error(dir, source))? {
		let entry = entry.map_err(|source| io_error(dir, source))?;
		entries.push(entry.path());
	}
	entries.sort();

	for path in entries {
		if path.is_file() {
			files.push(path);
		} else if recursive && path.is_dir() {
			list_files(&path, recursive, files)?;
		}
	}

	Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> LyricsError {
	LyricsError::Io { path: path.to_path_buf(), source }
}
