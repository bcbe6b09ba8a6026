//! Point list persistence as a JSON array of `[lat, lon]` pairs.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::point::{Point, PointSequence};

/// Write `points` to `path`, replacing any previous file.
///
/// The list is written to `<path>.tmp` first and renamed into place. The
/// temp file is removed again if any step fails.
pub fn save_points(path: impl AsRef<Path>, points: &[Point]) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = temp_path(path);

    let saved = write_points(&tmp_path, points).and_then(|()| Ok(fs::rename(&tmp_path, path)?));
    if let Err(err) = saved {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    debug!(path = %path.display(), count = points.len(), "saved points");
    Ok(())
}

fn write_points(path: &Path, points: &[Point]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, points)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// `route.json` -> `route.json.tmp`, so no sibling with another extension
/// is ever touched.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Read a point list written by [`save_points`].
///
/// A missing file surfaces as [`crate::Error::Io`] with `NotFound` kind.
pub fn load_points(path: impl AsRef<Path>) -> Result<PointSequence> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let points: PointSequence = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), count = points.len(), "loaded points");
    Ok(points)
}
