//! Plain-text diagnostic dumps for external plotting tools.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::util::{ScaleFuseError, ScaleFuseResult};
use crate::volume::{CostVolume, DisparityMap};

/// Writes every valid cost to a text file, one value per line.
///
/// Lines are ordered disparity outermost, then column, then row (column-major
/// per grid), the order MATLAB-style plotting scripts expect. The index-0
/// sentinel grid is skipped.
pub fn write_cost_volume<P: AsRef<Path>>(path: P, volume: &CostVolume) -> ScaleFuseResult<()> {
    let file = File::create(path).map_err(io_error)?;
    let mut out = BufWriter::new(file);
    for d in 1..volume.max_disparity() {
        for x in 0..volume.width() {
            for y in 0..volume.height() {
                let value = volume.get(d, y, x).expect("indices in bounds");
                writeln!(out, "{value}").map_err(io_error)?;
            }
        }
    }
    out.flush().map_err(io_error)
}

/// Writes a disparity map to a text file, one value per line, column-major.
pub fn write_disparity_map<P: AsRef<Path>>(path: P, map: &DisparityMap) -> ScaleFuseResult<()> {
    let file = File::create(path).map_err(io_error)?;
    let mut out = BufWriter::new(file);
    for x in 0..map.width() {
        for y in 0..map.height() {
            let value = map.get(x, y).expect("position in bounds");
            writeln!(out, "{value}").map_err(io_error)?;
        }
    }
    out.flush().map_err(io_error)
}

fn io_error(err: std::io::Error) -> ScaleFuseError {
    ScaleFuseError::Io {
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{write_cost_volume, write_disparity_map};
    use crate::volume::{CostVolume, DisparityMap};

    #[test]
    fn cost_volume_lines_are_column_major_per_grid() {
        let mut volume = CostVolume::zeros(2, 2, 2).unwrap();
        volume.set(1, 0, 0, 1.0);
        volume.set(1, 1, 0, 2.0);
        volume.set(1, 0, 1, 3.0);
        volume.set(1, 1, 1, 4.0);

        let path = std::env::temp_dir().join("scalefuse_cost_dump.txt");
        write_cost_volume(&path, &volume).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let values: Vec<f32> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn disparity_lines_walk_columns_first() {
        let mut map = DisparityMap::zeros(2, 2).unwrap();
        map.put(0, 0, 1);
        map.put(0, 1, 2);
        map.put(1, 0, 3);
        map.put(1, 1, 4);

        let path = std::env::temp_dir().join("scalefuse_disparity_dump.txt");
        write_disparity_map(&path, &map).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let values: Vec<u16> = text.lines().map(|l| l.parse().unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
        std::fs::remove_file(&path).ok();
    }
}
