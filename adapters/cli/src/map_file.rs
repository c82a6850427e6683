use std::{
    fs, io,
    path::{Path, PathBuf},
};

use maze_patrol_core::{CellKind, Grid, GridError};
use thiserror::Error;

/// Maze played when no map file is given.
pub(crate) const DEMO_MAP: &str = "\
###############
#S....#.......#
#.###.#.#####.#
#.#s....#f..^.#
#.#.###.#.#.#.#
#...#f..^.#...#
###.#.#####.#.#
#...#.s.....#E#
###############
";

/// Errors raised while reading a map text file.
#[derive(Debug, Error)]
pub(crate) enum MapFileError {
    /// The file could not be read.
    #[error("failed to read map file {}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A character does not name any cell kind.
    #[error("unknown map glyph {glyph:?} at line {line}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// One-based line number.
        line: usize,
        /// One-based column number.
        column: usize,
    },
    /// A row is shorter or longer than the first one.
    #[error("line {line} has {actual} cells but {expected} were expected")]
    Ragged {
        /// One-based line number.
        line: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// The parsed rows do not form a valid grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Reads and parses the map stored at `path`.
pub(crate) fn load_map(path: &Path) -> Result<Grid, MapFileError> {
    let text = fs::read_to_string(path).map_err(|source| MapFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_map(&text)
}

/// Parses a map, one row per line. Trailing blank lines are ignored.
pub(crate) fn parse_map(text: &str) -> Result<Grid, MapFileError> {
    let lines: Vec<&str> = text.lines().collect();
    let used = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |last| last + 1);

    let mut rows: Vec<Vec<CellKind>> = Vec::with_capacity(used);
    for (index, line) in lines[..used].iter().enumerate() {
        let row = parse_row(line, index + 1)?;
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(MapFileError::Ragged {
                    line: index + 1,
                    expected: first.len(),
                    actual: row.len(),
                });
            }
        }
        rows.push(row);
    }

    Ok(Grid::from_rows(rows)?)
}

fn parse_row(line: &str, line_number: usize) -> Result<Vec<CellKind>, MapFileError> {
    line.chars()
        .enumerate()
        .map(|(index, glyph)| {
            cell_kind(glyph).ok_or(MapFileError::UnknownGlyph {
                glyph,
                line: line_number,
                column: index + 1,
            })
        })
        .collect()
}

const fn cell_kind(glyph: char) -> Option<CellKind> {
    let kind = match glyph {
        '#' => CellKind::Wall,
        '.' => CellKind::Empty,
        'S' => CellKind::Start,
        'E' => CellKind::End,
        '^' => CellKind::Hazard,
        's' => CellKind::SpiderSpawn,
        'f' => CellKind::FlySpawn,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use maze_patrol_core::Position;

    use super::*;

    #[test]
    fn parses_every_glyph() {
        let grid = parse_map("#.S\nE^s\nf..\n").expect("valid map");

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        let kinds: Vec<CellKind> = grid.iter().map(|(_, kind)| kind).collect();
        assert_eq!(
            kinds,
            vec![
                CellKind::Wall,
                CellKind::Empty,
                CellKind::Start,
                CellKind::End,
                CellKind::Hazard,
                CellKind::SpiderSpawn,
                CellKind::FlySpawn,
                CellKind::Empty,
                CellKind::Empty,
            ]
        );
    }

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let grid = parse_map("S.\r\n.E\r\n\r\n\n").expect("valid map");

        assert_eq!(grid.height(), 2);
        assert_eq!(grid.cell_at(Position::new(1, 1)), Ok(CellKind::End));
    }

    #[test]
    fn unknown_glyphs_report_their_location() {
        let error = parse_map("S..\n.x.\n").expect_err("x is not a glyph");

        assert!(matches!(
            error,
            MapFileError::UnknownGlyph {
                glyph: 'x',
                line: 2,
                column: 2
            }
        ));
        assert_eq!(
            error.to_string(),
            "unknown map glyph 'x' at line 2, column 2"
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = parse_map("S..\n..\n").expect_err("second row too short");

        assert!(matches!(
            error,
            MapFileError::Ragged {
                line: 2,
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn empty_maps_are_rejected() {
        assert!(matches!(
            parse_map("\n\n"),
            Err(MapFileError::Grid(GridError::Empty))
        ));
    }

    #[test]
    fn demo_map_is_playable() {
        let grid = parse_map(DEMO_MAP).expect("demo map parses");

        assert_eq!(grid.positions_of(CellKind::Start).len(), 1);
        assert_eq!(grid.positions_of(CellKind::End).len(), 1);
        assert_eq!(grid.positions_of(CellKind::SpiderSpawn).len(), 2);
        assert_eq!(grid.positions_of(CellKind::FlySpawn).len(), 2);
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = load_map(Path::new("does/not/exist.map")).expect_err("missing file");

        assert_eq!(
            error.to_string(),
            "failed to read map file does/not/exist.map"
        );
    }
}
