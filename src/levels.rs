use std::fs;
use std::io;
use thiserror::Error;

use crate::grid::{Grid, GridError, Position};
use crate::objects::{ObjectSet, StateError};
use crate::session::Session;

const FLOOR: u8 = 0;
const WALL: u8 = 1;

/// Error type for level parsing operations.
#[derive(Debug, Error)]
pub enum LevelError {
    /// IO error when reading from file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Invalid level content
    #[error("Invalid level: {0}")]
    InvalidLevel(String),
    #[error("Invalid level: {0}")]
    Grid(#[from] GridError),
    #[error("Invalid level: {0}")]
    State(#[from] StateError),
}

/// Parse a single board from text.
///
/// Characters:
/// - `#` = Wall
/// - ` ` or `-` = Floor
/// - `$` = Crate on floor
/// - `@` = Agent on floor
///
/// Crates are indexed in reading order. Short rows are padded with floor.
/// Only the layout is checked here; `Session::new` enforces the at-rest rules.
pub fn parse_board(text: &str) -> Result<(Grid, ObjectSet), LevelError> {
    let lines: Vec<&str> = text.lines().collect();

    if lines.is_empty() {
        return Err(LevelError::InvalidLevel("Empty board".to_string()));
    }

    let height = lines.len();
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);

    let mut tiles = vec![FLOOR; height * width];
    let mut agent = None;
    let mut crates = Vec::new();

    for (row, line) in lines.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            let pos = || Position::new(row as u8, col as u8);
            match ch {
                '#' => tiles[row * width + col] = WALL,
                ' ' | '-' => {}
                '$' => crates.push(pos()),
                '@' => {
                    if agent.is_some() {
                        return Err(LevelError::InvalidLevel(
                            "Multiple agents found".to_string(),
                        ));
                    }
                    agent = Some(pos());
                }
                _ => {
                    return Err(LevelError::InvalidLevel(format!(
                        "Invalid character '{}' at position ({}, {})",
                        ch, row, col
                    )));
                }
            }
        }
    }

    // Positions above are only meaningful once the size check passes.
    let grid = Grid::from_tile_ids(height, width, &tiles)?;
    let agent =
        agent.ok_or_else(|| LevelError::InvalidLevel("No agent found on board".to_string()))?;
    let objects = ObjectSet::new(agent, &crates)?;

    Ok((grid, objects))
}

/// A collection of levels in XSB-style text.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Session>,
}

impl Levels {
    /// Parse levels from a string.
    ///
    /// Lines starting with `;` and empty lines separate levels. Each level is
    /// validated and stored as a ready-to-play Session.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current_level = String::new();

        for line in contents.lines() {
            if line.trim_start().starts_with(';') || line.is_empty() {
                if !current_level.is_empty() {
                    levels.push(Self::parse_level(&current_level)?);
                    current_level.clear();
                }
                continue;
            }

            current_level.push_str(line);
            current_level.push('\n');
        }

        // Last level may not be followed by a separator.
        if !current_level.is_empty() {
            levels.push(Self::parse_level(&current_level)?);
        }

        Ok(Levels { levels })
    }

    pub fn from_file(path: &str) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    fn parse_level(text: &str) -> Result<Session, LevelError> {
        let (grid, objects) = parse_board(text.trim_end_matches('\n'))?;
        Ok(Session::new(grid, objects)?)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Session> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;

    #[test]
    fn test_parse_basic_board() {
        let input = "######\n\
                     #@$  #\n\
                     # $$ #\n\
                     ######";
        let (grid, objects) = parse_board(input).unwrap();

        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 6);
        assert_eq!(objects.agent(), Position::new(1, 1));
        assert_eq!(
            objects.crates(),
            &[
                Position::new(1, 2),
                Position::new(2, 2),
                Position::new(2, 3)
            ]
        );
    }

    #[test]
    fn test_no_agent() {
        let input = "####\n\
                     #  #\n\
                     ####";
        assert!(matches!(
            parse_board(input),
            Err(LevelError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_multiple_agents() {
        let input = "####\n\
                     #@@#\n\
                     ####";
        assert!(parse_board(input).is_err());
    }

    #[test]
    fn test_invalid_character() {
        let input = "####\n\
                     #@.#\n\
                     ####";
        assert!(matches!(
            parse_board(input),
            Err(LevelError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_too_wide() {
        let input = format!("@{}", " ".repeat(64));
        assert!(matches!(
            parse_board(&input),
            Err(LevelError::Grid(GridError::TooLarge { .. }))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let input = "  ####\n\
                     ###  ####\n\
                     #     $ #\n\
                     # #  #$ #\n\
                     # $ $#@ #\n\
                     #########";
        let levels = Levels::from_text(input).unwrap();
        assert_eq!(levels.get(0).unwrap().to_string().trim_end(), input);
    }

    #[test]
    fn test_from_text_basic() {
        let level1 = "#####\n\
                      #@$ #\n\
                      #####";

        let level2 = "######\n\
                      #    #\n\
                      # #@ #\n\
                      # $$ #\n\
                      #    #\n\
                      ######";

        let xsb_content = format!("; 1\n\n{}\n\n; 2\n\n{}\n", level1, level2);

        let levels = Levels::from_text(&xsb_content).unwrap();

        assert_eq!(levels.len(), 2);
        assert_eq!(levels.get(0).unwrap().to_string().trim_end(), level1);
        assert_eq!(levels.get(1).unwrap().to_string().trim_end(), level2);
        assert!(levels.get(2).is_none());
    }

    #[test]
    fn test_level_is_playable() {
        let levels = Levels::from_text("#####\n#@$ #\n#####\n").unwrap();
        let mut session = levels.get(0).unwrap().clone();

        session.apply(Direction::Right).unwrap();
        assert_eq!(session.to_string(), "#####\n# @$#\n#####\n");
        assert!(session.apply(Direction::Right).is_err());
    }

    #[test]
    fn test_from_text_invalid_level() {
        let xsb_content = "; 1

####
# $#
#@@ #
####
";

        let result = Levels::from_text(xsb_content);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), LevelError::InvalidLevel(_)));
    }

    #[test]
    fn test_from_file_no_file() {
        let result = Levels::from_file("nonexistent_file.xsb");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), LevelError::Io(_)));
    }
}
