use tracing::{debug, info};

use crate::generator::{GenerateError, Generator, InitialState};
use crate::grid::Direction;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// Draw a fresh random map and placement.
    Regenerate,
    /// Clear the map to an open interior, keeping the agent and crates where they are.
    Blank,
    Quit,
}

impl Command {
    pub fn from_key(key: char) -> Option<Command> {
        match key {
            'i' => Some(Command::Regenerate),
            'z' => Some(Command::Blank),
            'q' => Some(Command::Quit),
            _ => Direction::from_key(key).map(Command::Move),
        }
    }
}

/// What a handled command did, so the front end knows whether to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Moved,
    Rejected,
    Loaded,
    Ignored,
    Quit,
}

/// Owns the current session and routes commands to it.
pub struct Driver {
    generator: Generator,
    session: Option<Session>,
    running: bool,
}

impl Driver {
    pub fn new(generator: Generator) -> Self {
        Driver {
            generator,
            session: None,
            running: true,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn handle(&mut self, command: Command) -> Result<Handled, GenerateError> {
        if !self.running {
            return Ok(Handled::Ignored);
        }
        match command {
            Command::Move(dir) => match self.session.as_mut() {
                Some(session) => match session.apply(dir) {
                    Ok(_) => Ok(Handled::Moved),
                    Err(_) => Ok(Handled::Rejected),
                },
                None => Ok(Handled::Ignored),
            },
            Command::Regenerate => {
                let state = self.generator.generate()?;
                self.load(state)
            }
            Command::Blank => self.blank(),
            Command::Quit => {
                info!("quit requested");
                self.running = false;
                Ok(Handled::Quit)
            }
        }
    }

    /// Replace the current session, e.g. with a level read from a file.
    pub fn load_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    fn load(&mut self, state: InitialState) -> Result<Handled, GenerateError> {
        self.load_session(Session::new(state.grid, state.objects)?);
        Ok(Handled::Loaded)
    }

    /// Clear the loaded map in place. Objects are only placed again when
    /// nothing is loaded or they do not fit the cleared map.
    fn blank(&mut self) -> Result<Handled, GenerateError> {
        if let Some(session) = self.session.as_mut() {
            let height = usize::from(session.grid().height());
            let width = usize::from(session.grid().width());
            let grid = self.generator.blank_grid(height, width)?;
            match session.replace_grid(grid) {
                Ok(()) => return Ok(Handled::Loaded),
                Err(e) => {
                    debug!(error = %e, "objects do not fit the cleared map, placing again");
                }
            }
        }
        let state = self.generator.blank()?;
        self.load(state)
    }
}
