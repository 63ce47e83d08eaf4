//! The seam between the editor and the robot host environment.
//!
//! The editor never talks to hardware itself. Run and Stop requests go
//! through [`RobotLink`], and the host decides what transport (if any)
//! sits behind it. The default link just logs, which keeps the editor
//! fully usable standalone.

use crate::program::Program;

/// Host-environment collaborator executing programs on a robot.
pub trait RobotLink {
    /// Sends the current program to the robot and starts it.
    fn load_and_run(&mut self, program: &Program) -> Result<(), String>;

    /// Halts whatever the robot is executing.
    fn stop(&mut self) -> Result<(), String>;

    /// Writes a named robot variable.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable name, e.g. `motor.left.target`
    /// * `values` - The values to write, one per variable slot
    fn set_variable(&mut self, name: &str, values: &[i16]) -> Result<(), String>;
}

/// A [`RobotLink`] that logs every request to the console.
#[derive(Debug, Default)]
pub struct ConsoleLink;

impl ConsoleLink {
    /// Creates a new console link.
    pub fn new() -> Self {
        Self
    }
}

impl RobotLink for ConsoleLink {
    fn load_and_run(&mut self, program: &Program) -> Result<(), String> {
        let filled = program.pairs().iter().filter(|p| !p.is_blank()).count();
        println!("Run requested: {filled} card pair(s)");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), String> {
        println!("Stop requested");
        Ok(())
    }

    fn set_variable(&mut self, name: &str, values: &[i16]) -> Result<(), String> {
        println!("Set {name} = {values:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardKind, CardSpec};

    #[test]
    fn test_console_link_accepts_requests() {
        let mut link = ConsoleLink::new();
        let mut program = Program::new();
        program.add_event_card(CardSpec::new(CardKind::Tap));

        assert!(link.load_and_run(&program).is_ok());
        assert!(link.stop().is_ok());
        assert!(link.set_variable("motor.left.target", &[0]).is_ok());
    }
}
