//! Operator commands read from the console.

use anyhow::{anyhow, Context, Result};
use shared::domain::{ElevatorId, Floor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Select(ElevatorId),
    Press(Floor),
    Validate(Floor),
    Refresh,
    Show,
    List,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  select <elevator>   switch the active elevator
  press <floor>       request a floor (0 or 'g' for the ground floor)
  validate <floor>    ask the controller whether a floor is serviceable
  refresh             fetch status now
  show                redraw the panel
  list                list configured elevators
  help                this text
  quit                exit";

pub fn parse_command(line: &str) -> Result<Option<OperatorCommand>> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(anyhow!("too many arguments for '{verb}'"));
    }

    let command = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("select" | "s", Some(id)) => OperatorCommand::Select(ElevatorId::new(id)),
        ("press" | "p", Some(floor)) => OperatorCommand::Press(parse_floor(floor)?),
        ("validate" | "v", Some(floor)) => OperatorCommand::Validate(parse_floor(floor)?),
        ("refresh" | "r", None) => OperatorCommand::Refresh,
        ("show", None) => OperatorCommand::Show,
        ("list" | "ls", None) => OperatorCommand::List,
        ("help" | "?", None) => OperatorCommand::Help,
        ("quit" | "exit" | "q", None) => OperatorCommand::Quit,
        ("select" | "s" | "press" | "p" | "validate" | "v", None) => {
            return Err(anyhow!("'{verb}' needs an argument"));
        }
        (other, _) => return Err(anyhow!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

fn parse_floor(raw: &str) -> Result<Floor> {
    if raw.eq_ignore_ascii_case("g") || raw.eq_ignore_ascii_case("ground") {
        return Ok(Floor::GROUND);
    }
    let number: i64 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a floor number"))?;
    Ok(Floor::new(number)?)
}
