use std::{error::Error, fmt};

use lantern_core::{Direction, PlayerInput};

/// Translates a move script into one input per tick.
///
/// `w`, `a`, `s` and `d` step north, west, south and east; `i`, `j`, `k` and
/// `l` turn the same way; `.` waits. Whitespace is ignored.
pub(crate) fn parse_moves(script: &str) -> Result<Vec<PlayerInput>, ScriptError> {
    script
        .chars()
        .enumerate()
        .filter(|(_, symbol)| !symbol.is_whitespace())
        .map(|(position, symbol)| {
            let input = match symbol.to_ascii_lowercase() {
                'w' => PlayerInput::step(Direction::North),
                'a' => PlayerInput::step(Direction::West),
                's' => PlayerInput::step(Direction::South),
                'd' => PlayerInput::step(Direction::East),
                'i' => PlayerInput::turn(Direction::North),
                'j' => PlayerInput::turn(Direction::West),
                'k' => PlayerInput::turn(Direction::South),
                'l' => PlayerInput::turn(Direction::East),
                '.' => PlayerInput::wait(),
                _ => return Err(ScriptError { symbol, position }),
            };
            Ok(input)
        })
        .collect()
}

/// A move script contained an unknown symbol.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ScriptError {
    symbol: char,
    position: usize,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown move '{}' at position {}",
            self.symbol, self.position
        )
    }
}

impl Error for ScriptError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps_turns_and_waits() {
        let inputs = parse_moves("dD l .s").expect("valid script");
        assert_eq!(
            inputs,
            vec![
                PlayerInput::step(Direction::East),
                PlayerInput::step(Direction::East),
                PlayerInput::turn(Direction::East),
                PlayerInput::wait(),
                PlayerInput::step(Direction::South),
            ]
        );
    }

    #[test]
    fn rejects_unknown_symbols() {
        assert_eq!(
            parse_moves("wq"),
            Err(ScriptError {
                symbol: 'q',
                position: 1
            })
        );
    }
}
