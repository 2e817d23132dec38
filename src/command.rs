//! Line commands accepted by the interactive session.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh,
    Ticker(String),
    Days(u32),
    Amount(f64),
    Buy,
    Sell,
    Trades,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument { command: &'static str, expected: &'static str },

    #[error("'{value}' is not a valid {expected}")]
    InvalidArgument { value: String, expected: &'static str },
}

pub const HELP: &str = "\
Commands:
  ticker <SYMBOL>   select a stock symbol (e.g. ticker MSFT)
  days <N>          history window in days
  amount <DOLLARS>  dollars moved per buy or sell
  buy               buy the selected stock for the current amount
  sell              sell the selected stock for the current amount
  trades            list this session's trades
  refresh           reload prices (also: empty line)
  help              show this list
  quit              leave the simulator";

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(Command::Refresh);
        };
        let argument = parts.next();

        match verb.to_ascii_lowercase().as_str() {
            "r" | "refresh" => Ok(Command::Refresh),
            "b" | "buy" => Ok(Command::Buy),
            "s" | "sell" => Ok(Command::Sell),
            "trades" | "history" => Ok(Command::Trades),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            "t" | "ticker" => argument
                .map(|symbol| Command::Ticker(symbol.to_string()))
                .ok_or(CommandError::MissingArgument {
                    command: "ticker",
                    expected: "a stock symbol",
                }),
            "d" | "days" => {
                let value = argument.ok_or(CommandError::MissingArgument {
                    command: "days",
                    expected: "a number of days",
                })?;
                value.parse().map(Command::Days).map_err(|_| CommandError::InvalidArgument {
                    value: value.to_string(),
                    expected: "number of days",
                })
            }
            "a" | "amount" => {
                let value = argument.ok_or(CommandError::MissingArgument {
                    command: "amount",
                    expected: "a dollar amount",
                })?;
                value
                    .trim_start_matches('$')
                    .replace(',', "")
                    .parse()
                    .map(Command::Amount)
                    .map_err(|_| CommandError::InvalidArgument {
                        value: value.to_string(),
                        expected: "dollar amount",
                    })
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Splits a `;`-separated script into commands, stopping at the first bad one.
pub fn parse_script(script: &str) -> Result<Vec<Command>, CommandError> {
    script
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_commands() {
        assert_eq!("".parse::<Command>(), Ok(Command::Refresh));
        assert_eq!("BUY".parse::<Command>(), Ok(Command::Buy));
        assert_eq!("sell".parse::<Command>(), Ok(Command::Sell));
        assert_eq!("ticker msft".parse::<Command>(), Ok(Command::Ticker("msft".to_string())));
        assert_eq!("days 180".parse::<Command>(), Ok(Command::Days(180)));
        assert_eq!("amount $1,000".parse::<Command>(), Ok(Command::Amount(1_000.0)));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_rejects_bad_commands() {
        assert!(matches!("dance".parse::<Command>(), Err(CommandError::Unknown(_))));
        assert!(matches!("ticker".parse::<Command>(), Err(CommandError::MissingArgument { .. })));
        assert!(matches!("days many".parse::<Command>(), Err(CommandError::InvalidArgument { .. })));
        assert!(matches!("days -5".parse::<Command>(), Err(CommandError::InvalidArgument { .. })));
    }

    #[test]
    fn test_parse_script() {
        assert_eq!(
            parse_script("ticker tsla; buy ;; trades"),
            Ok(vec![Command::Ticker("tsla".to_string()), Command::Buy, Command::Trades])
        );
        assert!(parse_script("buy; fly").is_err());
    }
}
