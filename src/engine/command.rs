//! Text commands of the interactive loop. Any line that is not a command is
//! treated as a move.

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Command {
    NewGame,
    SetPosition {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Moves,
    Board,
    History,
    Status,
    Replay {
        tokens: Vec<String>,
    },
    Help,
    Quit,
    Move(String),
    Empty,
}

fn parse_setposition(parts: &[&str]) -> Command {
    let fen_index = parts.iter().position(|&x| x == "fen");
    let moves_index = parts.iter().position(|&x| x == "moves");
    let fen_end = moves_index.unwrap_or(parts.len());
    let fen = fen_index.map(|index| parts.get(index + 1..fen_end).unwrap_or_default().join(" "));
    let moves = moves_index.map_or_else(Vec::new, |moves_index| {
        parts[moves_index + 1..]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    });
    Command::SetPosition { fen, moves }
}

impl Command {
    pub(super) fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input.split_whitespace().collect();

        let Some(&command) = parts.first() else {
            return Self::Empty;
        };

        match command {
            "new" => Self::NewGame,
            "position" => parse_setposition(&parts),
            "moves" => Self::Moves,
            "board" | "d" => Self::Board,
            "history" => Self::History,
            "status" => Self::Status,
            "replay" => Self::Replay {
                tokens: parts[1..].iter().map(|s| (*s).to_string()).collect(),
            },
            "help" => Self::Help,
            "quit" => Self::Quit,
            _ => Self::Move(input.trim().to_string()),
        }
    }
}
