//! Implementation of chess rules: board state, move generation, legality,
//! castling, notation and the game controller.

pub mod board;
pub mod castling;
pub mod core;
pub mod game;
pub mod legality;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod replay;
