//! Chess rules engine: board state, per-piece move generation, legality
//! filtering, castling and en passant, check/checkmate detection and
//! algebraic notation.
//!
//! The engine does not pick moves. An external actor (a human at the
//! command loop or a pre-parsed notation stream) supplies them and
//! [`chess::game::Game`] validates and applies them:
//!
//! ```
//! use rookery::chess::game::{Game, MoveSelector};
//!
//! let mut game = Game::new();
//! let committed = game.apply_move(MoveSelector::from("e4")).unwrap();
//! assert_eq!(committed.notation, "e4");
//! assert_eq!(game.turn(), 2);
//! ```

#![warn(missing_docs, variant_size_differences)]
// Rustc lints.
#![warn(
    absolute_paths_not_starting_with_crate,
    keyword_idents,
    macro_use_extern_crate,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]
// Rustdoc lints.
#![warn(
    rustdoc::private_doc_tests,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
// Clippy lints.
#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]

pub mod chess;

mod engine;
pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Build profile. Produced by `build.rs`.
const PROFILE: &str = include_str!(concat!(env!("OUT_DIR"), "/profile"));
/// Target triple the binary was built for. Produced by `build.rs`.
const TARGET: &str = include_str!(concat!(env!("OUT_DIR"), "/target"));

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the engine version on startup.
pub fn print_engine_info() {
    println!("Rookery chess rules engine {}", engine_version());
}

/// Prints the build profile, target and whether the build is clean on
/// startup.
pub fn print_binary_info() {
    println!("Profile: {PROFILE}, target: {TARGET}");
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
