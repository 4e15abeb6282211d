//! Hand analysis: shanten search and winning-hand decomposition.

pub mod decomp;
pub mod shanten;

pub use decomp::{win_forms, Group, GroupKind, RegularWin, WinForm};
pub use shanten::{
    shanten, shanten_kokushi, shanten_seven_pairs, shanten_standard, waits, waits_for,
};
