//! `batchsave strategy`: show which delivery path the hints select.

use batchsave_core::strategy::select_strategy;
use batchsave_core::ClientHints;

pub fn run_strategy(user_agent: Option<String>, viewport_width: Option<u32>) {
    let hints = ClientHints::new(user_agent, viewport_width);
    println!("{}", select_strategy(&hints));
}
