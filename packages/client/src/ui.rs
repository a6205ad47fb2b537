//! UI utilities for the client.

use std::io::Write;

/// Prompt shown for the given username
pub fn prompt(username: &str) -> String {
    format!("{}> ", username)
}

/// Redisplay the prompt after printing an incoming message
pub fn redisplay_prompt(username: &str) {
    print!("{}", prompt(username));
    std::io::stdout().flush().ok();
}
