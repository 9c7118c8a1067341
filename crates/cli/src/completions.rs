use std::io;

use clap::{Arg, Command};
use clap_complete::Shell;

pub fn generate(shell: Shell) {
    let mut cmd = Command::new("ai-agent")
        .about("Agent swarm CLI")
        .arg(Arg::new("query").help("Query to process").index(1));

    clap_complete::generate(shell, &mut cmd, "ai-agent", &mut io::stdout());
}
