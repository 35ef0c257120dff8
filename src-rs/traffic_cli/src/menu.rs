use std::io::{self, BufRead, Write};

use github_chronicler_rs::github::{Endpoint, RepoRef, DEFAULT_NAME, DEFAULT_OWNER};

const FIRST_PROMPT: &str = "\n?.): ";
const NOT_A_NUMBER_PROMPT: &str = "\n.. 0-9!!): ";

/// Lists the endpoints and reads until a valid index arrives.
/// End of input yields `None`.
pub fn select_endpoint<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<Endpoint>> {
    let width = Endpoint::ALL
        .iter()
        .map(|endpoint| endpoint.path().len())
        .max()
        .unwrap_or(0);
    let mut query = FIRST_PROMPT.to_string();

    writeln!(out, "Select an endpoint..\n")?;
    loop {
        writeln!(out, "{}", "-".repeat(width))?;
        for (idx, endpoint) in Endpoint::ALL.iter().enumerate() {
            writeln!(out, "{}.) {}", idx, endpoint)?;
        }
        write!(out, "{}", query)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim_end_matches(['\r', '\n']);
        if answer.is_empty() {
            writeln!(out, "Typed nothing")?;
            continue;
        }

        match answer.trim().parse::<i64>() {
            Ok(idx) => {
                writeln!(out, "Index {}", idx)?;
                if let Some(endpoint) = Endpoint::from_index(idx) {
                    writeln!(out, "Endpoint set to {}", endpoint)?;
                    return Ok(Some(endpoint));
                }
                query = format!("\n.. {} > ?.): ", Endpoint::ALL.len());
            }
            Err(_) => query = NOT_A_NUMBER_PROMPT.to_string(),
        }
    }
}

pub fn prompt_repo<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<RepoRef> {
    let owner = ask(input, out, &format!("\n\nRepository Owner (default {}): ", DEFAULT_OWNER))?;
    let name = ask(input, out, &format!("Repository Name (default {}): ", DEFAULT_NAME))?;
    Ok(RepoRef::from_input(&owner, &name))
}

fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, prompt: &str) -> io::Result<String> {
    write!(out, "{}", prompt)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
