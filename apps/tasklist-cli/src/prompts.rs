//! Blocking stdin prompts for confirmation and the interactive edit
//! loop. All prompt text lives here; the core library never prints.

use std::io::{self, Write};

/// Field choices offered by the interactive edit loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
    Complete,
    Incomplete,
}

fn parse_field(reply: &str) -> Option<EditField> {
    match reply {
        "title" => Some(EditField::Title),
        "description" => Some(EditField::Description),
        "complete" => Some(EditField::Complete),
        "incomplete" => Some(EditField::Incomplete),
        _ => None,
    }
}

fn parse_confirm(reply: &str) -> Option<bool> {
    match reply.to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Ask a yes/no question, re-prompting until an explicit answer is
/// given (bare Enter is not a decision). A read failure or closed
/// stdin counts as no, so an interrupted prompt can never confirm
/// anything.
pub fn confirm(message: &str) -> bool {
    loop {
        let Some(reply) = read_reply(&format!("{message} [y/n] ")) else {
            return false;
        };
        match parse_confirm(&reply) {
            Some(answer) => return answer,
            None => println!("Please answer y or n"),
        }
    }
}

/// Prompt for a replacement value for `field`.
pub fn prompt_value(field: &str) -> String {
    read_reply(&format!("Enter the new {field}: ")).unwrap_or_default()
}

/// Prompt until one of the edit field choices is entered. `None`
/// when stdin is closed.
pub fn choose_field() -> Option<EditField> {
    loop {
        let reply =
            read_reply("Select the value to edit [title/description/complete/incomplete]: ")?;
        match parse_field(reply.to_lowercase().as_str()) {
            Some(field) => return Some(field),
            None => println!("Unrecognized choice: {reply}"),
        }
    }
}

fn read_reply(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}
