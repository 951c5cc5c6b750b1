//! Interactive flashcard deck on `rustyline`.

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use pagelens_popup::Deck;

const PROMPT: &str = "[n]ext  [p]revious  [f]lip  [q]uit > ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeckCommand {
    Next,
    Previous,
    Flip,
    Quit,
}

fn parse_command(input: &str) -> Option<DeckCommand> {
    match input.trim().to_lowercase().as_str() {
        "n" | "next" => Some(DeckCommand::Next),
        "p" | "prev" | "previous" => Some(DeckCommand::Previous),
        "f" | "flip" | "" => Some(DeckCommand::Flip),
        "q" | "quit" | "exit" => Some(DeckCommand::Quit),
        _ => None,
    }
}

/// Step through the deck until the user quits.
pub fn run(deck: &mut Deck) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    print_card(deck);

    loop {
        let input = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        match parse_command(&input) {
            Some(DeckCommand::Quit) => break,
            Some(DeckCommand::Flip) => deck.flip(),
            Some(DeckCommand::Next) => {
                if !deck.next() {
                    println!("{}", "Already at the last card.".dimmed());
                    continue;
                }
            }
            Some(DeckCommand::Previous) => {
                if !deck.previous() {
                    println!("{}", "Already at the first card.".dimmed());
                    continue;
                }
            }
            None => {
                println!("{}", "Unknown command.".dimmed());
                continue;
            }
        }
        print_card(deck);
    }

    Ok(())
}

fn print_card(deck: &Deck) {
    println!();
    println!("{}", deck.indicator().dimmed());
    if deck.is_flipped() {
        println!("{} {}", "A:".green().bold(), deck.current().answer);
    } else {
        println!("{} {}", "Q:".cyan().bold(), deck.display_question());
    }
    println!();
}

/// Every card, question and answer.
pub fn print_all(deck: &Deck) {
    println!();
    for (i, card) in deck.cards().iter().enumerate() {
        let question = if card.question.trim().is_empty() {
            format!("Q {}", i + 1)
        } else {
            card.question.clone()
        };
        println!("{} {}", format!("{}.", i + 1).dimmed(), question.cyan().bold());
        println!("   {}", card.answer);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands() {
        assert_eq!(parse_command("n"), Some(DeckCommand::Next));
        assert_eq!(parse_command(" NEXT "), Some(DeckCommand::Next));
        assert_eq!(parse_command("p"), Some(DeckCommand::Previous));
        assert_eq!(parse_command(""), Some(DeckCommand::Flip));
        assert_eq!(parse_command("f"), Some(DeckCommand::Flip));
        assert_eq!(parse_command("q"), Some(DeckCommand::Quit));
        assert_eq!(parse_command("exit"), Some(DeckCommand::Quit));
        assert_eq!(parse_command("jump"), None);
    }
}
