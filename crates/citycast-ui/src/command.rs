//! Line commands accepted by the terminal front-end.

pub const HELP_TEXT: &str = "\
Commands:
  add <city>       track a city (plain text does the same)
  delete <city>    stop tracking a city
  open <city>      show details for a city
  back             return to the list
  refresh [city]   update one city, or all of them
  help             show this text
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text typed without a command word, submitted as a new city
    Type(String),
    Add(String),
    Delete(String),
    Open(String),
    Back,
    Refresh(Option<String>),
    Help,
    Quit,
    /// Blank line
    Nothing,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Nothing;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word.to_ascii_lowercase().as_str(), rest) {
            ("add", _) => Self::Add(rest.to_string()),
            ("delete" | "remove", city) if !city.is_empty() => Self::Delete(city.to_string()),
            ("open", city) if !city.is_empty() => Self::Open(city.to_string()),
            // missing argument
            ("delete" | "remove" | "open", "") => Self::Help,
            ("back", "") => Self::Back,
            ("refresh", "") => Self::Refresh(None),
            ("refresh", city) => Self::Refresh(Some(city.to_string())),
            ("help" | "?", "") => Self::Help,
            ("quit" | "exit", "") => Self::Quit,
            _ => Self::Type(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_words() {
        assert_eq!(Command::parse("add Kyiv"), Command::Add("Kyiv".into()));
        assert_eq!(
            Command::parse("delete  New York "),
            Command::Delete("New York".into())
        );
        assert_eq!(Command::parse("OPEN Lviv"), Command::Open("Lviv".into()));
        assert_eq!(Command::parse("back"), Command::Back);
        assert_eq!(Command::parse("refresh"), Command::Refresh(None));
        assert_eq!(
            Command::parse("refresh Kyiv"),
            Command::Refresh(Some("Kyiv".into()))
        );
        assert_eq!(Command::parse("quit"), Command::Quit);
    }

    #[test]
    fn bare_text_is_a_city() {
        assert_eq!(Command::parse("  London "), Command::Type("London".into()));
        assert_eq!(Command::parse("Rio de Janeiro"), Command::Type("Rio de Janeiro".into()));
    }

    #[test]
    fn command_word_without_city_shows_help() {
        assert_eq!(Command::parse("open"), Command::Help);
        assert_eq!(Command::parse(" Delete "), Command::Help);
        assert_eq!(Command::parse("remove"), Command::Help);
    }

    #[test]
    fn blank_add_keeps_empty_argument() {
        assert_eq!(Command::parse("add   "), Command::Add(String::new()));
        assert_eq!(Command::parse("   "), Command::Nothing);
    }
}
