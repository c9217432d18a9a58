use conference_bot::bot::commands::Command;
use conference_bot::bot::keyboards::MenuButton;
use teloxide::utils::command::BotCommands;

#[cfg(test)]
mod command_parsing_tests {
    use super::*;

    #[test]
    fn test_simple_commands_parse() {
        let cases = [
            ("/help", Command::Help),
            ("/start", Command::Start),
            ("/schedule", Command::Schedule),
            ("/ask", Command::Ask),
            ("/questions", Command::Questions),
            ("/subscribe", Command::Subscribe),
            ("/unsubscribe", Command::Unsubscribe),
            ("/settings", Command::Settings),
            ("/profile", Command::Profile),
            ("/networking", Command::Networking),
        ];

        for (input, expected) in cases {
            assert_eq!(Command::parse(input, "testbot").unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_command_addressed_to_bot() {
        assert_eq!(Command::parse("/schedule@testbot", "testbot").unwrap(), Command::Schedule);
        assert!(Command::parse("/schedule@otherbot", "testbot").is_err());
    }

    #[test]
    fn test_donate_takes_rest_of_line() {
        assert_eq!(
            Command::parse("/donate 300", "testbot").unwrap(),
            Command::Donate("300".to_string())
        );
        assert_eq!(
            Command::parse("/donate", "testbot").unwrap(),
            Command::Donate(String::new())
        );
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Command::parse("/stats", "testbot").is_err());
        assert!(Command::parse("schedule", "testbot").is_err());
    }

    #[test]
    fn test_descriptions_list_every_command() {
        let help = Command::descriptions().to_string();
        for command in ["/schedule", "/ask", "/questions", "/subscribe", "/unsubscribe", "/settings", "/profile", "/networking", "/donate"] {
            assert!(help.contains(command), "help text is missing {command}");
        }
    }

    #[test]
    fn test_menu_buttons_map_to_commands() {
        assert_eq!(MenuButton::Schedule.command(), Command::Schedule);
        assert_eq!(MenuButton::Ask.command(), Command::Ask);
        assert_eq!(MenuButton::Networking.command(), Command::Networking);
        assert_eq!(MenuButton::Subscribe.command(), Command::Subscribe);

        for button in MenuButton::ALL {
            assert_eq!(MenuButton::parse(button.text()), Some(button));
        }
    }
}
