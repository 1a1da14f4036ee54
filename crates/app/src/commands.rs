use tutor_core::model::LessonId;

/// Where `:goto` should take the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One-based position as typed by the user.
    Position(i64),
    Lesson(LessonId),
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(String),
    Ask(String),
    Next,
    Prev,
    GoTo(Target),
    Reset,
    Show,
    Draft,
    Lessons,
    Chat,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl Command {
    /// Lines starting with `:` are commands; anything else is a query attempt.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Command::Run(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name, arg) {
            ("run" | "r", query) => Command::Run(query.to_string()),
            ("ask" | "a", text) => Command::Ask(text.to_string()),
            ("next" | "n", "") => Command::Next,
            ("prev" | "p", "") => Command::Prev,
            ("goto" | "g", target) if !target.is_empty() => Command::GoTo(parse_target(target)),
            ("reset", "") => Command::Reset,
            ("show" | "s", "") => Command::Show,
            ("draft" | "d", "") => Command::Draft,
            ("lessons" | "l", "") => Command::Lessons,
            ("chat" | "c", "") => Command::Chat,
            ("help" | "h" | "?", "") => Command::Help,
            ("quit" | "q" | "exit", "") => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

fn parse_target(raw: &str) -> Target {
    if let Ok(position) = raw.parse::<i64>() {
        return Target::Position(position);
    }
    match LessonId::new(raw) {
        Ok(id) => Target::Lesson(id),
        // `raw` is non-blank here, so this branch is unreachable in practice.
        Err(_) => Target::Position(0),
    }
}
