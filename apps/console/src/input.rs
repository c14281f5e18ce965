//! Console line grammar.

use liftvox_session::UserAction;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Action(UserAction),
    /// Recognizer hears nothing (no-match).
    Silence,
    History,
    Help,
    Quit,
    /// Anything not starting with ':' is spoken text.
    Speak(String),
}

pub const HELP: &str = "\
:start | :pause        toggle the session clock
:finish                finish and save the session
:listen                listen for a voice command
:voice                 enter the next set by voice
:cancel                stop listening
:entry <exercise>      open the set dialog for an exercise
:set <exercise> <weight> <reps>
                       record a set by hand
:silence               the recognizer hears nothing
:history               list saved sessions
:quit                  exit
anything else          spoken text while listening";

pub fn parse_line(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(ConsoleCommand::Speak(line.to_string()));
    };

    let mut words = rest.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let command = match verb {
        "start" | "pause" | "toggle" => ConsoleCommand::Action(UserAction::ToggleRun),
        "finish" => ConsoleCommand::Action(UserAction::Finish),
        "listen" => ConsoleCommand::Action(UserAction::ListenForCommand),
        "voice" => ConsoleCommand::Action(UserAction::VoiceEnterSet),
        "cancel" => ConsoleCommand::Action(UserAction::CancelVoice),
        "entry" if !args.is_empty() => ConsoleCommand::Action(UserAction::RequestSetEntry {
            exercise: args.join(" "),
        }),
        "set" => parse_set(&args)?,
        "silence" => ConsoleCommand::Silence,
        "history" => ConsoleCommand::History,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        _ => return Err(format!("unknown command ':{verb}', try :help")),
    };
    Ok(command)
}

/// `<exercise words...> <weight> <reps>`
fn parse_set(args: &[&str]) -> Result<ConsoleCommand, String> {
    let usage = || "usage: :set <exercise> <weight> <reps>".to_string();
    let [name @ .., weight, reps] = args else {
        return Err(usage());
    };
    if name.is_empty() {
        return Err(usage());
    }
    let weight: f64 = weight.parse().map_err(|_| format!("invalid weight '{weight}'"))?;
    let reps: u32 = reps.parse().map_err(|_| format!("invalid reps '{reps}'"))?;

    Ok(ConsoleCommand::Action(UserAction::SubmitManualSet {
        exercise: name.join(" "),
        weight,
        reps,
    }))
}

/// `--exercise name:sets`
pub fn parse_exercise_arg(value: &str) -> Result<(String, u32), String> {
    let (name, sets) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected name:sets, got '{value}'"))?;
    let sets = sets
        .trim()
        .parse()
        .map_err(|_| format!("invalid set count in '{value}'"))?;
    Ok((name.trim().to_string(), sets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_speech() {
        assert_eq!(
            parse_line("  50 kg 8 "),
            Ok(ConsoleCommand::Speak("50 kg 8".to_string()))
        );
    }

    #[test]
    fn test_set_with_multi_word_exercise() {
        assert_eq!(
            parse_line(":set bench press 42.5 8"),
            Ok(ConsoleCommand::Action(UserAction::SubmitManualSet {
                exercise: "bench press".to_string(),
                weight: 42.5,
                reps: 8,
            }))
        );
    }

    #[test]
    fn test_set_requires_exercise_weight_and_reps() {
        assert!(parse_line(":set 40 8").is_err());
        assert!(parse_line(":set squat forty 8").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse_line(":dance").is_err());
        assert!(parse_line(":entry").is_err());
    }

    #[test]
    fn test_exercise_arg() {
        assert_eq!(parse_exercise_arg("squat:3"), Ok(("squat".to_string(), 3)));
        assert_eq!(
            parse_exercise_arg("bench press:2"),
            Ok(("bench press".to_string(), 2))
        );
        assert!(parse_exercise_arg("squat").is_err());
        assert!(parse_exercise_arg("squat:x").is_err());
    }
}
