use anyhow::{anyhow, bail, Context};
use crawlboard_core::{FormField, JobAction, JobId, Msg};

pub const USAGE: &str = "\
commands:
  refresh                  reload stats and jobs
  start|cancel|delete <id> run an action on a job
  records <id>             show up to 100 records of a job
  close                    close the records view
  set <field> <value>      edit the new-job form
  clear <field>            blank a form field
  submit                   create the job
  y | n                    answer a pending confirmation
  quit
keys: Enter runs the line, Esc closes help or records, Up/Down scroll, Ctrl-C quits
fields: name, start, end, province_id, township_id, province_name, township_name";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Msg(Msg),
    Help,
}

/// Parses one line typed by the user. Blank lines yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<Input>> {
    let line = line.trim();
    let Some((command, rest)) = split_word(line) else {
        return Ok(None);
    };
    let msg = match command.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(Some(Input::Help)),
        "refresh" | "r" => Msg::RefreshClicked,
        "start" => action(JobAction::Start, rest)?,
        "cancel" => action(JobAction::Cancel, rest)?,
        "delete" => action(JobAction::Delete, rest)?,
        "records" => Msg::RecordsClicked(job_id(rest)?),
        "close" => Msg::ModalClosed,
        "set" => {
            let (key, value) = split_word(rest).ok_or_else(|| anyhow!("set needs a field"))?;
            Msg::FormFieldChanged {
                field: field(key)?,
                value: value.to_string(),
            }
        }
        "clear" => Msg::FormFieldChanged {
            field: field(rest)?,
            value: String::new(),
        },
        "submit" => Msg::CreateSubmitted,
        "y" | "yes" => Msg::ConfirmationAnswered(true),
        "n" | "no" => Msg::ConfirmationAnswered(false),
        "quit" | "exit" | "q" => Msg::CloseRequested,
        other => bail!("unknown command {other:?}, type help"),
    };
    Ok(Some(Input::Msg(msg)))
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    })
}

fn action(action: JobAction, rest: &str) -> anyhow::Result<Msg> {
    Ok(Msg::ActionClicked {
        action,
        job_id: job_id(rest)?,
    })
}

fn job_id(text: &str) -> anyhow::Result<JobId> {
    let text = text.trim().trim_start_matches('#');
    if text.is_empty() {
        bail!("a job id is required");
    }
    text.parse()
        .with_context(|| format!("{text:?} is not a job id"))
}

fn field(key: &str) -> anyhow::Result<FormField> {
    FormField::from_key(key.trim()).ok_or_else(|| anyhow!("unknown form field {key:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(line: &str) -> Msg {
        match parse_line(line).unwrap() {
            Some(Input::Msg(msg)) => msg,
            other => panic!("expected a message for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn actions_take_a_job_id() {
        assert_eq!(
            msg("cancel 12"),
            Msg::ActionClicked {
                action: JobAction::Cancel,
                job_id: 12
            }
        );
        assert_eq!(msg("records #4"), Msg::RecordsClicked(4));
        assert!(parse_line("delete").is_err());
        assert!(parse_line("start twelve").is_err());
    }

    #[test]
    fn set_keeps_inner_spaces_of_the_value() {
        assert_eq!(
            msg("set name  Tehran north  "),
            Msg::FormFieldChanged {
                field: FormField::Name,
                value: "Tehran north".to_string()
            }
        );
        assert_eq!(
            msg("clear province_id"),
            Msg::FormFieldChanged {
                field: FormField::ProvinceId,
                value: String::new()
            }
        );
        assert!(parse_line("set colour red").is_err());
    }

    #[test]
    fn blank_and_help_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("help").unwrap(), Some(Input::Help));
        assert_eq!(msg("QUIT"), Msg::CloseRequested);
        assert_eq!(msg("y"), Msg::ConfirmationAnswered(true));
        assert!(parse_line("launch 3").is_err());
    }
}
