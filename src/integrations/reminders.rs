use crate::error::SyncError;
use crate::models::Reminder;
use crate::sync::LocalReminderStore;
use log::debug;
use std::process::Command;

const OSASCRIPT: &str = "osascript";
const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

/// Apple Reminders driven through `osascript`, one process per operation.
pub struct AppleReminders {
    program: String,
}

impl Default for AppleReminders {
    fn default() -> Self {
        Self {
            program: OSASCRIPT.to_string(),
        }
    }
}

impl AppleReminders {
    #[cfg(test)]
    pub fn with_program(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn run(&self, script: &str) -> Result<String, SyncError> {
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(script)
            .output()
            .map_err(|e| SyncError::LocalStore(format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SyncError::LocalStore(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("{} returned {} byte(s)", self.program, stdout.len());
        Ok(stdout)
    }
}

impl LocalReminderStore for AppleReminders {
    fn has_list(&self, list: &str) -> Result<bool, SyncError> {
        parse_bool(&self.run(&has_list_script(list))?)
    }

    fn create(&self, list: &str, title: &str, body: &str) -> Result<(), SyncError> {
        self.run(&create_script(list, title, body)).map(|_| ())
    }

    fn exists(&self, list: &str, title: &str) -> Result<bool, SyncError> {
        parse_bool(&self.run(&exists_script(list, title))?)
    }

    fn list_completed(&self, list: &str) -> Result<Vec<Reminder>, SyncError> {
        let output = self.run(&list_completed_script(list))?;
        Ok(parse_completed(&output, list))
    }

    fn delete_completed(&self, list: &str) -> Result<(), SyncError> {
        self.run(&delete_completed_script(list)).map(|_| ())
    }
}

/// Escapes text for use inside an AppleScript string literal.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn has_list_script(list: &str) -> String {
    format!(
        r#"tell application "Reminders"
    if exists list {list} then
        return "true"
    end if
    return "false"
end tell"#,
        list = quote(list)
    )
}

fn create_script(list: &str, title: &str, body: &str) -> String {
    format!(
        r#"tell application "Reminders"
    set reminderList to list {list}
    make new reminder in reminderList with properties {{name:{title}, body:{body}}}
end tell"#,
        list = quote(list),
        title = quote(title),
        body = quote(body)
    )
}

fn exists_script(list: &str, title: &str) -> String {
    format!(
        r#"tell application "Reminders"
    set reminderList to list {list}
    try
        set existingReminder to (first reminder in reminderList whose name is {title})
        return "true"
    on error
        return "false"
    end try
end tell"#,
        list = quote(list),
        title = quote(title)
    )
}

fn list_completed_script(list: &str) -> String {
    format!(
        r#"tell application "Reminders"
    set reminderList to list {list}
    set output to ""
    repeat with aReminder in (every reminder in reminderList whose completed is true)
        set reminderBody to body of aReminder
        if reminderBody is missing value then set reminderBody to ""
        set output to output & name of aReminder & (character id 31) & reminderBody & (character id 30)
    end repeat
    return output
end tell"#,
        list = quote(list)
    )
}

fn delete_completed_script(list: &str) -> String {
    format!(
        r#"tell application "Reminders"
    set reminderList to list {list}
    delete (every reminder in reminderList whose completed is true)
end tell"#,
        list = quote(list)
    )
}

fn parse_bool(output: &str) -> Result<bool, SyncError> {
    match output.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(SyncError::LocalStore(format!(
            "unexpected osascript output: {other:?}"
        ))),
    }
}

fn parse_completed(output: &str, list: &str) -> Vec<Reminder> {
    let output = output.strip_suffix('\n').unwrap_or(output);
    output
        .split(RECORD_SEP)
        .filter(|record| !record.is_empty())
        .map(|record| {
            let (title, body) = record.split_once(FIELD_SEP).unwrap_or((record, ""));
            Reminder {
                title: title.to_string(),
                body: match body {
                    "" | "missing value" => None,
                    text => Some(text.to_string()),
                },
                completed: true,
                list: list.to_string(),
            }
        })
        .collect()
}
