//! User-role messages that tell the model what happened to its proposal.

use crate::exec::ExecutionRecord;

pub const NO_COMMANDS: &str =
    "Assistant indicated no commands should be run for the last request.";

pub fn skipped(step: usize, total: usize, command: &str) -> String {
    format!("User skipped command {step}/{total}: `{command}`")
}

pub fn executed(record: &ExecutionRecord, step: usize, total: usize) -> String {
    format!(
        "User confirmed and executed command {step}/{total}: `{command}`\n\
         Exit Code: {code}\n\
         STDOUT:\n```\n{stdout}\n```\n\
         STDERR:\n```\n{stderr}\n```",
        command = record.command,
        code = record.exit_code,
        stdout = record.stdout.trim(),
        stderr = record.stderr.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executed_feedback_is_verbatim_and_delimited() {
        let record = ExecutionRecord {
            command: "gitt status".to_string(),
            exit_code: 127,
            stdout: String::new(),
            stderr: "bash: gitt: command not found\n".to_string(),
        };

        assert_eq!(
            executed(&record, 1, 2),
            "User confirmed and executed command 1/2: `gitt status`\n\
             Exit Code: 127\n\
             STDOUT:\n```\n\n```\n\
             STDERR:\n```\nbash: gitt: command not found\n```"
        );
    }

    #[test]
    fn skipped_feedback_names_command() {
        assert_eq!(
            skipped(2, 3, "rm -rf build"),
            "User skipped command 2/3: `rm -rf build`"
        );
    }
}
