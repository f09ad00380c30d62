//! Terminal confirmation prompt and notification output

use async_trait::async_trait;
use musabaha_client::{ConfirmationPrompt, Confirmer, Notification, NotificationLevel, Notifier};
use std::io::{BufRead, Write};

/// Asks on stderr and reads the answer from stdin
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        let prompt = prompt.clone();
        let answer = tokio::task::spawn_blocking(move || ask(&prompt)).await;

        match answer {
            Ok(Ok(line)) => is_yes(&line),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Could not read confirmation");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt task failed");
                false
            }
        }
    }
}

fn ask(prompt: &ConfirmationPrompt) -> std::io::Result<String> {
    let mut stderr = std::io::stderr().lock();
    writeln!(stderr, "{}", prompt.title)?;
    writeln!(stderr, "{}", prompt.text)?;
    write!(
        stderr,
        "[y] {} / [N] {}: ",
        prompt.confirm_label, prompt.cancel_label
    )?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Whether a typed answer means yes; anything else, including EOF, is no
pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prints notifications: successes and info to stdout, problems to stderr
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Info | NotificationLevel::Success => {
                println!("{notification}");
            }
            NotificationLevel::Warning | NotificationLevel::Error => {
                eprintln!("{notification}");
            }
        }
    }
}
