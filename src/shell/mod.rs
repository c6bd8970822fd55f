use std::error::Error;
use std::io::Write;

use chrono::{DateTime, Local, Timelike, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::conversation::{ConversationController, SubmitOutcome, QUICK_ACTIONS};
use crate::models::chat::{ConversationSummary, Message};
use crate::models::user::UserProfile;

const TITLE_LIMIT: usize = 40;

/// Line-oriented front end for one chat session. Reads drafts from stdin,
/// routes slash commands, and prints whatever the controller appends.
pub struct ChatShell {
    controller: ConversationController,
    profile: Option<UserProfile>,
    signed_in: bool,
    archived: Vec<ConversationSummary>,
    printed: usize,
}

impl ChatShell {
    pub fn new(
        controller: ConversationController,
        profile: Option<UserProfile>,
        signed_in: bool,
    ) -> Self {
        Self {
            controller,
            profile,
            signed_in,
            archived: Vec::new(),
            printed: 0,
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.print_welcome();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("you> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if !self.handle_line(line).await {
                break;
            }
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: String) -> bool {
        let trimmed = line.trim();
        match trimmed {
            "/quit" | "/exit" => return false,
            "/help" => {
                self.print_help();
                return true;
            }
            "/new" => {
                self.archive_current();
                self.controller.start_new_conversation();
                self.printed = 0;
                println!("Started a new conversation.");
                return true;
            }
            "/actions" => {
                self.print_quick_actions();
                return true;
            }
            "/conversations" => {
                self.print_conversations();
                return true;
            }
            _ => {}
        }

        if let Some(rest) = trimmed.strip_prefix("/action") {
            match rest.trim().parse::<usize>() {
                Ok(index) if (1..=QUICK_ACTIONS.len()).contains(&index) => {
                    let outcome = self
                        .controller
                        .select_quick_action(QUICK_ACTIONS[index - 1])
                        .await;
                    return self.report(outcome);
                }
                _ => {
                    println!("Pick an action between 1 and {}.", QUICK_ACTIONS.len());
                    return true;
                }
            }
        }
        if let Some(rest) = trimmed.strip_prefix("/open") {
            match rest.trim().parse::<usize>() {
                Ok(index) if (1..=self.archived.len()).contains(&index) => {
                    let summary = self.archived[index - 1].clone();
                    self.controller.open_conversation(&summary);
                    self.printed = 0;
                    self.print_new_replies();
                    return true;
                }
                _ => {
                    println!("No such conversation. Try /conversations first.");
                    return true;
                }
            }
        }
        if trimmed.starts_with('/') {
            println!("Unknown command: {}", trimmed);
            self.print_help();
            return true;
        }

        let outcome = self.controller.submit_text(line).await;
        self.report(outcome)
    }

    fn report(&mut self, outcome: SubmitOutcome) -> bool {
        match outcome {
            SubmitOutcome::Ignored => true,
            SubmitOutcome::Completed | SubmitOutcome::Reset => {
                self.print_new_replies();
                true
            }
            SubmitOutcome::SessionExpired => {
                self.print_new_replies();
                println!("Sign in again to continue, then restart the shell.");
                false
            }
        }
    }

    fn print_new_replies(&mut self) {
        let messages = self.controller.messages();
        // A reset shrinks the transcript underneath the cursor.
        if self.printed > messages.len() {
            self.printed = 0;
        }
        for message in &messages[self.printed..] {
            if !message.is_user {
                println!();
                println!("SymptoSeek: {}", message.text);
                println!();
            }
        }
        self.printed = messages.len();
    }

    fn print_welcome(&self) {
        let name = self
            .profile
            .as_ref()
            .and_then(|profile| profile.name.as_deref());
        println!("{}", greeting_line(Local::now().hour(), name));
        if self.signed_in {
            println!("What can I help you with today?");
        } else {
            println!("Get AI-powered health insights. Sign up for personalized recommendations!");
        }
        println!();
        self.print_quick_actions();
        println!();
        self.print_help();
        println!();
    }

    fn print_quick_actions(&self) {
        println!("Quick actions (send one with /action <n>):");
        for (index, action) in QUICK_ACTIONS.iter().enumerate() {
            println!("  {}. {}", index + 1, action);
        }
    }

    fn print_help(&self) {
        println!(
            "Commands: /new, /conversations, /open <n>, /actions, /action <n>, /help, /quit"
        );
    }

    fn print_conversations(&self) {
        if self.archived.is_empty() {
            println!("No saved conversations yet.");
            return;
        }
        let now = Utc::now();
        for (index, summary) in self.archived.iter().enumerate() {
            println!(
                "  {}. {} ({})",
                index + 1,
                summary.title,
                format_age(summary.timestamp, now)
            );
        }
    }

    fn archive_current(&mut self) {
        let messages = self.controller.messages();
        if messages.is_empty() {
            return;
        }
        let title = derive_title(messages);
        let last = messages
            .last()
            .map(|message| message.text.clone())
            .unwrap_or_default();
        self.archived.push(ConversationSummary::new(title, last));
    }
}

/// Time-of-day greeting, personalized when the profile gave us a name.
fn greeting_line(hour: u32, name: Option<&str>) -> String {
    let part_of_day = if hour < 12 {
        "morning"
    } else if hour < 18 {
        "afternoon"
    } else {
        "evening"
    };
    match name {
        Some(name) => format!("Good {}, {}!", part_of_day, name),
        None => format!("Good {}!", part_of_day),
    }
}

/// Coarse age label for the conversation list.
fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = (now - timestamp).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if hours < 48 {
        "Yesterday".to_string()
    } else {
        format!("{}d ago", hours / 24)
    }
}

/// Titles a finished conversation after its first user message.
fn derive_title(messages: &[Message]) -> String {
    let first = messages
        .iter()
        .find(|message| message.is_user)
        .map(|message| message.text.trim().to_string())
        .filter(|text| !text.is_empty());
    match first {
        Some(text) if text.chars().count() > TITLE_LIMIT => {
            let clipped: String = text.chars().take(TITLE_LIMIT).collect();
            format!("{}...", clipped.trim_end())
        }
        Some(text) => text,
        None => "New conversation".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn greeting_follows_the_clock() {
        assert_eq!(greeting_line(0, None), "Good morning!");
        assert_eq!(greeting_line(11, None), "Good morning!");
        assert_eq!(greeting_line(12, None), "Good afternoon!");
        assert_eq!(greeting_line(17, None), "Good afternoon!");
        assert_eq!(greeting_line(18, None), "Good evening!");
        assert_eq!(greeting_line(23, None), "Good evening!");
    }

    #[test]
    fn greeting_uses_the_profile_name() {
        assert_eq!(greeting_line(9, Some("Demo User")), "Good morning, Demo User!");
    }

    #[test]
    fn ages_collapse_into_coarse_buckets() {
        let now = Utc::now();
        assert_eq!(format_age(now - Duration::minutes(30), now), "Just now");
        assert_eq!(format_age(now - Duration::hours(5), now), "5h ago");
        assert_eq!(format_age(now - Duration::hours(30), now), "Yesterday");
        assert_eq!(format_age(now - Duration::hours(80), now), "3d ago");
    }

    #[test]
    fn title_comes_from_the_first_user_message() {
        let messages = vec![
            Message::assistant("Hello!"),
            Message::user("  I have chest pain  "),
            Message::user("it started yesterday"),
        ];

        assert_eq!(derive_title(&messages), "I have chest pain");
    }

    #[test]
    fn long_titles_are_clipped() {
        let messages = vec![Message::user(
            "I have a persistent headache that gets worse every evening",
        )];

        let title = derive_title(&messages);

        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= TITLE_LIMIT + 3);
    }

    #[test]
    fn assistant_only_transcripts_get_a_default_title() {
        let messages = vec![Message::assistant("Hello!")];

        assert_eq!(derive_title(&messages), "New conversation");
    }
}
