//! Privileged `/addreplace` and `/block` commands.

use std::{fmt, sync::Arc};

use crate::{
    config::Config,
    domain::{MessageId, UserId},
    formatting::escape_html,
    store::{BlockOutcome, RuleStore},
};

pub const ADD_REPLACE_USAGE: &str = "/addreplace &lt;old&gt; &lt;new&gt;";
pub const BLOCK_USAGE: &str = "/block &lt;message_id&gt;";

/// Malformed command arguments. Carries the HTML usage line to show the admin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageError {
    pub usage: &'static str,
    pub reason: String,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for UsageError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddReplace {
    pub old: String,
    pub new: String,
}

/// `<old> <new...>`: the first token is the pattern. The replacement is
/// everything after the single separator character, kept verbatim.
pub fn parse_add_replace(args: &str) -> Result<AddReplace, UsageError> {
    let usage = |reason: &str| UsageError {
        usage: ADD_REPLACE_USAGE,
        reason: reason.to_string(),
    };

    let args = args.trim_start();
    let Some((old, new)) = args.split_once(char::is_whitespace) else {
        return Err(usage("expected two arguments"));
    };
    if old.is_empty() || new.trim().is_empty() {
        return Err(usage("expected two arguments"));
    }

    Ok(AddReplace {
        old: old.to_string(),
        new: new.to_string(),
    })
}

pub fn parse_block(args: &str) -> Result<MessageId, UsageError> {
    let usage = |reason: String| UsageError {
        usage: BLOCK_USAGE,
        reason,
    };

    let mut tokens = args.split_whitespace();
    let (Some(raw), None) = (tokens.next(), tokens.next()) else {
        return Err(usage("expected exactly one message id".to_string()));
    };
    raw.parse::<i32>()
        .map(MessageId)
        .map_err(|_| usage(format!("not a message id: {raw}")))
}

/// Admin command handler. Unauthorized senders never reach the store.
pub struct AdminCommands {
    admins: Vec<UserId>,
    store: Arc<RuleStore>,
}

impl AdminCommands {
    pub fn new(cfg: &Config, store: Arc<RuleStore>) -> Self {
        Self {
            admins: cfg.authorized_admins(),
            store,
        }
    }

    pub fn is_admin(&self, user_id: Option<UserId>) -> bool {
        is_authorized(user_id, &self.admins)
    }

    pub fn handles(name: &str) -> bool {
        matches!(name, "addreplace" | "block")
    }

    /// Run a command and return the HTML reply.
    ///
    /// `None` means stay silent: unknown command or unauthorized sender.
    pub async fn handle(&self, sender: Option<UserId>, name: &str, args: &str) -> Option<String> {
        if !Self::handles(name) || !self.is_admin(sender) {
            return None;
        }

        let reply = match name {
            "addreplace" => match parse_add_replace(args) {
                Ok(cmd) => self.add_replace(cmd).await,
                Err(e) => usage_reply(&e),
            },
            _ => match parse_block(args) {
                Ok(id) => self.block(id).await,
                Err(e) => usage_reply(&e),
            },
        };
        Some(reply)
    }

    async fn add_replace(&self, cmd: AddReplace) -> String {
        match self.store.set_text_rule(&cmd.old, &cmd.new).await {
            Ok(()) => {
                tracing::info!(old = %cmd.old, new = %cmd.new, "replacement added");
                format!(
                    "✅ Added replacement: <code>{}</code> → <code>{}</code>",
                    escape_html(&cmd.old),
                    escape_html(&cmd.new)
                )
            }
            Err(e) => {
                tracing::error!("failed to save replacement: {e}");
                "❌ Failed to save replacement. Check the bot logs.".to_string()
            }
        }
    }

    async fn block(&self, id: MessageId) -> String {
        match self.store.block_message(id).await {
            Ok(BlockOutcome::Blocked) => {
                tracing::info!(message_id = %id, "message blocked");
                format!("✅ Blocked message ID <code>{id}</code>.")
            }
            Ok(BlockOutcome::AlreadyBlocked) => {
                format!("⚠️ Message ID <code>{id}</code> is already blocked.")
            }
            Err(e) => {
                tracing::error!("failed to save block list: {e}");
                "❌ Failed to block message. Check the bot logs.".to_string()
            }
        }
    }
}

pub fn is_authorized(user_id: Option<UserId>, allowed_users: &[UserId]) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    allowed_users.contains(&user_id)
}

fn usage_reply(e: &UsageError) -> String {
    format!("⚠️ Usage: <code>{}</code>", e.usage)
}
