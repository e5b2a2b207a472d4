// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message filtering and command parsing.
//!
//! Turns an incoming Telegram message into a controller [`Command`].
//! Slash commands map one to one; free text asks for a revision, a photo
//! becomes the post image and a text document is queued for the manual
//! source.

use std::path::Path;

use pressroom_core::{Command, PressroomError};
use teloxide::prelude::*;
use teloxide::types::ChatKind;
use tracing::debug;

use crate::media;
use crate::render::HELP;

/// What an incoming message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Forwarded to the controller.
    Command(Command),
    /// Answered by the channel itself without reaching the controller.
    Answer(String),
}

/// Whether the sender may talk to the bot.
///
/// Matches the user id or the username (with or without `@`, any case).
/// An empty list admits everyone; the controller still binds to the first
/// identity that sends `start`. Messages without a sender are refused.
pub fn is_authorized(msg: &Message, allowed_users: &[String]) -> bool {
    let Some(user) = msg.from.as_ref() else {
        return false;
    };
    if allowed_users.is_empty() {
        return true;
    }

    let user_id = user.id.0.to_string();
    allowed_users.iter().any(|allowed| {
        *allowed == user_id
            || user.username.as_deref().is_some_and(|name| {
                name.eq_ignore_ascii_case(allowed.strip_prefix('@').unwrap_or(allowed))
            })
    })
}

/// Only private chats are served.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// The operator identity of a message: the sender's user id.
pub fn sender_id(msg: &Message) -> Option<String> {
    msg.from.as_ref().map(|u| u.id.0.to_string())
}

fn usage(text: &str) -> Inbound {
    Inbound::Answer(format!("Usage: {text}"))
}

fn with_argument(arg: &str, command: fn(String) -> Command, usage_text: &str) -> Inbound {
    if arg.is_empty() {
        usage(usage_text)
    } else {
        Inbound::Command(command(arg.to_string()))
    }
}

/// Parse a text message.
///
/// `/cmd@BotName args` is accepted as well as `/cmd args`. Anything that is
/// not a slash command is a revision request.
pub fn parse_text(text: &str) -> Inbound {
    let text = text.trim();
    let Some(rest) = text.strip_prefix('/') else {
        return Inbound::Command(Command::Revise(text.to_string()));
    };

    let (head, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(h, a)| (h, a.trim()));
    let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

    match name.as_str() {
        "start" => Inbound::Command(Command::Start),
        "healthcheck" | "health" => Inbound::Command(Command::Health),
        "allow" => Inbound::Command(Command::Allow),
        "stop" => Inbound::Command(Command::Stop),
        "clear" | "discard" => Inbound::Command(Command::Discard),
        "list" => Inbound::Command(Command::List),
        "next" => Inbound::Command(Command::Next),
        "previous" | "prev" => Inbound::Command(Command::Previous),
        "current" => Inbound::Command(Command::Current),
        "publish" => Inbound::Command(Command::Publish),
        "clear_image" => Inbound::Command(Command::ClearImage),
        "select" => match arg.parse::<usize>() {
            Ok(index) => Inbound::Command(Command::Select(index)),
            Err(_) => usage("/select <index>, with the index shown by /list"),
        },
        "update" => with_argument(arg, Command::Update, "/update <new post text>"),
        "revise" => with_argument(arg, Command::Revise, "/revise <instruction>"),
        "add_source" | "add_source_item" | "add_youtube" => {
            with_argument(arg, Command::AddSourceItem, "/add_source <url or path>")
        }
        "help" => Inbound::Answer(HELP.to_string()),
        other => Inbound::Answer(format!("Unknown command /{other}.\n\n{HELP}")),
    }
}

/// Interpret a message. Returns `None` for message kinds the bot ignores.
pub async fn extract_inbound(
    bot: &Bot,
    msg: &Message,
    downloads_dir: &Path,
) -> Result<Option<Inbound>, PressroomError> {
    if let Some(text) = msg.text() {
        return Ok(Some(parse_text(text)));
    }

    if let Some(photos) = msg.photo() {
        let bytes = media::download_photo(bot, photos).await?;
        return Ok(Some(Inbound::Command(Command::SetImage(bytes))));
    }

    if let Some(doc) = msg.document() {
        let file_name = doc.file_name.as_deref();
        let mime = doc.mime_type.as_ref().map(|m| m.essence_str());
        if !media::is_text_document(file_name, mime) {
            return Ok(Some(Inbound::Answer(
                "Only .txt and .md documents can be added as sources.".into(),
            )));
        }
        let path = media::save_document(bot, doc, msg.id.0, downloads_dir).await?;
        let reference = path.to_string_lossy().into_owned();
        return Ok(Some(Inbound::Command(Command::AddSourceItem(reference))));
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_id: u64, username: Option<&str>) -> serde_json::Value {
        let mut from = serde_json::json!({
            "id": user_id,
            "is_bot": false,
            "first_name": "Operator",
        });
        if let Some(name) = username {
            from["username"] = name.into();
        }
        from
    }

    fn private_message(user_id: u64, username: Option<&str>, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": { "id": user_id as i64, "type": "private", "first_name": "Operator" },
            "from": user(user_id, username),
            "text": text,
        });
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    fn group_message(user_id: u64, text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": { "id": -100123i64, "type": "supergroup", "title": "Newsroom" },
            "from": user(user_id, None),
            "text": text,
        });
        serde_json::from_value(json).expect("failed to deserialize mock group message")
    }

    fn anonymous_message(text: &str) -> Message {
        let json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": { "id": 42i64, "type": "private", "first_name": "Operator" },
            "text": text,
        });
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    #[test]
    fn authorization_by_id_and_username() {
        let msg = private_message(42, Some("Editor"), "hi");
        assert!(is_authorized(&msg, &["42".into()]));
        assert!(is_authorized(&msg, &["editor".into()]));
        assert!(is_authorized(&msg, &["@EDITOR".into()]));
        assert!(!is_authorized(&msg, &["99".into(), "someone".into()]));
    }

    #[test]
    fn empty_allow_list_admits_senders_only() {
        assert!(is_authorized(&private_message(42, None, "hi"), &[]));
        assert!(!is_authorized(&anonymous_message("hi"), &[]));
    }

    #[test]
    fn only_private_chats_are_served() {
        assert!(is_dm(&private_message(42, None, "hi")));
        assert!(!is_dm(&group_message(42, "hi")));
    }

    #[test]
    fn sender_is_the_user_id() {
        assert_eq!(sender_id(&private_message(42, Some("x"), "hi")).as_deref(), Some("42"));
        assert_eq!(sender_id(&anonymous_message("hi")), None);
    }

    #[test]
    fn plain_commands() {
        let cases = [
            ("/start", Command::Start),
            ("/healthcheck", Command::Health),
            ("/allow", Command::Allow),
            ("/stop", Command::Stop),
            ("/clear", Command::Discard),
            ("/discard", Command::Discard),
            ("/list", Command::List),
            ("/next", Command::Next),
            ("/previous", Command::Previous),
            ("/current", Command::Current),
            ("/publish", Command::Publish),
            ("/clear_image", Command::ClearImage),
            ("/Next@pressroom_bot", Command::Next),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_text(text), Inbound::Command(expected), "{text}");
        }
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(parse_text("/select 2"), Inbound::Command(Command::Select(2)));
        assert_eq!(
            parse_text("/update  New text\nsecond line "),
            Inbound::Command(Command::Update("New text\nsecond line".into()))
        );
        assert_eq!(
            parse_text("/add_youtube https://youtu.be/abc"),
            Inbound::Command(Command::AddSourceItem("https://youtu.be/abc".into()))
        );
        assert_eq!(
            parse_text("/revise shorter"),
            Inbound::Command(Command::Revise("shorter".into()))
        );
    }

    #[test]
    fn missing_or_bad_arguments_are_answered_locally() {
        for text in ["/select", "/select two", "/update", "/add_source  "] {
            assert!(
                matches!(parse_text(text), Inbound::Answer(ref a) if a.starts_with("Usage:")),
                "{text}"
            );
        }
    }

    #[test]
    fn free_text_is_a_revision() {
        assert_eq!(
            parse_text("  make it punchier "),
            Inbound::Command(Command::Revise("make it punchier".into()))
        );
    }

    #[test]
    fn unknown_command_lists_help() {
        match parse_text("/frobnicate") {
            Inbound::Answer(text) => {
                assert!(text.starts_with("Unknown command /frobnicate."));
                assert!(text.contains("/publish"));
            }
            other => panic!("expected an answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn text_messages_need_no_download() {
        let bot = Bot::new("test:token");
        let dir = tempfile::tempdir().unwrap();
        let msg = private_message(42, None, "/list");
        let inbound = extract_inbound(&bot, &msg, dir.path()).await.unwrap();
        assert_eq!(inbound, Some(Inbound::Command(Command::List)));
    }
}
