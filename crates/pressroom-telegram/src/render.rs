// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning suggestions and command replies into Telegram messages.

use pressroom_core::{CommandReply, PublicationSummary};

use crate::markdown::{bold, escape_markdown_v2, italic};

/// A message in both renderings: MarkdownV2 first, plain text as fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub markdown: String,
    pub plain: String,
}

impl Rendered {
    fn plain(text: impl Into<String>) -> Self {
        let plain = text.into();
        Self {
            markdown: escape_markdown_v2(&plain),
            plain,
        }
    }
}

/// Header lines above a suggestion: position, title, origin.
fn header(summary: &PublicationSummary) -> (String, String) {
    let counter = format!("Suggestion {}/{}", summary.position + 1, summary.total);
    let mut markdown = bold(&counter);
    let mut plain = counter;

    if let Some(title) = summary.title.as_deref().filter(|t| !t.trim().is_empty()) {
        markdown.push('\n');
        markdown.push_str(&bold(title));
        plain.push('\n');
        plain.push_str(title);
    }

    let source = summary.source_type.to_string();
    markdown.push('\n');
    markdown.push_str(&italic(&source));
    plain.push('\n');
    plain.push_str(&source);
    if let Some(link) = &summary.link {
        markdown.push_str(&escape_markdown_v2(&format!(" · {link}")));
        plain.push_str(&format!(" · {link}"));
    }
    (markdown, plain)
}

/// Header and post body for a suggestion. The image is sent separately.
pub fn summary(summary: &PublicationSummary) -> Rendered {
    let (markdown, plain) = header(summary);
    Rendered {
        markdown: format!("{markdown}\n\n{}", escape_markdown_v2(&summary.content)),
        plain: format!("{plain}\n\n{}", summary.content),
    }
}

/// Text replies. Summaries go through [`summary`] instead.
pub fn reply(reply: &CommandReply) -> Rendered {
    match reply {
        CommandReply::Summary(s) => summary(s),
        CommandReply::Text(text) => Rendered::plain(text.as_str()),
        CommandReply::List(entries) if entries.is_empty() => {
            Rendered::plain("No suggestions pending.")
        }
        CommandReply::List(entries) => {
            let mut markdown = bold("Suggestions");
            let mut plain = String::from("Suggestions");
            for (index, label) in entries {
                markdown.push_str(&format!("\n`{index}` {}", escape_markdown_v2(label)));
                plain.push_str(&format!("\n{index}: {label}"));
            }
            markdown.push_str(&format!("\n\n{}", italic("/select <index> to open one")));
            plain.push_str("\n\n/select <index> to open one");
            Rendered { markdown, plain }
        }
        CommandReply::Error { code, message } => Rendered {
            markdown: format!("{} `{code}`\n{}", bold("Error"), escape_markdown_v2(message)),
            plain: format!("Error ({code}): {message}"),
        },
    }
}

pub const HELP: &str = "\
Commands:
/start  bind this chat as the operator
/current  show the selected suggestion
/next, /previous  move through the queue
/list  list pending suggestions
/select <index>  open a suggestion from /list
/publish  publish the selected suggestion
/clear  discard the selected suggestion
/update <text>  replace the post text
/revise <instruction>  ask for a rewrite (plain messages do the same)
/add_source <url or path>  queue a page, video or document
/clear_image  remove the attached image
/allow, /stop  resume or pause automatic suggestions
/healthcheck  report status
Send a photo to attach it, or a .txt/.md document to queue it.";
