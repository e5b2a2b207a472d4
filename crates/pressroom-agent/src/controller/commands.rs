// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator command dispatch.

use chrono::Utc;
use pressroom_core::format::{apply_unicode_bold, truncate_chars};
use pressroom_core::{
    Command, CommandReply, ControllerPhase, InboundCommand, PressroomError, PublicationId, Turn,
    TurnRole,
};
use pressroom_sources::classify_reference;
use tokio::sync::MutexGuard;
use tracing::{debug, info, warn};

use super::{Inner, SuggestionController, held_block};

/// Characters of the post body shown in `list` when the source had no title.
const LIST_LABEL_CHARS: usize = 60;

impl SuggestionController {
    /// Execute a command and render the result, errors included.
    pub async fn handle_command(&self, inbound: InboundCommand) -> CommandReply {
        let name = inbound.command.name();
        match self.execute(inbound).await {
            Ok(reply) => {
                debug!(command = name, "command handled");
                reply
            }
            Err(e) => {
                warn!(command = name, error = %e, "command rejected");
                CommandReply::from_error(&e)
            }
        }
    }

    async fn execute(&self, inbound: InboundCommand) -> Result<CommandReply, PressroomError> {
        let InboundCommand { sender, command } = inbound;
        let mut inner = self.inner.lock().await;

        let bound = inner.state.operator_identity.clone();
        match (bound.as_deref(), &command) {
            (Some(bound), _) if bound != sender => {
                return Err(PressroomError::IdentityMismatch { sender });
            }
            (Some(_), Command::Start) => {
                return Ok(CommandReply::text("Already started."));
            }
            (None, Command::Start) => {
                inner.state.operator_identity = Some(sender.clone());
                self.save(&inner).await?;
                info!(operator = %sender, "operator bound");
                return Ok(CommandReply::text(
                    "Started. Suggestions will be sent to this chat.",
                ));
            }
            (None, _) => {
                return Err(PressroomError::InvalidCommand(
                    "no operator bound yet, send start first".into(),
                ));
            }
            (Some(_), _) => {}
        }

        self.refresh(&mut inner).await?;

        match command {
            Command::Start => Ok(CommandReply::text("Already started.")),
            Command::Next => {
                inner.queue.next();
                self.show_current(&mut inner).await
            }
            Command::Previous => {
                inner.queue.previous();
                self.show_current(&mut inner).await
            }
            Command::Select(index) => {
                inner.queue.select(index)?;
                self.show_current(&mut inner).await
            }
            Command::Current => self.show_current(&mut inner).await,
            Command::List => self.list(&inner).await,
            Command::Publish => self.publish_current(&mut inner).await,
            Command::Discard => {
                let id = current(&inner)?;
                self.workflow.discard(&id).await?;
                if inner.state.phase == ControllerPhase::AwaitingInteraction {
                    inner.state.phase = ControllerPhase::Idle;
                    inner.state.suggestions_blocked = held_block(&inner.state);
                }
                inner.state.current_publication = None;
                self.refresh(&mut inner).await?;
                self.save(&inner).await?;
                Ok(CommandReply::text(format!(
                    "Discarded. {} left in the queue.",
                    inner.queue.len()
                )))
            }
            Command::Allow => {
                inner.state.operator_paused = false;
                inner.state.delivery_failed = false;
                inner.state.suggestions_blocked = false;
                inner.state.phase = ControllerPhase::Idle;
                inner.state.cool_off_until = None;
                self.save(&inner).await?;
                info!("suggestions allowed by operator");
                Ok(CommandReply::text("Suggestions resumed."))
            }
            Command::Stop => {
                inner.state.operator_paused = true;
                inner.state.suggestions_blocked = true;
                self.save(&inner).await?;
                info!("suggestions stopped by operator");
                Ok(CommandReply::text("Suggestions stopped until you send allow."))
            }
            Command::Update(content) => {
                let content = content.trim();
                if content.is_empty() {
                    return Err(PressroomError::InvalidCommand("new content is empty".into()));
                }
                let id = current(&inner)?;
                self.storage.update_content(&id, content).await?;
                self.checkpoints.append(&id, Turn::agent(content)).await?;
                self.show_current(&mut inner).await
            }
            Command::Revise(instruction) => self.revise(inner, instruction).await,
            Command::AddSourceItem(reference) => {
                let reference = reference.trim();
                if reference.is_empty() {
                    return Err(PressroomError::InvalidCommand("empty reference".into()));
                }
                let kind = classify_reference(reference);
                let added = self.storage.add_source_item(kind, reference).await?;
                info!(source = %kind, added, "source item queued");
                Ok(CommandReply::text(if added {
                    format!("Queued for the {kind} source.")
                } else {
                    format!("Already queued for the {kind} source.")
                }))
            }
            Command::SetImage(bytes) => {
                if bytes.is_empty() {
                    return Err(PressroomError::InvalidCommand("image is empty".into()));
                }
                let id = current(&inner)?;
                self.storage.set_image(&id, Some(bytes)).await?;
                self.show_current(&mut inner).await
            }
            Command::ClearImage => {
                let id = current(&inner)?;
                self.storage.set_image(&id, None).await?;
                self.show_current(&mut inner).await
            }
            Command::Health => Ok(CommandReply::text(format!(
                "ok: {} pending, phase {}, suggestions {}",
                inner.queue.len(),
                inner.state.phase,
                if inner.state.suggestions_blocked {
                    "blocked"
                } else {
                    "allowed"
                }
            ))),
        }
    }

    /// Reply with the current item and remember it as shown.
    async fn show_current(&self, inner: &mut Inner) -> Result<CommandReply, PressroomError> {
        let id = current(inner)?;
        let summary = self.summary(&inner.queue, &id).await?;
        inner.state.current_publication = Some(id);
        self.save(inner).await?;
        Ok(CommandReply::Summary(summary))
    }

    async fn list(&self, inner: &Inner) -> Result<CommandReply, PressroomError> {
        let mut entries = Vec::with_capacity(inner.queue.len());
        for (index, id) in inner.queue.items().iter().enumerate() {
            let Some(publication) = self.storage.get_publication(id).await? else {
                continue;
            };
            let label = match &publication.source_metadata.title {
                Some(title) => title.clone(),
                None => truncate_chars(publication.body(), LIST_LABEL_CHARS),
            };
            entries.push((index, label));
        }
        Ok(CommandReply::List(entries))
    }

    async fn publish_current(&self, inner: &mut Inner) -> Result<CommandReply, PressroomError> {
        let id = current(inner)?;
        let post_id = self.workflow.publish(&id).await?;

        let now = Utc::now();
        let until = now + self.settings.suggestion_period;
        inner.state.phase = ControllerPhase::CoolingOff;
        inner.state.suggestions_blocked = true;
        inner.state.last_published_at = Some(now);
        inner.state.cool_off_until = Some(until);
        inner.state.current_publication = None;
        self.refresh(inner).await?;
        self.save(inner).await?;
        info!(publication_id = %id, until = %until, "cooling off after publish");
        Ok(CommandReply::text(format!(
            "Published ({}). Next suggestion after {}.",
            post_id.0,
            until.format("%Y-%m-%d %H:%M UTC")
        )))
    }

    /// Ask the model to rework the current post following `instruction`.
    ///
    /// The lock is released while the model works, so evaluation keeps
    /// running; the publication is looked up again before the result lands.
    async fn revise(
        &self,
        mut inner: MutexGuard<'_, Inner>,
        instruction: String,
    ) -> Result<CommandReply, PressroomError> {
        let instruction = instruction.trim().to_string();
        if instruction.is_empty() {
            return Err(PressroomError::InvalidCommand("empty instruction".into()));
        }
        let id = current(&inner)?;
        self.checkpoints
            .append(&id, Turn::operator(instruction.clone()))
            .await?;
        drop(inner);

        let turns = self.checkpoints.load(&id).await?;
        let history = match turns.split_last() {
            Some((last, rest))
                if last.role == TurnRole::Operator && last.content == instruction =>
            {
                rest
            }
            _ => &turns[..],
        };
        let timeout = self.settings.generation_timeout;
        let post = tokio::time::timeout(timeout, self.model.generate(&instruction, history))
            .await
            .map_err(|_| PressroomError::Timeout { duration: timeout })??;
        let post = if self.settings.apply_unicode_bold {
            apply_unicode_bold(post.trim())
        } else {
            post.trim().to_string()
        };
        if post.is_empty() {
            return Err(PressroomError::generation("model returned an empty revision"));
        }

        inner = self.inner.lock().await;
        self.refresh(&mut inner).await?;
        if !inner.queue.focus(&id) {
            return Err(PressroomError::InvalidCommand(format!(
                "publication {id} left the queue while it was being revised"
            )));
        }
        self.checkpoints.append(&id, Turn::agent(post.clone())).await?;
        self.storage.update_content(&id, &post).await?;
        info!(publication_id = %id, "post revised");
        self.show_current(&mut inner).await
    }
}

fn current(inner: &Inner) -> Result<PublicationId, PressroomError> {
    inner
        .queue
        .current_id()
        .cloned()
        .ok_or_else(|| PressroomError::InvalidCommand("the approval queue is empty".into()))
}
