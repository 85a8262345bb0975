//! Drives one duel through the process loop

use crate::boot_config::DuelConfig;
use crate::error::Result;
use ocg_core::{DuelHandle, OcgBuffer, OcgCore, ProcessResult, ProcessStatus};
use std::fmt;

/// Why the process loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The engine reported the duel as over
    Ended,
    /// The engine needs a player response
    AwaitingResponse,
    /// `max_steps` reached without either of the above
    StepLimit,
    /// The engine returned a status flag this runner does not know
    UnknownStatus(u16),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Ended => f.write_str("ended"),
            RunOutcome::AwaitingResponse => f.write_str("awaiting response"),
            RunOutcome::StepLimit => f.write_str("step limit reached"),
            RunOutcome::UnknownStatus(flag) => write!(f, "unknown status {:#x}", flag),
        }
    }
}

/// What happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of `process` calls
    pub steps: u32,
    /// Number of messages fetched
    pub messages: u32,
    /// Total message bytes fetched
    pub message_bytes: usize,
    pub outcome: RunOutcome,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} steps ({} messages, {} bytes)",
            self.outcome, self.steps, self.messages, self.message_bytes
        )
    }
}

/// Creates a duel, runs it and always ends it
pub struct DuelRunner<'a, C> {
    core: &'a C,
    config: &'a DuelConfig,
}

impl<'a, C: OcgCore> DuelRunner<'a, C> {
    pub fn new(core: &'a C, config: &'a DuelConfig) -> Self {
        Self { core, config }
    }

    /// Run one duel to completion, a response request or the step limit
    pub fn run(&self) -> Result<RunSummary> {
        let duel = self.create()?;
        log::info!("Created {} from {} seed(s)", duel.id(), self.config.seeds.len());

        let outcome = self.drive(&duel);
        let id = duel.id();
        let ended = self.core.end_duel(duel);

        match (outcome, ended) {
            (Ok(summary), Ok(())) => {
                log::info!("{}: {}", id, summary);
                Ok(summary)
            }
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), ended) => {
                if let Err(end_error) = ended {
                    log::warn!("Failed to end {} after error: {}", id, end_error);
                }
                Err(e)
            }
        }
    }

    fn create(&self) -> Result<DuelHandle> {
        match self.config.seeds.as_slice() {
            [seed] => Ok(self.core.create_duel(*seed)?),
            seeds => {
                let buffer = OcgBuffer::from_seeds(seeds)?;
                Ok(self.core.create_duel_v2(&buffer)?)
            }
        }
    }

    fn drive(&self, duel: &DuelHandle) -> Result<RunSummary> {
        for (playerid, player) in self.config.players.iter().enumerate() {
            self.core.set_player_info(
                duel,
                playerid as i32,
                player.lp,
                player.start_count,
                player.draw_count,
            )?;
        }
        self.core.start_duel(duel, self.config.options)?;

        let mut summary = RunSummary {
            steps: 0,
            messages: 0,
            message_bytes: 0,
            outcome: RunOutcome::StepLimit,
        };
        let mut buffer = OcgBuffer::new();

        while summary.steps < self.config.max_steps {
            let result = ProcessResult::from_raw(self.core.process(duel)?);
            summary.steps += 1;

            if result.message_len() > 0 {
                let len = self.core.get_message(duel, &mut buffer)?;
                let message = buffer.filled(len);
                summary.messages += 1;
                summary.message_bytes += message.len();
                log::debug!(
                    "{} step {}: {} byte message",
                    duel.id(),
                    summary.steps,
                    message.len()
                );
            }

            let stop = match result.status() {
                ProcessStatus::Continue => None,
                ProcessStatus::AwaitingResponse => Some(RunOutcome::AwaitingResponse),
                ProcessStatus::Ended => Some(RunOutcome::Ended),
                ProcessStatus::Unknown(flag) => {
                    log::warn!("{} returned unknown status {:#x}", duel.id(), flag);
                    Some(RunOutcome::UnknownStatus(flag))
                }
            };

            if let Some(outcome) = stop {
                summary.outcome = outcome;
                return Ok(summary);
            }
        }

        log::warn!("{} hit the step limit of {}", duel.id(), self.config.max_steps);
        Ok(summary)
    }
}
