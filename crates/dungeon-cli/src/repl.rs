use dungeon_agent::{StoryRunner, TurnOutcome};
use dungeon_core::{Sender, Turn};
use dungeon_session::{export_file_name, LoadOutcome, PersistenceStore, SessionState};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

const HELP: &str = "\
Type what your character does, or one of:
  /new                 start a new story (settings reset)
  /save                save the story
  /load                load the last saved story
  /export [PATH]       write the story to a JSON file
  /import PATH         replace the story from a JSON file
  /mode VALUE          censored | uncensored
  /temperature VALUE   0.0 to 1.0
  /tone VALUE          Fantasy | Sci-Fi | Horror | Mystery | Comedy | Historical
  /settings            show current settings
  /help                show this help
  /quit                leave the game";

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    New,
    Save,
    Load,
    Export(Option<PathBuf>),
    Import(PathBuf),
    Mode(String),
    Temperature(String),
    Tone(String),
    Settings,
    Help,
    Quit,
    /// A known command missing its argument; holds the usage line.
    Usage(&'static str),
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Say(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let arg = (!arg.is_empty()).then(|| arg.to_string());

        match (name, arg) {
            ("new", _) => Command::New,
            ("save", _) => Command::Save,
            ("load", _) => Command::Load,
            ("export", path) => Command::Export(path.map(PathBuf::from)),
            ("import", Some(path)) => Command::Import(PathBuf::from(path)),
            ("import", None) => Command::Usage("/import PATH"),
            ("mode", Some(v)) => Command::Mode(v),
            ("mode", None) => Command::Usage("/mode censored|uncensored"),
            ("temperature" | "temp", Some(v)) => Command::Temperature(v),
            ("temperature" | "temp", None) => Command::Usage("/temperature 0.0-1.0"),
            ("tone", Some(v)) => Command::Tone(v),
            ("tone", None) => Command::Usage("/tone NAME"),
            ("settings", _) => Command::Settings,
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            (other, _) => Command::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive front end over one session.
pub struct Console<W> {
    session: SessionState,
    runner: StoryRunner,
    store: PersistenceStore,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(session: SessionState, runner: StoryRunner, store: PersistenceStore, out: W) -> Self {
        Self {
            session,
            runner,
            store,
            out,
        }
    }

    #[cfg(test)]
    fn session(&self) -> &SessionState {
        &self.session
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }

    /// Restores the saved story for this session, if the store has one.
    pub async fn resume(&mut self) -> anyhow::Result<()> {
        if !self.store.is_configured() {
            return Ok(());
        }
        match self.session.load(&self.store).await {
            Ok(LoadOutcome::Restored) => {
                writeln!(self.out, "Resumed session {}.", self.session.id())?
            }
            Ok(LoadOutcome::NothingSaved) => {}
            Err(e) => {
                warn!(session_id = %self.session.id(), error = %e, "Resume failed");
                writeln!(self.out, "Could not load saved story: {e}")?;
            }
        }
        Ok(())
    }

    /// Prints the whole conversation, seeding the welcome turn if needed.
    pub fn render_log(&mut self) -> std::io::Result<()> {
        let log = self.session.display_log().clone();
        for turn in log.iter() {
            write_turn(&mut self.out, turn)?;
        }
        Ok(())
    }

    pub async fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        match Command::parse(line) {
            Command::Say(text) => match self.runner.submit(&mut self.session, &text).await {
                TurnOutcome::Ignored => {}
                TurnOutcome::Narrated(_) | TurnOutcome::Failed(_) => {
                    if let Some(turn) = self.session.log.last() {
                        write_turn(&mut self.out, turn)?;
                    }
                }
            },
            Command::New => {
                if self.session.new_story().is_needed() {
                    self.render_log()?;
                }
            }
            Command::Save => match self.session.save(&self.store).await {
                Ok(()) => writeln!(self.out, "Story saved.")?,
                Err(e) => writeln!(self.out, "Save failed: {e}")?,
            },
            Command::Load => match self.session.load(&self.store).await {
                Ok(LoadOutcome::Restored) => {
                    writeln!(self.out, "Story loaded.")?;
                    self.render_log()?;
                }
                Ok(LoadOutcome::NothingSaved) => {
                    writeln!(self.out, "No saved story found for this session.")?
                }
                Err(e) => writeln!(self.out, "Load failed: {e}")?,
            },
            Command::Export(path) => {
                let path =
                    path.unwrap_or_else(|| PathBuf::from(export_file_name(self.session.id())));
                let json = self.session.export().to_json()?;
                match tokio::fs::write(&path, json).await {
                    Ok(()) => writeln!(self.out, "Story exported to {}.", path.display())?,
                    Err(e) => writeln!(self.out, "Export failed: {e}")?,
                }
            }
            Command::Import(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => match self.session.import(&bytes) {
                    Ok(refresh) => {
                        writeln!(self.out, "Story imported from {}.", path.display())?;
                        if refresh.is_needed() {
                            self.render_log()?;
                        }
                    }
                    Err(e) => writeln!(self.out, "Import failed: {e}")?,
                },
                Err(e) => writeln!(self.out, "Import failed: {e}")?,
            },
            Command::Mode(value) => {
                let result = self.session.settings.set_mode_str(&value);
                self.report_setting(result)?;
            }
            Command::Temperature(value) => {
                let result = self.session.settings.set_temperature_str(&value);
                self.report_setting(result)?;
            }
            Command::Tone(value) => {
                let result = self.session.settings.set_tone_str(&value);
                self.report_setting(result)?;
            }
            Command::Settings => {
                writeln!(self.out, "Session: {}", self.session.id())?;
                writeln!(self.out, "{}", self.session.settings.summary())?;
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
            Command::Usage(usage) => writeln!(self.out, "Usage: {usage}")?,
            Command::Unknown(name) => {
                writeln!(self.out, "Unknown command '/{name}'. Type /help.")?
            }
        }
        self.out.flush()?;
        Ok(Flow::Continue)
    }

    fn report_setting<E: std::fmt::Display>(&mut self, result: Result<(), E>) -> std::io::Result<()> {
        match result {
            Ok(()) => writeln!(self.out, "{}", self.session.settings.summary()),
            Err(e) => writeln!(self.out, "{e}"),
        }
    }

    /// Reads lines until end of input or `/quit`.
    pub async fn run<R>(&mut self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if self.handle_line(&line).await? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }
}

fn write_turn<W: Write>(out: &mut W, turn: &Turn) -> std::io::Result<()> {
    let speaker = match turn.sender {
        Sender::User => "You",
        Sender::Ai => "Dungeon Master",
    };
    writeln!(out, "{speaker}: {}", turn.text)
}
