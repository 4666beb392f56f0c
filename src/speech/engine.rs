//! Native voice engines
//!
//! The speech engine adapter talks to a [`SynthesisEngine`]. The shipped
//! implementation drives a command-line voice that comes with the OS
//! (`espeak-ng`/`espeak` on Linux, `say` on macOS).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{Error, Result};

/// A voice as reported by an engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVoice {
    /// Identifier passed back to [`SynthesisEngine::set_voice`]
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// BCP 47 style language tags (e.g. "en-gb")
    pub languages: Vec<String>,
}

/// A concrete synthesis engine
///
/// Implementations may block in [`say_and_wait`](Self::say_and_wait) until
/// playback completes. They are not expected to support concurrent calls.
pub trait SynthesisEngine: Send {
    /// Short engine name for logs
    fn name(&self) -> &str;

    /// Enumerate installed voices
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be queried
    fn voices(&self) -> Result<Vec<EngineVoice>>;

    /// Select the active voice by id
    ///
    /// # Errors
    ///
    /// Returns error if the engine rejects the voice
    fn set_voice(&mut self, id: &str) -> Result<()>;

    /// Set the speaking rate in words per minute
    ///
    /// # Errors
    ///
    /// Returns error if the engine rejects the rate
    fn set_rate(&mut self, words_per_minute: u32) -> Result<()>;

    /// Set output volume, `0.0..=1.0`
    ///
    /// # Errors
    ///
    /// Returns error if the engine rejects the volume
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// The currently selected voice id, if any
    fn current_voice(&self) -> Option<&str>;

    /// Synthesize text and block until playback finishes
    ///
    /// `voice` overrides the selected voice for this call only.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    fn say_and_wait(&mut self, text: &str, voice: Option<&str>) -> Result<()>;
}

/// Flavor of command-line voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandFlavor {
    Espeak,
    Say,
}

/// Candidate binaries, in order of preference
const CANDIDATES: &[(&str, CommandFlavor)] = &[
    ("espeak-ng", CommandFlavor::Espeak),
    ("espeak", CommandFlavor::Espeak),
    ("say", CommandFlavor::Say),
];

/// Speaks through an OS command-line voice
#[derive(Debug)]
pub struct CommandEngine {
    program: PathBuf,
    flavor: CommandFlavor,
    voice: Option<String>,
    rate: Option<u32>,
    volume: Option<f32>,
}

impl CommandEngine {
    /// Find a command-line voice on `PATH`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DependencyUnavailable`] if no supported binary exists
    pub fn detect() -> Result<Self> {
        for (bin, flavor) in CANDIDATES {
            if let Ok(program) = which::which(bin) {
                tracing::debug!(program = %program.display(), "found native voice engine");
                return Ok(Self::with_program(program, *flavor));
            }
        }

        Err(Error::DependencyUnavailable(
            "no native voice found (tried espeak-ng, espeak, say)".to_string(),
        ))
    }

    fn with_program(program: PathBuf, flavor: CommandFlavor) -> Self {
        Self {
            program,
            flavor,
            voice: None,
            rate: None,
            volume: None,
        }
    }

    /// Path of the voice binary in use
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn speak_args(&self, voice: Option<&str>) -> Vec<String> {
        let mut args = Vec::new();
        let voice = voice.or(self.voice.as_deref());

        match self.flavor {
            CommandFlavor::Espeak => {
                if let Some(voice) = voice {
                    args.extend(["-v".to_string(), voice.to_string()]);
                }
                if let Some(rate) = self.rate {
                    args.extend(["-s".to_string(), rate.to_string()]);
                }
                if let Some(volume) = self.volume {
                    args.extend(["-a".to_string(), espeak_amplitude(volume).to_string()]);
                }
                args.push("--stdin".to_string());
            }
            CommandFlavor::Say => {
                if let Some(voice) = voice {
                    args.extend(["-v".to_string(), voice.to_string()]);
                }
                if let Some(rate) = self.rate {
                    args.extend(["-r".to_string(), rate.to_string()]);
                }
                // `say` has no volume flag; it follows the system output level
                args.extend(["-f".to_string(), "-".to_string()]);
            }
        }

        args
    }
}

impl SynthesisEngine for CommandEngine {
    fn name(&self) -> &str {
        match self.flavor {
            CommandFlavor::Espeak => "espeak",
            CommandFlavor::Say => "say",
        }
    }

    fn voices(&self) -> Result<Vec<EngineVoice>> {
        let arg = match self.flavor {
            CommandFlavor::Espeak => "--voices",
            CommandFlavor::Say => "-v?",
        };

        let output = Command::new(&self.program)
            .arg(arg)
            .stdin(Stdio::null())
            .output()?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(Error::Synthesis(format!(
                "{} voice listing exited with code {code}",
                self.name()
            )));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(match self.flavor {
            CommandFlavor::Espeak => parse_espeak_voices(&listing),
            CommandFlavor::Say => parse_say_voices(&listing),
        })
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(Error::Synthesis("empty voice id".to_string()));
        }
        self.voice = Some(id.to_string());
        Ok(())
    }

    fn set_rate(&mut self, words_per_minute: u32) -> Result<()> {
        if words_per_minute == 0 {
            return Err(Error::Synthesis("speaking rate must be positive".to_string()));
        }
        self.rate = Some(words_per_minute);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(Error::Synthesis(format!("volume {volume} out of range")));
        }
        self.volume = Some(volume);
        Ok(())
    }

    fn current_voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    fn say_and_wait(&mut self, text: &str, voice: Option<&str>) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(self.speak_args(voice))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        // Text goes over stdin so a leading '-' is never read as a flag
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Synthesis(format!(
                "{} exited with code {code}: {}",
                self.name(),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// espeak amplitude runs 0-200 with 100 as normal volume
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn espeak_amplitude(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Parse `espeak --voices` output
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-gb           --/M      English_(Great_Britain) gmw/en          (en 2)
/// ```
fn parse_espeak_voices(listing: &str) -> Vec<EngineVoice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let (language, name) = (fields.get(1)?, fields.get(3)?);
            Some(EngineVoice {
                id: (*language).to_string(),
                name: name.replace('_', " "),
                languages: vec![language.to_lowercase()],
            })
        })
        .collect()
}

/// Parse `say -v?` output
///
/// ```text
/// Alex                en_US    # Most people recognize me by my voice.
/// Bad News            en_US    # The light you see at the end of the tunnel...
/// ```
fn parse_say_voices(listing: &str) -> Vec<EngineVoice> {
    listing
        .lines()
        .filter_map(|line| {
            let described = line.split('#').next()?.trim_end();
            let (name, locale) = described.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() || locale.is_empty() {
                return None;
            }
            Some(EngineVoice {
                id: name.to_string(),
                name: name.to_string(),
                languages: vec![locale.replace('_', "-").to_lowercase()],
            })
        })
        .collect()
}
