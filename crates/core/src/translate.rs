//! Clock text rendering.
//!
//! Every message shown on the clock is addressed by a code of the form
//! `<beep><tenths>_<id>` (e.g. `B00_top_engine_menu`). The leading letter
//! picks the beep level, the digits the display time in tenths of a second,
//! and the id selects an entry from the embedded text table.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    str::FromStr,
};

use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::DisplayLabel;

/// Clock display languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English; also the fallback for missing translations.
    #[default]
    En,
    /// German.
    De,
    /// Dutch.
    Nl,
    /// French.
    Fr,
    /// Spanish.
    Es,
    /// Italian.
    It,
}

impl Language {
    /// Menu order.
    pub const ALL: [Language; 6] = [Self::En, Self::De, Self::Nl, Self::Fr, Self::Es, Self::It];

    /// Two-letter language code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Nl => "nl",
            Self::Fr => "fr",
            Self::Es => "es",
            Self::It => "it",
        }
    }

    /// Translator id of the language's menu entry.
    pub fn text_id(&self) -> &'static str {
        match self {
            Self::En => "language_en_menu",
            Self::De => "language_de_menu",
            Self::Nl => "language_nl_menu",
            Self::Fr => "language_fr_menu",
            Self::Es => "language_es_menu",
            Self::It => "language_it_menu",
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| anyhow!("unsupported language '{value}'"))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// When the clock should beep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BeepMode {
    /// Never beep.
    #[serde(rename = "none")]
    Off,
    /// Beep for the levels enabled in the beep level mask.
    #[default]
    #[serde(rename = "some")]
    Some,
    /// Always beep.
    #[serde(rename = "all")]
    On,
}

impl BeepMode {
    /// Menu order.
    pub const ALL: [BeepMode; 3] = [Self::Off, Self::Some, Self::On];

    /// Translator id of the mode's menu entry.
    pub fn text_id(&self) -> &'static str {
        match self {
            Self::Off => "beep_off_menu",
            Self::Some => "beep_some_menu",
            Self::On => "beep_on_menu",
        }
    }
}

/// Event classes that may trigger a beep, as bits of the beep level mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BeepLevel {
    /// Always on.
    Yes = 0x0f,
    /// Always off.
    No = 0x00,
    /// Takeback, game end, new game, computer move.
    Config = 0x01,
    /// Clock button presses.
    Button = 0x02,
    /// Board map events (level, book, time).
    Map = 0x04,
    /// Confirmation messages.
    Okay = 0x08,
}

impl BeepLevel {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(Self::Button),
            'N' => Some(Self::No),
            'Y' => Some(Self::Yes),
            'K' => Some(Self::Okay),
            'C' => Some(Self::Config),
            'M' => Some(Self::Map),
            _ => None,
        }
    }
}

/// Output device a text is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DisplayDevice {
    /// Serial / bluetooth board clock.
    #[serde(rename = "ser")]
    Serial,
    /// Pi clock on the I2C bus.
    #[serde(rename = "i2c")]
    I2c,
    /// Web client.
    #[serde(rename = "web")]
    Web,
}

impl DisplayDevice {
    /// Every device.
    pub fn all() -> BTreeSet<DisplayDevice> {
        BTreeSet::from([Self::Serial, Self::I2c, Self::Web])
    }
}

/// A rendered clock message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayText {
    /// Text for wide displays.
    pub large: String,
    /// Eight-character variant.
    pub medium: String,
    /// Six-character variant.
    pub small: String,
    /// Whether the display must wait for the previous message to expire.
    pub wait: bool,
    /// Whether the clock should beep.
    pub beep: bool,
    /// Seconds to keep the message on screen; `0.0` means until replaced.
    pub maxtime: f32,
    /// Devices the message is meant for.
    pub devs: BTreeSet<DisplayDevice>,
}

#[derive(Debug, Deserialize)]
struct TextEntry {
    #[serde(default)]
    wait: bool,
    texts: HashMap<Language, [String; 3]>,
}

static TEXTS: Lazy<HashMap<String, TextEntry>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/texts.json")).expect("invalid embedded text table")
});

static LEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Elo|Level)@(\d+)$").expect("invalid level regex"));

/// Renders text codes into [`DisplayText`] for the configured language.
#[derive(Debug, Clone)]
pub struct Translator {
    beep: BeepMode,
    beep_level: u8,
    language: Language,
    version: String,
    capital: bool,
}

impl Translator {
    /// Create a translator.
    pub fn new(
        beep: BeepMode,
        beep_level: u8,
        language: Language,
        version: impl Into<String>,
    ) -> Self {
        Self {
            beep,
            beep_level,
            language,
            version: version.into(),
            capital: false,
        }
    }

    /// Active language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Switch the display language.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Active beep mode.
    pub fn beep(&self) -> BeepMode {
        self.beep
    }

    /// Change the beep mode.
    pub fn set_beep(&mut self, beep: BeepMode) {
        self.beep = beep;
    }

    /// Toggle upper-case rendering of large and medium text.
    pub fn set_capital(&mut self, capital: bool) {
        self.capital = capital;
    }

    /// Whether a message of the given beep level should beep.
    pub fn beeps_for(&self, level: BeepLevel) -> bool {
        match self.beep {
            BeepMode::On => true,
            BeepMode::Off => false,
            BeepMode::Some => self.beep_level & level as u8 != 0,
        }
    }

    /// Render `code` for every display device.
    pub fn text(&self, code: &str, msg: &str) -> DisplayText {
        self.text_for(code, msg, DisplayDevice::all())
    }

    /// Render `code` for the given devices.
    pub fn text_for(&self, code: &str, msg: &str, devs: BTreeSet<DisplayDevice>) -> DisplayText {
        let (prefix, text_id) = code.split_once('_').unwrap_or(("", code));
        let beep = prefix
            .chars()
            .next()
            .and_then(BeepLevel::from_code)
            .map(|level| self.beeps_for(level))
            .unwrap_or(false);
        let maxtime = prefix.get(1..).and_then(|digits| digits.parse::<u32>().ok()).unwrap_or(0)
            as f32
            / 10.0;

        let rendered = match self.dynamic_text(text_id, msg) {
            Some(variants) => Some((variants, false)),
            None => TEXTS.get(text_id).map(|entry| {
                let variants = entry
                    .texts
                    .get(&self.language)
                    .or_else(|| entry.texts.get(&Language::En))
                    .map(|[large, medium, small]| {
                        [
                            self.fill(large, msg),
                            self.fill(medium, msg),
                            self.fill(small, msg),
                        ]
                    })
                    .unwrap_or_default();
                (variants, entry.wait)
            }),
        };

        let Some(([large, medium, small], wait)) = rendered else {
            warn!("unknown text_id {text_id}");
            return self.capitalize(DisplayText {
                large: text_id.to_string(),
                medium: text_id.to_string(),
                small: text_id.to_string(),
                wait: false,
                beep: self.beeps_for(BeepLevel::Yes),
                maxtime: 0.0,
                devs,
            });
        };

        self.capitalize(DisplayText {
            large,
            medium,
            small,
            wait,
            beep,
            maxtime,
            devs,
        })
    }

    /// Render a catalog label (engine or book name) as a button-press text.
    pub fn label(&self, label: &DisplayLabel) -> DisplayText {
        self.capitalize(DisplayText {
            large: label.large.clone(),
            medium: label.medium.clone(),
            small: label.small.clone(),
            wait: false,
            beep: self.beeps_for(BeepLevel::Button),
            maxtime: 0.0,
            devs: DisplayDevice::all(),
        })
    }

    fn dynamic_text(&self, text_id: &str, msg: &str) -> Option<[String; 3]> {
        match text_id {
            "default" => Some([truncate(msg, 38), truncate(msg, 8), truncate(msg, 6)]),
            "enginename" => Some([msg.to_string(), truncate(msg, 8), truncate(msg, 6)]),
            "level" => Some(self.level_text(msg)),
            "score" => Some(self.score_text(msg)),
            _ => None,
        }
    }

    fn score_text(&self, msg: &str) -> [String; 3] {
        if !msg.is_empty() {
            return [format!("{msg:>11}"), format!("{msg:>8}"), format!("{msg:>6}")];
        }
        let [large, medium, small] = match self.language {
            Language::De => ["kein Wert", "keinWert", "kein W"],
            _ => ["no score", "no score", "no scr"],
        };
        [large.to_string(), medium.to_string(), small.to_string()]
    }

    fn level_text(&self, msg: &str) -> [String; 3] {
        let passthrough = || [msg.to_string(), truncate(msg, 8), truncate(msg, 6)];
        let Some(caps) = LEVEL_RE.captures(msg) else {
            return passthrough();
        };
        let Ok(value) = caps[2].parse::<u64>() else {
            return passthrough();
        };
        if &caps[1] == "Elo" {
            let value = format!("{value:>4}");
            return [
                format!("Elo {value}"),
                format!("Elo {value}"),
                format!("el{value}"),
            ];
        }
        let value = format!("{value:>2}");
        let (large, medium, small) = match self.language {
            Language::De => ("Level    ", "Level ", "stf "),
            Language::Fr => ("niveau   ", "niveau", "niv "),
            Language::Es => ("nivel    ", "nivel ", "nvl "),
            Language::It => ("livello  ", "livel ", "liv "),
            Language::En | Language::Nl => ("level    ", "level ", "lvl "),
        };
        [
            format!("{large}{value}"),
            format!("{medium}{value}"),
            format!("{small}{value}"),
        ]
    }

    fn fill(&self, template: &str, msg: &str) -> String {
        template
            .replace("{msg}", msg)
            .replace("{version}", &self.version)
    }

    fn capitalize(&self, mut text: DisplayText) -> DisplayText {
        if self.capital {
            text.large = text.large.to_uppercase();
            text.medium = text.medium.to_uppercase();
        }
        text
    }
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}
