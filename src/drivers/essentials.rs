//! Baseline packages and optional desktop tools.

use crate::common::distro::Family;
use super::database::DriverDatabase;

/// Popular desktop tools offered on every distribution.
pub const OPTIONAL_TOOLS: [&str; 25] = [
    "ani-cli",
    "pokemon-colorscripts",
    "fastfetch",
    "cava",
    "btop",
    "htop",
    "ranger",
    "fish",
    "zsh",
    "starship",
    "vlc",
    "mpv",
    "telegram-desktop",
    "discord",
    "obs-studio",
    "steam",
    "lutris",
    "bottles",
    "kitty",
    "alacritty",
    "yt-dlp",
    "qbittorrent",
    "stremio",
    "prism-launcher",
    "heroic-games-launcher-bin",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSet {
    Essentials,
    Optional,
}

impl PackageSet {
    pub fn title(self) -> &'static str {
        match self {
            PackageSet::Essentials => "Essentials",
            PackageSet::Optional => "Optional Tools",
        }
    }

    pub fn packages(self, db: &DriverDatabase, family: Family) -> Vec<String> {
        match self {
            PackageSet::Essentials => db.essentials(family).to_vec(),
            PackageSet::Optional => OPTIONAL_TOOLS.iter().map(|t| t.to_string()).collect(),
        }
    }
}
