//! Shared UI icons.
//!
//! Each `Emoji` falls back to plain text on terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Repository card
pub static REPO: Emoji<'_, '_> = Emoji("📦 ", "");
pub static STAR: Emoji<'_, '_> = Emoji("⭐ ", "stars:");
pub static PROMPT: Emoji<'_, '_> = Emoji("💬 ", ">");
pub static IMAGE: Emoji<'_, '_> = Emoji("🖼️  ", "[IMG]");
