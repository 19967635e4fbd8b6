//! Glyph and label lookup tables for rendering
//!
//! Every lookup has a generic fallback: an unknown category key must never
//! cause an item to be omitted, it just renders with the channel's default
//! glyph (the screen should never hard-fail mid-event over bad data).

use super::types::{Channel, TargetGroup};

const EMOTION_GLYPHS: &[(&str, &str)] = &[
    ("wow", "😮"),
    ("empathy", "😍"),
    ("inspire", "🤯"),
    ("think", "🤔"),
    ("laugh", "😂"),
    ("joy", "🥰"),
    ("moved", "😢"),
    ("fun", "✨"),
];

const SUPPORT_GLYPHS: &[(&str, &str)] = &[
    ("cheer", "📣"),
    ("sparkle", "✨"),
    ("good", "👍"),
    ("fire", "🔥"),
    ("idea", "💡"),
    ("yay", "🙌"),
];

const SUPPORT_LABELS: &[(&str, &str)] = &[
    ("cheer", "おうえん"),
    ("sparkle", "きらきら"),
    ("good", "いいね"),
    ("fire", "アツい"),
    ("idea", "アイデア"),
    ("yay", "やったね"),
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Glyph for a bubble, by channel and category key. Falls back to the
/// channel's generic glyph for unknown keys or channels.
pub fn glyph_for(channel: &Channel, action_key: &str) -> &'static str {
    match channel {
        Channel::Emotion => lookup(EMOTION_GLYPHS, action_key).unwrap_or("✨"),
        Channel::Support => lookup(SUPPORT_GLYPHS, action_key).unwrap_or("📣"),
        Channel::Qa => "☁️",
        Channel::Other(_) => "💬",
    }
}

/// Human label for a support-reaction key. Unknown keys echo the key itself
/// rather than dropping the badge.
pub fn support_label(action_key: &str) -> &str {
    lookup(SUPPORT_LABELS, action_key).unwrap_or(action_key)
}

const VENUE_DETAIL_LABELS: &[(&str, &str)] = &[
    ("V01", "愛テックファーム"),
    ("V02", "Paradise Beer Factory"),
    ("V03", "ただいまコーヒー"),
    ("V04", "地元の恵みプリンスタンド"),
];

const TALK_DETAIL_LABELS: &[(&str, &str)] = &[
    ("T07", "ゲストトークセッション"),
    ("T08", "frogs生×保護者セッション"),
];

const PITCH_DETAIL_LABELS: &[(&str, &str)] = &[
    ("P01", "横川史佳"),
    ("P02", "國府田美心"),
    ("P03", "須田煌生"),
    ("P04", "大久保亜織"),
    ("P05", "藤田姫詩"),
    ("P06", "和田愛琉"),
    ("P07", "大屋諒"),
    ("P08", "笹本陽葉里"),
    ("P09", "古橋武大"),
    ("P10", "内野未唯"),
    ("P11", "根本るか"),
];

/// Label for a sub-target id, scoped by its target group. Unknown ids (and
/// groups without a detail table) echo the raw id so the badge still shows.
pub fn target_detail_label(group: TargetGroup, detail_id: &str) -> &str {
    let table = match group {
        TargetGroup::Venue => VENUE_DETAIL_LABELS,
        TargetGroup::Talk => TALK_DETAIL_LABELS,
        TargetGroup::Pitch => PITCH_DETAIL_LABELS,
        TargetGroup::All => return detail_id,
    };
    lookup(table, detail_id).unwrap_or(detail_id)
}

/// Label for a target group badge.
pub fn target_group_label(group: TargetGroup) -> &'static str {
    match group {
        TargetGroup::All => "全体",
        TargetGroup::Venue => "会場の飲食店",
        TargetGroup::Talk => "トークセッション",
        TargetGroup::Pitch => "ピッチ",
    }
}

/// Emotion keys that are allowed to spawn a full-screen effect.
pub fn effect_eligible(action_key: &str) -> bool {
    lookup(EMOTION_GLYPHS, action_key).is_some()
}
