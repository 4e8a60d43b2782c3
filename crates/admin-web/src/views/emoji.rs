//! Emoji picker for the compose boxes.

/// A named group of emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmojiCategory {
    pub name: &'static str,
    pub emoji: [&'static str; 15],
}

pub const CATEGORIES: [EmojiCategory; 5] = [
    EmojiCategory {
        name: "Popular",
        emoji: [
            "😀", "😂", "😍", "👍", "🙏", "❤️", "🔥", "🎉", "😊", "🤔", "👏", "💪", "✅", "⭐", "🚀",
        ],
    },
    EmojiCategory {
        name: "Emotions",
        emoji: [
            "😃", "😄", "😁", "😅", "🤣", "😉", "😎", "🥰", "😘", "😢", "😭", "😡", "😱", "🤗", "😴",
        ],
    },
    EmojiCategory {
        name: "Gestures",
        emoji: [
            "👋", "👌", "✌️", "🤞", "👉", "👈", "👆", "👇", "✋", "🤝", "🙌", "👐", "🤲", "✍️", "🙋",
        ],
    },
    EmojiCategory {
        name: "Objects",
        emoji: [
            "📚", "📝", "💻", "🖥️", "⌨️", "🖱️", "📱", "📎", "📌", "📅", "⏰", "🎮", "🎁", "🏆", "💡",
        ],
    },
    EmojiCategory {
        name: "Symbols",
        emoji: [
            "✔️", "❌", "❓", "❗", "⚠️", "➡️", "⬅️", "🔔", "💬", "🆕", "🆗", "💯", "♻️", "🔴", "🟢",
        ],
    },
];

/// Whether `candidate` is one of the picker's emoji.
pub fn is_known(candidate: &str) -> bool {
    CATEGORIES
        .iter()
        .flat_map(|category| category.emoji.iter())
        .any(|emoji| *emoji == candidate)
}
