//! Capability router: picks a domain for a message by keyword vote.
//!
//! Action verbs are checked first and win over everything else, so a
//! mutating command that mentions "products" or "coupons" is never turned
//! into a read. Verbs match whole words only; the information and research
//! vocabularies match as substrings because Hebrew attaches prefixes
//! (ה, ל, ב, ...) directly to nouns.
//!
//! "אשר" is also the relative pronoun "which" and "שנה" the noun "year",
//! so those two count as verbs only when their object follows.

use sb_protocol::Domain;

/// Mutating verbs, matched as whole words.
pub const ACTION_VERBS: &[&str] = &[
    "הוסף", "צור", "יוצר", "עדכן", "מחק", "הסר", "בצע", "הגדר", "דחה", "הורד",
];

/// Verbs that double as ordinary words, with the next words that make
/// them commands.
pub const OBJECT_VERBS: &[(&str, &[&str])] = &[
    ("אשר", &["הזמנה", "ההזמנה", "את"]),
    ("שנה", &["את", "שם", "מחיר", "סטטוס", "מלאי", "תיאור", "קטגוריה"]),
];

pub const INFORMATION_KEYWORDS: &[&str] = &[
    "תראה", "הצג", "כמה", "מוצרים", "דוח", "מכירות", "קופונים", "הנחות", "מעקב", "פרטי", "היסטורי",
];

pub const RESEARCH_KEYWORDS: &[&str] = &["מתחרים", "מחקר", "שוק", "השוואה", "טרנד", "המלצ"];

/// Resolve the capability domain for `message`.
///
/// Returns `None` when no keyword set matches; the caller shows the
/// full help menu in that case.
pub fn route(message: &str) -> Option<Domain> {
    let lower = message.to_lowercase();

    if has_action_verb(&lower) {
        return Some(Domain::Action);
    }
    if matches_any(&lower, INFORMATION_KEYWORDS) {
        return Some(Domain::Information);
    }
    if matches_any(&lower, RESEARCH_KEYWORDS) {
        return Some(Domain::Research);
    }
    None
}

fn has_action_verb(text: &str) -> bool {
    let words: Vec<&str> = words(text).collect();
    words.iter().enumerate().any(|(i, word)| {
        ACTION_VERBS.contains(word)
            || OBJECT_VERBS.iter().any(|(verb, objects)| {
                verb == word && words.get(i + 1).is_some_and(|next| objects.contains(next))
            })
    })
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}
