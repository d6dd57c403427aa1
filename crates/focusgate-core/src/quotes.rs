//! Motivational quotes for the blocked page.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

const QUOTES: &[(&str, &str)] = &[
    (
        "It is not that we have a short time to live, but that we waste a lot of it.",
        "Seneca",
    ),
    (
        "Concentrate all your thoughts upon the work in hand.",
        "Alexander Graham Bell",
    ),
    (
        "The successful warrior is the average man, with laser-like focus.",
        "Bruce Lee",
    ),
    (
        "You can do two things at once, but you can't focus effectively on two things at once.",
        "Gary Keller",
    ),
    (
        "Where focus goes, energy flows.",
        "Tony Robbins",
    ),
    (
        "The shorter way to do many things is to only do one thing at a time.",
        "Mozart",
    ),
    (
        "Lack of direction, not lack of time, is the problem. We all have twenty-four hour days.",
        "Zig Ziglar",
    ),
    (
        "Until we can manage time, we can manage nothing else.",
        "Peter Drucker",
    ),
];

/// Pick a random quote.
pub fn random() -> Quote {
    let (text, author) = QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(QUOTES[0]);
    Quote {
        text: text.to_string(),
        author: author.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_returns_a_known_quote() {
        let quote = random();
        assert!(QUOTES.iter().any(|(t, a)| *t == quote.text && *a == quote.author));
    }
}
