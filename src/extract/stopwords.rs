//! Bilingual (German/English) stopword set

use once_cell::sync::Lazy;
use std::collections::HashSet;

const GERMAN: &[&str] = &[
    "aber", "alle", "allem", "allen", "aller", "alles", "als", "also", "am", "an", "ander",
    "andere", "anderen", "auch", "auf", "aus", "bei", "beim", "bin", "bis", "bist", "bitte",
    "da", "dabei", "damit", "danke", "dann", "darf", "darum", "das", "dass", "dazu", "dein",
    "deine", "dem", "den", "denn", "der", "des", "dich", "die", "dies", "diese", "diesem",
    "diesen", "dieser", "dieses", "dir", "doch", "dort", "du", "durch", "ein", "eine", "einem",
    "einen", "einer", "eines", "einige", "einmal", "er", "es", "etwas", "euch", "euer", "für",
    "gegen", "gibt", "hab", "habe", "haben", "hast", "hat", "hatte", "hier", "hin", "hinter",
    "ich", "ihm", "ihn", "ihnen", "ihr", "ihre", "ihrem", "ihren", "ihrer", "im", "immer", "in",
    "ins", "ist", "ja", "jede", "jedem", "jeden", "jeder", "jedes", "jetzt", "kann", "kannst",
    "kein", "keine", "keinen", "können", "könnte", "machen", "mal", "man", "manche", "mehr",
    "mein", "meine", "mich", "mir", "mit", "muss", "müssen", "nach", "nein", "nicht", "nichts",
    "noch", "nun", "nur", "ob", "oder", "ohne", "schon", "sehr", "sein", "seine", "seinem",
    "seinen", "seiner", "selbst", "sich", "sie", "sind", "so", "soll", "sollte", "sondern",
    "über", "um", "und", "uns", "unser", "unsere", "unter", "viel", "viele", "vom", "von",
    "vor", "war", "waren", "warum", "was", "weil", "welche", "welchen", "welcher", "wenn",
    "wer", "werde", "werden", "wie", "wieder", "will", "wir", "wird", "wirst", "wo", "wurde",
    "wurden", "zu", "zum", "zur", "zwischen",
];

const ENGLISH: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "and", "any", "are", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "could", "did", "does",
    "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
    "having", "her", "here", "hers", "him", "his", "how", "into", "its", "itself", "just",
    "like", "more", "most", "much", "must", "not", "now", "off", "once", "only", "other", "our",
    "ours", "out", "over", "own", "please", "same", "she", "should", "some", "such", "than",
    "thank", "thanks", "that", "the", "their", "theirs", "them", "then", "there", "these",
    "they", "this", "those", "through", "too", "under", "until", "very", "was", "were", "what",
    "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
    "your", "yours",
];

static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| GERMAN.iter().chain(ENGLISH.iter()).copied().collect());

/// Returns true if the lowercase word is a stopword
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}
