//! Rule-based cleanup of spoken-style input
//!
//! Runs before any correction: filler words go first, then character runs
//! are shortened, then whitespace is collapsed. Filler removal leaves
//! whitespace runs behind, so the order is fixed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Hesitation words, matched as whole words and possibly stretched
static FILLERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"\b음+\b", r"\b어+\b", r"\b그+게\b", r"\b막\b"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

/// Characters whose runs of 3+ collapse to 2, with the replacement
static REPEATED_RUNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"ㅋ{3,}", "ㅋㅋ"),
        (r"ㅎ{3,}", "ㅎㅎ"),
        (r"\.{3,}", ".."),
        (r"!{3,}", "!!"),
        (r"\?{3,}", "??"),
    ]
    .into_iter()
    .map(|(p, r)| (Regex::new(p).unwrap(), r))
    .collect()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a raw learner utterance
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut result = text.to_string();

    for filler in FILLERS.iter() {
        result = filler.replace_all(&result, " ").into_owned();
    }

    for (run, replacement) in REPEATED_RUNS.iter() {
        result = run.replace_all(&result, *replacement).into_owned();
    }

    WHITESPACE.replace_all(&result, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_filler_removal() {
        assert_eq!(normalize("음 나는 학교에가요"), "나는 학교에가요");
        assert_eq!(normalize("음음음 어어 그게 막 가요"), "가요");
        assert_eq!(normalize("그그게 뭐예요"), "뭐예요");
    }

    #[test]
    fn test_filler_inside_word_is_kept() {
        assert_eq!(normalize("음식이 맛있어요"), "음식이 맛있어요");
        assert_eq!(normalize("막내가 어디 가요"), "막내가 어디 가요");
        assert_eq!(normalize("어머니"), "어머니");
    }

    #[test]
    fn test_laughter_runs() {
        assert_eq!(normalize("재밌어요ㅋㅋㅋㅋㅋ"), "재밌어요ㅋㅋ");
        assert_eq!(normalize("ㅎㅎㅎㅎ 좋아요"), "ㅎㅎ 좋아요");
        assert_eq!(normalize("ㅋㅋ"), "ㅋㅋ");
    }

    #[test]
    fn test_punctuation_runs() {
        assert_eq!(normalize("정말요....."), "정말요..");
        assert_eq!(normalize("와!!!!"), "와!!");
        assert_eq!(normalize("왜요???"), "왜요??");
        assert_eq!(normalize("네.."), "네..");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalize("  나는\t\t학교에   가요 \n"), "나는 학교에 가요");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "음 나는 학교에가요",
            "어어 ㅋㅋㅋㅋ 막 웃었어요!!!!!",
            "그게...   뭐예요???",
            "  ㅎㅎㅎ  ",
            "안녕하세요",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_runs_never_exceed_two() {
        let out = normalize("ㅋㅋㅋㅋㅋㅋㅋ ㅎㅎㅎㅎ ...... !!!!! ?????");
        for pattern in ["ㅋㅋㅋ", "ㅎㅎㅎ", "...", "!!!", "???", "  "] {
            assert!(!out.contains(pattern), "{:?} in {:?}", pattern, out);
        }
    }
}
