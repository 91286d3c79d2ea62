//! Field-level cleanup shared by every source.
//!
//! All functions here are total: bad input degrades to an empty value instead
//! of an error, and callers detect degradation by checking for emptiness.

use crate::model::Ingredient;
use crate::raw::RawValue;

/// Characters dropped outright rather than treated as spaces.
fn is_no_break_space(c: char) -> bool {
    matches!(c, '\u{00A0}' | '\u{2007}' | '\u{202F}' | '\u{FEFF}')
}

/// Trim, collapse whitespace runs to one space and strip no-break spaces.
/// Absent input yields an empty string.
pub fn normalize_text<'a>(raw: impl Into<Option<&'a str>>) -> String {
    let Some(raw) = raw.into() else {
        return String::new();
    };
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if is_no_break_space(ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

/// Normalize a scalar field. A list is joined with spaces first.
pub fn normalize_scalar(raw: Option<&RawValue>) -> String {
    match raw {
        None => String::new(),
        Some(RawValue::Text(text)) => normalize_text(text.as_str()),
        Some(RawValue::List(items)) => normalize_text(items.join(" ").as_str()),
    }
}

/// Normalize a list field.
///
/// A list keeps its element boundaries. A single string is split on the
/// first of `separators` it contains. Empty elements are always dropped.
pub fn normalize_list(raw: Option<&RawValue>, separators: &[&str]) -> Vec<String> {
    let pieces: Vec<&str> = match raw {
        None => return Vec::new(),
        Some(RawValue::List(items)) => items.iter().map(String::as_str).collect(),
        Some(RawValue::Text(text)) => {
            match separators.iter().find(|sep| !sep.is_empty() && text.contains(**sep)) {
                Some(sep) => text.split(*sep).collect(),
                None => vec![text.as_str()],
            }
        }
    };
    pieces
        .into_iter()
        .map(normalize_text)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Persian (U+06F0..) or Arabic-Indic (U+0660..) digit to its ASCII form.
fn ascii_digit(c: char) -> Option<char> {
    let offset = match c {
        '0'..='9' => return Some(c),
        '\u{06F0}'..='\u{06F9}' => c as u32 - 0x06F0,
        '\u{0660}'..='\u{0669}' => c as u32 - 0x0660,
        _ => return None,
    };
    char::from_digit(offset, 10)
}

/// Map Persian and Arabic-Indic digits to ASCII, one for one.
pub fn normalize_digits(text: &str) -> String {
    text.chars().map(|c| ascii_digit(c).unwrap_or(c)).collect()
}

fn is_decimal_separator(c: char) -> bool {
    matches!(c, '.' | '\u{066B}')
}

/// Characters that tie a number to the next one: fractions (`۱/۲`) and
/// ranges (`۲-۳`).
fn is_number_joiner(c: char) -> bool {
    matches!(
        c,
        '/' | '\u{2044}' | '\u{2215}' | '-' | '\u{2010}' | '\u{2013}' | '\u{2014}' | '\u{2212}' | '~'
    )
}

/// Leading number of `text`: digits, optionally a decimal separator and more
/// digits. Returns the value and the byte length consumed. A number joined to
/// another by `/` or a dash is not a single amount and yields `None`.
fn leading_amount(text: &str) -> Option<(f64, usize)> {
    let mut number = String::new();
    let mut consumed = 0;
    let mut chars = text.char_indices().peekable();

    while let Some(&(idx, c)) = chars.peek() {
        let Some(d) = ascii_digit(c) else { break };
        number.push(d);
        consumed = idx + c.len_utf8();
        chars.next();
    }
    if number.is_empty() {
        return None;
    }

    if let Some(&(sep_idx, sep)) = chars.peek() {
        if is_decimal_separator(sep) {
            let fraction: String = text[sep_idx + sep.len_utf8()..]
                .chars()
                .map_while(ascii_digit)
                .collect();
            if !fraction.is_empty() {
                let fraction_bytes: usize = text[sep_idx + sep.len_utf8()..]
                    .chars()
                    .take(fraction.chars().count())
                    .map(char::len_utf8)
                    .sum();
                number.push('.');
                number.push_str(&fraction);
                consumed = sep_idx + sep.len_utf8() + fraction_bytes;
            }
        }
    }

    if text[consumed..].chars().next().is_some_and(is_number_joiner) {
        return None;
    }

    let value: f64 = number.parse().ok()?;
    value.is_finite().then_some((value, consumed))
}

/// Parse `"<name>: <amount><unit>"`.
///
/// Only the first colon splits. Without a colon the whole line is the name.
/// Without a leading number the whole right-hand side is the unit.
pub fn parse_ingredient_line(raw: &str) -> Ingredient {
    let Some((left, right)) = raw.split_once(':') else {
        return Ingredient::new(normalize_text(raw), None, "");
    };

    let name = normalize_text(left);
    let right = normalize_text(right);
    match leading_amount(&right) {
        Some((amount, consumed)) => Ingredient::new(name, Some(amount), normalize_text(&right[consumed..])),
        None => Ingredient::new(name, None, right),
    }
}

fn is_sentence_end(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\u{061F}' | '\u{2026}')
}

fn is_punctuation(c: char) -> bool {
    !c.is_whitespace() && !c.is_alphanumeric()
}

/// A period between two digits is a decimal point, not a sentence end.
fn is_decimal_point(chars: &[(usize, char)], i: usize) -> bool {
    let before = i.checked_sub(1).and_then(|p| chars.get(p)).map(|&(_, c)| c);
    let after = chars.get(i + 1).map(|&(_, c)| c);
    matches!((before, after), (Some(b), Some(a)) if ascii_digit(b).is_some() && ascii_digit(a).is_some())
}

fn push_step(steps: &mut Vec<String>, piece: &str) {
    let step = normalize_text(piece);
    if step.chars().any(char::is_alphanumeric) {
        steps.push(step);
    }
}

/// Split a paragraph into steps at sentence-ending punctuation that is
/// followed by more content. Terminators stay attached to their step and a
/// run such as `...` counts as one terminator.
pub fn segment_sentences(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut steps = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i].1;
        if !is_sentence_end(c) || (c == '.' && is_decimal_point(&chars, i)) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && is_sentence_end(chars[j].1) {
            j += 1;
        }
        let at_boundary = chars.get(j).map_or(true, |&(_, next)| !is_punctuation(next));
        if at_boundary {
            let end = chars.get(j).map_or(text.len(), |&(b, _)| b);
            push_step(&mut steps, &text[start..end]);
            start = end;
        }
        i = j;
    }
    push_step(&mut steps, &text[start..]);
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "   ",
        "  a   b  ",
        "\u{00A0}آش\u{00A0}\u{00A0} رشته\n\t",
        "نیم‌پز",
        "line one\r\nline two",
        "\u{FEFF}x",
    ];

    #[test]
    fn text_collapses_and_trims() {
        assert_eq!(normalize_text("  a   b  "), "a b");
        assert_eq!(normalize_text("a\n\n\tb"), "a b");
    }

    #[test]
    fn text_absent_is_empty() {
        assert_eq!(normalize_text(None), "");
    }

    #[test]
    fn text_strips_no_break_spaces() {
        assert_eq!(normalize_text("\u{00A0}نمک\u{00A0}"), "نمک");
        assert_eq!(normalize_text("a \u{00A0} b"), "a b");
    }

    #[test]
    fn text_keeps_zero_width_non_joiner() {
        assert_eq!(normalize_text(" نیم‌پز "), "نیم‌پز");
    }

    #[test]
    fn text_is_idempotent() {
        for s in SAMPLES {
            let once = normalize_text(*s);
            assert_eq!(normalize_text(once.as_str()), once, "input {:?}", s);
        }
    }

    #[test]
    fn digits() {
        assert_eq!(normalize_digits("۱۲۳"), "123");
        assert_eq!(normalize_digits("٤٥"), "45");
        assert_eq!(normalize_digits("۲ عدد 3"), "2 عدد 3");
    }

    #[test]
    fn list_keeps_elements_and_drops_empties() {
        let raw = RawValue::List(vec![" a ".into(), "\u{00A0}".into(), "".into(), "b".into()]);
        assert_eq!(normalize_list(Some(&raw), &["\n"]), vec!["a", "b"]);
    }

    #[test]
    fn list_splits_on_first_present_separator() {
        let raw = RawValue::Text("a. b\nc. d".into());
        assert_eq!(normalize_list(Some(&raw), &[".", "\n"]), vec!["a", "b c", "d"]);

        let raw = RawValue::Text("x\n\ny\n".into());
        assert_eq!(normalize_list(Some(&raw), &[".", "\n"]), vec!["x", "y"]);
    }

    #[test]
    fn list_without_separator_is_one_element() {
        let raw = RawValue::Text(" single ".into());
        assert_eq!(normalize_list(Some(&raw), &["\n"]), vec!["single"]);
        let blank = RawValue::Text("  ".into());
        assert!(normalize_list(Some(&blank), &["\n"]).is_empty());
        assert!(normalize_list(None, &["\n"]).is_empty());
    }

    #[test]
    fn list_never_yields_empty_strings() {
        let inputs = [
            RawValue::Text("\n\n\n".into()),
            RawValue::Text("..".into()),
            RawValue::List(vec!["".into(), " ".into(), "\u{00A0}".into()]),
            RawValue::Text("a\n \nb".into()),
        ];
        for raw in &inputs {
            assert!(normalize_list(Some(raw), &[".", "\n"]).iter().all(|s| !s.is_empty()));
        }
    }

    #[test]
    fn ingredient_with_persian_amount() {
        let ing = parse_ingredient_line("گل نسترن: ۵۰۰ گرم");
        assert_eq!(ing, Ingredient::new("گل نسترن", Some(500.0), "گرم"));
    }

    #[test]
    fn ingredient_amounts_in_either_script() {
        for (line, amount, unit) in [
            ("آرد: 2 پیمانه", 2.0, "پیمانه"),
            ("برنج: ۳ لیوان", 3.0, "لیوان"),
            ("شکر: ٤ قاشق", 4.0, "قاشق"),
            ("کره:۲۵۰گرم", 250.0, "گرم"),
            ("شیر: ۱٫۵ لیتر", 1.5, "لیتر"),
            ("آب: 0.5 لیتر", 0.5, "لیتر"),
        ] {
            let ing = parse_ingredient_line(line);
            assert_eq!(ing.amount, Some(amount), "{}", line);
            assert_eq!(ing.unit, unit, "{}", line);
        }
    }

    #[test]
    fn ingredient_without_amount() {
        assert_eq!(parse_ingredient_line("نمک:"), Ingredient::new("نمک", None, ""));
        assert_eq!(
            parse_ingredient_line("فلفل: به مقدار لازم"),
            Ingredient::new("فلفل", None, "به مقدار لازم")
        );
    }

    #[test]
    fn ingredient_without_colon() {
        assert_eq!(parse_ingredient_line("  زردچوبه  "), Ingredient::new("زردچوبه", None, ""));
    }

    #[test]
    fn ingredient_splits_on_first_colon_only() {
        let ing = parse_ingredient_line("ادویه: ۲ قاشق: ترجیحاً تازه");
        assert_eq!(ing.name, "ادویه");
        assert_eq!(ing.amount, Some(2.0));
        assert_eq!(ing.unit, "قاشق: ترجیحاً تازه");
    }

    #[test]
    fn ingredient_trailing_separator_is_unit_text() {
        let ing = parse_ingredient_line("گردو: ۲. خرد شده");
        assert_eq!(ing.amount, Some(2.0));
        assert_eq!(ing.unit, ". خرد شده");
    }

    #[test]
    fn fractions_and_ranges_are_not_amounts() {
        assert_eq!(
            parse_ingredient_line("شکر: ۱/۲ پیمانه"),
            Ingredient::new("شکر", None, "۱/۲ پیمانه")
        );
        assert_eq!(
            parse_ingredient_line("تخم مرغ: ۲-۳ عدد"),
            Ingredient::new("تخم مرغ", None, "۲-۳ عدد")
        );
        assert_eq!(parse_ingredient_line("آب: 1.5–2 لیتر").amount, None);
        // a dash after a space is unit text
        assert_eq!(parse_ingredient_line("نمک: ۲ - کم").amount, Some(2.0));
    }

    #[test]
    fn ingredient_with_empty_name_is_still_parsed() {
        let ing = parse_ingredient_line(": 500 گرم");
        assert_eq!(ing, Ingredient::new("", Some(500.0), "گرم"));
    }

    #[test]
    fn sentences_split_on_terminators() {
        let steps = segment_sentences("اول پیاز را سرخ کنید. سپس گوشت را اضافه کنید.");
        assert_eq!(steps, vec!["اول پیاز را سرخ کنید.", "سپس گوشت را اضافه کنید."]);
    }

    #[test]
    fn sentences_without_space_after_period() {
        let steps = segment_sentences("برنج را بشویید.آب را جوش بیاورید");
        assert_eq!(steps, vec!["برنج را بشویید.", "آب را جوش بیاورید"]);
    }

    #[test]
    fn sentences_keep_ellipsis_and_decimals() {
        let steps = segment_sentences("صبر کنید... ۱.۵ ساعت بپزید؟ تمام");
        assert_eq!(steps, vec!["صبر کنید...", "۱.۵ ساعت بپزید؟", "تمام"]);
    }

    #[test]
    fn sentences_drop_punctuation_only_segments() {
        assert!(segment_sentences(" . . ").is_empty());
        assert!(segment_sentences("").is_empty());
        assert_eq!(segment_sentences("یک مرحله"), vec!["یک مرحله"]);
    }

    #[test]
    fn sentences_followed_by_punctuation_do_not_split() {
        let steps = segment_sentences("هم بزنید.» بعد");
        assert_eq!(steps, vec!["هم بزنید.» بعد"]);
    }
}
