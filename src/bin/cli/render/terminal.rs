use lumiere_lib::content::ContentItem;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in `code` when colors are on
pub fn paint(text: &str, code: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", code, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Render a flashcard as indented terminal lines
pub fn render_card(item: &ContentItem, use_color: bool) -> String {
    let mut lines = Vec::new();

    match item {
        ContentItem::Term(card) => {
            lines.push(headline(&card.french, &card.english, use_color));
        }
        ContentItem::Verb(card) => {
            lines.push(headline(&card.infinitive, &card.english, use_color));
            let forms: Vec<String> = card
                .conjugations
                .iter()
                .map(|c| format!("{} {}", c.pronoun, c.form))
                .collect();
            for row in forms.chunks(3) {
                lines.push(format!("    {}", paint(&row.join(" · "), Color::CYAN, use_color)));
            }
        }
        ContentItem::Adjective(card) => {
            let forms = if card.masculine == card.feminine {
                card.masculine.clone()
            } else {
                format!("{} / {}", card.masculine, card.feminine)
            };
            lines.push(headline(&forms, &card.english, use_color));
        }
        ContentItem::ArticleOverview(card) => {
            lines.push(format!("  {}", paint(&card.title, Color::MAGENTA, use_color)));
            for line in wrap_lines(&card.explanation, "    ", 76) {
                lines.push(line);
            }
            for example in &card.examples {
                lines.push(format!(
                    "    {} {}",
                    paint(&example.french, Color::ITALIC, use_color),
                    paint(&format!("({})", example.english), Color::GRAY, use_color)
                ));
            }
            return lines.join("\n");
        }
    }

    if let Some(phonetic) = item.phonetic() {
        lines.push(format!("    {}", paint(&format!("[{}]", phonetic), Color::DIM, use_color)));
    }
    if let Some(example) = item.example() {
        lines.push(format!(
            "    {} {}",
            paint(&example.french, Color::ITALIC, use_color),
            paint(&format!("({})", example.english), Color::GRAY, use_color)
        ));
    }

    lines.join("\n")
}

fn headline(french: &str, english: &str, use_color: bool) -> String {
    let french = if use_color {
        format!("{}{}{}", Color::BOLD, french, Color::RESET)
    } else {
        french.to_string()
    };
    format!("  {} {}", french, paint(&format!("= {}", english), Color::GRAY, use_color))
}

/// Horizontal bar for a 0-100 percentage
pub fn mastery_bar(percent: u8, width: usize, use_color: bool) -> String {
    let filled = (usize::from(percent.min(100)) * width + 50) / 100;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled));
    let code = match percent {
        0..=32 => Color::YELLOW,
        33..=99 => Color::CYAN,
        _ => Color::GREEN,
    };
    paint(&bar, code, use_color)
}

/// Simple word-wrapping for terminal output
pub fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_width {
            lines.push(format!("{}{}", prefix, current));
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(format!("{}{}", prefix, current));
    }

    lines
}
