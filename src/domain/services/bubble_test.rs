use anyhow::Result;

use super::Bubble;
use super::BubbleAlignment;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::services::Themes;

fn create_lines(message: &Message, alignment: BubbleAlignment) -> Result<String> {
    Config::set(ConfigKey::Username, "testuser");

    let theme = Themes::get("base16-ocean.dark", "")?;
    let lines = Bubble::new(message, alignment, 50, 0).as_lines(&theme);
    let lines_str = lines
        .iter()
        .map(|line| {
            return line
                .spans
                .iter()
                .map(|span| {
                    return span.content.to_string();
                })
                .collect::<Vec<String>>()
                .join("")
                .trim_end()
                .to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    return Ok(lines_str);
}

#[test]
fn it_creates_author_app_text() -> Result<()> {
    let message = Message::new(Author::App, "Hi there!");
    let lines_str = create_lines(&message, BubbleAlignment::Left)?;
    insta::assert_snapshot!(lines_str, @r###"
    ╭TalkFlow───╮
    │ Hi there! │
    ╰───────────╯
    "###);

    return Ok(());
}

#[test]
fn it_creates_author_assistant_text() -> Result<()> {
    let message = Message::new(Author::Assistant, "Hi there!");
    let lines_str = create_lines(&message, BubbleAlignment::Left)?;
    insta::assert_snapshot!(lines_str, @r###"
    ╭Assistant──╮
    │ Hi there! │
    ╰───────────╯
    "###);

    return Ok(());
}

#[test]
fn it_creates_author_assistant_text_long() -> Result<()> {
    let message = Message::new(Author::Assistant, "Hi there! This is a really long line that pushes the boundaries of 50 characters across the screen, resulting in a bubble where the line is wrapped to the next line. Cool right?");
    let lines_str = create_lines(&message, BubbleAlignment::Left)?;
    insta::assert_snapshot!(lines_str, @r###"
    ╭Assistant────────────────────────────────────╮
    │ Hi there! This is a really long line that   │
    │ pushes the boundaries of 50 characters      │
    │ across the screen, resulting in a bubble    │
    │ where the line is wrapped to the next line. │
    │ Cool right?                                 │
    ╰─────────────────────────────────────────────╯
    "###);

    return Ok(());
}

#[test]
fn it_numbers_and_renders_assistant_code() -> Result<()> {
    let text = r#"
Reversing a string is a one-liner in Rust.

```rust
fn reverse(input: &str) -> String {
    return input.chars().rev().collect();
}
```"#
        .trim();
    let message = Message::new(Author::Assistant, text);
    let lines_str = create_lines(&message, BubbleAlignment::Left)?;

    insta::assert_snapshot!(lines_str, @r###"
    ╭Assistant───────────────────────────────────╮
    │ Reversing a string is a one-liner in Rust. │
    │                                            │
    │ ```rust (1)                                │
    │ fn reverse(input: &str) -> String {        │
    │     return input.chars().rev().collect();  │
    │ }                                          │
    │ ```                                        │
    ╰────────────────────────────────────────────╯
    "###);
    return Ok(());
}

#[test]
fn it_keeps_user_text_preformatted() -> Result<()> {
    let message = Message::new(Author::User, test_utils::preformatted_fixture());
    let lines_str = create_lines(&message, BubbleAlignment::Right)?;

    // Indentation inside the bubble must survive untouched, and the bubble
    // itself sits against the right edge.
    let expected = [
        "                       ╭testuser─────────────╮",
        "                       │ why does this fail? │",
        "                       │     let x = 1;      │",
        "                       │         x = 2;      │",
        "                       ╰─────────────────────╯",
    ]
    .join("\n");
    assert_eq!(lines_str, expected);
    return Ok(());
}

#[test]
fn it_does_not_number_fences_in_user_text() -> Result<()> {
    let message = Message::new(Author::User, "```rust\nlet x = 1;\n```");
    let lines_str = create_lines(&message, BubbleAlignment::Right)?;

    assert!(!lines_str.contains("(1)"));
    let expected = [
        "                                ╭testuser────╮",
        "                                │ ```rust    │",
        "                                │ let x = 1; │",
        "                                │ ```        │",
        "                                ╰────────────╯",
    ]
    .join("\n");
    assert_eq!(lines_str, expected);
    return Ok(());
}

#[test]
fn it_renders_the_usage_footer_under_assistant_replies() -> Result<()> {
    let mut message = Message::new(Author::Assistant, "Hi there!");
    message.tokens_used = Some(104);
    message.model_used = Some("groq-llama3".to_string());
    let lines_str = create_lines(&message, BubbleAlignment::Left)?;

    insta::assert_snapshot!(lines_str, @r###"
    ╭Assistant─────────────────────────╮
    │ Hi there!                        │
    │ tokens: 104 | model: groq-llama3 │
    ╰──────────────────────────────────╯
    "###);
    return Ok(());
}

#[test]
fn it_skips_the_usage_footer_for_user_messages() -> Result<()> {
    let mut message = Message::new(Author::User, "Hi there!");
    message.tokens_used = Some(104);
    let lines_str = create_lines(&message, BubbleAlignment::Right)?;

    assert!(!lines_str.contains("tokens:"));
    return Ok(());
}
