use once_cell::sync::Lazy;
use ratatui::style::Color;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;

pub static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

pub struct Syntaxes {}

impl Syntaxes {
    /// Resolves a fence tag like `rust` or `py` to a syntax, falling back to
    /// plain text for tags the bundled set does not know.
    pub fn get(name: &str) -> &'static SyntaxReference {
        if let Some(syntax) = SYNTAX_SET.find_syntax_by_token(name) {
            return syntax;
        }
        if let Some(syntax) = SYNTAX_SET.find_syntax_by_extension(name) {
            return syntax;
        }

        return SYNTAX_SET.find_syntax_plain_text();
    }

    pub fn translate_colour(color: syntect::highlighting::Color) -> Option<Color> {
        return Some(Color::Rgb(color.r, color.g, color.b));
    }
}
