/// An assistant reply containing four fenced code blocks, one of them without
/// a language tag and one with a line long enough to force wrapping.
pub fn codeblock_fixture() -> &'static str {
    return r#"
Reversing a string is a one-liner in Rust.

```rust
fn reverse(input: &str) -> String {
    return input.chars().rev().collect();
}
```

The same in JavaScript.

```javascript
// Split to code points first.

// Reversing on raw UTF-16 units corrupts anything outside the basic multilingual plane, which is why this helper spreads the string into an array before touching it. Emoji survive.
function reverse(input) {
    return [...input].reverse().join('');
}
```

Shell output for reference, fenced without a language.

```
$ echo olleh
olleh
```

And Python, because someone always asks.

```python
def reverse(text):
    return text[::-1]
```

Pick whichever runtime you already have.
"#
    .trim();
}

/// A user prompt with meaningful indentation, for asserting that user
/// messages stay preformatted.
pub fn preformatted_fixture() -> &'static str {
    return "why does this fail?\n    let x = 1;\n        x = 2;";
}
