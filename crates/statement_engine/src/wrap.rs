pub const DEFAULT_WRAP_WIDTH: usize = 170;

/// Greedy word wrap to `width` characters. Blank lines pass through; a word
/// longer than `width` gets a line of its own and is never split. A width of
/// zero falls back to [`DEFAULT_WRAP_WIDTH`].
pub fn wrap_lines(text: &str, width: usize) -> String {
    let width = if width == 0 { DEFAULT_WRAP_WIDTH } else { width };
    let mut out: Vec<String> = Vec::new();

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0usize;
        for word in line.split_whitespace() {
            let word_len = word.chars().count();
            if current_len == 0 {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                out.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }

    out.join("\n")
}
