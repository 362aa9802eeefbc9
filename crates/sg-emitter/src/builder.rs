/// Incrementally builds Java source with indentation handling.
#[derive(Debug, Default, Clone)]
pub struct JavaSourceBuilder {
    content: String,
    indent_level: usize,
    indent: String,
}

impl JavaSourceBuilder {
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            indent_level: 0,
            indent: indent.into(),
        }
    }

    pub fn push_line(&mut self, line: &str) {
        if line.is_empty() {
            self.blank_line();
            return;
        }
        for _ in 0..self.indent_level {
            self.content.push_str(&self.indent);
        }
        self.content.push_str(line);
        self.content.push('\n');
    }

    /// Empty line, never indented.
    pub fn blank_line(&mut self) {
        self.content.push('\n');
    }

    /// `line {` and indent.
    pub fn open_block(&mut self, line: &str) {
        self.push_line(&format!("{} {{", line));
        self.indent();
    }

    /// Dedent and close with `}` followed by `suffix`.
    pub fn close_block(&mut self, suffix: &str) {
        self.dedent();
        self.push_line(&format!("}}{}", suffix));
    }

    /// Javadoc block; nothing when `lines` is empty.
    pub fn doc_comment(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.push_line("/**");
        for line in lines {
            if line.is_empty() {
                self.push_line(" *");
            } else {
                self.push_line(&format!(" * {}", line));
            }
        }
        self.push_line(" */");
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn build(self) -> String {
        self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
