/// Editable query line
#[derive(Debug, Clone, Default)]
pub struct QueryInput {
    value: String,
}

impl QueryInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replace the whole value
    pub fn change(&mut self, new_value: impl Into<String>) {
        self.value = new_value.into();
    }

    pub fn insert(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Trimmed query to search for, or `None` when there is nothing to submit.
    /// The value itself is left as typed so the user can refine it.
    pub fn submit(&self) -> Option<String> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
