/// A user-defined command offered in the explorer's user menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub command: String,
}

impl MenuItem {
    /// Parse `<label>;<command>`. Lines without a `;` or without a command
    /// are ignored.
    pub fn parse(params: &str) -> Option<Self> {
        let (label, command) = params.split_once(';')?;
        let command = command.trim();
        if command.is_empty() {
            return None;
        }
        Some(Self {
            label: label.trim().to_string(),
            command: command.to_string(),
        })
    }
}
