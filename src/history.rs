use crate::tree::Target;

/// Every node the cursor has rested on, oldest first.
///
/// Appended on each cursor change and never deduplicated. Only consulted
/// when picking a new selection after a delete.
#[derive(Debug, Clone, Default)]
pub struct FocusHistory {
    entries: Vec<Target>,
}

impl FocusHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: Target) {
        self.entries.push(target);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry first
    pub fn recent(&self) -> impl Iterator<Item = &Target> {
        self.entries.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_duplicates_in_order() {
        let mut history = FocusHistory::new();
        let a = Target::Session { id: "$0".to_string() };
        let b = Target::Session { id: "$1".to_string() };
        history.push(a.clone());
        history.push(b.clone());
        history.push(a.clone());

        assert_eq!(history.len(), 3);
        assert_eq!(history.recent().cloned().collect::<Vec<_>>(), vec![a.clone(), b, a]);
    }
}
