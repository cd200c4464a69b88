use super::SelectedCounty;

/// A change to the county selection.
///
/// The map picker reports its selection as a bare list whose length decides
/// what it means; [`SelectionAction::from_emitted`] turns that into one of
/// these so the meaning is explicit from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    Clear,
    /// Remove the county if selected, add it otherwise.
    Toggle(SelectedCounty),
    /// Replace the selection wholesale.
    Replace(Vec<SelectedCounty>),
}

impl SelectionAction {
    /// Interpret a picker emission: empty clears, one item toggles, two or
    /// more replace.
    pub fn from_emitted(mut emitted: Vec<SelectedCounty>) -> Self {
        match emitted.len() {
            0 => Self::Clear,
            1 => Self::Toggle(emitted.remove(0)),
            _ => Self::Replace(emitted),
        }
    }
}
